use criterion::{Criterion, black_box, criterion_group, criterion_main};

use gantry_core::handle::HandleAllocator;
use gantry_core::math::Vec3;
use gantry_core::undo::{
    EditActionResult, Editable, HistoryConfig, HistoryStack, RecordData, RecordHandler,
};

struct Positions {
    values: Vec<Vec3>,
}

impl Editable for Positions {}

#[derive(Debug)]
struct Move;

impl Move {
    fn apply(data: &RecordData, layer: usize, target: &mut Positions) -> EditActionResult {
        for (handle, _) in data.layer(layer).iter() {
            target.values[handle.index() as usize] = data.get_as(layer, handle)?;
        }
        Ok(())
    }
}

impl RecordHandler<Positions> for Move {
    fn undo(&mut self, data: &RecordData, target: &mut Positions) -> EditActionResult {
        Self::apply(data, 0, target)
    }

    fn redo(&mut self, data: &RecordData, target: &mut Positions) -> EditActionResult {
        Self::apply(data, 1, target)
    }
}

fn fill(
    history: &mut HistoryStack<Positions>,
    target: &mut Positions,
    objects: usize,
    steps: usize,
) {
    let mut alloc = HandleAllocator::new();
    let handles: Vec<_> = (0..objects).map(|_| alloc.allocate()).collect();

    for step in 0..steps {
        let record = history.append("Move objects", target);
        record.data_mut().resize(2);
        for h in &handles {
            let before = target.values[h.index() as usize];
            let after = before + Vec3::new(step as f32, 0.0, 0.0);
            record.data_mut().set(0, *h, before);
            record.data_mut().set(1, *h, after);
            target.values[h.index() as usize] = after;
        }
        record.set_handler(Move);
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

fn bench_append_bounded(c: &mut Criterion) {
    c.bench_function("append_1000_steps_8_objects_bounded", |b| {
        b.iter(|| {
            let mut target = Positions {
                values: vec![Vec3::zeros(); 8],
            };
            let mut history = HistoryStack::new(HistoryConfig::default());
            fill(&mut history, &mut target, black_box(8), black_box(1000));
            history.clear(&mut target);
        });
    });
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

fn bench_undo_redo_sweep(c: &mut Criterion) {
    let mut target = Positions {
        values: vec![Vec3::zeros(); 64],
    };
    let mut history = HistoryStack::new(HistoryConfig::unbounded());
    fill(&mut history, &mut target, 64, 200);

    c.bench_function("undo_redo_sweep_200_steps_64_objects", |b| {
        b.iter(|| {
            while history.undo(&mut target).unwrap_or(false) {}
            while history.redo(&mut target).unwrap_or(false) {}
        });
    });
    history.clear(&mut target);
}

fn bench_has_object(c: &mut Criterion) {
    let mut target = Positions {
        values: vec![Vec3::zeros(); 64],
    };
    let mut history = HistoryStack::new(HistoryConfig::unbounded());
    fill(&mut history, &mut target, 64, 100);
    let mut alloc = HandleAllocator::new();
    let mut missing = alloc.allocate();
    for _ in 0..64 {
        missing = alloc.allocate();
    }

    c.bench_function("references_miss_100_records", |b| {
        b.iter(|| history.references(black_box(missing)));
    });
    history.clear(&mut target);
}

criterion_group!(
    benches,
    bench_append_bounded,
    bench_undo_redo_sweep,
    bench_has_object,
);
criterion_main!(benches);
