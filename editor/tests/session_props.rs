//! Property tests: random edit scripts against a session.

use gantry_editor::scene::{GameObject, Scene};
use gantry_editor::{EditorSession, EditorSettings};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Rename(usize, String),
    Toggle(usize),
    Create,
    Delete(usize),
    Undo,
    Redo,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0..4usize, "[a-z]{1,6}").prop_map(|(i, n)| Step::Rename(i, n)),
        2 => (0..4usize).prop_map(Step::Toggle),
        1 => Just(Step::Create),
        1 => (0..4usize).prop_map(Step::Delete),
        3 => Just(Step::Undo),
        2 => Just(Step::Redo),
    ]
}

/// Names and flags of the attached objects, in root order.
fn snapshot(scene: &Scene) -> Vec<(String, bool)> {
    scene
        .roots()
        .iter()
        .map(|h| {
            let o = scene.get(*h).unwrap();
            (o.name.clone(), o.active)
        })
        .collect()
}

fn run(session: &mut EditorSession, step: &Step) {
    let roots = session.scene().roots().to_vec();
    let pick = |i: usize| roots.get(i % roots.len().max(1)).copied();
    // Edits can legitimately fail (empty scene); only history invariants matter.
    let _ = match step {
        Step::Rename(i, name) => pick(*i).map(|h| session.rename(h, name.as_str()).map(|_| ())),
        Step::Toggle(i) => pick(*i).map(|h| {
            let active = session.scene().get(h).map(|o| o.active).unwrap_or(true);
            session.set_active(&[h], !active).map(|_| ())
        }),
        Step::Create => Some(session.create_object(GameObject::new("new")).map(|_| ())),
        Step::Delete(i) => pick(*i).map(|h| session.delete_objects(&[h]).map(|_| ())),
        Step::Undo => Some(session.undo().map(|_| ())),
        Step::Redo => Some(session.redo().map(|_| ())),
    };
}

proptest! {
    #[test]
    fn undo_everything_restores_initial_scene(
        steps in prop::collection::vec(step_strategy(), 1..40)
    ) {
        let mut scene = Scene::new();
        for name in ["A", "B", "C"] {
            scene.spawn(GameObject::new(name));
        }
        let initial = snapshot(&scene);

        let mut settings = EditorSettings::default();
        settings.history.max_undo = 0;
        let mut session = EditorSession::with_scene(scene, settings);
        for step in &steps {
            run(&mut session, step);
        }

        while session.undo().unwrap() {}
        prop_assert_eq!(snapshot(session.scene()), initial);
        prop_assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn redo_everything_after_undo_everything_is_stable(
        steps in prop::collection::vec(step_strategy(), 1..40)
    ) {
        let mut scene = Scene::new();
        for name in ["A", "B"] {
            scene.spawn(GameObject::new(name));
        }
        let mut session = EditorSession::with_scene(scene, EditorSettings::default());
        for step in &steps {
            run(&mut session, step);
        }
        // Drop the redo tail so "latest" is well defined.
        while session.redo().unwrap() {}
        let latest = snapshot(session.scene());

        while session.undo().unwrap() {}
        while session.redo().unwrap() {}
        prop_assert_eq!(snapshot(session.scene()), latest);
        prop_assert_eq!(session.history().redo_count(), 0);
    }

    #[test]
    fn no_live_object_is_orphaned(
        steps in prop::collection::vec(step_strategy(), 1..40)
    ) {
        let mut settings = EditorSettings::default();
        settings.history.max_undo = 3;
        let mut session = EditorSession::new(settings);
        for name in ["A", "B"] {
            session.create_object(GameObject::new(name)).unwrap();
        }
        for step in &steps {
            run(&mut session, step);
        }
        for h in session.scene().detached() {
            prop_assert!(session.history().references(h));
        }
    }
}
