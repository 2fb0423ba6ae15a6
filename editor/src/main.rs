use std::path::PathBuf;

use clap::Parser;
use gantry_editor::history_panel::render_history;
use gantry_editor::scene::{Camera, GameObject};
use gantry_editor::{EditorError, EditorSession, settings};

/// Headless Gantry editor session.
#[derive(Parser, Debug)]
#[command(
    name = "gantry-editor",
    about = "Runs a scripted editing session and prints its undo history",
    version
)]
struct Args {
    /// Settings file to load.
    #[arg(long, default_value = "editor.toml")]
    settings: PathBuf,

    /// Override the history depth from the settings file (0 = unbounded).
    #[arg(long)]
    max_undo: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = settings::load_or_default(&args.settings);
    if let Some(max_undo) = args.max_undo {
        settings.history.max_undo = max_undo;
    }
    let mut session = EditorSession::new(settings);

    if let Err(e) = run_demo(&mut session) {
        log::error!("Demo session failed: {e}");
        std::process::exit(1);
    }
}

/// Scripted session exercising record, coalesce, undo and redo.
fn run_demo(session: &mut EditorSession) -> Result<(), EditorError> {
    let camera = session.create_object(GameObject::new("Camera").with_camera(Camera::default()))?;
    let cube = session.create_object(GameObject::new("Cube"))?;
    session.rename(cube, "Crate")?;
    session.set_tags(cube, vec!["prop".into(), "static".into()])?;

    session.begin_drag();
    for fov in [62.0, 68.0, 75.0] {
        session.set_camera_fov(camera, fov)?;
    }
    session.end_drag();

    session.delete_objects(&[cube])?;
    session.undo()?;
    session.undo()?;
    session.redo()?;

    let menu = session.edit_menu();
    log::info!("{} | {} | {}", session.title(), menu.undo.label, menu.redo.label);
    print!("{}", render_history(session.history()));
    Ok(())
}
