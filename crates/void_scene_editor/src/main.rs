//! Headless scene editor driver.
//!
//! Opens a small demo scene, selects the object under the viewport center,
//! moves it through the command log, then undoes and redoes the move.
//! Pass a TOML config path as the first argument to override the defaults.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use void_math::{Transform, Vec3};
use void_scene_editor::scene::{colors, Material, Mesh};
use void_scene_editor::{
    BuiltinTemplates, EditorConfig, EditorContext, Light, LightKind, LoggingObserver, ModelNode,
};

const FRAME_DT: f32 = 1.0 / 60.0;

fn demo_model() -> ModelNode {
    let cube = Arc::new(Mesh::cuboid(Vec3::ONE));
    ModelNode::node("Demo")
        .with_child(ModelNode::geometry(
            "Crate",
            cube.clone(),
            Material::unlit("Crate", colors::WHITE),
        ))
        .with_child(
            ModelNode::geometry("Pillar", cube, Material::unresolved("pillar.mat"))
                .with_transform(Transform::from_translation(Vec3::new(6.0, 0.0, -4.0))),
        )
}

fn main() -> void_scene_editor::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(EditorConfig::default_path);
    let config = match config_path {
        Some(path) => EditorConfig::load_or_default(&path),
        None => EditorConfig::default(),
    };

    let mut context = EditorContext::new(config, Box::new(BuiltinTemplates), Box::new(LoggingObserver))?;
    let editor = context.editor().clone();

    editor.open_model(demo_model())?;
    editor.add_light(
        Light::new(LightKind::Point).with_transform(Transform::from_translation(Vec3::new(-3.0, 4.0, 0.0))),
    )?;
    context.run_frame(FRAME_DT);

    let (width, height) = {
        let camera = context.render().camera();
        (camera.width, camera.height)
    };
    editor.select_at(width * 0.5, height * 0.5)?;
    context.run_frame(FRAME_DT);

    let Some(selected) = context.render().selection().primary() else {
        log::warn!("Nothing under the viewport center");
        return Ok(());
    };

    editor.set_transform(selected, Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)))?;
    context.run_frame(FRAME_DT);
    editor.undo()?;
    context.run_frame(FRAME_DT);
    editor.redo()?;
    context.run_frame(FRAME_DT);

    let history = context.ui().history();
    log::info!(
        "History: {} undoable, {} redoable, next undo {:?}",
        history.undo_count(),
        history.redo_count(),
        history.undo_description()
    );

    // Same editor, one thread per context
    let running = context.spawn(Duration::from_millis(16))?;
    running.editor().move_camera_to(Vec3::new(2.0, 0.0, 0.0))?;
    running.editor().close_document()?;
    let (render, _ui) = running.shutdown()?;
    log::info!("Shut down with {} scene nodes", render.graph().len());

    Ok(())
}
