//! Integration tests for the thread bridge and the context runners

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use void_math::{Transform, Vec3};
use void_scene_editor::scene::{colors, Material, Mesh};
use void_scene_editor::*;

const WAIT: Duration = Duration::from_secs(5);

fn journal() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn test_render_and_ui_tasks_run_on_their_own_context() {
    let mut context = EditorContext::with_defaults().unwrap();
    let bridge = context.editor().bridge().clone();
    let log = journal();

    for i in 0..3 {
        let log = log.clone();
        bridge
            .schedule_on_render("render_step", move |_ctx| {
                log.lock().push(format!("render {i}"));
                Ok(())
            })
            .unwrap();
    }
    let ui_log = log.clone();
    bridge
        .schedule_on_ui("ui_step", move |_ui| {
            ui_log.lock().push("ui".to_string());
            Ok(())
        })
        .unwrap();

    // Nothing runs until the owning context drains its queue
    assert_eq!(context.render_mut().pump(), 3);
    assert_eq!(*log.lock(), vec!["render 0", "render 1", "render 2"]);
    assert_eq!(context.ui_mut().pump(), 1);
    assert_eq!(log.lock().last().map(String::as_str), Some("ui"));
}

#[test]
fn test_failing_task_does_not_stop_queue() {
    let mut context = EditorContext::with_defaults().unwrap();
    let bridge = context.editor().bridge().clone();
    let log = journal();

    let first = log.clone();
    bridge
        .schedule_on_render("first", move |_ctx| {
            first.lock().push("first".to_string());
            Ok(())
        })
        .unwrap();
    bridge
        .schedule_on_render("missing_node", |ctx| {
            let bogus = ctx.layout().root;
            ctx.graph_mut().remove_subtree(bogus);
            ctx.set_local_transform(bogus, Transform::IDENTITY)
        })
        .unwrap();
    bridge
        .schedule_on_render("panics", |_ctx| panic!("render task blew up"))
        .unwrap();
    let last = log.clone();
    bridge
        .schedule_on_render("last", move |_ctx| {
            last.lock().push("last".to_string());
            Ok(())
        })
        .unwrap();

    context.pump();
    assert_eq!(*log.lock(), vec!["first", "last"]);

    let stats = bridge.render_stats();
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.panicked, 1);
}

#[test]
fn test_render_to_ui_hop_settles_in_one_pump() {
    let mut context = EditorContext::with_defaults().unwrap();
    context
        .editor()
        .open_model(ModelNode::node("scene").with_child(ModelNode::geometry(
            "crate",
            Arc::new(Mesh::cuboid(Vec3::ONE)),
            Material::unlit("crate", colors::WHITE),
        )))
        .unwrap();
    context.pump();
    let root = context.render().current_model().unwrap();

    let picked = Arc::new(Mutex::new(None));
    let reply = picked.clone();
    context
        .editor()
        .pick_scene_object_at(640.0, 360.0, move |_ui, node| {
            *reply.lock() = Some(node);
        })
        .unwrap();
    context.pump();

    assert_eq!(*picked.lock(), Some(Some(root)));
}

#[test]
fn test_runner_threads_own_contexts() {
    let running = EditorContext::with_defaults()
        .unwrap()
        .spawn(Duration::from_millis(5))
        .unwrap();
    let (tx, rx) = bounded(2);

    let render_tx = tx.clone();
    running
        .editor()
        .bridge()
        .schedule_on_render("thread_name", move |_ctx| {
            let _ = render_tx.send(thread::current().name().map(str::to_string));
            Ok(())
        })
        .unwrap();
    running
        .editor()
        .bridge()
        .schedule_on_ui("thread_name", move |_ui| {
            let _ = tx.send(thread::current().name().map(str::to_string));
            Ok(())
        })
        .unwrap();

    let mut names = vec![
        rx.recv_timeout(WAIT).unwrap().unwrap(),
        rx.recv_timeout(WAIT).unwrap().unwrap(),
    ];
    names.sort();
    assert_eq!(names, vec!["void-render", "void-ui"]);

    running.shutdown().unwrap();
}

#[test]
fn test_shutdown_runs_queued_work_first() {
    let running = EditorContext::with_defaults()
        .unwrap()
        .spawn(Duration::from_millis(5))
        .unwrap();
    let light = Light::new(LightKind::Directional);
    running.editor().add_light(light.clone()).unwrap();

    let (render, _ui) = running.shutdown().unwrap();
    assert!(render.proxies().find_by_entity(light.key).is_some());
}

#[test]
fn test_full_queue_rejects_without_blocking() {
    let mut config = EditorConfig::default();
    config.bridge.render_queue_capacity = 2;
    let context = EditorContext::new(config, Box::new(BuiltinTemplates), Box::new(NullObserver)).unwrap();
    let editor = context.editor();

    editor.set_show_grid(false).unwrap();
    editor.set_show_grid(true).unwrap();
    let err = editor.set_show_grid(false).unwrap_err();
    assert!(matches!(err, EditorError::QueueFull("render")));
    assert_eq!(editor.bridge().render_stats().rejected, 1);
}
