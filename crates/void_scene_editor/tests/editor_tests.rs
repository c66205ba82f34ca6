//! Integration tests for void_scene_editor
//!
//! Drives the editor through its facade with both contexts pumped on the
//! test thread.

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;

use parking_lot::Mutex;
use void_math::{BoundingSphere, BoundingVolume, Quat, Ray, Transform, Vec3};
use void_scene_editor::editing::{EditingControl, EditingInput};
use void_scene_editor::proxy::LIGHT_TINT_GEOMETRY;
use void_scene_editor::scene::{colors, Color, Material, Mesh, NodeKind, SceneGraph};
use void_scene_editor::*;

const DT: f32 = 1.0 / 60.0;

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Selected(Option<NodeId>),
    Applied(NodeId, Transform, Transform),
    Changed(NodeId, Transform),
    ModelOpened(NodeId),
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Event>>>);

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }
}

impl EditorObserver for Recorder {
    fn on_object_selected(&mut self, node: Option<NodeId>) {
        self.0.lock().push(Event::Selected(node));
    }

    fn on_transform_applied(&mut self, node: NodeId, old: Transform, new: Transform) {
        self.0.lock().push(Event::Applied(node, old, new));
    }

    fn on_transform_changed(&mut self, node: NodeId, transform: Transform) {
        self.0.lock().push(Event::Changed(node, transform));
    }

    fn on_model_opened(&mut self, root: NodeId) {
        self.0.lock().push(Event::ModelOpened(root));
    }
}

fn editor_with_recorder() -> (EditorContext, Recorder) {
    let recorder = Recorder::default();
    let context = EditorContext::new(
        EditorConfig::default(),
        Box::new(BuiltinTemplates),
        Box::new(recorder.clone()),
    )
    .unwrap();
    (context, recorder)
}

fn cube(name: &str) -> ModelNode {
    ModelNode::geometry(
        name,
        Arc::new(Mesh::cuboid(Vec3::ONE)),
        Material::unlit(name, colors::WHITE),
    )
}

/// Open a model and return the scene node of the named part.
fn open(context: &mut EditorContext, model: ModelNode, part: &str) -> NodeId {
    context.editor().open_model(model).unwrap();
    context.run_frame(DT);
    let root = context.render().current_model().unwrap();
    context.render().graph().find_by_name(root, part).unwrap()
}

// ============================================================================
// Proxies
// ============================================================================

#[test]
fn test_light_proxy_is_created_once() {
    let (mut context, _) = editor_with_recorder();
    let light = Light::new(LightKind::Point);

    context.editor().add_light(light.clone()).unwrap();
    context.editor().add_light(light.clone()).unwrap();
    context.run_frame(DT);

    assert_eq!(context.render().proxies().len(), 1);
    assert!(context.render().proxies().find_by_entity(light.key).is_some());
}

#[test]
fn test_light_proxy_scale_tint_and_removal() {
    let (mut context, _) = editor_with_recorder();
    let red = Color::new(1.0, 0.0, 0.0, 1.0);
    let light = Light::new(LightKind::Spot)
        .with_color(red)
        .with_transform(Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)));

    context.editor().add_light(light.clone()).unwrap();
    context.run_frame(DT);

    let entry = context.render().proxies().find_by_entity(light.key).unwrap().clone();
    let graph = context.render().graph();
    let visual = graph.local_transform(entry.visual_model()).unwrap();
    assert_eq!(visual.scale, Vec3::splat(0.01));
    assert_eq!(visual.translation, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(tint_of(graph, entry.visual_model()), Some(red));

    let blue = Color::new(0.0, 0.0, 1.0, 1.0);
    context
        .editor()
        .notify_property_changed(light.clone().with_color(blue).into())
        .unwrap();
    context.run_frame(DT);
    assert_eq!(tint_of(context.render().graph(), entry.visual_model()), Some(blue));

    context.editor().remove_light(light.key).unwrap();
    context.run_frame(DT);
    assert!(context.render().proxies().is_empty());
    assert!(!context.render().graph().contains(entry.proxy_node()));
    assert!(!context.render().graph().contains(entry.visual_model()));
}

fn tint_of(graph: &SceneGraph, visual: NodeId) -> Option<Color> {
    let geometry = graph.find_by_name(visual, LIGHT_TINT_GEOMETRY)?;
    graph.kind(geometry)?.geometry().map(|g| g.material.color)
}

#[test]
fn test_gizmo_moves_light_entity() {
    let (mut context, _) = editor_with_recorder();
    let light = Light::new(LightKind::Point);
    context.editor().add_light(light.clone()).unwrap();
    context.run_frame(DT);
    let proxy = context.render().proxies().find_by_entity(light.key).unwrap().proxy_node();

    context
        .render_mut()
        .set_local_transform(proxy, Transform::from_translation(Vec3::new(0.0, 0.0, 4.0)))
        .unwrap();
    context.run_frame(DT);

    let written = context.render().proxies().entity_transform(light.key).unwrap();
    assert_eq!(written.translation, Vec3::new(0.0, 0.0, 4.0));
}

#[test]
fn test_presentable_hidden_until_selected() {
    let (mut context, _) = editor_with_recorder();
    let marker = Presentable::new(Presentation::Box);
    context.editor().add_presentable(marker.clone()).unwrap();
    context.run_frame(DT);

    let entry = context.render().proxies().find_by_entity(marker.key).unwrap().clone();
    assert!(!context.render().graph().is_visible(entry.visual_model()));

    context.editor().update_selection(vec![entry.proxy_node()]).unwrap();
    context.run_frame(DT);
    assert!(context.render().graph().is_visible(entry.visual_model()));

    context.editor().update_selection(Vec::new()).unwrap();
    context.run_frame(DT);
    assert!(!context.render().graph().is_visible(entry.visual_model()));
}

#[test]
fn test_show_lights_and_audio_detach_proxy_visuals() {
    let (mut context, _) = editor_with_recorder();
    let light = Light::new(LightKind::Point);
    let speaker = AudioSource::new("rain");
    context.editor().add_light(light.clone()).unwrap();
    context.editor().add_audio_source(speaker.clone()).unwrap();
    context.run_frame(DT);

    let layout = *context.render().layout();
    let light_visual = context.render().proxies().find_by_entity(light.key).unwrap().visual_model();
    let audio_visual = context.render().proxies().find_by_entity(speaker.key).unwrap().visual_model();
    let in_scene = |context: &EditorContext, node: NodeId| context.render().graph().is_descendant_of(node, layout.root);
    assert!(in_scene(&context, light_visual));
    assert!(in_scene(&context, audio_visual));

    context.editor().set_show_lights(false).unwrap();
    context.editor().set_show_audio(false).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().parent(layout.lights), None);
    assert_eq!(context.render().graph().parent(layout.audio), None);
    assert!(!in_scene(&context, light_visual));
    assert!(!in_scene(&context, audio_visual));
    // Proxies survive while hidden
    assert_eq!(context.render().proxies().len(), 2);

    context.editor().set_show_lights(true).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().parent(layout.lights), Some(layout.model_root));
    assert!(in_scene(&context, light_visual));
    assert!(!in_scene(&context, audio_visual));

    context.editor().set_show_audio(true).unwrap();
    context.run_frame(DT);
    assert!(in_scene(&context, audio_visual));
}

#[test]
fn test_pick_light_visual_resolves_to_entity() {
    let (mut context, _) = editor_with_recorder();
    let light = Light::new(LightKind::Point).with_transform(Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));
    context.editor().add_light(light.clone()).unwrap();
    context.run_frame(DT);
    let entry = context.render().proxies().find_by_entity(light.key).unwrap().clone();

    // Bulb radius is 25 * 0.01 around (3, 0, 0)
    let toward_bulb = Ray::new(Vec3::new(3.03, 0.02, 10.0), Vec3::NEG_Z);
    let picked = context.render_mut().select_with_ray(&toward_bulb);
    assert_eq!(picked, Some(entry.proxy_node()));
    assert_eq!(context.render().selection().primary(), Some(entry.proxy_node()));

    let proxies = context.render().proxies();
    assert_eq!(proxies.find_by_proxy(entry.proxy_node()).map(DomainEntity::key), Some(light.key));
    assert_eq!(proxies.find_by_proxy(entry.visual_model()).map(DomainEntity::key), Some(light.key));

    // Hidden lights cannot be picked
    context.editor().set_show_lights(false).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().pick_object(&toward_bulb), None);
}

// ============================================================================
// Selection & picking
// ============================================================================

#[test]
fn test_outlines_follow_selection() {
    let (mut context, _) = editor_with_recorder();
    let a = open(
        &mut context,
        ModelNode::node("scene")
            .with_child(cube("a"))
            .with_child(cube("b").with_transform(Transform::from_translation(Vec3::X * 4.0))),
        "a",
    );
    let root = context.render().current_model().unwrap();
    let b = context.render().graph().find_by_name(root, "b").unwrap();

    context.editor().update_selection(vec![a, b]).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().selection().attached_outlines(context.render().graph()).len(), 2);

    context.editor().update_selection(vec![b]).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().selection().attached_outlines(context.render().graph()).len(), 1);
    assert_eq!(context.render().selection().primary(), Some(b));

    context.editor().set_show_selection(false).unwrap();
    context.run_frame(DT);
    assert!(context.render().selection().attached_outlines(context.render().graph()).is_empty());

    context.editor().set_show_selection(true).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().selection().attached_outlines(context.render().graph()).len(), 1);
}

#[test]
fn test_group_outline_is_box_of_children() {
    let (mut context, _) = editor_with_recorder();
    let group = open(
        &mut context,
        ModelNode::node("scene").with_child(ModelNode::node("A").with_child(cube("inner"))),
        "A",
    );

    context.editor().update_selection(vec![group]).unwrap();
    context.run_frame(DT);

    let outline = context.render().selection().entries()[0].outline().unwrap();
    let geometry = context.render().graph().kind(outline).and_then(NodeKind::geometry).unwrap();
    match geometry.mesh.bound() {
        BoundingVolume::Box(aabb) => {
            assert_eq!(aabb.min, Vec3::splat(-1.0));
            assert_eq!(aabb.max, Vec3::splat(1.0));
        }
        other => panic!("expected a box outline, got {other:?}"),
    }
}

#[test]
fn test_light_outline_is_sphere_of_visual() {
    let (mut context, _) = editor_with_recorder();
    let light = Light::new(LightKind::Point).with_transform(Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
    context.editor().add_light(light.clone()).unwrap();
    context.run_frame(DT);
    let entry = context.render().proxies().find_by_entity(light.key).unwrap().clone();

    context.editor().update_selection(vec![entry.proxy_node()]).unwrap();
    context.run_frame(DT);

    let render = context.render();
    let outline = render.selection().entries()[0].outline().unwrap();
    let geometry = render.graph().kind(outline).and_then(NodeKind::geometry).unwrap();
    assert_eq!(
        *geometry.mesh.bound(),
        BoundingVolume::Sphere(BoundingSphere::new(Vec3::ZERO, 25.0))
    );
    assert!(geometry.material.wireframe);

    // Drawn where the visual is, at the visual's scale
    let placed = render.graph().local_transform(outline).unwrap();
    let visual = render.graph().world_transform(entry.visual_model()).unwrap();
    assert_eq!(placed, visual);
    assert!((placed.scale - Vec3::splat(0.01)).length() < 1e-6);
}

#[test]
fn test_select_at_screen_center_picks_model() {
    let (mut context, recorder) = editor_with_recorder();
    open(&mut context, ModelNode::node("scene").with_child(cube("crate")), "crate");
    let root = context.render().current_model().unwrap();

    context.editor().select_at(640.0, 360.0).unwrap();
    context.run_frame(DT);

    // Parts of a loaded model select the model root
    assert_eq!(context.render().selection().primary(), Some(root));
    assert!(recorder.events().contains(&Event::Selected(Some(root))));

    // Empty sky clears the selection
    context.editor().select_at(640.0, 0.0).unwrap();
    context.run_frame(DT);
    assert!(context.render().selection().is_empty());
    assert!(recorder.events().contains(&Event::Selected(None)));
}

#[test]
fn test_pick_scene_position_prefers_model_then_grid() {
    let (mut context, _) = editor_with_recorder();
    open(&mut context, ModelNode::node("scene").with_child(cube("crate")), "crate");
    let render = context.render();

    let down_on_model = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
    let hit = render.scene_position(&down_on_model);
    assert!((hit - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-4);

    let down_on_grid = Ray::new(Vec3::new(4.0, 10.0, 3.0), Vec3::NEG_Y);
    let hit = render.scene_position(&down_on_grid);
    assert!((hit - Vec3::new(4.0, 0.0, 3.0)).length() < 1e-4);

    let up = Ray::new(Vec3::new(4.0, 10.0, 3.0), Vec3::Y);
    assert_eq!(render.scene_position(&up), Vec3::ZERO);
}

#[test]
fn test_invalid_material_replaced_on_open() {
    let (mut context, recorder) = editor_with_recorder();
    let broken = open(
        &mut context,
        ModelNode::node("scene").with_child(ModelNode::geometry(
            "broken",
            Arc::new(Mesh::cuboid(Vec3::ONE)),
            Material::unresolved("missing.mat"),
        )),
        "broken",
    );

    let geometry = context.render().graph().kind(broken).and_then(NodeKind::geometry).unwrap();
    assert_eq!(geometry.material, Material::default());
    let root = context.render().current_model().unwrap();
    assert!(recorder.events().contains(&Event::ModelOpened(root)));
}

// ============================================================================
// Transform tool
// ============================================================================

/// Target cube at the origin, camera on +Z looking at it, target selected.
fn drag_fixture() -> (EditorContext, Recorder, NodeId) {
    drag_fixture_with(Transform::IDENTITY)
}

fn drag_fixture_with(transform: Transform) -> (EditorContext, Recorder, NodeId) {
    let (mut context, recorder) = editor_with_recorder();
    let target = open(
        &mut context,
        ModelNode::node("scene").with_child(cube("target").with_transform(transform)),
        "target",
    );
    context
        .editor()
        .set_camera(Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO))
        .unwrap();
    context.editor().update_selection(vec![target]).unwrap();
    context.run_frame(DT);
    (context, recorder, target)
}

#[test]
fn test_gizmo_miss_stays_idle() {
    let (mut context, _, target) = drag_fixture();
    let before = context.render().graph().local_transform(target).unwrap();

    let miss = Ray::new(Vec3::new(-8.0, 8.0, 10.0), Vec3::NEG_Z);
    assert!(!context.render_mut().begin_transform(&miss));
    assert_eq!(context.render().gizmo().phase(), GizmoPhase::Idle);

    context.render_mut().drag_transform(&miss);
    assert!(context.render_mut().end_transform().is_none());
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(before));
    assert!(!context.ui().history().can_undo());
}

#[test]
fn test_move_drag_undo_redo() {
    let (mut context, recorder, target) = drag_fixture();
    let old = context.render().graph().local_transform(target).unwrap();

    // Overlay scale is 1.5 at distance 10: x = 1 lands on the X arrow
    let render = context.render_mut();
    assert!(render.begin_transform(&Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z)));
    assert_eq!(render.gizmo().phase(), GizmoPhase::Armed);
    assert_eq!(render.drag_transform(&Ray::new(Vec3::new(6.0, 2.0, 10.0), Vec3::NEG_Z)), GizmoPhase::Active);

    let applied = render.end_transform().unwrap();
    assert_eq!(applied.target, target);
    assert_eq!(applied.kind, TransformKind::Move);
    assert_eq!(applied.old, old);
    assert!((applied.new.translation - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
    context.run_frame(DT);

    assert!(recorder
        .events()
        .contains(&Event::Applied(target, applied.old, applied.new)));
    assert_eq!(context.ui().history().undo_description(), Some("Move"));
    assert_eq!(context.render().graph().local_transform(target), Some(applied.new));

    context.editor().undo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(old));
    assert_eq!(recorder.events().last(), Some(&Event::Changed(target, old)));

    context.editor().redo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(applied.new));

    context.editor().undo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(old));
}

/// Pixel where a world point is drawn.
fn screen_of(context: &EditorContext, world: Vec3) -> (f32, f32) {
    let camera = context.render().camera();
    let ndc = camera.view_projection().project_point3(world);
    ((ndc.x + 1.0) * 0.5 * camera.width, (1.0 - ndc.y) * 0.5 * camera.height)
}

/// Press on `from`, drag to `to` and release, all through the facade.
fn pointer_drag(context: &mut EditorContext, from: Vec3, to: Vec3) {
    let editor = context.editor().clone();
    let (fx, fy) = screen_of(context, from);
    let (tx, ty) = screen_of(context, to);

    editor.pointer_pressed(PointerButton::Primary, fx, fy, false).unwrap();
    editor.pointer_moved(tx, ty).unwrap();
    context.run_frame(DT);
    editor.pointer_released(PointerButton::Primary, tx, ty, false).unwrap();
    context.run_frame(DT);
}

fn last_applied(recorder: &Recorder) -> (NodeId, Transform, Transform) {
    recorder
        .events()
        .into_iter()
        .rev()
        .find_map(|event| match event {
            Event::Applied(node, old, new) => Some((node, old, new)),
            _ => None,
        })
        .expect("no transform applied")
}

/// Undo and redo must restore both states bit for bit.
fn assert_undo_redo_exact(context: &mut EditorContext, target: NodeId, old: Transform, new: Transform) {
    context.editor().undo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(old));

    context.editor().redo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(new));

    context.editor().undo().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(old));
}

#[test]
fn test_rotate_drag_undo_redo() {
    let (mut context, recorder, target) = drag_fixture();
    context.editor().set_transform_tool_kind(TransformKind::Rotate).unwrap();
    context.run_frame(DT);
    let before = context.render().graph().local_transform(target).unwrap();

    // Overlay scale 1.5: the Z ring passes through (1.5, 0, 0); a quarter
    // turn brings it to (0, 1.5, 0)
    pointer_drag(&mut context, Vec3::new(1.5, 0.0, 0.0), Vec3::new(0.0, 1.5, 0.0));

    let (node, old, new) = last_applied(&recorder);
    assert_eq!(node, target);
    assert_eq!(old, before);
    assert!((new.rotation * Vec3::X - Vec3::Y).length() < 1e-3);
    assert_eq!(new.translation, before.translation);
    assert_eq!(new.scale, before.scale);
    assert_eq!(context.render().gizmo().phase(), GizmoPhase::Idle);
    assert_eq!(context.ui().history().undo_description(), Some("Rotate"));
    assert_eq!(context.render().graph().local_transform(target), Some(new));

    assert_undo_redo_exact(&mut context, target, old, new);
}

#[test]
fn test_scale_drag_undo_redo() {
    let (mut context, recorder, target) = drag_fixture();
    context.editor().set_transform_tool_kind(TransformKind::Scale).unwrap();
    context.run_frame(DT);

    // One overlay length (1.5) along X doubles the X scale
    pointer_drag(&mut context, Vec3::new(1.2, 0.0, 0.0), Vec3::new(2.7, 0.5, 0.0));

    let (node, old, new) = last_applied(&recorder);
    assert_eq!(node, target);
    assert!((new.scale.x - 2.0).abs() < 1e-3);
    assert_eq!(new.scale.y, old.scale.y);
    assert_eq!(new.scale.z, old.scale.z);
    assert_eq!(new.translation, old.translation);
    assert_eq!(context.ui().history().undo_description(), Some("Scale"));

    assert_undo_redo_exact(&mut context, target, old, new);
}

#[test]
fn test_local_space_move_follows_target_axes() {
    let turned = Transform::IDENTITY.with_rotation(Quat::from_rotation_z(FRAC_PI_4));
    let (mut context, recorder, target) = drag_fixture_with(turned);
    let local_x = turned.rotation * Vec3::X;
    let editor = context.editor().clone();

    // In global space nothing sits on the target's diagonal X axis
    let (px, py) = screen_of(&context, local_x * 1.2);
    editor.pointer_pressed(PointerButton::Primary, px, py, false).unwrap();
    context.pump();
    assert_eq!(context.render().gizmo().phase(), GizmoPhase::Idle);
    editor.pointer_released(PointerButton::Primary, px, py, false).unwrap();

    editor.set_coordinate_space(CoordinateSpace::Local).unwrap();
    context.run_frame(DT);
    editor.pointer_pressed(PointerButton::Primary, px, py, false).unwrap();
    context.pump();
    let session = context.render().gizmo().session().unwrap();
    assert_eq!(session.picked_axis, PickedAxis::X);
    assert_eq!(session.space, CoordinateSpace::Local);
    editor.pointer_released(PointerButton::Primary, px, py, false).unwrap();
    context.run_frame(DT);

    // Sideways pointer motion is projected out
    let sideways = Vec3::new(-0.5, 0.5, 0.0);
    pointer_drag(&mut context, local_x * 1.2, local_x * 4.2 + sideways);

    let (node, old, new) = last_applied(&recorder);
    assert_eq!(node, target);
    assert!((new.translation - local_x * 3.0).length() < 1e-3);
    assert_eq!(new.rotation, old.rotation);
    assert_undo_redo_exact(&mut context, target, old, new);
}

#[test]
fn test_inverted_gizmo_scale_range_rejected_at_startup() {
    let mut config = EditorConfig::default();
    config.gizmo.min_scale = 5.0;
    config.gizmo.max_scale = 1.0;

    let result = EditorContext::new(config, Box::new(BuiltinTemplates), Box::new(NullObserver));
    assert!(matches!(result, Err(EditorError::Config(_))));
}

#[test]
fn test_cancel_restores_original() {
    let (mut context, _, target) = drag_fixture();
    let old = context.render().graph().local_transform(target).unwrap();

    let render = context.render_mut();
    assert!(render.begin_transform(&Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z)));
    render.drag_transform(&Ray::new(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z));
    context.run_frame(DT);
    assert_ne!(context.render().graph().local_transform(target), Some(old));

    context.editor().cancel_transform().unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().local_transform(target), Some(old));
    assert_eq!(context.render().gizmo().phase(), GizmoPhase::Idle);
    assert!(!context.ui().history().can_undo());
}

#[test]
fn test_tool_swap_keeps_single_gizmo() {
    let (mut context, _, _) = drag_fixture();

    for kind in [TransformKind::Rotate, TransformKind::Scale, TransformKind::Move] {
        context.editor().set_transform_tool_kind(kind).unwrap();
        context.run_frame(DT);
        let render = context.render();
        assert_eq!(render.gizmo().kind(), kind);
        assert_eq!(render.gizmo().attached_gizmos(render.graph()), 1);
    }
}

#[test]
fn test_tool_swap_ignored_during_drag() {
    let (mut context, _, _) = drag_fixture();

    let render = context.render_mut();
    assert!(render.begin_transform(&Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z)));
    render.drag_transform(&Ray::new(Vec3::new(2.0, 0.0, 10.0), Vec3::NEG_Z));
    assert!(!render.set_transform_kind(TransformKind::Scale).unwrap());
    assert_eq!(render.gizmo().kind(), TransformKind::Move);
}

#[test]
fn test_transform_tool_attached_only_with_selection() {
    let (mut context, _, _) = drag_fixture();
    let layout = *context.render().layout();
    assert_eq!(context.render().graph().parent(layout.transform_tool), Some(layout.tool_root));

    context.editor().update_selection(Vec::new()).unwrap();
    context.run_frame(DT);
    assert_eq!(context.render().graph().parent(layout.transform_tool), None);
}

// ============================================================================
// Editing mode & document
// ============================================================================

struct Strokes(Arc<Mutex<Vec<String>>>);

impl EditingControl for Strokes {
    fn start_editing(&mut self, _graph: &mut SceneGraph, _point: Vec3, input: EditingInput) {
        self.0.lock().push(format!("start {input:?}"));
    }

    fn update_editing(&mut self, _graph: &mut SceneGraph, _point: Vec3) {}

    fn finish_editing(&mut self, _graph: &mut SceneGraph, _point: Vec3, input: EditingInput) {
        self.0.lock().push(format!("finish {input:?}"));
    }
}

#[test]
fn test_editing_mode_routes_pointer_to_control() {
    let (mut context, _, _) = drag_fixture();
    let strokes = Arc::new(Mutex::new(Vec::new()));
    let editor = context.editor().clone();

    editor.set_editing_control(Some(Box::new(Strokes(strokes.clone())))).unwrap();
    editor.change_editing_mode(true).unwrap();
    editor.pointer_pressed(PointerButton::Secondary, 640.0, 360.0, true).unwrap();
    editor.pointer_released(PointerButton::Secondary, 640.0, 360.0, true).unwrap();
    context.run_frame(DT);

    assert_eq!(*strokes.lock(), vec!["start SecondaryWithCtrl", "finish SecondaryWithCtrl"]);
    let layout = *context.render().layout();
    assert_eq!(context.render().graph().parent(layout.cursor), Some(layout.tool_root));
    assert_eq!(context.render().graph().parent(layout.transform_tool), None);
}

#[test]
fn test_close_document_clears_everything() {
    let (mut context, _, _) = drag_fixture();
    context.editor().add_audio_source(AudioSource::new("wind")).unwrap();
    context
        .editor()
        .set_transform(
            context.render().selection().primary().unwrap(),
            Transform::from_translation(Vec3::Y),
        )
        .unwrap();
    context.run_frame(DT);
    assert!(context.ui().history().can_undo());

    context.editor().close_document().unwrap();
    context.run_frame(DT);

    assert!(context.render().current_model().is_none());
    assert!(context.render().proxies().is_empty());
    assert!(context.render().selection().is_empty());
    assert!(!context.ui().history().can_undo());
}
