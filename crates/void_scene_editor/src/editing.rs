//! Editing mode: pointer input routed to an external editing control
//! (terrain brush, painter) instead of the transform tool.

use void_math::Vec3;

use crate::scene::SceneGraph;

/// Input that started an editing stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditingInput {
    Primary,
    Secondary,
    SecondaryWithCtrl,
}

/// Receiver of editing strokes on the render context.
pub trait EditingControl: Send {
    fn start_editing(&mut self, graph: &mut SceneGraph, point: Vec3, input: EditingInput);

    fn update_editing(&mut self, graph: &mut SceneGraph, point: Vec3);

    fn finish_editing(&mut self, graph: &mut SceneGraph, point: Vec3, input: EditingInput);
}

/// Editing mode switch and the stroke in progress.
#[derive(Default)]
pub struct EditingState {
    enabled: bool,
    control: Option<Box<dyn EditingControl>>,
    current_input: Option<EditingInput>,
}

impl EditingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops any stroke in progress without finishing it.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.current_input = None;
        }
    }

    pub fn set_control(&mut self, control: Option<Box<dyn EditingControl>>) {
        self.control = control;
        self.current_input = None;
    }

    pub fn has_control(&self) -> bool {
        self.control.is_some()
    }

    pub fn is_editing(&self) -> bool {
        self.current_input.is_some()
    }

    pub fn current_input(&self) -> Option<EditingInput> {
        self.current_input
    }

    /// Start a stroke. Ignored when disabled, without a control, or while
    /// another stroke is running.
    pub fn start(&mut self, graph: &mut SceneGraph, point: Vec3, input: EditingInput) -> bool {
        if !self.enabled || self.current_input.is_some() {
            return false;
        }
        let Some(control) = self.control.as_mut() else {
            return false;
        };
        control.start_editing(graph, point, input);
        self.current_input = Some(input);
        true
    }

    pub fn update(&mut self, graph: &mut SceneGraph, point: Vec3) {
        if self.current_input.is_none() {
            return;
        }
        if let Some(control) = self.control.as_mut() {
            control.update_editing(graph, point);
        }
    }

    /// Finish the stroke. An input other than the one that started it is
    /// ignored.
    pub fn finish(&mut self, graph: &mut SceneGraph, point: Vec3, input: EditingInput) -> bool {
        if self.current_input != Some(input) {
            return false;
        }
        self.current_input = None;
        if let Some(control) = self.control.as_mut() {
            control.finish_editing(graph, point, input);
        }
        true
    }
}
