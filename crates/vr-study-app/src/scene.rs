//! Scene bridges for running without an engine

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use vr_study::study::Direction;
use vr_study::{Cue, Pointer, SceneBridge, Vec2};

/// What a headset would currently be showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneView {
    pub pointer: Option<Pointer>,
    pub pointer_visible: bool,
    pub highlighted: Option<String>,
    pub stimulus_visible: bool,
    pub center_mark_visible: bool,
    pub selection_button_visible: bool,
    pub indicated: Option<Direction>,
    pub calibration_point: Option<Vec2>,
    pub depth_of_field: bool,
    pub focus_distance: Option<i32>,
    pub focus_image: Option<u8>,
    pub last_cue: Option<Cue>,
}

/// Bridge that keeps a [`SceneView`] the runner can draw.
#[derive(Debug, Clone, Default)]
pub struct SharedScene(Rc<RefCell<SceneView>>);

impl SharedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SceneView {
        self.0.borrow().clone()
    }

    fn with(&self, f: impl FnOnce(&mut SceneView)) {
        f(&mut self.0.borrow_mut());
    }
}

impl SceneBridge for SharedScene {
    fn set_pointer(&mut self, pointer: Pointer) {
        self.with(|v| v.pointer = Some(pointer));
    }

    fn set_pointer_visible(&mut self, visible: bool) {
        self.with(|v| v.pointer_visible = visible);
    }

    fn set_highlight(&mut self, region: &str, highlighted: bool) {
        self.with(|v| {
            if highlighted {
                v.highlighted = Some(region.to_string());
            } else if v.highlighted.as_deref() == Some(region) {
                v.highlighted = None;
            }
        });
    }

    fn set_stimulus_visible(&mut self, visible: bool) {
        self.with(|v| v.stimulus_visible = visible);
    }

    fn set_center_mark_visible(&mut self, visible: bool) {
        self.with(|v| v.center_mark_visible = visible);
    }

    fn set_selection_button_visible(&mut self, visible: bool) {
        self.with(|v| v.selection_button_visible = visible);
    }

    fn indicate_target(&mut self, direction: Option<Direction>) {
        self.with(|v| v.indicated = direction);
    }

    fn show_calibration_point(&mut self, target: Option<Vec2>) {
        self.with(|v| v.calibration_point = target);
    }

    fn set_depth_of_field(&mut self, enabled: bool) {
        self.with(|v| v.depth_of_field = enabled);
    }

    fn set_focus_distance(&mut self, distance: i32) {
        self.with(|v| v.focus_distance = Some(distance));
    }

    fn show_focus_image(&mut self, image: u8) {
        self.with(|v| v.focus_image = Some(image));
    }

    fn play_cue(&mut self, cue: Cue) {
        self.with(|v| v.last_cue = Some(cue));
    }
}

/// Bridge that only traces what the scene is asked to do.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingScene;

impl SceneBridge for TracingScene {
    fn set_pointer(&mut self, _pointer: Pointer) {}

    fn set_pointer_visible(&mut self, visible: bool) {
        debug!("scene: pointer visible {}", visible);
    }

    fn set_highlight(&mut self, region: &str, highlighted: bool) {
        debug!("scene: highlight {} {}", region, highlighted);
    }

    fn set_stimulus_visible(&mut self, visible: bool) {
        debug!("scene: stimulus visible {}", visible);
    }

    fn set_center_mark_visible(&mut self, visible: bool) {
        debug!("scene: center mark visible {}", visible);
    }

    fn set_selection_button_visible(&mut self, visible: bool) {
        debug!("scene: selection button visible {}", visible);
    }

    fn indicate_target(&mut self, direction: Option<Direction>) {
        debug!("scene: indicate {:?}", direction);
    }

    fn show_calibration_point(&mut self, target: Option<Vec2>) {
        debug!("scene: calibration point {:?}", target);
    }

    fn set_depth_of_field(&mut self, enabled: bool) {
        debug!("scene: depth of field {}", enabled);
    }

    fn set_focus_distance(&mut self, distance: i32) {
        debug!("scene: focus distance {}", distance);
    }

    fn show_focus_image(&mut self, image: u8) {
        debug!("scene: focus image {}", image);
    }

    fn play_cue(&mut self, cue: Cue) {
        debug!("scene: cue {:?}", cue);
    }
}
