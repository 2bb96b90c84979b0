//! Engine-facing side effects
//!
//! Controllers never touch the scene directly. Everything visible or
//! audible goes through a [`SceneBridge`] implemented by the engine layer.

use crate::gaze::Pointer;
use crate::spatial::Vec2;
use crate::study::Direction;

/// Audio cues played as the study starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Countdown1,
    Countdown2,
    StudyStart,
}

/// Scene operations a study controller needs from the engine.
pub trait SceneBridge {
    /// Move the visible pointer
    fn set_pointer(&mut self, pointer: Pointer);

    fn set_pointer_visible(&mut self, visible: bool);

    /// Toggle the highlight material of a target region
    fn set_highlight(&mut self, region: &str, highlighted: bool);

    /// Show or hide the stimulus (UI buttons or focus image)
    fn set_stimulus_visible(&mut self, visible: bool);

    fn set_center_mark_visible(&mut self, visible: bool);

    fn set_selection_button_visible(&mut self, visible: bool);

    /// Point the direction indicator at a target, or hide it
    fn indicate_target(&mut self, direction: Option<Direction>);

    /// Show the calibration point at a head-local position, or hide it
    fn show_calibration_point(&mut self, target: Option<Vec2>);

    /// Enable or disable the depth-of-field override
    fn set_depth_of_field(&mut self, enabled: bool);

    fn set_focus_distance(&mut self, distance: i32);

    fn show_focus_image(&mut self, image: u8);

    fn play_cue(&mut self, cue: Cue);
}

/// Scene bridge that does nothing (headless runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSceneBridge;

impl SceneBridge for NullSceneBridge {
    fn set_pointer(&mut self, _pointer: Pointer) {}
    fn set_pointer_visible(&mut self, _visible: bool) {}
    fn set_highlight(&mut self, _region: &str, _highlighted: bool) {}
    fn set_stimulus_visible(&mut self, _visible: bool) {}
    fn set_center_mark_visible(&mut self, _visible: bool) {}
    fn set_selection_button_visible(&mut self, _visible: bool) {}
    fn indicate_target(&mut self, _direction: Option<Direction>) {}
    fn show_calibration_point(&mut self, _target: Option<Vec2>) {}
    fn set_depth_of_field(&mut self, _enabled: bool) {}
    fn set_focus_distance(&mut self, _distance: i32) {}
    fn show_focus_image(&mut self, _image: u8) {}
    fn play_cue(&mut self, _cue: Cue) {}
}
