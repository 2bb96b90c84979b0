//! Depth-of-field focus study
//!
//! The participant holds the primary key to reveal a tilted image and
//! adjusts focus until the marked point is sharp, either by tilting the
//! head or by looking at it. Releasing the key scores the focus distance
//! against the image's correct distance.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::calibration;
use super::{
    session_rng, DeferredQueue, FocusErrorEvaluator, StudyController, StudyPhase,
    StudySequencer, TargetScheduler,
};
use crate::bridge::{Cue, SceneBridge};
use crate::config::{FocusConfig, StudyConfig};
use crate::error::ConfigError;
use crate::gaze::{GazeCalibrator, GazeProjector, Pointer};
use crate::input::{FrameClock, FrameInput};
use crate::record::{FocusRecord, LogRecord, LogSink, WallClock};

/// How the participant drives the focus distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    /// Head pitch mapped onto a distance range
    #[default]
    HeadPitch,
    /// Distance of the gazed-at point on the focus plane
    EyeGaze,
}

impl FocusMode {
    /// Id written to the focus log
    pub fn id(&self) -> u8 {
        match self {
            FocusMode::HeadPitch => 1,
            FocusMode::EyeGaze => 2,
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusMode::HeadPitch => f.write_str("head-pitch"),
            FocusMode::EyeGaze => f.write_str("eye-gaze"),
        }
    }
}

/// Conventional focus: head pitch mapped linearly onto the distance range,
/// truncated to whole units.
pub fn head_pitch_distance(config: &FocusConfig, pitch: f32) -> i32 {
    let clamped = pitch.clamp(config.min_pitch_deg, config.max_pitch_deg);
    let t = (clamped - config.min_pitch_deg) / (config.max_pitch_deg - config.min_pitch_deg);
    (config.near_distance + (config.far_distance - config.near_distance) * t) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusAction {
    ReleaseFocusReset,
}

/// Controller for the focus study.
pub struct FocusStudy<B: SceneBridge, S: LogSink> {
    config: FocusConfig,
    clock: FrameClock,
    calibrator: GazeCalibrator,
    projector: GazeProjector,
    sequencer: StudySequencer,
    images: TargetScheduler<u8>,
    current_image: Option<u8>,
    evaluator: FocusErrorEvaluator,
    deferred: DeferredQueue<FocusAction>,
    resetting: bool,
    trial_started: Option<Duration>,
    focus_distance: i32,
    trials_completed: usize,
    missing_hit_reported: bool,
    bridge: B,
    sink: S,
    wall: Box<dyn WallClock>,
}

impl<B: SceneBridge, S: LogSink> FocusStudy<B, S> {
    pub fn new(
        config: &StudyConfig,
        bridge: B,
        sink: S,
        wall: Box<dyn WallClock>,
    ) -> Result<Self, ConfigError> {
        let mut rng = session_rng(config.study.seed);
        Self::with_rng(config, bridge, sink, wall, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(
        config: &StudyConfig,
        bridge: B,
        sink: S,
        wall: Box<dyn WallClock>,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let calibrator = GazeCalibrator::from_targets(&config.gaze.calibration_targets)?;
        let focus = config.focus.clone();
        let mut study = Self {
            calibrator,
            projector: GazeProjector::new(&config.gaze, 0.0),
            sequencer: StudySequencer::new(&focus.sequence),
            images: TargetScheduler::focus_images(rng),
            current_image: None,
            evaluator: FocusErrorEvaluator::new(focus.center_distance),
            deferred: DeferredQueue::new(),
            resetting: false,
            trial_started: None,
            focus_distance: focus.center_distance as i32,
            trials_completed: 0,
            missing_hit_reported: false,
            clock: FrameClock::new(),
            config: focus,
            bridge,
            sink,
            wall,
        };

        info!("Focus study ({} mode)", study.config.mode);
        calibration::begin(&mut study.calibrator, &mut study.bridge);
        study.reset_focus(Duration::from_millis(study.config.startup_reset_ms));
        Ok(study)
    }

    pub fn mode(&self) -> FocusMode {
        self.config.mode
    }

    pub fn focus_distance(&self) -> i32 {
        self.focus_distance
    }

    pub fn current_image(&self) -> Option<u8> {
        self.current_image
    }

    pub fn is_resetting_focus(&self) -> bool {
        self.resetting
    }

    pub fn is_trial_running(&self) -> bool {
        self.trial_started.is_some()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Discard the current correction and run the calibration pass again.
    pub fn recalibrate(&mut self) {
        calibration::begin(&mut self.calibrator, &mut self.bridge);
    }

    /// Force the depth of field to the center distance for `hold`.
    fn reset_focus(&mut self, hold: Duration) {
        self.resetting = true;
        self.focus_distance = self.config.center_distance as i32;
        self.bridge.set_depth_of_field(true);
        self.bridge.set_focus_distance(self.focus_distance);
        self.deferred
            .schedule_after(self.clock.now, hold, FocusAction::ReleaseFocusReset);
        debug!("Focus reset for {:?}", hold);
    }

    fn run_deferred(&mut self) {
        for action in self.deferred.poll(self.clock.now) {
            match action {
                FocusAction::ReleaseFocusReset => {
                    self.bridge.set_depth_of_field(false);
                    self.resetting = false;
                }
            }
        }
    }

    fn set_stimulus(&mut self, visible: bool) {
        self.bridge.set_stimulus_visible(visible);
        self.bridge.set_depth_of_field(visible);
        self.bridge.set_pointer_visible(!visible);
        self.bridge.set_center_mark_visible(!visible);
    }

    fn write(&mut self, record: LogRecord) {
        if let Err(e) = self.sink.write_record(&record) {
            error!("Failed to write focus log record: {}", e);
        }
    }

    fn enter_phase(&mut self, phase: StudyPhase) {
        match phase {
            StudyPhase::Countdown1 => {
                self.bridge.play_cue(Cue::Countdown1);
                self.trial_started = None;
                self.set_stimulus(false);
            }
            StudyPhase::Countdown2 => {
                self.bridge.play_cue(Cue::Countdown2);
                self.set_stimulus(false);
                self.reset_focus(Duration::from_millis(self.config.countdown_reset_ms));
            }
            StudyPhase::Running => {
                self.bridge.play_cue(Cue::StudyStart);
                if let Err(e) = self.sink.open() {
                    error!("Failed to open focus log: {}", e);
                }
                let now = self.wall.now();
                self.write(LogRecord::FocusStarted(now));
                self.write(LogRecord::FocusColumns(now));
                info!("Focus study started");
                self.next_image();
                self.bridge.set_center_mark_visible(true);
                self.bridge.set_pointer_visible(true);
            }
            StudyPhase::WaitingToStart | StudyPhase::Ended => {}
        }
    }

    /// Show the next image, or end the study once all have been scored.
    fn next_image(&mut self) -> Option<StudyPhase> {
        match self.images.next() {
            Some(image) => {
                self.current_image = Some(image);
                self.bridge.show_focus_image(image);
                debug!(
                    "Focus image {} ({} remaining)",
                    image,
                    self.images.remaining()
                );
                None
            }
            None => {
                self.current_image = None;
                let now = self.wall.now();
                self.write(LogRecord::FocusEnded(now));
                self.sequencer.finish();
                info!("Focus study ended after {} trials", self.trials_completed);
                Some(StudyPhase::Ended)
            }
        }
    }

    fn start_trial(&mut self) {
        let phase = self.sequencer.phase();
        let accepting = matches!(phase, StudyPhase::WaitingToStart | StudyPhase::Running);
        if self.resetting || !accepting || self.trial_started.is_some() {
            debug!(
                "Focus trial not started (resetting={}, phase={})",
                self.resetting, phase
            );
            return;
        }
        self.set_stimulus(true);
        self.trial_started = Some(self.clock.now);
    }

    fn stop_trial(&mut self) -> Option<StudyPhase> {
        let Some(started) = self.trial_started.take() else {
            if self.sequencer.is_running() {
                warn!("Focus trial stop without a running trial");
            }
            return None;
        };

        let mut entered = None;
        let held = self.clock.now.saturating_sub(started);
        if self.sequencer.is_running() && held > Duration::from_millis(self.config.min_hold_ms) {
            match self.current_image {
                Some(image) => {
                    let error = self
                        .evaluator
                        .error(self.focus_distance, image)
                        .unwrap_or_default();
                    let record = FocusRecord {
                        mode: self.config.mode,
                        timestamp: self.wall.now(),
                        image,
                        duration: held,
                        error,
                    };
                    info!(
                        "Focus trial: image {} held {:.3}s error {}",
                        image,
                        held.as_secs_f32(),
                        error
                    );
                    self.write(LogRecord::Focus(record));
                    self.trials_completed += 1;
                    entered = self.next_image();
                }
                None => warn!("Focus trial finished without an image"),
            }
        } else {
            debug!("Focus hold of {:?} not scored", held);
        }

        self.set_stimulus(false);
        if !self.resetting {
            self.reset_focus(Duration::from_millis(self.config.trial_reset_ms));
        }
        entered
    }

    fn update_focus(&mut self, frame: &FrameInput) {
        let distance = match self.config.mode {
            FocusMode::HeadPitch => Some(head_pitch_distance(&self.config, frame.head_pitch())),
            FocusMode::EyeGaze => {
                let pointer = self
                    .projector
                    .project(frame.gaze_direction, &frame.head, frame.dt);
                self.bridge.set_pointer(Pointer::World(pointer));

                match frame.focus_hit {
                    Some(hit) => {
                        let forward = frame.head.forward();
                        let reference =
                            frame.head.position + forward * self.config.reference_distance;
                        Some((hit - reference).dot(&forward) as i32)
                    }
                    None => {
                        if !self.missing_hit_reported && frame.gaze_direction.is_some() {
                            debug!("No focus plane hit; focus distance unchanged");
                            self.missing_hit_reported = true;
                        }
                        None
                    }
                }
            }
        };

        // a pending reset pins the focus to the center
        if let Some(distance) = distance.filter(|_| !self.resetting) {
            if distance != self.focus_distance {
                self.focus_distance = distance;
                self.bridge.set_focus_distance(distance);
            }
        }
    }
}

impl<B: SceneBridge, S: LogSink> StudyController for FocusStudy<B, S> {
    fn update(&mut self, frame: &FrameInput) -> Option<StudyPhase> {
        self.clock.advance(frame.dt);
        self.run_deferred();

        if self.calibrator.is_collecting() {
            calibration::on_frame(&mut self.calibrator, &mut self.projector, frame, &mut self.bridge);
            return None;
        }

        if self.sequencer.is_ended() {
            if frame.primary_pressed {
                warn!("Focus study has ended; input ignored");
            }
            return None;
        }

        let mut entered = self.sequencer.advance(frame.dt);
        if let Some(phase) = entered {
            self.enter_phase(phase);
            if phase == StudyPhase::Running && self.sequencer.is_ended() {
                entered = Some(StudyPhase::Ended);
            }
        }

        if frame.primary_pressed {
            self.start_trial();
        }
        if frame.primary_released {
            if let Some(phase) = self.stop_trial() {
                entered = Some(phase);
            }
        }

        self.update_focus(frame);
        entered
    }

    fn phase(&self) -> StudyPhase {
        self.sequencer.phase()
    }

    fn is_calibrating(&self) -> bool {
        self.calibrator.is_collecting()
    }

    fn trials_completed(&self) -> usize {
        self.trials_completed
    }

    fn summary(&self) -> String {
        format!(
            "focus study [{}]: phase {}, {} trials logged, {} images remaining, focus distance {}",
            self.config.mode,
            self.sequencer.phase(),
            self.trials_completed,
            self.images.remaining(),
            self.focus_distance
        )
    }
}
