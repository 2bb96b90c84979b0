//! UI selection study
//!
//! An arrow indicates one of four buttons; the participant presses the
//! primary key to reveal the buttons, moves the pointer onto the indicated
//! one and confirms it with the configured selection gesture.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use super::calibration;
use super::{session_rng, Direction, StudyController, StudyPhase, StudySequencer, TargetScheduler};
use crate::bridge::{Cue, SceneBridge};
use crate::config::{StudyConfig, UiConfig};
use crate::error::ConfigError;
use crate::gaze::{GazeCalibrator, GazeProjector, HeadCursor, Pointer};
use crate::input::{FrameClock, FrameInput, RegionEventKind};
use crate::record::{LogRecord, LogSink, UiRecord, WallClock};
use crate::selection::{SelectionDetector, SelectionMode};
use crate::session::{SelectOutcome, SessionState};

/// Controller for the UI selection study.
pub struct UiStudy<B: SceneBridge, S: LogSink> {
    config: UiConfig,
    mode: SelectionMode,
    clock: FrameClock,
    calibrator: GazeCalibrator,
    projector: GazeProjector,
    head_cursor: HeadCursor,
    detector: SelectionDetector,
    session: SessionState,
    sequencer: StudySequencer,
    schedule: TargetScheduler<Direction>,
    training_rng: StdRng,
    target: Option<Direction>,
    next_target_at: Option<Duration>,
    trial_started: Option<Duration>,
    time_on_target: Duration,
    trials_completed: usize,
    missing_eyes_reported: bool,
    bridge: B,
    sink: S,
    wall: Box<dyn WallClock>,
}

impl<B: SceneBridge, S: LogSink> UiStudy<B, S> {
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
        let mode = config.selection.mode;
        let mut study = Self {
            config: config.ui.clone(),
            mode,
            clock: FrameClock::new(),
            calibrator: GazeCalibrator::from_targets(&config.gaze.calibration_targets)?,
            projector: GazeProjector::new(&config.gaze, config.ui.vertical_shift),
            head_cursor: HeadCursor::new(&config.selection),
            detector: SelectionDetector::from_config(&config.selection),
            session: SessionState::new(),
            sequencer: StudySequencer::new(&config.ui.sequence),
            schedule: TargetScheduler::directions(rng),
            training_rng: StdRng::seed_from_u64(rng.gen()),
            target: None,
            next_target_at: None,
            trial_started: None,
            time_on_target: Duration::ZERO,
            trials_completed: 0,
            missing_eyes_reported: false,
            bridge,
            sink,
            wall,
        };

        info!("UI study ({} selection)", mode);
        study.bridge.indicate_target(None);
        calibration::begin(&mut study.calibrator, &mut study.bridge);
        Ok(study)
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Direction currently indicated, if any
    pub fn target(&self) -> Option<Direction> {
        self.target
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn false_positives(&self) -> u32 {
        self.session.false_positives()
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

    fn next_target_delay(&self) -> Duration {
        Duration::from_millis(self.config.next_target_delay_ms)
    }

    fn write(&mut self, record: LogRecord) {
        if let Err(e) = self.sink.write_record(&record) {
            error!("Failed to write UI log record: {}", e);
        }
    }

    fn set_canvas(&mut self, visible: bool) {
        self.bridge.set_stimulus_visible(visible);
        self.bridge.set_center_mark_visible(!visible);
    }

    fn clear_highlight(&mut self) {
        if let Some(region) = self.session.clear_highlight() {
            self.bridge.set_highlight(&region, false);
        }
    }

    fn enter_phase(&mut self, phase: StudyPhase) {
        self.detector.reset(self.clock.now);
        match phase {
            StudyPhase::Countdown1 => {
                self.bridge.play_cue(Cue::Countdown1);
                self.target = None;
                self.next_target_at = None;
                self.trial_started = None;
                self.set_canvas(false);
                self.bridge.indicate_target(None);
                self.bridge.set_selection_button_visible(false);
            }
            StudyPhase::Countdown2 => {
                self.bridge.play_cue(Cue::Countdown2);
                self.set_canvas(false);
                self.bridge.indicate_target(None);
            }
            StudyPhase::Running => {
                self.clear_highlight();
                self.bridge.play_cue(Cue::StudyStart);
                if let Err(e) = self.sink.open() {
                    error!("Failed to open UI log: {}", e);
                }
                self.write(LogRecord::UiStarted(self.wall.now()));
                self.write(LogRecord::UiColumns);
                self.session.set_measuring(true);
                self.target = None;
                self.next_target_at = Some(self.clock.now + self.next_target_delay());
                info!("UI study started");
            }
            StudyPhase::WaitingToStart | StudyPhase::Ended => {}
        }
    }

    /// Indicate the next target once the pause after the last trial is over.
    fn indicate_next_target(&mut self) -> Option<StudyPhase> {
        if self.target.is_some() {
            return None;
        }
        match self.next_target_at {
            Some(at) if self.clock.now >= at => {}
            _ => return None,
        }

        let target = if self.sequencer.is_running() {
            match self.schedule.next() {
                Some(direction) => direction,
                None => return self.end_study(),
            }
        } else {
            Direction::ALL[self.training_rng.gen_range(0..Direction::ALL.len())]
        };

        debug!("Indicating {} ({})", target, target.id());
        self.target = Some(target);
        self.bridge.indicate_target(Some(target));
        None
    }

    fn end_study(&mut self) -> Option<StudyPhase> {
        let false_positives = self.session.false_positives();
        self.write(LogRecord::FalsePositives(false_positives));
        self.write(LogRecord::UiEnded(self.wall.now()));
        self.session.set_measuring(false);
        self.next_target_at = None;
        self.bridge.indicate_target(None);
        self.set_canvas(false);
        info!(
            "UI study ended: {} trials, {} false positives",
            self.trials_completed, false_positives
        );
        self.sequencer.finish().then_some(StudyPhase::Ended)
    }

    fn start_trial(&mut self, frame: &FrameInput) {
        if self.target.is_none() {
            debug!("Primary key ignored: no target indicated");
            return;
        }
        self.bridge.indicate_target(None);
        self.set_canvas(true);
        self.projector.recenter(&frame.head);
        self.clear_highlight();
        self.detector.reset(self.clock.now);
        self.time_on_target = Duration::ZERO;
        self.trial_started = Some(self.clock.now);

        // the buttons appear under the pointer
        if let Some(region) = self.session.hovered().map(str::to_string) {
            self.session.highlight(region.clone());
            self.bridge.set_highlight(&region, true);
            self.show_hover_feedback();
        }
        debug!("Trial started");
    }

    fn show_hover_feedback(&mut self) {
        if self.mode.uses_hover_smoothing() {
            self.projector.set_hover_smoothing(true);
        }
        if self.mode.uses_selection_button() {
            self.bridge.set_selection_button_visible(true);
        }
    }

    fn move_pointer(&mut self, frame: &FrameInput) {
        let pointer = if self.mode.uses_eye_gaze() {
            Pointer::World(
                self.projector
                    .project(frame.gaze_direction, &frame.head, frame.dt),
            )
        } else {
            Pointer::Canvas(
                self.head_cursor
                    .position(frame.head_pitch(), frame.head_yaw()),
            )
        };
        self.bridge.set_pointer(pointer);
    }

    fn apply_regions(&mut self, frame: &FrameInput) {
        let entered = frame
            .regions
            .iter()
            .any(|e| e.kind == RegionEventKind::Enter);
        if !entered {
            return;
        }

        if let Some(started) = self.trial_started {
            self.time_on_target = self.clock.now.saturating_sub(started);
        }
        self.show_hover_feedback();

        for region in self.session.apply_region_events(&frame.regions) {
            self.bridge.set_highlight(&region, false);
        }
        if let Some(region) = self.session.highlighted().map(str::to_string) {
            self.bridge.set_highlight(&region, true);
        }
    }

    fn detect(&mut self, frame: &FrameInput) {
        if matches!(self.mode, SelectionMode::Wink | SelectionMode::Blink)
            && frame.eyes.is_none()
            && !self.missing_eyes_reported
        {
            error!("{} selection needs face tracking; no eye closure data", self.mode);
            self.missing_eyes_reported = true;
        }

        let Some(gesture) = self.detector.update(frame, self.clock.now) else {
            return;
        };
        let target = self.target.map(|d| d.id());
        match self.session.select(gesture.mode, target, gesture.at) {
            SelectOutcome::Selected(event) => {
                self.bridge.set_highlight(&event.selected_target_id, false);
                self.bridge.set_selection_button_visible(false);
                self.projector.set_hover_smoothing(false);
                self.finish_trial(event.selected_target_id);
                self.set_canvas(false);
            }
            SelectOutcome::FalsePositive | SelectOutcome::Ignored => {}
        }
    }

    fn finish_trial(&mut self, selected: String) {
        let Some(started) = self.trial_started.take() else {
            warn!("Selection of {} without a running trial", selected);
            return;
        };
        let duration = self.clock.now.saturating_sub(started);

        if self.sequencer.is_running() {
            match self.target {
                Some(target) => {
                    let record = UiRecord {
                        mode: self.mode,
                        timestamp: self.wall.now(),
                        time_on_target: self.time_on_target,
                        duration,
                        selected,
                        target: target.id(),
                    };
                    info!(
                        "Trial: selected {} for {} in {:.3}s (correct: {})",
                        record.selected,
                        target.id(),
                        duration.as_secs_f32(),
                        record.was_correct()
                    );
                    self.write(LogRecord::Ui(record));
                    self.trials_completed += 1;
                }
                None => warn!("Selection without an indicated target"),
            }
        }

        self.target = None;
        self.next_target_at = Some(self.clock.now + self.next_target_delay());
    }
}

impl<B: SceneBridge, S: LogSink> StudyController for UiStudy<B, S> {
    fn update(&mut self, frame: &FrameInput) -> Option<StudyPhase> {
        self.clock.advance(frame.dt);

        if self.calibrator.is_collecting() {
            if calibration::on_frame(&mut self.calibrator, &mut self.projector, frame, &mut self.bridge) {
                self.next_target_at = Some(self.clock.now + self.next_target_delay());
            }
            return None;
        }

        if self.sequencer.is_ended() {
            if frame.primary_pressed || frame.selection_trigger {
                warn!("UI study has ended; input ignored");
            }
            return None;
        }

        let mut entered = self.sequencer.advance(frame.dt);
        if let Some(phase) = entered {
            self.enter_phase(phase);
        }

        if let Some(phase) = self.indicate_next_target() {
            return Some(phase);
        }

        if frame.primary_pressed {
            self.start_trial(frame);
        }

        self.move_pointer(frame);
        self.apply_regions(frame);
        self.detect(frame);

        if self.sequencer.is_ended() {
            entered = Some(StudyPhase::Ended);
        }
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
            "UI study [{}]: phase {}, {} trials logged, {} targets remaining, {} false positives",
            self.mode,
            self.sequencer.phase(),
            self.trials_completed,
            self.schedule.remaining(),
            self.session.false_positives()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::recording::{RecordingBridge, SceneCall};
    use crate::input::{EyeClosure, RegionEvent};
    use crate::record::{FixedClock, MemorySink};
    use crate::spatial::Vector3D;
    use chrono::NaiveDate;

    const FRAME: Duration = Duration::from_millis(100);

    type Study = UiStudy<RecordingBridge, MemorySink>;

    fn wall() -> Box<dyn WallClock> {
        let at = NaiveDate::from_ymd_opt(2025, 5, 2)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .unwrap();
        Box::new(FixedClock(at))
    }

    fn study_with(mode: SelectionMode, start_ms: u64) -> Study {
        let mut config = StudyConfig::default();
        config.selection.mode = mode;
        config.ui.sequence.start_ms = start_ms;
        config.ui.sequence.countdown_offset_ms = 300;
        config.ui.sequence.running_offset_ms = 500;
        UiStudy::with_rng(
            &config,
            RecordingBridge::default(),
            MemorySink::new(),
            wall(),
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap()
    }

    fn frame() -> FrameInput {
        FrameInput::new(FRAME).with_gaze(Vector3D::FORWARD)
    }

    fn calibrate(study: &mut Study) {
        for _ in 0..9 {
            let target = study.calibrator.current_target().unwrap();
            let gaze = Vector3D::new(target.x / 2300.0, target.y / 2300.0, 1.0);
            study.update(&FrameInput::new(FRAME).with_gaze(gaze).pressed());
        }
        assert!(!study.is_calibrating());
    }

    fn run_until(study: &mut Study, phase: StudyPhase) {
        for _ in 0..200 {
            if study.phase() == phase {
                return;
            }
            study.update(&frame());
        }
        panic!("never reached {}", phase);
    }

    fn wait_for_target(study: &mut Study) -> Direction {
        for _ in 0..100 {
            if let Some(target) = study.target() {
                return target;
            }
            study.update(&frame());
        }
        panic!("no target indicated");
    }

    /// Reveal the buttons and dwell on `label` until it is selected.
    fn dwell_trial(study: &mut Study, label: &str) {
        study.update(&frame().pressed());
        study.update(&frame());
        study.update(&frame().with_region(RegionEvent::enter(label)));
        for _ in 0..4 {
            study.update(&frame().with_region(RegionEvent::stay(label)));
        }
    }

    #[test]
    fn test_training_target_after_calibration_delay() {
        let mut study = study_with(SelectionMode::Dwell, 60_000);
        calibrate(&mut study);
        assert_eq!(study.target(), None);
        for _ in 0..19 {
            study.update(&frame());
        }
        assert_eq!(study.target(), None);
        study.update(&frame());
        assert!(study.target().is_some());
    }

    #[test]
    fn test_training_selection_is_not_logged() {
        let mut study = study_with(SelectionMode::Dwell, 60_000);
        calibrate(&mut study);
        let target = wait_for_target(&mut study);
        dwell_trial(&mut study, &target.label());
        assert_eq!(study.target(), None);
        assert!(!study.is_trial_running());
        assert_eq!(study.trials_completed(), 0);
        assert!(study.sink().lines().is_empty());
    }

    #[test]
    fn test_running_writes_headers() {
        let mut study = study_with(SelectionMode::Dwell, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        assert_eq!(
            study.sink().lines(),
            [
                "UI Study Started;2025-05-02 10:30:00".to_string(),
                "selectionMode;timestamp;timeOnTarget;duration;selectionTime;selectedButton;targetButton;correctSelection;".to_string(),
            ]
        );
        assert!(study.session().is_measuring());
    }

    #[test]
    fn test_dwell_trial_is_logged() {
        let mut study = study_with(SelectionMode::Dwell, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        let target = wait_for_target(&mut study);

        dwell_trial(&mut study, &target.label());
        assert_eq!(study.trials_completed(), 1);
        // entered 200 ms in, selected 300 ms later
        let line = study.sink().lines().last().unwrap().clone();
        assert!(line.starts_with("2;2025-05-02 10:30:00;0.2;0.5;"), "{}", line);
        assert!(line.ends_with(&format!(";{};{};True", target.id(), target.id())));
        assert_eq!(
            study.bridge().count(&SceneCall::Highlight(target.label(), false)),
            1
        );
    }

    #[test]
    fn test_dwell_before_trial_does_not_block_trial() {
        let mut study = study_with(SelectionMode::Dwell, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        let target = wait_for_target(&mut study);

        // dwell on the target while the buttons are still hidden
        study.update(&frame().with_region(RegionEvent::enter(target.label())));
        for _ in 0..4 {
            study.update(&frame().with_region(RegionEvent::stay(target.label())));
        }
        assert_eq!(study.trials_completed(), 0);
        assert_eq!(study.target(), Some(target));

        study.update(&frame().pressed());
        assert_eq!(study.session().highlighted(), Some(target.label().as_str()));
        for _ in 0..2 {
            study.update(&frame().with_region(RegionEvent::stay(target.label())));
        }
        assert_eq!(study.trials_completed(), 0);
        study.update(&frame().with_region(RegionEvent::stay(target.label())));
        assert_eq!(study.trials_completed(), 1);
        let line = study.sink().lines().last().unwrap().clone();
        assert!(line.starts_with("2;2025-05-02 10:30:00;0;0.3;"), "{}", line);
        assert!(line.ends_with(&format!(";{};{};True", target.id(), target.id())));
    }

    #[test]
    fn test_wrong_button_is_logged_incorrect() {
        let mut study = study_with(SelectionMode::Dwell, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        let target = wait_for_target(&mut study);
        let wrong = Direction::ALL
            .into_iter()
            .find(|d| *d != target)
            .unwrap();

        dwell_trial(&mut study, &wrong.label());
        let last = study.sink().lines().last().unwrap();
        assert!(last.ends_with(&format!(";{};{};False", wrong.id(), target.id())));
    }

    #[test]
    fn test_blink_without_highlight_is_false_positive() {
        let mut study = study_with(SelectionMode::Blink, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        wait_for_target(&mut study);
        study.update(&frame().pressed());

        for _ in 0..3 {
            study.update(&frame().with_eyes(EyeClosure::CLOSED));
        }
        assert_eq!(study.false_positives(), 1);
        assert!(study.is_trial_running());
        assert_eq!(study.trials_completed(), 0);
    }

    #[test]
    fn test_nod_selects_highlighted_button() {
        let mut study = study_with(SelectionMode::Nod, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        let target = wait_for_target(&mut study);
        study.update(&frame().pressed());
        study.update(&frame().with_region(RegionEvent::enter(target.label())));
        assert_eq!(study.session().highlighted(), Some(target.label().as_str()));

        let nod = frame().with_head(crate::spatial::Transform::new(
            crate::spatial::Point3D::ORIGIN,
            crate::spatial::Quaternion::from_euler_degrees(15.0, 0.0, 0.0),
        ));
        study.update(&nod);
        assert_eq!(study.trials_completed(), 1);
        assert_eq!(study.session().highlighted(), None);
    }

    #[test]
    fn test_button_press_reveals_selection_button() {
        let mut study = study_with(SelectionMode::ButtonPress, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);
        let target = wait_for_target(&mut study);
        study.update(&frame().pressed());
        study.update(&frame().with_region(RegionEvent::enter(target.label())));
        assert_eq!(
            study.bridge().count(&SceneCall::SelectionButton(true)),
            1
        );
        study.update(&frame().with_trigger());
        assert_eq!(study.trials_completed(), 1);
    }

    #[test]
    fn test_head_pointer_moves_canvas_cursor() {
        let mut study = study_with(SelectionMode::HeadPointer, 60_000);
        calibrate(&mut study);
        study.update(&frame());
        assert!(matches!(study.bridge().pointer, Some(Pointer::Canvas(_))));
    }

    #[test]
    fn test_exhaustion_writes_summary_and_ends() {
        let mut study = study_with(SelectionMode::Dwell, 1_000);
        calibrate(&mut study);
        run_until(&mut study, StudyPhase::Running);

        let mut ended = false;
        for _ in 0..20 {
            let target = wait_for_target(&mut study);
            dwell_trial(&mut study, &target.label());
        }
        for _ in 0..30 {
            ended |= study.update(&frame()) == Some(StudyPhase::Ended);
        }
        assert!(ended);
        assert_eq!(study.phase(), StudyPhase::Ended);
        assert_eq!(study.trials_completed(), 20);

        let lines = study.sink().lines();
        assert_eq!(lines.len(), 2 + 20 + 2);
        assert_eq!(lines[22], "FalsePositives;0");
        assert_eq!(lines[23], "StudyEnd;2025-05-02 10:30:00");

        // input after the end changes nothing
        study.update(&frame().pressed().with_region(RegionEvent::enter("1")));
        assert_eq!(study.sink().lines().len(), 24);
        assert_eq!(study.phase(), StudyPhase::Ended);
    }
}
