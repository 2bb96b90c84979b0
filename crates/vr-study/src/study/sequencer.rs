//! Timed study phase machine

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::SequenceConfig;

/// Phase of a study session. Phases only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StudyPhase {
    /// Training; nothing is logged
    WaitingToStart,
    /// First cue played
    Countdown1,
    /// Second cue played
    Countdown2,
    /// Log open, targets drawn from the schedule
    Running,
    /// Schedule exhausted; terminal
    Ended,
}

impl StudyPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyPhase::WaitingToStart => "waiting",
            StudyPhase::Countdown1 => "countdown-1",
            StudyPhase::Countdown2 => "countdown-2",
            StudyPhase::Running => "running",
            StudyPhase::Ended => "ended",
        }
    }

    fn next(self) -> Option<StudyPhase> {
        match self {
            StudyPhase::WaitingToStart => Some(StudyPhase::Countdown1),
            StudyPhase::Countdown1 => Some(StudyPhase::Countdown2),
            StudyPhase::Countdown2 => Some(StudyPhase::Running),
            StudyPhase::Running | StudyPhase::Ended => None,
        }
    }
}

impl fmt::Display for StudyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advances [`StudyPhase`] by accumulated time.
///
/// Time accumulates only until the study is running. At most one phase
/// transition happens per call to [`advance`](Self::advance), so every cue
/// lands on its own frame.
#[derive(Debug, Clone)]
pub struct StudySequencer {
    countdown1_at: Duration,
    countdown2_at: Duration,
    running_at: Duration,
    elapsed: Duration,
    phase: StudyPhase,
}

impl StudySequencer {
    pub fn new(config: &SequenceConfig) -> Self {
        let start = Duration::from_millis(config.start_ms);
        Self {
            countdown1_at: start,
            countdown2_at: start + Duration::from_millis(config.countdown_offset_ms),
            running_at: start + Duration::from_millis(config.running_offset_ms),
            elapsed: Duration::ZERO,
            phase: StudyPhase::WaitingToStart,
        }
    }

    pub fn phase(&self) -> StudyPhase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.phase == StudyPhase::Running
    }

    pub fn is_ended(&self) -> bool {
        self.phase == StudyPhase::Ended
    }

    /// Cumulative time at which `phase` is entered, for the timed phases.
    pub fn threshold(&self, phase: StudyPhase) -> Option<Duration> {
        match phase {
            StudyPhase::Countdown1 => Some(self.countdown1_at),
            StudyPhase::Countdown2 => Some(self.countdown2_at),
            StudyPhase::Running => Some(self.running_at),
            StudyPhase::WaitingToStart | StudyPhase::Ended => None,
        }
    }

    /// Add a frame's delta and return the phase entered this frame, if any.
    pub fn advance(&mut self, dt: Duration) -> Option<StudyPhase> {
        if self.phase >= StudyPhase::Running {
            return None;
        }
        self.elapsed += dt;

        let next = self.phase.next()?;
        let due = self.threshold(next)?;
        if self.elapsed < due {
            return None;
        }

        info!(
            "Study phase {} -> {} at {:.3}s",
            self.phase,
            next,
            self.elapsed.as_secs_f32()
        );
        self.phase = next;
        Some(next)
    }

    /// End the study once the target schedule is exhausted.
    ///
    /// Only a running study can end; returns whether the phase changed.
    pub fn finish(&mut self) -> bool {
        match self.phase {
            StudyPhase::Running => {
                info!("Study phase {} -> {}", self.phase, StudyPhase::Ended);
                self.phase = StudyPhase::Ended;
                true
            }
            StudyPhase::Ended => false,
            phase => {
                warn!("Cannot end study while {}", phase);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer() -> StudySequencer {
        StudySequencer::new(&SequenceConfig::default())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_transitions_at_exact_thresholds() {
        let mut seq = sequencer();
        assert_eq!(seq.advance(ms(29_999)), None);
        assert_eq!(seq.advance(ms(1)), Some(StudyPhase::Countdown1));
        assert_eq!(seq.advance(ms(2_999)), None);
        assert_eq!(seq.advance(ms(1)), Some(StudyPhase::Countdown2));
        assert_eq!(seq.advance(ms(1_999)), None);
        assert_eq!(seq.advance(ms(1)), Some(StudyPhase::Running));
        assert_eq!(seq.elapsed(), ms(35_000));
    }

    #[test]
    fn test_one_transition_per_tick() {
        let mut seq = sequencer();
        assert_eq!(seq.advance(ms(60_000)), Some(StudyPhase::Countdown1));
        assert_eq!(seq.advance(Duration::ZERO), Some(StudyPhase::Countdown2));
        assert_eq!(seq.advance(Duration::ZERO), Some(StudyPhase::Running));
        assert_eq!(seq.advance(Duration::ZERO), None);
    }

    #[test]
    fn test_phases_never_regress_or_repeat() {
        let mut seq = sequencer();
        let mut seen = Vec::new();
        let mut last = seq.phase();
        for _ in 0..4_000 {
            if let Some(phase) = seq.advance(ms(16)) {
                seen.push(phase);
            }
            assert!(seq.phase() >= last);
            last = seq.phase();
        }
        assert_eq!(
            seen,
            vec![
                StudyPhase::Countdown1,
                StudyPhase::Countdown2,
                StudyPhase::Running
            ]
        );
    }

    #[test]
    fn test_time_stops_once_running() {
        let mut seq = sequencer();
        for _ in 0..3 {
            seq.advance(ms(40_000));
        }
        assert!(seq.is_running());
        let elapsed = seq.elapsed();
        seq.advance(ms(5_000));
        assert_eq!(seq.elapsed(), elapsed);
    }

    #[test]
    fn test_finish_requires_running_and_is_terminal() {
        let mut seq = sequencer();
        assert!(!seq.finish());
        assert_eq!(seq.phase(), StudyPhase::WaitingToStart);

        for _ in 0..3 {
            seq.advance(ms(40_000));
        }
        assert!(seq.finish());
        assert!(seq.is_ended());
        assert!(!seq.finish());
        assert_eq!(seq.advance(ms(100_000)), None);
        assert_eq!(seq.phase(), StudyPhase::Ended);
    }
}
