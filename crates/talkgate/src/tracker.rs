//! Talking-state tracking with hysteresis.
//!
//! Consumes the per-frame decision slice for a check window, reduces it to a
//! speech ratio, and applies distinct start/stop thresholds so the state
//! does not flap around a single boundary.

use tracing::debug;

use crate::error::ConfigError;

/// Result of evaluating one check window against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkingState {
    /// Not talking, and this window did not change that.
    None,
    /// This window crossed the start threshold.
    StartTalking,
    /// Still talking.
    Talking,
    /// This window fell to or below the stop threshold.
    StopTalking,
}

impl TalkingState {
    /// Human-readable name, stable for logging and events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StartTalking => "start_talking",
            Self::Talking => "talking",
            Self::StopTalking => "stop_talking",
        }
    }
}

impl std::fmt::Display for TalkingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage of speech frames in `decisions`, truncated to an integer.
///
/// Truncation before comparison is deliberate: thresholds are integer
/// percentages and fractional ratios must round down, matching the long-
/// standing behavior of deployed configurations. An empty slice is 0.
pub fn speech_ratio(decisions: &[bool]) -> u8 {
    if decisions.is_empty() {
        return 0;
    }
    let speech = decisions.iter().filter(|&&d| d).count();
    (100 * speech / decisions.len()) as u8
}

/// Hysteresis tracker for one logical speaker-detection context.
///
/// Starting requires the ratio to strictly exceed `start_ratio`; stopping
/// requires it to fall to or below `stop_ratio`.
///
/// # Example
///
/// ```
/// use talkgate::{TalkingState, TalkingTracker};
///
/// let mut tracker = TalkingTracker::new(70, 30)?;
/// let window = [true, true, true, true, false];
/// assert_eq!(tracker.evaluate(&window), TalkingState::StartTalking);
/// # Ok::<(), talkgate::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TalkingTracker {
    start_ratio: u8,
    stop_ratio: u8,
    talking: bool,
}

impl TalkingTracker {
    /// Create a tracker with the given start/stop percentages (`0..=100`).
    pub fn new(start_ratio: u8, stop_ratio: u8) -> Result<Self, ConfigError> {
        for ratio in [start_ratio, stop_ratio] {
            if ratio > 100 {
                return Err(ConfigError::RatioOutOfRange { ratio });
            }
        }
        Ok(Self {
            start_ratio,
            stop_ratio,
            talking: false,
        })
    }

    /// Whether the tracked context is currently talking.
    pub fn is_talking(&self) -> bool {
        self.talking
    }

    /// Fold one check window of decisions into the talking state.
    ///
    /// An empty slice leaves the state unchanged and reports
    /// [`TalkingState::None`].
    pub fn evaluate(&mut self, decisions: &[bool]) -> TalkingState {
        if decisions.is_empty() {
            return TalkingState::None;
        }
        let ratio = speech_ratio(decisions);

        if self.talking {
            if ratio <= self.stop_ratio {
                self.talking = false;
                debug!(ratio, stop_ratio = self.stop_ratio, "stop talking");
                TalkingState::StopTalking
            } else {
                TalkingState::Talking
            }
        } else if ratio > self.start_ratio {
            self.talking = true;
            debug!(ratio, start_ratio = self.start_ratio, "start talking");
            TalkingState::StartTalking
        } else {
            TalkingState::None
        }
    }
}
