//! Session configuration.
//!
//! A [`SessionConfig`] is validated once, at session creation; nothing here
//! is process-wide or mutable afterwards. Timing fields obey strict
//! divisibility rules so that slide windows tile check windows exactly and
//! every window splits into whole classifier frames.

use crate::error::ConfigError;

/// Sample rates accepted by the classifier path.
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [8_000, 16_000, 32_000, 48_000];

/// Sample rates accepted by noise-suppression backends (no 48 kHz mode).
pub const NS_SAMPLE_RATES: [u32; 3] = [8_000, 16_000, 32_000];

/// Longest accepted check window (one minute), keeping derived sample counts
/// well inside `u32` at every supported rate.
pub const MAX_WINDOW_MS: u32 = 60_000;

/// Classifier aggressiveness, from most permissive to most restrictive.
///
/// Higher settings trade missed speech for fewer false detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggressiveness {
    /// Highest sensitivity (default).
    #[default]
    Quality,
    /// Slightly restrictive.
    LowBitrate,
    /// Restrictive.
    Aggressive,
    /// Most restrictive; only clear speech passes.
    VeryAggressive,
}

impl Aggressiveness {
    /// Returns the conventional integer mode (0–3).
    pub fn as_mode(self) -> u8 {
        match self {
            Self::Quality => 0,
            Self::LowBitrate => 1,
            Self::Aggressive => 2,
            Self::VeryAggressive => 3,
        }
    }
}

/// Duration of one classifier frame, the smallest unit classified atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameDuration {
    /// 10 ms frames.
    Ms10,
    /// 20 ms frames (default).
    #[default]
    Ms20,
    /// 30 ms frames.
    Ms30,
}

impl FrameDuration {
    /// Returns the duration in milliseconds.
    pub fn as_ms(self) -> u32 {
        match self {
            Self::Ms10 => 10,
            Self::Ms20 => 20,
            Self::Ms30 => 30,
        }
    }
}

/// Strategy governing whether classifier state persists across consecutive
/// slide windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationPolicy {
    /// One persistent classifier across all windows; decisions accumulate in
    /// a rolling per-frame buffer (default).
    #[default]
    Correlated,
    /// The classifier is recreated before every window so no state carries
    /// over; audio accumulates as under [`Mixture`](Self::Mixture).
    Uncorrelated,
    /// One persistent classifier re-reads the full check window of audio on
    /// every push, via an overlapping staging buffer.
    Mixture,
}

/// Noise-suppression aggressiveness level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseSuppressionLevel {
    /// Low suppression (~6 dB).
    Low,
    /// Moderate suppression (~12 dB, default).
    Moderate,
    /// High suppression (~18 dB).
    High,
    /// Very high suppression (~21 dB).
    VeryHigh,
}

/// Noise-suppression settings. Set to `Some(...)` on the session config to
/// denoise each slide window before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSuppression {
    /// Aggressiveness level (default: `Moderate`).
    pub level: NoiseSuppressionLevel,
}

impl Default for NoiseSuppression {
    fn default() -> Self {
        Self {
            level: NoiseSuppressionLevel::Moderate,
        }
    }
}

/// Configuration for one VAD session, immutable after creation.
///
/// # Example
///
/// ```
/// use talkgate::{CorrelationPolicy, NoiseSuppression, SessionConfig};
///
/// let config = SessionConfig {
///     sample_rate_hz: 16_000,
///     policy: CorrelationPolicy::Mixture,
///     noise_suppression: Some(NoiseSuppression::default()),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Classifier aggressiveness.
    pub aggressiveness: Aggressiveness,
    /// Duration of one classifier frame.
    pub frame_duration: FrameDuration,
    /// Temporal-correlation policy for merging window decisions.
    pub policy: CorrelationPolicy,
    /// Noise suppression applied before classification. `None` disables it.
    pub noise_suppression: Option<NoiseSuppression>,
    /// Input sample rate in Hz. Must be 8000, 16000, 32000 or 48000.
    pub sample_rate_hz: u32,
    /// Span over which the talking ratio is computed, in milliseconds.
    /// Must be a positive multiple of 100 ms, of the frame duration, and of
    /// the slide window, and at most [`MAX_WINDOW_MS`].
    pub check_window_ms: u32,
    /// Amount of audio delivered per push, in milliseconds. Must be a
    /// positive multiple of 100 ms and of the frame duration, and no longer
    /// than the check window.
    pub slide_window_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            aggressiveness: Aggressiveness::default(),
            frame_duration: FrameDuration::default(),
            policy: CorrelationPolicy::default(),
            noise_suppression: None,
            sample_rate_hz: 8_000,
            check_window_ms: 300,
            slide_window_ms: 100,
        }
    }
}

impl SessionConfig {
    /// Check every creation-time invariant, returning the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let frame_ms = self.frame_duration.as_ms();

        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate_hz) {
            return Err(ConfigError::UnsupportedSampleRate {
                sample_rate_hz: self.sample_rate_hz,
            });
        }

        if self.check_window_ms == 0
            || self.check_window_ms % 100 != 0
            || self.check_window_ms % frame_ms != 0
        {
            return Err(ConfigError::CheckWindowNotAligned {
                check_window_ms: self.check_window_ms,
                frame_duration_ms: frame_ms,
            });
        }

        if self.check_window_ms > MAX_WINDOW_MS {
            return Err(ConfigError::CheckWindowTooLong {
                check_window_ms: self.check_window_ms,
                max_window_ms: MAX_WINDOW_MS,
            });
        }

        if self.slide_window_ms == 0
            || self.slide_window_ms % 100 != 0
            || self.slide_window_ms % frame_ms != 0
        {
            return Err(ConfigError::SlideWindowNotAligned {
                slide_window_ms: self.slide_window_ms,
                frame_duration_ms: frame_ms,
            });
        }

        if self.slide_window_ms > self.check_window_ms {
            return Err(ConfigError::SlideWindowExceedsCheckWindow {
                slide_window_ms: self.slide_window_ms,
                check_window_ms: self.check_window_ms,
            });
        }

        if self.check_window_ms % self.slide_window_ms != 0 {
            return Err(ConfigError::WindowRatioNotIntegral {
                check_window_ms: self.check_window_ms,
                slide_window_ms: self.slide_window_ms,
            });
        }

        if self.noise_suppression.is_some() && !NS_SAMPLE_RATES.contains(&self.sample_rate_hz) {
            return Err(ConfigError::NoiseSuppressionUnsupportedRate {
                sample_rate_hz: self.sample_rate_hz,
            });
        }

        Ok(())
    }

    /// Samples in one classifier frame.
    pub fn samples_per_frame(&self) -> usize {
        samples_for(self.sample_rate_hz, self.frame_duration.as_ms())
    }

    /// Samples in one slide window.
    pub fn samples_per_slide_window(&self) -> usize {
        samples_for(self.sample_rate_hz, self.slide_window_ms)
    }

    /// Samples in one check window.
    pub fn samples_per_check_window(&self) -> usize {
        samples_for(self.sample_rate_hz, self.check_window_ms)
    }

    /// Classifier frames in one slide window.
    pub fn frames_per_slide_window(&self) -> usize {
        (self.slide_window_ms / self.frame_duration.as_ms()) as usize
    }

    /// Classifier frames in one check window; the length of every decision
    /// slice the session returns.
    pub fn frames_per_check_window(&self) -> usize {
        (self.check_window_ms / self.frame_duration.as_ms()) as usize
    }

    /// Slide windows in one check window.
    pub fn slide_windows_per_check_window(&self) -> usize {
        (self.check_window_ms / self.slide_window_ms) as usize
    }
}

/// Sample count for `duration_ms` of audio at `sample_rate_hz`.
///
/// Widened to `u64` so even durations `validate()` rejects never overflow
/// when computed directly.
fn samples_for(sample_rate_hz: u32, duration_ms: u32) -> usize {
    (u64::from(sample_rate_hz) / 1_000 * u64::from(duration_ms)) as usize
}
