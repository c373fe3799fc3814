//! Error types for session creation and audio processing.

/// Error reported by a classifier or denoiser backend.
///
/// Backends are opaque capabilities; the engine only forwards their failure
/// reason without interpreting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    /// Create a backend error with the given failure reason.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audio backend failure: {}", self.message)
    }
}

impl std::error::Error for BackendError {}

/// Error returned when validating a [`SessionConfig`](crate::SessionConfig)
/// or tracker thresholds.
///
/// Each variant names the violated constraint and carries the offending
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample rate is not one of 8000, 16000, 32000, or 48000 Hz.
    UnsupportedSampleRate { sample_rate_hz: u32 },
    /// Check window is zero, not a multiple of 100 ms, or not a multiple of
    /// the frame duration.
    CheckWindowNotAligned {
        check_window_ms: u32,
        frame_duration_ms: u32,
    },
    /// Slide window is zero, not a multiple of 100 ms, or not a multiple of
    /// the frame duration.
    SlideWindowNotAligned {
        slide_window_ms: u32,
        frame_duration_ms: u32,
    },
    /// Check window is longer than the supported maximum.
    CheckWindowTooLong {
        check_window_ms: u32,
        max_window_ms: u32,
    },
    /// Slide window is longer than the check window.
    SlideWindowExceedsCheckWindow {
        slide_window_ms: u32,
        check_window_ms: u32,
    },
    /// Check window is not an exact multiple of the slide window.
    WindowRatioNotIntegral {
        check_window_ms: u32,
        slide_window_ms: u32,
    },
    /// Noise suppression backends only operate at 8, 16, or 32 kHz.
    NoiseSuppressionUnsupportedRate { sample_rate_hz: u32 },
    /// Noise suppression is enabled but no denoiser factory was supplied.
    MissingDenoiserFactory,
    /// A talking ratio threshold is outside `0..=100`.
    RatioOutOfRange { ratio: u8 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::UnsupportedSampleRate { sample_rate_hz } => write!(
                f,
                "unsupported sample rate {sample_rate_hz}; expected 8000, 16000, 32000 or 48000",
            ),
            Self::CheckWindowNotAligned {
                check_window_ms,
                frame_duration_ms,
            } => write!(
                f,
                "check window {check_window_ms} ms must be positive and a multiple of 100 ms and of the {frame_duration_ms} ms frame duration",
            ),
            Self::SlideWindowNotAligned {
                slide_window_ms,
                frame_duration_ms,
            } => write!(
                f,
                "slide window {slide_window_ms} ms must be positive and a multiple of 100 ms and of the {frame_duration_ms} ms frame duration",
            ),
            Self::CheckWindowTooLong {
                check_window_ms,
                max_window_ms,
            } => write!(
                f,
                "check window {check_window_ms} ms exceeds the maximum of {max_window_ms} ms",
            ),
            Self::SlideWindowExceedsCheckWindow {
                slide_window_ms,
                check_window_ms,
            } => write!(
                f,
                "slide window {slide_window_ms} ms exceeds check window {check_window_ms} ms",
            ),
            Self::WindowRatioNotIntegral {
                check_window_ms,
                slide_window_ms,
            } => write!(
                f,
                "check window {check_window_ms} ms is not a multiple of slide window {slide_window_ms} ms",
            ),
            Self::NoiseSuppressionUnsupportedRate { sample_rate_hz } => write!(
                f,
                "noise suppression does not support {sample_rate_hz} Hz; expected 8000, 16000 or 32000",
            ),
            Self::MissingDenoiserFactory => write!(
                f,
                "noise suppression is enabled but no denoiser factory was supplied",
            ),
            Self::RatioOutOfRange { ratio } => {
                write!(f, "talking ratio {ratio} is outside 0..=100")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by session creation and [`VadSession::push`](crate::VadSession::push).
///
/// A per-call error (wrong block length, backend failure) leaves the session
/// usable for subsequent calls. The exception is a failed classifier
/// recreation under the uncorrelated policy, after which every push reports
/// [`Error::ClassifierUnavailable`].
#[derive(Debug)]
pub enum Error {
    /// Configuration validation failed.
    Config(ConfigError),
    /// The pushed block does not hold exactly one slide window of samples.
    BlockLength { expected: usize, actual: usize },
    /// An audio region is not an integral number of classifier frames.
    FrameAlignment {
        samples: usize,
        samples_per_frame: usize,
    },
    /// The classifier backend reported a failure.
    Classifier(BackendError),
    /// The denoiser backend reported a failure.
    Denoiser(BackendError),
    /// Classification succeeded but produced an unexpected decision count.
    DecisionCountMismatch { expected: usize, actual: usize },
    /// The session lost its classifier (a previous recreation failed) and
    /// must be dropped.
    ClassifierUnavailable,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::BlockLength { expected, actual } => write!(
                f,
                "audio block holds {actual} samples; expected exactly one slide window of {expected}",
            ),
            Self::FrameAlignment {
                samples,
                samples_per_frame,
            } => write!(
                f,
                "audio region of {samples} samples is not a multiple of the {samples_per_frame} sample frame",
            ),
            Self::Classifier(err) => write!(f, "classifier failed: {err}"),
            Self::Denoiser(err) => write!(f, "denoiser failed: {err}"),
            Self::DecisionCountMismatch { expected, actual } => write!(
                f,
                "classifier produced {actual} decisions; expected {expected}",
            ),
            Self::ClassifierUnavailable => {
                write!(f, "session classifier is gone; the session must be dropped")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Classifier(err) | Self::Denoiser(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_offending_values() {
        let err = ConfigError::WindowRatioNotIntegral {
            check_window_ms: 500,
            slide_window_ms: 300,
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("300"));
    }

    #[test]
    fn error_source_chains_to_backend() {
        use std::error::Error as _;

        let err = Error::Classifier(BackendError::new("mode rejected"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("mode rejected"));
    }
}
