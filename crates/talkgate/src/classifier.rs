//! Frame-classifier capability.
//!
//! The speech/non-speech decision for a single frame is an external
//! capability: the session drives it but never looks inside. A factory is
//! part of the contract because the uncorrelated policy discards and
//! recreates the classifier before every window.
//!
//! [`EnergyClassifier`] is the built-in default backend, an absolute-energy
//! gate scored over the frame's 8 kHz-equivalent sample count.

use crate::config::Aggressiveness;
use crate::error::BackendError;

/// Classifies one fixed-duration frame of mono 16-bit PCM as speech or not.
///
/// Implementations may be stateful across frames; whether that state is
/// allowed to persist across slide windows is the session's concern (see
/// [`CorrelationPolicy`](crate::CorrelationPolicy)).
pub trait FrameClassifier: Send {
    /// Classify `frame` at the given sample rate. Returns `true` for speech.
    fn classify(&mut self, sample_rate_hz: u32, frame: &[i16]) -> Result<bool, BackendError>;
}

/// Creates [`FrameClassifier`] instances.
///
/// Called once at session creation, and again before every push under the
/// uncorrelated policy.
pub trait ClassifierFactory: Send {
    /// Build a fresh classifier for the given rate and aggressiveness.
    fn create(
        &self,
        sample_rate_hz: u32,
        aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn FrameClassifier>, BackendError>;
}

/// Mean-absolute-energy threshold per aggressiveness mode.
const ENERGY_THRESHOLDS: [u32; 4] = [100, 150, 250, 400];

/// Energy-gate classifier: a frame is speech when its absolute energy over
/// the 8 kHz-equivalent frame length clears a threshold.
#[derive(Debug, Clone)]
pub struct EnergyClassifier {
    threshold: u32,
}

impl EnergyClassifier {
    /// Create a classifier with an explicit score threshold.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Create a classifier with the stock threshold for `aggressiveness`.
    pub fn for_mode(aggressiveness: Aggressiveness) -> Self {
        Self::new(ENERGY_THRESHOLDS[aggressiveness.as_mode() as usize])
    }
}

impl FrameClassifier for EnergyClassifier {
    fn classify(&mut self, sample_rate_hz: u32, frame: &[i16]) -> Result<bool, BackendError> {
        if frame.is_empty() {
            return Err(BackendError::new("empty frame"));
        }
        // Score against the frame's 8 kHz-equivalent sample count.
        let divisor = (sample_rate_hz / 8_000).max(1) as u64;
        let energy: u64 = frame.iter().map(|s| u64::from(s.unsigned_abs())).sum();
        let score = energy / (frame.len() as u64 / divisor).max(1);
        Ok(score >= u64::from(self.threshold))
    }
}

/// Factory for the built-in [`EnergyClassifier`]; the default when a session
/// is built without an explicit classifier factory.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyClassifierFactory;

impl ClassifierFactory for EnergyClassifierFactory {
    fn create(
        &self,
        _sample_rate_hz: u32,
        aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn FrameClassifier>, BackendError> {
        Ok(Box::new(EnergyClassifier::for_mode(aggressiveness)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_not_speech() {
        let mut classifier = EnergyClassifier::for_mode(Aggressiveness::Quality);
        let frame = [0i16; 160];
        assert!(!classifier.classify(8_000, &frame).unwrap());
    }

    #[test]
    fn loud_signal_is_speech() {
        let mut classifier = EnergyClassifier::for_mode(Aggressiveness::Quality);
        let frame = [8_000i16; 160];
        assert!(classifier.classify(8_000, &frame).unwrap());
    }

    #[test]
    fn empty_frame_is_rejected() {
        let mut classifier = EnergyClassifier::new(100);
        assert!(classifier.classify(8_000, &[]).is_err());
    }

    #[test]
    fn wideband_frames_classify() {
        let mut classifier = EnergyClassifier::for_mode(Aggressiveness::Quality);
        let loud = [8_000i16; 960];
        let quiet = [0i16; 960];
        assert!(classifier.classify(48_000, &loud).unwrap());
        assert!(!classifier.classify(48_000, &quiet).unwrap());
    }

    #[test]
    fn higher_modes_are_stricter() {
        let frame = [200i16; 160];
        let mut quality = EnergyClassifier::for_mode(Aggressiveness::Quality);
        let mut very_aggressive = EnergyClassifier::for_mode(Aggressiveness::VeryAggressive);
        assert!(quality.classify(8_000, &frame).unwrap());
        assert!(!very_aggressive.classify(8_000, &frame).unwrap());
    }
}
