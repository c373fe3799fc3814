//! Denoiser capability.
//!
//! Noise suppression is an external capability, like classification: the
//! session hands it one slide window and reads back a filtered window. Real
//! suppressors work in fixed 10 ms chunks (and may split bands or high-pass
//! internally); [`ChunkedDenoiser`] adapts such a backend to the
//! window-at-a-time [`Denoiser`] contract.

use crate::config::{NS_SAMPLE_RATES, NoiseSuppressionLevel};
use crate::error::BackendError;

/// Filters one slide window of mono 16-bit PCM.
pub trait Denoiser: Send {
    /// Denoise `src` into `dst`. Both must hold exactly one slide window.
    fn process(&mut self, src: &[i16], dst: &mut [i16]) -> Result<(), BackendError>;
}

/// Creates [`Denoiser`] instances, called once at session creation.
///
/// `samples_per_window` is the slide-window length the session will pass to
/// every [`Denoiser::process`] call.
pub trait DenoiserFactory: Send {
    /// Build a denoiser for the given rate, window length, and level.
    fn create(
        &self,
        sample_rate_hz: u32,
        samples_per_window: usize,
        level: NoiseSuppressionLevel,
    ) -> Result<Box<dyn Denoiser>, BackendError>;
}

/// Suppressor core operating on one 10 ms chunk in place.
///
/// This is the granularity real suppression backends expose; band splitting
/// or pre-filtering is the backend's own business.
pub trait DenoiseBackend: Send {
    /// Filter one 10 ms chunk in place.
    fn process_10ms(&mut self, chunk: &mut [i16]) -> Result<(), BackendError>;
}

/// Adapter that feeds a 10 ms [`DenoiseBackend`] one slide window at a time.
///
/// Copies the source window into an owned staging buffer, runs the backend
/// chunk by chunk over it, and copies the result out, so a backend failure
/// never leaves a half-filtered destination aliasing the source.
pub struct ChunkedDenoiser<B> {
    backend: B,
    samples_per_10ms: usize,
    samples_per_window: usize,
    staged: Vec<i16>,
}

impl<B: DenoiseBackend> ChunkedDenoiser<B> {
    /// Wrap `backend` for windows of `samples_per_window` at `sample_rate_hz`.
    ///
    /// The rate must be one of 8, 16 or 32 kHz and the window a positive
    /// multiple of 10 ms.
    pub fn new(
        backend: B,
        sample_rate_hz: u32,
        samples_per_window: usize,
    ) -> Result<Self, BackendError> {
        if !NS_SAMPLE_RATES.contains(&sample_rate_hz) {
            return Err(BackendError::new(format!(
                "noise suppression does not support {sample_rate_hz} Hz"
            )));
        }
        let samples_per_10ms = (sample_rate_hz / 100) as usize;
        if samples_per_window < samples_per_10ms || samples_per_window % samples_per_10ms != 0 {
            return Err(BackendError::new(format!(
                "window of {samples_per_window} samples is not a positive multiple of 10 ms"
            )));
        }
        Ok(Self {
            backend,
            samples_per_10ms,
            samples_per_window,
            staged: vec![0; samples_per_window],
        })
    }
}

impl<B: DenoiseBackend> Denoiser for ChunkedDenoiser<B> {
    fn process(&mut self, src: &[i16], dst: &mut [i16]) -> Result<(), BackendError> {
        if src.len() != self.samples_per_window || dst.len() != self.samples_per_window {
            return Err(BackendError::new(format!(
                "expected {} samples, got {} in / {} out",
                self.samples_per_window,
                src.len(),
                dst.len()
            )));
        }
        self.staged.copy_from_slice(src);
        for chunk in self.staged.chunks_exact_mut(self.samples_per_10ms) {
            self.backend.process_10ms(chunk)?;
        }
        dst.copy_from_slice(&self.staged);
        Ok(())
    }
}

impl<B> std::fmt::Debug for ChunkedDenoiser<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedDenoiser")
            .field("samples_per_10ms", &self.samples_per_10ms)
            .field("samples_per_window", &self.samples_per_window)
            .finish_non_exhaustive()
    }
}
