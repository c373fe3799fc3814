//! Per-stream VAD session: lifecycle, slide-window aggregation, and the
//! three correlation policies.
//!
//! A session owns its buffers and backend handles exclusively; `&mut self`
//! on [`VadSession::push`] makes concurrent use of one session
//! unrepresentable, and independent sessions are free to run on separate
//! threads.
//!
//! Buffer layout (all sizes derived from the validated config):
//!
//! ```text
//! staging:   [ check window | check window mirror ]   (samples, Mixture)
//! scratch:   [ slide window ]                          (denoiser output)
//! decisions: [ check window | check window mirror ]   (frames, Correlated)
//! ```
//!
//! The mirrors guarantee that a check-window read starting anywhere inside
//! the first half never wraps: every write lands at the cursor and again one
//! check window ahead.

use tracing::{debug, trace, warn};

use crate::classifier::{ClassifierFactory, EnergyClassifierFactory, FrameClassifier};
use crate::config::{CorrelationPolicy, SUPPORTED_SAMPLE_RATES, SessionConfig};
use crate::denoiser::{Denoiser, DenoiserFactory};
use crate::error::{ConfigError, Error};

/// Builder for [`VadSession`].
///
/// Without an explicit classifier factory the built-in energy classifier is
/// used. A denoiser factory is required exactly when the config enables
/// noise suppression.
pub struct SessionBuilder {
    config: SessionConfig,
    classifier_factory: Option<Box<dyn ClassifierFactory>>,
    denoiser_factory: Option<Box<dyn DenoiserFactory>>,
}

impl SessionBuilder {
    /// Use `factory` to create the session classifier (and to recreate it
    /// per push under [`CorrelationPolicy::Uncorrelated`]).
    pub fn classifier_factory(mut self, factory: impl ClassifierFactory + 'static) -> Self {
        self.classifier_factory = Some(Box::new(factory));
        self
    }

    /// Use `factory` to create the denoiser when noise suppression is
    /// enabled in the config.
    pub fn denoiser_factory(mut self, factory: impl DenoiserFactory + 'static) -> Self {
        self.denoiser_factory = Some(Box::new(factory));
        self
    }

    /// Validate the config, create the backends, and allocate the buffers.
    pub fn build(self) -> Result<VadSession, Error> {
        let config = self.config;
        config.validate()?;

        let samples_per_frame = config.samples_per_frame();
        let samples_per_slide = config.samples_per_slide_window();
        let samples_per_check = config.samples_per_check_window();
        let frames_per_slide = config.frames_per_slide_window();
        let frames_per_check = config.frames_per_check_window();

        let classifier_factory = self
            .classifier_factory
            .unwrap_or_else(|| Box::new(EnergyClassifierFactory));
        let classifier = classifier_factory
            .create(config.sample_rate_hz, config.aggressiveness)
            .map_err(Error::Classifier)?;

        let denoiser = match config.noise_suppression {
            Some(ns) => {
                let factory = self
                    .denoiser_factory
                    .ok_or(Error::Config(ConfigError::MissingDenoiserFactory))?;
                Some(
                    factory
                        .create(config.sample_rate_hz, samples_per_slide, ns.level)
                        .map_err(Error::Denoiser)?,
                )
            }
            None => None,
        };

        debug!(
            sample_rate_hz = config.sample_rate_hz,
            ?config.policy,
            check_window_ms = config.check_window_ms,
            slide_window_ms = config.slide_window_ms,
            frames_per_check,
            denoise = denoiser.is_some(),
            "created vad session"
        );

        Ok(VadSession {
            config,
            classifier: Some(classifier),
            classifier_factory,
            denoiser,
            staging: vec![0; samples_per_check * 2],
            scratch: vec![0; samples_per_slide],
            decisions: vec![false; frames_per_check * 2],
            staging_pos: 0,
            decision_pos: 0,
            pushes: 0,
            samples_per_frame,
            samples_per_slide,
            samples_per_check,
            frames_per_slide,
            frames_per_check,
        })
    }
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Stateful VAD pipeline over one mono PCM stream.
///
/// Feed audio with [`push`](Self::push) in exact slide-window blocks; each
/// successful push yields the per-frame decisions for the most recent check
/// window, ready for a [`TalkingTracker`](crate::TalkingTracker).
///
/// # Example
///
/// ```
/// use talkgate::{SessionConfig, VadSession};
///
/// let config = SessionConfig::default();
/// let mut session = VadSession::builder(config).build()?;
/// let expected = session.decisions_per_check_window();
/// let block = vec![0i16; config.samples_per_slide_window()];
/// let decisions = session.push(&block)?;
/// assert_eq!(decisions.unwrap().len(), expected);
/// # Ok::<(), talkgate::Error>(())
/// ```
pub struct VadSession {
    config: SessionConfig,
    /// `None` after a failed recreation; the session is then unusable.
    classifier: Option<Box<dyn FrameClassifier>>,
    classifier_factory: Box<dyn ClassifierFactory>,
    denoiser: Option<Box<dyn Denoiser>>,
    staging: Vec<i16>,
    scratch: Vec<i16>,
    decisions: Vec<bool>,
    staging_pos: usize,
    decision_pos: usize,
    pushes: u64,
    samples_per_frame: usize,
    samples_per_slide: usize,
    samples_per_check: usize,
    frames_per_slide: usize,
    frames_per_check: usize,
}

impl VadSession {
    /// Start building a session from `config`.
    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            classifier_factory: None,
            denoiser_factory: None,
        }
    }

    /// The configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Length of every decision slice returned by [`push`](Self::push):
    /// check-window duration divided by frame duration.
    pub fn decisions_per_check_window(&self) -> usize {
        self.frames_per_check
    }

    /// Number of samples every [`push`](Self::push) block must hold.
    pub fn samples_per_slide_window(&self) -> usize {
        self.samples_per_slide
    }

    /// Push one slide window of audio and retrieve the decision slice for
    /// the most recent check window.
    ///
    /// Returns `Ok(None)` while the staging buffer has not yet accumulated a
    /// full check window (mixture and uncorrelated policies only); that is a
    /// warm-up condition, not a failure. The returned slice is valid until
    /// the next push.
    ///
    /// # Errors
    ///
    /// [`Error::BlockLength`] if `block` is not exactly one slide window;
    /// the session state is untouched. [`Error::Denoiser`] /
    /// [`Error::Classifier`] if a backend fails; the session remains usable
    /// unless the failure was a classifier recreation, which leaves every
    /// subsequent push returning [`Error::ClassifierUnavailable`].
    pub fn push(&mut self, block: &[i16]) -> Result<Option<&[bool]>, Error> {
        if self.classifier.is_none() {
            return Err(Error::ClassifierUnavailable);
        }
        if block.len() != self.samples_per_slide {
            return Err(Error::BlockLength {
                expected: self.samples_per_slide,
                actual: block.len(),
            });
        }

        let denoised = match self.denoiser.as_mut() {
            Some(denoiser) => {
                denoiser
                    .process(block, &mut self.scratch)
                    .map_err(Error::Denoiser)?;
                true
            }
            None => false,
        };

        trace!(policy = ?self.config.policy, pushes = self.pushes, "push slide window");

        match self.config.policy {
            CorrelationPolicy::Correlated => self.merge_correlated(block, denoised),
            CorrelationPolicy::Uncorrelated => {
                self.recreate_classifier()?;
                self.merge_mixture(block, denoised)
            }
            CorrelationPolicy::Mixture => self.merge_mixture(block, denoised),
        }
    }

    /// Correlated merge: decisions for the new window land at the decision
    /// cursor and are mirrored one check window ahead, so the slice starting
    /// at the advanced cursor is the latest check window in temporal order.
    fn merge_correlated(&mut self, block: &[i16], denoised: bool) -> Result<Option<&[bool]>, Error> {
        let start = self.decision_pos;
        let frames_per_slide = self.frames_per_slide;
        let frames_per_check = self.frames_per_check;

        let count = {
            let pre: &[i16] = if denoised { &self.scratch } else { block };
            let classifier = self
                .classifier
                .as_mut()
                .ok_or(Error::ClassifierUnavailable)?;
            classify_window(
                &mut **classifier,
                self.config.sample_rate_hz,
                self.samples_per_frame,
                pre,
                &mut self.decisions[start..start + frames_per_slide],
            )?
        };
        if count != frames_per_slide {
            return Err(Error::DecisionCountMismatch {
                expected: frames_per_slide,
                actual: count,
            });
        }

        self.decisions
            .copy_within(start..start + frames_per_slide, start + frames_per_check);
        self.decision_pos += frames_per_slide;
        let slice_start = self.decision_pos;
        if self.decision_pos >= frames_per_check {
            self.decision_pos = 0;
        }
        Ok(Some(&self.decisions[slice_start..slice_start + frames_per_check]))
    }

    /// Mixture merge, shared by the uncorrelated policy: audio (not
    /// decisions) accumulates in the mirrored staging buffer, and the whole
    /// check window behind the advanced cursor is reclassified every push.
    fn merge_mixture(&mut self, block: &[i16], denoised: bool) -> Result<Option<&[bool]>, Error> {
        let samples_per_slide = self.samples_per_slide;
        let samples_per_check = self.samples_per_check;
        let frames_per_check = self.frames_per_check;
        let pos = self.staging_pos;

        {
            let pre: &[i16] = if denoised { &self.scratch } else { block };
            self.staging[pos..pos + samples_per_slide].copy_from_slice(pre);
            self.staging[pos + samples_per_check..pos + samples_per_check + samples_per_slide]
                .copy_from_slice(pre);
        }
        self.staging_pos += samples_per_slide;
        self.pushes += 1;
        let read = self.staging_pos;

        let result = match self.classifier.as_mut() {
            Some(classifier) => classify_window(
                &mut **classifier,
                self.config.sample_rate_hz,
                self.samples_per_frame,
                &self.staging[read..read + samples_per_check],
                &mut self.decisions[..frames_per_check],
            ),
            None => Err(Error::ClassifierUnavailable),
        };

        // The cursor wraps whether or not classification succeeded; staging
        // holds valid audio either way.
        if self.staging_pos >= samples_per_check {
            self.staging_pos = 0;
        }

        let count = result?;
        if count != frames_per_check {
            return Err(Error::DecisionCountMismatch {
                expected: frames_per_check,
                actual: count,
            });
        }

        // Until a full check window has been pushed the region behind the
        // cursor still contains zeroed samples: not yet a decision.
        if self.pushes < self.config.slide_windows_per_check_window() as u64 {
            return Ok(None);
        }
        Ok(Some(&self.decisions[..frames_per_check]))
    }

    /// Drop and rebuild the classifier so no state carries across windows.
    /// A factory failure leaves the session without a classifier for good.
    fn recreate_classifier(&mut self) -> Result<(), Error> {
        self.classifier = None;
        match self
            .classifier_factory
            .create(self.config.sample_rate_hz, self.config.aggressiveness)
        {
            Ok(classifier) => {
                self.classifier = Some(classifier);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "classifier recreation failed; session is unusable");
                Err(Error::Classifier(err))
            }
        }
    }
}

impl std::fmt::Debug for VadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VadSession")
            .field("config", &self.config)
            .field("staging_pos", &self.staging_pos)
            .field("decision_pos", &self.decision_pos)
            .field("pushes", &self.pushes)
            .finish_non_exhaustive()
    }
}

/// Split `audio` into classifier frames and classify them in order into
/// `out`, returning how many decisions were produced.
///
/// Re-validates rate and frame alignment even though creation already did;
/// the helper stays safe to call on arbitrary regions.
fn classify_window(
    classifier: &mut dyn FrameClassifier,
    sample_rate_hz: u32,
    samples_per_frame: usize,
    audio: &[i16],
    out: &mut [bool],
) -> Result<usize, Error> {
    if !SUPPORTED_SAMPLE_RATES.contains(&sample_rate_hz) {
        return Err(Error::Config(ConfigError::UnsupportedSampleRate { sample_rate_hz }));
    }
    if audio.is_empty() || samples_per_frame == 0 || audio.len() % samples_per_frame != 0 {
        return Err(Error::FrameAlignment {
            samples: audio.len(),
            samples_per_frame,
        });
    }

    let mut count = 0;
    for frame in audio.chunks_exact(samples_per_frame) {
        out[count] = classifier
            .classify(sample_rate_hz, frame)
            .map_err(Error::Classifier)?;
        count += 1;
    }
    Ok(count)
}
