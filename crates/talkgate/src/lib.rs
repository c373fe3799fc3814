//! Windowed voice activity detection for gating speech-driven pipelines.
//!
//! Buffers a mono 16-bit PCM stream into fixed slide windows, optionally
//! denoises each window, classifies it frame by frame, merges the decisions
//! under one of three temporal-correlation policies, and reduces the latest
//! check window to talking/not-talking transitions with hysteresis.
//!
//! The classifier and denoiser numerics are external capabilities behind
//! the [`FrameClassifier`] and [`Denoiser`] traits; a simple energy
//! classifier ships as the default backend.
//!
//! # Quick Start
//!
//! ```
//! use talkgate::{SessionConfig, TalkingState, TalkingTracker, VadSession};
//!
//! let config = SessionConfig::default(); // 8 kHz, 300 ms check, 100 ms slide
//! let mut session = VadSession::builder(config).build()?;
//! let mut tracker = TalkingTracker::new(70, 30)?;
//!
//! // For each slide window of captured audio:
//! let block = vec![0i16; session.samples_per_slide_window()];
//! if let Some(decisions) = session.push(&block)? {
//!     match tracker.evaluate(decisions) {
//!         TalkingState::StartTalking => println!("speech started"),
//!         TalkingState::StopTalking => println!("speech stopped"),
//!         _ => {}
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod config;
pub mod denoiser;
mod error;
mod session;
mod tracker;

// Public re-exports.
pub use classifier::{ClassifierFactory, EnergyClassifier, FrameClassifier};
pub use config::{
    Aggressiveness, CorrelationPolicy, FrameDuration, NoiseSuppression, SessionConfig,
};
pub use denoiser::{Denoiser, DenoiserFactory};
pub use error::{BackendError, ConfigError, Error};
pub use session::{SessionBuilder, VadSession};
pub use tracker::{TalkingState, TalkingTracker, speech_ratio};
