//! Property tests over configuration invariants and push behavior.

use proptest::prelude::*;
use test_strategy::proptest;

use talkgate::{
    CorrelationPolicy, FrameDuration, SessionConfig, TalkingTracker, VadSession, speech_ratio,
};

const RATES: [u32; 4] = [8_000, 16_000, 32_000, 48_000];
const FRAMES: [FrameDuration; 3] = [FrameDuration::Ms10, FrameDuration::Ms20, FrameDuration::Ms30];
const POLICIES: [CorrelationPolicy; 3] = [
    CorrelationPolicy::Correlated,
    CorrelationPolicy::Uncorrelated,
    CorrelationPolicy::Mixture,
];

/// Smallest slide window that is a multiple of both 100 ms and the frame.
fn base_slide_ms(frame: FrameDuration) -> u32 {
    match frame {
        FrameDuration::Ms10 | FrameDuration::Ms20 => 100,
        FrameDuration::Ms30 => 300,
    }
}

#[proptest]
fn valid_configs_always_build(
    #[strategy(0usize..4)] rate_idx: usize,
    #[strategy(0usize..3)] frame_idx: usize,
    #[strategy(0usize..3)] policy_idx: usize,
    #[strategy(1u32..=3)] slide_factor: u32,
    #[strategy(1u32..=4)] windows_per_check: u32,
) {
    let frame = FRAMES[frame_idx];
    let slide_window_ms = base_slide_ms(frame) * slide_factor;
    let config = SessionConfig {
        sample_rate_hz: RATES[rate_idx],
        frame_duration: frame,
        policy: POLICIES[policy_idx],
        check_window_ms: slide_window_ms * windows_per_check,
        slide_window_ms,
        ..Default::default()
    };

    prop_assert!(config.validate().is_ok());
    let session = VadSession::builder(config).build().unwrap();
    prop_assert_eq!(
        session.decisions_per_check_window(),
        (config.check_window_ms / config.frame_duration.as_ms()) as usize
    );
}

#[proptest]
fn push_never_panics_on_arbitrary_audio(
    #[strategy(0usize..3)] policy_idx: usize,
    #[strategy(proptest::collection::vec(any::<i16>(), 0..4000))] samples: Vec<i16>,
) {
    let config = SessionConfig {
        policy: POLICIES[policy_idx],
        ..Default::default()
    };
    let mut session = VadSession::builder(config).build().unwrap();
    let expected = session.samples_per_slide_window();

    // Wrong lengths must error, exact lengths must succeed; neither panics.
    let result = session.push(&samples);
    if samples.len() == expected {
        prop_assert!(result.is_ok());
    } else {
        prop_assert!(result.is_err());
    }
}

#[proptest]
fn decision_slice_is_stable_across_wraparound(
    #[strategy(2u32..=4)] windows_per_check: u32,
    #[strategy(1usize..=20)] pushes: usize,
) {
    let config = SessionConfig {
        check_window_ms: 100 * windows_per_check,
        slide_window_ms: 100,
        ..Default::default()
    };
    let mut session = VadSession::builder(config).build().unwrap();
    let block = vec![0i16; session.samples_per_slide_window()];

    for _ in 0..pushes {
        let decisions = session.push(&block).unwrap().unwrap();
        prop_assert_eq!(decisions.len(), config.frames_per_check_window());
    }
}

#[proptest]
fn ratio_is_bounded_and_monotone(
    #[strategy(proptest::collection::vec(any::<bool>(), 1..200))] decisions: Vec<bool>,
) {
    let ratio = speech_ratio(&decisions);
    prop_assert!(ratio <= 100);

    // Flipping a non-speech frame to speech never lowers the ratio.
    if let Some(idx) = decisions.iter().position(|&d| !d) {
        let mut louder = decisions.clone();
        louder[idx] = true;
        prop_assert!(speech_ratio(&louder) >= ratio);
    }
}

#[proptest]
fn tracker_state_is_consistent_with_transitions(
    #[strategy(proptest::collection::vec(0usize..=10, 1..40))] speech_counts: Vec<usize>,
) {
    let mut tracker = TalkingTracker::new(70, 30).unwrap();
    for speech in speech_counts {
        let window: Vec<bool> = (0..10).map(|i| i < speech).collect();
        let was_talking = tracker.is_talking();
        let state = tracker.evaluate(&window);
        match state {
            talkgate::TalkingState::StartTalking => {
                prop_assert!(!was_talking);
                prop_assert!(tracker.is_talking());
            }
            talkgate::TalkingState::StopTalking => {
                prop_assert!(was_talking);
                prop_assert!(!tracker.is_talking());
            }
            talkgate::TalkingState::Talking => prop_assert!(was_talking && tracker.is_talking()),
            talkgate::TalkingState::None => {
                prop_assert!(!was_talking);
                prop_assert!(!tracker.is_talking());
            }
        }
    }
}
