#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use talkgate::{CorrelationPolicy, SessionConfig, TalkingTracker, VadSession};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Sample rate index: 0=8k, 1=16k, 2=32k, 3=48k
    sample_rate_idx: u8,
    /// Correlation policy index
    policy_idx: u8,
    /// Audio samples, sliced into push blocks (last partial block is pushed
    /// as-is to exercise the length check)
    samples: Vec<i16>,
}

fn sample_rate(idx: u8) -> u32 {
    match idx % 4 {
        0 => 8000,
        1 => 16000,
        2 => 32000,
        _ => 48000,
    }
}

fn policy(idx: u8) -> CorrelationPolicy {
    match idx % 3 {
        0 => CorrelationPolicy::Correlated,
        1 => CorrelationPolicy::Uncorrelated,
        _ => CorrelationPolicy::Mixture,
    }
}

fuzz_target!(|input: FuzzInput| {
    let config = SessionConfig {
        sample_rate_hz: sample_rate(input.sample_rate_idx),
        policy: policy(input.policy_idx),
        check_window_ms: 300,
        slide_window_ms: 100,
        ..Default::default()
    };
    let Ok(mut session) = VadSession::builder(config).build() else {
        return;
    };
    let Ok(mut tracker) = TalkingTracker::new(70, 30) else {
        return;
    };

    let block_len = session.samples_per_slide_window();
    for block in input.samples.chunks(block_len) {
        match session.push(block) {
            Ok(Some(decisions)) => {
                let _ = tracker.evaluate(decisions);
            }
            Ok(None) => {}
            Err(_) => {}
        }
    }
});
