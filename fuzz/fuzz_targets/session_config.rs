#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use talkgate::{FrameDuration, SessionConfig, VadSession};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sample_rate_hz: u32,
    frame_idx: u8,
    check_window_ms: u32,
    slide_window_ms: u32,
}

fuzz_target!(|input: FuzzInput| {
    let frame_duration = match input.frame_idx % 3 {
        0 => FrameDuration::Ms10,
        1 => FrameDuration::Ms20,
        _ => FrameDuration::Ms30,
    };
    // Range reaches past the maximum window duration so the bound itself
    // gets exercised.
    let config = SessionConfig {
        sample_rate_hz: input.sample_rate_hz,
        frame_duration,
        check_window_ms: input.check_window_ms % 1_000_000,
        slide_window_ms: input.slide_window_ms % 1_000_000,
        ..Default::default()
    };

    // Validation must agree with the builder: either both accept or both
    // reject, and neither panics.
    let validated = config.validate().is_ok();
    let built = VadSession::builder(config).build().is_ok();
    assert_eq!(validated, built);
});
