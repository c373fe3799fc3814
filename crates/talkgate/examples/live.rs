//! Live microphone talking detector.
//!
//! Captures mono audio with cpal, shuttles samples to a processing thread
//! over a ring buffer, and prints start/stop talking transitions as they
//! happen.
//!
//! ```sh
//! cargo run -p talkgate --features examples --example live
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Producer, Split};

use talkgate::{SessionConfig, TalkingState, TalkingTracker, VadSession};

const SAMPLE_RATE: u32 = 16_000;
const NUM_CHANNELS: u16 = 1;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let running = Arc::new(AtomicBool::new(true));

    ctrlc::set_handler({
        let running = running.clone();
        move || running.store(false, Ordering::SeqCst)
    })?;

    let host = cpal::default_host();
    let input_device = host
        .default_input_device()
        .context("no input device available")?;
    println!("Listening on: {}", input_device.name()?);

    let cpal_config = cpal::StreamConfig {
        channels: NUM_CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let config = SessionConfig {
        sample_rate_hz: SAMPLE_RATE,
        check_window_ms: 300,
        slide_window_ms: 100,
        ..Default::default()
    };
    let mut session = VadSession::builder(config).build()?;
    let mut tracker = TalkingTracker::new(70, 30)?;
    let block_len = session.samples_per_slide_window();

    // Input callback → processing thread.
    let (mut producer, mut consumer) = HeapRb::<i16>::new(block_len * 8).split();

    let input_stream = input_device.build_input_stream(
        &cpal_config,
        move |data: &[f32], _| {
            for &sample in data {
                let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                let _ = producer.try_push(pcm);
            }
        },
        |err| eprintln!("input stream error: {err}"),
        None,
    )?;
    input_stream.play()?;

    println!("Speak into the microphone; Ctrl-C to stop.");

    let worker = thread::spawn({
        let running = running.clone();
        move || -> Result<()> {
            let mut block = vec![0i16; block_len];
            let mut filled = 0;
            while running.load(Ordering::SeqCst) {
                filled += consumer.pop_slice(&mut block[filled..]);
                if filled < block_len {
                    thread::sleep(Duration::from_millis(10));
                    continue;
                }
                filled = 0;

                let Some(decisions) = session.push(&block)? else {
                    continue;
                };
                match tracker.evaluate(decisions) {
                    TalkingState::StartTalking => println!("START TALKING"),
                    TalkingState::StopTalking => println!("STOP TALKING"),
                    TalkingState::Talking | TalkingState::None => {}
                }
            }
            Ok(())
        }
    });

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    drop(input_stream);
    worker.join().expect("worker thread panicked")?;
    Ok(())
}
