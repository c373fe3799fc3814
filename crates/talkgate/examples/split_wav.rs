//! Split a mono WAV file into per-utterance files using VAD.
//!
//! Pushes the file through a session one slide window at a time; every
//! window where talking starts opens a new numbered output file, and the
//! file stays open until talking stops.
//!
//! ```sh
//! cargo run -p talkgate --features examples --example split_wav -- input.wav --policy mixture
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use hound::{WavReader, WavSpec, WavWriter};

use talkgate::{
    Aggressiveness, CorrelationPolicy, FrameDuration, SessionConfig, TalkingState, TalkingTracker,
    VadSession,
};

#[derive(Parser, Debug)]
#[command(about = "Split a mono WAV file into talking segments")]
struct Args {
    /// Input WAV file (mono, 16-bit PCM, 8/16/32/48 kHz).
    input: PathBuf,

    /// Directory for the split files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Classifier aggressiveness mode (0-3).
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    mode: u8,

    /// Classifier frame duration in milliseconds.
    #[arg(long, default_value = "20")]
    frame: FrameArg,

    /// Correlation policy.
    #[arg(long, default_value = "correlated")]
    policy: PolicyArg,

    /// Check window in milliseconds.
    #[arg(long, default_value_t = 300)]
    check_ms: u32,

    /// Slide window in milliseconds.
    #[arg(long, default_value_t = 100)]
    slide_ms: u32,

    /// Ratio above which talking starts (percent).
    #[arg(long, default_value_t = 70)]
    start_ratio: u8,

    /// Ratio at or below which talking stops (percent).
    #[arg(long, default_value_t = 30)]
    stop_ratio: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FrameArg {
    #[value(name = "10")]
    Ms10,
    #[value(name = "20")]
    Ms20,
    #[value(name = "30")]
    Ms30,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Correlated,
    Uncorrelated,
    Mixture,
}

/// Writes each talking segment to its own numbered WAV file.
struct SegmentWriter {
    out_dir: PathBuf,
    spec: WavSpec,
    writer: Option<WavWriter<std::io::BufWriter<std::fs::File>>>,
    sequence: u32,
}

impl SegmentWriter {
    fn new(out_dir: PathBuf, spec: WavSpec) -> Self {
        Self {
            out_dir,
            spec,
            writer: None,
            sequence: 0,
        }
    }

    fn handle(&mut self, state: TalkingState, block: &[i16]) -> Result<()> {
        match state {
            TalkingState::StartTalking => {
                self.sequence += 1;
                let path = self.out_dir.join(format!("split_{}.wav", self.sequence));
                println!("start talking -> {}", path.display());
                let mut writer = WavWriter::create(&path, self.spec)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                for &sample in block {
                    writer.write_sample(sample)?;
                }
                self.writer = Some(writer);
            }
            TalkingState::Talking => {
                if let Some(writer) = self.writer.as_mut() {
                    for &sample in block {
                        writer.write_sample(sample)?;
                    }
                }
            }
            TalkingState::StopTalking => {
                println!("stop talking");
                if let Some(writer) = self.writer.take() {
                    writer.finalize()?;
                }
            }
            TalkingState::None => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<u32> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(self.sequence)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut reader = WavReader::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        bail!("only mono files are supported; input has {} channels", spec.channels);
    }
    if spec.bits_per_sample != 16 {
        bail!("only 16-bit PCM is supported; input has {} bits", spec.bits_per_sample);
    }

    let config = SessionConfig {
        aggressiveness: match args.mode {
            0 => Aggressiveness::Quality,
            1 => Aggressiveness::LowBitrate,
            2 => Aggressiveness::Aggressive,
            _ => Aggressiveness::VeryAggressive,
        },
        frame_duration: match args.frame {
            FrameArg::Ms10 => FrameDuration::Ms10,
            FrameArg::Ms20 => FrameDuration::Ms20,
            FrameArg::Ms30 => FrameDuration::Ms30,
        },
        policy: match args.policy {
            PolicyArg::Correlated => CorrelationPolicy::Correlated,
            PolicyArg::Uncorrelated => CorrelationPolicy::Uncorrelated,
            PolicyArg::Mixture => CorrelationPolicy::Mixture,
        },
        noise_suppression: None,
        sample_rate_hz: spec.sample_rate,
        check_window_ms: args.check_ms,
        slide_window_ms: args.slide_ms,
    };

    let mut session = VadSession::builder(config)
        .build()
        .context("failed to create VAD session")?;
    let mut tracker = TalkingTracker::new(args.start_ratio, args.stop_ratio)?;
    let mut segments = SegmentWriter::new(args.out_dir.clone(), spec);

    let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
    let block_len = session.samples_per_slide_window();

    for block in samples.chunks_exact(block_len) {
        let Some(decisions) = session.push(block)? else {
            continue;
        };
        let speech = decisions.iter().filter(|&&d| d).count();
        println!(
            "voice detected in {speech} of {} frames ({:.2}%)",
            decisions.len(),
            100.0 * speech as f64 / decisions.len() as f64,
        );
        let state = tracker.evaluate(decisions);
        segments.handle(state, block)?;
    }

    let written = segments.finish()?;
    println!("wrote {written} segment(s)");
    Ok(())
}
