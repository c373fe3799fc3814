//! End-to-end pipeline tests: session → decision slices → talking tracker.

use talkgate::classifier::{ClassifierFactory, EnergyClassifierFactory, FrameClassifier};
use talkgate::{
    Aggressiveness, BackendError, CorrelationPolicy, Error, FrameDuration, SessionConfig,
    TalkingState, TalkingTracker, VadSession,
};

/// Factory for classifiers that replay a shared decision script.
struct ScriptedFactory {
    script: Vec<bool>,
}

struct ScriptedClassifier {
    script: Vec<bool>,
    next: usize,
}

impl FrameClassifier for ScriptedClassifier {
    fn classify(&mut self, _rate: u32, _frame: &[i16]) -> Result<bool, BackendError> {
        let decision = self.script[self.next % self.script.len()];
        self.next += 1;
        Ok(decision)
    }
}

impl ClassifierFactory for ScriptedFactory {
    fn create(
        &self,
        _rate: u32,
        _aggressiveness: Aggressiveness,
    ) -> Result<Box<dyn FrameClassifier>, BackendError> {
        Ok(Box::new(ScriptedClassifier {
            script: self.script.clone(),
            next: 0,
        }))
    }
}

fn silence(session: &VadSession) -> Vec<i16> {
    vec![0; session.samples_per_slide_window()]
}

fn loud(session: &VadSession) -> Vec<i16> {
    vec![8_000; session.samples_per_slide_window()]
}

#[test]
fn correlated_energy_pipeline_tracks_talking() {
    // 300 ms check window, 100 ms slide: the check window covers the last
    // three pushes. Feed silence, then speech, then silence again, and
    // expect one full start/stop cycle.
    let config = SessionConfig {
        sample_rate_hz: 8_000,
        check_window_ms: 300,
        slide_window_ms: 100,
        ..Default::default()
    };
    let mut session = VadSession::builder(config)
        .classifier_factory(EnergyClassifierFactory)
        .build()
        .unwrap();
    let mut tracker = TalkingTracker::new(70, 30).unwrap();

    let quiet = silence(&session);
    let speech = loud(&session);

    let mut states = Vec::new();
    for block in [&quiet, &quiet, &quiet, &speech, &speech, &speech, &quiet, &quiet, &quiet] {
        let decisions = session.push(block).unwrap().unwrap();
        states.push(tracker.evaluate(decisions));
    }

    assert!(states.contains(&TalkingState::StartTalking));
    assert!(states.contains(&TalkingState::StopTalking));
    let start = states
        .iter()
        .position(|&s| s == TalkingState::StartTalking)
        .unwrap();
    let stop = states
        .iter()
        .position(|&s| s == TalkingState::StopTalking)
        .unwrap();
    assert!(start < stop);
    assert!(!tracker.is_talking());
}

#[test]
fn mixture_pipeline_warms_up_then_tracks() {
    let config = SessionConfig {
        policy: CorrelationPolicy::Mixture,
        sample_rate_hz: 16_000,
        frame_duration: FrameDuration::Ms20,
        check_window_ms: 400,
        slide_window_ms: 200,
        ..Default::default()
    };
    let mut session = VadSession::builder(config).build().unwrap();
    let mut tracker = TalkingTracker::new(70, 30).unwrap();

    let speech = loud(&session);

    // First push: staging not yet a full check window.
    assert!(session.push(&speech).unwrap().is_none());

    // Second push completes the window; all frames are loud.
    let decisions = session.push(&speech).unwrap().unwrap();
    assert_eq!(decisions.len(), config.frames_per_check_window());
    assert_eq!(tracker.evaluate(decisions), TalkingState::StartTalking);
}

#[test]
fn scripted_transitions_match_expected_sequence() {
    // 10 frames per check window with a script that yields window ratios
    // 0%, 80%, 80%, 20% — the canonical none/start/talking/stop sequence.
    let config = SessionConfig {
        sample_rate_hz: 8_000,
        frame_duration: FrameDuration::Ms10,
        check_window_ms: 100,
        slide_window_ms: 100,
        ..Default::default()
    };
    let mut script = Vec::new();
    for ratio in [0usize, 8, 8, 2] {
        script.extend((0..10).map(|i| i < ratio));
    }
    let mut session = VadSession::builder(config)
        .classifier_factory(ScriptedFactory { script })
        .build()
        .unwrap();
    let mut tracker = TalkingTracker::new(70, 30).unwrap();

    let block = silence(&session);
    let states: Vec<TalkingState> = (0..4)
        .map(|_| {
            let decisions = session.push(&block).unwrap().unwrap();
            tracker.evaluate(decisions)
        })
        .collect();

    assert_eq!(
        states,
        [
            TalkingState::None,
            TalkingState::StartTalking,
            TalkingState::Talking,
            TalkingState::StopTalking,
        ]
    );
}

#[test]
fn block_length_errors_do_not_disturb_the_stream() {
    let config = SessionConfig::default();
    let mut session = VadSession::builder(config).build().unwrap();
    let good = loud(&session);
    let bad = vec![0i16; 3];

    let before: Vec<bool> = session.push(&good).unwrap().unwrap().to_vec();
    assert!(matches!(session.push(&bad), Err(Error::BlockLength { .. })));
    // The stream picks up exactly where it left off.
    let after: Vec<bool> = session.push(&good).unwrap().unwrap().to_vec();
    assert_eq!(before.len(), after.len());
    assert!(after.iter().any(|&d| d));
}

#[test]
fn sessions_are_independent_across_threads() {
    let config = SessionConfig::default();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(move || {
                let mut session = VadSession::builder(config).build().unwrap();
                let block = loud(&session);
                let mut last = Vec::new();
                for _ in 0..8 {
                    last = session.push(&block).unwrap().unwrap().to_vec();
                }
                last
            })
        })
        .collect();

    let results: Vec<Vec<bool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}
