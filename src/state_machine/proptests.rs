//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::chat::ChatOutcome;
use crate::conversation::{Speaker, Turn};
use crate::speech::RecognitionErrorKind;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Initial),
        (0u32..12).prop_map(|idle_ticks| ConvState::Recording { idle_ticks }),
        Just(ConvState::Generating),
        any::<bool>().prop_map(|interrupted| ConvState::Speaking { interrupted }),
    ]
}

fn arb_outcome() -> impl Strategy<Value = ChatOutcome> {
    prop_oneof![
        "[a-zA-Z ]{1,20}".prop_map(ChatOutcome::Success),
        "[あ-ん]{1,10}".prop_map(ChatOutcome::Success),
        (1u32..4, "[a-z ]{1,10}")
            .prop_map(|(attempts, reason)| ChatOutcome::RetryableFailure { attempts, reason }),
        "[a-z ]{1,10}".prop_map(|reason| ChatOutcome::FatalFailure { reason }),
    ]
}

fn arb_recognition_error() -> impl Strategy<Value = RecognitionErrorKind> {
    prop_oneof![
        Just(RecognitionErrorKind::NoSpeech),
        Just(RecognitionErrorKind::Aborted),
        Just(RecognitionErrorKind::AudioCapture),
        Just(RecognitionErrorKind::Network),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::StartOrStopListening),
        Just(Event::InterruptSpeech),
        ("[a-zあ-ん ]{0,10}", any::<bool>()).prop_map(|(transcript, is_final)| {
            Event::RecognitionResult {
                transcript,
                is_final,
            }
        }),
        arb_recognition_error().prop_map(|kind| Event::RecognitionError { kind }),
        Just(Event::RecognitionStarted),
        Just(Event::RecognitionUnavailable {
            message: "gone".to_string()
        }),
        arb_outcome().prop_map(|outcome| Event::ChatReply { outcome }),
        Just(Event::SpeechFinished),
        Just(Event::IdleTick),
        Just(Event::IdleTick),
    ]
}

// ============================================================================
// Effect Validity Checkers
// ============================================================================

fn effects_are_valid(effects: &[Effect], new_state: &ConvState) -> bool {
    let has = |pred: fn(&Effect) -> bool| effects.iter().any(pred);

    // Synthesis only starts when the new state is Speaking
    if has(|e| matches!(e, Effect::Speak { .. })) && new_state.phase() != Phase::Speaking {
        return false;
    }

    // Chat is only requested on entry to Generating
    if has(|e| matches!(e, Effect::RequestChat)) && *new_state != ConvState::Generating {
        return false;
    }

    // A session is opened from Initial; Recording is only entered once it is live
    if has(|e| matches!(e, Effect::StartRecognition)) && *new_state != ConvState::Initial {
        return false;
    }

    // Only a live session is resumed
    if has(|e| matches!(e, Effect::ResumeRecognition)) && new_state.phase() != Phase::Recording {
        return false;
    }

    // Leaving Recording for Initial always tears the session down
    if has(|e| matches!(e, Effect::DestroyRecognition)) && *new_state != ConvState::Initial {
        return false;
    }

    true
}

/// Drive a sequence of events, collecting the turns that would be appended.
/// Opening a session always succeeds.
fn run(events: Vec<Event>) -> (ConvState, Vec<Turn>) {
    let ctx = ConvContext::default();
    let mut state = ConvState::Initial;
    let mut log = Vec::new();

    for event in events {
        let mut chain = vec![event];
        while let Some(current) = chain.pop() {
            let Ok(result) = transition(&state, &ctx, current) else {
                continue;
            };
            for effect in result.effects {
                match effect {
                    Effect::AppendTurn(turn) => log.push(turn),
                    Effect::StartRecognition => chain.push(Event::RecognitionStarted),
                    _ => {}
                }
            }
            state = result.new_state;
        }
    }

    (state, log)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: Effects are consistent with the state they lead to
    #[test]
    fn prop_effects_match_new_state(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &ConvContext::default(), event) {
            prop_assert!(
                effects_are_valid(&result.effects, &result.new_state),
                "Invalid effects for {:?} -> {:?}: {:?}",
                state,
                result.new_state,
                result.effects
            );
        }
    }

    // Invariant 2: Interim results never change state or append turns
    #[test]
    fn prop_interim_results_ignored(state in arb_state(), transcript in "[a-zあ-ん ]{0,20}") {
        let result = transition(
            &state,
            &ConvContext::default(),
            Event::RecognitionResult { transcript, is_final: false },
        ).unwrap();
        prop_assert_eq!(result.new_state, state);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 3: Interrupt outside Speaking is rejected with no effects
    #[test]
    fn prop_interrupt_only_while_speaking(state in arb_state()) {
        let result = transition(&state, &ConvContext::default(), Event::InterruptSpeech);
        if state.is_interruptible() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }

    // Invariant 4: Turns alternate User/Assistant, each user turn answered once
    #[test]
    fn prop_user_turns_answered_once(events in proptest::collection::vec(arb_event(), 0..60)) {
        let (state, log) = run(events);

        for (i, turn) in log.iter().enumerate() {
            let expected = if i % 2 == 0 { Speaker::User } else { Speaker::Assistant };
            prop_assert_eq!(turn.speaker, expected, "log out of order: {:?}", log);
        }

        // An odd log means a reply is still pending
        if log.len() % 2 == 1 {
            prop_assert_eq!(state, ConvState::Generating);
        }
    }

    // Invariant 5: A completed round trip adds exactly two turns
    #[test]
    fn prop_round_trip_adds_two_turns(
        transcript in "[a-zあ-ん]{1,10}",
        outcome in arb_outcome(),
    ) {
        let (_, log) = run(vec![
            Event::StartOrStopListening,
            Event::final_transcript(transcript.clone()),
            Event::ChatReply { outcome },
        ]);
        prop_assert_eq!(log.len(), 2);
        prop_assert_eq!(&log[0], &Turn::user(transcript));
        prop_assert_eq!(log[1].speaker, Speaker::Assistant);
    }

    // Invariant 6: Ten uninterrupted ticks in Recording always reach Initial
    #[test]
    fn prop_idle_timeout(noise in proptest::collection::vec(arb_recognition_error(), 0..5)) {
        let mut events = vec![Event::StartOrStopListening];
        events.extend(noise.into_iter().map(|kind| Event::RecognitionError { kind }));
        events.extend(std::iter::repeat_n(Event::IdleTick, 9));

        let (state, _) = run(events.clone());
        prop_assert_eq!(state.phase(), Phase::Recording);

        events.push(Event::IdleTick);
        let (state, log) = run(events);
        prop_assert_eq!(state, ConvState::Initial);
        prop_assert!(log.is_empty());
    }

    // Invariant 7: A failed session open never leaves Initial or announces anything
    #[test]
    fn prop_unavailable_engine_stays_silent(message in "[a-z ]{0,12}") {
        let ctx = ConvContext::default();
        let start = transition(&ConvState::Initial, &ctx, Event::StartOrStopListening).unwrap();
        prop_assert_eq!(&start.new_state, &ConvState::Initial);
        prop_assert!(!start.effects.contains(&Effect::NotifyStateChange));

        let failed = transition(&start.new_state, &ctx, Event::RecognitionUnavailable { message }).unwrap();
        prop_assert_eq!(failed.new_state, ConvState::Initial);
        prop_assert!(failed.effects.is_empty());
    }

    // Invariant 8: Every phase change is announced
    #[test]
    fn prop_phase_changes_notify(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &ConvContext::default(), event) {
            if result.new_state.phase() != state.phase() {
                prop_assert!(
                    result.effects.contains(&Effect::NotifyStateChange),
                    "Phase changed without notification: {:?} -> {:?}",
                    state,
                    result.new_state
                );
            }
        }
    }
}
