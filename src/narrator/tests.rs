use super::{Effect, Narrator, Phase};
use crate::config::NarratorConfig;
use crate::engine::{EngineEvent, SpeechEngine, SpeechRequest, VoiceInfo};
use crate::error::{SpeechError, SpeechResult};
use crate::layout::{PageInput, RegionHandle};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct EngineLog {
    requests: Vec<SpeechRequest>,
    cancels: usize,
    pauses: usize,
    resumes: usize,
    speaking: bool,
    paused: bool,
    fail_next_speak: bool,
}

/// Records every command; playback progress is driven by the tests through
/// `Narrator::on_engine_event`.
struct ScriptedEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl SpeechEngine for ScriptedEngine {
    fn speak(&mut self, request: SpeechRequest) -> SpeechResult<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_next_speak {
            log.fail_next_speak = false;
            return Err(SpeechError::Synthesis("scripted failure".into()));
        }
        log.speaking = true;
        log.paused = false;
        log.requests.push(request);
        Ok(())
    }

    fn cancel(&mut self) {
        let mut log = self.log.borrow_mut();
        log.cancels += 1;
        log.speaking = false;
    }

    fn pause(&mut self) {
        let mut log = self.log.borrow_mut();
        log.pauses += 1;
        log.paused = true;
    }

    fn resume(&mut self) {
        let mut log = self.log.borrow_mut();
        log.resumes += 1;
        log.paused = false;
    }

    fn is_speaking(&self) -> bool {
        self.log.borrow().speaking
    }

    fn is_paused(&self) -> bool {
        self.log.borrow().paused
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        vec![
            VoiceInfo {
                id: "samantha".into(),
                language: "en-US".into(),
                default: true,
            },
            VoiceInfo {
                id: "daniel".into(),
                language: "en-GB".into(),
                default: false,
            },
        ]
    }
}

fn narrator() -> (Narrator, Rc<RefCell<EngineLog>>) {
    let log = Rc::new(RefCell::new(EngineLog::default()));
    let engine = ScriptedEngine {
        log: Rc::clone(&log),
    };
    let narrator = Narrator::new(Box::new(engine), NarratorConfig::default());
    (narrator, log)
}

/// Deterministic text where the character at offset `i` is the digit
/// `i % 10`, so sliced request payloads can be checked exactly.
fn digits(len: usize) -> String {
    (0..len).map(|i| char::from(b'0' + (i % 10) as u8)).collect()
}

fn restart_id(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::ScheduleRestart { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("a restart should be scheduled")
}

fn advance_id(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::ScheduleAdvance { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("an auto-advance should be scheduled")
}

fn last_request(log: &Rc<RefCell<EngineLog>>) -> SpeechRequest {
    log.borrow().requests.last().expect("a speech request").clone()
}

#[test]
fn play_speaks_first_chunk_and_boundaries_move_the_cursor() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    let request = last_request(&log);
    assert_eq!(request.text.chars().count(), 3000);

    let effects = narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 42,
        char_length: Some(5),
    });
    assert_eq!(narrator.status().current_offset, 42);
    assert!(effects.contains(&Effect::SetSelection { start: 42, end: 47 }));
}

#[test]
fn boundary_length_defaults_to_one_character() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(100));
    narrator.play();
    let request = last_request(&log);

    let effects = narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 10,
        char_length: None,
    });
    assert!(effects.contains(&Effect::SetSelection { start: 10, end: 11 }));
}

#[test]
fn jump_resolves_chunk_address_and_round_trips() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));

    let effects = narrator.jump_to(3500);
    let id = restart_id(&effects);
    narrator.on_restart_due(id);

    let request = last_request(&log);
    let expected: String = digits(7000).chars().skip(3500).take(2500).collect();
    assert_eq!(request.text, expected);
    assert_eq!(narrator.status().current_offset, 3500);
    assert_eq!(narrator.status().chunk_index, 1);
}

#[test]
fn jump_round_trips_across_chunk_boundaries() {
    let (mut narrator, _log) = narrator();
    narrator.load_text(digits(7000));
    for offset in [0usize, 1, 2999, 3000, 4500, 5999, 6000, 6999] {
        let effects = narrator.jump_to(offset);
        narrator.on_restart_due(restart_id(&effects));
        assert_eq!(narrator.status().current_offset, offset);
    }
}

#[test]
fn voice_change_mid_playback_restarts_at_tracked_word() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    // Finish chunk 0, let the advance fire, land in chunk 1.
    let first = last_request(&log);
    let effects = narrator.on_engine_event(EngineEvent::Ended {
        request_id: first.request_id,
    });
    narrator.on_advance_due(advance_id(&effects));
    let second = last_request(&log);

    // Word confirmed at global offset 3000 + 1200 = 4200.
    narrator.on_engine_event(EngineEvent::Boundary {
        request_id: second.request_id,
        char_index: 1200,
        char_length: Some(4),
    });
    assert_eq!(narrator.status().current_offset, 4200);

    let effects = narrator.set_voice("daniel");
    let cancels = log.borrow().cancels;
    assert!(cancels >= 1);

    // A completion the engine fires after the cancel must be inert.
    let stale = narrator.on_engine_event(EngineEvent::Ended {
        request_id: second.request_id,
    });
    assert!(stale.is_empty());
    assert_eq!(log.borrow().requests.len(), 2);

    narrator.on_restart_due(restart_id(&effects));
    let restarted = last_request(&log);
    let expected: String = digits(7000).chars().skip(4200).take(1800).collect();
    assert_eq!(restarted.text, expected);
    assert_eq!(restarted.voice.as_deref(), Some("daniel"));
    assert_eq!(log.borrow().requests.len(), 3);
}

#[test]
fn rapid_settings_changes_collapse_into_one_restart() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    let first = narrator.set_rate(1.5);
    let id = restart_id(&first);
    // Second change lands inside the settle window: suppressed.
    let second = narrator.set_volume(0.5);
    assert!(
        !second
            .iter()
            .any(|e| matches!(e, Effect::ScheduleRestart { .. }))
    );

    narrator.on_restart_due(id);
    assert_eq!(log.borrow().requests.len(), 2);
    let request = last_request(&log);
    // Both stored values apply to the single restarted request.
    assert_eq!(request.rate, 1.5);
    assert_eq!(request.volume, 0.5);
    assert!(matches!(narrator.phase(), Phase::Playing));
}

#[test]
fn settings_change_while_paused_does_not_resume() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();
    narrator.pause();

    let effects = narrator.set_rate(2.0);
    assert!(effects.is_empty());
    assert!(narrator.status().is_paused);
    assert_eq!(log.borrow().requests.len(), 1);

    // Only play (resume in place) or an explicit jump restarts.
    narrator.play();
    assert_eq!(log.borrow().resumes, 1);
    assert!(narrator.status().is_playing);
}

#[test]
fn jump_while_paused_forces_playback() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();
    narrator.pause();

    let effects = narrator.jump_to(100);
    narrator.on_restart_due(restart_id(&effects));
    assert!(narrator.status().is_playing);
    assert_eq!(log.borrow().requests.len(), 2);
}

#[test]
fn live_drag_updates_do_not_restart() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    assert!(narrator.set_rate_live(1.2).is_empty());
    assert!(narrator.set_rate_live(1.4).is_empty());
    assert!(narrator.set_volume_live(0.3).is_empty());
    assert_eq!(log.borrow().requests.len(), 1);
    assert_eq!(log.borrow().cancels, 0);
}

#[test]
fn chunk_without_boundaries_resumes_at_chunk_base() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    let first = last_request(&log);
    let effects = narrator.on_engine_event(EngineEvent::Ended {
        request_id: first.request_id,
    });
    narrator.on_advance_due(advance_id(&effects));
    // Chunk 1 plays but the engine never reports a boundary.
    let effects = narrator.set_rate(0.5);
    narrator.on_restart_due(restart_id(&effects));

    assert_eq!(narrator.status().current_offset, 3000);
    let request = last_request(&log);
    assert_eq!(request.text.chars().count(), 3000);
}

#[test]
fn stale_auto_advance_cannot_double_start() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();

    let first = last_request(&log);
    let ended = narrator.on_engine_event(EngineEvent::Ended {
        request_id: first.request_id,
    });
    let stale_advance = advance_id(&ended);

    // A jump supersedes the scheduled advance.
    let jump = narrator.jump_to(42);
    assert!(narrator.on_advance_due(stale_advance).is_empty());
    assert_eq!(log.borrow().requests.len(), 1);

    narrator.on_restart_due(restart_id(&jump));
    assert_eq!(log.borrow().requests.len(), 2);
}

#[test]
fn finishing_the_last_chunk_reports_finished() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(100));
    narrator.play();

    let request = last_request(&log);
    let effects = narrator.on_engine_event(EngineEvent::Ended {
        request_id: request.request_id,
    });
    assert!(effects.contains(&Effect::Finished));
    assert!(
        effects
            .iter()
            .any(|e| matches!(e, Effect::CollapseSelection { .. }))
    );
    assert!(!narrator.status().is_playing);
    assert_eq!(narrator.status().current_offset, 0);
}

#[test]
fn empty_document_signals_nothing_to_play() {
    let (mut narrator, log) = narrator();
    assert_eq!(narrator.play(), vec![Effect::NothingToPlay]);
    assert_eq!(narrator.jump_to(5), vec![Effect::NothingToPlay]);
    assert!(log.borrow().requests.is_empty());
}

#[test]
fn speak_failure_surfaces_fault_and_stops() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(100));
    log.borrow_mut().fail_next_speak = true;

    let effects = narrator.play();
    assert!(
        effects
            .iter()
            .any(|e| matches!(e, Effect::EngineFault { .. }))
    );
    assert!(!narrator.status().is_playing);
}

#[test]
fn engine_error_event_stops_playback_once() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(100));
    narrator.play();
    let request = last_request(&log);

    let effects = narrator.on_engine_event(EngineEvent::Error {
        request_id: request.request_id,
        reason: "synthesis-failed".into(),
    });
    assert!(
        effects
            .iter()
            .any(|e| matches!(e, Effect::EngineFault { .. }))
    );
    assert!(!narrator.status().is_playing);

    // A duplicate error for the same dead request is ignored.
    let duplicate = narrator.on_engine_event(EngineEvent::Error {
        request_id: request.request_id,
        reason: "synthesis-failed".into(),
    });
    assert!(duplicate.is_empty());
}

#[test]
fn stop_clears_visuals_and_resets_cursor() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();
    let request = last_request(&log);
    narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 250,
        char_length: None,
    });

    let effects = narrator.stop();
    assert!(effects.contains(&Effect::CollapseSelection { caret: 250 }));
    assert_eq!(narrator.status().current_offset, 0);
    assert!(!narrator.status().is_playing);

    // The cancelled utterance's completion must stay inert.
    assert!(
        narrator
            .on_engine_event(EngineEvent::Ended {
                request_id: request.request_id,
            })
            .is_empty()
    );
}

fn span_pages() -> Vec<PageInput> {
    vec![PageInput {
        text: "aa bb cc".into(),
        runs: vec!["aa".into(), "bb".into(), "cc".into()],
    }]
}

#[test]
fn highlight_never_moves_backward_for_increasing_offsets() {
    let (mut narrator, log) = narrator();
    narrator.load_pages(&span_pages());
    narrator.play();
    let request = last_request(&log);

    let mut highlighted = Vec::new();
    for char_index in 0..8 {
        let effects = narrator.on_engine_event(EngineEvent::Boundary {
            request_id: request.request_id,
            char_index,
            char_length: Some(1),
        });
        for effect in effects {
            if let Effect::HighlightRegion(region) = effect {
                highlighted.push(region.run);
            }
        }
    }
    assert_eq!(highlighted, vec![0, 1, 2]);
}

#[test]
fn offset_between_spans_keeps_previous_highlight() {
    let (mut narrator, log) = narrator();
    narrator.load_pages(&span_pages());
    narrator.play();
    let request = last_request(&log);

    narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 0,
        char_length: Some(2),
    });
    // Offset 2 is the space between "aa" and "bb": no clear, no new
    // highlight.
    let effects = narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 2,
        char_length: Some(1),
    });
    assert!(
        !effects
            .iter()
            .any(|e| matches!(e, Effect::ClearRegionHighlight(_) | Effect::HighlightRegion(_)))
    );
}

#[test]
fn region_jump_uses_span_start_or_proportional_fallback() {
    let (mut narrator, _log) = narrator();
    narrator.load_pages(&span_pages());

    // "cc" starts at offset 6.
    let effects = narrator.jump_to_region(RegionHandle { page: 0, run: 2 }, 0.0);
    narrator.on_restart_due(restart_id(&effects));
    assert_eq!(narrator.status().current_offset, 6);

    // Unknown region: fall back to fraction * length (8 chars).
    let effects = narrator.jump_to_region(RegionHandle { page: 9, run: 9 }, 0.5);
    narrator.on_restart_due(restart_id(&effects));
    assert_eq!(narrator.status().current_offset, 4);
}

#[test]
fn loading_a_document_resets_playback() {
    let (mut narrator, log) = narrator();
    narrator.load_text(digits(7000));
    narrator.play();
    let request = last_request(&log);
    narrator.on_engine_event(EngineEvent::Boundary {
        request_id: request.request_id,
        char_index: 500,
        char_length: None,
    });

    narrator.load_text(digits(50));
    assert_eq!(narrator.status().current_offset, 0);
    assert!(!narrator.status().is_playing);
    // Speech for the old document was cancelled.
    assert!(log.borrow().cancels >= 1);
    assert!(
        narrator
            .on_engine_event(EngineEvent::Ended {
                request_id: request.request_id,
            })
            .is_empty()
    );
}

#[test]
fn voices_are_passed_through_from_the_engine() {
    let (narrator, _log) = narrator();
    let voices = narrator.voices();
    assert_eq!(voices.len(), 2);
    assert!(voices[0].default);
}
