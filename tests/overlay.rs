//! Integration tests for media-overlay playback and auto-advance.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{as_session, MockOverlay, MockPaginator, MockStructure};
use mu_reader::{
    OverlayEvent, OverlayStatus, PlaybackStart, ReaderController, ReaderError, ReaderEvent,
};

const SPINE: &[&str] = &["intro.xhtml", "chapter1.xhtml", "chapter2.xhtml"];

fn reader_with(structure: MockStructure) -> ReaderController {
    let mut reader = ReaderController::new(
        "book-mo",
        Box::new(structure),
        Box::new(MockPaginator::new(SPINE.len())),
    );
    reader.open().expect("open should succeed");
    reader
}

#[test]
fn test_play_without_overlay_is_unsupported() {
    let mut reader = reader_with(MockStructure::new(SPINE));

    let err = reader
        .play_overlay(PlaybackStart::Resume)
        .expect_err("no overlay on section 0");
    assert_eq!(err, ReaderError::OverlayUnsupported { index: 0 });
    assert_eq!(reader.overlay_token(), None);
    assert_eq!(reader.overlay_status(), OverlayStatus::Idle);
}

#[test]
fn test_play_from_beginning_starts_playback() {
    let overlay = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&overlay)));

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert_eq!(reader.overlay_token(), Some(token));
    assert_eq!(reader.overlay_status(), OverlayStatus::Playing);
    assert_eq!(overlay.borrow().starts.len(), 1);
    assert_eq!(overlay.borrow().resumes, 0);
}

#[test]
fn test_resume_only_when_session_has_started() {
    let fresh = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&fresh)));

    // a session that never started cannot resume; it starts from the top
    reader.play_overlay(PlaybackStart::Resume).unwrap();
    assert_eq!(fresh.borrow().starts.len(), 1);
    assert_eq!(fresh.borrow().resumes, 0);

    let seasoned = MockOverlay::started();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&seasoned)));

    reader.play_overlay(PlaybackStart::Resume).unwrap();
    assert_eq!(seasoned.borrow().starts.len(), 0);
    assert_eq!(seasoned.borrow().resumes, 1);
}

#[test]
fn test_from_beginning_restarts_even_after_playback_started() {
    let overlay = MockOverlay::started();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&overlay)));

    reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert_eq!(overlay.borrow().starts.len(), 1);
    assert_eq!(overlay.borrow().resumes, 0);
}

#[test]
fn test_pause_detaches_session() {
    let overlay = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&overlay)));

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    reader.pause_overlay();

    assert_eq!(overlay.borrow().pauses, 1);
    assert_eq!(reader.overlay_token(), None);
    assert_eq!(reader.overlay_status(), OverlayStatus::Idle);

    // events presented with the old token are dropped
    assert!(!reader.handle_overlay_event(token, OverlayEvent::ElementChanged("p1".into())));
    assert_eq!(reader.hash_fragment(), None);
}

#[test]
fn test_replacing_session_pauses_old_and_drops_its_events() {
    let first = MockOverlay::shared();
    let second = MockOverlay::shared();
    let mut reader = reader_with(
        MockStructure::new(SPINE)
            .with_overlay(0, as_session(&first))
            .with_overlay(1, as_session(&second)),
    );

    let token_a = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    reader.set_spine_pos(1).unwrap();
    let token_b = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert_ne!(token_a, token_b);

    // the old session was paused before the new one attached
    assert_eq!(first.borrow().pauses, 1);
    assert_eq!(second.borrow().starts.len(), 1);

    // a straggler event from the old session never lands
    assert!(!reader.handle_overlay_event(token_a, OverlayEvent::ElementChanged("old".into())));
    assert_eq!(reader.current_overlay_fragment(), None);

    assert!(reader.handle_overlay_event(token_b, OverlayEvent::ElementChanged("new".into())));
    assert_eq!(reader.current_overlay_fragment(), Some("new"));
}

#[test]
fn test_position_changed_keeps_reading_position_in_sync() {
    let overlay = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&overlay)));

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert!(reader.handle_overlay_event(
        token,
        OverlayEvent::PositionChanged("chapter1.xhtml#para5".into()),
    ));

    assert_eq!(reader.spine_position(), Some(1));
    assert_eq!(reader.hash_fragment(), Some("para5"));
}

#[test]
fn test_element_changed_records_both_fragments() {
    let overlay = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&overlay)));

    let frags = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&frags);
    reader.subscribe(move |event| {
        if let ReaderEvent::OverlayFragmentChanged(id) = event {
            log.borrow_mut().push(id.clone());
        }
    });

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    reader.handle_overlay_event(token, OverlayEvent::ElementChanged("s2".into()));

    assert_eq!(reader.hash_fragment(), Some("s2"));
    assert_eq!(reader.current_overlay_fragment(), Some("s2"));
    assert_eq!(*frags.borrow(), vec!["s2".to_string()]);
}

#[test]
fn test_document_done_auto_advances_and_restarts_narration() {
    let first = MockOverlay::shared();
    let next = MockOverlay::started();
    let mut reader = reader_with(
        MockStructure::new(SPINE)
            .with_overlay(0, as_session(&first))
            .with_overlay(1, as_session(&next)),
    );

    let positions = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&positions);
    reader.subscribe(move |event| {
        if let ReaderEvent::SpinePositionChanged(pos) = event {
            log.borrow_mut().push(*pos);
        }
    });

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert!(reader.handle_overlay_event(token, OverlayEvent::DocumentDone));

    // exactly one navigation, to the next section
    assert_eq!(*positions.borrow(), vec![1]);
    assert_eq!(first.borrow().pauses, 1);

    // narration restarts from the beginning even though the next
    // session had played before
    assert_eq!(next.borrow().starts.len(), 1);
    assert_eq!(next.borrow().resumes, 0);
    assert_eq!(reader.overlay_status(), OverlayStatus::Playing);
    assert_ne!(reader.overlay_token(), Some(token));
}

#[test]
fn test_document_done_on_final_section_pauses_only() {
    let last = MockOverlay::shared();
    let mut reader = reader_with(
        MockStructure::new(SPINE).with_overlay(SPINE.len() - 1, as_session(&last)),
    );
    reader.set_spine_pos(SPINE.len() - 1).unwrap();

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert!(reader.handle_overlay_event(token, OverlayEvent::DocumentDone));

    assert_eq!(reader.spine_position(), Some(SPINE.len() - 1));
    assert_eq!(last.borrow().pauses, 1);
    assert_eq!(reader.overlay_status(), OverlayStatus::Idle);
    assert_eq!(reader.overlay_token(), None);
}

#[test]
fn test_auto_advance_without_next_overlay_stops_cleanly() {
    let only = MockOverlay::shared();
    let mut reader =
        reader_with(MockStructure::new(SPINE).with_overlay(0, as_session(&only)));

    let token = reader.play_overlay(PlaybackStart::FromBeginning).unwrap();
    assert!(reader.handle_overlay_event(token, OverlayEvent::DocumentDone));

    // navigation happened, but the next section has no overlay to play
    assert_eq!(reader.spine_position(), Some(1));
    assert_eq!(reader.overlay_status(), OverlayStatus::Idle);
    assert_eq!(reader.overlay_token(), None);
}
