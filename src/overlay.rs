//! Media-overlay playback surface
//!
//! A media overlay is a time-synchronized narration stream tied to one
//! section. The controller owns at most one active session at a time and
//! keeps the reading position synchronized to the narration.
//!
//! Event delivery is pull-free: the audio engine (or its glue code) calls
//! [`ReaderController::handle_overlay_event`](crate::ReaderController::handle_overlay_event)
//! with the [`SessionToken`] it was handed when playback started. Tokens
//! are invalidated the moment a session is paused or replaced, so a stale
//! event from a previous session can never reach the handlers of the
//! current one.

use std::cell::RefCell;
use std::rc::Rc;

/// Playback operations on one section's narration session.
///
/// Sessions retain `has_started_playback` across pause, which is what
/// makes [`PlaybackStart::Resume`] meaningful after the controller has
/// dropped and re-acquired the session.
pub trait MediaOverlaySession {
    /// Begin playback, optionally from a document position (fragment id).
    fn start_playback(&mut self, from: Option<&str>);

    /// Continue playback from the paused position.
    fn resume(&mut self);

    /// Pause playback, retaining position.
    fn pause(&mut self);

    /// Whether this session has ever started playback.
    fn has_started_playback(&self) -> bool;
}

/// Shared handle to a per-section overlay session.
///
/// The controller runs in a single-threaded cooperative model; sections
/// and the controller may both hold the session, hence `Rc<RefCell<_>>`.
pub type SharedOverlay = Rc<RefCell<dyn MediaOverlaySession>>;

/// Lifecycle events reported by an active overlay session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Narration moved to a new document position (href, may carry a
    /// fragment). The controller re-runs href navigation with it.
    PositionChanged(String),
    /// Narration highlighted a new text element (fragment id).
    ElementChanged(String),
    /// Narration for this section finished.
    DocumentDone,
}

/// Handle identifying one playback attachment.
///
/// Returned by `play_overlay`; events carrying a token that is no longer
/// current are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionToken(pub(crate) u64);

/// Coarse playback state observable by presentation code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayStatus {
    /// No session attached.
    #[default]
    Idle,
    /// A session is attached and playing.
    Playing,
}

/// Start semantics for `play_overlay`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStart {
    /// Always start from the beginning of the section.
    FromBeginning,
    /// Resume in place when the session has already started playback;
    /// otherwise start from the beginning.
    Resume,
}
