//! Change notification for reading state
//!
//! Presentation code re-renders reactively: it subscribes once and
//! receives a [`ReaderEvent`] for every observable state change instead
//! of polling the controller. Dispatch is synchronous and in
//! registration order, within the same turn as the mutation that caused
//! it, so an observer of a position change has already seen the persist
//! and metadata side effects applied.
//!
//! Every subscribe returns an explicit [`Subscription`] handle; handlers
//! are only ever released through [`Observers::unsubscribe`], never by
//! being silently dropped.

use crate::overlay::OverlayStatus;
use crate::structure::ViewportSize;

/// Observable state change.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReaderEvent {
    /// `spine_position` changed; carries the new position.
    SpinePositionChanged(usize),
    /// The rendered window was replaced by a completed render.
    RenderedWindowChanged,
    /// A new intra-section anchor target was recorded.
    HashFragmentChanged(String),
    /// The current section's viewport metadata changed.
    MetaSizeChanged(Option<ViewportSize>),
    /// The target is already rendered in a multi-item window; the view
    /// should jump to this page (1-based) within the window.
    PageJumpRequested(usize),
    /// Table-of-contents availability, determined after fetch.
    TocAvailable(bool),
    /// A view/config attribute changed.
    ConfigChanged,
    /// Overlay playback state changed.
    OverlayStatusChanged(OverlayStatus),
    /// Narration highlighted a new element; retained fragment id.
    OverlayFragmentChanged(String),
}

/// Handle for one registered observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

/// Observer registry with handle-based removal.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(u64, Box<dyn FnMut(&ReaderEvent)>)>,
}

impl Observers {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; returns the handle that removes it.
    pub fn subscribe<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&ReaderEvent) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(handler)));
        Subscription(id)
    }

    /// Remove a previously registered observer.
    ///
    /// Returns false when the handle was already released.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscription.0);
        self.entries.len() != before
    }

    /// Dispatch an event to all observers, in registration order.
    pub fn emit(&mut self, event: &ReaderEvent) {
        for (_, handler) in &mut self.entries {
            handler(event);
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for Observers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
