//! Pagination surface consumed by the reader controller
//!
//! The controller decides *which* spine item is current; the paginator
//! decides how many neighbouring items fit into the rendered window and
//! materializes them. A paginator may answer immediately or defer; every
//! request carries a [`RenderTicket`] so a completion that arrives after
//! a newer navigation is discarded instead of clobbering fresh state.

/// Direction hint for a render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderDirection {
    /// Materialize forward from the starting item (page-forward, restore).
    Forward,
    /// Materialize backward from the starting item (page-backward).
    Backward,
}

/// Result of a render request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The window was materialized synchronously; spine indices in order.
    Ready(Vec<usize>),
    /// The paginator will deliver the window later through
    /// [`ReaderController::complete_render`](crate::ReaderController::complete_render).
    Pending,
}

/// Sequence tag for one render request.
///
/// Tickets increase monotonically per controller. A deferred completion
/// is applied only while its ticket is still the latest issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RenderTicket(pub(crate) u64);

/// Pagination strategy: materializes a window of spine items.
pub trait Paginator {
    /// Materialize a contiguous window of spine items starting at `start`.
    ///
    /// Returns the indices actually rendered (a fixed-layout strategy may
    /// render several one-per-page items, a reflowable one typically just
    /// `start`), or [`RenderOutcome::Pending`] when materialization is
    /// deferred.
    fn render_spine_items(&mut self, start: usize, direction: RenderDirection) -> RenderOutcome;
}
