//! mu-reader -- Navigation and playback controller for paginated readers
//!
//! The controller at the heart of an ebook reading app: it owns the
//! current reading position, reconciles it against the window of content
//! the paginator has materialized, persists and restores position and
//! view settings across sessions, and drives synchronized narration
//! playback that can auto-advance the position.
//!
//! Everything around it stays abstract: package parsing sits behind
//! [`StructureProvider`], the pagination strategy behind [`Paginator`],
//! persistence behind [`PositionStore`]/[`PropertyStore`], and the audio
//! engine behind [`MediaOverlaySession`]. Presentation code subscribes
//! to [`ReaderEvent`] notifications and re-renders reactively.
//!
//! # Example
//!
//! ```rust,no_run
//! use mu_reader::{PlaybackStart, ReaderController};
//! # fn collaborators() -> (Box<dyn mu_reader::StructureProvider>, Box<dyn mu_reader::Paginator>) { unimplemented!() }
//!
//! # fn example() -> Result<(), mu_reader::ReaderError> {
//! let (structure, paginator) = collaborators();
//! let mut reader = ReaderController::new("book-1", structure, paginator);
//! reader.open()?;
//!
//! reader.go_to_href("chapter2.xhtml#s3")?;
//! if reader.go_to_next_section() {
//!     reader.play_overlay(PlaybackStart::Resume)?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(clippy::large_enum_variant, clippy::large_stack_arrays, clippy::redundant_clone)]
#![warn(
    clippy::box_collection,
    clippy::needless_collect,
    clippy::map_clone,
    clippy::implicit_clone,
    clippy::inefficient_to_string
)]

pub mod controller;
pub mod error;
pub mod events;
pub mod overlay;
pub mod paginator;
pub mod state;
pub mod store;
pub mod structure;

// Re-export key types for convenience
pub use controller::{ReaderController, TocLocation};
pub use error::ReaderError;
pub use events::{Observers, ReaderEvent, Subscription};
pub use overlay::{
    MediaOverlaySession, OverlayEvent, OverlayStatus, PlaybackStart, SessionToken, SharedOverlay,
};
pub use paginator::{Paginator, RenderDirection, RenderOutcome, RenderTicket};
pub use state::{NavigationState, ViewConfig, ViewProperties};
pub use store::{
    MemoryPositionStore, MemoryPropertyStore, PositionStore, PropertyStore, POSITION_TTL_DAYS,
};
pub use structure::{SectionRef, StructureProvider, ViewportSize};
