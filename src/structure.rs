//! Document structure surface consumed by the reader controller
//!
//! The controller never parses package documents itself. It talks to a
//! [`StructureProvider`], the abstract view of an already-parsed package
//! document: the ordered spine, href resolution, and per-section extras
//! (viewport metadata for fixed-layout sections, media overlays).

use crate::error::ReaderError;
use crate::overlay::SharedOverlay;

/// Pixel dimensions declared by a fixed-layout section's viewport metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportSize {
    /// Declared width in CSS pixels.
    pub width: u32,
    /// Declared height in CSS pixels.
    pub height: u32,
}

/// Lightweight descriptor for one spine item ("section").
///
/// `viewport` is `None` for reflowable sections, and may also be `None`
/// for a fixed-layout section whose metadata has not been parsed yet; in
/// that case the embedder reports the late arrival through
/// [`ReaderController::section_meta_changed`](crate::ReaderController::section_meta_changed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionRef {
    /// Spine position index.
    pub index: usize,
    /// Content href relative to the package document.
    pub href: String,
    /// Declared viewport size, when the section exposes one.
    pub viewport: Option<ViewportSize>,
}

/// Abstract package document: ordered spine plus resolution helpers.
///
/// Implementations wrap whatever parser produced the package data. All
/// methods are expected to be cheap lookups once [`fetch`](Self::fetch)
/// has completed.
pub trait StructureProvider {
    /// Load and parse the package document.
    ///
    /// Until this returns `Ok`, the spine is considered empty and every
    /// navigation operation on the controller reports out-of-range.
    fn fetch(&mut self) -> Result<(), ReaderError>;

    /// Total number of spine items.
    fn spine_length(&self) -> usize;

    /// Descriptor for the spine item at `index`.
    fn section(&self, index: usize) -> Option<SectionRef>;

    /// Resolve a content path to its spine position.
    fn spine_index_from_href(&self, path: &str) -> Option<usize>;

    /// Resolve a package-relative path to a file path.
    fn resolve_path(&self, path: &str) -> String;

    /// Resolve a package-relative path to a full URI.
    fn resolve_uri(&self, path: &str) -> String;

    /// Spine position of the table-of-contents item, when one is declared.
    fn toc_index(&self) -> Option<usize>;

    /// Media overlay session for the section at `index`, when one exists.
    ///
    /// Sessions are per-section and retain playback state across pause,
    /// so repeated calls for the same index return handles to the same
    /// underlying session.
    fn media_overlay(&self, index: usize) -> Option<SharedOverlay>;

    /// Whether the publication declares fixed layout at the package level.
    fn is_fixed_layout(&self) -> bool {
        false
    }
}
