//! Reader navigation and playback controller
//!
//! [`ReaderController`] owns the reading position for one open document,
//! reconciles it against the paginator's rendered window, persists and
//! restores it across sessions, and drives synchronized narration
//! playback that can auto-advance the position.
//!
//! The controller runs in a single-threaded cooperative model: every
//! mutation happens inside a call from the embedder (a user intent, a
//! deferred render completion, an overlay event). Side effects of a
//! position change (persist, metadata watch, notification) complete
//! synchronously, in that order, before the triggering call returns.

use chrono::{DateTime, Duration, Utc};

use crate::error::ReaderError;
use crate::events::{Observers, ReaderEvent, Subscription};
use crate::overlay::{OverlayEvent, OverlayStatus, PlaybackStart, SessionToken, SharedOverlay};
use crate::paginator::{Paginator, RenderDirection, RenderOutcome, RenderTicket};
use crate::state::{NavigationState, ViewConfig, ViewProperties};
use crate::store::{
    MemoryPositionStore, MemoryPropertyStore, PositionStore, PropertyStore, POSITION_TTL_DAYS,
};
use crate::structure::{SectionRef, StructureProvider, ViewportSize};

/// Suffix appended to the document key for the view-properties record.
const VIEW_PROPERTIES_SUFFIX: &str = "_view_properties";

/// Resolved table-of-contents location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocLocation {
    /// Spine position of the TOC item.
    pub index: usize,
    /// Resolved file path of the TOC document.
    pub file_path: String,
}

/// Runtime state of the single active overlay session.
struct OverlayRuntime {
    session: Option<SharedOverlay>,
    /// Token counter; the active token is the current value while
    /// `session` is `Some`. Bumped on every attach *and* detach, so an
    /// event from a replaced session can never match again.
    token: u64,
    status: OverlayStatus,
    current_fragment: Option<String>,
}

impl Default for OverlayRuntime {
    fn default() -> Self {
        Self {
            session: None,
            token: 0,
            status: OverlayStatus::Idle,
            current_fragment: None,
        }
    }
}

/// Navigation-and-playback controller for one open document.
pub struct ReaderController {
    doc_key: String,
    provider: Box<dyn StructureProvider>,
    paginator: Box<dyn Paginator>,
    positions: Box<dyn PositionStore>,
    properties: Box<dyn PropertyStore>,
    nav: NavigationState,
    config: ViewConfig,
    observers: Observers,
    /// Latest issued render request; stale completions are discarded.
    render_seq: u64,
    /// Whether the latest render request is still awaiting completion.
    render_pending: bool,
    /// Section whose viewport metadata is currently watched.
    meta_watch: Option<usize>,
    overlay: OverlayRuntime,
    last_saved_at: Option<DateTime<Utc>>,
}

impl ReaderController {
    /// Create a controller for the document identified by `doc_key`.
    ///
    /// The controller starts with default config and no position; call
    /// [`open`](Self::open) to fetch the structure and restore state.
    /// Persistence defaults to in-memory stores; use
    /// [`with_position_store`](Self::with_position_store) and
    /// [`with_property_store`](Self::with_property_store) to attach
    /// durable backends.
    pub fn new(
        doc_key: impl Into<String>,
        provider: Box<dyn StructureProvider>,
        paginator: Box<dyn Paginator>,
    ) -> Self {
        Self {
            doc_key: doc_key.into(),
            provider,
            paginator,
            positions: Box::new(MemoryPositionStore::new()),
            properties: Box::new(MemoryPropertyStore::new()),
            nav: NavigationState::default(),
            config: ViewConfig::default(),
            observers: Observers::new(),
            render_seq: 0,
            render_pending: false,
            meta_watch: None,
            overlay: OverlayRuntime::default(),
            last_saved_at: None,
        }
    }

    /// Attach a durable position store.
    pub fn with_position_store(mut self, store: Box<dyn PositionStore>) -> Self {
        self.positions = store;
        self
    }

    /// Attach a durable view-properties store.
    pub fn with_property_store(mut self, store: Box<dyn PropertyStore>) -> Self {
        self.properties = store;
        self
    }

    // -- Initialization -------------------------------------------------

    /// Fetch the package structure, restore the persisted position, and
    /// materialize the initial rendered window.
    ///
    /// A persisted value that is absent, non-numeric, or out of range
    /// restores to a clamped in-range position (0 for an empty or
    /// missing value).
    pub fn open(&mut self) -> Result<(), ReaderError> {
        self.provider.fetch()?;

        let pos = self.restore_position();
        self.assign_position(pos);
        self.request_render(pos, RenderDirection::Forward);

        let has_toc = self.provider.toc_index().is_some();
        self.nav.has_toc = has_toc;
        self.observers.emit(&ReaderEvent::TocAvailable(has_toc));
        Ok(())
    }

    /// Read the persisted position for this document, clamped into range.
    pub fn restore_position(&self) -> usize {
        let stored = self
            .positions
            .get(&self.doc_key)
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(0);

        let spine_length = self.provider.spine_length();
        let clamped = stored.min(spine_length.saturating_sub(1));
        if clamped != stored {
            log::warn!(
                "Persisted position {} out of range, clamped to {}",
                stored,
                clamped
            );
        }
        clamped
    }

    // -- Navigation -----------------------------------------------------

    /// Navigate to `pos`, rendering forward when the target is not
    /// already materialized.
    ///
    /// When the target is already inside a multi-item rendered window
    /// (fixed layout, one item per page), a
    /// [`ReaderEvent::PageJumpRequested`] is emitted instead of a render.
    /// An out-of-range target is rejected without any state change.
    pub fn set_spine_pos(&mut self, pos: usize) -> Result<(), ReaderError> {
        self.check_bounds(pos)?;
        self.assign_position(pos);

        if let Some(page) = self.nav.rendered_spine_items.iter().position(|&i| i == pos) {
            if self.nav.rendered_spine_items.len() > 1 {
                // fixed layout, one spine item per page
                self.observers.emit(&ReaderEvent::PageJumpRequested(page + 1));
            }
        } else {
            self.request_render(pos, RenderDirection::Forward);
        }
        Ok(())
    }

    /// Navigate to `pos`, rendering backward when the target is not
    /// already materialized. Never requests a page jump.
    pub fn set_spine_pos_backwards(&mut self, pos: usize) -> Result<(), ReaderError> {
        self.check_bounds(pos)?;
        self.assign_position(pos);

        if !self.nav.rendered_spine_items.contains(&pos) {
            self.request_render(pos, RenderDirection::Backward);
        }
        Ok(())
    }

    /// Whether a section follows the current one.
    pub fn has_next_section(&self) -> bool {
        match self.nav.spine_position {
            Some(pos) => pos + 1 < self.provider.spine_length(),
            None => false,
        }
    }

    /// Whether a section precedes the current one.
    pub fn has_prev_section(&self) -> bool {
        matches!(self.nav.spine_position, Some(pos) if pos > 0)
    }

    /// Advance to the next section. Returns false at the end of the book.
    pub fn go_to_next_section(&mut self) -> bool {
        if !self.has_next_section() {
            return false;
        }
        let pos = self.nav.spine_position.unwrap_or(0);
        self.set_spine_pos(pos + 1).is_ok()
    }

    /// Go back to the previous section. Returns false at the start.
    pub fn go_to_prev_section(&mut self) -> bool {
        if !self.has_prev_section() {
            return false;
        }
        let pos = self.nav.spine_position.unwrap_or(0);
        self.set_spine_pos_backwards(pos - 1).is_ok()
    }

    /// Navigate to an href of the form `path`, `path#fragment`, or
    /// `#fragment`.
    ///
    /// The fragment, when present, is recorded as the hash-fragment
    /// target regardless of whether a path was present or resolvable;
    /// this layer records it for presentation code and does not scroll.
    pub fn go_to_href(&mut self, href: &str) -> Result<(), ReaderError> {
        let (path, fragment) = split_href(href);

        let nav_result = if path.is_empty() {
            Ok(())
        } else {
            match self.provider.spine_index_from_href(path) {
                Some(index) => self.set_spine_pos(index),
                None => Err(ReaderError::UnknownHref(path.to_string())),
            }
        };

        if let Some(fragment) = fragment {
            self.set_hash_fragment(fragment.to_string());
        }
        nav_result
    }

    /// Section at the current position plus `offset`.
    pub fn current_section(&self, offset: isize) -> Option<SectionRef> {
        let pos = self.nav.spine_position? as isize + offset;
        if pos < 0 {
            return None;
        }
        self.provider.section(pos as usize)
    }

    /// Apply a deferred render result.
    ///
    /// Returns false when `ticket` is stale, in which case the result is
    /// discarded and the rendered window is left untouched.
    pub fn complete_render(&mut self, ticket: RenderTicket, items: Vec<usize>) -> bool {
        self.apply_render(ticket, items)
    }

    /// Ticket of the latest render request while it is still in flight.
    pub fn pending_render_ticket(&self) -> Option<RenderTicket> {
        if self.render_pending {
            Some(RenderTicket(self.render_seq))
        } else {
            None
        }
    }

    // -- Fixed-layout metadata -------------------------------------------

    /// Report that the viewport metadata of section `index` changed.
    ///
    /// Only the currently watched (current) section is re-read; reports
    /// for any other section are ignored, which is what retires the
    /// watch on a previously current section.
    pub fn section_meta_changed(&mut self, index: usize) {
        if self.meta_watch == Some(index) {
            self.refresh_meta_size(index);
        }
    }

    // -- Media overlay ---------------------------------------------------

    /// Start narration playback for the current section.
    ///
    /// Any active session is paused and detached first; its token stops
    /// matching before the new session is attached, so no event from the
    /// old session can reach the new one. Returns the token the embedder
    /// must present with every [`handle_overlay_event`](Self::handle_overlay_event)
    /// call, or [`ReaderError::OverlayUnsupported`] when the current
    /// section has no overlay (no playback starts, no state changes).
    pub fn play_overlay(&mut self, start: PlaybackStart) -> Result<SessionToken, ReaderError> {
        let index = match self.nav.spine_position {
            Some(index) => index,
            None => return Err(ReaderError::Structure("no current section".to_string())),
        };
        let session = self
            .provider
            .media_overlay(index)
            .ok_or(ReaderError::OverlayUnsupported { index })?;

        self.pause_overlay();

        self.overlay.token += 1;
        let token = SessionToken(self.overlay.token);
        {
            let mut active = session.borrow_mut();
            if start == PlaybackStart::Resume && active.has_started_playback() {
                active.resume();
            } else {
                active.start_playback(None);
            }
        }
        self.overlay.session = Some(session);
        self.overlay.status = OverlayStatus::Playing;
        self.observers
            .emit(&ReaderEvent::OverlayStatusChanged(OverlayStatus::Playing));
        Ok(token)
    }

    /// Pause and detach the active overlay session, if any.
    pub fn pause_overlay(&mut self) {
        if let Some(session) = self.overlay.session.take() {
            // detach before pause: a pause callback re-entering with the
            // old token must already miss
            self.overlay.token += 1;
            session.borrow_mut().pause();
            self.overlay.status = OverlayStatus::Idle;
            self.observers
                .emit(&ReaderEvent::OverlayStatusChanged(OverlayStatus::Idle));
        }
    }

    /// Deliver an overlay lifecycle event from the audio engine.
    ///
    /// Returns false when `token` no longer identifies the active
    /// session; such events are dropped without any state change.
    /// A `DocumentDone` on a non-final section pauses the session,
    /// advances to the next section, and starts its narration from the
    /// beginning (query [`overlay_token`](Self::overlay_token) for the
    /// new token); on the final section it pauses only.
    pub fn handle_overlay_event(&mut self, token: SessionToken, event: OverlayEvent) -> bool {
        if self.overlay.session.is_none() || token.0 != self.overlay.token {
            log::debug!("Ignoring overlay event from a detached session");
            return false;
        }

        match event {
            OverlayEvent::PositionChanged(href) => {
                if let Err(err) = self.go_to_href(&href) {
                    log::warn!("Overlay navigation to '{}' failed: {}", href, err);
                }
            }
            OverlayEvent::ElementChanged(id) => {
                self.set_hash_fragment(id.clone());
                self.overlay.current_fragment = Some(id.clone());
                self.observers.emit(&ReaderEvent::OverlayFragmentChanged(id));
            }
            OverlayEvent::DocumentDone => {
                self.pause_overlay();
                if self.has_next_section() {
                    self.go_to_next_section();
                    if let Err(err) = self.play_overlay(PlaybackStart::FromBeginning) {
                        log::warn!("Auto-advance playback failed: {}", err);
                    }
                }
            }
        }
        true
    }

    /// Token of the active overlay session, if one is attached.
    pub fn overlay_token(&self) -> Option<SessionToken> {
        self.overlay
            .session
            .as_ref()
            .map(|_| SessionToken(self.overlay.token))
    }

    /// Current overlay playback status.
    pub fn overlay_status(&self) -> OverlayStatus {
        self.overlay.status
    }

    /// Fragment id of the element the narration last highlighted.
    pub fn current_overlay_fragment(&self) -> Option<&str> {
        self.overlay.current_fragment.as_deref()
    }

    // -- View / config ---------------------------------------------------

    /// Toggle the full-screen flag.
    pub fn toggle_full_screen(&mut self) {
        self.config.full_screen = !self.config.full_screen;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Toggle visibility of the table-of-contents panel.
    pub fn toggle_toc(&mut self) {
        self.config.toc_visible = !self.config.toc_visible;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Increase the font scale by one unit. No upper bound is enforced.
    pub fn increase_font(&mut self) {
        self.config.font_size += 1;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Decrease the font scale by one unit. No lower bound is enforced.
    pub fn decrease_font(&mut self) {
        self.config.font_size -= 1;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Set the theme identifier.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.config.theme = theme.into();
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Set the page margin size.
    pub fn set_margin(&mut self, margin: u8) {
        self.config.margin = margin;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Enable or disable two-page spread mode.
    pub fn set_two_up(&mut self, two_up: bool) {
        self.config.two_up = two_up;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    /// Show or hide the toolbar.
    pub fn set_toolbar_visible(&mut self, visible: bool) {
        self.config.toolbar_visible = visible;
        self.observers.emit(&ReaderEvent::ConfigChanged);
    }

    // -- Persistence -----------------------------------------------------

    /// Persist the view-properties projection.
    ///
    /// Stamps `updated_at` strictly later than the previous save and
    /// derives the storage key from the document key.
    pub fn save_view_properties(&mut self) -> Result<(), ReaderError> {
        let mut now = Utc::now();
        if let Some(prev) = self.last_saved_at {
            // the wall clock may not tick between two immediate saves
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }

        let key = self.view_properties_key();
        let props = ViewProperties::project(&self.config, key.clone(), now);
        let blob = serde_json::to_vec(&props)?;
        self.properties.save(&key, &blob)?;
        self.last_saved_at = Some(now);
        Ok(())
    }

    // -- Accessors -------------------------------------------------------

    /// Navigation state snapshot.
    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    /// View configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Current spine position, `None` before restore.
    pub fn spine_position(&self) -> Option<usize> {
        self.nav.spine_position
    }

    /// Spine indices currently materialized, in order.
    pub fn rendered_spine_items(&self) -> &[usize] {
        &self.nav.rendered_spine_items
    }

    /// Anchor target of the most recent href navigation.
    pub fn hash_fragment(&self) -> Option<&str> {
        self.nav.hash_fragment.as_deref()
    }

    /// Viewport of the current section, for fixed-layout sections.
    pub fn meta_size(&self) -> Option<ViewportSize> {
        self.nav.meta_size
    }

    /// Whether the package declares a table of contents.
    pub fn has_toc(&self) -> bool {
        self.nav.has_toc
    }

    /// Resolved table-of-contents location, when one is declared.
    pub fn toc_section(&self) -> Option<TocLocation> {
        let index = self.provider.toc_index()?;
        let section = self.provider.section(index)?;
        Some(TocLocation {
            index,
            file_path: self.provider.resolve_path(&section.href),
        })
    }

    /// Total number of spine items.
    pub fn spine_length(&self) -> usize {
        self.provider.spine_length()
    }

    /// Whether the publication declares fixed layout.
    pub fn is_fixed_layout(&self) -> bool {
        self.provider.is_fixed_layout()
    }

    /// Resolve a package-relative path through the structure provider.
    pub fn resolve_path(&self, path: &str) -> String {
        self.provider.resolve_path(path)
    }

    /// Resolve a package-relative path to a full URI.
    pub fn resolve_uri(&self, path: &str) -> String {
        self.provider.resolve_uri(path)
    }

    /// Register a state-change observer.
    pub fn subscribe<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&ReaderEvent) + 'static,
    {
        self.observers.subscribe(handler)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }

    // -- Internals -------------------------------------------------------

    fn check_bounds(&self, pos: usize) -> Result<(), ReaderError> {
        let spine_length = self.provider.spine_length();
        if pos >= spine_length {
            return Err(ReaderError::PositionOutOfRange { pos, spine_length });
        }
        Ok(())
    }

    /// Set the position and run its reactive side effects in order:
    /// persist, retarget the metadata watch, notify observers.
    fn assign_position(&mut self, pos: usize) {
        log::debug!("spine position -> {}", pos);
        self.nav.spine_position = Some(pos);

        if let Err(err) =
            self.positions
                .set(&self.doc_key, &pos.to_string(), POSITION_TTL_DAYS)
        {
            log::warn!("Failed to persist position {}: {}", pos, err);
        }

        self.watch_section_meta(pos);
        self.observers.emit(&ReaderEvent::SpinePositionChanged(pos));
    }

    fn watch_section_meta(&mut self, pos: usize) {
        self.meta_watch = Some(pos);
        self.refresh_meta_size(pos);
    }

    fn refresh_meta_size(&mut self, pos: usize) {
        let size = self.provider.section(pos).and_then(|s| s.viewport);
        if size != self.nav.meta_size {
            self.nav.meta_size = size;
            self.observers.emit(&ReaderEvent::MetaSizeChanged(size));
        }
    }

    fn set_hash_fragment(&mut self, fragment: String) {
        self.nav.hash_fragment = Some(fragment.clone());
        self.observers.emit(&ReaderEvent::HashFragmentChanged(fragment));
    }

    fn request_render(&mut self, start: usize, direction: RenderDirection) -> RenderTicket {
        self.render_seq += 1;
        let ticket = RenderTicket(self.render_seq);
        match self.paginator.render_spine_items(start, direction) {
            RenderOutcome::Ready(items) => {
                self.apply_render(ticket, items);
            }
            RenderOutcome::Pending => {
                self.render_pending = true;
                log::debug!("Render {} deferred from position {}", ticket.0, start);
            }
        }
        ticket
    }

    fn apply_render(&mut self, ticket: RenderTicket, items: Vec<usize>) -> bool {
        if ticket.0 != self.render_seq {
            log::warn!(
                "Discarding stale render result (ticket {}, latest {})",
                ticket.0,
                self.render_seq
            );
            return false;
        }
        self.render_pending = false;
        self.nav.rendered_spine_items = items;
        self.observers.emit(&ReaderEvent::RenderedWindowChanged);
        true
    }

    fn view_properties_key(&self) -> String {
        format!("{}{}", self.doc_key, VIEW_PROPERTIES_SUFFIX)
    }
}

/// Split an href into its path and optional fragment.
///
/// Everything before the first `#` is the path, everything after it is
/// the fragment (which may itself contain `#`).
fn split_href(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (href, None),
    }
}
