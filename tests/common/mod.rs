//! Mock collaborators shared by the integration suites.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use mu_reader::{
    MediaOverlaySession, Paginator, ReaderError, RenderDirection, RenderOutcome, SectionRef,
    SharedOverlay, StructureProvider, ViewportSize,
};

/// Scripted package document over a list of section hrefs.
pub struct MockStructure {
    hrefs: Vec<String>,
    viewports: HashMap<usize, ViewportSize>,
    overlays: HashMap<usize, SharedOverlay>,
    toc: Option<usize>,
    fixed_layout: bool,
    fetch_error: Option<String>,
    fetched: bool,
}

impl MockStructure {
    pub fn new(hrefs: &[&str]) -> Self {
        Self {
            hrefs: hrefs.iter().map(|h| h.to_string()).collect(),
            viewports: HashMap::new(),
            overlays: HashMap::new(),
            toc: None,
            fixed_layout: false,
            fetch_error: None,
            fetched: false,
        }
    }

    pub fn with_viewport(mut self, index: usize, width: u32, height: u32) -> Self {
        self.viewports.insert(index, ViewportSize { width, height });
        self
    }

    pub fn with_overlay(mut self, index: usize, overlay: SharedOverlay) -> Self {
        self.overlays.insert(index, overlay);
        self
    }

    pub fn with_toc(mut self, index: usize) -> Self {
        self.toc = Some(index);
        self
    }

    pub fn fixed_layout(mut self) -> Self {
        self.fixed_layout = true;
        self
    }

    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }
}

impl StructureProvider for MockStructure {
    fn fetch(&mut self) -> Result<(), ReaderError> {
        if let Some(message) = &self.fetch_error {
            return Err(ReaderError::Structure(message.clone()));
        }
        self.fetched = true;
        Ok(())
    }

    fn spine_length(&self) -> usize {
        if self.fetched {
            self.hrefs.len()
        } else {
            0
        }
    }

    fn section(&self, index: usize) -> Option<SectionRef> {
        self.hrefs.get(index).map(|href| SectionRef {
            index,
            href: href.clone(),
            viewport: self.viewports.get(&index).copied(),
        })
    }

    fn spine_index_from_href(&self, path: &str) -> Option<usize> {
        self.hrefs.iter().position(|href| href == path)
    }

    fn resolve_path(&self, path: &str) -> String {
        format!("OEBPS/{}", path)
    }

    fn resolve_uri(&self, path: &str) -> String {
        format!("file:///books/{}", path)
    }

    fn toc_index(&self) -> Option<usize> {
        self.toc
    }

    fn media_overlay(&self, index: usize) -> Option<SharedOverlay> {
        self.overlays.get(&index).cloned()
    }

    fn is_fixed_layout(&self) -> bool {
        self.fixed_layout
    }
}

/// Scripted paginator that records every render request.
///
/// Renders a window of `window` contiguous items clipped to `len`, or
/// answers `Pending` when deferred mode is enabled.
pub struct MockPaginator {
    window: usize,
    len: usize,
    deferred: bool,
    pub calls: Rc<RefCell<Vec<(usize, RenderDirection)>>>,
}

impl MockPaginator {
    pub fn new(len: usize) -> Self {
        Self {
            window: 1,
            len,
            deferred: false,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn call_log(&self) -> Rc<RefCell<Vec<(usize, RenderDirection)>>> {
        Rc::clone(&self.calls)
    }
}

impl Paginator for MockPaginator {
    fn render_spine_items(&mut self, start: usize, direction: RenderDirection) -> RenderOutcome {
        self.calls.borrow_mut().push((start, direction));
        if self.deferred {
            return RenderOutcome::Pending;
        }
        let items = match direction {
            RenderDirection::Forward => (start..(start + self.window).min(self.len)).collect(),
            RenderDirection::Backward => {
                (start.saturating_sub(self.window - 1)..=start.min(self.len.saturating_sub(1)))
                    .collect()
            }
        };
        RenderOutcome::Ready(items)
    }
}

/// Overlay session recording the operations applied to it.
#[derive(Default)]
pub struct MockOverlay {
    pub starts: Vec<Option<String>>,
    pub resumes: usize,
    pub pauses: usize,
    has_started: bool,
}

impl MockOverlay {
    pub fn shared() -> Rc<RefCell<MockOverlay>> {
        Rc::new(RefCell::new(MockOverlay::default()))
    }

    pub fn started() -> Rc<RefCell<MockOverlay>> {
        let overlay = Self::shared();
        overlay.borrow_mut().has_started = true;
        overlay
    }
}

impl MediaOverlaySession for MockOverlay {
    fn start_playback(&mut self, from: Option<&str>) {
        self.starts.push(from.map(|f| f.to_string()));
        self.has_started = true;
    }

    fn resume(&mut self) {
        self.resumes += 1;
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn has_started_playback(&self) -> bool {
        self.has_started
    }
}

/// Coerce a typed mock overlay into the shared session handle.
pub fn as_session(overlay: &Rc<RefCell<MockOverlay>>) -> SharedOverlay {
    Rc::clone(overlay) as SharedOverlay
}
