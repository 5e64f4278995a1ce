//! Incremental page renderer
//!
//! Decides which pages need rasterizing (visible pages plus a buffer on each
//! side) and feeds them to the document one at a time. Rendering is strictly
//! sequential: the backend is assumed expensive and non-reentrant, so at most
//! one drain loop runs and it awaits each page before starting the next.
//!
//! The renderer is single-threaded. State lives in a `RefCell` that is never
//! borrowed across an await point.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;

use log::{debug, info, warn};

use super::backend::{PdfDocument, PdfPage};
use super::error::RenderError;
use super::state::{Completion, PageState, RenderBook, RenderJob, RenderStats};
use super::visibility::{
    DEFAULT_RENDER_BUFFER, GeometryProvider, compute_visible_pages, expand_with_buffer,
};
use super::zoom::Zoom;

pub struct PageRenderer<D: PdfDocument> {
    document: D,
    book: RefCell<RenderBook>,
    buffer: usize,
    visible: RefCell<BTreeSet<usize>>,
    draining: Cell<bool>,
    in_flight: Cell<Option<RenderJob>>,
}

/// Ends a drain: clears the draining flag and, if the drain future was
/// dropped mid-render, hands the unfinished page back to the book.
struct DrainGuard<'a, D: PdfDocument>(&'a PageRenderer<D>);

impl<D: PdfDocument> Drop for DrainGuard<'_, D> {
    fn drop(&mut self) {
        let renderer = self.0;
        if let Some(job) = renderer.in_flight.take() {
            if let Ok(mut book) = renderer.book.try_borrow_mut() {
                book.abandon(job);
                debug!("Drain dropped while rendering page {}", job.page);
            }
        }
        renderer.draining.set(false);
    }
}

impl<D: PdfDocument> PageRenderer<D> {
    #[must_use]
    pub fn new(document: D, zoom: Zoom) -> Self {
        Self::with_buffer(document, zoom, DEFAULT_RENDER_BUFFER)
    }

    #[must_use]
    pub fn with_buffer(document: D, zoom: Zoom, buffer: usize) -> Self {
        let page_count = document.page_count();
        Self {
            document,
            book: RefCell::new(RenderBook::new(page_count, zoom)),
            buffer,
            visible: RefCell::new(BTreeSet::new()),
            draining: Cell::new(false),
            in_flight: Cell::new(None),
        }
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.book.borrow().page_count()
    }

    #[must_use]
    pub fn zoom(&self) -> Zoom {
        *self.book.borrow().zoom()
    }

    #[must_use]
    pub fn page_state(&self, page: usize) -> PageState {
        self.book.borrow().state(page)
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.book.borrow().stats()
    }

    /// Read-only view of the render records
    pub fn book(&self) -> Ref<'_, RenderBook> {
        self.book.borrow()
    }

    /// Pages found visible by the last [`Self::refresh`]
    #[must_use]
    pub fn visible_pages(&self) -> BTreeSet<usize> {
        self.visible.borrow().clone()
    }

    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Queue every unrendered page in `pages`
    pub fn enqueue(&self, pages: impl IntoIterator<Item = usize>) -> usize {
        self.book.borrow_mut().enqueue(pages)
    }

    /// Recompute the visible set from `geometry` and queue it together with
    /// its buffer. Returns the visible set.
    pub fn refresh(&self, geometry: &impl GeometryProvider) -> BTreeSet<usize> {
        let visible = compute_visible_pages(geometry.container(), &geometry.pages());
        let wanted = expand_with_buffer(&visible, self.buffer, self.page_count());
        let added = self.enqueue(wanted.iter().copied());
        if added > 0 {
            debug!("Queued {added} page(s) around visible {visible:?}");
        }
        *self.visible.borrow_mut() = visible.clone();
        visible
    }

    /// Reset every page to unrendered and drop queued work
    pub fn invalidate_all(&self) {
        self.book.borrow_mut().invalidate_all();
    }

    /// Switch zoom level. Unchanged levels are ignored; otherwise the level
    /// is clamped, all render records are cleared and the visible pages plus
    /// buffer are queued again. Returns true if the level changed.
    pub fn set_zoom(&self, level: f32, geometry: &impl GeometryProvider) -> bool {
        if level == self.zoom().factor() {
            return false;
        }
        if !self.book.borrow_mut().set_zoom(level) {
            return false;
        }
        info!("Zoom set to {:.2}, render cache cleared", self.zoom().factor());
        self.refresh(geometry);
        true
    }

    /// Render queued pages one at a time until the queue is empty. A call
    /// made while another drain is running returns immediately.
    pub async fn drain_queue(&self) {
        if self.draining.replace(true) {
            return;
        }
        let _guard = DrainGuard(self);

        loop {
            let Some(job) = self.book.borrow_mut().next_job() else {
                break;
            };

            self.in_flight.set(Some(job));
            let result = self.render_page(job.page, job.scale).await;
            self.in_flight.set(None);
            let completion = self.book.borrow_mut().complete(job, result.is_ok());

            match (completion, result) {
                (Completion::Rendered, _) => debug!("Page {} rendered", job.page),
                (Completion::Stale, _) => {
                    debug!("Discarding stale render of page {}", job.page);
                }
                (Completion::Failed, Err(e)) => warn!("Error rendering page {}: {e}", e.page()),
                (Completion::Failed, Ok(())) => {}
            }
        }
    }

    async fn render_page(&self, page: usize, scale: f32) -> Result<(), RenderError> {
        let handle = self.document.page(page).await?;
        debug!("Rasterizing page {} at {scale:.2}x", handle.number());
        handle.rasterize(scale).await
    }
}
