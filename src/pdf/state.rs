//! Per-page render bookkeeping
//!
//! Tracks where each page sits in `Unrendered → Queued → Rendering →
//! Rendered`, owns the FIFO render queue, and stamps every job with the zoom
//! generation it was started under so results that land after a zoom change
//! can be recognised as stale.

use std::collections::VecDeque;

use super::zoom::Zoom;

/// Render state of a single page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Unrendered,
    Queued,
    Rendering,
    Rendered,
}

/// A page popped off the queue, with the parameters it must be rendered at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderJob {
    pub page: usize,
    pub scale: f32,
    generation: u64,
}

/// What happened to a finished job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    Failed,
    /// Zoom changed while the job was in flight; result dropped
    Stale,
}

/// Counters for finished jobs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: usize,
    pub failed: usize,
    pub stale: usize,
}

/// Render records for every page of one document
#[derive(Debug)]
pub struct RenderBook {
    /// Index 0 is page 1
    pages: Vec<PageState>,
    queue: VecDeque<usize>,
    zoom: Zoom,
    generation: u64,
    stats: RenderStats,
}

impl RenderBook {
    #[must_use]
    pub fn new(page_count: usize, zoom: Zoom) -> Self {
        Self {
            pages: vec![PageState::Unrendered; page_count],
            queue: VecDeque::new(),
            zoom,
            generation: 0,
            stats: RenderStats::default(),
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// State of a 1-based page; out-of-range pages read as unrendered
    #[must_use]
    pub fn state(&self, page: usize) -> PageState {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn queued(&self) -> Vec<usize> {
        self.queue.iter().copied().collect()
    }

    #[must_use]
    pub fn rendered_pages(&self) -> Vec<usize> {
        self.pages_in(PageState::Rendered)
    }

    #[must_use]
    pub fn pages_in(&self, state: PageState) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == state)
            .map(|(index, _)| index + 1)
            .collect()
    }

    /// Queue every unrendered page in `pages`. Returns how many were added.
    pub fn enqueue(&mut self, pages: impl IntoIterator<Item = usize>) -> usize {
        let mut added = 0;
        for page in pages {
            let Some(slot) = page.checked_sub(1).and_then(|i| self.pages.get_mut(i)) else {
                continue;
            };
            if *slot == PageState::Unrendered {
                *slot = PageState::Queued;
                self.queue.push_back(page);
                added += 1;
            }
        }
        added
    }

    /// Pop the queue head and mark it rendering
    pub fn next_job(&mut self) -> Option<RenderJob> {
        while let Some(page) = self.queue.pop_front() {
            let slot = &mut self.pages[page - 1];
            if *slot != PageState::Queued {
                continue;
            }
            *slot = PageState::Rendering;
            return Some(RenderJob {
                page,
                scale: self.zoom.factor(),
                generation: self.generation,
            });
        }
        None
    }

    /// Record the outcome of a job started by [`Self::next_job`]
    pub fn complete(&mut self, job: RenderJob, succeeded: bool) -> Completion {
        if job.generation != self.generation {
            self.stats.stale += 1;
            return Completion::Stale;
        }

        let slot = &mut self.pages[job.page - 1];
        if succeeded {
            *slot = PageState::Rendered;
            self.stats.rendered += 1;
            Completion::Rendered
        } else {
            *slot = PageState::Unrendered;
            self.stats.failed += 1;
            Completion::Failed
        }
    }

    /// Give up on a job that will never complete. The page goes back to
    /// unrendered so the next refresh can queue it again; stale jobs are
    /// ignored.
    pub fn abandon(&mut self, job: RenderJob) {
        if job.generation != self.generation {
            return;
        }
        if let Some(slot) = self.pages.get_mut(job.page - 1) {
            if *slot == PageState::Rendering {
                *slot = PageState::Unrendered;
            }
        }
    }

    /// Reset every page to unrendered and drop the queue. A job currently in
    /// flight becomes stale.
    pub fn invalidate_all(&mut self) {
        self.pages.fill(PageState::Unrendered);
        self.queue.clear();
        self.generation += 1;
    }

    /// Apply a new zoom level, clamped. Invalidates and returns true only if
    /// the level actually changed.
    pub fn set_zoom(&mut self, level: f32) -> bool {
        if !self.zoom.set(level) {
            return false;
        }
        self.invalidate_all();
        true
    }
}
