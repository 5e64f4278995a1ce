pub mod test_helpers {
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;
    use std::rc::Rc;
    use std::time::Duration;

    use tokio::time::Instant;

    use crate::pdf::{
        Bounds, DocumentSource, GeometryProvider, LoadError, PageSize, PdfDocument, PdfPage,
        RenderBackend, RenderError,
    };

    /// Page size used when none is given: A4 in points
    pub const A4: PageSize = PageSize::new(595.0, 842.0);

    /// One finished rasterization
    #[derive(Debug, Clone, PartialEq)]
    pub struct RenderCall {
        pub page: usize,
        pub scale: f32,
        pub started: Instant,
        pub finished: Instant,
        pub succeeded: bool,
    }

    #[derive(Default)]
    struct Shared {
        calls: RefCell<Vec<RenderCall>>,
        failing: RefCell<BTreeSet<usize>>,
        in_flight: Cell<usize>,
        max_in_flight: Cell<usize>,
        failing_opens: Cell<usize>,
        opens: Cell<usize>,
    }

    /// In-memory backend that records every rasterization. Clones share the
    /// same record, so a test can keep one handle and give another away.
    #[derive(Clone)]
    pub struct RecordingBackend {
        shared: Rc<Shared>,
        page_count: usize,
        page_size: PageSize,
        delay: Duration,
    }

    impl RecordingBackend {
        pub fn new(page_count: usize) -> Self {
            Self {
                shared: Rc::new(Shared::default()),
                page_count,
                page_size: A4,
                delay: Duration::ZERO,
            }
        }

        pub fn with_page_size(mut self, size: PageSize) -> Self {
            self.page_size = size;
            self
        }

        /// Each rasterization takes `delay` of tokio time
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        /// Rasterizing `page` fails until [`Self::heal_page`]
        pub fn fail_page(&self, page: usize) {
            self.shared.failing.borrow_mut().insert(page);
        }

        pub fn heal_page(&self, page: usize) {
            self.shared.failing.borrow_mut().remove(&page);
        }

        /// The next `count` opens report the document as missing
        pub fn fail_next_opens(&self, count: usize) {
            self.shared.failing_opens.set(count);
        }

        pub fn open_count(&self) -> usize {
            self.shared.opens.get()
        }

        /// Open a document without going through the async trait
        pub fn document(&self) -> RecordingDocument {
            RecordingDocument {
                shared: Rc::clone(&self.shared),
                page_count: self.page_count,
                page_size: self.page_size,
                delay: self.delay,
            }
        }

        pub fn calls(&self) -> Vec<RenderCall> {
            self.shared.calls.borrow().clone()
        }

        /// Pages in the order they finished rendering successfully
        pub fn rendered_pages(&self) -> Vec<usize> {
            self.shared
                .calls
                .borrow()
                .iter()
                .filter(|call| call.succeeded)
                .map(|call| call.page)
                .collect()
        }

        pub fn clear_calls(&self) {
            self.shared.calls.borrow_mut().clear();
        }

        /// Highest number of rasterizations ever running at once
        pub fn max_in_flight(&self) -> usize {
            self.shared.max_in_flight.get()
        }
    }

    impl RenderBackend for RecordingBackend {
        type Document = RecordingDocument;

        async fn open(&self, source: &DocumentSource) -> Result<RecordingDocument, LoadError> {
            self.shared.opens.set(self.shared.opens.get() + 1);
            tokio::task::yield_now().await;

            let remaining = self.shared.failing_opens.get();
            if remaining > 0 {
                self.shared.failing_opens.set(remaining - 1);
                return Err(LoadError::NotFound {
                    location: source.to_string(),
                });
            }
            Ok(self.document())
        }
    }

    pub struct RecordingDocument {
        shared: Rc<Shared>,
        page_count: usize,
        page_size: PageSize,
        delay: Duration,
    }

    impl PdfDocument for RecordingDocument {
        type Page = RecordingPage;

        fn page_count(&self) -> usize {
            self.page_count
        }

        async fn page(&self, number: usize) -> Result<RecordingPage, RenderError> {
            if number == 0 || number > self.page_count {
                return Err(RenderError::page_fetch(number, "no such page"));
            }
            Ok(RecordingPage {
                shared: Rc::clone(&self.shared),
                number,
                size: self.page_size,
                delay: self.delay,
            })
        }
    }

    pub struct RecordingPage {
        shared: Rc<Shared>,
        number: usize,
        size: PageSize,
        delay: Duration,
    }

    impl PdfPage for RecordingPage {
        fn number(&self) -> usize {
            self.number
        }

        fn intrinsic_size(&self) -> PageSize {
            self.size
        }

        async fn rasterize(&self, scale: f32) -> Result<(), RenderError> {
            let shared = &self.shared;
            let started = Instant::now();
            shared.in_flight.set(shared.in_flight.get() + 1);
            shared
                .max_in_flight
                .set(shared.max_in_flight.get().max(shared.in_flight.get()));

            if self.delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(self.delay).await;
            }

            shared.in_flight.set(shared.in_flight.get() - 1);
            let succeeded = !shared.failing.borrow().contains(&self.number);
            shared.calls.borrow_mut().push(RenderCall {
                page: self.number,
                scale,
                started,
                finished: Instant::now(),
                succeeded,
            });

            if succeeded {
                Ok(())
            } else {
                Err(RenderError::rasterize(self.number, "simulated failure"))
            }
        }
    }

    /// Synthetic geometry: a 100px container with the chosen pages inside it
    /// and every other page far off to the right
    #[derive(Debug, Clone)]
    pub struct FixedGeometry {
        container: Option<Bounds>,
        pages: Vec<Bounds>,
    }

    impl FixedGeometry {
        pub fn showing(total: usize, visible: &[usize]) -> Self {
            let pages = (1..=total)
                .map(|page| {
                    if visible.contains(&page) {
                        Bounds::new(10.0, 0.0, 90.0, 100.0)
                    } else {
                        Bounds::new(1000.0, 0.0, 1080.0, 100.0)
                    }
                })
                .collect();
            Self {
                container: Some(Bounds::new(0.0, 0.0, 100.0, 100.0)),
                pages,
            }
        }

        /// Container not laid out yet
        pub fn detached(total: usize) -> Self {
            Self {
                container: None,
                ..Self::showing(total, &[])
            }
        }
    }

    impl GeometryProvider for FixedGeometry {
        fn container(&self) -> Option<Bounds> {
            self.container
        }

        fn pages(&self) -> Vec<Bounds> {
            self.pages.clone()
        }
    }
}
