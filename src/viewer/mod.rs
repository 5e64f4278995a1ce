//! Viewer controller
//!
//! Owns the view state (current page, zoom, theme, chapter panel, load
//! status) and turns [`Message`]s into state transitions plus [`Effect`]s the
//! host carries out. Rasterization is delegated to a [`PageRenderer`] built
//! for each loaded document.

mod appearance;
mod debounce;
mod gesture;
mod messages;
mod navigation;
mod panel;
mod shortcuts;

use std::rc::Rc;

use log::{debug, error, info};

pub use debounce::{Debounce, TimerToken};
pub use gesture::{Swipe, SwipeTracker};
pub use messages::{Effect, Key, KeyPress, Message, Modifiers, Point, TouchEvent};
pub use panel::ChapterPanel;
pub use shortcuts::message_for_key;

use crate::catalog::{Catalog, Chapter};
use crate::pdf::{
    DocumentSource, LoadError, PageRenderer, PageSize, PdfDocument, PdfPage, RenderBackend,
    Viewport, Zoom,
};
use crate::settings::{PreferenceStore, Settings};
use crate::theme::{THEME_KEY, Theme};

/// Everything the viewer needs that outlives a single document: built once
/// at startup.
pub struct AppContext<B, S> {
    pub catalog: Catalog,
    pub backend: B,
    pub store: S,
    pub source: DocumentSource,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Shown as a full-screen error with a retry button
    Failed(String),
}

/// Snapshot of the navigation bar
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub current: usize,
    pub total: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub zoom_percent: u32,
    pub zoom_in_enabled: bool,
    pub zoom_out_enabled: bool,
    pub theme: Theme,
    /// Number and name of the surah on the current page
    pub chapter: Option<(u32, String)>,
}

pub struct Viewer<B: RenderBackend, S: PreferenceStore, V: Viewport> {
    catalog: Catalog,
    backend: B,
    store: S,
    source: DocumentSource,
    viewport: V,
    renderer: Option<Rc<PageRenderer<B::Document>>>,
    load_state: LoadState,
    first_page_size: Option<PageSize>,
    current_page: usize,
    total_pages: usize,
    zoom: Zoom,
    render_buffer: usize,
    theme: Theme,
    panel: ChapterPanel,
    swipe: SwipeTracker,
    resize: Debounce,
}

impl<B: RenderBackend, S: PreferenceStore, V: Viewport> Viewer<B, S, V> {
    /// Build the viewer. The stored theme is read here so it can be applied
    /// before anything is rendered.
    pub fn new(context: AppContext<B, S>, viewport: V) -> Self {
        let AppContext {
            catalog,
            backend,
            store,
            source,
            settings,
        } = context;
        let theme = Theme::from_stored(store.get(THEME_KEY).as_deref());

        Self {
            catalog,
            backend,
            store,
            source,
            viewport,
            renderer: None,
            load_state: LoadState::Idle,
            first_page_size: None,
            current_page: 1,
            total_pages: 0,
            zoom: settings.zoom(),
            render_buffer: settings.render_buffer,
            theme,
            panel: ChapterPanel::default(),
            swipe: SwipeTracker::new(settings.swipe_threshold),
            resize: Debounce::new(settings.resize_debounce()),
        }
    }

    /// Effects to run once at startup: theme first, then the document load
    pub fn startup(&self) -> Vec<Effect> {
        vec![Effect::ApplyTheme(self.theme), Effect::LoadDocument]
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    /// Renderer for the loaded document; shared with spawned drains
    pub fn renderer(&self) -> Option<Rc<PageRenderer<B::Document>>> {
        self.renderer.clone()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn panel(&self) -> &ChapterPanel {
        &self.panel
    }

    /// Chapters listed in the panel under the current search
    pub fn visible_chapters(&self) -> Vec<&Chapter> {
        self.panel.visible(&self.catalog)
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            current: self.current_page,
            total: self.total_pages,
            prev_enabled: self.current_page > 1,
            next_enabled: self.current_page < self.total_pages,
            zoom_percent: self.zoom.percent(),
            zoom_in_enabled: self.zoom.can_zoom_in(),
            zoom_out_enabled: self.zoom.can_zoom_out(),
            theme: self.theme,
            chapter: self
                .catalog
                .chapter_at_page(self.current_page)
                .map(|c| (c.number, c.name.clone())),
        }
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::NextPage => self.next_page(),
            Message::PreviousPage => self.previous_page(),
            Message::FirstPage => self.go_to(1),
            Message::LastPage => self.go_to(self.total_pages),
            Message::GoToPage(page) => self.go_to(page),
            Message::ZoomIn => self.zoom_in(),
            Message::ZoomOut => self.zoom_out(),
            Message::FitToWidth => self.fit_to_width(),
            Message::ToggleTheme => self.toggle_theme(),
            Message::ToggleChapterPanel => {
                self.panel.toggle();
                vec![]
            }
            Message::CloseChapterPanel => {
                self.panel.close();
                vec![]
            }
            Message::ChapterSearchChanged(query) => {
                self.panel.set_query(query);
                vec![]
            }
            Message::ChapterSelected(number) => self.open_chapter(number, false),
            Message::ChapterEndSelected(number) => self.open_chapter(number, true),
            Message::Key(press) => match message_for_key(&press) {
                Some(mapped) => self.update(mapped),
                None => vec![],
            },
            Message::Touch(event) => match self.swipe.handle(&event) {
                Some(Swipe::Previous) => self.previous_page(),
                Some(Swipe::Next) => self.next_page(),
                None => vec![],
            },
            Message::Scrolled => self.on_scroll(),
            Message::WindowResized { width, height } => {
                self.viewport.resize(width, height);
                let token = self.resize.schedule();
                vec![Effect::ScheduleResizeSettle {
                    token,
                    delay: self.resize.delay(),
                }]
            }
            Message::ResizeSettled(token) => {
                if self.resize.settle(token) {
                    self.on_scroll()
                } else {
                    vec![]
                }
            }
            Message::RenderQueueDrained => {
                if let Some(renderer) = &self.renderer {
                    debug!("Render queue drained: {:?}", renderer.stats());
                }
                vec![]
            }
            Message::Retry => match self.load_state {
                LoadState::Idle | LoadState::Failed(_) => vec![Effect::LoadDocument],
                LoadState::Loading | LoadState::Ready => vec![],
            },
        }
    }

    /// Open the document and prepare rendering. A failure leaves the viewer
    /// in [`LoadState::Failed`]; [`Message::Retry`] starts over.
    pub async fn load(&mut self) -> Vec<Effect> {
        self.load_state = LoadState::Loading;
        self.renderer = None;
        info!("Loading document {}", self.source);

        match self.open_document().await {
            Ok((document, first_page_size)) => {
                self.total_pages = document.page_count();
                self.first_page_size = Some(first_page_size);
                self.current_page = 1;

                self.viewport.lay_out(self.total_pages, first_page_size);
                self.viewport.apply_zoom(self.zoom.factor());

                let renderer = Rc::new(PageRenderer::with_buffer(
                    document,
                    self.zoom,
                    self.render_buffer,
                ));
                self.renderer = Some(renderer);
                self.load_state = LoadState::Ready;
                info!("Document loaded successfully: {} pages", self.total_pages);
                self.on_scroll()
            }
            Err(e) => {
                error!("Error loading document: {e}");
                self.total_pages = 0;
                self.current_page = 1;
                self.first_page_size = None;
                self.load_state = LoadState::Failed(e.to_string());
                vec![]
            }
        }
    }

    async fn open_document(&self) -> Result<(B::Document, PageSize), LoadError> {
        let document = self.backend.open(&self.source).await?;
        if document.page_count() == 0 {
            return Err(LoadError::Empty {
                location: self.source.to_string(),
            });
        }
        let first = document.page(1).await.map_err(|e| LoadError::Parse {
            location: self.source.to_string(),
            detail: e.to_string(),
        })?;
        let size = first.intrinsic_size();
        Ok((document, size))
    }

    /// Recompute the visible pages and current page, queue what is missing
    fn on_scroll(&mut self) -> Vec<Effect> {
        let Some(renderer) = &self.renderer else {
            return vec![];
        };
        renderer.refresh(&self.viewport);
        self.update_current_page();
        vec![Effect::DrainRenderQueue]
    }
}
