//! Failures reported by the rendering collaborator

/// The document could not be opened
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("document not found: {location}")]
    NotFound { location: String },

    #[error("document at {location} could not be parsed: {detail}")]
    Parse { location: String, detail: String },

    #[error("document at {location} has no pages")]
    Empty { location: String },
}

/// A single page failed to fetch or rasterize
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} could not be fetched: {detail}")]
    PageFetch { page: usize, detail: String },

    #[error("page {page} failed to rasterize: {detail}")]
    Rasterize { page: usize, detail: String },
}

impl RenderError {
    pub fn page_fetch(page: usize, detail: impl Into<String>) -> Self {
        Self::PageFetch {
            page,
            detail: detail.into(),
        }
    }

    pub fn rasterize(page: usize, detail: impl Into<String>) -> Self {
        Self::Rasterize {
            page,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn page(&self) -> usize {
        match self {
            Self::PageFetch { page, .. } | Self::Rasterize { page, .. } => *page,
        }
    }
}
