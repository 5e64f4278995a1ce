//! Contract with the external rendering library
//!
//! The viewer never decodes PDF data itself. Everything it needs from the
//! rendering library goes through these three traits: open a document, fetch
//! a page, and rasterize that page at a scale. Each page's drawing surface is
//! owned by the backend.

#![allow(async_fn_in_trait)]

use std::fmt;

use super::error::{LoadError, RenderError};
use super::types::PageSize;

/// Fixed location of the document, as provided by the deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSource {
    location: String,
}

impl DocumentSource {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// Opens documents
pub trait RenderBackend {
    type Document: PdfDocument;

    async fn open(&self, source: &DocumentSource) -> Result<Self::Document, LoadError>;
}

/// An opened document. Page numbers are 1-based.
pub trait PdfDocument {
    type Page: PdfPage;

    fn page_count(&self) -> usize;

    async fn page(&self, number: usize) -> Result<Self::Page, RenderError>;
}

/// A fetched page
pub trait PdfPage {
    /// Page number this handle was fetched for
    fn number(&self) -> usize;

    /// Size at scale 1.0
    fn intrinsic_size(&self) -> PageSize;

    /// Paint the page's drawing surface at `scale`
    async fn rasterize(&self, scale: f32) -> Result<(), RenderError>;
}
