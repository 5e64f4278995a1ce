//! PDF rendering infrastructure

mod backend;
mod error;
pub mod layout;
#[cfg(feature = "pdf")]
pub mod mupdf_backend;
mod renderer;
mod state;
mod types;
pub mod visibility;
mod zoom;

pub use backend::{DocumentSource, PdfDocument, PdfPage, RenderBackend};
pub use error::{LoadError, RenderError};
pub use layout::{StripLayout, Viewport};
pub use renderer::PageRenderer;
pub use state::{Completion, PageState, RenderBook, RenderJob, RenderStats};
pub use types::*;
pub use visibility::{
    DEFAULT_RENDER_BUFFER, GeometryProvider, closest_to_center, compute_visible_pages,
    expand_with_buffer,
};
pub use zoom::*;
