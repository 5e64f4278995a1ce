//! MuPDF-backed rendering collaborator
//!
//! MuPDF documents are not `Send` and rasterizing blocks, so each opened
//! document lives on its own worker thread. Page lookups and rasterize calls
//! are sent to it over a `flume` channel and the reply is awaited, which
//! keeps the host's event loop free while a page renders.
//!
//! Each page's drawing surface is a PNG file in the output directory,
//! overwritten on every rasterize.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use flume::{Receiver, Sender};
use log::{debug, warn};
use mupdf::{Colorspace, Document, Matrix, Pixmap};

use super::backend::{DocumentSource, PdfDocument, PdfPage, RenderBackend};
use super::error::{LoadError, RenderError};
use super::types::PageSize;

type Reply<T> = Sender<Result<T, RenderError>>;

/// Work handed to a document's worker thread
enum WorkerRequest {
    PageSize {
        page: usize,
        reply: Reply<PageSize>,
    },
    Rasterize {
        page: usize,
        scale: f32,
        surface: PathBuf,
        reply: Reply<()>,
    },
}

pub struct MupdfBackend {
    output_dir: PathBuf,
}

impl MupdfBackend {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl RenderBackend for MupdfBackend {
    type Document = MupdfDocument;

    async fn open(&self, source: &DocumentSource) -> Result<MupdfDocument, LoadError> {
        let location = source.location().to_string();
        if !Path::new(&location).exists() {
            return Err(LoadError::NotFound { location });
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| LoadError::Parse {
            location: location.clone(),
            detail: format!("output directory {:?}: {e}", self.output_dir),
        })?;

        let (opened_tx, opened_rx) = flume::bounded(1);
        let (request_tx, request_rx) = flume::unbounded();
        let worker_location = location.clone();
        std::thread::Builder::new()
            .name("mupdf-render".to_string())
            .spawn(move || render_worker(&worker_location, opened_tx, request_rx))
            .map_err(|e| LoadError::Parse {
                location: location.clone(),
                detail: format!("cannot start render worker: {e}"),
            })?;

        let page_count = opened_rx
            .recv_async()
            .await
            .map_err(|_| LoadError::Parse {
                location: location.clone(),
                detail: "render worker exited".to_string(),
            })??;

        Ok(MupdfDocument {
            requests: request_tx,
            page_count,
            output_dir: self.output_dir.clone(),
        })
    }
}

/// Handle to a document open on a worker thread. Dropping every handle
/// stops the worker.
pub struct MupdfDocument {
    requests: Sender<WorkerRequest>,
    page_count: usize,
    output_dir: PathBuf,
}

impl PdfDocument for MupdfDocument {
    type Page = MupdfPage;

    fn page_count(&self) -> usize {
        self.page_count
    }

    async fn page(&self, number: usize) -> Result<MupdfPage, RenderError> {
        if number == 0 || number > self.page_count {
            return Err(RenderError::page_fetch(number, "page out of range"));
        }
        let size = ask(&self.requests, |reply| WorkerRequest::PageSize {
            page: number,
            reply,
        })
        .await
        .map_err(|_| RenderError::page_fetch(number, "render worker stopped"))??;

        Ok(MupdfPage {
            requests: self.requests.clone(),
            number,
            size,
            surface: self.output_dir.join(format!("page-{number:04}.png")),
        })
    }
}

pub struct MupdfPage {
    requests: Sender<WorkerRequest>,
    number: usize,
    size: PageSize,
    surface: PathBuf,
}

impl PdfPage for MupdfPage {
    fn number(&self) -> usize {
        self.number
    }

    fn intrinsic_size(&self) -> PageSize {
        self.size
    }

    async fn rasterize(&self, scale: f32) -> Result<(), RenderError> {
        ask(&self.requests, |reply| WorkerRequest::Rasterize {
            page: self.number,
            scale,
            surface: self.surface.clone(),
            reply,
        })
        .await
        .map_err(|_| RenderError::rasterize(self.number, "render worker stopped"))?
    }
}

/// Send a request and wait for its reply. `Err(())` means the worker is gone.
async fn ask<T>(
    requests: &Sender<WorkerRequest>,
    build: impl FnOnce(Reply<T>) -> WorkerRequest,
) -> Result<Result<T, RenderError>, ()> {
    let (reply_tx, reply_rx) = flume::bounded(1);
    requests.send(build(reply_tx)).map_err(|_| ())?;
    reply_rx.recv_async().await.map_err(|_| ())
}

/// Worker thread body: owns the document until every handle is dropped
fn render_worker(
    location: &str,
    opened: Sender<Result<usize, LoadError>>,
    requests: Receiver<WorkerRequest>,
) {
    let doc = match open_document(location) {
        Ok((doc, page_count)) => {
            let _ = opened.send(Ok(page_count));
            doc
        }
        Err(e) => {
            let _ = opened.send(Err(e));
            return;
        }
    };

    for request in requests {
        match request {
            WorkerRequest::PageSize { page, reply } => {
                let _ = reply.send(page_size(&doc, page));
            }
            WorkerRequest::Rasterize {
                page,
                scale,
                surface,
                reply,
            } => {
                let result = rasterize_to_png(&doc, page, scale, &surface);
                if let Err(e) = &result {
                    warn!("Worker failed on page {page}: {e}");
                }
                let _ = reply.send(result);
            }
        }
    }
    debug!("Render worker for {location} stopped");
}

fn open_document(location: &str) -> Result<(Document, usize), LoadError> {
    let parse_error = |detail: String| LoadError::Parse {
        location: location.to_string(),
        detail,
    };
    let doc = Document::open(location).map_err(|e| parse_error(e.to_string()))?;
    let page_count = doc.page_count().map_err(|e| parse_error(e.to_string()))?;
    if page_count <= 0 {
        return Err(LoadError::Empty {
            location: location.to_string(),
        });
    }
    Ok((doc, page_count as usize))
}

fn page_size(doc: &Document, number: usize) -> Result<PageSize, RenderError> {
    let page = doc
        .load_page((number - 1) as i32)
        .map_err(|e| RenderError::page_fetch(number, e.to_string()))?;
    let bounds = page
        .bounds()
        .map_err(|e| RenderError::page_fetch(number, e.to_string()))?;
    Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
}

fn rasterize_to_png(
    doc: &Document,
    number: usize,
    scale: f32,
    surface: &Path,
) -> Result<(), RenderError> {
    let fail = |detail: String| RenderError::rasterize(number, detail);

    let page = doc
        .load_page((number - 1) as i32)
        .map_err(|e| RenderError::page_fetch(number, e.to_string()))?;
    let rgb = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&Matrix::new_scale(scale, scale), &rgb, false, false)
        .map_err(|e| fail(e.to_string()))?;
    let pixels = pixmap_to_rgb(&pixmap).map_err(fail)?;

    let file = File::create(surface).map_err(|e| fail(e.to_string()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);
    let mut writer = encoder.write_header().map_err(|e| fail(e.to_string()))?;
    writer
        .write_image_data(&pixels)
        .map_err(|e| fail(e.to_string()))?;

    debug!("Wrote page {number} at {scale:.2}x to {surface:?}");
    Ok(())
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, String> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(format!("Unsupported pixmap format: {n} channels"));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err("Pixmap buffer size mismatch".to_string());
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MupdfBackend::new(dir.path().join("pages"));
        let source = DocumentSource::new(dir.path().join("missing.pdf").to_string_lossy());
        let result = backend.open(&source).await;
        assert!(matches!(result, Err(LoadError::NotFound { .. })));
    }

    #[tokio::test]
    async fn garbage_file_fails_on_the_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf").unwrap();
        let backend = MupdfBackend::new(dir.path().join("pages"));
        let result = backend
            .open(&DocumentSource::new(path.to_string_lossy()))
            .await;
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[tokio::test]
    async fn stopped_worker_reports_instead_of_hanging() {
        let (requests, receiver) = flume::unbounded::<WorkerRequest>();
        drop(receiver);
        let document = MupdfDocument {
            requests,
            page_count: 3,
            output_dir: PathBuf::from("pages"),
        };
        let result = document.page(2).await;
        assert!(matches!(result, Err(RenderError::PageFetch { page: 2, .. })));
    }
}
