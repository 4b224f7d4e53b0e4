//! Snapshot pipeline
//!
//! One rasterized image of the page is shared by every panel. The
//! [`SnapshotCoordinator`] decides when a capture is started, the
//! [`PageRasterizer`] produces it, and panels read it back either as an
//! encoded image (first setup) or as raw pixels (texture refresh).

mod coordinator;
mod image;
mod options;

use crate::error::SnapshotError;

pub use coordinator::{CaptureTicket, InitDecision, SnapshotCoordinator};
pub use image::ImageData;
pub use options::{CaptureOptions, GLASS_CLASSES};

/// A rasterized page image produced by the page rasterizer
pub trait PageSnapshot {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Encode the image for asynchronous decoding by the host
    ///
    /// Fails with [`SnapshotError::Tainted`] when cross-origin content makes
    /// the pixels unreadable.
    fn encode(&self) -> Result<EncodedSnapshot, SnapshotError>;

    /// Read the pixels directly for a texture re-upload
    fn pixels(&self) -> Result<ImageData, SnapshotError>;
}

/// A snapshot in transferable form
#[derive(Clone, Debug, PartialEq)]
pub enum EncodedSnapshot {
    /// `data:image/png;base64,...` URL for an image element
    DataUrl(String),
    /// Already-decoded pixels
    Raw(ImageData),
}

/// In-memory snapshot, optionally marked as tainted
#[derive(Clone, Debug)]
pub struct MemorySnapshot {
    image: ImageData,
    tainted: bool,
}

impl MemorySnapshot {
    /// Create a readable snapshot
    pub fn new(image: ImageData) -> Self {
        Self {
            image,
            tainted: false,
        }
    }

    /// Create a snapshot whose pixels cannot be read back
    pub fn tainted(image: ImageData) -> Self {
        Self {
            image,
            tainted: true,
        }
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted
    }
}

impl PageSnapshot for MemorySnapshot {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn encode(&self) -> Result<EncodedSnapshot, SnapshotError> {
        if self.tainted {
            return Err(SnapshotError::Tainted);
        }
        Ok(EncodedSnapshot::Raw(self.image.clone()))
    }

    fn pixels(&self) -> Result<ImageData, SnapshotError> {
        if self.tainted {
            return Err(SnapshotError::Tainted);
        }
        Ok(self.image.clone())
    }
}

/// External service that renders the page into a [`PageSnapshot`]
///
/// A capture is asynchronous: the rasterizer reports back through
/// `GlassEngine::resolve_capture` with the same ticket.
pub trait PageRasterizer {
    /// False when the rasterizer is not loaded on this page
    fn is_available(&self) -> bool {
        true
    }

    /// Begin rasterizing the page
    fn capture(&mut self, ticket: CaptureTicket, options: &CaptureOptions);
}
