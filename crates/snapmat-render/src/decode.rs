//! Capture decoding
//!
//! Viewport captures arrive as encoded PNG (or JPEG for previews) and
//! come out as straight RGBA ready for compositing.

use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::RenderError;

/// A decoded capture ready for compositing
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Straight RGBA pixel data, row-major
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl SourceImage {
    /// Create from raw RGBA data
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self { pixels, width, height }
    }

    /// Premultiplied pixmap copy for tiny-skia drawing
    pub(crate) fn to_pixmap(&self) -> Option<Pixmap> {
        let size = IntSize::from_wh(self.width, self.height)?;
        let mut data = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(4) {
            let p = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
        }
        Pixmap::from_vec(data, size)
    }
}

/// Decode capture bytes into RGBA pixels.
///
/// The container format is sniffed from the bytes themselves; PNG and
/// JPEG are the formats hosts hand over.
pub fn decode_capture(data: &[u8]) -> Result<SourceImage, RenderError> {
    let img = image::load_from_memory(data).map_err(|e| RenderError::Decode(e.to_string()))?;
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!("decoded {}x{} capture from {} bytes", width, height, data.len());

    Ok(SourceImage {
        pixels: rgba.into_raw(),
        width,
        height,
    })
}
