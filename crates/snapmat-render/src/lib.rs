//! snapmat Render - Screenshot Compositor
//!
//! CPU compositing of viewport captures using tiny-skia.
//!
//! This crate provides:
//! - Canvas backed by a tiny-skia Pixmap
//! - Background painting (gradient, solid, transparency checkerboard)
//! - Capture decoding (PNG, JPEG)
//! - Full-size and scaled preview composition
//! - PNG encoding of the result

mod canvas;
mod compositor;
mod decode;

pub use canvas::Canvas;
pub use compositor::{compose, compose_preview, Background, CompositionResult};
pub use decode::{decode_capture, SourceImage};

/// Rendering errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    /// The capture bytes were not a readable image
    #[error("decode failed: {0}")]
    Decode(String),
    /// PNG serialization of the finished canvas failed
    #[error("encode failed: {0}")]
    Encode(String),
    /// A canvas dimension collapsed to zero
    #[error("empty canvas {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
}
