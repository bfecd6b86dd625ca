//! Canvas - pixmap-backed pixel buffer

use snapmat_gradient::Color;
use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::decode::SourceImage;
use crate::RenderError;

/// Pixel canvas
///
/// A thin shell around a tiny-skia [`Pixmap`] that deals in straight
/// (non-premultiplied) RGBA at the edges. Created transparent.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Create a new transparent canvas
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::EmptyCanvas { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Flood the whole canvas with one color
    pub fn fill(&mut self, color: Color) {
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    /// Set a pixel color
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let width = self.pixmap.width();
        if x < width && y < self.pixmap.height() {
            let idx = (y * width + x) as usize;
            self.pixmap.pixels_mut()[idx] =
                ColorU8::from_rgba(color.r, color.g, color.b, color.a).premultiply();
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        for dy in 0..h {
            for dx in 0..w {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Checkerboard that stands in for transparency in previews
    pub fn checkerboard(&mut self, size: u32, base: Color, square: Color) {
        if size == 0 {
            return;
        }
        self.fill(base);
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        for y in (0..height).step_by(size as usize) {
            for x in (0..width).step_by(size as usize) {
                if (x / size + y / size) % 2 == 0 {
                    self.fill_rect(x, y, size, size, square);
                }
            }
        }
    }

    /// Blit `image` with its top-left corner at (x, y), source-over
    pub fn draw_image(&mut self, image: &SourceImage, x: i32, y: i32) {
        let Some(src) = image.to_pixmap() else { return };
        self.pixmap.draw_pixmap(
            x,
            y,
            src.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Blit `image` scaled uniformly by `scale`, corner at (x, y)
    pub fn draw_image_scaled(&mut self, image: &SourceImage, x: f32, y: f32, scale: f32) {
        let Some(src) = image.to_pixmap() else { return };
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_scale(scale, scale).post_translate(x, y);
        self.pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    }

    /// Pixel at (x, y) as straight RGBA
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    /// Encode the canvas as PNG bytes
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}
