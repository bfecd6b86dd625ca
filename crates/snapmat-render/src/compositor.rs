//! Compositing
//!
//! The output canvas is always the capture plus padding on every side,
//! with the capture drawn at native resolution over the generated
//! background. The preview variant scales the whole composition
//! uniformly into a bounding box and swaps transparency for a
//! checkerboard so it stays visible against any UI.

use snapmat_gradient::{gradient_line, parse, Color, ColorStop, LinearGradient};

use crate::{Canvas, RenderError, SourceImage};

/// Checker cell edge in pixels
const CHECKER_SIZE: u32 = 8;
const CHECKER_BASE: Color = Color::rgb(0xf0, 0xf0, 0xf0);
const CHECKER_SQUARE: Color = Color::rgb(0xe0, 0xe0, 0xe0);

/// Background painted behind the capture
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// CSS linear-gradient string, parsed leniently
    Gradient(String),
    /// Solid fill; white when no color is given
    Solid(Option<Color>),
    /// No fill at all; previews render a checkerboard instead
    Transparent,
}

/// A finished composition
#[derive(Debug, Clone)]
pub struct CompositionResult {
    /// PNG-encoded canvas
    pub bytes: Vec<u8>,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

/// Composite `source` over `background` with `padding` on every side.
///
/// The canvas measures exactly source size plus twice the padding and
/// the capture keeps its native resolution. The same inputs always
/// produce the same bytes.
pub fn compose(
    source: &SourceImage,
    background: &Background,
    padding: u32,
) -> Result<CompositionResult, RenderError> {
    let width = source.width + padding * 2;
    let height = source.height + padding * 2;
    let mut canvas = Canvas::new(width, height)?;

    tracing::debug!(
        "composing {}x{} capture into {}x{} canvas",
        source.width,
        source.height,
        width,
        height
    );

    paint_background(&mut canvas, background, false);
    canvas.draw_image(source, padding as i32, padding as i32);

    Ok(CompositionResult {
        bytes: canvas.encode_png()?,
        width,
        height,
    })
}

/// Composite a preview scaled to fit `max_width` x `max_height`.
///
/// One uniform factor scales capture and padding alike, so the preview
/// keeps the proportions of the final output. Compositions smaller than
/// the box scale up.
pub fn compose_preview(
    source: &SourceImage,
    background: &Background,
    padding: u32,
    max_width: u32,
    max_height: u32,
) -> Result<CompositionResult, RenderError> {
    let full_width = source.width + padding * 2;
    let full_height = source.height + padding * 2;
    if full_width == 0 || full_height == 0 {
        return Err(RenderError::EmptyCanvas {
            width: full_width,
            height: full_height,
        });
    }

    let scale = (max_width as f32 / full_width as f32)
        .min(max_height as f32 / full_height as f32);
    let width = ((full_width as f32 * scale) as u32).max(1);
    let height = ((full_height as f32 * scale) as u32).max(1);
    let mut canvas = Canvas::new(width, height)?;

    tracing::debug!("preview scale {:.3} gives {}x{} canvas", scale, width, height);

    paint_background(&mut canvas, background, true);
    let offset = padding as f32 * scale;
    canvas.draw_image_scaled(source, offset, offset, scale);

    Ok(CompositionResult {
        bytes: canvas.encode_png()?,
        width,
        height,
    })
}

fn paint_background(canvas: &mut Canvas, background: &Background, preview: bool) {
    match background {
        Background::Gradient(css) => fill_linear(canvas, &parse(css)),
        Background::Solid(color) => canvas.fill(color.unwrap_or(Color::WHITE)),
        Background::Transparent if preview => {
            canvas.checkerboard(CHECKER_SIZE, CHECKER_BASE, CHECKER_SQUARE)
        }
        Background::Transparent => {}
    }
}

/// Paint a linear gradient over the whole canvas.
fn fill_linear(canvas: &mut Canvas, gradient: &LinearGradient) {
    let line = gradient_line(gradient.angle, canvas.width() as f32, canvas.height() as f32);
    let (dx, dy) = line.delta();
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f32::EPSILON {
        if let Some(stop) = gradient.stops.first() {
            canvas.fill(stop.color);
        }
        return;
    }

    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            let t = ((x as f32 - line.x0) * dx + (y as f32 - line.y0) * dy) / len_sq;
            canvas.set_pixel(x, y, sample_stops(&gradient.stops, t));
        }
    }
}

/// Color at `position` (clamped to 0..1) along the stop list.
///
/// Stops are walked in their input order. An out-of-order list resolves
/// against the first bracketing stop encountered, not a sorted view.
fn sample_stops(stops: &[ColorStop], position: f32) -> Color {
    if stops.is_empty() {
        return Color::TRANSPARENT;
    }
    if stops.len() == 1 {
        return stops[0].color;
    }

    let pos = position.clamp(0.0, 1.0);

    let mut prev = &stops[0];
    for stop in stops.iter() {
        if stop.position >= pos {
            if stop.position == prev.position {
                return stop.color;
            }
            let t = (pos - prev.position) / (stop.position - prev.position);
            return lerp_color(prev.color, stop.color, t);
        }
        prev = stop;
    }

    stops.last().map(|s| s.color).unwrap_or(Color::TRANSPARENT)
}

/// Interpolate between two colors
#[inline]
fn lerp_color(c1: Color, c2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let inv_t = 1.0 - t;

    Color {
        r: (c1.r as f32 * inv_t + c2.r as f32 * t) as u8,
        g: (c1.g as f32 * inv_t + c2.g as f32 * t) as u8,
        b: (c1.b as f32 * inv_t + c2.b as f32 * t) as u8,
        a: (c1.a as f32 * inv_t + c2.a as f32 * t) as u8,
    }
}
