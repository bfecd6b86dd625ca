//! CSS linear-gradient parsing
//!
//! A narrow parser for the `linear-gradient(...)` strings stored in
//! composition settings. It is total: input it cannot read comes back
//! as a stock fallback gradient instead of an error, so a corrupted
//! setting can never abort a capture.

use crate::Color;

/// Angle used when the gradient string names none (degrees).
pub const DEFAULT_ANGLE: f32 = 135.0;

/// A color stop in a gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient line (0.0 - 1.0)
    pub position: f32,
    /// Color at this position
    pub color: Color,
}

impl ColorStop {
    /// Create a new color stop
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// A parsed linear gradient: angle plus color stops.
///
/// Stops keep their input order. Sorting (or not) is the renderer's
/// business, not the parser's.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Angle in degrees (0 = to top, 90 = to right)
    pub angle: f32,
    /// Stops in the order the input listed them
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// The gradient substituted for unreadable input.
    pub fn fallback() -> Self {
        Self {
            angle: DEFAULT_ANGLE,
            stops: vec![
                ColorStop::new(0.0, Color::rgb(0x66, 0x7e, 0xea)),
                ColorStop::new(1.0, Color::rgb(0x76, 0x4b, 0xa2)),
            ],
        }
    }
}

/// Parse a CSS `linear-gradient(...)` string.
///
/// Never fails. Input that does not look like a linear gradient, or
/// that carries no stop tokens at all, yields [`LinearGradient::fallback`].
/// Within a recognizable gradient, each unreadable piece degrades on its
/// own: a bad angle falls back to [`DEFAULT_ANGLE`], a bad color to
/// black, a missing percentage to even spacing.
pub fn parse(css: &str) -> LinearGradient {
    match try_parse(css) {
        Some(gradient) => gradient,
        None => {
            tracing::debug!("unreadable gradient {:?}, using fallback", css);
            LinearGradient::fallback()
        }
    }
}

fn try_parse(css: &str) -> Option<LinearGradient> {
    let value = css.trim();

    let start = value.find("linear-gradient(")?;
    let rest = &value[start + "linear-gradient(".len()..];
    let inner = &rest[..rest.rfind(')')?];
    if inner.trim().is_empty() {
        return None;
    }

    let parts: Vec<&str> = inner.split(',').map(|s| s.trim()).collect();

    let (angle, stop_start) = if parts.first()?.contains("deg") {
        (parse_angle(parts[0]).unwrap_or(DEFAULT_ANGLE), 1)
    } else {
        (DEFAULT_ANGLE, 0)
    };

    let tokens = &parts[stop_start..];
    if tokens.is_empty() {
        return None;
    }

    let count = tokens.len();
    let mut stops = Vec::with_capacity(count);
    for (i, token) in tokens.iter().enumerate() {
        let color = scan_color(token).unwrap_or(Color::BLACK);
        let position = scan_percentage(token)
            .unwrap_or(i as f32 / (count - 1).max(1) as f32);
        stops.push(ColorStop { position, color });
    }

    Some(LinearGradient { angle, stops })
}

/// Angle from a token like `135deg`. Only the leading integer counts.
fn parse_angle(token: &str) -> Option<f32> {
    let cleaned = token.replacen("deg", "", 1);
    parse_leading_int(cleaned.trim()).map(|v| v as f32)
}

fn parse_leading_int(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse().ok()
}

/// First color in a stop token: `#rrggbb`, `#rgb`, `rgb(...)` or
/// `rgba(...)`, whichever starts earliest. Longer hex wins at a
/// given `#`.
fn scan_color(token: &str) -> Option<Color> {
    let bytes = token.as_bytes();
    for (i, _) in token.char_indices() {
        if bytes[i] == b'#' {
            let digits = bytes[i + 1..]
                .iter()
                .take_while(|b| b.is_ascii_hexdigit())
                .count();
            if digits >= 6 {
                return Color::from_hex(&token[i..i + 7]);
            }
            if digits >= 3 {
                return Color::from_hex(&token[i..i + 4]);
            }
        }
        let rest = &token[i..];
        if rest.starts_with("rgb(") || rest.starts_with("rgba(") {
            // A function form owns the token even when its body is broken
            let body = rest.find('(').and_then(|open| {
                rest.rfind(')')
                    .filter(|close| *close > open)
                    .map(|close| &rest[open + 1..close])
            });
            return body.and_then(parse_rgb_body);
        }
    }
    None
}

fn parse_rgb_body(body: &str) -> Option<Color> {
    let mut values = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());

    let r = values.next()?.parse::<u8>().ok()?;
    let g = values.next()?.parse::<u8>().ok()?;
    let b = values.next()?.parse::<u8>().ok()?;
    let a = match values.next() {
        Some(alpha) => {
            let alpha = alpha.parse::<f32>().ok()?;
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::rgba(r, g, b, a))
}

/// First integer-valued percentage anywhere in the token, as a 0-based
/// fraction. `"12.5%"` reads as 5%: the fractional digits are the first
/// run directly followed by `%`.
fn scan_percentage(token: &str) -> Option<f32> {
    let bytes = token.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut end = i;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end < bytes.len() && bytes[end] == b'%' {
                if let Ok(value) = token[i..end].parse::<u32>() {
                    return Some(value as f32 / 100.0);
                }
            }
            i = end;
        } else {
            i += 1;
        }
    }
    None
}
