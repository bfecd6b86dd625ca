//! Delivery
//!
//! Hands a finished composition to whatever turns it into a
//! user-visible download. The sink is the same interface whether
//! compositing ran in-page or locally.

use chrono::{DateTime, SecondsFormat, Utc};

use snapmat_render::CompositionResult;

/// Delivery failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Sink(String),
}

/// Downstream home for a finished composition
pub trait DeliverySink: Send + Sync {
    /// Consume the result; returns the user-visible file name
    fn deliver(&self, result: &CompositionResult) -> Result<String, DeliveryError>;
}

/// Download name for a capture taken at `now`.
///
/// RFC 3339 with milliseconds, with `:` and `.` folded to `-` so the
/// name survives every filesystem.
pub fn download_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("screenshot-{stamp}.png")
}

/// Download name stamped with the current time
pub fn timestamped_download_name() -> String {
    download_file_name(Utc::now())
}
