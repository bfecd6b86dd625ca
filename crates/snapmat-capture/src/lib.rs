//! Capture pipeline
//!
//! Everything between the capture button and a finished PNG:
//!
//! - [`host`]: the browser surface the pipeline runs against
//! - [`session`]: per-request lifecycle bookkeeping
//! - [`link`] and [`message`]: request/reply plumbing into the page context
//! - [`processor`]: the page-side compositing servant
//! - [`orchestrator`]: the privileged-side driver tying it all together
//! - [`settings`]: persisted composition preferences
//! - [`delivery`]: handing finished images to the user

pub mod delivery;
pub mod host;
pub mod link;
pub mod message;
pub mod orchestrator;
pub mod processor;
pub mod session;
pub mod settings;

pub use delivery::{download_file_name, timestamped_download_name, DeliveryError, DeliverySink};
pub use host::{
    is_restricted_surface, BrowserHost, CaptureFormat, CaptureOptions, HostError, RawCapture,
    TabId, TargetInfo, WindowId,
};
pub use link::{LinkError, PageLink};
pub use message::{Envelope, PageRequest, PageResponse};
pub use orchestrator::{CaptureOrchestrator, CaptureOutcome, INJECT_SETTLE, PROBE_TIMEOUT};
pub use session::{CompositeSite, Session, SessionState};
pub use settings::{
    ensure_defaults, BackgroundKind, CompositionSettings, SettingsStore, StoreError, SETTINGS_KEY,
};

/// Errors a capture session can surface to the user.
///
/// Only capture-stage and local-compositing problems reach here; every
/// page-side failure after a successful capture degrades to local
/// compositing instead.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No focused tab to photograph
    #[error("no active tab to capture")]
    NoActiveTarget,

    /// The host refused to photograph this surface
    #[error("capture not permitted here: {0}")]
    CaptureRestricted(String),

    /// The host failed to produce an image
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The captured bytes were not a readable image
    #[error("captured image unreadable: {0}")]
    Decode(String),

    /// Compositing succeeded but the result could not be saved
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl From<HostError> for CaptureError {
    fn from(e: HostError) -> Self {
        match e {
            HostError::AccessDenied(detail) => CaptureError::CaptureRestricted(detail),
            HostError::Failed(detail) => CaptureError::CaptureFailed(detail),
        }
    }
}
