//! Host capabilities
//!
//! The privileged-context surface the orchestrator drives: identity of
//! the active target, viewport capture, and processor injection. Every
//! embedding backs these capabilities its own way; the orchestrator
//! only sees this interface.

use url::Url;

use crate::link::PageLink;

/// Tab identifier within the host
pub type TabId = u32;

/// Window identifier within the host
pub type WindowId = u32;

/// The focused page as the host reports it
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Addressable tab id; hosts can report a tab without one
    pub tab: Option<TabId>,
    /// Window owning the tab, used for viewport capture
    pub window: WindowId,
    /// Target URL; empty when the host withholds it
    pub url: String,
}

/// Capture container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    Png,
    Jpeg,
}

/// Options for one viewport capture
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub format: CaptureFormat,
    /// Encoder quality hint, 0-100; PNG encoders may ignore it
    pub quality: u8,
}

impl CaptureOptions {
    /// Full-fidelity capture for the final composition
    pub fn full() -> Self {
        Self { format: CaptureFormat::Png, quality: 100 }
    }

    /// Cheaper capture for previews
    pub fn preview() -> Self {
        Self { format: CaptureFormat::Png, quality: 90 }
    }
}

/// Raw capture bytes handed over by the host
#[derive(Debug, Clone)]
pub struct RawCapture {
    pub bytes: Vec<u8>,
    pub format: CaptureFormat,
}

/// Failures reported by host capabilities
#[derive(Debug, Clone, thiserror::Error)]
pub enum HostError {
    /// The host refuses access to this surface
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// The capability exists but did not work
    #[error("{0}")]
    Failed(String),
}

/// Privileged-context capabilities the orchestrator runs on.
#[allow(async_fn_in_trait)]
pub trait BrowserHost {
    /// Identity of the focused tab, if any.
    async fn active_target(&self) -> Option<TargetInfo>;

    /// Photograph the visible viewport of `window`.
    async fn capture_viewport(
        &self,
        window: WindowId,
        options: &CaptureOptions,
    ) -> Result<RawCapture, HostError>;

    /// Load the page processor into `tab`. Returning without error does
    /// not guarantee the processor answers; callers re-probe.
    async fn inject_processor(&self, tab: TabId) -> Result<(), HostError>;

    /// Message link to the processor slot in `tab`.
    fn page_link(&self, tab: TabId) -> PageLink;
}

/// Schemes that never accept an injected processor
const RESTRICTED_SCHEMES: &[&str] = &[
    "chrome",
    "chrome-extension",
    "moz-extension",
    "edge",
    "about",
    "javascript",
];

/// Whether `url` names a surface where page delegation cannot work.
///
/// A missing or unparseable URL counts as restricted: probing such a
/// target is a guaranteed dead end. `file:` and `data:` pages stay
/// eligible, they often carry ordinary content.
pub fn is_restricted_surface(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => RESTRICTED_SCHEMES.contains(&parsed.scheme()),
        Err(_) => true,
    }
}
