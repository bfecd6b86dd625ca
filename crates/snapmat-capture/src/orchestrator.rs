//! Capture orchestration
//!
//! Drives one capture request from button press to delivery: resolve
//! the target, photograph the viewport in the privileged context, then
//! composite wherever a processor can actually run. The page context is
//! preferred; every page-side problem after a successful capture
//! degrades silently to compositing in the requesting context, never to
//! a user-visible error.

use std::sync::Arc;
use std::time::Duration;

use smol::Timer;

use snapmat_render::{compose, compose_preview, decode_capture, CompositionResult, RenderError};

use crate::delivery::DeliverySink;
use crate::host::{is_restricted_surface, BrowserHost, CaptureOptions, RawCapture};
use crate::link::PageLink;
use crate::message::{PageRequest, PageResponse};
use crate::session::{CompositeSite, Session, SessionState};
use crate::settings::CompositionSettings;
use crate::CaptureError;

/// Bounded wait for a liveness reply
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(250);

/// Fixed pause between injection and the single re-probe
pub const INJECT_SETTLE: Duration = Duration::from_millis(150);

/// How a finished capture went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Where compositing ran
    pub site: CompositeSite,
    /// Whether processor injection was attempted along the way
    pub injected: bool,
    /// Delivered file name; only local delivery reports one
    pub file: Option<String>,
}

/// Orchestrates capture sessions over a host and a delivery sink.
///
/// Stateless between requests: concurrent [`run`](Self::run) calls get
/// independent sessions and never share buffers or ordering.
pub struct CaptureOrchestrator<H> {
    host: H,
    sink: Arc<dyn DeliverySink>,
}

impl<H: BrowserHost> CaptureOrchestrator<H> {
    pub fn new(host: H, sink: Arc<dyn DeliverySink>) -> Self {
        Self { host, sink }
    }

    /// Run one capture request to a terminal state.
    pub async fn run(&self, settings: &CompositionSettings) -> Result<CaptureOutcome, CaptureError> {
        let mut session = Session::new();

        let Some(target) = self.host.active_target().await else {
            return Err(self.fail(&mut session, CaptureError::NoActiveTarget));
        };
        let Some(tab) = target.tab else {
            return Err(self.fail(&mut session, CaptureError::NoActiveTarget));
        };
        let restricted = is_restricted_surface(&target.url);
        let window = target.window;
        tracing::info!("session {}: capturing tab {} ({:?})", session.id, tab, target.url);
        session.target = Some(target);
        session.transition(SessionState::Capturing);

        let capture = match self.host.capture_viewport(window, &CaptureOptions::full()).await {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(&mut session, e.into())),
        };
        tracing::debug!("session {}: captured {} bytes", session.id, capture.bytes.len());

        if restricted {
            tracing::debug!("session {}: restricted surface, skipping delegation", session.id);
            session.transition(SessionState::LocalCompositing);
            return self.composite_locally(&mut session, &capture, settings);
        }

        session.transition(SessionState::Probing);
        let link = self.host.page_link(tab);

        if !self.probe(&link).await {
            session.transition(SessionState::Injecting);
            session.attempted_injection = true;

            let live = match self.host.inject_processor(tab).await {
                Ok(()) => {
                    Timer::after(INJECT_SETTLE).await;
                    self.probe(&link).await
                }
                Err(e) => {
                    tracing::debug!("session {}: injection failed: {}", session.id, e);
                    false
                }
            };
            if !live {
                session.transition(SessionState::LocalCompositing);
                return self.composite_locally(&mut session, &capture, settings);
            }
        }
        session.transition(SessionState::Delegating);

        if self.delegate(&link, &capture, settings).await {
            session.transition(SessionState::Delivered);
            tracing::info!("session {}: delivered by page processor", session.id);
            return Ok(CaptureOutcome {
                site: CompositeSite::Page,
                injected: session.attempted_injection,
                file: None,
            });
        }

        tracing::debug!("session {}: delegation fell through, compositing locally", session.id);
        session.transition(SessionState::LocalCompositing);
        self.composite_locally(&mut session, &capture, settings)
    }

    /// Capture and composite a scaled preview.
    ///
    /// Previews stay in the requesting context: no probing, no
    /// injection, no delivery, no session bookkeeping.
    pub async fn preview(
        &self,
        settings: &CompositionSettings,
        max_width: u32,
        max_height: u32,
    ) -> Result<CompositionResult, CaptureError> {
        let Some(target) = self.host.active_target().await else {
            return Err(CaptureError::NoActiveTarget);
        };

        let raw = self
            .host
            .capture_viewport(target.window, &CaptureOptions::preview())
            .await?;
        let source = decode_capture(&raw.bytes).map_err(decode_error)?;

        compose_preview(
            &source,
            &settings.background_spec(),
            settings.padding,
            max_width,
            max_height,
        )
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
    }

    async fn probe(&self, link: &PageLink) -> bool {
        match link.request(PageRequest::Ping, Some(PROBE_TIMEOUT)).await {
            Ok(PageResponse::Pong) => true,
            Ok(other) => {
                tracing::debug!("unexpected probe reply: {:?}", other);
                false
            }
            Err(e) => {
                tracing::debug!("probe got no answer: {}", e);
                false
            }
        }
    }

    async fn delegate(
        &self,
        link: &PageLink,
        capture: &RawCapture,
        settings: &CompositionSettings,
    ) -> bool {
        let request = PageRequest::Process {
            capture: capture.clone(),
            settings: settings.clone(),
        };
        match link.request(request, None).await {
            Ok(PageResponse::Done) => true,
            Ok(PageResponse::Failed { reason }) => {
                tracing::info!("page processor declined: {}", reason);
                false
            }
            Ok(other) => {
                tracing::debug!("unexpected delegation reply: {:?}", other);
                false
            }
            Err(e) => {
                tracing::info!("page link dropped mid-delegation: {}", e);
                false
            }
        }
    }

    fn composite_locally(
        &self,
        session: &mut Session,
        capture: &RawCapture,
        settings: &CompositionSettings,
    ) -> Result<CaptureOutcome, CaptureError> {
        let source = match decode_capture(&capture.bytes) {
            Ok(source) => source,
            Err(e) => return Err(self.fail(session, decode_error(e))),
        };

        let result = match compose(&source, &settings.background_spec(), settings.padding) {
            Ok(result) => result,
            Err(e) => {
                return Err(self.fail(session, CaptureError::CaptureFailed(e.to_string())));
            }
        };

        let file = match self.sink.deliver(&result) {
            Ok(file) => file,
            Err(e) => return Err(self.fail(session, CaptureError::Delivery(e.to_string()))),
        };

        session.transition(SessionState::Delivered);
        tracing::info!("session {}: delivered locally as {}", session.id, file);
        Ok(CaptureOutcome {
            site: CompositeSite::Local,
            injected: session.attempted_injection,
            file: Some(file),
        })
    }

    fn fail(&self, session: &mut Session, error: CaptureError) -> CaptureError {
        session.transition(SessionState::Failed);
        tracing::warn!("session {}: {}", session.id, error);
        error
    }
}

fn decode_error(e: RenderError) -> CaptureError {
    match e {
        RenderError::Decode(reason) => CaptureError::Decode(reason),
        other => CaptureError::CaptureFailed(other.to_string()),
    }
}
