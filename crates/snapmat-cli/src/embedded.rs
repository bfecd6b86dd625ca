//! Embedded host
//!
//! Stands in for a browser: the "viewport" is a PNG loaded from disk
//! and the page context is a processor task on the local executor,
//! started by injection exactly as a real page would be. Lets the full
//! delegation ladder run without a browser attached.

use std::sync::{Arc, Mutex};

use smol::channel::Receiver;

use snapmat_capture::{
    processor, BrowserHost, CaptureOptions, DeliverySink, Envelope, HostError, PageLink,
    RawCapture, TabId, TargetInfo, WindowId,
};

pub struct EmbeddedHost {
    url: String,
    capture_png: Vec<u8>,
    allow_injection: bool,
    link: PageLink,
    inbox: Mutex<Option<Receiver<Envelope>>>,
    page_sink: Arc<dyn DeliverySink>,
}

impl EmbeddedHost {
    pub fn new(
        capture_png: Vec<u8>,
        url: String,
        allow_injection: bool,
        page_sink: Arc<dyn DeliverySink>,
    ) -> Self {
        let (link, inbox) = PageLink::new(8);
        Self {
            url,
            capture_png,
            allow_injection,
            link,
            inbox: Mutex::new(Some(inbox)),
            page_sink,
        }
    }
}

impl BrowserHost for EmbeddedHost {
    async fn active_target(&self) -> Option<TargetInfo> {
        Some(TargetInfo { tab: Some(1), window: 1, url: self.url.clone() })
    }

    async fn capture_viewport(
        &self,
        _window: WindowId,
        options: &CaptureOptions,
    ) -> Result<RawCapture, HostError> {
        Ok(RawCapture { bytes: self.capture_png.clone(), format: options.format })
    }

    async fn inject_processor(&self, tab: TabId) -> Result<(), HostError> {
        if !self.allow_injection {
            return Err(HostError::Failed("page scripting disabled".into()));
        }
        // A second injection into the same tab finds the slot occupied.
        if let Some(inbox) = self.inbox.lock().map_err(|_| poisoned())?.take() {
            tracing::debug!("starting page processor for tab {}", tab);
            processor::spawn(inbox, self.page_sink.clone());
        }
        Ok(())
    }

    fn page_link(&self, _tab: TabId) -> PageLink {
        self.link.clone()
    }
}

fn poisoned() -> HostError {
    HostError::Failed("page slot lock poisoned".into())
}
