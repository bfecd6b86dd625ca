//! Orchestrator edge cases
//!
//! The paths a capture session can fail on: missing targets, denied
//! captures, unreadable bytes, broken delivery, and the timing bounds
//! of the probe and injection steps.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use smol::channel::Receiver;

use snapmat_capture::processor;
use snapmat_capture::{
    BrowserHost, CaptureError, CaptureOptions, CaptureOrchestrator, CompositeSite,
    CompositionSettings, DeliveryError, DeliverySink, Envelope, HostError, PageLink, RawCapture,
    TabId, TargetInfo, WindowId, INJECT_SETTLE, PROBE_TIMEOUT,
};
use snapmat_gradient::Color;
use snapmat_render::{Canvas, CompositionResult};

// ============================================================================
// TEST DOUBLES
// ============================================================================

struct MemorySink {
    delivered: Mutex<Vec<String>>,
    fail: bool,
}

impl MemorySink {
    fn new() -> Arc<Self> {
        Arc::new(Self { delivered: Mutex::new(Vec::new()), fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { delivered: Mutex::new(Vec::new()), fail: true })
    }

    fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl DeliverySink for MemorySink {
    fn deliver(&self, _image: &CompositionResult) -> Result<String, DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Sink("disk full".into()));
        }
        let name = snapmat_capture::timestamped_download_name();
        self.delivered.lock().unwrap().push(name.clone());
        Ok(name)
    }
}

struct TestHost {
    target: Option<TargetInfo>,
    capture_png: Vec<u8>,
    deny_capture: bool,
    inject_works: bool,
    link: PageLink,
    inbox: Mutex<Option<Receiver<Envelope>>>,
    processor_sink: Arc<MemorySink>,
}

impl TestHost {
    fn new(processor_sink: Arc<MemorySink>) -> Self {
        let (link, inbox) = PageLink::new(8);
        Self {
            target: Some(TargetInfo {
                tab: Some(3),
                window: 1,
                url: "https://example.com/".into(),
            }),
            capture_png: tiny_png(4, 4),
            deny_capture: false,
            inject_works: true,
            link,
            inbox: Mutex::new(Some(inbox)),
            processor_sink,
        }
    }

    fn serve_page(&self) {
        if let Some(inbox) = self.inbox.lock().unwrap().take() {
            processor::spawn(inbox, self.processor_sink.clone());
        }
    }
}

impl BrowserHost for TestHost {
    async fn active_target(&self) -> Option<TargetInfo> {
        self.target.clone()
    }

    async fn capture_viewport(
        &self,
        _window: WindowId,
        options: &CaptureOptions,
    ) -> Result<RawCapture, HostError> {
        if self.deny_capture {
            return Err(HostError::AccessDenied("activeTab only".into()));
        }
        Ok(RawCapture { bytes: self.capture_png.clone(), format: options.format })
    }

    async fn inject_processor(&self, _tab: TabId) -> Result<(), HostError> {
        if !self.inject_works {
            return Err(HostError::Failed("scripting blocked".into()));
        }
        self.serve_page();
        Ok(())
    }

    fn page_link(&self, _tab: TabId) -> PageLink {
        self.link.clone()
    }
}

fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut canvas = Canvas::new(width, height).unwrap();
    canvas.fill(Color::WHITE);
    canvas.encode_png().unwrap()
}

fn restricted_target() -> Option<TargetInfo> {
    Some(TargetInfo { tab: Some(3), window: 1, url: "chrome://flags".into() })
}

// ============================================================================
// MISSING OR UNADDRESSABLE TARGETS
// ============================================================================

#[test]
fn test_no_focused_tab_is_an_error() {
    let mut host = TestHost::new(MemorySink::new());
    host.target = None;

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    assert!(matches!(result, Err(CaptureError::NoActiveTarget)));
}

#[test]
fn test_target_without_tab_id_is_an_error() {
    let mut host = TestHost::new(MemorySink::new());
    host.target = Some(TargetInfo { tab: None, window: 1, url: "https://example.com/".into() });

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    assert!(matches!(result, Err(CaptureError::NoActiveTarget)));
}

#[test]
fn test_missing_url_degrades_to_local_without_probing() {
    let local_sink = MemorySink::new();
    let mut host = TestHost::new(MemorySink::new());
    host.target = Some(TargetInfo { tab: Some(3), window: 1, url: String::new() });

    let orchestrator = CaptureOrchestrator::new(host, local_sink.clone());
    let outcome = smol::block_on(orchestrator.run(&CompositionSettings::default())).unwrap();

    assert_eq!(outcome.site, CompositeSite::Local);
    assert!(!outcome.injected);
    assert_eq!(local_sink.count(), 1);
}

// ============================================================================
// CAPTURE FAILURES
// ============================================================================

#[test]
fn test_denied_capture_reports_restriction() {
    let local_sink = MemorySink::new();
    let mut host = TestHost::new(MemorySink::new());
    host.deny_capture = true;

    let orchestrator = CaptureOrchestrator::new(host, local_sink.clone());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    match result {
        Err(CaptureError::CaptureRestricted(detail)) => assert!(detail.contains("activeTab")),
        other => panic!("expected CaptureRestricted, got {:?}", other),
    }
    assert_eq!(local_sink.count(), 0);
}

#[test]
fn test_unreadable_capture_reports_decode() {
    let mut host = TestHost::new(MemorySink::new());
    host.capture_png = b"BM this is not a png".to_vec();
    host.target = restricted_target();

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    assert!(matches!(result, Err(CaptureError::Decode(_))));
}

#[test]
fn test_garbage_capture_fails_even_after_page_degrade() {
    // A live page cannot decode the bytes either; the session degrades
    // to local compositing and fails there for the same reason.
    let page_sink = MemorySink::new();
    let local_sink = MemorySink::new();
    let mut host = TestHost::new(page_sink.clone());
    host.capture_png = vec![0u8; 64];
    host.serve_page();

    let orchestrator = CaptureOrchestrator::new(host, local_sink.clone());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    assert!(matches!(result, Err(CaptureError::Decode(_))));
    assert_eq!(page_sink.count(), 0);
    assert_eq!(local_sink.count(), 0);
}

// ============================================================================
// DELIVERY FAILURES
// ============================================================================

#[test]
fn test_local_delivery_failure_is_surfaced() {
    let mut host = TestHost::new(MemorySink::new());
    host.target = restricted_target();

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::failing());
    let result = smol::block_on(orchestrator.run(&CompositionSettings::default()));

    match result {
        Err(CaptureError::Delivery(detail)) => assert!(detail.contains("disk full")),
        other => panic!("expected Delivery, got {:?}", other),
    }
}

// ============================================================================
// PREVIEW FAILURES
// ============================================================================

#[test]
fn test_preview_surfaces_capture_denial() {
    let mut host = TestHost::new(MemorySink::new());
    host.deny_capture = true;

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());
    let result = smol::block_on(orchestrator.preview(&CompositionSettings::default(), 300, 200));

    assert!(matches!(result, Err(CaptureError::CaptureRestricted(_))));
}

#[test]
fn test_preview_surfaces_unreadable_capture() {
    let mut host = TestHost::new(MemorySink::new());
    host.capture_png = b"nope".to_vec();

    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());
    let result = smol::block_on(orchestrator.preview(&CompositionSettings::default(), 300, 200));

    assert!(matches!(result, Err(CaptureError::Decode(_))));
}

// ============================================================================
// TIMING BOUNDS
// ============================================================================

#[test]
fn test_dead_page_waits_out_probe_then_settle() {
    let host = TestHost::new(MemorySink::new());
    // Injection works, so the session pays one probe timeout plus the
    // settle pause before the re-probe answers.
    let orchestrator = CaptureOrchestrator::new(host, MemorySink::new());

    let start = Instant::now();
    let outcome = smol::block_on(orchestrator.run(&CompositionSettings::default())).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome.site, CompositeSite::Page);
    assert!(elapsed >= PROBE_TIMEOUT + INJECT_SETTLE);
    assert!(elapsed.as_secs() < 5, "stalled for {:?}", elapsed);
}

#[test]
fn test_unresponsive_page_does_not_hang_the_session() {
    let local_sink = MemorySink::new();
    let mut host = TestHost::new(MemorySink::new());
    host.inject_works = false;
    // Nobody ever serves the mailbox; the probe must give up.
    let orchestrator = CaptureOrchestrator::new(host, local_sink.clone());

    let start = Instant::now();
    let outcome = smol::block_on(orchestrator.run(&CompositionSettings::default())).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome.site, CompositeSite::Local);
    assert!(outcome.injected);
    assert!(elapsed >= PROBE_TIMEOUT);
    assert!(elapsed.as_secs() < 5, "stalled for {:?}", elapsed);
    assert_eq!(local_sink.count(), 1);
}

// ============================================================================
// ERROR DISPLAY
// ============================================================================

#[test]
fn test_error_messages_read_cleanly() {
    assert_eq!(CaptureError::NoActiveTarget.to_string(), "no active tab to capture");
    assert_eq!(
        CaptureError::Delivery("disk full".into()).to_string(),
        "delivery failed: disk full"
    );
    assert_eq!(
        CaptureError::Decode("bad signature".into()).to_string(),
        "captured image unreadable: bad signature"
    );
}
