//! Page processor
//!
//! The page-context half of the protocol: answers liveness probes and
//! composites delegated captures right where the best canvas lives. In
//! a single-process embedding, "injection" simply spawns this loop on
//! the page mailbox.

use std::sync::Arc;

use smol::channel::Receiver;

use snapmat_render::{compose, decode_capture};

use crate::delivery::DeliverySink;
use crate::host::RawCapture;
use crate::message::{Envelope, PageRequest, PageResponse};
use crate::settings::CompositionSettings;

/// Serve one page mailbox until it closes.
pub async fn serve(inbox: Receiver<Envelope>, sink: Arc<dyn DeliverySink>) {
    while let Ok(envelope) = inbox.recv().await {
        let response = match envelope.request {
            PageRequest::Ping => PageResponse::Pong,
            PageRequest::Process { capture, settings } => {
                process(&capture, &settings, sink.as_ref())
            }
        };
        // the requester may have stopped waiting; that is its business
        let _ = envelope.reply.send(response).await;
    }
    tracing::debug!("page mailbox closed, processor retiring");
}

/// Spawn a processor onto the global executor. Once this returns the
/// page side counts as live and will answer probes.
pub fn spawn(inbox: Receiver<Envelope>, sink: Arc<dyn DeliverySink>) {
    smol::spawn(serve(inbox, sink)).detach();
}

fn process(
    capture: &RawCapture,
    settings: &CompositionSettings,
    sink: &dyn DeliverySink,
) -> PageResponse {
    let source = match decode_capture(&capture.bytes) {
        Ok(source) => source,
        Err(e) => return PageResponse::Failed { reason: e.to_string() },
    };

    let result = match compose(&source, &settings.background_spec(), settings.padding) {
        Ok(result) => result,
        Err(e) => return PageResponse::Failed { reason: e.to_string() },
    };

    match sink.deliver(&result) {
        Ok(file) => {
            tracing::info!("page processor delivered {}", file);
            PageResponse::Done
        }
        Err(e) => PageResponse::Failed { reason: e.to_string() },
    }
}
