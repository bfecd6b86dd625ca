//! Page protocol messages
//!
//! The typed vocabulary spoken over a [`crate::link::PageLink`]. Every
//! request travels with its own reply slot, so responses never need to
//! be matched back by id.

use smol::channel::Sender;

use crate::host::RawCapture;
use crate::settings::CompositionSettings;

/// Requests sent to the page processor
#[derive(Debug, Clone)]
pub enum PageRequest {
    /// Liveness probe
    Ping,
    /// Composite this capture under these settings and deliver it
    Process {
        capture: RawCapture,
        settings: CompositionSettings,
    },
}

/// Replies from the page processor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    /// Probe answer: somebody is listening
    Pong,
    /// Composite finished and the result went to delivery
    Done,
    /// The page pipeline could not finish the request
    Failed { reason: String },
}

/// One request in flight, carrying its reply slot
#[derive(Debug)]
pub struct Envelope {
    /// Monotonic id for log correlation
    pub request_id: u32,
    pub request: PageRequest,
    pub reply: Sender<PageResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responses_compare_by_content() {
        assert_eq!(PageResponse::Pong, PageResponse::Pong);
        assert_ne!(
            PageResponse::Failed { reason: "a".into() },
            PageResponse::Failed { reason: "b".into() }
        );
    }
}
