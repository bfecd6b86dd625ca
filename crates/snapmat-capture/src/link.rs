//! Page link
//!
//! Request/response channel between the requesting context and the
//! page processor. The sending half is cheap to clone; the receiving
//! half is the processor's mailbox. Requests can be bounded by a
//! timeout, covering the full round trip.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use smol::channel::{self, Receiver, Sender};
use smol::future;
use smol::Timer;

use crate::message::{Envelope, PageRequest, PageResponse};

/// Link failures: the page side is absent, slow, or gone
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// No reply arrived inside the allowed window
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    /// The mailbox is closed on the other side
    #[error("page link disconnected")]
    Disconnected,
}

/// Sending half of the page channel
#[derive(Debug, Clone)]
pub struct PageLink {
    tx: Sender<Envelope>,
    next_request_id: Arc<AtomicU32>,
}

impl PageLink {
    /// Create a link plus the mailbox a processor will serve.
    ///
    /// `capacity` bounds how many requests can sit unserved; probes
    /// sent before injection park here until a processor picks them up.
    pub fn new(capacity: usize) -> (Self, Receiver<Envelope>) {
        let (tx, rx) = channel::bounded(capacity);
        let link = Self {
            tx,
            next_request_id: Arc::new(AtomicU32::new(1)),
        };
        (link, rx)
    }

    /// Send one request and wait for its reply.
    ///
    /// With a timeout the whole exchange is bounded; without one the
    /// call waits as long as the mailbox stays open.
    pub async fn request(
        &self,
        request: PageRequest,
        timeout: Option<Duration>,
    ) -> Result<PageResponse, LinkError> {
        let (reply_tx, reply_rx) = channel::bounded(1);
        let envelope = Envelope {
            request_id: self.next_request_id.fetch_add(1, Ordering::Relaxed),
            request,
            reply: reply_tx,
        };

        let exchange = async {
            self.tx
                .send(envelope)
                .await
                .map_err(|_| LinkError::Disconnected)?;
            reply_rx.recv().await.map_err(|_| LinkError::Disconnected)
        };

        match timeout {
            Some(wait) => {
                future::or(exchange, async {
                    Timer::after(wait).await;
                    Err(LinkError::Timeout(wait))
                })
                .await
            }
            None => exchange.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        smol::block_on(async {
            let (link, inbox) = PageLink::new(4);
            smol::spawn(async move {
                while let Ok(envelope) = inbox.recv().await {
                    let _ = envelope.reply.send(PageResponse::Pong).await;
                }
            })
            .detach();

            let reply = link
                .request(PageRequest::Ping, Some(Duration::from_secs(1)))
                .await;
            assert_eq!(reply, Ok(PageResponse::Pong));
        });
    }

    #[test]
    fn test_unserved_mailbox_times_out() {
        smol::block_on(async {
            let (link, _inbox) = PageLink::new(4);
            let wait = Duration::from_millis(20);
            let reply = link.request(PageRequest::Ping, Some(wait)).await;
            assert_eq!(reply, Err(LinkError::Timeout(wait)));
        });
    }

    #[test]
    fn test_dropped_mailbox_disconnects() {
        smol::block_on(async {
            let (link, inbox) = PageLink::new(4);
            drop(inbox);
            let reply = link.request(PageRequest::Ping, None).await;
            assert_eq!(reply, Err(LinkError::Disconnected));
        });
    }

    #[test]
    fn test_request_ids_are_monotonic() {
        smol::block_on(async {
            let (link, inbox) = PageLink::new(4);
            let responder = smol::spawn(async move {
                let mut seen = Vec::new();
                while let Ok(envelope) = inbox.recv().await {
                    seen.push(envelope.request_id);
                    let _ = envelope.reply.send(PageResponse::Pong).await;
                    if seen.len() == 2 {
                        break;
                    }
                }
                seen
            });

            link.request(PageRequest::Ping, None).await.unwrap();
            link.request(PageRequest::Ping, None).await.unwrap();
            assert_eq!(responder.await, vec![1, 2]);
        });
    }
}
