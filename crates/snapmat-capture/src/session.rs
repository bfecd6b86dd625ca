//! Capture session
//!
//! One state machine per capture request. Sessions are created on
//! demand, walk a fixed set of states, and are dropped at a terminal
//! state. Concurrent sessions never share anything.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::TargetInfo;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, target not yet resolved
    Idle,
    /// Waiting on the host to photograph the viewport
    Capturing,
    /// Asking the page processor whether it is alive
    Probing,
    /// Loading the processor into the page
    Injecting,
    /// Compositing handed to the page processor
    Delegating,
    /// Compositing in the requesting context
    LocalCompositing,
    /// Terminal: the result reached delivery
    Delivered,
    /// Terminal: the request died before compositing could happen
    Failed,
}

impl SessionState {
    /// Legal follow-on states
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Capturing)
                | (Idle, Failed)
                | (Capturing, Probing)
                | (Capturing, LocalCompositing)
                | (Capturing, Failed)
                | (Probing, Delegating)
                | (Probing, Injecting)
                | (Injecting, Delegating)
                | (Injecting, LocalCompositing)
                | (Delegating, Delivered)
                | (Delegating, LocalCompositing)
                | (LocalCompositing, Delivered)
                | (LocalCompositing, Failed)
        )
    }

    /// Whether the session is finished
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Delivered | SessionState::Failed)
    }
}

/// Where the final compositing ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeSite {
    /// The page-embedded processor
    Page,
    /// The requesting context
    Local,
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Per-request orchestration state
#[derive(Debug)]
pub struct Session {
    pub id: u64,
    pub state: SessionState,
    /// Resolved target, set once the host has answered
    pub target: Option<TargetInfo>,
    /// Whether processor injection was attempted on the way
    pub attempted_injection: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            state: SessionState::Idle,
            target: None,
            attempted_injection: false,
        }
    }

    /// Move to `next`, logging the edge
    pub fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::debug!("session {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
