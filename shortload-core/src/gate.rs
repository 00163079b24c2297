//! Happens-before edge between setup and load
//!
//! VUs hold a [`GateWaiter`] and block in [`GateWaiter::wait`] until setup
//! publishes the finished pool through [`PhaseGate::open`]. Opening and
//! closing consume the gate, so a pool is published at most once.

use crate::token::TokenPool;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
enum GateState {
    Pending,
    Open(Arc<TokenPool>),
    Closed,
}

/// Setup side of the gate
#[derive(Debug)]
pub struct PhaseGate {
    tx: watch::Sender<GateState>,
}

/// Load side of the gate, one per VU
#[derive(Debug, Clone)]
pub struct GateWaiter {
    rx: watch::Receiver<GateState>,
}

impl PhaseGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(GateState::Pending);
        Self { tx }
    }

    pub fn waiter(&self) -> GateWaiter {
        GateWaiter {
            rx: self.tx.subscribe(),
        }
    }

    /// Publish the finished pool to every waiter
    pub fn open(self, pool: Arc<TokenPool>) {
        self.tx.send_replace(GateState::Open(pool));
    }

    /// Release waiters without a pool
    pub fn close(self) {
        self.tx.send_replace(GateState::Closed);
    }
}

impl Default for PhaseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl GateWaiter {
    /// Wait for setup to finish
    ///
    /// Returns `None` when the gate was closed, or dropped, without a pool.
    pub async fn wait(&mut self) -> Option<Arc<TokenPool>> {
        let state = self
            .rx
            .wait_for(|state| !matches!(state, GateState::Pending))
            .await
            .ok()?;

        match &*state {
            GateState::Open(pool) => Some(Arc::clone(pool)),
            _ => None,
        }
    }

    /// The pool, if the gate is already open
    pub fn try_pool(&self) -> Option<Arc<TokenPool>> {
        match &*self.rx.borrow() {
            GateState::Open(pool) => Some(Arc::clone(pool)),
            _ => None,
        }
    }
}
