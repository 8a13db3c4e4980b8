//! Process-wide reachability indicator
//!
//! Written by the dispatcher's health check and by the stream consumer's
//! lifecycle events. Last write wins; the value is advisory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Tri-state reachability of the remote actuator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl ConnectivityState {
    pub fn is_connected(self) -> bool {
        self == ConnectivityState::Connected
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectivityState::Unknown => "unknown",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Disconnected => "disconnected",
        };
        f.write_str(label)
    }
}

/// Observable holder for [`ConnectivityState`]
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectivityState::Unknown);
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    pub fn current(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// Record a new state. Subscribers are only woken on an actual change.
    pub fn set(&self, state: ConnectivityState) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });

        if changed {
            info!("Connectivity changed: {}", state);
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.set(if connected {
            ConnectivityState::Connected
        } else {
            ConnectivityState::Disconnected
        });
    }

    /// Receiver that observes every transition
    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}
