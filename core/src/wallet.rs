use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Visible connection state of the simulated wallet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Local-only wallet "connection": connecting just waits out a fixed delay.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletConnection {
    delay: Duration,
    connecting_since: Option<Instant>,
    connected: bool,
}

impl WalletConnection {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            connecting_since: None,
            connected: false,
        }
    }

    pub fn status(&self) -> WalletStatus {
        match (self.connected, self.connecting_since) {
            (true, _) => WalletStatus::Connected,
            (false, Some(_)) => WalletStatus::Connecting,
            (false, None) => WalletStatus::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Starts connecting. Returns `false` if already connected or connecting.
    pub fn begin_connect(&mut self, now: Instant) -> bool {
        if self.connected || self.connecting_since.is_some() {
            return false;
        }
        self.connecting_since = Some(now);
        true
    }

    /// Completes a pending connection once the delay has elapsed. Returns `true` on completion.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.connecting_since {
            Some(since) if now.saturating_duration_since(since) >= self.delay => {
                self.connecting_since = None;
                self.connected = true;
                log::debug!("Wallet connected");
                true
            }
            _ => false,
        }
    }

    /// Drops the connection, cancelling any pending attempt. Returns whether anything changed.
    pub fn disconnect(&mut self) -> bool {
        let changed = self.connected || self.connecting_since.is_some();
        self.connected = false;
        self.connecting_since = None;
        changed
    }
}
