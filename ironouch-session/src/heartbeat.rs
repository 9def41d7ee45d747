/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat timing for one session.
//!
//! The timer tick checks two thresholds: one second of send-idle triggers
//! a heartbeat, reconnect-interval of receive-silence closes the socket.

use std::time::{Duration, Instant};

/// Send-idle threshold after which a heartbeat goes out.
pub const HEARTBEAT_SEND_INTERVAL: Duration = Duration::from_secs(1);

/// Tracks last-sent/last-received instants for one session.
#[derive(Debug, Clone)]
pub struct HeartbeatClock {
    /// Receive-silence threshold; also the reconnect delay.
    reconnect_interval: Duration,
    last_sent: Instant,
    last_received: Instant,
}

impl HeartbeatClock {
    /// Creates a clock with both timestamps set to now.
    #[must_use]
    pub fn new(reconnect_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            reconnect_interval,
            last_sent: now,
            last_received: now,
        }
    }

    /// Records that bytes went out.
    #[inline]
    pub fn note_sent(&mut self) {
        self.last_sent = Instant::now();
    }

    /// Records that bytes came in.
    #[inline]
    pub fn note_received(&mut self) {
        self.last_received = Instant::now();
    }

    /// Returns true when nothing has been sent for the heartbeat interval.
    #[must_use]
    pub fn should_send_heartbeat(&self) -> bool {
        self.last_sent.elapsed() >= HEARTBEAT_SEND_INTERVAL
    }

    /// Returns true when nothing has been received for the reconnect
    /// interval.
    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.last_received.elapsed() >= self.reconnect_interval
    }

    /// Time since the last received byte, for diagnostics.
    #[must_use]
    pub fn silence(&self) -> Duration {
        self.last_received.elapsed()
    }

    /// Returns the configured receive-silence threshold.
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    /// Rewinds both timestamps to now, as done right after a logon is sent.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_sent = now;
        self.last_received = now;
    }
}
