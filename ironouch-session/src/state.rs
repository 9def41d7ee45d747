/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session connection states.
//!
//! A session object outlives its TCP connections, so the state is a plain
//! runtime value cycling through logon, traffic and termination across
//! reconnect attempts.

use std::fmt;

/// Connection state of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempt has completed yet.
    #[default]
    None,
    /// Login request sent, awaiting the response.
    LogonSent,
    /// Login accepted; the session is live.
    LogonReceived,
    /// Logout request sent, awaiting the peer close.
    LogoffSent,
    /// The connection is gone; initiators will redial.
    Terminated,
}

impl SessionState {
    /// Returns true when the session is fully established.
    #[inline]
    #[must_use]
    pub const fn is_logged_on(self) -> bool {
        matches!(self, Self::LogonReceived)
    }

    /// Returns true once a close has happened.
    #[inline]
    #[must_use]
    pub const fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::LogonSent => "logon-sent",
            Self::LogonReceived => "logon-received",
            Self::LogoffSent => "logoff-sent",
            Self::Terminated => "session-terminated",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(SessionState::default(), SessionState::None);
    }

    #[test]
    fn test_logged_on() {
        assert!(SessionState::LogonReceived.is_logged_on());
        assert!(!SessionState::LogonSent.is_logged_on());
        assert!(!SessionState::Terminated.is_logged_on());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::LogoffSent.to_string(), "logoff-sent");
        assert_eq!(SessionState::Terminated.to_string(), "session-terminated");
    }
}
