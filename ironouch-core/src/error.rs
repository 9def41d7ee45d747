/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the IronOuch engine.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all IronOuch operations.

use thiserror::Error;

/// Result type alias using [`OuchError`] as the error type.
pub type Result<T> = std::result::Result<T, OuchError>;

/// Top-level error type for all IronOuch operations.
#[derive(Debug, Error)]
pub enum OuchError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message encoding.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in message store operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error while loading session settings.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Error in a session log sink.
    #[error("log error: {0}")]
    Log(#[from] LogError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while decoding SoupBin packets or OUCH messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// The OUCH type tag is not one of the known variants.
    #[error("unknown OUCH message type {0}")]
    UnknownMessageType(char),

    /// A message body does not have the exact wire size of its variant.
    #[error("wrong body length for type {tag}: expected {expected}, found {actual}")]
    WrongBodyLength {
        /// The one-byte type tag of the message.
        tag: char,
        /// Exact wire size of the variant.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },

    /// A SoupBin packet exceeds the single-packet ceiling.
    #[error("packet too large: {size} bytes exceeds maximum {max_size}")]
    PacketTooLarge {
        /// Actual framed packet size.
        size: usize,
        /// Maximum allowed framed size.
        max_size: usize,
    },

    /// A SoupBin packet declared a zero-length body where one is required.
    #[error("malformed packet: empty frame")]
    EmptyFrame,

    /// An order side byte outside {B, S, T, E}.
    #[error("invalid side: {0}")]
    InvalidSide(char),

    /// A padded ASCII sequence-number field contained a non-digit.
    #[error("invalid sequence number digits")]
    InvalidSequenceDigits,

    /// A padded alpha field contained non-ASCII bytes.
    #[error("invalid text in alpha field")]
    InvalidAlpha,
}

/// Errors that occur while encoding OUCH messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A value does not fit its fixed-width alpha field.
    #[error("value too long for field {field}: {length} exceeds max {max_length}")]
    FieldTooLong {
        /// Name of the field.
        field: &'static str,
        /// Actual length of the value.
        length: usize,
        /// Width of the wire field.
        max_length: usize,
    },
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Logon was rejected by the counterparty.
    #[error("logon rejected: {reason}")]
    LogonRejected {
        /// One-byte rejection reason from the Login Rejected packet.
        reason: char,
    },

    /// No bytes received within the reconnect interval.
    #[error("heartbeat timeout after {elapsed_ms} milliseconds")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since the last received byte.
        elapsed_ms: u64,
    },

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),
}

/// Errors while reading the INI-style settings sections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A required key is missing from a session section.
    #[error("{key} not given in #{section} session")]
    MissingKey {
        /// Name of the missing key.
        key: &'static str,
        /// One-based index of the offending session section.
        section: usize,
    },

    /// A key has a value that cannot be used.
    #[error("invalid {key} '{value}' in #{section} session")]
    InvalidValue {
        /// Name of the key.
        key: &'static str,
        /// The rejected value.
        value: String,
        /// One-based index of the offending session section.
        section: usize,
    },

    /// Two sessions resolve to the same sender/target identity.
    #[error("duplicate session {id}")]
    DuplicateSession {
        /// The colliding session identifier.
        id: String,
    },

    /// The settings file could not be read.
    #[error("settings file error: {0}")]
    Io(String),
}

/// Errors in message store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A store file could not be opened.
    #[error("could not open {name} file: {path}")]
    Open {
        /// Which of the four files failed.
        name: &'static str,
        /// Path that failed to open.
        path: String,
    },

    /// A store file could not be written or flushed.
    #[error("unable to write to file {path}: {reason}")]
    Write {
        /// Path that failed.
        path: String,
        /// Underlying reason.
        reason: String,
    },

    /// Recorded index or counter data did not parse.
    #[error("store corrupted: {reason}")]
    Corrupted {
        /// Description of the corruption.
        reason: String,
    },

    /// I/O error in the persistent store.
    #[error("store i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Errors in a session log sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// A log file could not be opened.
    #[error("could not open {name} file: {path}")]
    Open {
        /// Which log stream failed.
        name: &'static str,
        /// Path that failed to open.
        path: String,
    },

    /// I/O error while writing a log line.
    #[error("log i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnknownMessageType('?');
        assert_eq!(err.to_string(), "unknown OUCH message type ?");
    }

    #[test]
    fn test_wrong_body_length_display() {
        let err = DecodeError::WrongBodyLength {
            tag: 'U',
            expected: 80,
            actual: 47,
        };
        assert_eq!(
            err.to_string(),
            "wrong body length for type U: expected 80, found 47"
        );
    }

    #[test]
    fn test_ouch_error_from_decode() {
        let decode_err = DecodeError::Incomplete;
        let err: OuchError = decode_err.into();
        assert!(matches!(err, OuchError::Decode(DecodeError::Incomplete)));
    }

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::MissingKey {
            key: "Username",
            section: 2,
        };
        assert_eq!(err.to_string(), "Username not given in #2 session");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Open {
            name: "body",
            path: "/tmp/x.body".into(),
        };
        assert_eq!(err.to_string(), "could not open body file: /tmp/x.body");
    }
}
