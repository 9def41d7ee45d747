/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session configuration.
//!
//! A [`SessionConfig`] is built from one merged settings [`Section`] and
//! validated eagerly so startup fails fast on a bad file.

use crate::settings::Section;
use ironouch_core::error::SettingsError;
use ironouch_core::types::{CompId, SessionId};
use std::time::Duration;

/// Default reconnect/heartbeat-timeout interval in seconds.
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 15;

/// Which end of the TCP connection this session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    /// Active dialer (`initiator` or `client` in the settings).
    Initiator,
    /// Passive listener (`acceptor` or `server` in the settings).
    Acceptor,
}

/// Configuration for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Role of this endpoint.
    pub connection_type: ConnectionType,
    /// Logon username, at most 6 bytes on the wire.
    pub username: String,
    /// Logon password, at most 10 bytes on the wire.
    pub password: String,
    /// OUCH firm field for outgoing orders.
    pub firm: String,
    /// Sender CompId.
    pub sender_comp_id: CompId,
    /// Target CompId.
    pub target_comp_id: CompId,
    /// Dial host, initiators only.
    pub connect_host: Option<String>,
    /// Dial port, initiators only.
    pub connect_port: Option<u16>,
    /// Listen port, acceptors only.
    pub accept_port: Option<u16>,
    /// SO_RCVBUF override.
    pub receive_buffer_size: Option<u32>,
    /// SO_SNDBUF override.
    pub send_buffer_size: Option<u32>,
    /// Reconnect delay and heartbeat-silence timeout.
    pub reconnect_interval: Duration,
    /// Root directory pattern for the file store.
    pub file_store_path: Option<String>,
    /// Root directory pattern for the file log.
    pub file_log_path: Option<String>,
}

impl SessionConfig {
    /// Builds and validates a configuration from a merged settings section.
    ///
    /// `section_index` is one-based and only used in diagnostics.
    ///
    /// # Errors
    /// Returns a `SettingsError` naming the missing or invalid key, the way
    /// startup diagnostics report it.
    pub fn from_section(section: &Section, section_index: usize) -> Result<Self, SettingsError> {
        let username = section
            .get("Username")
            .ok_or(SettingsError::MissingKey {
                key: "Username",
                section: section_index,
            })?
            .to_string();
        let password = section
            .get("Password")
            .ok_or(SettingsError::MissingKey {
                key: "Password",
                section: section_index,
            })?
            .to_string();

        let connection_type = match section.get("ConnectionType") {
            Some("initiator") | Some("client") => ConnectionType::Initiator,
            Some("acceptor") | Some("server") => ConnectionType::Acceptor,
            Some(other) => {
                return Err(SettingsError::InvalidValue {
                    key: "ConnectionType",
                    value: other.to_string(),
                    section: section_index,
                })
            }
            None => {
                return Err(SettingsError::MissingKey {
                    key: "ConnectionType",
                    section: section_index,
                })
            }
        };
        let is_initiator = connection_type == ConnectionType::Initiator;

        let mut sender = section.get("SenderCompId").unwrap_or("").to_string();
        let mut target = section.get("TargetCompId").unwrap_or("").to_string();
        if sender.is_empty() && is_initiator {
            sender = username.clone();
        }
        if target.is_empty() && !is_initiator {
            target = username.clone();
            if sender.is_empty() {
                sender = "OUCH".to_string();
            }
        }
        let sender_comp_id = CompId::new(&sender).ok_or(SettingsError::InvalidValue {
            key: "SenderCompId",
            value: sender.clone(),
            section: section_index,
        })?;
        let target_comp_id = CompId::new(&target).ok_or(SettingsError::InvalidValue {
            key: "TargetCompId",
            value: target.clone(),
            section: section_index,
        })?;

        let connect_host = section.get("SocketConnectHost").map(str::to_string);
        if is_initiator && connect_host.is_none() {
            return Err(SettingsError::MissingKey {
                key: "SocketConnectHost",
                section: section_index,
            });
        }

        let port_key: &'static str = if is_initiator {
            "SocketConnectPort"
        } else {
            "SocketAcceptPort"
        };
        let port_value = section.get(port_key).ok_or(SettingsError::MissingKey {
            key: port_key,
            section: section_index,
        })?;
        let port: u16 = match port_value.parse() {
            Ok(p) if p > 0 => p,
            _ => {
                return Err(SettingsError::InvalidValue {
                    key: port_key,
                    value: port_value.to_string(),
                    section: section_index,
                })
            }
        };

        let reconnect_secs = match section.get_int("ReconnectInterval", 0) {
            n if n > 0 => n as u64,
            _ => DEFAULT_RECONNECT_INTERVAL_SECS,
        };

        Ok(Self {
            connection_type,
            username,
            password,
            firm: section.get("Firm").unwrap_or("").to_string(),
            sender_comp_id,
            target_comp_id,
            connect_host,
            connect_port: is_initiator.then_some(port),
            accept_port: (!is_initiator).then_some(port),
            receive_buffer_size: positive_u32(section, "ReceiveBufferSize"),
            send_buffer_size: positive_u32(section, "SendBufferSize"),
            reconnect_interval: Duration::from_secs(reconnect_secs),
            file_store_path: section.get("FileStorePath").map(str::to_string),
            file_log_path: section.get("FileLogPath").map(str::to_string),
        })
    }

    /// Returns the session identity `{sender, target}`.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        SessionId::new(self.sender_comp_id.clone(), self.target_comp_id.clone())
    }

    /// Returns true for the dialing side.
    #[must_use]
    pub const fn is_initiator(&self) -> bool {
        matches!(self.connection_type, ConnectionType::Initiator)
    }
}

fn positive_u32(section: &Section, key: &str) -> Option<u32> {
    match section.get_int(key, 0) {
        n if n > 0 => u32::try_from(n).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::read_settings;
    use std::io::Cursor;

    fn section(text: &str) -> Section {
        read_settings(Cursor::new(text)).unwrap().remove(0)
    }

    #[test]
    fn test_initiator_defaults() {
        let cfg = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=zhb\nPassword=xxx\nConnectionType=initiator\n\
                 SocketConnectHost=localhost\nSocketConnectPort=9123\n",
            ),
            1,
        )
        .unwrap();
        assert!(cfg.is_initiator());
        assert_eq!(cfg.sender_comp_id.as_str(), "zhb");
        assert!(cfg.target_comp_id.is_empty());
        assert_eq!(cfg.connect_port, Some(9123));
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_acceptor_defaults() {
        let cfg = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=zhb\nPassword=xxx\nConnectionType=acceptor\n\
                 SocketAcceptPort=9123\n",
            ),
            1,
        )
        .unwrap();
        assert!(!cfg.is_initiator());
        assert_eq!(cfg.sender_comp_id.as_str(), "OUCH");
        assert_eq!(cfg.target_comp_id.as_str(), "zhb");
        assert_eq!(cfg.session_id().to_string(), "OUCH->zhb");
    }

    #[test]
    fn test_client_and_server_aliases() {
        let cfg = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=u\nPassword=p\nConnectionType=client\n\
                 SocketConnectHost=h\nSocketConnectPort=1\n",
            ),
            1,
        )
        .unwrap();
        assert!(cfg.is_initiator());

        let cfg = SessionConfig::from_section(
            &section("[SESSION]\nUsername=u\nPassword=p\nConnectionType=server\nSocketAcceptPort=1\n"),
            1,
        )
        .unwrap();
        assert!(!cfg.is_initiator());
    }

    #[test]
    fn test_missing_username() {
        let err = SessionConfig::from_section(
            &section("[SESSION]\nPassword=p\nConnectionType=acceptor\nSocketAcceptPort=1\n"),
            3,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Username not given in #3 session");
    }

    #[test]
    fn test_bad_connection_type() {
        let err = SessionConfig::from_section(
            &section("[SESSION]\nUsername=u\nPassword=p\nConnectionType=peer\n"),
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                key: "ConnectionType",
                ..
            }
        ));
    }

    #[test]
    fn test_initiator_requires_host_and_port() {
        let err = SessionConfig::from_section(
            &section("[SESSION]\nUsername=u\nPassword=p\nConnectionType=initiator\n"),
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::MissingKey {
                key: "SocketConnectHost",
                ..
            }
        ));

        let err = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=u\nPassword=p\nConnectionType=initiator\nSocketConnectHost=h\n",
            ),
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::MissingKey {
                key: "SocketConnectPort",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_port() {
        let err = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=u\nPassword=p\nConnectionType=acceptor\nSocketAcceptPort=zero\n",
            ),
            2,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid SocketAcceptPort 'zero' in #2 session"
        );
    }

    #[test]
    fn test_reconnect_interval_override() {
        let cfg = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=u\nPassword=p\nConnectionType=acceptor\nSocketAcceptPort=1\n\
                 ReconnectInterval=3\n",
            ),
            1,
        )
        .unwrap();
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_buffer_sizes() {
        let cfg = SessionConfig::from_section(
            &section(
                "[SESSION]\nUsername=u\nPassword=p\nConnectionType=acceptor\nSocketAcceptPort=1\n\
                 ReceiveBufferSize=65536\nSendBufferSize=32768\n",
            ),
            1,
        )
        .unwrap();
        assert_eq!(cfg.receive_buffer_size, Some(65_536));
        assert_eq!(cfg.send_buffer_size, Some(32_768));
    }
}
