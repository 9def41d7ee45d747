/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The per-connection driver loop.
//!
//! One task per live socket: it reads and deframes, dispatches packets,
//! drains the outbound pipe on wake, and runs the one-second timer that
//! sends heartbeats and enforces the receive-silence timeout. The task is
//! the sole mutator of the session's receive buffer and state, so the
//! inbound path is lock-free.

use crate::application::Application;
use crate::session::Session;
use ironouch_codec::OuchMessage;
use ironouch_core::error::DecodeError;
use ironouch_session::state::SessionState;
use ironouch_transport::codec::SoupCodec;
use ironouch_transport::packet::{LoginAccepted, PacketKind, SoupPacket};
use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

/// Receive buffer reservation per read.
const READ_CHUNK: usize = 64 * 1024;

/// Why the driver returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitReason {
    /// The connection ended (peer close, error, timeout, protocol error).
    Disconnected,
    /// Endpoint shutdown was requested.
    Shutdown,
}

enum Flow {
    Continue,
    Close,
}

/// Runs one bound connection to completion. The session must already be
/// attached; on return it is detached, its pipe reset and its state
/// `Terminated`, with `on_logout` fired.
pub(crate) async fn drive<S>(
    session: &Arc<Session>,
    app: &Arc<dyn Application>,
    stream: S,
    shutdown: &mut broadcast::Receiver<()>,
) -> ExitReason
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut codec = SoupCodec::new();
    let mut rx = BytesMut::with_capacity(READ_CHUNK);
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let reason = 'conn: loop {
        tokio::select! {
            read = reader.read_buf(&mut rx) => match read {
                Ok(0) => {
                    session.event("Connection reset by peer");
                    break 'conn ExitReason::Disconnected;
                }
                Ok(_) => {
                    session.note_received();
                    loop {
                        match codec.decode(&mut rx) {
                            Ok(Some(packet)) => {
                                match handle_packet(session, app, &packet).await {
                                    Flow::Continue => {}
                                    Flow::Close => break 'conn ExitReason::Disconnected,
                                }
                            }
                            Ok(None) => break,
                            Err(err) => {
                                session.event(&err.to_string());
                                break 'conn ExitReason::Disconnected;
                            }
                        }
                    }
                }
                Err(err) => {
                    session.event(&format!("Connection reset by peer: {err}"));
                    break 'conn ExitReason::Disconnected;
                }
            },
            _ = session.outbound_wake().notified() => {
                if let Err(err) = drain_outbound(session, &mut writer).await {
                    session.event(&format!("Connection reset by peer: {err}"));
                    break 'conn ExitReason::Disconnected;
                }
            }
            _ = tick.tick() => {
                if session.heartbeat_timed_out() {
                    session.event("Timed out waiting for heartbeat");
                    break 'conn ExitReason::Disconnected;
                }
                if session.should_send_heartbeat() {
                    session.heartbeat();
                }
            }
            _ = shutdown.recv() => break 'conn ExitReason::Shutdown,
        }
    };

    // best effort: flush what was queued before the close decision
    let _ = tokio::time::timeout(
        Duration::from_millis(100),
        drain_outbound(session, &mut writer),
    )
    .await;

    session.event("Disconnecting");
    app.on_logout(session).await;
    session.detach();
    reason
}

async fn drain_outbound<W>(session: &Arc<Session>, writer: &mut W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = session.outbound_data() {
        let n = writer.write(&chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::WriteZero.into());
        }
        session.outbound_pop(n);
    }
    writer.flush().await
}

async fn handle_packet(
    session: &Arc<Session>,
    app: &Arc<dyn Application>,
    packet: &SoupPacket,
) -> Flow {
    let Some(kind) = packet.packet_kind() else {
        trace!(session = %session.id(), kind = %(packet.kind as char), "skipping unknown packet kind");
        return Flow::Continue;
    };
    match kind {
        PacketKind::SequencedData => deliver(session, app, packet, true).await,
        PacketKind::UnsequencedData => deliver(session, app, packet, false).await,
        PacketKind::LoginAccepted => login_accepted(session, app, packet).await,
        PacketKind::LoginRejected => {
            let reason = packet.payload.first().copied().unwrap_or(b' ');
            session.event(&format!("Login rejected: {}", reason as char));
            Flow::Close
        }
        PacketKind::LoginRequest => login_request(session, packet),
        PacketKind::ServerHeartbeat | PacketKind::ClientHeartbeat => Flow::Continue,
        PacketKind::EndOfSession => {
            session.event("End of session by peer");
            Flow::Close
        }
        PacketKind::LogoutRequest => {
            session.event("Logout request by peer");
            session.push_packet(PacketKind::EndOfSession, &[]);
            Flow::Close
        }
    }
}

/// Decodes, logs and delivers one data packet. Sequenced packets advance
/// the target counter unless the variant is flagged non-counting.
async fn deliver(
    session: &Arc<Session>,
    app: &Arc<dyn Application>,
    packet: &SoupPacket,
    sequenced: bool,
) -> Flow {
    let message = match OuchMessage::decode(&packet.payload) {
        Ok(message) if sequenced && message.is_outbound() => {
            // an order-entry tag inside server-sequenced data is not a
            // variant this side can accept
            session.event(&format!(
                "unknown OUCH message type {}",
                message.type_tag() as char
            ));
            return Flow::Close;
        }
        Ok(message) => message,
        Err(DecodeError::UnknownMessageType(tag)) => {
            session.event(&format!("unknown OUCH message type {tag}"));
            return Flow::Close;
        }
        Err(err) => {
            session.event(&err.to_string());
            return Flow::Close;
        }
    };

    let counts = sequenced && message.advances_target_seq();
    session.log().on_incoming(&message);
    app.from_app(&message, session).await;
    if counts {
        if let Err(err) = session.incr_target_seq() {
            session.event(&err.to_string());
            return Flow::Close;
        }
    }
    Flow::Continue
}

async fn login_accepted(
    session: &Arc<Session>,
    app: &Arc<dyn Application>,
    packet: &SoupPacket,
) -> Flow {
    session.event(&format!(
        "Login accepted: {}",
        String::from_utf8_lossy(&packet.payload)
    ));
    let accepted = match LoginAccepted::decode(&packet.payload) {
        Ok(accepted) => accepted,
        Err(err) => {
            session.event(&err.to_string());
            return Flow::Close;
        }
    };
    if let Err(err) = session.adopt_target_seq(accepted.next_seq) {
        session.event(&err.to_string());
        return Flow::Close;
    }
    session.set_state(SessionState::LogonReceived);
    app.on_logon(session).await;
    Flow::Continue
}

/// Acceptor side of a logon. Credentials are not validated; the reply
/// carries the expected sender sequence left-padded into its ASCII field.
fn login_request(session: &Arc<Session>, packet: &SoupPacket) -> Flow {
    if session.is_initiator() {
        debug!(session = %session.id(), "ignoring login request on initiator");
        return Flow::Continue;
    }
    session.event(&format!(
        "Received logon request: {}",
        String::from_utf8_lossy(&packet.payload)
    ));
    let reply = LoginAccepted::new(session.expected_sender_seq());
    session.push_packet(PacketKind::LoginAccepted, &reply.encode());
    Flow::Continue
}
