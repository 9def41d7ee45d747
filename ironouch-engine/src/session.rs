/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! The per-session protocol engine.
//!
//! A [`Session`] is created before any connection, lives across reconnect
//! attempts, and is destroyed only at endpoint shutdown. Its receive path,
//! state and socket belong to one driver task at a time; [`Session::send`]
//! may be called from any task and synchronizes through the send lock and
//! the outbound pipe.

use ironouch_codec::OuchMessage;
use ironouch_core::error::{OuchError, StoreError};
use ironouch_core::types::SessionId;
use ironouch_log::Log;
use ironouch_session::config::SessionConfig;
use ironouch_session::heartbeat::HeartbeatClock;
use ironouch_session::state::SessionState;
use ironouch_store::MessageStore;
use ironouch_transport::packet::{frame_packet, LoginRequest, PacketKind};
use ironouch_transport::pipe::BytePipe;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// One authenticated, ordered, heartbeat-monitored session.
pub struct Session {
    config: SessionConfig,
    id: SessionId,
    store: Arc<dyn MessageStore>,
    log: Arc<dyn Log>,
    state: Mutex<SessionState>,
    clock: Mutex<HeartbeatClock>,
    outbound: BytePipe,
    outbound_wake: Notify,
    connected: AtomicBool,
    send_lock: tokio::sync::Mutex<()>,
}

impl Session {
    /// Creates a session wired to its store and log.
    #[must_use]
    pub fn new(config: SessionConfig, store: Arc<dyn MessageStore>, log: Arc<dyn Log>) -> Arc<Self> {
        let id = config.session_id();
        let reconnect = config.reconnect_interval;
        Arc::new(Self {
            config,
            id,
            store,
            log,
            state: Mutex::new(SessionState::None),
            clock: Mutex::new(HeartbeatClock::new(reconnect)),
            outbound: BytePipe::new(),
            outbound_wake: Notify::new(),
            connected: AtomicBool::new(false),
            send_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Returns the session identity.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the message store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Returns the log sink.
    #[must_use]
    pub fn log(&self) -> &Arc<dyn Log> {
        &self.log
    }

    /// Returns true for the dialing side.
    #[must_use]
    pub fn is_initiator(&self) -> bool {
        self.config.is_initiator()
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Returns true once a logon has been accepted on the live connection.
    #[must_use]
    pub fn is_logged_on(&self) -> bool {
        self.state().is_logged_on()
    }

    /// Returns true while a socket is bound to this session.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// The sequence number the peer should send next.
    #[must_use]
    pub fn expected_target_seq(&self) -> u64 {
        self.store.next_target_seq()
    }

    /// The sequence number this side will store next.
    #[must_use]
    pub fn expected_sender_seq(&self) -> u64 {
        self.store.next_sender_seq()
    }

    /// Writes one free-text line to the session event log.
    pub fn event(&self, text: &str) {
        self.log.on_event(text);
    }

    /// Sends one application message.
    ///
    /// The message is converted to wire order, framed as unsequenced data
    /// (initiator) or sequenced data (acceptor), queued for transmission,
    /// persisted at the current sender sequence, and logged. With no
    /// socket bound the call is a successful no-op apart from the log
    /// entry; callers never observe transport state.
    ///
    /// # Errors
    /// Returns `OuchError::Store` only when the durable store fails, which
    /// is fatal for the session.
    pub async fn send<M>(&self, message: M) -> Result<(), OuchError>
    where
        M: Into<OuchMessage> + Send,
    {
        let message = message.into();
        {
            let _guard = self.send_lock.lock().await;
            if self.is_connected() {
                let body = message.to_bytes();
                self.push_packet(self.data_kind(), &body);
                self.store.set(&body).await?;
                self.store.incr_next_sender_seq()?;
            }
        }
        self.log.on_outgoing(&message);
        Ok(())
    }

    /// Requests an orderly logout. The peer confirms by closing.
    pub fn logout(&self) {
        self.event("Initiated logout request");
        self.push_packet(PacketKind::LogoutRequest, &[]);
        self.set_state(SessionState::LogoffSent);
    }

    /// Quiesces the session's store and log.
    pub fn stop(&self, wait: bool) {
        self.log.stop(wait);
        self.store.stop(wait);
    }

    const fn data_kind(&self) -> PacketKind {
        if self.config.is_initiator() {
            PacketKind::UnsequencedData
        } else {
            PacketKind::SequencedData
        }
    }

    /// Frames and queues one packet, stamps last-sent and wakes the drain
    /// arm. A no-op without a bound socket.
    pub(crate) fn push_packet(&self, kind: PacketKind, body: &[u8]) {
        if !self.is_connected() {
            return;
        }
        let mut framed = bytes::BytesMut::with_capacity(body.len() + 3);
        frame_packet(kind, body, &mut framed);
        self.outbound.push(&framed);
        self.clock.lock().note_sent();
        self.outbound_wake.notify_one();
    }

    /// Sends the login request and arms the logon state.
    ///
    /// # Errors
    /// Returns `OuchError::Encode` when the credentials cannot be framed.
    pub(crate) fn logon(&self) -> Result<(), OuchError> {
        let username = truncated(&self.config.username, 6);
        let password = truncated(&self.config.password, 10);
        let request = LoginRequest::new(username, password, self.expected_target_seq())
            .map_err(OuchError::Encode)?;
        let body = request.encode();
        self.event(&format!(
            "Initiated logon request: {}",
            String::from_utf8_lossy(&body)
        ));
        self.push_packet(PacketKind::LoginRequest, &body);
        self.set_state(SessionState::LogonSent);
        self.clock.lock().reset();
        Ok(())
    }

    /// Sends the role-appropriate heartbeat.
    pub(crate) fn heartbeat(&self) {
        let kind = if self.config.is_initiator() {
            PacketKind::ClientHeartbeat
        } else {
            PacketKind::ServerHeartbeat
        };
        self.push_packet(kind, &[]);
    }

    /// Binds this session to a fresh socket; returns false when one is
    /// already bound (the acceptor then tries the next candidate). The
    /// heartbeat clock rewinds so silence is measured from the bind.
    pub(crate) fn try_attach(&self) -> bool {
        let attached = self
            .connected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if attached {
            self.clock.lock().reset();
        }
        attached
    }

    /// Unbinds the socket after a close: the pipe and state reset, the
    /// receive buffer dies with the driver task.
    pub(crate) fn detach(&self) {
        self.connected.store(false, Ordering::Release);
        self.outbound.reset();
        self.set_state(SessionState::Terminated);
    }

    pub(crate) fn note_received(&self) {
        self.clock.lock().note_received();
    }

    pub(crate) fn heartbeat_timed_out(&self) -> bool {
        self.clock.lock().is_timed_out()
    }

    pub(crate) fn should_send_heartbeat(&self) -> bool {
        self.clock.lock().should_send_heartbeat()
    }

    pub(crate) fn outbound_wake(&self) -> &Notify {
        &self.outbound_wake
    }

    pub(crate) fn outbound_data(&self) -> Option<bytes::Bytes> {
        self.outbound.data()
    }

    pub(crate) fn outbound_pop(&self, n: usize) {
        self.outbound.pop(n);
    }

    /// Advances the target counter for one counted sequenced message.
    pub(crate) fn incr_target_seq(&self) -> Result<(), StoreError> {
        self.store.incr_next_target_seq()
    }

    /// Adopts the peer-provided resumption point when it differs from the
    /// local expectation.
    pub(crate) fn adopt_target_seq(&self, next_seq: u64) -> Result<(), StoreError> {
        if next_seq != self.expected_target_seq() {
            self.store.set_next_target_seq(next_seq)?;
        }
        Ok(())
    }
}

fn truncated(value: &str, max: usize) -> &str {
    value.get(..max.min(value.len())).unwrap_or(value)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ironouch_codec::{CancelMsg, OrderMsg};
    use ironouch_core::types::{CompId, Price, Side};
    use ironouch_log::NullLog;
    use ironouch_session::config::ConnectionType;
    use ironouch_store::MemoryStore;
    use std::time::Duration;

    pub(crate) fn test_config(initiator: bool) -> SessionConfig {
        SessionConfig {
            connection_type: if initiator {
                ConnectionType::Initiator
            } else {
                ConnectionType::Acceptor
            },
            username: "zhb".into(),
            password: "xxx".into(),
            firm: String::new(),
            sender_comp_id: CompId::new("zhb").unwrap(),
            target_comp_id: CompId::new("OUCH").unwrap(),
            connect_host: initiator.then(|| "127.0.0.1".to_string()),
            connect_port: initiator.then_some(1),
            accept_port: (!initiator).then_some(1),
            receive_buffer_size: None,
            send_buffer_size: None,
            reconnect_interval: Duration::from_secs(15),
            file_store_path: None,
            file_log_path: None,
        }
    }

    fn session(initiator: bool) -> Arc<Session> {
        Session::new(
            test_config(initiator),
            Arc::new(MemoryStore::new()),
            Arc::new(NullLog),
        )
    }

    #[tokio::test]
    async fn test_send_without_socket_is_noop() {
        let s = session(true);
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        s.send(order).await.unwrap();
        assert!(s.outbound_data().is_none());
        assert_eq!(s.expected_sender_seq(), 1);
    }

    #[tokio::test]
    async fn test_send_frames_stores_and_counts() {
        let s = session(true);
        assert!(s.try_attach());
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        s.send(order).await.unwrap();

        let framed = s.outbound_data().unwrap();
        assert_eq!(framed.len(), 3 + 48);
        assert_eq!(u16::from_be_bytes([framed[0], framed[1]]), 49);
        assert_eq!(framed[2], b'U'); // initiator sends unsequenced data
        assert_eq!(framed[3], b'O');
        assert_eq!(s.expected_sender_seq(), 2);
        assert_eq!(s.store().get_range(1, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_acceptor_sends_sequenced_data() {
        let s = session(false);
        assert!(s.try_attach());
        s.send(CancelMsg::new("1").unwrap()).await.unwrap();
        let framed = s.outbound_data().unwrap();
        assert_eq!(framed[2], b'S');
    }

    #[tokio::test]
    async fn test_logon_packet_layout() {
        let s = session(true);
        assert!(s.try_attach());
        s.logon().unwrap();
        assert_eq!(s.state(), SessionState::LogonSent);

        let framed = s.outbound_data().unwrap();
        assert_eq!(framed[2], b'L');
        assert_eq!(&framed[3..9], b"zhb   ");
        // requested sequence number, left-padded into 20 bytes
        assert_eq!(&framed[29..49], b"                   1");
    }

    #[tokio::test]
    async fn test_detach_resets_pipe_and_state() {
        let s = session(true);
        assert!(s.try_attach());
        s.send(CancelMsg::new("1").unwrap()).await.unwrap();
        s.detach();
        assert!(!s.is_connected());
        assert!(s.outbound_data().is_none());
        assert_eq!(s.state(), SessionState::Terminated);
        // a second attach succeeds after detach
        assert!(s.try_attach());
    }

    #[tokio::test]
    async fn test_try_attach_is_exclusive() {
        let s = session(false);
        assert!(s.try_attach());
        assert!(!s.try_attach());
    }

    #[tokio::test]
    async fn test_adopt_target_seq_only_when_different() {
        let s = session(true);
        s.adopt_target_seq(1).unwrap();
        assert_eq!(s.expected_target_seq(), 1);
        s.adopt_target_seq(7).unwrap();
        assert_eq!(s.expected_target_seq(), 7);
    }
}
