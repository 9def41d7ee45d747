/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Endpoint manager.
//!
//! Owns every session, the initiator and acceptor tasks, and the shutdown
//! broadcast. `connect` starts the client side, `listen` the server side;
//! both may run in one process. Acceptor sessions sharing a port share one
//! listening socket through a per-port acceptor actor.

use crate::acceptor::run_acceptor;
use crate::application::Application;
use crate::initiator::run_initiator;
use crate::session::Session;
use ironouch_core::error::{OuchError, Result, SessionError};
use ironouch_core::types::SessionId;
use ironouch_log::Log;
use ironouch_session::config::SessionConfig;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::info;

/// The endpoint: all sessions of one settings file plus their tasks.
pub struct Engine {
    sessions: Vec<Arc<Session>>,
    app: Arc<dyn Application>,
    endpoint_log: Arc<dyn Log>,
    shutdown: broadcast::Sender<()>,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
    bound_addrs: parking_lot::Mutex<Vec<SocketAddr>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub(crate) fn new(
        sessions: Vec<Arc<Session>>,
        app: Arc<dyn Application>,
        endpoint_log: Arc<dyn Log>,
    ) -> Self {
        let (shutdown, _) = broadcast::channel(4);
        Self {
            sessions,
            app,
            endpoint_log,
            shutdown,
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
            bound_addrs: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Starts every initiator session: one dial loop per session.
    ///
    /// # Errors
    /// Returns `OuchError::Session` when the settings define no clients.
    pub async fn connect(&self) -> Result<()> {
        let initiators: Vec<_> = self
            .sessions
            .iter()
            .filter(|s| s.is_initiator())
            .cloned()
            .collect();
        if initiators.is_empty() {
            return Err(OuchError::Session(SessionError::Configuration(
                "no OUCH clients found in the settings".into(),
            )));
        }
        let mut tasks = self.tasks.lock().await;
        for session in initiators {
            self.app.on_create(&session).await;
            session.event("Created session");
            info!(session = %session.id(), "starting initiator");
            tasks.spawn(run_initiator(
                session,
                Arc::clone(&self.app),
                self.shutdown.clone(),
            ));
        }
        Ok(())
    }

    /// Starts every acceptor session: one listener and acceptor actor per
    /// distinct `SocketAcceptPort`.
    ///
    /// # Errors
    /// Returns `OuchError::Session` when the settings define no servers
    /// and `OuchError::Io` when a port cannot be bound (fatal at startup).
    pub async fn listen(&self) -> Result<()> {
        let mut by_port: BTreeMap<u16, Vec<Arc<Session>>> = BTreeMap::new();
        for session in self.sessions.iter().filter(|s| !s.is_initiator()) {
            if let Some(port) = session.config().accept_port {
                by_port.entry(port).or_default().push(Arc::clone(session));
            }
        }
        if by_port.is_empty() {
            return Err(OuchError::Session(SessionError::Configuration(
                "no OUCH servers found in the settings".into(),
            )));
        }

        let mut tasks = self.tasks.lock().await;
        for (port, candidates) in by_port {
            for session in &candidates {
                self.app.on_create(session).await;
                session.event("Created session");
                session.event(&format!("Listening on port {port}"));
            }
            let listener = bind_listener(port, candidates[0].config())?;
            let local = listener.local_addr()?;
            self.bound_addrs.lock().push(local);
            info!(%local, sessions = candidates.len(), "starting acceptor");
            tasks.spawn(run_acceptor(
                listener,
                port,
                candidates,
                Arc::clone(&self.app),
                self.shutdown.clone(),
                Arc::clone(&self.endpoint_log),
            ));
        }
        Ok(())
    }

    /// Blocks until every task has finished (after [`Engine::stop`]).
    pub async fn wait(&self) {
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
    }

    /// Stops every task and session. With `wait`, store and log queues
    /// drain before returning.
    pub async fn stop(&self, wait: bool) {
        let _ = self.shutdown.send(());
        self.wait().await;
        for session in &self.sessions {
            session.stop(wait);
        }
    }

    /// Returns every session of this endpoint.
    #[must_use]
    pub fn sessions(&self) -> &[Arc<Session>] {
        &self.sessions
    }

    /// Finds a session by identity.
    #[must_use]
    pub fn session(&self, id: &SessionId) -> Option<&Arc<Session>> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    /// The first configured session, the convenience target for
    /// single-session applications.
    #[must_use]
    pub fn default_session(&self) -> Option<&Arc<Session>> {
        self.sessions.first()
    }

    /// Returns true when the default session is logged on.
    #[must_use]
    pub fn is_logged_on(&self) -> bool {
        self.default_session().is_some_and(|s| s.is_logged_on())
    }

    /// Addresses actually bound by [`Engine::listen`], in port order.
    #[must_use]
    pub fn bound_addrs(&self) -> Vec<SocketAddr> {
        self.bound_addrs.lock().clone()
    }
}

fn bind_listener(port: u16, config: &SessionConfig) -> Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    if let Some(size) = config.receive_buffer_size {
        socket.set_recv_buffer_size(size)?;
    }
    if let Some(size) = config.send_buffer_size {
        socket.set_send_buffer_size(size)?;
    }
    socket.bind(SocketAddr::from(([0, 0, 0, 0], port)))?;
    Ok(socket.listen(1024)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EngineBuilder;
    use crate::session::tests::test_config;
    use async_trait::async_trait;
    use ironouch_codec::{
        AcceptedMsg, CanceledMsg, OrderMsg, OuchMessage, RejectedMsg, SystemMsg,
    };
    use ironouch_core::error::LogError;
    use ironouch_core::types::{Price, Side};
    use ironouch_log::{LogFactory, NullLogFactory};
    use ironouch_session::state::SessionState;
    use ironouch_store::MemoryStoreFactory;
    use ironouch_transport::packet::{frame_packet, LoginAccepted, PacketKind};
    use bytes::BytesMut;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    #[derive(Debug)]
    enum AppEvent {
        Logon,
        Logout,
        Message(OuchMessage),
    }

    struct ChannelApp {
        tx: mpsc::UnboundedSender<AppEvent>,
    }

    #[async_trait]
    impl Application for ChannelApp {
        async fn on_logon(&self, _session: &Arc<Session>) {
            let _ = self.tx.send(AppEvent::Logon);
        }

        async fn on_logout(&self, _session: &Arc<Session>) {
            let _ = self.tx.send(AppEvent::Logout);
        }

        async fn from_app(&self, message: &OuchMessage, _session: &Arc<Session>) {
            let _ = self.tx.send(AppEvent::Message(message.clone()));
        }
    }

    /// Server application acknowledging orders and cancels, the wiring of
    /// the original test harness.
    struct EchoServerApp;

    #[async_trait]
    impl Application for EchoServerApp {
        async fn from_app(&self, message: &OuchMessage, session: &Arc<Session>) {
            match message {
                OuchMessage::Order(order) => {
                    let _ = session.send(AcceptedMsg::from_order(order)).await;
                }
                OuchMessage::Cancel(cancel) => {
                    let _ = session.send(CanceledMsg::from_cancel(cancel)).await;
                }
                _ => {}
            }
        }
    }

    struct VecLog {
        events: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    impl Log for VecLog {
        fn on_incoming(&self, _message: &OuchMessage) {}

        fn on_outgoing(&self, _message: &OuchMessage) {}

        fn on_event(&self, text: &str) {
            self.events.lock().push(text.to_string());
        }
    }

    struct VecLogFactory {
        events: Arc<parking_lot::Mutex<Vec<String>>>,
    }

    impl LogFactory for VecLogFactory {
        fn create(&self, _config: &SessionConfig) -> std::result::Result<Arc<dyn Log>, LogError> {
            Ok(Arc::new(VecLog {
                events: Arc::clone(&self.events),
            }))
        }
    }

    fn client_config(port: u16, reconnect: Duration) -> SessionConfig {
        let mut config = test_config(true);
        config.connect_port = Some(port);
        config.reconnect_interval = reconnect;
        config
    }

    fn server_engine() -> Engine {
        let mut config = test_config(false);
        config.accept_port = Some(0);
        EngineBuilder::new()
            .with_application(EchoServerApp)
            .with_store_factory(MemoryStoreFactory)
            .with_log_factory(NullLogFactory)
            .add_session(config)
            .build()
            .unwrap()
    }

    fn client_engine(
        port: u16,
        reconnect: Duration,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Engine {
        EngineBuilder::new()
            .with_application(ChannelApp { tx })
            .with_store_factory(MemoryStoreFactory)
            .with_log_factory(NullLogFactory)
            .add_session(client_config(port, reconnect))
            .build()
            .unwrap()
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> AppEvent {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_initiator_logon_state_transitions() {
        let server = server_engine();
        server.listen().await.unwrap();
        let port = server.bound_addrs()[0].port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(15), tx);
        let session = Arc::clone(&client.sessions()[0]);
        assert_eq!(session.state(), SessionState::None);
        client.connect().await.unwrap();

        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));
        assert_eq!(session.state(), SessionState::LogonReceived);
        assert!(session.is_logged_on());
        assert!(client.is_logged_on());
        assert_eq!(session.expected_target_seq(), 1);

        // exactly one logon callback
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        client.stop(true).await;
        server.stop(true).await;
    }

    #[tokio::test]
    async fn test_order_accept_round_trip() {
        let server = server_engine();
        server.listen().await.unwrap();
        let port = server.bound_addrs()[0].port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(15), tx);
        client.connect().await.unwrap();
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));

        let session = Arc::clone(&client.sessions()[0]);
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .unwrap();
        session.send(order).await.unwrap();
        assert_eq!(session.expected_sender_seq(), 2);

        match next_event(&mut rx).await {
            AppEvent::Message(OuchMessage::Accepted(accepted)) => {
                assert_eq!(accepted.id.as_str(), "12345");
                assert_eq!(accepted.side, Side::Buy);
                assert_eq!(accepted.shares, 100);
                assert_eq!(accepted.symbol.as_str(), "MSFT");
                assert_eq!(accepted.price, Price::from_raw(123_400));
            }
            other => panic!("expected Accepted, got {other:?}"),
        }

        // the sequenced acknowledgement advances the target counter
        timeout(WAIT, async {
            while session.expected_target_seq() != 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        client.stop(true).await;
        server.stop(true).await;
    }

    #[tokio::test]
    async fn test_unknown_tag_logs_event_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = EngineBuilder::new()
            .with_application(ChannelApp { tx })
            .with_store_factory(MemoryStoreFactory)
            .with_log_factory(VecLogFactory {
                events: Arc::clone(&events),
            })
            .add_session(client_config(port, Duration::from_secs(15)))
            .build()
            .unwrap();
        client.connect().await.unwrap();

        let (mut sock, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let mut login = [0u8; 49];
        sock.read_exact(&mut login).await.unwrap();
        assert_eq!(login[2], b'L');

        let mut out = BytesMut::new();
        frame_packet(
            PacketKind::LoginAccepted,
            &LoginAccepted::new(1).encode(),
            &mut out,
        );
        frame_packet(PacketKind::SequencedData, &[b'?', 1, 2, 3], &mut out);
        sock.write_all(&out).await.unwrap();

        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logout));

        let session = Arc::clone(&client.sessions()[0]);
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.expected_target_seq(), 1);
        assert!(events
            .lock()
            .iter()
            .any(|e| e == "unknown OUCH message type ?"));

        client.stop(false).await;
    }

    #[tokio::test]
    async fn test_test_mode_rejection_delivered_without_counting() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(15), tx);
        client.connect().await.unwrap();

        let (mut sock, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let mut login = [0u8; 49];
        sock.read_exact(&mut login).await.unwrap();

        let mut out = BytesMut::new();
        frame_packet(
            PacketKind::LoginAccepted,
            &LoginAccepted::new(1).encode(),
            &mut out,
        );
        let rejected = OuchMessage::Rejected(RejectedMsg {
            tm: 0,
            id: arrayvec::ArrayString::from("12345").unwrap(),
            reason: b'T',
        });
        frame_packet(PacketKind::SequencedData, &rejected.to_bytes(), &mut out);
        sock.write_all(&out).await.unwrap();

        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));
        match next_event(&mut rx).await {
            AppEvent::Message(OuchMessage::Rejected(r)) => assert!(r.is_test_mode()),
            other => panic!("expected Rejected, got {other:?}"),
        }
        let session = Arc::clone(&client.sessions()[0]);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.expected_target_seq(), 1);

        // a counted message afterwards advances the counter
        let mut out = BytesMut::new();
        let sys = OuchMessage::System(SystemMsg { tm: 0, event: b'S' });
        frame_packet(PacketKind::SequencedData, &sys.to_bytes(), &mut out);
        sock.write_all(&out).await.unwrap();
        assert!(matches!(
            next_event(&mut rx).await,
            AppEvent::Message(OuchMessage::System(_))
        ));
        timeout(WAIT, async {
            while session.expected_target_seq() != 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        client.stop(false).await;
    }

    #[tokio::test]
    async fn test_heartbeats_timeout_and_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(2), tx);
        client.connect().await.unwrap();

        let (mut sock, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let mut login = [0u8; 49];
        sock.read_exact(&mut login).await.unwrap();
        sock.write_all(&{
            let mut out = BytesMut::new();
            frame_packet(
                PacketKind::LoginAccepted,
                &LoginAccepted::new(1).encode(),
                &mut out,
            );
            out
        })
        .await
        .unwrap();
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));

        // during silence the client heartbeats roughly every second
        let mut heartbeat = [0u8; 3];
        timeout(Duration::from_millis(1900), sock.read_exact(&mut heartbeat))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(heartbeat, [0, 1, b'R']);

        // with the server silent for the reconnect interval, the client
        // closes the connection
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logout));

        // and redials after the reconnect interval
        let (mut sock2, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
        let mut login2 = [0u8; 49];
        sock2.read_exact(&mut login2).await.unwrap();
        assert_eq!(login2[2], b'L');

        client.stop(false).await;
    }

    #[tokio::test]
    async fn test_concurrent_sends_all_arrive_intact() {
        const TASKS: usize = 4;
        const PER_TASK: usize = 25;

        let server = server_engine();
        server.listen().await.unwrap();
        let port = server.bound_addrs()[0].port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(15), tx);
        client.connect().await.unwrap();
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));

        let session = Arc::clone(&client.sessions()[0]);
        let mut senders = Vec::new();
        for task in 0..TASKS {
            let session = Arc::clone(&session);
            senders.push(tokio::spawn(async move {
                for i in 0..PER_TASK {
                    let id = format!("T{task}-{i}");
                    let order =
                        OrderMsg::new(&id, Side::Buy, 100, "MSFT", Price::from_raw(123_400))
                            .unwrap();
                    session.send(order).await.unwrap();
                }
            }));
        }
        for sender in senders {
            sender.await.unwrap();
        }
        assert_eq!(session.expected_sender_seq(), (TASKS * PER_TASK) as u64 + 1);

        let mut ids = std::collections::HashSet::new();
        for _ in 0..TASKS * PER_TASK {
            match next_event(&mut rx).await {
                AppEvent::Message(OuchMessage::Accepted(accepted)) => {
                    assert_eq!(accepted.shares, 100);
                    assert!(ids.insert(accepted.id.as_str().to_string()));
                }
                other => panic!("expected Accepted, got {other:?}"),
            }
        }
        assert_eq!(ids.len(), TASKS * PER_TASK);

        client.stop(true).await;
        server.stop(true).await;
    }

    #[tokio::test]
    async fn test_connect_without_clients_is_fatal() {
        let server = server_engine();
        assert!(server.connect().await.is_err());
    }

    #[tokio::test]
    async fn test_listen_without_servers_is_fatal() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = client_engine(1, Duration::from_secs(15), tx);
        assert!(client.listen().await.is_err());
    }

    #[tokio::test]
    async fn test_second_connection_rejected_while_session_bound() {
        let server = server_engine();
        server.listen().await.unwrap();
        let port = server.bound_addrs()[0].port();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = client_engine(port, Duration::from_secs(15), tx);
        client.connect().await.unwrap();
        assert!(matches!(next_event(&mut rx).await, AppEvent::Logon));

        // the lone acceptor session is bound, so a second socket closes
        let mut extra = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        let mut buf = [0u8; 8];
        let n = timeout(WAIT, extra.read(&mut buf)).await.unwrap().unwrap();
        assert_eq!(n, 0);

        client.stop(true).await;
        server.stop(true).await;
    }
}
