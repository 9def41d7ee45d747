/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Per-port acceptor actor.
//!
//! Sessions that share a `SocketAcceptPort` share one listening socket.
//! The actor owns that listener and an ordered candidate list; each
//! accepted socket goes to the first candidate with no socket bound, and
//! is closed when every candidate is busy.

use crate::application::Application;
use crate::driver::drive;
use crate::session::Session;
use ironouch_log::Log;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::warn;

pub(crate) async fn run_acceptor(
    listener: TcpListener,
    port: u16,
    candidates: Vec<Arc<Session>>,
    app: Arc<dyn Application>,
    shutdown: broadcast::Sender<()>,
    endpoint_log: Arc<dyn Log>,
) {
    let mut rx = shutdown.subscribe();
    let mut drivers = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    endpoint_log
                        .on_event(&format!("Accepted connection from {peer} on port {port}"));
                    if let Err(err) = stream.set_nodelay(true) {
                        warn!(%err, "failed to set TCP_NODELAY on accepted socket");
                    }
                    match candidates.iter().find(|s| s.try_attach()) {
                        Some(session) => {
                            let session = Arc::clone(session);
                            let app = Arc::clone(&app);
                            let shutdown = shutdown.clone();
                            drivers.spawn(async move {
                                let mut rx = shutdown.subscribe();
                                drive(&session, &app, stream, &mut rx).await;
                            });
                        }
                        None => {
                            // every candidate for this port is bound
                            endpoint_log.on_event(&format!(
                                "No free session for connection from {peer} on port {port}"
                            ));
                            drop(stream);
                        }
                    }
                }
                Err(err) => {
                    warn!(port, %err, "accept failed");
                }
            },
            _ = rx.recv() => break,
        }
    }
    while drivers.join_next().await.is_some() {}
}
