/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Initiator dial loop.
//!
//! One task per client session: dial, logon, drive the connection, and on
//! loss wait out the reconnect interval before dialing again. The loop
//! only ends on endpoint shutdown.

use crate::application::Application;
use crate::driver::{drive, ExitReason};
use crate::session::Session;
use ironouch_session::config::SessionConfig;
use std::io;
use std::sync::Arc;
use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tokio::sync::broadcast;
use tracing::debug;

pub(crate) async fn run_initiator(
    session: Arc<Session>,
    app: Arc<dyn Application>,
    shutdown: broadcast::Sender<()>,
) {
    let mut rx = shutdown.subscribe();
    loop {
        let host = session.config().connect_host.clone().unwrap_or_default();
        let port = session.config().connect_port.unwrap_or(0);
        session.event(&format!("Connecting to {host} on port {port}"));

        let attempt = tokio::select! {
            attempt = connect(session.config()) => attempt,
            _ = rx.recv() => return,
        };
        match attempt {
            Ok(stream) => {
                session.event("Connection succeeded");
                if session.try_attach() {
                    match session.logon() {
                        Ok(()) => {
                            if drive(&session, &app, stream, &mut rx).await == ExitReason::Shutdown
                            {
                                return;
                            }
                        }
                        Err(err) => {
                            session.event(&err.to_string());
                            session.detach();
                        }
                    }
                }
            }
            Err(err) => {
                session.event("Connection failed");
                debug!(session = %session.id(), %err, "dial failed");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(session.config().reconnect_interval) => {}
            _ = rx.recv() => return,
        }
    }
}

/// Dials the configured peer with TCP_NODELAY and any configured socket
/// buffer sizes.
async fn connect(config: &SessionConfig) -> io::Result<TcpStream> {
    let host = config
        .connect_host
        .as_deref()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no connect host"))?;
    let port = config
        .connect_port
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no connect port"))?;
    let addr = lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "address did not resolve"))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    if let Some(size) = config.receive_buffer_size {
        socket.set_recv_buffer_size(size)?;
    }
    if let Some(size) = config.send_buffer_size {
        socket.set_send_buffer_size(size)?;
    }
    let stream = socket.connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}
