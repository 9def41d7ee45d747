//! OUCH acceptor example: acknowledges every order and cancel.
use async_trait::async_trait;
use ironouch::prelude::*;
use std::sync::Arc;
use tracing::info;

const SETTINGS: &str = "\
[DEFAULT]
SocketAcceptPort=9123
FileStorePath=out/server_store
FileLogPath=out/server_log
[SESSION]
Username=zhb
Password=xxx
ConnectionType=acceptor
";

struct AckServer;

#[async_trait]
impl Application for AckServer {
    async fn from_app(&self, message: &OuchMessage, session: &Arc<Session>) {
        match message {
            OuchMessage::Order(order) => {
                info!(id = %order.id, shares = order.shares, "order received");
                let _ = session.send(AcceptedMsg::from_order(order)).await;
            }
            OuchMessage::Cancel(cancel) => {
                let _ = session.send(CanceledMsg::from_cancel(cancel)).await;
            }
            other => info!(tag = %(other.type_tag() as char), "unhandled message"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let engine = EngineBuilder::new()
        .with_application(AckServer)
        .load_settings_str(SETTINGS)?
        .build()?;
    engine.listen().await?;
    info!("listening on port 9123");
    engine.wait().await;
    Ok(())
}
