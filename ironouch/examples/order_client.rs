//! OUCH initiator example: sends an order on logon and another for every
//! acknowledgement, printing the round trip.
use async_trait::async_trait;
use ironouch::prelude::*;
use std::sync::Arc;
use tracing::info;

const SETTINGS: &str = "\
[DEFAULT]
SocketConnectHost=localhost
SocketConnectPort=9123
FileStorePath=out/client_store
FileLogPath=out/client_log
[SESSION]
Username=zhb
Password=xxx
ConnectionType=initiator
";

struct OrderClient;

impl OrderClient {
    async fn new_order(session: &Arc<Session>) {
        let order = OrderMsg::new("12345", Side::Buy, 100, "MSFT", Price::from_raw(123_400))
            .expect("static order fields fit");
        let _ = session.send(order).await;
    }
}

#[async_trait]
impl Application for OrderClient {
    async fn on_logon(&self, session: &Arc<Session>) {
        info!(session = %session.id(), "logged on");
        Self::new_order(session).await;
    }

    async fn from_app(&self, message: &OuchMessage, session: &Arc<Session>) {
        if let OuchMessage::Accepted(accepted) = message {
            info!(id = %accepted.id, price = %accepted.price, "accepted");
            Self::new_order(session).await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let engine = EngineBuilder::new()
        .with_application(OrderClient)
        .load_settings_str(SETTINGS)?
        .build()?;
    engine.connect().await?;
    engine.wait().await;
    Ok(())
}
