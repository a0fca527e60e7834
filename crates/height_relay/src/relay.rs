//! Broadcast relay: applies node events to the height store and fans the
//! stored value out to every subscriber.

use std::net::SocketAddr;

use jsonrpsee::core::{RpcResult, SubscriptionResult};
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObject;
use jsonrpsee::types::error::INTERNAL_ERROR_CODE;
use jsonrpsee::{PendingSubscriptionSink, SubscriptionMessage, SubscriptionSink};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::api::{CountdownApiServer, HeightUpdate};
use crate::net::events::ChainEntry;
use crate::store::{HeightReader, HeightStore};

/// Pump between the node watcher and the height store.
///
/// The single writer: entries arrive over a bounded channel in chain order
/// and are applied to the store one at a time. Setting the store is what
/// wakes the subscription tasks, so no further signaling is needed here.
pub struct Relay {
    store: HeightStore,
    events: mpsc::Receiver<ChainEntry>,
}

impl Relay {
    pub fn new(store: HeightStore, events: mpsc::Receiver<ChainEntry>) -> Self {
        Relay { store, events }
    }

    /// Applies events until every sender is gone.
    pub async fn run(mut self) {
        while let Some(entry) = self.events.recv().await {
            info!(height = entry.height, "new chain height");
            self.store.set(entry.height);
        }
        debug!("event channel closed, relay pump stopping");
    }
}

/// Server half of the countdown API, backed by a [`HeightReader`].
pub struct RelayRpc {
    reader: HeightReader,
}

impl RelayRpc {
    pub fn new(reader: HeightReader) -> Self {
        RelayRpc { reader }
    }
}

#[async_trait::async_trait]
impl CountdownApiServer for RelayRpc {
    async fn get_tip(&self) -> RpcResult<HeightUpdate> {
        match self.reader.get() {
            Some(height) => Ok(HeightUpdate::from(height)),
            None => Err(ErrorObject::owned(
                INTERNAL_ERROR_CODE,
                "no height observed yet",
                None::<()>,
            )),
        }
    }

    async fn subscribe_heights(&self, pending: PendingSubscriptionSink) -> SubscriptionResult {
        let sink = pending.accept().await?;
        let mut reader = self.reader.clone();

        tokio::spawn(async move {
            // Late joiners get the current value right away instead of
            // waiting for the next block.
            if let Some(height) = reader.latest() {
                if sink.send(update_msg(&sink, height)).await.is_err() {
                    return;
                }
            }

            while let Some(height) = reader.updated().await {
                if sink.send(update_msg(&sink, height)).await.is_err() {
                    // Client went away; nothing to do, it will get the
                    // latest value if it subscribes again.
                    return;
                }
            }
        });

        Ok(())
    }
}

fn update_msg(sink: &SubscriptionSink, height: crate::Height) -> SubscriptionMessage {
    SubscriptionMessage::new(
        sink.method_name(),
        sink.subscription_id().clone(),
        &HeightUpdate::from(height),
    )
    .expect("HeightUpdate should be serializable")
}

/// Running relay server. Stops the server when dropped.
pub struct RelayHandle {
    addr: SocketAddr,
    server_handle: Option<jsonrpsee::server::ServerHandle>,
}

impl RelayHandle {
    fn new(addr: SocketAddr, server_handle: jsonrpsee::server::ServerHandle) -> Self {
        RelayHandle {
            addr,
            server_handle: Some(server_handle),
        }
    }

    /// Address the server is bound to. Useful when listening on port 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits until the server has stopped.
    pub async fn stopped(mut self) {
        if let Some(handle) = self.server_handle.take() {
            handle.stopped().await;
        }
    }
}

impl Drop for RelayHandle {
    fn drop(&mut self) {
        let Some(handle) = self.server_handle.take() else {
            return;
        };

        if let Err(err) = handle.stop() {
            error!("error while stopping relay server: {err}");
        }
    }
}

/// Binds the relay server and starts serving subscribers.
pub async fn run_server(
    addr: SocketAddr,
    reader: HeightReader,
) -> Result<RelayHandle, std::io::Error> {
    let server = Server::builder().build(addr).await?;
    let addr = server.local_addr()?;

    info!(%addr, "relay server listening");

    let handle = server.start(RelayRpc::new(reader).into_rpc());

    Ok(RelayHandle::new(addr, handle))
}
