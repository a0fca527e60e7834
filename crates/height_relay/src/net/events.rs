//! Push-notification feed from the hsd node.
//!
//! Subscribes to the node's `watchChain` stream and forwards every
//! `chainConnect` entry into the relay's bounded channel. The watcher never
//! interprets entries beyond deserializing them; ordering and reorg handling
//! are the node's responsibility.

use jsonrpsee::proc_macros::rpc;
use jsonrpsee::ws_client::WsClientBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::Height;
use crate::config::NodeConfig;

/// One `chainConnect` notification: a block was connected to the best chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    pub hash: String,
    pub height: Height,
    pub time: u64,
}

#[rpc(client)]
pub trait ChainFeedApi {
    /// Subscribe to chain connect events from the node.
    #[subscription(name = "watchChain" => "chainConnect", unsubscribe = "unwatchChain", item = ChainEntry)]
    async fn watch_chain(&self) -> jsonrpsee::core::SubscriptionResult;
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to connect to node event feed: {0}")]
    Connect(#[source] jsonrpsee::core::client::Error),
    #[error("failed to subscribe to chain events: {0}")]
    Subscribe(#[source] jsonrpsee::core::client::Error),
    #[error("malformed chain entry: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("node event feed disconnected")]
    Disconnected,
    #[error("gave up reconnecting after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

/// Watches the node's chain connect feed and forwards entries to the relay.
///
/// On transport failure the watcher reconnects with a fixed delay; a missed
/// entry is harmless because the relay only cares about the latest height.
pub struct ChainWatcher {
    config: NodeConfig,
    events: mpsc::Sender<ChainEntry>,
}

impl ChainWatcher {
    pub fn new(config: NodeConfig, events: mpsc::Sender<ChainEntry>) -> Self {
        ChainWatcher { config, events }
    }

    /// Runs the watch loop until the relay shuts down or reconnection
    /// attempts are exhausted.
    pub async fn run(self) -> Result<(), WatchError> {
        let mut attempts: u32 = 0;

        loop {
            match self.run_inner().await {
                Ok(()) => {
                    info!("relay closed, stopping chain watcher");
                    return Ok(());
                }
                Err(e) => {
                    attempts += 1;
                    if attempts > self.config.max_reconnect_attempts {
                        return Err(WatchError::RetriesExhausted { attempts });
                    }
                    warn!(error = %e, attempt = attempts, "chain watcher disconnected, reconnecting...");
                    tokio::time::sleep(self.config.reconnect_delay).await;
                }
            }
        }
    }

    async fn run_inner(&self) -> Result<(), WatchError> {
        let url = self.config.ws_url();
        info!(%url, "connecting to node event feed");

        let client = WsClientBuilder::default()
            .connection_timeout(Duration::from_secs(30))
            .build(&url)
            .await
            .map_err(WatchError::Connect)?;

        let mut subscription = client.watch_chain().await.map_err(WatchError::Subscribe)?;

        info!("watching chain connect events");

        while let Some(entry) = subscription.next().await {
            let entry = entry.map_err(WatchError::Decode)?;
            debug!(height = entry.height, hash = %entry.hash, "chain connect");

            // A closed channel means the relay is gone; shut down cleanly.
            if self.events.send(entry).await.is_err() {
                return Ok(());
            }
        }

        Err(WatchError::Disconnected)
    }
}
