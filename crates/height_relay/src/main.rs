use std::env;
use std::net::SocketAddr;

use clap::Parser;
use height_relay::config::{Network, NodeConfig};
use height_relay::net::events::ChainWatcher;
use height_relay::net::rpc::RpcClient;
use height_relay::relay::{Relay, run_server};
use height_relay::store;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Chain connect events arrive minutes apart; the bound only matters if the
/// pump stalls.
const EVENT_CHANNEL_CAPACITY: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "height-relay")]
#[command(about = "Relays the Handshake chain height from an hsd node to subscribers", long_about = None)]
struct Args {
    /// Handshake network to track
    #[arg(long, value_enum, default_value_t = Network::Main)]
    network: Network,

    /// Host of the hsd node
    #[arg(long, default_value = "127.0.0.1")]
    node_host: String,

    /// RPC port of the hsd node, overriding the network default
    #[arg(long)]
    node_port: Option<u16>,

    /// Address to serve subscribers on
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut node = NodeConfig::new(args.network);
    node.host = args.node_host;
    node.port = args.node_port;
    node.api_key = env::var("HSD_API_KEY").ok();

    // Fetch the tip before serving so the first subscriber already sees a
    // height. A node that is down at this point is fatal.
    let rpc = RpcClient::new(&node)?;
    let tip = rpc.get_block_count().await?;
    info!(network = %node.network, height = tip, "connected to hsd");

    let (height_store, reader) = store::channel();
    height_store.set(tip);

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let watcher = ChainWatcher::new(node, events_tx);
    tokio::spawn(async move {
        if let Err(e) = watcher.run().await {
            error!("chain watcher failed: {e}");
        }
    });

    tokio::spawn(Relay::new(height_store, events_rx).run());

    let handle = run_server(args.listen, reader).await?;
    handle.stopped().await;

    Ok(())
}
