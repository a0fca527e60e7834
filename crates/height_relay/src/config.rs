use std::time::Duration;

use clap::ValueEnum;

/// Handshake network to track. Selects the default hsd RPC port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Network {
    Main,
    Testnet,
    Regtest,
    Simnet,
}

impl Network {
    /// Default hsd RPC port for this network.
    pub fn rpc_port(self) -> u16 {
        match self {
            Network::Main => 12037,
            Network::Testnet => 13037,
            Network::Regtest => 14037,
            Network::Simnet => 15037,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Network::Main => "main",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
            Network::Simnet => "simnet",
        };
        f.write_str(name)
    }
}

/// How to reach the hsd node. Both the HTTP tip query and the WebSocket
/// event feed use the same host and port, like hsd's own node client.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub network: Network,
    pub host: String,
    /// Overrides the network's default RPC port.
    pub port: Option<u16>,
    pub api_key: Option<String>,
    /// Delay between reconnection attempts to the event feed.
    pub reconnect_delay: Duration,
    /// Maximum reconnection attempts before giving up.
    pub max_reconnect_attempts: u32,
}

impl NodeConfig {
    pub fn new(network: Network) -> Self {
        NodeConfig {
            network,
            host: "127.0.0.1".to_string(),
            port: None,
            api_key: None,
            reconnect_delay: Duration::from_secs(5),
            max_reconnect_attempts: u32::MAX,
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.network.rpc_port())
    }

    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port())
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port())
    }
}
