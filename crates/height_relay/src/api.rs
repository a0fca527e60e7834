//! Downstream RPC surface shared between the relay server and its clients.

use jsonrpsee::proc_macros::rpc;
use serde::{Deserialize, Serialize};

use crate::Height;

/// Payload of every `newData` notification and `getTip` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightUpdate {
    pub current_height: Height,
}

impl From<Height> for HeightUpdate {
    fn from(current_height: Height) -> Self {
        HeightUpdate { current_height }
    }
}

/// Countdown relay API.
///
/// Subscribers receive one `newData` immediately on subscribe (the current
/// stored height) and then one per height change. Delivery is best effort;
/// a client that misses updates gets the latest value on its next subscribe.
#[rpc(server, client)]
pub trait CountdownApi {
    /// Returns the last height observed from the node.
    #[method(name = "getTip")]
    async fn get_tip(&self) -> jsonrpsee::core::RpcResult<HeightUpdate>;

    /// Subscribe to height updates.
    #[subscription(name = "subscribe" => "newData", unsubscribe = "unsubscribe", item = HeightUpdate)]
    async fn subscribe_heights(&self) -> jsonrpsee::core::SubscriptionResult;
}
