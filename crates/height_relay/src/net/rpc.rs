use std::fmt;

use reqwest::{self, Client, StatusCode, Url, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Height;
use crate::config::NodeConfig;

/// Errors that can occur when talking to an hsd JSON-RPC endpoint.
#[derive(Debug)]
pub enum RpcError {
    NonHttpUrl,
    Client(String),
    Json(serde_json::Error),
    Status(StatusCode),
    Rpc { code: i64, message: String },
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::NonHttpUrl => write!(f, "only http:// and https:// URLs are supported"),
            RpcError::Client(e) => write!(f, "client error: {e}"),
            RpcError::Json(e) => write!(f, "JSON error: {e}"),
            RpcError::Status(status) => write!(f, "unexpected HTTP status: {status}"),
            RpcError::Rpc { code, message } => {
                write!(f, "RPC error {code}: {message}")
            }
        }
    }
}

impl std::error::Error for RpcError {}

impl From<serde_json::Error> for RpcError {
    fn from(e: serde_json::Error) -> Self {
        RpcError::Json(e)
    }
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'a str,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// Minimal JSON-RPC client for talking to an hsd node over HTTP(S).
///
/// hsd authenticates RPC calls with basic auth where the password is the
/// node's API key and the username is ignored.
pub struct RpcClient {
    client: Client,
    url: Url,
    api_key: Option<String>,
}

impl RpcClient {
    /// Creates a new client for the node described by `config`.
    pub fn new(config: &NodeConfig) -> Result<Self, RpcError> {
        let url = Url::parse(&config.http_url()).map_err(|e| RpcError::Client(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(RpcError::NonHttpUrl);
            }
        }

        let client = Client::new();

        Ok(RpcClient {
            client,
            url,
            api_key: config.api_key.clone(),
        })
    }

    async fn call<T>(&self, method: &str, params: &[Value]) -> Result<T, RpcError>
    where
        T: DeserializeOwned,
    {
        let request_body = JsonRpcRequest {
            jsonrpc: "1.0",
            id: "height-relay",
            method,
            params,
        };

        let mut req = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(key) = &self.api_key {
            req = req.basic_auth("x", Some(key));
        }

        let res = req
            .json(&request_body)
            .send()
            .await
            .map_err(|e| RpcError::Client(e.to_string()))?;

        if !res.status().is_success() {
            return Err(RpcError::Status(res.status()));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| RpcError::Client(e.to_string()))?;
        let rpc_response: JsonRpcResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(err) = rpc_response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        rpc_response.result.ok_or_else(|| RpcError::Rpc {
            code: -1,
            message: "missing result field in RPC response".to_string(),
        })
    }

    /// Returns the current chain height reported by the node (`getblockcount`).
    ///
    /// This is the startup tip query; afterwards the height is tracked
    /// through the event feed only.
    pub async fn get_block_count(&self) -> Result<Height, RpcError> {
        self.call("getblockcount", &[]).await
    }
}
