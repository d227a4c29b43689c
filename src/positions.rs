// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Raw `eth_call` against the Fluid VaultResolver's `positionsByUser(address)`

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::api::{ApiClient, JsonRpcEndpoint};
use crate::error::{Error, Result};

/// keccak256("positionsByUser(address)")[..4]
pub const POSITIONS_SELECTOR: &str = "0x919ddbf0";

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<RpcError>,
    /// The response exactly as the node sent it
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcError {
    /// Revert data, when the node returns it as a hex string
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.as_str())
    }
}

/// Encode calldata for `positionsByUser(address)`
pub fn build_calldata(address: &str) -> Result<String> {
    let clean = address.trim().to_lowercase();
    let hex = clean
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidArgument("wallet address must start with 0x".to_string()))?;

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidArgument(
            "wallet address must be 40 hex chars (after 0x)".to_string(),
        ));
    }

    Ok(format!("{}{:0>64}", POSITIONS_SELECTOR, hex))
}

pub fn eth_call_payload(resolver: &str, calldata: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_call",
        "params": [
            {
                "to": resolver,
                "data": calldata,
            },
            "latest",
        ],
    })
}

pub async fn fetch_positions(
    client: &ApiClient,
    rpc_url: &str,
    resolver: &str,
    wallet: &str,
) -> Result<RpcResponse> {
    let calldata = build_calldata(wallet)?;
    debug!(resolver, calldata = calldata.as_str(), "built positionsByUser calldata");

    let endpoint = JsonRpcEndpoint {
        rpc_url: rpc_url.to_string(),
        payload: eth_call_payload(resolver, &calldata),
    };
    let raw: Value = client.send(&endpoint).await?;
    let mut response: RpcResponse = serde_json::from_value(raw.clone())?;
    response.raw = raw;

    match &response.error {
        Some(err) => info!(code = err.code, message = err.message.as_str(), "eth_call returned an error"),
        None => info!(wallet, "eth_call succeeded"),
    }
    Ok(response)
}
