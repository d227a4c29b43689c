use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::client::{Endpoint, HttpMethod};

/// USD-relative rate feed
#[derive(Debug, Clone)]
pub struct RatesEndpoint {
    pub base: String,
}

impl Default for RatesEndpoint {
    fn default() -> Self {
        Self {
            base: "USD".to_string(),
        }
    }
}

impl Endpoint for RatesEndpoint {
    fn path(&self) -> String {
        "rates".to_string()
    }

    fn query(&self) -> Vec<(String, String)> {
        vec![("base".to_string(), self.base.clone())]
    }
}

#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub base: String,
    /// Local units per one unit of `base`, keyed by currency code
    pub rates: HashMap<String, Decimal>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

/// Raw JSON-RPC POST against a full node URL
#[derive(Debug, Clone)]
pub struct JsonRpcEndpoint {
    pub rpc_url: String,
    pub payload: Value,
}

impl Endpoint for JsonRpcEndpoint {
    fn path(&self) -> String {
        self.rpc_url.clone()
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn body(&self) -> Option<Value> {
        Some(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rates_response_accepts_strings_and_numbers() {
        let json = r#"{
            "base": "USD",
            "rates": { "EUR": "0.93", "INR": 84 },
            "updatedAt": "2024-05-01T00:00:00Z"
        }"#;
        let response: RatesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.base, "USD");
        assert_eq!(response.rates["EUR"], dec!(0.93));
        assert_eq!(response.rates["INR"], dec!(84));
        assert_eq!(response.updated_at.as_deref(), Some("2024-05-01T00:00:00Z"));
    }

    #[test]
    fn test_json_rpc_endpoint_is_absolute_post() {
        let endpoint = JsonRpcEndpoint {
            rpc_url: "https://rpc.example.org/v2/key".to_string(),
            payload: serde_json::json!({ "jsonrpc": "2.0" }),
        };
        assert_eq!(endpoint.method(), HttpMethod::Post);
        assert_eq!(endpoint.path(), "https://rpc.example.org/v2/key");
        assert!(endpoint.query().is_empty());
        assert!(endpoint.body().is_some());
    }
}
