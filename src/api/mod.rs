pub mod client;
pub mod endpoints;

pub use client::{ApiClient, Endpoint, HttpMethod};
pub use endpoints::{JsonRpcEndpoint, RatesEndpoint, RatesResponse};
