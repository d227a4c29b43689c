// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single call against the API.
///
/// `path` is joined onto the client's base URL unless it is already an
/// absolute URL, in which case it is used as is.
pub trait Endpoint {
    fn path(&self) -> String;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<Value> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    insecure: bool,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let client_name = HeaderValue::from_str(&config.client_name)
            .map_err(|e| Error::Config(format!("invalid client name: {}", e)))?;
        headers.insert("X-Client", client_name);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if config.insecure {
            warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            insecure: config.insecure,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.insecure
    }

    fn build_url<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<Url> {
        let path = endpoint.path();

        let mut url = match Url::parse(&path) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                // Url::join replaces the last segment unless the base ends with '/'
                let mut base = self.base_url.clone();
                if !base.ends_with('/') {
                    base.push('/');
                }
                Url::parse(&base)?.join(path.trim_start_matches('/'))?
            }
            Err(e) => return Err(e.into()),
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidRequest(format!(
                "unsupported URL scheme: {}",
                url.scheme()
            )));
        }

        let query = endpoint.query();
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn execute<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<String> {
        let url = self.build_url(endpoint)?;
        let method = endpoint.method();
        debug!(?method, %url, "sending request");

        let mut request = match method {
            HttpMethod::Get => self.client.get(url.clone()),
            HttpMethod::Post => self.client.post(url.clone()),
        };
        if let Some(body) = endpoint.body() {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "request failed");
            return Err(server_error(status));
        }

        Ok(text)
    }

    /// Send the request and decode the JSON body into `T`
    pub async fn send<T, E>(&self, endpoint: &E) -> Result<T>
    where
        T: DeserializeOwned,
        E: Endpoint + ?Sized,
    {
        let text = self.execute(endpoint).await?;
        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Send the request, only checking that it succeeded
    pub async fn send_unit<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<()> {
        self.execute(endpoint).await.map(|_| ())
    }
}

fn server_error(status: StatusCode) -> Error {
    Error::Server {
        code: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    }
}
