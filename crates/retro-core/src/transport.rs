use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("response is not the expected JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetches and decodes JSON documents. Everything that talks to the
/// directory API goes through this seam.
pub trait Transport: Send + Sync {
    fn get_json<T>(&self, url: Url) -> impl Future<Output = Result<T, TransportError>> + Send
    where
        T: DeserializeOwned + Send;
}

/// `Transport` over a shared reqwest client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(api.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(api.connect_timeout())
            .timeout(api.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get_json<T>(&self, url: Url) -> impl Future<Output = Result<T, TransportError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        let request = self.client.get(url.clone());
        async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, TransportError> {
    Url::parse(raw).map_err(|e| TransportError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}
