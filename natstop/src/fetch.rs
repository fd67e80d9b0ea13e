//! HTTP client for the server's monitoring endpoints, with bounded retry/backoff.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, MonitorError, Result};
use crate::sort::SortKey;
use crate::types::{ConnectionList, ServerStats};

pub const MAX_ATTEMPTS: u32 = 5;
pub const RETRY_WAIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Varz,
    Connz,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Varz => "/varz",
            Endpoint::Connz => "/connz",
        }
    }
}

/// Issues one GET and hands back the body of a 2xx answer.
pub trait Transport: Send + Sync {
    fn get(&self, url: Url) -> impl Future<Output = std::result::Result<String, FetchError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: Url) -> impl Future<Output = std::result::Result<String, FetchError>> + Send {
        let client = self.client.clone();
        async move {
            let resp = client.get(url).send().await.map_err(FetchError::transport)?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }
            resp.text().await.map_err(FetchError::transport)
        }
    }
}

/// Fetches `/varz` and `/connz` fragments from one server.
pub struct StatsFetcher<T = HttpTransport> {
    transport: T,
    base: Url,
    conn_limit: u32,
    max_attempts: u32,
    retry_wait: Duration,
}

impl StatsFetcher<HttpTransport> {
    pub fn new(host: &str, port: u16, conn_limit: u32) -> Result<Self> {
        Self::with_transport(HttpTransport::new(), host, port, conn_limit)
    }
}

impl<T: Transport> StatsFetcher<T> {
    pub fn with_transport(transport: T, host: &str, port: u16, conn_limit: u32) -> Result<Self> {
        let base = Url::parse(&format!("http://{host}:{port}/")).map_err(|e| {
            MonitorError::InvalidConfiguration(format!("bad server address {host}:{port}: {e}"))
        })?;
        Ok(Self {
            transport,
            base,
            conn_limit,
            max_attempts: MAX_ATTEMPTS,
            retry_wait: RETRY_WAIT,
        })
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_wait: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_wait = retry_wait;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full request URL. Only `/connz` carries the limit and the sort hint.
    pub fn url(&self, endpoint: Endpoint, sort: SortKey) -> Url {
        let mut url = self.base.clone();
        url.set_path(endpoint.path());
        if endpoint == Endpoint::Connz {
            url.query_pairs_mut()
                .append_pair("limit", &self.conn_limit.to_string())
                .append_pair("s", sort.as_str());
        }
        url
    }

    pub async fn server_stats(&self) -> Result<ServerStats> {
        self.fetch(Endpoint::Varz, SortKey::default()).await
    }

    pub async fn connections(&self, sort: SortKey) -> Result<ConnectionList> {
        self.fetch(Endpoint::Connz, sort).await
    }

    /// Tries up to `max_attempts` times, sleeping `retry_wait` between attempts.
    /// Transport, status and decode failures are all retried alike.
    pub async fn fetch<D>(&self, endpoint: Endpoint, sort: SortKey) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.url(endpoint, sort);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.attempt::<D>(url.clone()).await {
                Ok(v) => {
                    debug!(endpoint = endpoint.path(), attempt, "fetched");
                    return Ok(v);
                }
                Err(e) => e,
            };
            if attempt >= self.max_attempts {
                return Err(MonitorError::UnreachableServer {
                    endpoint: endpoint.path().to_string(),
                    attempts: attempt,
                    source: err,
                });
            }
            warn!(
                endpoint = endpoint.path(),
                retries = attempt,
                error = %err,
                "could not monitor server, backing off for {:?}",
                self.retry_wait
            );
            sleep(self.retry_wait).await;
        }
    }

    async fn attempt<D: DeserializeOwned>(&self, url: Url) -> std::result::Result<D, FetchError> {
        let body = self.transport.get(url).await?;
        decode(&body)
    }
}

/// Decodes a monitoring answer. Both endpoints answer with a JSON object; arrays
/// would otherwise bind to struct fields by position.
pub fn decode<D: DeserializeOwned>(body: &str) -> std::result::Result<D, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(FetchError::Malformed)?;
    if !value.is_object() {
        return Err(FetchError::Malformed(<serde_json::Error as serde::de::Error>::custom(
            "expected a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(FetchError::Malformed)
}
