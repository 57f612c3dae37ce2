use async_trait::async_trait;
use http::header::HOST;
use reqwest::Client;

use super::pool::PoolConfig;
use super::timeout::TimeoutConfig;
use super::{HttpRequest, HttpResponse, ReasonPhrase, Transport};
use crate::config::ShimConfig;
use crate::error::TransportError;

/// Real network transport backed by a pooled reqwest client.
pub struct ReqwestTransport {
    client: Client,
    timeout_config: TimeoutConfig,
}

impl ReqwestTransport {
    pub fn new(timeout_config: TimeoutConfig, pool_config: PoolConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(timeout_config.connect)
            .pool_idle_timeout(Some(pool_config.pool_idle_timeout))
            .pool_max_idle_per_host(pool_config.pool_max_idle_per_host)
            .build()
            .map_err(|e| TransportError::Request(Box::new(e)))?;

        Ok(Self {
            client,
            timeout_config,
        })
    }

    pub fn from_config(config: &ShimConfig) -> Result<Self, TransportError> {
        Self::new(
            TimeoutConfig::from(&config.timeouts),
            PoolConfig::from(&config.pool),
        )
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else if err.is_connect() {
        TransportError::Connection(Box::new(err))
    } else {
        TransportError::Request(Box::new(err))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (parts, body) = request.into_parts();
        let url = parts.uri.to_string();
        let mut headers = parts.headers;
        headers.remove(HOST);

        let upstream_resp = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .timeout(self.timeout_config.request)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = upstream_resp.status();
        let version = upstream_resp.version();
        let headers = upstream_resp.headers().clone();
        // hyper only records the phrase when it differs from the canonical one.
        let reason = upstream_resp
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| ReasonPhrase(String::from_utf8_lossy(phrase.as_bytes()).into_owned()));
        let body_bytes = upstream_resp.bytes().await.map_err(map_reqwest_error)?;

        let mut response = HttpResponse::new(body_bytes);
        *response.status_mut() = status;
        *response.version_mut() = version;
        *response.headers_mut() = headers;
        if let Some(reason) = reason {
            response.extensions_mut().insert(reason);
        }
        Ok(response)
    }
}
