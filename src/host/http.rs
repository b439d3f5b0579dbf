//! reqwest-backed network used when the worker is hosted as a server.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use tracing::debug;
use url::Url;

use crate::error::{Result, WorkerError};
use crate::host::Network;
use crate::models::{FetchRequest, FetchResponse, ResponseType};

/// Headers that describe the client connection rather than the request.
const HOP_BY_HOP: &[header::HeaderName] = &[
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
    header::PROXY_AUTHORIZATION,
    header::CONTENT_LENGTH,
];

/// Fetches cross-origin URLs directly and same-origin URLs from `upstream`.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    origin: Url,
    upstream: Url,
}

impl HttpNetwork {
    pub fn new(origin: Url, upstream: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin,
            upstream,
        }
    }

    /// Maps a same-origin URL onto the upstream server, keeping path and query.
    fn target_url(&self, url: &Url) -> Url {
        if url.origin() != self.origin.origin() {
            return url.clone();
        }

        let mut target = self.upstream.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        target
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let target = self.target_url(&request.url);
        debug!("{} {} -> {}", request.method, request.url, target);

        let mut headers = request.headers.clone();
        for name in HOP_BY_HOP {
            headers.remove(name);
        }

        let response = self
            .client
            .request(request.method.clone(), target.as_str())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let status = response.status();
        let mut response_headers = HeaderMap::new();
        for (name, value) in response.headers() {
            if !HOP_BY_HOP.contains(name) {
                response_headers.append(name.clone(), value.clone());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WorkerError::Network(e.to_string()))?;

        let response_type = if request.is_same_origin(&self.origin) {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };

        Ok(FetchResponse {
            status,
            headers: response_headers,
            body,
            response_type,
        })
    }
}
