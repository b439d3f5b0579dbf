//! Fetch exchange types
//!
//! Request and response values seen by the router. Bodies are `Bytes` so that
//! cloning a response for write-back is cheap.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use url::Url;

/// Request mode as reported by the page (`Sec-Fetch-Mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    #[default]
    Cors,
    NoCors,
}

impl RequestMode {
    pub fn from_sec_fetch_mode(value: &str) -> Self {
        match value {
            "navigate" => RequestMode::Navigate,
            "same-origin" => RequestMode::SameOrigin,
            "no-cors" => RequestMode::NoCors,
            _ => RequestMode::Cors,
        }
    }
}

/// What the page intends to do with the response (`Sec-Fetch-Dest`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestDestination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    #[default]
    Empty,
}

impl RequestDestination {
    pub fn from_sec_fetch_dest(value: &str) -> Self {
        match value {
            "document" | "iframe" | "frame" => RequestDestination::Document,
            "script" | "worker" | "sharedworker" | "serviceworker" => RequestDestination::Script,
            "style" => RequestDestination::Style,
            "image" => RequestDestination::Image,
            "font" => RequestDestination::Font,
            "manifest" => RequestDestination::Manifest,
            _ => RequestDestination::Empty,
        }
    }
}

/// A request intercepted by the worker.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub mode: RequestMode,
    pub destination: RequestDestination,
    pub body: Bytes,
}

impl FetchRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            mode: RequestMode::default(),
            destination: RequestDestination::default(),
            body: Bytes::new(),
        }
    }

    /// A plain GET, as issued by `fetch(url)` or `cache.add(url)`.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// A top-level navigation to `url`.
    pub fn navigate(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            destination: RequestDestination::Document,
            ..Self::get(url)
        }
    }

    pub fn with_destination(mut self, destination: RequestDestination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns true for navigations and requests that ask for HTML.
    pub fn is_document(&self) -> bool {
        self.mode == RequestMode::Navigate
            || self.destination == RequestDestination::Document
            || self
                .headers
                .get(header::ACCEPT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|accept| accept.contains("text/html"))
    }

    pub fn is_websocket_upgrade(&self) -> bool {
        self.headers
            .get(header::UPGRADE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
    }

    pub fn is_same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }
}

/// Classification of a response, mirroring what the page is allowed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Same-origin, fully readable
    #[default]
    Basic,
    /// Cross-origin with CORS, readable
    Cors,
    /// Cross-origin without CORS, status and body hidden
    Opaque,
    /// Network error placeholder
    Error,
}

/// A response served to the page or stored in a cache.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub response_type: ResponseType,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            response_type: ResponseType::Basic,
        }
    }

    /// A same-origin 200 response.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// The placeholder served when neither network nor cache can answer.
    pub fn network_offline() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "Network offline")
            .with_header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Stamps the `Date` header used as the capture time of a cache entry.
    pub fn with_date(self, date: DateTime<Utc>) -> Self {
        self.with_header(header::DATE, &format_http_date(date))
    }

    /// Parses the `Date` header, if present and well formed.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.headers
            .get(header::DATE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date)
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Status 200 and readable by the worker.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
            && matches!(self.response_type, ResponseType::Basic | ResponseType::Cors)
    }
}

// == HTTP Date Helpers ==
/// Formats a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parses any of the three HTTP-date formats.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    // RFC 850 and asctime forms
    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}
