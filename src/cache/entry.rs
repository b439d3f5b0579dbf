//! Cache Entry Module
//!
//! Defines request keys and stored responses with their capture time.

use axum::http::Method;
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{Result, WorkerError};
use crate::models::{FetchRequest, FetchResponse};

// == Request Key ==
/// Identity of a cached request: method plus URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
}

impl RequestKey {
    /// Builds the key for a GET of `url`.
    pub fn get(url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }

    /// Builds the key for a request. Only GET requests can be cached.
    pub fn from_request(request: &FetchRequest) -> Result<Self> {
        if request.method != Method::GET {
            return Err(WorkerError::InvalidRequest(format!(
                "{} requests cannot be cached",
                request.method
            )));
        }
        Ok(Self::get(&request.url))
    }
}

// == Cache Entry ==
/// A stored response.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub response: FetchResponse,
}

impl CacheEntry {
    pub fn new(response: FetchResponse) -> Self {
        Self { response }
    }

    /// Capture time, read from the response's `Date` header.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.response.date()
    }

    /// Returns true only if the capture time is known and earlier than `cutoff`.
    ///
    /// Entries with no readable capture time are never considered stale.
    pub fn captured_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.captured_at().is_some_and(|captured| captured < cutoff)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use chrono::Duration;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_ignores_fragment() {
        let a = RequestKey::get(&url("http://localhost:3000/index.html#top"));
        let b = RequestKey::get(&url("http://localhost:3000/index.html"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_rejects_non_get() {
        let request = FetchRequest::new(Method::POST, url("http://localhost:3000/api/send"));
        assert!(matches!(
            RequestKey::from_request(&request),
            Err(WorkerError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_captured_before() {
        let now = Utc::now();
        let entry = CacheEntry::new(FetchResponse::ok("old").with_date(now - Duration::days(10)));
        assert!(entry.captured_before(now - Duration::days(7)));

        let fresh = CacheEntry::new(FetchResponse::ok("new").with_date(now - Duration::days(1)));
        assert!(!fresh.captured_before(now - Duration::days(7)));
    }

    #[test]
    fn test_missing_or_garbled_date_is_never_stale() {
        let cutoff = Utc::now();
        let undated = CacheEntry::new(FetchResponse::ok("x"));
        assert!(undated.captured_at().is_none());
        assert!(!undated.captured_before(cutoff));

        let garbled = CacheEntry::new(FetchResponse::ok("x").with_header(header::DATE, "soon"));
        assert!(!garbled.captured_before(cutoff));
    }
}
