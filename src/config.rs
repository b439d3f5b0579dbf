//! Configuration Module
//!
//! Handles loading and managing worker configuration from environment variables.

use std::env;
use std::time::Duration;

use url::Url;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_UPSTREAM: &str = "http://localhost:8080";

/// App shell and cross-origin assets fetched at install time.
pub const DEFAULT_PRECACHE_URLS: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/script.js",
    "/supabase.js",
    "/manifest.json",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    "https://fonts.googleapis.com/css2?family=Orbitron:wght@400;500;700;900&family=Rajdhani:wght@300;400;500;600;700&family=Exo+2:wght@300;400;500;600;700&display=swap",
    "https://cdn.jsdelivr.net/npm/@supabase/supabase-js@2",
];

/// How install treats manifest entries that cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecacheMode {
    /// Any failing entry fails the whole install and nothing is stored
    Atomic,
    /// Failing entries are skipped with a warning
    BestEffort,
}

impl PrecacheMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "atomic" => Some(PrecacheMode::Atomic),
            "best-effort" | "best_effort" => Some(PrecacheMode::BestEffort),
            _ => None,
        }
    }
}

/// Presentation defaults for push notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub open_action_title: String,
    pub close_action_title: String,
    /// Page opened or focused when the payload carries no `url`
    pub url: String,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "Quantum Chat".to_string(),
            body: "You have a new message".to_string(),
            icon: "/icons/icon-192x192.png".to_string(),
            badge: "/icons/badge-72x72.png".to_string(),
            vibrate: vec![100, 50, 100],
            open_action_title: "Open app".to_string(),
            close_action_title: "Close".to_string(),
            url: "/".to_string(),
        }
    }
}

/// Worker configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache name prefix, joined with the version to name the current store
    pub cache_prefix: String,
    /// Version tag bumped by the deployer on each release
    pub cache_version: String,
    /// Origin the worker controls
    pub origin: Url,
    /// Where same-origin network fetches are forwarded when hosted as a server
    pub upstream: Url,
    /// HTTP server port
    pub server_port: u16,
    /// URLs fetched and stored at install time
    pub precache_urls: Vec<String>,
    pub precache_mode: PrecacheMode,
    /// Substrings marking realtime/streaming URLs the router never intercepts
    pub bypass_markers: Vec<String>,
    /// Cached document served when a navigation fails with no exact match
    pub offline_document: String,
    /// Entry quota per cache store
    pub max_cache_entries: usize,
    /// Entries captured longer ago than this are evicted by the janitor
    pub cache_max_age_secs: u64,
    /// Interval in seconds between periodic sync firings when hosted
    pub periodic_sync_interval: u64,
    pub skip_waiting_on_install: bool,
    pub sync_tag: String,
    pub periodic_sync_tag: String,
    pub notification: NotificationDefaults,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Cache name prefix (default: quantum-chat)
    /// - `CACHE_VERSION` - Version tag (default: v2.1)
    /// - `WORKER_ORIGIN` - Controlled origin (default: http://localhost:3000)
    /// - `UPSTREAM_URL` - Upstream origin (default: http://localhost:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PRECACHE_URLS` - Comma-separated manifest (default: app shell + CDN assets)
    /// - `PRECACHE_MODE` - `atomic` or `best-effort` (default: atomic)
    /// - `BYPASS_MARKERS` - Comma-separated URL markers (default: realtime)
    /// - `OFFLINE_DOCUMENT` - Offline fallback document (default: /)
    /// - `MAX_CACHE_ENTRIES` - Entry quota per store (default: 1000)
    /// - `CACHE_MAX_AGE_SECS` - Janitor max age (default: 604800, 7 days)
    /// - `PERIODIC_SYNC_INTERVAL` - Periodic sync frequency in seconds (default: 3600)
    /// - `SKIP_WAITING_ON_INSTALL` - Activate right after install (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            cache_version: env::var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            origin: env::var("WORKER_ORIGIN")
                .ok()
                .and_then(|v| Url::parse(&v).ok())
                .unwrap_or(defaults.origin),
            upstream: env::var("UPSTREAM_URL")
                .ok()
                .and_then(|v| Url::parse(&v).ok())
                .unwrap_or(defaults.upstream),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            precache_urls: env::var("PRECACHE_URLS")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(defaults.precache_urls),
            precache_mode: env::var("PRECACHE_MODE")
                .ok()
                .and_then(|v| PrecacheMode::parse(&v))
                .unwrap_or(defaults.precache_mode),
            bypass_markers: env::var("BYPASS_MARKERS")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(defaults.bypass_markers),
            offline_document: env::var("OFFLINE_DOCUMENT").unwrap_or(defaults.offline_document),
            max_cache_entries: env::var("MAX_CACHE_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_entries),
            cache_max_age_secs: env::var("CACHE_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_max_age_secs),
            periodic_sync_interval: env::var("PERIODIC_SYNC_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.periodic_sync_interval),
            skip_waiting_on_install: env::var("SKIP_WAITING_ON_INSTALL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.skip_waiting_on_install),
            ..defaults
        }
    }

    /// Name of the cache store owned by the current version.
    pub fn cache_name(&self) -> String {
        format!("{}-{}", self.cache_prefix, self.cache_version)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_prefix: "quantum-chat".to_string(),
            cache_version: "v2.1".to_string(),
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL"),
            upstream: Url::parse(DEFAULT_UPSTREAM).expect("default upstream is a valid URL"),
            server_port: 3000,
            precache_urls: DEFAULT_PRECACHE_URLS.iter().map(|s| s.to_string()).collect(),
            precache_mode: PrecacheMode::Atomic,
            bypass_markers: vec!["realtime".to_string()],
            offline_document: "/".to_string(),
            max_cache_entries: 1000,
            cache_max_age_secs: 7 * 24 * 60 * 60,
            periodic_sync_interval: 3600,
            skip_waiting_on_install: true,
            sync_tag: "background-sync".to_string(),
            periodic_sync_tag: "periodic-sync".to_string(),
            notification: NotificationDefaults::default(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
