//! Cache Module
//!
//! Named, versioned stores of request → response entries.

mod entry;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use entry::{CacheEntry, RequestKey};
pub use stats::CacheStats;
pub use storage::CacheStorage;
pub use store::Cache;
