//! Response cache interface for read requests.
//!
//! The transport asks the cache before sending a read and stores the
//! decoded body afterwards. [`NullCache`] never holds anything.

use serde_json::Value;
use std::fmt::Debug;

/// Storage for read responses, keyed by [`ApiRequest::cache_key`](crate::request::ApiRequest::cache_key).
pub trait ResponseCache: Send + Sync + Debug {
    /// Look up a stored response.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a response.
    fn set(&self, key: &str, value: &Value);
}

/// Pass-through cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl ResponseCache for NullCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: &Value) {}
}
