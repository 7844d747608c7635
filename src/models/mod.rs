//! Typed request and response models.
//!
//! Field names follow the wire format through `serde` renames; unknown
//! fields are ignored so newer API versions keep deserializing.

pub mod analytics;
pub mod insights;
pub mod personalization;
pub mod search;
