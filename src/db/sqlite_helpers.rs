//! SQLite helper utilities for type conversion
//!
//! SQLite has no native UUID, timestamp or array types. Ids are stored as TEXT,
//! timestamps as RFC 3339 TEXT and lists as JSON TEXT.

use chrono::{SecondsFormat, Utc};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

// ============================================================================
// Id Helpers
// ============================================================================

/// Generate a new primary key value
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Timestamp Helpers
// ============================================================================

/// Current UTC time as RFC 3339 with microseconds, e.g. `2024-05-01T12:00:00.123456Z`.
///
/// Fixed width, so string comparison orders chronologically.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ============================================================================
// Array/Vec Helpers (stored as JSON strings in SQLite)
// ============================================================================

/// Serialize a Vec to a JSON string for SQLite storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a JSON string from SQLite to a Vec; invalid JSON yields an empty Vec
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}
