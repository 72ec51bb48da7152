//! Short-lived dedupe key for lead submissions.
//!
//! The key is the hex SHA-1 of `"{phone}|{minute}"`, where `minute` is
//! the Unix time divided by 60. Two submissions for the same phone in
//! the same minute share a key. It is informational: nothing stores or
//! enforces it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha1::{Digest, Sha1};
use utoipa::ToSchema;

/// Width of a dedupe window in seconds.
pub const DEDUPE_WINDOW_SECS: i64 = 60;

/// Hex-encoded dedupe key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct DedupeKey(String);

impl DedupeKey {
    /// Computes the key for `phone` at instant `at`.
    #[must_use]
    pub fn compute(phone: &str, at: DateTime<Utc>) -> Self {
        let bucket = at.timestamp().div_euclid(DEDUPE_WINDOW_SECS);
        let mut hasher = Sha1::new();
        hasher.update(format!("{phone}|{bucket}").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the key as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
