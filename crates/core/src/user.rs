// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// The credential hash never leaves the storage layer; serialized views of a
/// user omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Database-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email, unique across all users.
    pub email: String,
    /// Argon2 credential hash. Skipped during serialization.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}
