// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Comment record: append-only child of an issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on an issue. No edit or delete operations exist; comments are
/// ordered by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Database-assigned identifier.
    pub id: i64,
    /// The issue this comment belongs to.
    pub issue_id: i64,
    /// The project member who wrote the comment. Fixed at creation.
    pub author_id: i64,
    /// The comment text.
    pub body: String,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}
