// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project and membership types.
//!
//! A project is the tenancy boundary: every issue belongs to exactly one
//! project, and every project-scoped operation is gated on a membership row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Role a user holds within a single project.
///
/// Roles are project-scoped: the same user may be maintainer in one project
/// and plain member in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Baseline role: view, create issues and comments, edit own issues'
    /// ungated fields.
    Member,
    /// Elevated role: status/assignee changes, member addition, edit or
    /// delete any issue.
    Maintainer,
}

impl Role {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Maintainer => "maintainer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "maintainer" => Ok(Role::Maintainer),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// A project: the container for issues and memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Database-assigned identifier.
    pub id: i64,
    /// Globally unique human-readable key (case-sensitive exact match).
    pub key: String,
    /// Display name.
    pub name: String,
    /// Longer description providing context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional planned start date. Validated once, at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Membership row relating a (project, user) pair with a role.
///
/// Unique per pair; a second add for the same pair always fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMember {
    /// Database-assigned identifier.
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub role: Role,
    /// When the membership was granted.
    pub created_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Role equality check used by every maintainer gate.
    pub fn is_maintainer(&self) -> bool {
        self.role == Role::Maintainer
    }
}

/// A membership row joined with the member's identity, as returned by the
/// member listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// The member's user id.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
