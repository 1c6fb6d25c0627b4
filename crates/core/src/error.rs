// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for hub-core operations.
//!
//! Every failure carries enough context for a useful message, and [`Error::kind`]
//! classifies it into the coarse buckets the transport layer maps to response
//! codes. Storage faults are their own bucket so the transport can log the
//! detail and answer with a fixed message instead of raw database text.

use thiserror::Error;

/// All possible errors that can occur in hub-core operations.
#[derive(Debug, Error)]
pub enum Error {
    // -- authentication --
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("incorrect email or password")]
    BadCredentials,

    // -- authorization --
    #[error("not a member of project {0}")]
    NotAMember(i64),

    #[error("only maintainers can {0}")]
    MaintainerOnly(&'static str),

    #[error("only the reporter or a maintainer can {0}")]
    ReporterOrMaintainerOnly(&'static str),

    // -- not found --
    #[error("project not found: {0}")]
    ProjectNotFound(i64),

    #[error("issue not found: {0}")]
    IssueNotFound(i64),

    #[error("user not found: {0}")]
    UserNotFound(String),

    // -- conflict --
    #[error("project key already exists: '{0}'")]
    DuplicateProjectKey(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("user {user_id} is already a member of project {project_id}")]
    AlreadyMember { project_id: i64, user_id: i64 },

    // -- validation --
    #[error("assignee {0} is not a member of this project")]
    AssigneeNotMember(i64),

    #[error("start date must be within 30 days of today")]
    StartDateTooFar,

    #[error(
        "invalid status: '{0}'\n  hint: valid statuses are: open, in_progress, resolved, closed"
    )]
    InvalidStatus(String),

    #[error("invalid priority: '{0}'\n  hint: valid priorities are: low, medium, high, critical")]
    InvalidPriority(String),

    #[error("invalid role: '{0}'\n  hint: valid roles are: member, maintainer")]
    InvalidRole(String),

    #[error(
        "invalid sort key: '{0}'\n  hint: valid keys are: created_at, updated_at, status, priority"
    )]
    InvalidSortKey(String),

    #[error("{0}")]
    InvalidInput(String),

    // -- infrastructure --
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// Coarse classification of an [`Error`], used by the transport layer to
/// pick a response code and envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    Validation,
    Database,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code for the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Database => "DATABASE_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP-equivalent status for the error envelope.
    pub fn status(&self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Validation => 422,
            ErrorKind::Database | ErrorKind::Internal => 500,
        }
    }

    /// Returns true if the detailed message is safe to send to callers.
    ///
    /// Storage and internal faults are logged server-side only.
    pub fn exposes_message(&self) -> bool {
        !matches!(self, ErrorKind::Database | ErrorKind::Internal)
    }
}

impl Error {
    /// Classify this error for the transport layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidToken | Error::BadCredentials => ErrorKind::Unauthenticated,

            Error::NotAMember(_)
            | Error::MaintainerOnly(_)
            | Error::ReporterOrMaintainerOnly(_) => ErrorKind::Forbidden,

            Error::ProjectNotFound(_) | Error::IssueNotFound(_) | Error::UserNotFound(_) => {
                ErrorKind::NotFound
            }

            Error::DuplicateProjectKey(_)
            | Error::DuplicateEmail(_)
            | Error::AlreadyMember { .. } => ErrorKind::Conflict,

            Error::AssigneeNotMember(_)
            | Error::StartDateTooFar
            | Error::InvalidStatus(_)
            | Error::InvalidPriority(_)
            | Error::InvalidRole(_)
            | Error::InvalidSortKey(_)
            | Error::InvalidInput(_) => ErrorKind::Validation,

            Error::Database(_) => ErrorKind::Database,

            Error::Io(_)
            | Error::Json(_)
            | Error::Config(_)
            | Error::Hash(_)
            | Error::CorruptedData(_) => ErrorKind::Internal,
        }
    }
}

/// A specialized Result type for hub-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
