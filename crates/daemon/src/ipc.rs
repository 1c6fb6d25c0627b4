// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for the hub daemon.
//!
//! Messages are serialized as JSON with length-prefixed framing. Every
//! request except signup, login, and ping carries the caller's access token;
//! the daemon resolves it per request and never holds session state.

use serde::{Deserialize, Serialize};

use hub_core::{
    Comment, Issue, IssueFilter, IssuePatch, MemberProfile, NewIssue, NewProject, Project,
    ProjectMember, Role, SortKey, User,
};

/// Request sent from a client to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ApiRequest {
    /// Ping to check if the daemon is alive.
    Ping,
    /// Graceful shutdown.
    Shutdown,
    /// Register a new account and receive a token.
    Signup {
        name: String,
        email: String,
        password: String,
    },
    /// Exchange credentials for a token.
    Login { email: String, password: String },
    /// Return the authenticated user.
    Me { token: String },
    /// Create a project; the caller becomes its maintainer.
    CreateProject { token: String, project: NewProject },
    /// List the caller's projects.
    ListProjects { token: String },
    /// Get a single project the caller is a member of.
    GetProject { token: String, project_id: i64 },
    /// Add a user to a project by email. Maintainers only.
    AddMember {
        token: String,
        project_id: i64,
        email: String,
        role: Role,
    },
    /// List a project's members.
    ListMembers { token: String, project_id: i64 },
    /// File an issue in a project.
    CreateIssue {
        token: String,
        project_id: i64,
        issue: NewIssue,
    },
    /// List a project's issues with optional filters and a sort key.
    ListIssues {
        token: String,
        project_id: i64,
        #[serde(default)]
        filter: IssueFilter,
        #[serde(default)]
        sort: SortKey,
    },
    /// Get a single issue.
    GetIssue { token: String, issue_id: i64 },
    /// Apply a partial update to an issue.
    UpdateIssue {
        token: String,
        issue_id: i64,
        patch: IssuePatch,
    },
    /// Delete an issue and its comments.
    DeleteIssue { token: String, issue_id: i64 },
    /// List an issue's comments in creation order.
    ListComments { token: String, issue_id: i64 },
    /// Append a comment to an issue.
    CreateComment {
        token: String,
        issue_id: i64,
        body: String,
    },
}

/// Response sent from the daemon to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ApiResponse {
    /// Pong response.
    Pong,
    /// Shutdown acknowledged.
    ShuttingDown,
    /// A user together with a fresh token (signup and login).
    Session { user: User, token: String },
    /// The authenticated user.
    User(User),
    /// A single project.
    Project(Project),
    /// The caller's projects.
    Projects(Vec<Project>),
    /// A membership row.
    Member(ProjectMember),
    /// A project's roster.
    Members(Vec<MemberProfile>),
    /// A single issue.
    Issue(Issue),
    /// An issue listing.
    Issues(Vec<Issue>),
    /// A single comment.
    Comment(Comment),
    /// An issue's comments.
    Comments(Vec<Comment>),
    /// Deletion acknowledged.
    Deleted,
    /// Error envelope.
    Error { error: ErrorBody },
}

/// The error envelope carried by [`ApiResponse::Error`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// HTTP-equivalent status for the failure.
    pub status: u16,
    /// Stable machine-readable code, e.g. `FORBIDDEN`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Structured context for some failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use super::*;

    /// Maximum message size (1MB) to prevent malformed requests from causing hangs.
    const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

    /// Read a request from the given reader.
    pub fn read_request<R: Read>(reader: &mut R) -> std::io::Result<ApiRequest> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
    }

    /// Write a response to the given writer.
    pub fn write_response<W: Write>(writer: &mut W, response: &ApiResponse) -> std::io::Result<()> {
        let json = serde_json::to_vec(response)
            .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ipc_tests.rs"]
mod tests;
