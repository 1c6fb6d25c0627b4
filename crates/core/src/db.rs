// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed storage for the issue tracker.
//!
//! The [`Database`] struct provides raw data access for users, projects,
//! memberships, issues, and comments. No authorization happens here; the
//! service layer in [`crate::tracker`] gates every call.
//!
//! Uniqueness of emails, project keys, and (project, user) membership pairs
//! is enforced by storage-level UNIQUE constraints, not application
//! pre-checks, so concurrent "query then insert" requests cannot both
//! succeed.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::comment::Comment;
use crate::error::{Error, Result};
use crate::issue::{Issue, IssueFilter, IssuePatch, NewIssue, SortKey};
use crate::project::{MemberProfile, NewProject, Project, ProjectMember, Role};
use crate::user::User;

/// SQL schema for the issue tracker database.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    start_date TEXT,
    created_at TEXT NOT NULL
);

-- Membership rows; one per (project, user) pair
CREATE TABLE IF NOT EXISTS project_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    created_at TEXT NOT NULL,
    UNIQUE (project_id, user_id),
    FOREIGN KEY (project_id) REFERENCES projects(id),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'open',
    priority TEXT NOT NULL DEFAULT 'medium',
    reporter_id INTEGER NOT NULL,
    assignee_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id),
    FOREIGN KEY (reporter_id) REFERENCES users(id),
    FOREIGN KEY (assignee_id) REFERENCES users(id)
);

-- Comments cascade with their issue
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    issue_id INTEGER NOT NULL,
    author_id INTEGER NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (issue_id) REFERENCES issues(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_members_user ON project_members(user_id);
CREATE INDEX IF NOT EXISTS idx_issues_project ON issues(project_id);
CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Returns true if the error is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn user_from_row(row: &Row<'_>) -> std::result::Result<User, rusqlite::Error> {
    let created_str: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

fn project_from_row(row: &Row<'_>) -> std::result::Result<Project, rusqlite::Error> {
    let start_str: Option<String> = row.get(4)?;
    let created_str: String = row.get(5)?;
    let start_date = match start_str {
        None => None,
        Some(s) => Some(parse_db::<NaiveDate>(&s, "start_date")?),
    };
    Ok(Project {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        start_date,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

fn member_from_row(row: &Row<'_>) -> std::result::Result<ProjectMember, rusqlite::Error> {
    let role_str: String = row.get(3)?;
    let created_str: String = row.get(4)?;
    Ok(ProjectMember {
        id: row.get(0)?,
        project_id: row.get(1)?,
        user_id: row.get(2)?,
        role: parse_db(&role_str, "role")?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

fn issue_from_row(row: &Row<'_>) -> std::result::Result<Issue, rusqlite::Error> {
    let status_str: String = row.get(4)?;
    let priority_str: String = row.get(5)?;
    let created_str: String = row.get(8)?;
    let updated_str: String = row.get(9)?;
    Ok(Issue {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: parse_db(&status_str, "status")?,
        priority: parse_db(&priority_str, "priority")?,
        reporter_id: row.get(6)?,
        assignee_id: row.get(7)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

fn comment_from_row(row: &Row<'_>) -> std::result::Result<Comment, rusqlite::Error> {
    let created_str: String = row.get(4)?;
    Ok(Comment {
        id: row.get(0)?,
        issue_id: row.get(1)?,
        author_id: row.get(2)?,
        body: row.get(3)?,
        created_at: parse_timestamp(&created_str, "created_at")?,
    })
}

const ISSUE_COLUMNS: &str = "id, project_id, title, description, status, priority,
             reporter_id, assignee_id, created_at, updated_at";

/// SQLite database connection with issue tracker operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys and WAL mode for concurrency
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Database { conn })
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Create a new user. Fails on duplicate email.
    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO users (name, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, email, password_hash, now.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::DuplicateEmail(email.to_string())
                } else {
                    Error::Database(e)
                }
            })?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    /// Get a user by id.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get a user by email (exact match).
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Projects & membership
    // ------------------------------------------------------------------

    /// Create a project and the creator's maintainer membership as one
    /// transaction. A project is never observable without a maintainer.
    pub fn create_project(&mut self, request: &NewProject, creator_id: i64) -> Result<Project> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO projects (key, name, description, start_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.key,
                request.name,
                request.description,
                request.start_date.map(|d| d.to_string()),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateProjectKey(request.key.clone())
            } else {
                Error::Database(e)
            }
        })?;

        let project_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO project_members (project_id, user_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                project_id,
                creator_id,
                Role::Maintainer.as_str(),
                now.to_rfc3339()
            ],
        )?;

        tx.commit()?;

        Ok(Project {
            id: project_id,
            key: request.key.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            start_date: request.start_date,
            created_at: now,
        })
    }

    /// Get a project by id.
    pub fn get_project(&self, id: i64) -> Result<Project> {
        let project = self
            .conn
            .query_row(
                "SELECT id, key, name, description, start_date, created_at
                 FROM projects WHERE id = ?1",
                params![id],
                project_from_row,
            )
            .optional()?;

        project.ok_or(Error::ProjectNotFound(id))
    }

    /// List the projects where the given user holds any membership.
    pub fn list_projects_for_user(&self, user_id: i64) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.key, p.name, p.description, p.start_date, p.created_at
             FROM projects p
             JOIN project_members m ON m.project_id = p.id
             WHERE m.user_id = ?1
             ORDER BY m.id",
        )?;

        let projects = stmt
            .query_map(params![user_id], project_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// Get the membership row for a (project, user) pair, if any.
    pub fn get_membership(&self, project_id: i64, user_id: i64) -> Result<Option<ProjectMember>> {
        let member = self
            .conn
            .query_row(
                "SELECT id, project_id, user_id, role, created_at
                 FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                member_from_row,
            )
            .optional()?;
        Ok(member)
    }

    /// Add a membership row. Fails if the pair already exists.
    pub fn add_member(&self, project_id: i64, user_id: i64, role: Role) -> Result<ProjectMember> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO project_members (project_id, user_id, role, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![project_id, user_id, role.as_str(), now.to_rfc3339()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyMember {
                        project_id,
                        user_id,
                    }
                } else {
                    Error::Database(e)
                }
            })?;

        Ok(ProjectMember {
            id: self.conn.last_insert_rowid(),
            project_id,
            user_id,
            role,
            created_at: now,
        })
    }

    /// List all members of a project joined with their user identity.
    pub fn list_members(&self, project_id: i64) -> Result<Vec<MemberProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.name, u.email, m.role
             FROM project_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.project_id = ?1
             ORDER BY m.id",
        )?;

        let members = stmt
            .query_map(params![project_id], |row| {
                let role_str: String = row.get(3)?;
                Ok(MemberProfile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    role: parse_db(&role_str, "role")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(members)
    }

    // ------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------

    /// Create a new issue. Status is always open; the reporter is fixed.
    pub fn create_issue(
        &self,
        project_id: i64,
        reporter_id: i64,
        request: &NewIssue,
    ) -> Result<Issue> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO issues (project_id, title, description, status, priority,
             reporter_id, assignee_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'open', ?4, ?5, ?6, ?7, ?7)",
            params![
                project_id,
                request.title,
                request.description,
                request.priority.as_str(),
                reporter_id,
                request.assignee_id,
                now.to_rfc3339(),
            ],
        )?;

        Ok(Issue {
            id: self.conn.last_insert_rowid(),
            project_id,
            title: request.title.clone(),
            description: request.description.clone(),
            status: crate::issue::Status::Open,
            priority: request.priority,
            reporter_id,
            assignee_id: request.assignee_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an issue by id.
    pub fn get_issue(&self, id: i64) -> Result<Issue> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?1");
        let issue = self
            .conn
            .query_row(&sql, params![id], issue_from_row)
            .optional()?;

        issue.ok_or(Error::IssueNotFound(id))
    }

    /// Apply the present slots of a patch to an issue.
    ///
    /// Refreshes `updated_at` whenever at least one slot is present, even if
    /// the new value equals the old one. An empty patch is a no-op.
    pub fn apply_issue_patch(&mut self, id: i64, patch: &IssuePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut sets = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = &patch.title {
            sets.push("title = ?");
            params_vec.push(Box::new(title.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            params_vec.push(Box::new(description.clone()));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            params_vec.push(Box::new(status.as_str()));
        }
        if let Some(priority) = patch.priority {
            sets.push("priority = ?");
            params_vec.push(Box::new(priority.as_str()));
        }
        if let Some(assignee) = &patch.assignee_id {
            sets.push("assignee_id = ?");
            params_vec.push(Box::new(*assignee));
        }

        sets.push("updated_at = ?");
        params_vec.push(Box::new(Utc::now().to_rfc3339()));
        params_vec.push(Box::new(id));

        let sql = format!(
            "UPDATE issues SET {} WHERE id = ?",
            sets.join(", ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let affected = self.conn.execute(&sql, params_refs.as_slice())?;

        if affected == 0 {
            return Err(Error::IssueNotFound(id));
        }
        Ok(())
    }

    /// Delete an issue. Its comments cascade.
    pub fn delete_issue(&mut self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM issues WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(Error::IssueNotFound(id));
        }
        Ok(())
    }

    /// List a project's issues with optional filters and a sort key.
    ///
    /// Filters combine with AND semantics. The title filter is a
    /// case-insensitive substring match.
    pub fn list_issues(
        &self,
        project_id: i64,
        filter: &IssueFilter,
        sort: SortKey,
    ) -> Result<Vec<Issue>> {
        let mut sql = format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE project_id = ?"
        );

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(project_id)];

        if let Some(q) = &filter.q {
            sql.push_str(" AND title LIKE ?");
            params_vec.push(Box::new(format!("%{q}%")));
        }
        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            params_vec.push(Box::new(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            sql.push_str(" AND priority = ?");
            params_vec.push(Box::new(priority.as_str()));
        }
        if let Some(assignee_id) = filter.assignee_id {
            sql.push_str(" AND assignee_id = ?");
            params_vec.push(Box::new(assignee_id));
        }

        // Timestamp sorts are newest-first; rank sorts break ties by id so
        // equal-timestamp rows order deterministically.
        let order = match sort {
            SortKey::CreatedAt => " ORDER BY created_at DESC, id DESC",
            SortKey::UpdatedAt => " ORDER BY updated_at DESC, id DESC",
            SortKey::Status => {
                " ORDER BY CASE status
                     WHEN 'open' THEN 0
                     WHEN 'in_progress' THEN 1
                     WHEN 'resolved' THEN 2
                     ELSE 3 END, id"
            }
            SortKey::Priority => {
                " ORDER BY CASE priority
                     WHEN 'critical' THEN 0
                     WHEN 'high' THEN 1
                     WHEN 'medium' THEN 2
                     ELSE 3 END, id"
            }
        };
        sql.push_str(order);

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// Append a comment to an issue.
    pub fn add_comment(&self, issue_id: i64, author_id: i64, body: &str) -> Result<Comment> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO comments (issue_id, author_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![issue_id, author_id, body, now.to_rfc3339()],
        )?;

        Ok(Comment {
            id: self.conn.last_insert_rowid(),
            issue_id,
            author_id,
            body: body.to_string(),
            created_at: now,
        })
    }

    /// Get all comments for an issue, ordered by creation time ascending.
    pub fn list_comments(&self, issue_id: i64) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, issue_id, author_id, body, created_at
             FROM comments WHERE issue_id = ?1 ORDER BY created_at, id",
        )?;

        let comments = stmt
            .query_map(params![issue_id], comment_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
