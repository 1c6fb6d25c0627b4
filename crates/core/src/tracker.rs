// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gated service operations.
//!
//! [`Tracker`] ties the storage layer and the authorization gate together:
//! one method per operation of the service surface, each performing its
//! checks in a fixed order before touching any data.
//!
//! The check order is deliberately asymmetric, matching the observable
//! behavior of the API: project-scoped operations check membership before
//! project existence (a non-member cannot probe which project ids exist),
//! while issue-id operations check existence first (a missing issue is
//! not-found, an existing issue in a foreign project is forbidden).

use chrono::{Days, Utc};

use crate::access;
use crate::auth::Identity;
use crate::comment::Comment;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::issue::{Issue, IssueFilter, IssuePatch, NewIssue, SortKey};
use crate::project::{MemberProfile, NewProject, Project, ProjectMember, Role};
use crate::user::User;

/// Maximum number of days a project's start date may lie in the future.
const START_DATE_WINDOW_DAYS: u64 = 30;

/// An authenticated user together with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// The issue tracker service: storage plus per-request authorization.
pub struct Tracker {
    db: Database,
}

impl Tracker {
    /// Wrap an opened database.
    pub fn new(db: Database) -> Self {
        Tracker { db }
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Register a new user and issue their first token.
    pub fn signup(
        &mut self,
        identity: &dyn Identity,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let hash = identity.hash(password)?;
        let user = self.db.create_user(name, email, &hash)?;
        let token = identity.issue_token(user.id)?;
        Ok(Session { user, token })
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password fail identically so the response
    /// does not reveal which one was wrong.
    pub fn login(&self, identity: &dyn Identity, email: &str, password: &str) -> Result<Session> {
        let user = self
            .db
            .get_user_by_email(email)?
            .ok_or(Error::BadCredentials)?;
        if !identity.verify(password, &user.password_hash)? {
            return Err(Error::BadCredentials);
        }
        let token = identity.issue_token(user.id)?;
        Ok(Session { user, token })
    }

    /// Resolve a token to its user.
    ///
    /// A structurally valid token whose subject no longer exists is treated
    /// the same as an invalid one.
    pub fn authenticate(&self, identity: &dyn Identity, token: &str) -> Result<User> {
        let user_id = identity.resolve_token(token)?;
        self.db.get_user(user_id)?.ok_or(Error::InvalidToken)
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Create a project; the creator atomically becomes its maintainer.
    pub fn create_project(&mut self, user_id: i64, request: &NewProject) -> Result<Project> {
        if let Some(start) = request.start_date {
            let limit = Utc::now().date_naive() + Days::new(START_DATE_WINDOW_DAYS);
            if start > limit {
                return Err(Error::StartDateTooFar);
            }
        }
        self.db.create_project(request, user_id)
    }

    /// List exactly the projects where the user holds a membership.
    pub fn list_projects(&self, user_id: i64) -> Result<Vec<Project>> {
        self.db.list_projects_for_user(user_id)
    }

    /// Get a project. Membership is checked before existence.
    pub fn get_project(&self, project_id: i64, user_id: i64) -> Result<Project> {
        access::check_membership(&self.db, project_id, user_id)?;
        self.db.get_project(project_id)
    }

    /// Add a member by email. Maintainers only.
    pub fn add_member(
        &mut self,
        project_id: i64,
        requester_id: i64,
        email: &str,
        role: Role,
    ) -> Result<ProjectMember> {
        let member = access::check_membership(&self.db, project_id, requester_id)?;
        access::require_maintainer(&member, "add members")?;

        let user = self
            .db
            .get_user_by_email(email)?
            .ok_or_else(|| Error::UserNotFound(email.to_string()))?;

        self.db.add_member(project_id, user.id, role)
    }

    /// List a project's members with their identity. Any member may call.
    pub fn list_members(&self, project_id: i64, user_id: i64) -> Result<Vec<MemberProfile>> {
        access::check_membership(&self.db, project_id, user_id)?;
        self.db.list_members(project_id)
    }

    // ------------------------------------------------------------------
    // Issues
    // ------------------------------------------------------------------

    /// File a new issue. The reporter is the requester; status starts open.
    ///
    /// A given assignee must be a member of the same project at assignment
    /// time; membership is not re-validated afterwards.
    pub fn create_issue(
        &mut self,
        project_id: i64,
        requester_id: i64,
        request: &NewIssue,
    ) -> Result<Issue> {
        access::check_membership(&self.db, project_id, requester_id)?;

        if let Some(assignee_id) = request.assignee_id {
            if self.db.get_membership(project_id, assignee_id)?.is_none() {
                return Err(Error::AssigneeNotMember(assignee_id));
            }
        }

        self.db.create_issue(project_id, requester_id, request)
    }

    /// List a project's issues with filters and a sort key. Members only.
    pub fn list_issues(
        &self,
        project_id: i64,
        requester_id: i64,
        filter: &IssueFilter,
        sort: SortKey,
    ) -> Result<Vec<Issue>> {
        access::check_membership(&self.db, project_id, requester_id)?;
        self.db.list_issues(project_id, filter, sort)
    }

    /// Get an issue. Existence is checked before membership.
    pub fn get_issue(&self, issue_id: i64, requester_id: i64) -> Result<Issue> {
        let issue = self.db.get_issue(issue_id)?;
        access::check_membership(&self.db, issue.project_id, requester_id)?;
        Ok(issue)
    }

    /// Apply a partial update to an issue.
    ///
    /// The requester must be a member, and additionally the reporter or a
    /// maintainer. Non-maintainer reporters may not touch status or
    /// assignee; a rejected patch leaves the issue entirely unmodified.
    pub fn update_issue(
        &mut self,
        issue_id: i64,
        requester_id: i64,
        patch: &IssuePatch,
    ) -> Result<Issue> {
        let issue = self.db.get_issue(issue_id)?;
        let member = access::check_membership(&self.db, issue.project_id, requester_id)?;
        access::require_reporter_or_maintainer(&member, &issue, requester_id, "update issues")?;
        access::check_patch_allowed(&member, patch)?;

        self.db.apply_issue_patch(issue_id, patch)?;
        self.db.get_issue(issue_id)
    }

    /// Delete an issue; same permission rule as update. Comments cascade.
    pub fn delete_issue(&mut self, issue_id: i64, requester_id: i64) -> Result<()> {
        let issue = self.db.get_issue(issue_id)?;
        let member = access::check_membership(&self.db, issue.project_id, requester_id)?;
        access::require_reporter_or_maintainer(&member, &issue, requester_id, "delete issues")?;

        self.db.delete_issue(issue_id)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    /// List an issue's comments in creation order. Members only.
    pub fn list_comments(&self, issue_id: i64, requester_id: i64) -> Result<Vec<Comment>> {
        let issue = self.db.get_issue(issue_id)?;
        access::check_membership(&self.db, issue.project_id, requester_id)?;
        self.db.list_comments(issue_id)
    }

    /// Append a comment. The author is the requester.
    pub fn create_comment(
        &mut self,
        issue_id: i64,
        requester_id: i64,
        body: &str,
    ) -> Result<Comment> {
        let issue = self.db.get_issue(issue_id)?;
        access::check_membership(&self.db, issue.project_id, requester_id)?;
        self.db.add_comment(issue_id, requester_id, body)
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
