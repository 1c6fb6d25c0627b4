// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Membership and authorization gate.
//!
//! Single source of truth for "can user U act on project P, and as what
//! role". Every decision is computed against the store per request; nothing
//! is cached, so a role change is visible to the very next operation.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::issue::{Issue, IssuePatch};
use crate::project::ProjectMember;

/// Fetch the membership row for (project, user), failing when there is none.
///
/// Called before any project- or issue-scoped read or write.
pub fn check_membership(db: &Database, project_id: i64, user_id: i64) -> Result<ProjectMember> {
    db.get_membership(project_id, user_id)?
        .ok_or(Error::NotAMember(project_id))
}

/// Require the maintainer role for the given action.
pub fn require_maintainer(member: &ProjectMember, action: &'static str) -> Result<()> {
    if member.is_maintainer() {
        Ok(())
    } else {
        Err(Error::MaintainerOnly(action))
    }
}

/// Require the caller to be the issue's reporter or a project maintainer.
pub fn require_reporter_or_maintainer(
    member: &ProjectMember,
    issue: &Issue,
    user_id: i64,
    action: &'static str,
) -> Result<()> {
    if member.is_maintainer() || issue.reporter_id == user_id {
        Ok(())
    } else {
        Err(Error::ReporterOrMaintainerOnly(action))
    }
}

/// Reject patches that touch maintainer-gated slots from non-maintainers.
///
/// Fails before anything is applied: a forbidden patch leaves the issue
/// entirely unmodified.
pub fn check_patch_allowed(member: &ProjectMember, patch: &IssuePatch) -> Result<()> {
    if !member.is_maintainer() && patch.touches_gated_fields() {
        return Err(Error::MaintainerOnly("change status and assignee"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
