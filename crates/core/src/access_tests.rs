// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::issue::{Priority, Status};
use crate::project::Role;
use chrono::Utc;
use yare::parameterized;

fn member_with_role(role: Role) -> ProjectMember {
    ProjectMember {
        id: 1,
        project_id: 10,
        user_id: 100,
        role,
        created_at: Utc::now(),
    }
}

fn issue_reported_by(reporter_id: i64) -> Issue {
    Issue {
        id: 1,
        project_id: 10,
        title: "Bug".to_string(),
        description: None,
        status: Status::Open,
        priority: Priority::Medium,
        reporter_id,
        assignee_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn check_membership_requires_a_row() {
    let mut db = Database::open_in_memory().unwrap();
    let alice = db.create_user("Alice", "alice@example.com", "hash").unwrap();
    let bob = db.create_user("Bob", "bob@example.com", "hash").unwrap();
    let project = db
        .create_project(
            &crate::project::NewProject {
                key: "TEST".to_string(),
                name: "Test".to_string(),
                description: None,
                start_date: None,
            },
            alice.id,
        )
        .unwrap();

    let member = check_membership(&db, project.id, alice.id).unwrap();
    assert!(member.is_maintainer());

    assert!(matches!(
        check_membership(&db, project.id, bob.id),
        Err(Error::NotAMember(_))
    ));

    // Nonexistent project reads the same as no membership.
    assert!(matches!(
        check_membership(&db, 999, alice.id),
        Err(Error::NotAMember(999))
    ));
}

#[test]
fn require_maintainer_checks_role() {
    assert!(require_maintainer(&member_with_role(Role::Maintainer), "add members").is_ok());
    assert!(matches!(
        require_maintainer(&member_with_role(Role::Member), "add members"),
        Err(Error::MaintainerOnly("add members"))
    ));
}

#[parameterized(
    maintainer_not_reporter = { Role::Maintainer, 999, true },
    maintainer_and_reporter = { Role::Maintainer, 100, true },
    member_reporter = { Role::Member, 100, true },
    member_not_reporter = { Role::Member, 999, false },
)]
fn reporter_or_maintainer_rule(role: Role, reporter_id: i64, allowed: bool) {
    let member = member_with_role(role);
    let issue = issue_reported_by(reporter_id);
    let result = require_reporter_or_maintainer(&member, &issue, member.user_id, "update issues");
    assert_eq!(result.is_ok(), allowed);
}

#[test]
fn gated_patch_rejected_for_plain_members() {
    let member = member_with_role(Role::Member);

    let ungated = IssuePatch {
        title: Some("New title".to_string()),
        priority: Some(Priority::High),
        ..IssuePatch::default()
    };
    assert!(check_patch_allowed(&member, &ungated).is_ok());

    let gated = IssuePatch {
        title: Some("New title".to_string()),
        status: Some(Status::Closed),
        ..IssuePatch::default()
    };
    assert!(matches!(
        check_patch_allowed(&member, &gated),
        Err(Error::MaintainerOnly(_))
    ));

    let unassign = IssuePatch {
        assignee_id: Some(None),
        ..IssuePatch::default()
    };
    assert!(check_patch_allowed(&member, &unassign).is_err());
}

#[test]
fn gated_patch_allowed_for_maintainers() {
    let member = member_with_role(Role::Maintainer);
    let patch = IssuePatch {
        status: Some(Status::Resolved),
        assignee_id: Some(Some(7)),
        ..IssuePatch::default()
    };
    assert!(check_patch_allowed(&member, &patch).is_ok());
}
