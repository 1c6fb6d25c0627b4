// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_token = { Error::InvalidToken, ErrorKind::Unauthenticated },
    bad_credentials = { Error::BadCredentials, ErrorKind::Unauthenticated },
    not_a_member = { Error::NotAMember(1), ErrorKind::Forbidden },
    maintainer_only = { Error::MaintainerOnly("add members"), ErrorKind::Forbidden },
    project_not_found = { Error::ProjectNotFound(9), ErrorKind::NotFound },
    issue_not_found = { Error::IssueNotFound(9), ErrorKind::NotFound },
    duplicate_key = { Error::DuplicateProjectKey("TEST".into()), ErrorKind::Conflict },
    already_member = { Error::AlreadyMember { project_id: 1, user_id: 2 }, ErrorKind::Conflict },
    assignee_not_member = { Error::AssigneeNotMember(3), ErrorKind::Validation },
    start_date = { Error::StartDateTooFar, ErrorKind::Validation },
    invalid_status = { Error::InvalidStatus("bogus".into()), ErrorKind::Validation },
    corrupted = { Error::CorruptedData("bad row".into()), ErrorKind::Internal },
)]
fn error_kind_classification(error: Error, expected: ErrorKind) {
    assert_eq!(error.kind(), expected);
}

#[parameterized(
    unauthenticated = { ErrorKind::Unauthenticated, "UNAUTHENTICATED", 401 },
    forbidden = { ErrorKind::Forbidden, "FORBIDDEN", 403 },
    not_found = { ErrorKind::NotFound, "NOT_FOUND", 404 },
    conflict = { ErrorKind::Conflict, "CONFLICT", 409 },
    validation = { ErrorKind::Validation, "VALIDATION_ERROR", 422 },
    database = { ErrorKind::Database, "DATABASE_ERROR", 500 },
    internal = { ErrorKind::Internal, "INTERNAL_ERROR", 500 },
)]
fn kind_code_and_status(kind: ErrorKind, code: &str, status: u16) {
    assert_eq!(kind.code(), code);
    assert_eq!(kind.status(), status);
}

#[test]
fn storage_faults_do_not_expose_messages() {
    assert!(!ErrorKind::Database.exposes_message());
    assert!(!ErrorKind::Internal.exposes_message());
    assert!(ErrorKind::Forbidden.exposes_message());
    assert!(ErrorKind::Validation.exposes_message());
}

#[test]
fn error_messages_are_informative() {
    let err = Error::NotAMember(42);
    assert_eq!(err.to_string(), "not a member of project 42");

    let err = Error::MaintainerOnly("change status and assignee");
    assert!(err.to_string().contains("only maintainers"));

    let err = Error::InvalidStatus("bogus".into());
    assert!(err.to_string().contains("hint"));
}

#[test]
fn database_error_converts() {
    let err: Error = rusqlite::Error::InvalidQuery.into();
    assert!(matches!(err, Error::Database(_)));
    assert_eq!(err.kind(), ErrorKind::Database);
}
