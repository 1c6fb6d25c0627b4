// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use hub_core::{Config, Database, JwtIdentity, NewIssue, NewProject, Priority, Role};

struct Harness {
    tracker: Tracker,
    identity: JwtIdentity,
}

impl Harness {
    fn new() -> Self {
        Harness {
            tracker: Tracker::new(Database::open_in_memory().unwrap()),
            identity: JwtIdentity::new(&Config::default()),
        }
    }

    fn send(&mut self, request: ApiRequest) -> ApiResponse {
        dispatch(&mut self.tracker, &self.identity, request)
    }

    fn signup(&mut self, name: &str, email: &str) -> (i64, String) {
        let response = self.send(ApiRequest::Signup {
            name: name.to_string(),
            email: email.to_string(),
            password: "s3cret".to_string(),
        });
        match response {
            ApiResponse::Session { user, token } => (user.id, token),
            other => panic!("signup failed: {other:?}"),
        }
    }

    fn create_project(&mut self, token: &str, key: &str) -> i64 {
        let response = self.send(ApiRequest::CreateProject {
            token: token.to_string(),
            project: NewProject {
                key: key.to_string(),
                name: format!("{key} project"),
                description: None,
                start_date: None,
            },
        });
        match response {
            ApiResponse::Project(project) => project.id,
            other => panic!("create project failed: {other:?}"),
        }
    }

    fn create_issue(&mut self, token: &str, project_id: i64, title: &str) -> i64 {
        let response = self.send(ApiRequest::CreateIssue {
            token: token.to_string(),
            project_id,
            issue: NewIssue {
                title: title.to_string(),
                description: None,
                priority: Priority::Medium,
                assignee_id: None,
            },
        });
        match response {
            ApiResponse::Issue(issue) => issue.id,
            other => panic!("create issue failed: {other:?}"),
        }
    }
}

fn error_code(response: &ApiResponse) -> (&str, u16) {
    match response {
        ApiResponse::Error { error } => (error.code.as_str(), error.status),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn ping_and_shutdown() {
    let mut h = Harness::new();
    assert_eq!(h.send(ApiRequest::Ping), ApiResponse::Pong);
    assert_eq!(h.send(ApiRequest::Shutdown), ApiResponse::ShuttingDown);
}

#[test]
fn signup_then_me_round_trip() {
    let mut h = Harness::new();
    let (alice_id, token) = h.signup("Alice", "alice@example.com");

    match h.send(ApiRequest::Me { token }) {
        ApiResponse::User(user) => {
            assert_eq!(user.id, alice_id);
            assert_eq!(user.email, "alice@example.com");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn login_with_wrong_password_is_unauthenticated() {
    let mut h = Harness::new();
    h.signup("Alice", "alice@example.com");

    let response = h.send(ApiRequest::Login {
        email: "alice@example.com".to_string(),
        password: "wrong".to_string(),
    });
    assert_eq!(error_code(&response), ("UNAUTHENTICATED", 401));
}

#[test]
fn bad_token_is_rejected_before_the_operation_runs() {
    let mut h = Harness::new();
    let response = h.send(ApiRequest::ListProjects {
        token: "garbage".to_string(),
    });
    assert_eq!(error_code(&response), ("UNAUTHENTICATED", 401));
}

#[test]
fn duplicate_signup_is_a_conflict() {
    let mut h = Harness::new();
    h.signup("Alice", "alice@example.com");

    let response = h.send(ApiRequest::Signup {
        name: "Alice Again".to_string(),
        email: "alice@example.com".to_string(),
        password: "other".to_string(),
    });
    assert_eq!(error_code(&response), ("CONFLICT", 409));
}

#[test]
fn project_flow_over_the_wire() {
    let mut h = Harness::new();
    let (_alice, alice_token) = h.signup("Alice", "alice@example.com");
    let (bob_id, bob_token) = h.signup("Bob", "bob@example.com");
    let project_id = h.create_project(&alice_token, "HUB");

    // Bob is not a member yet.
    let response = h.send(ApiRequest::GetProject {
        token: bob_token.clone(),
        project_id,
    });
    assert_eq!(error_code(&response), ("FORBIDDEN", 403));

    let response = h.send(ApiRequest::AddMember {
        token: alice_token.clone(),
        project_id,
        email: "bob@example.com".to_string(),
        role: Role::Member,
    });
    match response {
        ApiResponse::Member(member) => assert_eq!(member.user_id, bob_id),
        other => panic!("unexpected response: {other:?}"),
    }

    match h.send(ApiRequest::ListMembers {
        token: bob_token,
        project_id,
    }) {
        ApiResponse::Members(members) => assert_eq!(members.len(), 2),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn duplicate_membership_carries_details() {
    let mut h = Harness::new();
    let (_alice, alice_token) = h.signup("Alice", "alice@example.com");
    let (bob_id, _bob_token) = h.signup("Bob", "bob@example.com");
    let project_id = h.create_project(&alice_token, "HUB");

    let add = ApiRequest::AddMember {
        token: alice_token,
        project_id,
        email: "bob@example.com".to_string(),
        role: Role::Member,
    };
    h.send(add.clone());
    match h.send(add) {
        ApiResponse::Error { error } => {
            assert_eq!(error.code, "CONFLICT");
            let details = error.details.unwrap();
            assert_eq!(details["project_id"], project_id);
            assert_eq!(details["user_id"], bob_id);
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn issue_update_and_listing_over_the_wire() {
    let mut h = Harness::new();
    let (_alice, alice_token) = h.signup("Alice", "alice@example.com");
    let project_id = h.create_project(&alice_token, "HUB");
    let issue_id = h.create_issue(&alice_token, project_id, "Login page crashes");
    h.create_issue(&alice_token, project_id, "Dashboard loads slowly");

    // Patch arrives as loose JSON, the way a client would send it.
    let patch = serde_json::from_str(r#"{"status": "in_progress"}"#).unwrap();
    match h.send(ApiRequest::UpdateIssue {
        token: alice_token.clone(),
        issue_id,
        patch,
    }) {
        ApiResponse::Issue(issue) => assert_eq!(issue.status.as_str(), "in_progress"),
        other => panic!("unexpected response: {other:?}"),
    }

    let request: ApiRequest = serde_json::from_value(serde_json::json!({
        "type": "ListIssues",
        "token": alice_token,
        "project_id": project_id,
        "filter": { "q": "login" },
    }))
    .unwrap();
    match h.send(request) {
        ApiResponse::Issues(issues) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].id, issue_id);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn delete_issue_acknowledges_then_404s() {
    let mut h = Harness::new();
    let (_alice, alice_token) = h.signup("Alice", "alice@example.com");
    let project_id = h.create_project(&alice_token, "HUB");
    let issue_id = h.create_issue(&alice_token, project_id, "Crash on save");

    assert_eq!(
        h.send(ApiRequest::DeleteIssue {
            token: alice_token.clone(),
            issue_id,
        }),
        ApiResponse::Deleted
    );

    let response = h.send(ApiRequest::GetIssue {
        token: alice_token,
        issue_id,
    });
    assert_eq!(error_code(&response), ("NOT_FOUND", 404));
}

#[test]
fn comment_flow_over_the_wire() {
    let mut h = Harness::new();
    let (alice_id, alice_token) = h.signup("Alice", "alice@example.com");
    let project_id = h.create_project(&alice_token, "HUB");
    let issue_id = h.create_issue(&alice_token, project_id, "Crash on save");

    match h.send(ApiRequest::CreateComment {
        token: alice_token.clone(),
        issue_id,
        body: "Reproduced on 1.2.0".to_string(),
    }) {
        ApiResponse::Comment(comment) => {
            assert_eq!(comment.author_id, alice_id);
            assert_eq!(comment.issue_id, issue_id);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    match h.send(ApiRequest::ListComments {
        token: alice_token,
        issue_id,
    }) {
        ApiResponse::Comments(comments) => assert_eq!(comments.len(), 1),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn internal_faults_never_leak_detail() {
    let response = error_response(&Error::CorruptedData("row 17 in /var/lib/hub".to_string()));
    match response {
        ApiResponse::Error { error } => {
            assert_eq!(error.code, "INTERNAL_ERROR");
            assert_eq!(error.status, 500);
            assert_eq!(error.message, "internal server error");
        }
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn validation_failures_are_422() {
    let mut h = Harness::new();
    let (_alice, alice_token) = h.signup("Alice", "alice@example.com");
    let (bob_id, _bob_token) = h.signup("Bob", "bob@example.com");
    let project_id = h.create_project(&alice_token, "HUB");

    // Bob exists but is not a member, so he cannot be assigned.
    let response = h.send(ApiRequest::CreateIssue {
        token: alice_token,
        project_id,
        issue: NewIssue {
            title: "Crash on save".to_string(),
            description: None,
            priority: Priority::High,
            assignee_id: Some(bob_id),
        },
    });
    match response {
        ApiResponse::Error { error } => {
            assert_eq!(error.code, "VALIDATION_ERROR");
            assert_eq!(error.status, 422);
            assert_eq!(error.details.unwrap()["assignee_id"], bob_id);
        }
        other => panic!("expected error, got {other:?}"),
    }
}
