// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: authenticate, call the service, wrap the outcome.
//!
//! Storage and internal faults are logged here and answered with a fixed
//! message; every other failure is forwarded to the caller verbatim inside
//! the error envelope.

use serde_json::json;

use hub_core::{Error, Identity, Result, Session, Tracker};

use crate::ipc::{ApiRequest, ApiResponse, ErrorBody};

/// Handle one request against the tracker, producing exactly one response.
pub fn dispatch(tracker: &mut Tracker, identity: &dyn Identity, request: ApiRequest) -> ApiResponse {
    match handle(tracker, identity, request) {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

fn handle(
    tracker: &mut Tracker,
    identity: &dyn Identity,
    request: ApiRequest,
) -> Result<ApiResponse> {
    match request {
        ApiRequest::Ping => Ok(ApiResponse::Pong),
        ApiRequest::Shutdown => Ok(ApiResponse::ShuttingDown),

        ApiRequest::Signup {
            name,
            email,
            password,
        } => {
            let session = tracker.signup(identity, &name, &email, &password)?;
            Ok(session_response(session))
        }
        ApiRequest::Login { email, password } => {
            let session = tracker.login(identity, &email, &password)?;
            Ok(session_response(session))
        }
        ApiRequest::Me { token } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::User(user))
        }

        ApiRequest::CreateProject { token, project } => {
            let user = tracker.authenticate(identity, &token)?;
            let project = tracker.create_project(user.id, &project)?;
            Ok(ApiResponse::Project(project))
        }
        ApiRequest::ListProjects { token } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Projects(tracker.list_projects(user.id)?))
        }
        ApiRequest::GetProject { token, project_id } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Project(
                tracker.get_project(project_id, user.id)?,
            ))
        }
        ApiRequest::AddMember {
            token,
            project_id,
            email,
            role,
        } => {
            let user = tracker.authenticate(identity, &token)?;
            let member = tracker.add_member(project_id, user.id, &email, role)?;
            Ok(ApiResponse::Member(member))
        }
        ApiRequest::ListMembers { token, project_id } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Members(
                tracker.list_members(project_id, user.id)?,
            ))
        }

        ApiRequest::CreateIssue {
            token,
            project_id,
            issue,
        } => {
            let user = tracker.authenticate(identity, &token)?;
            let issue = tracker.create_issue(project_id, user.id, &issue)?;
            Ok(ApiResponse::Issue(issue))
        }
        ApiRequest::ListIssues {
            token,
            project_id,
            filter,
            sort,
        } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Issues(
                tracker.list_issues(project_id, user.id, &filter, sort)?,
            ))
        }
        ApiRequest::GetIssue { token, issue_id } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Issue(tracker.get_issue(issue_id, user.id)?))
        }
        ApiRequest::UpdateIssue {
            token,
            issue_id,
            patch,
        } => {
            let user = tracker.authenticate(identity, &token)?;
            let issue = tracker.update_issue(issue_id, user.id, &patch)?;
            Ok(ApiResponse::Issue(issue))
        }
        ApiRequest::DeleteIssue { token, issue_id } => {
            let user = tracker.authenticate(identity, &token)?;
            tracker.delete_issue(issue_id, user.id)?;
            Ok(ApiResponse::Deleted)
        }

        ApiRequest::ListComments { token, issue_id } => {
            let user = tracker.authenticate(identity, &token)?;
            Ok(ApiResponse::Comments(
                tracker.list_comments(issue_id, user.id)?,
            ))
        }
        ApiRequest::CreateComment {
            token,
            issue_id,
            body,
        } => {
            let user = tracker.authenticate(identity, &token)?;
            let comment = tracker.create_comment(issue_id, user.id, &body)?;
            Ok(ApiResponse::Comment(comment))
        }
    }
}

fn session_response(session: Session) -> ApiResponse {
    ApiResponse::Session {
        user: session.user,
        token: session.token,
    }
}

fn error_response(err: &Error) -> ApiResponse {
    let kind = err.kind();
    let message = if kind.exposes_message() {
        err.to_string()
    } else {
        tracing::error!("request failed: {err}");
        "internal server error".to_string()
    };

    let details = match err {
        Error::AlreadyMember {
            project_id,
            user_id,
        } => Some(json!({ "project_id": project_id, "user_id": user_id })),
        Error::AssigneeNotMember(id) => Some(json!({ "assignee_id": id })),
        _ => None,
    };

    ApiResponse::Error {
        error: ErrorBody {
            status: kind.status(),
            code: kind.code().to_string(),
            message,
            details,
        },
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
