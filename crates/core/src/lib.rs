// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hub-core: Shared library for the hub issue tracker
//!
//! This crate provides the data model, SQLite storage, identity provider,
//! and the gated service operations used by the hubd daemon.

pub mod access;
pub mod auth;
pub mod comment;
pub mod config;
pub mod db;
pub mod error;
pub mod issue;
pub mod project;
pub mod tracker;
pub mod user;

pub use auth::{Identity, JwtIdentity};
pub use comment::Comment;
pub use config::Config;
pub use db::Database;
pub use error::{Error, ErrorKind, Result};
pub use issue::{Issue, IssueFilter, IssuePatch, NewIssue, Priority, SortKey, Status};
pub use project::{MemberProfile, NewProject, Project, ProjectMember, Role};
pub use tracker::{Session, Tracker};
pub use user::User;
