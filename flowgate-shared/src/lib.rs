//! # Flowgate Shared Library
//!
//! Domain types, query criteria, persistence and the identity service used by
//! the Flowgate API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, groups, memberships and form instances
//! - `query`: Fluent query criteria, sort orders and paging windows
//! - `persistence`: Data managers (Postgres and in-memory) and entity managers
//! - `identity`: Identity service built on the user and group entity managers
//! - `auth`: Password hashing
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod identity;
pub mod models;
pub mod persistence;
pub mod query;

/// Current version of the Flowgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
