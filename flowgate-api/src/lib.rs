//! # Flowgate API Server Library
//!
//! HTTP surface over the identity service and the form-instance entity
//! manager.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `pagination`: Shared `start`/`size`/`sort`/`order` handling
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod pagination;
pub mod routes;
