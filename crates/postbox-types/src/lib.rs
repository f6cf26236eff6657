//! Shared domain types for Postbox.
//!
//! This crate contains the core types used across the Postbox service:
//! the message entity, database credentials, deploy/runtime configuration,
//! and the error taxonomy the handlers map to HTTP statuses.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod credentials;
pub mod error;
pub mod message;
