//! Request-path logic for Postbox.
//!
//! This crate defines the "ports" (store and credential traits) that the
//! infrastructure layer implements, plus the pure pieces of the request
//! path: bearer-claim extraction and input validation. It depends only on
//! `postbox-types` -- never on `postbox-infra` or any database/IO crate.

pub mod auth;
pub mod repository;
pub mod validate;
