//! Resource wrappers.
//!
//! Each wrapper is a pure builder: given `&mut Stack` and the handles of
//! already-built dependencies, it declares one resource family and exposes
//! typed handles for the next wrapper. Construction order across wrappers
//! is fixed by the main-stack assembly in [`crate::app`].

pub mod alerting;
pub mod api;
pub mod authorizer;
pub mod bastion;
pub mod compute;
pub mod database;
pub mod monitoring;
pub mod network;
pub mod secrets;
