//! Deploy-time composition layer for Postbox.
//!
//! A [`stack::Stack`] collects resource declarations and hands out typed
//! handles; the wrapper modules under [`wrapper`] are pure builders that
//! consume already-built handles and declare one resource family each.
//! Synthesis validates the reference graph (unique logical ids, no cycles)
//! and emits a CloudFormation-style JSON template in construction order.
//! Deployment-engine semantics (rollback, idempotent re-apply) stay with
//! the external engine.

pub mod app;
pub mod graph;
pub mod stack;
pub mod template;
pub mod wrapper;
