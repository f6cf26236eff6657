//! Observability glue shared by the Postbox binaries.

pub mod tracing_setup;
