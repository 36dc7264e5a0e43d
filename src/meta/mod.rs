//! # Metadata Module
//!
//! Compilation of declarative endpoint configuration into immutable
//! [`EndpointMetadata`], the per-method HTTP binding everything downstream
//! consumes.
//!
//! Compilation happens once per client at build time. Each method gets its
//! path template (base path + method path), HTTP method, content type,
//! envelope mode, and an ordered list of [`FieldDescriptor`]s partitioned
//! into path/query/body/header buckets. Call-time argument binding is
//! positional against the ordered list.

mod build;
mod types;

pub use build::*;
pub use types::*;
