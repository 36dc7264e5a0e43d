//! # Execution Engine Module
//!
//! Per-call orchestration of the invocation state machine:
//!
//! ```text
//! BUILD_TEMPLATE → INTERCEPT → DISPATCH → EXTRACT
//!                      └────────── suppressible ──────────┘
//! ```
//!
//! Template-construction failures are always fatal. Once the per-call
//! [`RequestContext`](crate::context::RequestContext) exists, a fault from
//! the later stages is swallowed — the call returns `Ok(None)` — when a
//! matched error receiver absorbed the failing response; otherwise it
//! propagates with full request/response context attached. The context and
//! its error-handled signal are owned by the call and dropped on every exit
//! path.

mod core;

pub use core::ExecutionEngine;
