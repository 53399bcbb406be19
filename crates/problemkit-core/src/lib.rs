//! problemkit-core — foundation types and contracts for ProblemKit.
//!
//! This crate defines:
//! - [`Problem`] — the immutable RFC 7807-style problem value
//! - [`Problem::builder`] — staged, order-enforced construction
//! - [`Fault`] / [`FaultLike`] — the fault-shaped input contract
//! - [`ThrownProblem`] — a raisable fault that carries a problem
//! - [`MessageResolver`] / [`MemoryCatalog`] — localized message lookup
//! - [`EngineConfig`] — the explicit configuration snapshot

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fault;
pub mod types;

pub use builder::{CodeStage, DetailStage, ProblemBuilder, TitleStage};
pub use catalog::{expand_template, MemoryCatalog, MessageResolver};
pub use config::EngineConfig;
pub use error::ProblemError;
pub use fault::{Fault, FaultLike, ThrownProblem};
pub use types::{is_reserved_key, Frame, Problem, KEY_RESOLVED_FROM, KEY_STACK_TRACE, RESERVED_KEYS};
