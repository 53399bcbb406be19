//! problemkit-engine — the fault-to-problem resolution engine.
//!
//! # Quick Start
//!
//! ```rust
//! use http::StatusCode;
//! use problemkit_core::Fault;
//! use problemkit_engine::ProblemEngine;
//!
//! let engine = ProblemEngine::with_defaults();
//! let fault = Fault::new("billing.ChargeFault", "card declined");
//! let problem = engine.problem_for(&fault, StatusCode::PAYMENT_REQUIRED);
//! assert_eq!(problem.code(), "402");
//! assert_eq!(problem.detail(), "card declined");
//! ```

mod chain;
pub mod deferred;
pub mod engine;
pub mod multi;
pub mod resolver;
pub mod trace;

pub use deferred::DeferredProblem;
pub use engine::ProblemEngine;
pub use multi::{MultiProblem, ProblemElement};
pub use resolver::{FieldLookup, KeyResolver, LookupTrace, Resolved};
pub use trace::{Identity, OverlapTrimmer, TracePipeline, TraceProcessor};
