//! Deferred problems — a status paired with either a ready problem or a
//! pending `(error_key, default_detail, args)` resolution.

use http::StatusCode;
use problemkit_core::{is_reserved_key, Problem};
use serde_json::Value;
use std::sync::OnceLock;

use crate::engine::ProblemEngine;

/// A problem whose resolution is postponed until a collaborator asks
/// for it. Resolution happens at most once; the result is cached.
#[derive(Debug)]
pub struct DeferredProblem {
    status: StatusCode,
    seed: Seed,
    resolved: OnceLock<Problem>,
}

#[derive(Debug)]
enum Seed {
    Ready(Problem),
    Pending {
        error_key: String,
        default_detail: Option<String>,
        args: Vec<Value>,
        parameters: Vec<(String, Value)>,
    },
}

impl DeferredProblem {
    /// Carry an already-built problem under a status.
    pub fn ready(status: StatusCode, problem: Problem) -> Self {
        Self {
            status,
            seed: Seed::Ready(problem),
            resolved: OnceLock::new(),
        }
    }

    /// Defer resolution of `error_key` until the problem is requested.
    pub fn pending(status: StatusCode, error_key: impl Into<String>) -> Self {
        Self {
            status,
            seed: Seed::Pending {
                error_key: error_key.into(),
                default_detail: None,
                args: Vec::new(),
                parameters: Vec::new(),
            },
            resolved: OnceLock::new(),
        }
    }

    /// Detail template to fall back on when the catalog has no entry.
    /// No effect on a ready problem.
    pub fn with_default_detail(mut self, detail: impl Into<String>) -> Self {
        if let Seed::Pending { default_detail, .. } = &mut self.seed {
            *default_detail = Some(detail.into());
        }
        self
    }

    /// Positional args substituted into the resolved detail template.
    /// No effect on a ready problem.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        if let Seed::Pending { args: slot, .. } = &mut self.seed {
            *slot = args;
        }
        self
    }

    /// Context entry carried onto the resolved problem.
    /// No effect on a ready problem.
    ///
    /// # Panics
    /// Panics if `key` is reserved, same as the problem builder.
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        assert!(
            !is_reserved_key(&key),
            "parameter key '{key}' is reserved and would shadow a problem field"
        );
        if let Seed::Pending { parameters, .. } = &mut self.seed {
            parameters.push((key, value));
        }
        self
    }

    /// The status this problem renders under.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Resolve (once) and return the concrete problem.
    pub fn problem(&self, engine: &ProblemEngine) -> &Problem {
        self.resolved.get_or_init(|| match &self.seed {
            Seed::Ready(problem) => problem.clone(),
            Seed::Pending {
                error_key,
                default_detail,
                args,
                parameters,
            } => engine.keyed_problem(
                self.status,
                error_key,
                default_detail.as_deref(),
                args,
                parameters,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use problemkit_core::{EngineConfig, MemoryCatalog};
    use std::sync::Arc;

    fn engine() -> ProblemEngine {
        let catalog = MemoryCatalog::new();
        catalog.insert("detail.quota.Exceeded", "used {0} of {1}");
        ProblemEngine::new(EngineConfig::default(), Arc::new(catalog))
    }

    #[test]
    fn ready_problem_passes_through() {
        let p = Problem::builder()
            .code("x")
            .title("X")
            .detail("already built")
            .build();
        let deferred = DeferredProblem::ready(StatusCode::CONFLICT, p.clone());
        assert_eq!(deferred.problem(&engine()), &p);
        assert_eq!(deferred.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn pending_resolves_with_args_and_parameters() {
        let deferred = DeferredProblem::pending(StatusCode::TOO_MANY_REQUESTS, "quota.Exceeded")
            .with_args(vec![101.into(), 100.into()])
            .with_parameter("tenant", "acme".into());

        let e = engine();
        let p = deferred.problem(&e);
        assert_eq!(p.code(), "429");
        assert_eq!(p.detail(), "used 101 of 100");
        assert_eq!(p.parameter("tenant"), Some(&Value::from("acme")));
    }

    #[test]
    fn resolution_is_cached() {
        let deferred = DeferredProblem::pending(StatusCode::NOT_FOUND, "thing.Missing");
        let e = engine();
        let first = deferred.problem(&e) as *const Problem;
        let second = deferred.problem(&e) as *const Problem;
        assert_eq!(first, second);
    }

    #[test]
    fn default_detail_used_on_catalog_miss() {
        let deferred = DeferredProblem::pending(StatusCode::NOT_FOUND, "thing.Missing")
            .with_default_detail("thing {0} does not exist")
            .with_args(vec!["t-9".into()]);
        let p = deferred.problem(&engine());
        assert_eq!(p.detail(), "thing t-9 does not exist");
        assert_eq!(p.title(), "Not Found");
    }

    #[test]
    #[should_panic(expected = "reserved")]
    fn reserved_parameter_key_panics() {
        let _ = DeferredProblem::pending(StatusCode::NOT_FOUND, "x").with_parameter("cause", Value::Null);
    }
}
