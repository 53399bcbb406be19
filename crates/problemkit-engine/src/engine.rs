//! The engine — configuration, message resolution and trace processing
//! composed into the public fault-handling operations.

use std::sync::Arc;

use http::StatusCode;
use problemkit_core::{
    EngineConfig, FaultLike, MemoryCatalog, MessageResolver, Problem, ProblemError, ThrownProblem,
};
use serde_json::Value;
use tracing::debug;

use crate::chain::ChainBuilder;
use crate::multi::{MultiProblem, ProblemElement};
use crate::resolver::KeyResolver;
use crate::trace::TracePipeline;

/// Turns caught faults into fully-populated, immutable problems.
///
/// One engine is built at startup and shared (`Arc`) across concurrent
/// fault-handling passes; every operation is synchronous and reads only
/// immutable state.
pub struct ProblemEngine {
    config: EngineConfig,
    messages: Arc<dyn MessageResolver>,
    pipeline: TracePipeline,
}

impl ProblemEngine {
    /// Engine with the standard trace pipeline.
    pub fn new(config: EngineConfig, messages: Arc<dyn MessageResolver>) -> Self {
        Self::with_pipeline(config, messages, TracePipeline::standard())
    }

    /// Engine with an explicitly composed trace pipeline.
    pub fn with_pipeline(
        config: EngineConfig,
        messages: Arc<dyn MessageResolver>,
        pipeline: TracePipeline,
    ) -> Self {
        Self {
            config,
            messages,
            pipeline,
        }
    }

    /// Engine with default configuration and an empty message catalog:
    /// every resolution degrades to its literal status-derived fallback.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default(), Arc::new(MemoryCatalog::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the problem for a caught fault, including its cause chain
    /// and processed stack trace (per configuration).
    pub fn problem_for(&self, fault: &dyn FaultLike, status: StatusCode) -> Problem {
        self.problem_scoped(fault, status, &[])
    }

    /// As [`ProblemEngine::problem_for`], with structural qualifiers
    /// refining the message lookup for the root fault (e.g. the
    /// offending type and field of a validation failure).
    pub fn problem_scoped(
        &self,
        fault: &dyn FaultLike,
        status: StatusCode,
        qualifiers: &[&str],
    ) -> Problem {
        ChainBuilder::new(&self.config, self.messages.as_ref(), &self.pipeline)
            .build(fault, status, qualifiers)
    }

    /// Build a problem directly from an error key, without a fault
    /// object. `default_detail` is the template to fall back on when the
    /// catalog has no entry; `args` are substituted positionally.
    pub fn problem_for_key(
        &self,
        status: StatusCode,
        error_key: &str,
        default_detail: Option<&str>,
        args: &[Value],
    ) -> Problem {
        self.keyed_problem(status, error_key, default_detail, args, &[])
    }

    pub(crate) fn keyed_problem(
        &self,
        status: StatusCode,
        error_key: &str,
        default_detail: Option<&str>,
        args: &[Value],
        parameters: &[(String, Value)],
    ) -> Problem {
        let resolved = KeyResolver::new(&self.config, self.messages.as_ref()).resolve(
            status,
            error_key,
            &[],
            default_detail,
            args,
        );

        let mut builder = Problem::builder()
            .code(resolved.code)
            .title(resolved.title)
            .detail(resolved.detail)
            .parameters(parameters.iter().cloned());

        if self.config.debug {
            if let Ok(descriptor) = serde_json::to_value(&resolved.lookups) {
                builder = builder.resolved_from(descriptor);
            }
        }

        builder.build()
    }

    /// Convert a fault into a raisable carrier: the built problem plus
    /// the frames captured on the fault, under the given status.
    pub fn throw(&self, fault: &dyn FaultLike, status: StatusCode) -> ThrownProblem {
        let problem = self.problem_for(fault, status);
        ThrownProblem::new(problem, fault.frames().to_vec(), Some(status))
    }

    /// Aggregate a heterogeneous batch into one [`MultiProblem`] under
    /// `status`. Ready problems pass through; deferred ones resolve with
    /// their own status/key/args; raw faults resolve through the
    /// fallback chain. Any malformed element fails the whole batch.
    pub fn aggregate(
        &self,
        status: StatusCode,
        elements: Vec<ProblemElement>,
    ) -> Result<MultiProblem, ProblemError> {
        if elements.is_empty() {
            return Err(ProblemError::EmptyAggregation);
        }
        let mut problems = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let problem = match element {
                ProblemElement::Ready(problem) => {
                    if !problem.is_well_formed() {
                        return Err(ProblemError::InvalidElement {
                            index,
                            reason: "blank code, title or detail".to_string(),
                        });
                    }
                    problem
                }
                ProblemElement::Deferred(deferred) => deferred.problem(self).clone(),
                ProblemElement::Fault(fault) => self.problem_for(&fault, status),
            };
            problems.push(problem);
        }
        debug!(count = problems.len(), status = status.as_u16(), "aggregated problem batch");
        MultiProblem::new(status, problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::DeferredProblem;
    use problemkit_core::Fault;

    fn engine_with_catalog() -> ProblemEngine {
        let catalog = MemoryCatalog::new();
        catalog.insert("title.billing.ChargeFault", "Charge Failed");
        catalog.insert("code.billing.ChargeFault", "billing-001");
        ProblemEngine::new(EngineConfig::default(), Arc::new(catalog))
    }

    #[test]
    fn unclassified_fault_gets_status_fallbacks() {
        let engine = ProblemEngine::with_defaults();
        let fault = Fault::new("some.UnknownFault", "disk full");
        let p = engine.problem_for(&fault, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(p.code(), "500");
        assert_eq!(p.title(), "Internal Server Error");
        assert_eq!(p.detail(), "disk full");
    }

    #[test]
    fn catalog_overrides_apply_per_kind() {
        let engine = engine_with_catalog();
        let fault = Fault::new("billing.ChargeFault", "card declined");
        let p = engine.problem_for(&fault, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(p.code(), "billing-001");
        assert_eq!(p.title(), "Charge Failed");
        assert_eq!(p.detail(), "card declined");
    }

    #[test]
    fn throw_carries_status_and_frames() {
        use problemkit_core::Frame;
        let engine = ProblemEngine::with_defaults();
        let fault = Fault::new("x", "boom").with_frames(vec![Frame::named("handler")]);
        let thrown = engine.throw(&fault, StatusCode::CONFLICT);
        assert_eq!(thrown.status(), Some(StatusCode::CONFLICT));
        assert_eq!(thrown.frames().len(), 1);
        assert_eq!(thrown.problem().code(), "409");
    }

    #[test]
    fn aggregate_two_faults_in_order() {
        let engine = ProblemEngine::with_defaults();
        let batch = engine
            .aggregate(
                StatusCode::BAD_REQUEST,
                vec![
                    Fault::new("a.Fault", "first").into(),
                    Fault::new("b.Fault", "second").into(),
                ],
            )
            .unwrap();
        assert_eq!(batch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.problems()[0].detail(), "first");
        assert_eq!(batch.problems()[1].detail(), "second");
    }

    #[test]
    fn aggregate_mixes_all_element_shapes() {
        let engine = engine_with_catalog();
        let ready = Problem::builder()
            .code("ready")
            .title("Ready")
            .detail("pre-built")
            .build();
        let deferred = DeferredProblem::pending(StatusCode::NOT_FOUND, "thing.Missing");

        let batch = engine
            .aggregate(
                StatusCode::BAD_REQUEST,
                vec![
                    ready.clone().into(),
                    deferred.into(),
                    Fault::new("billing.ChargeFault", "card declined").into(),
                ],
            )
            .unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.problems()[0], ready);
        // deferred element resolved under its own status
        assert_eq!(batch.problems()[1].code(), "404");
        assert_eq!(batch.problems()[2].code(), "billing-001");
    }

    #[test]
    fn aggregate_empty_batch_fails() {
        let engine = ProblemEngine::with_defaults();
        let err = engine.aggregate(StatusCode::BAD_REQUEST, vec![]).unwrap_err();
        assert!(matches!(err, ProblemError::EmptyAggregation));
    }

    #[test]
    fn aggregate_rejects_malformed_ready_problem() {
        let engine = ProblemEngine::with_defaults();
        let bad: Problem = serde_json::from_str(r#"{"code":"","title":"T","detail":"d"}"#).unwrap();
        let err = engine
            .aggregate(StatusCode::BAD_REQUEST, vec![bad.into()])
            .unwrap_err();
        assert!(matches!(err, ProblemError::InvalidElement { index: 0, .. }));
    }
}
