//! Cause-chain capture — recursively turn a fault and its nested causes
//! into a linked [`Problem`] chain.

use http::StatusCode;
use problemkit_core::{EngineConfig, FaultLike, MessageResolver, Problem};
use tracing::debug;

use crate::resolver::KeyResolver;
use crate::trace::TracePipeline;

/// Builds one problem per fault in the cause chain.
///
/// Recursion follows the fault's own `cause()` pointers. Because
/// [`FaultLike`] is an open trait, acyclicity cannot be assumed from the
/// fault model: a visited set over fault object identity guards against
/// a pathological self-referential cause, terminating the chain at the
/// first repeat.
pub(crate) struct ChainBuilder<'a> {
    config: &'a EngineConfig,
    resolver: KeyResolver<'a>,
    pipeline: &'a TracePipeline,
}

impl<'a> ChainBuilder<'a> {
    pub(crate) fn new(
        config: &'a EngineConfig,
        messages: &'a dyn MessageResolver,
        pipeline: &'a TracePipeline,
    ) -> Self {
        Self {
            config,
            resolver: KeyResolver::new(config, messages),
            pipeline,
        }
    }

    /// Build the problem for `fault`, with nested causes while the
    /// cause-chain switch is on. `qualifiers` apply to the root only.
    pub(crate) fn build(
        &self,
        fault: &dyn FaultLike,
        status: StatusCode,
        qualifiers: &[&str],
    ) -> Problem {
        let mut visited: Vec<*const ()> = vec![identity(fault)];
        self.build_level(fault, status, qualifiers, &mut visited)
    }

    fn build_level(
        &self,
        fault: &dyn FaultLike,
        status: StatusCode,
        qualifiers: &[&str],
        visited: &mut Vec<*const ()>,
    ) -> Problem {
        let resolved =
            self.resolver
                .resolve(status, fault.kind(), qualifiers, Some(fault.message()), &[]);

        let cause = if self.config.cause_chains {
            fault.cause().and_then(|inner| {
                let id = identity(inner);
                if visited.contains(&id) {
                    debug!(kind = inner.kind(), "cyclic cause pointer; chain terminated");
                    return None;
                }
                visited.push(id);
                Some(self.build_level(inner, status, &[], visited))
            })
        } else {
            None
        };

        let mut builder = Problem::builder()
            .code(resolved.code)
            .title(resolved.title)
            .detail(resolved.detail)
            .cause_opt(cause);

        if self.config.stack_traces && !fault.frames().is_empty() {
            let cause_frames = if self.config.cause_chains {
                fault.cause().map(|c| c.frames())
            } else {
                None
            };
            let frames = self.pipeline.run(fault.frames().to_vec(), cause_frames);
            builder = builder.stack_trace(&frames);
        }

        if self.config.debug {
            if let Ok(descriptor) = serde_json::to_value(&resolved.lookups) {
                builder = builder.resolved_from(descriptor);
            }
        }

        builder.build()
    }
}

fn identity(fault: &dyn FaultLike) -> *const () {
    fault as *const dyn FaultLike as *const ()
}
