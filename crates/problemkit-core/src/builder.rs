//! Staged construction of [`Problem`] values.
//!
//! The stages are distinct types, so field order is enforced at compile
//! time: `code` before `title`, `title` before `detail`, everything else
//! after. Misuse that cannot be caught by types (blank required fields,
//! reserved parameter keys) is a programmer error and panics at the call
//! site.
//!
//! ```rust
//! use problemkit_core::Problem;
//!
//! let p = Problem::builder()
//!     .code("quota.exceeded")
//!     .title("Quota Exceeded")
//!     .detail_template("Limit of {0} requests reached", &[100.into()])
//!     .parameter("limit", 100.into())
//!     .build();
//! assert_eq!(p.detail(), "Limit of 100 requests reached");
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::catalog::expand_template;
use crate::types::{is_reserved_key, Frame, Problem, KEY_RESOLVED_FROM, KEY_STACK_TRACE};

/// First stage: only `code` can be set.
#[must_use]
pub struct CodeStage {
    _priv: (),
}

impl CodeStage {
    pub(crate) fn new() -> Self {
        Self { _priv: () }
    }

    /// Set the error code.
    ///
    /// # Panics
    /// Panics if `code` is blank.
    pub fn code(self, code: impl Into<String>) -> TitleStage {
        let code = code.into();
        assert!(!code.trim().is_empty(), "problem code must not be blank");
        TitleStage { code }
    }
}

/// Second stage: `code` is set, `title` is next.
#[must_use]
pub struct TitleStage {
    code: String,
}

impl TitleStage {
    /// Set the title.
    ///
    /// # Panics
    /// Panics if `title` is blank.
    pub fn title(self, title: impl Into<String>) -> DetailStage {
        let title = title.into();
        assert!(!title.trim().is_empty(), "problem title must not be blank");
        DetailStage {
            code: self.code,
            title,
        }
    }
}

/// Third stage: `detail` is next, either literal or from a template.
#[must_use]
pub struct DetailStage {
    code: String,
    title: String,
}

impl DetailStage {
    /// Set the detail text verbatim.
    ///
    /// # Panics
    /// Panics if `detail` is blank.
    pub fn detail(self, detail: impl Into<String>) -> ProblemBuilder {
        let detail = detail.into();
        assert!(!detail.trim().is_empty(), "problem detail must not be blank");
        ProblemBuilder {
            code: self.code,
            title: self.title,
            detail,
            cause: None,
            parameters: IndexMap::new(),
        }
    }

    /// Set the detail from a template with `{0}`-style positional args.
    ///
    /// # Panics
    /// Panics if the expanded detail is blank.
    pub fn detail_template(self, template: &str, args: &[Value]) -> ProblemBuilder {
        self.detail(expand_template(template, args))
    }
}

/// Final stage: optional cause and parameters, then `build()`.
#[must_use]
pub struct ProblemBuilder {
    code: String,
    title: String,
    detail: String,
    cause: Option<Box<Problem>>,
    parameters: IndexMap<String, Value>,
}

impl ProblemBuilder {
    /// Attach a nested cause problem.
    pub fn cause(mut self, cause: Problem) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Attach a cause only when one exists.
    pub fn cause_opt(mut self, cause: Option<Problem>) -> Self {
        self.cause = cause.map(Box::new);
        self
    }

    /// Add one context entry. Entries keep insertion order; setting the
    /// same key twice keeps the original position and the latest value.
    ///
    /// # Panics
    /// Panics if `key` is one of the reserved keys (`code`, `title`,
    /// `detail`, `cause`, or an internal diagnostic key).
    pub fn parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        assert!(
            !is_reserved_key(&key),
            "parameter key '{key}' is reserved and would shadow a problem field"
        );
        self.parameters.insert(key, value);
        self
    }

    /// Add many context entries at once, in iteration order.
    ///
    /// # Panics
    /// Panics on the first reserved key, as [`ProblemBuilder::parameter`].
    pub fn parameters<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in entries {
            self = self.parameter(key, value);
        }
        self
    }

    /// Attach a processed stack trace under the internal trace key.
    /// This bypasses the reserved-key guard on purpose: the key is
    /// reserved precisely so only this path can write it.
    pub fn stack_trace(mut self, frames: &[Frame]) -> Self {
        if let Ok(value) = serde_json::to_value(frames) {
            self.parameters.insert(KEY_STACK_TRACE.to_string(), value);
        }
        self
    }

    /// Attach resolver lookup descriptors under the internal debug key.
    /// Diagnostic output only; consumers must not branch on it.
    pub fn resolved_from(mut self, descriptor: Value) -> Self {
        self.parameters
            .insert(KEY_RESOLVED_FROM.to_string(), descriptor);
        self
    }

    /// Finish construction. The resulting [`Problem`] is immutable.
    pub fn build(self) -> Problem {
        Problem::from_parts(self.code, self.title, self.detail, self.cause, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RESERVED_KEYS;

    #[test]
    fn stages_build_a_full_problem() {
        let p = Problem::builder()
            .code("auth.expired")
            .title("Session Expired")
            .detail("Token expired 5 minutes ago")
            .parameter("token_age_minutes", 5.into())
            .build();
        assert_eq!(p.code(), "auth.expired");
        assert_eq!(p.title(), "Session Expired");
        assert_eq!(p.parameter("token_age_minutes"), Some(&Value::from(5)));
        assert!(p.cause().is_none());
    }

    #[test]
    #[should_panic(expected = "code must not be blank")]
    fn blank_code_panics() {
        let _ = Problem::builder().code("  ");
    }

    #[test]
    #[should_panic(expected = "title must not be blank")]
    fn blank_title_panics() {
        let _ = Problem::builder().code("x").title("");
    }

    #[test]
    #[should_panic(expected = "detail must not be blank")]
    fn blank_detail_panics() {
        let _ = Problem::builder().code("x").title("y").detail(" ");
    }

    #[test]
    fn every_reserved_key_is_rejected() {
        for key in RESERVED_KEYS {
            let result = std::panic::catch_unwind(|| {
                Problem::builder()
                    .code("x")
                    .title("y")
                    .detail("z")
                    .parameter(*key, Value::Null)
            });
            assert!(result.is_err(), "key '{key}' must be rejected");
        }
    }

    #[test]
    fn detail_template_expands_args() {
        let p = Problem::builder()
            .code("limit")
            .title("Limit")
            .detail_template("{0} of {1} used", &["9".into(), 10.into()])
            .build();
        assert_eq!(p.detail(), "9 of 10 used");
    }

    #[test]
    fn duplicate_parameter_keeps_position_latest_value() {
        let p = Problem::builder()
            .code("x")
            .title("y")
            .detail("z")
            .parameter("a", 1.into())
            .parameter("b", 2.into())
            .parameter("a", 3.into())
            .build();
        let keys: Vec<_> = p.parameters().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(p.parameter("a"), Some(&Value::from(3)));
    }

    #[test]
    fn stack_trace_lands_under_internal_key() {
        let p = Problem::builder()
            .code("x")
            .title("y")
            .detail("z")
            .stack_trace(&[Frame::named("main")])
            .build();
        let trace = p.parameter(KEY_STACK_TRACE).unwrap();
        assert_eq!(trace[0]["symbol"], "main");
    }
}
