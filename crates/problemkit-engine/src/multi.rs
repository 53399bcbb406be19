//! Multi-problem aggregation — several problems reported under one status.

use http::StatusCode;
use problemkit_core::{Fault, Problem, ProblemError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::deferred::DeferredProblem;

/// One element of an aggregation batch.
#[derive(Debug)]
pub enum ProblemElement {
    /// An already-built problem; passes through unchanged.
    Ready(Problem),
    /// A deferred problem; resolves with its own status, key and args.
    Deferred(DeferredProblem),
    /// A raw fault; resolves through the engine's fallback chain.
    Fault(Fault),
}

impl From<Problem> for ProblemElement {
    fn from(problem: Problem) -> Self {
        Self::Ready(problem)
    }
}

impl From<DeferredProblem> for ProblemElement {
    fn from(deferred: DeferredProblem) -> Self {
        Self::Deferred(deferred)
    }
}

impl From<Fault> for ProblemElement {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}

fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// An ordered, non-empty batch of problems under a single status.
///
/// Order is aggregation order; duplicates are allowed. Construction
/// fails on an empty list or a malformed element — a partial batch
/// would mislead a caller inspecting "all problems in this batch".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiProblem {
    #[serde(
        serialize_with = "serialize_status",
        deserialize_with = "deserialize_status"
    )]
    status: StatusCode,
    problems: Vec<Problem>,
}

impl MultiProblem {
    /// Assemble a batch. Fails fast on an empty list or on any problem
    /// with a blank code/title/detail (possible only for values that
    /// bypassed the builder, e.g. deserialized ones).
    pub fn new(status: StatusCode, problems: Vec<Problem>) -> Result<Self, ProblemError> {
        if problems.is_empty() {
            return Err(ProblemError::EmptyAggregation);
        }
        for (index, problem) in problems.iter().enumerate() {
            if !problem.is_well_formed() {
                return Err(ProblemError::InvalidElement {
                    index,
                    reason: "blank code, title or detail".to_string(),
                });
            }
        }
        Ok(Self { status, problems })
    }

    /// The shared status of the batch.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The problems, in aggregation order. Never empty.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Number of problems in the batch (at least 1).
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Always `false`: construction rejects an empty batch.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Give up the batch, keeping the problems.
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(code: &str) -> Problem {
        Problem::builder()
            .code(code)
            .title("T")
            .detail("d")
            .build()
    }

    #[test]
    fn empty_batch_fails() {
        let err = MultiProblem::new(StatusCode::BAD_REQUEST, vec![]).unwrap_err();
        assert!(matches!(err, ProblemError::EmptyAggregation));
    }

    #[test]
    fn order_and_count_preserved() {
        let batch = MultiProblem::new(
            StatusCode::BAD_REQUEST,
            vec![problem("a"), problem("b"), problem("a")],
        )
        .unwrap();
        assert_eq!(batch.len(), 3);
        assert!(!batch.is_empty());
        let codes: Vec<_> = batch.problems().iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec!["a", "b", "a"]);
    }

    #[test]
    fn malformed_element_fails_whole_batch() {
        // a blank-code problem can only come from deserialization
        let bad: Problem = serde_json::from_str(r#"{"code":"","title":"T","detail":"d"}"#).unwrap();
        let err = MultiProblem::new(StatusCode::BAD_REQUEST, vec![problem("a"), bad]).unwrap_err();
        match err {
            ProblemError::InvalidElement { index, .. } => assert_eq!(index, 1),
            other => panic!("expected InvalidElement, got {other:?}"),
        }
    }

    #[test]
    fn serde_round_trip_with_numeric_status() {
        let batch =
            MultiProblem::new(StatusCode::UNPROCESSABLE_ENTITY, vec![problem("a")]).unwrap();
        let json = serde_json::to_string(&batch).unwrap();
        assert!(json.contains("\"status\":422"));
        let back: MultiProblem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }
}
