//! Fault-shaped inputs: the [`FaultLike`] contract, the plain [`Fault`]
//! value, and the problem-carrying [`ThrownProblem`].

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

use crate::types::{Frame, Problem};

// ─── FaultLike ────────────────────────────────────────────────────────────────

/// The shape of a caught fault the engine can turn into a problem.
///
/// `kind()` is the explicit error key a caller tags a fault with
/// (e.g. `"billing.ChargeFault"`); an empty kind means "no specific
/// key", so only the generic fallback messages apply.
pub trait FaultLike {
    /// Error key identifying this fault's logical category.
    fn kind(&self) -> &str;

    /// Human-readable message for this occurrence.
    fn message(&self) -> &str;

    /// The underlying fault, when this one wraps another.
    fn cause(&self) -> Option<&dyn FaultLike>;

    /// Captured stack frames, innermost call first.
    fn frames(&self) -> &[Frame];
}

// ─── Fault ────────────────────────────────────────────────────────────────────

/// A concrete, serializable fault description.
///
/// Useful both as the in-process representation of a caught error and as
/// the JSON input format of fixtures and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Error key (may be empty for "unclassified").
    #[serde(default)]
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Captured stack frames, innermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
    /// Nested cause, when this fault wraps another.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Fault>>,
}

impl Fault {
    /// Fault with a kind and message, no frames, no cause.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Attach captured frames.
    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = frames;
        self
    }

    /// Attach a nested cause.
    pub fn with_cause(mut self, cause: Fault) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Build a fault from any `std::error::Error`, walking its `source()`
    /// chain into nested causes. Only the outermost fault carries the
    /// caller-supplied kind; sources are left unclassified.
    pub fn from_error(kind: impl Into<String>, err: &dyn StdError) -> Self {
        let mut fault = Self::new(kind, err.to_string());
        if let Some(source) = err.source() {
            fault.cause = Some(Box::new(Self::from_error("", source)));
        }
        fault
    }
}

impl FaultLike for Fault {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn cause(&self) -> Option<&dyn FaultLike> {
        self.cause.as_deref().map(|c| c as &dyn FaultLike)
    }

    fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

// ─── ThrownProblem ────────────────────────────────────────────────────────────

/// A fault that *is* a problem: raised deliberately, or produced when a
/// caught fault is converted at the handling boundary.
///
/// Owns its [`Problem`], the stack frames captured at construction, and
/// an optional status. Immutable after construction; extra parameters go
/// through the problem builder before the carrier is made.
#[derive(Debug, Clone)]
pub struct ThrownProblem {
    problem: Problem,
    frames: Vec<Frame>,
    status: Option<StatusCode>,
}

impl ThrownProblem {
    /// Create a carrier from an already-built problem.
    pub fn new(problem: Problem, frames: Vec<Frame>, status: Option<StatusCode>) -> Self {
        Self {
            problem,
            frames,
            status,
        }
    }

    /// The carried problem.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Give up the carrier, keeping only the problem.
    pub fn into_problem(self) -> Problem {
        self.problem
    }

    /// Frames captured when the carrier was constructed.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Status to render this problem under, when one was recorded.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

impl fmt::Display for ThrownProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.problem)
    }
}

impl StdError for ThrownProblem {}

impl FaultLike for ThrownProblem {
    fn kind(&self) -> &str {
        self.problem.code()
    }

    fn message(&self) -> &str {
        self.problem.detail()
    }

    fn cause(&self) -> Option<&dyn FaultLike> {
        None
    }

    fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
