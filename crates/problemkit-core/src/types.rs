//! Core value types: [`Problem`], [`Frame`], and the reserved parameter keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::builder::CodeStage;

// ─── Reserved parameter keys ──────────────────────────────────────────────────

/// Parameter key under which a processed stack trace is attached.
pub const KEY_STACK_TRACE: &str = "stack_trace";

/// Parameter key under which debug-mode lookup descriptors are attached.
pub const KEY_RESOLVED_FROM: &str = "resolved_from";

/// Keys that free-form parameters may never use: the fixed field names of
/// the serialized problem shape plus the internal diagnostic keys.
pub const RESERVED_KEYS: &[&str] = &[
    "code",
    "title",
    "detail",
    "cause",
    KEY_STACK_TRACE,
    KEY_RESOLVED_FROM,
];

/// Returns `true` if `key` collides with a fixed field or internal key.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

// ─── Frame ────────────────────────────────────────────────────────────────────

/// One call-site entry of a captured stack trace, innermost call first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Function or method identifier (e.g. `"billing::charge::submit"`).
    pub symbol: String,
    /// Source file or module path, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Line number within `location`, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Frame {
    /// Frame with only a symbol, no source position.
    pub fn named(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            location: None,
            line: None,
        }
    }

    /// Frame with a full source position.
    pub fn at(symbol: impl Into<String>, location: impl Into<String>, line: u32) -> Self {
        Self {
            symbol: symbol.into(),
            location: Some(location.into()),
            line: Some(line),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)?;
        if let Some(loc) = &self.location {
            write!(f, " ({loc}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

// ─── Problem ──────────────────────────────────────────────────────────────────

/// Immutable structured representation of one fault occurrence.
///
/// The canonical serialized shape is an open object: `code`, `title` and
/// `detail` as fixed fields, every parameter flattened as a sibling
/// property, and `cause` nested recursively when present.
///
/// Construct via [`Problem::builder`]; fields are never mutated after
/// `build()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    code: String,
    title: String,
    detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Box<Problem>>,
    #[serde(flatten)]
    parameters: IndexMap<String, Value>,
}

impl Problem {
    /// Start staged construction: `code → title → detail → build`.
    pub fn builder() -> CodeStage {
        CodeStage::new()
    }

    pub(crate) fn from_parts(
        code: String,
        title: String,
        detail: String,
        cause: Option<Box<Problem>>,
        parameters: IndexMap<String, Value>,
    ) -> Self {
        Self {
            code,
            title,
            detail,
            cause,
            parameters,
        }
    }

    /// Application-defined error code (e.g. `"500"` or `"payment.declined"`).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Short human-readable summary of the problem category.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Human-readable explanation specific to this occurrence.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Nested problem describing the underlying cause, when captured.
    pub fn cause(&self) -> Option<&Problem> {
        self.cause.as_deref()
    }

    /// All additional context entries, in insertion order.
    pub fn parameters(&self) -> &IndexMap<String, Value> {
        &self.parameters
    }

    /// Look up a single context entry by key.
    pub fn parameter(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    /// Depth of the cause chain, counting this problem as 1.
    pub fn chain_depth(&self) -> usize {
        1 + self.cause.as_ref().map_or(0, |c| c.chain_depth())
    }

    /// Returns `true` if `code`, `title` and `detail` are all populated.
    ///
    /// Problems built through [`Problem::builder`] always are; a problem
    /// deserialized from untrusted JSON may not be.
    pub fn is_well_formed(&self) -> bool {
        !self.code.trim().is_empty()
            && !self.title.trim().is_empty()
            && !self.detail.trim().is_empty()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.title, self.detail)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by [{}] {})", cause.code, cause.title)?;
        }
        Ok(())
    }
}
