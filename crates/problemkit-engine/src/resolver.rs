//! Error-key resolution — code/title/detail lookup with graceful degradation.
//!
//! Each field resolves independently through a two-level chain:
//! 1. the generic key (`<field>.<default_error_key>`) with a literal
//!    status-derived fallback, giving a *computed default*;
//! 2. the fault's own key (`<field>.<error_key>[.<qualifier>]*`,
//!    most-specific-first) with that computed default as its fallback.
//!
//! A deployment can therefore override messages per exact fault kind,
//! per generic category, or accept the literal fallback; the result is
//! never empty.

use http::StatusCode;
use problemkit_core::{EngineConfig, MessageResolver};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// One field's lookup descriptor: which candidates were tried, with
/// which default and args. Attached to problems in debug mode.
#[derive(Debug, Clone, Serialize)]
pub struct FieldLookup {
    pub candidates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

/// The three field lookups of one resolution pass.
#[derive(Debug, Clone, Serialize)]
pub struct LookupTrace {
    pub code: FieldLookup,
    pub title: FieldLookup,
    pub detail: FieldLookup,
}

/// Fully resolved field values plus the descriptors that produced them.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub code: String,
    pub title: String,
    pub detail: String,
    pub lookups: LookupTrace,
}

/// Resolves code/title/detail for one fault occurrence.
pub struct KeyResolver<'a> {
    config: &'a EngineConfig,
    messages: &'a dyn MessageResolver,
}

impl<'a> KeyResolver<'a> {
    pub fn new(config: &'a EngineConfig, messages: &'a dyn MessageResolver) -> Self {
        Self { config, messages }
    }

    /// Resolve all three fields for a fault identified by `error_key`
    /// (empty = unclassified), with optional structural `qualifiers`
    /// (most specific last, e.g. `["ChargeRequest", "cardNumber"]`).
    ///
    /// Literal fallbacks: code → numeric status, title → standard reason
    /// phrase, detail → the fault's own message (reason phrase when the
    /// message is empty, so detail is never blank).
    pub fn resolve(
        &self,
        status: StatusCode,
        error_key: &str,
        qualifiers: &[&str],
        fault_message: Option<&str>,
        detail_args: &[Value],
    ) -> Resolved {
        let status_code = status.as_u16().to_string();
        let reason = reason_phrase(status);
        let message = match fault_message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => reason.clone(),
        };

        let (code, code_lookup) = self.field("code", error_key, qualifiers, &status_code, &[]);
        let (title, title_lookup) = self.field("title", error_key, qualifiers, &reason, &[]);
        let (detail, detail_lookup) =
            self.field("detail", error_key, qualifiers, &message, detail_args);

        Resolved {
            code,
            title,
            detail,
            lookups: LookupTrace {
                code: code_lookup,
                title: title_lookup,
                detail: detail_lookup,
            },
        }
    }

    /// Resolve one field through the two-level chain.
    fn field(
        &self,
        field: &str,
        error_key: &str,
        qualifiers: &[&str],
        literal: &str,
        args: &[Value],
    ) -> (String, FieldLookup) {
        let generic = vec![format!("{field}.{}", self.config.default_error_key)];
        let computed_default = self
            .messages
            .resolve(&generic, Some(literal), args)
            .unwrap_or_else(|| literal.to_string());

        let candidates = specific_candidates(field, error_key, qualifiers);
        if candidates.is_empty() {
            debug!(field, "no error key; using generic resolution");
            return (
                computed_default,
                FieldLookup {
                    candidates: generic,
                    default_value: Some(literal.to_string()),
                    args: args.to_vec(),
                },
            );
        }

        // A blank catalog entry counts as a miss; the result must never be empty.
        let value = match self.messages.resolve(&candidates, Some(&computed_default), args) {
            Some(v) if !v.trim().is_empty() => v,
            _ => computed_default.clone(),
        };

        (
            value,
            FieldLookup {
                candidates,
                default_value: Some(computed_default),
                args: args.to_vec(),
            },
        )
    }
}

/// Standard reason phrase for a status, with a last-resort literal for
/// codes the registry does not know.
pub(crate) fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

/// Expand `<field>.<error_key>[.<qualifier>]*` candidates,
/// most-specific-first. An empty error key yields no candidates.
fn specific_candidates(field: &str, error_key: &str, qualifiers: &[&str]) -> Vec<String> {
    if error_key.trim().is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(qualifiers.len() + 1);
    for depth in (0..=qualifiers.len()).rev() {
        let mut key = format!("{field}.{error_key}");
        for q in &qualifiers[..depth] {
            key.push('.');
            key.push_str(q);
        }
        out.push(key);
    }
    out
}
