//! Engine configuration.
//!
//! One explicit snapshot, built at startup and passed by reference to
//! every component that needs it. Read-only afterwards; safe to share
//! across threads.

use serde::{Deserialize, Serialize};

/// Process-wide switches for problem construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Follow `cause()` pointers and attach nested problems.
    #[serde(default = "bool_true")]
    pub cause_chains: bool,
    /// Attach processed stack traces to problems.
    #[serde(default)]
    pub stack_traces: bool,
    /// Stash resolver lookup descriptors on every built problem.
    /// Diagnostic output for operators; never read back by the engine.
    #[serde(default)]
    pub debug: bool,
    /// Generic error key used when a fault carries no specific one.
    #[serde(default = "default_error_key")]
    pub default_error_key: String,
    /// URI prefix for problem type links. Carried for adapter layers;
    /// unused by the engine itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_prefix: Option<String>,
}

fn bool_true() -> bool {
    true
}

fn default_error_key() -> String {
    "internal.error".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cause_chains: true,
            stack_traces: false,
            debug: false,
            default_error_key: default_error_key(),
            type_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_serde_defaults() {
        let from_empty: EngineConfig = serde_json::from_str("{}").unwrap();
        let built = EngineConfig::default();
        assert_eq!(from_empty.cause_chains, built.cause_chains);
        assert_eq!(from_empty.stack_traces, built.stack_traces);
        assert_eq!(from_empty.debug, built.debug);
        assert_eq!(from_empty.default_error_key, built.default_error_key);
    }

    #[test]
    fn partial_overrides_apply() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"cause_chains": false, "debug": true}"#).unwrap();
        assert!(!cfg.cause_chains);
        assert!(cfg.debug);
        assert_eq!(cfg.default_error_key, "internal.error");
    }
}
