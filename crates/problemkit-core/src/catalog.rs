//! Message catalog — localized string lookup by candidate key list.
//!
//! Key naming convention: `<field>.<error_key>[.<qualifier>]*`, listed
//! most-specific-first, e.g.
//! `detail.billing.ChargeFault.cardNumber` before
//! `detail.billing.ChargeFault`.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::RwLock;

/// Substitute `{0}`, `{1}`, … placeholders with positional args.
///
/// One left-to-right scan over the template: substituted text is never
/// re-scanned, so an argument whose value looks like a placeholder is
/// inserted verbatim. String args are inserted as-is; other JSON values
/// use their compact JSON rendering. Placeholders with no matching arg
/// are left untouched.
pub fn expand_template(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let brace = &rest[start..];
        let filled = brace.find('}').and_then(|end| {
            let index: usize = brace[1..end].parse().ok()?;
            let arg = args.get(index)?;
            match arg {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
            Some(&brace[end + 1..])
        });
        rest = match filled {
            Some(after) => after,
            None => {
                // not a fillable placeholder; emit the brace literally
                out.push('{');
                &brace[1..]
            }
        };
    }
    out.push_str(rest);
    out
}

/// Trait for resolving a localized message from a list of candidate keys.
///
/// Implementations must be `Send + Sync`; the engine shares one resolver
/// across concurrent fault-handling passes. A lookup miss is never an
/// error: the supplied default is returned instead, so the result is
/// `None` only when every candidate misses *and* no default was given.
pub trait MessageResolver: Send + Sync {
    /// Resolve the first matching candidate, else the default. Positional
    /// args are substituted into whichever template wins.
    fn resolve(
        &self,
        candidates: &[String],
        default_value: Option<&str>,
        args: &[Value],
    ) -> Option<String>;

    /// Total number of registered messages.
    fn len(&self) -> usize;

    /// Returns `true` if no messages are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── In-memory catalog ────────────────────────────────────────────────────────

/// A simple in-memory catalog backed by an insertion-ordered map.
pub struct MemoryCatalog {
    messages: RwLock<IndexMap<String, String>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(IndexMap::new()),
        }
    }

    /// Register one message template under a key.
    pub fn insert(&self, key: impl Into<String>, template: impl Into<String>) {
        let mut map = self.messages.write().unwrap();
        map.insert(key.into(), template.into());
    }

    /// Load messages from a flat JSON object string.
    /// Expected format: `{ "title.some.key": "Some Title", ... }`
    pub fn load_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let entries: IndexMap<String, String> = serde_json::from_str(json)?;
        let count = entries.len();
        let mut map = self.messages.write().unwrap();
        map.extend(entries);
        Ok(count)
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageResolver for MemoryCatalog {
    fn resolve(
        &self,
        candidates: &[String],
        default_value: Option<&str>,
        args: &[Value],
    ) -> Option<String> {
        let map = self.messages.read().unwrap();
        for key in candidates {
            if let Some(template) = map.get(key) {
                return Some(expand_template(template, args));
            }
        }
        default_value.map(|d| expand_template(d, args))
    }

    fn len(&self) -> usize {
        self.messages.read().unwrap().len()
    }
}
