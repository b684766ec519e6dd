//! Responsive overrides - breakpoint-conditional configuration patches.
//!
//! A configuration may carry a `responsive` list:
//!
//! ```json
//! {
//!   "gap": 40,
//!   "responsive": [
//!     { "breakpoint": "tablet", "settings": { "gap": 20 } },
//!     { "breakpoint": 600, "settings": { "gap": 10 } }
//!   ]
//! }
//! ```
//!
//! [`resolve`] derives the live configuration from the reference one and the
//! current viewport only. Every matching rule is merged in list order, so a
//! later match wins over an earlier one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::merge::deep_merge;
use crate::host::{ViewportMode, ViewportState};

/// Key holding the rule list inside a configuration object.
pub const RESPONSIVE_KEY: &str = "responsive";

/// Symbolic breakpoint names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakpointToken {
    Desktop,
    Tablet,
    #[serde(alias = "phone")]
    Mobile,
    /// Handheld device regardless of width.
    MobileDevice,
}

/// When a responsive rule applies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Breakpoint {
    /// Active while viewport width is at most this value.
    Width(f64),
    Token(BreakpointToken),
}

impl Breakpoint {
    pub fn matches(&self, viewport: &ViewportState) -> bool {
        match self {
            Breakpoint::Width(max) => viewport.width <= *max,
            Breakpoint::Token(BreakpointToken::Desktop) => viewport.mode == ViewportMode::Desktop,
            Breakpoint::Token(BreakpointToken::Tablet) => viewport.mode == ViewportMode::Tablet,
            Breakpoint::Token(BreakpointToken::Mobile) => viewport.mode == ViewportMode::Mobile,
            Breakpoint::Token(BreakpointToken::MobileDevice) => viewport.mobile_device,
        }
    }
}

/// One `{breakpoint, settings}` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveRule {
    pub breakpoint: Breakpoint,
    #[serde(default)]
    pub settings: Value,
}

/// Parse the rule list of `reference`. Malformed entries are skipped.
pub fn rules(reference: &Value) -> Vec<ResponsiveRule> {
    let Some(list) = reference.get(RESPONSIVE_KEY) else {
        return Vec::new();
    };
    let Some(entries) = list.as_array() else {
        warn!(found = %list, "`responsive` is not a list; ignored");
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match ResponsiveRule::deserialize(entry) {
            Ok(rule) => Some(rule),
            Err(err) => {
                warn!(index, %err, "malformed responsive rule skipped");
                None
            }
        })
        .collect()
}

/// Whether `reference` declares any responsive rules.
pub fn has_rules(reference: &Value) -> bool {
    reference
        .get(RESPONSIVE_KEY)
        .and_then(Value::as_array)
        .is_some_and(|list| !list.is_empty())
}

/// Live configuration for `viewport`: the reference with every matching rule merged in.
pub fn resolve(reference: &Value, viewport: &ViewportState) -> Value {
    let mut live = reference.clone();
    for rule in rules(reference) {
        if !rule.breakpoint.matches(viewport) {
            continue;
        }
        let mut settings = rule.settings;
        // Rules cannot install further rules.
        if let Value::Object(map) = &mut settings {
            map.remove(RESPONSIVE_KEY);
        }
        deep_merge(&mut live, &settings);
    }
    live
}
