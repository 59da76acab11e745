//! Engine Option Configurations
//!
//! `EngineOptions` is an insertion-ordered option map fully describing how the
//! engine is configured before a trial. Order is preserved so that repeated
//! runs replay the exact same `setoption` sequence; equality is by content so
//! that configurations can serve as aggregation keys.

use serde::{Deserialize, Serialize};

/// A scalar option value as accepted by the engine's option interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean switch
    Flag(bool),
    /// Integer-valued option
    Int(i64),
    /// Floating-point option (e.g. a temperature or lambda)
    Float(f64),
    /// Free-form string option
    Text(String),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Flag(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Flag(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// An insertion-ordered set of engine options.
///
/// Setting an existing name replaces the value in place, keeping the original
/// position so the emitted `setoption` sequence stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    entries: Vec<(String, OptionValue)>,
}

impl EngineOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any existing value for the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Builder-style `set` for constructing literal configurations.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Look up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical `name=value` form, used as a grouping key and in reports.
    /// An empty configuration renders as `default`.
    pub fn key(&self) -> String {
        if self.entries.is_empty() {
            return "default".to_string();
        }
        self.entries
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Compact content fingerprint for log lines and artifact names.
    pub fn fingerprint(&self) -> u64 {
        fxhash::hash64(self.key().as_bytes())
    }
}

impl FromIterator<(String, OptionValue)> for EngineOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        let mut options = EngineOptions::new();
        for (name, value) in iter {
            options.set(name, value);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let opts = EngineOptions::new()
            .with("SampleCount", 50i64)
            .with("Lambda", 0.1)
            .with("Mode", "competitive");
        let names: Vec<&str> = opts.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["SampleCount", "Lambda", "Mode"]);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut opts = EngineOptions::new()
            .with("Lambda", 0.1)
            .with("SampleCount", 50i64);
        opts.set("Lambda", 0.5);
        let names: Vec<&str> = opts.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["Lambda", "SampleCount"]);
        assert_eq!(opts.get("Lambda"), Some(&OptionValue::Float(0.5)));
    }

    #[test]
    fn equality_is_by_content() {
        let a = EngineOptions::new().with("Lambda", 0.1).with("Mode", "competitive");
        let b = EngineOptions::new().with("Lambda", 0.1).with("Mode", "competitive");
        let c = EngineOptions::new().with("Lambda", 0.2).with("Mode", "competitive");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn key_renders_name_value_pairs() {
        let opts = EngineOptions::new().with("Lambda", 0.1).with("Threads", 2i64);
        assert_eq!(opts.key(), "Lambda=0.1 Threads=2");
        assert_eq!(EngineOptions::new().key(), "default");
    }

    #[test]
    fn value_display_matches_wire_format() {
        assert_eq!(OptionValue::Flag(true).to_string(), "true");
        assert_eq!(OptionValue::Int(-3).to_string(), "-3");
        assert_eq!(OptionValue::Float(0.05).to_string(), "0.05");
        assert_eq!(OptionValue::Text("hybrid".into()).to_string(), "hybrid");
    }
}
