//! Configuration loading from sweep.toml
//!
//! A sweep definition is static data: the engine to drive, runner timing,
//! the case list, and the option matrix. The file is discovered by walking
//! up from the current directory; CLI flags override individual values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use sweepbench_core::{Complexity, EngineOptions, OptionValue, TestCase};

/// Root of a `sweep.toml` document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SweepConfig {
    /// Engine process settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Runner timing and sampling settings
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Artifact output settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Workload cases; the built-in suite is used when empty
    #[serde(default, rename = "case")]
    pub cases: Vec<CaseConfig>,
    /// Options applied to every configuration, in declaration order
    #[serde(default, rename = "option")]
    pub base_options: Vec<BaseOption>,
    /// Sweep axes; their Cartesian product forms the configuration set
    #[serde(default, rename = "axis")]
    pub axes: Vec<AxisConfig>,
}

/// Engine process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path to the engine binary
    #[serde(default)]
    pub binary: String,
    /// Extra argv passed to the engine
    #[serde(default)]
    pub args: Vec<String>,
    /// Handshake deadline (e.g. "10s")
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout: String,
    /// Liveness probe grace period
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: String,
    /// Grace period after `quit` before signals escalate
    #[serde(default = "default_stop_grace")]
    pub stop_grace: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: String::new(),
            args: Vec::new(),
            handshake_timeout: default_handshake_timeout(),
            probe_timeout: default_probe_timeout(),
            stop_grace: default_stop_grace(),
        }
    }
}

fn default_handshake_timeout() -> String {
    "10s".to_string()
}
fn default_probe_timeout() -> String {
    "5s".to_string()
}
fn default_stop_grace() -> String {
    "2s".to_string()
}

/// Runner timing and sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Per-trial completion-marker timeout
    #[serde(default = "default_trial_timeout")]
    pub trial_timeout: String,
    /// Settling delay between trials
    #[serde(default = "default_inter_trial_delay")]
    pub inter_trial_delay: String,
    /// How many times to run the whole matrix
    #[serde(default = "default_repeats")]
    pub repeats: u32,
    /// Node-count ceiling per workload
    #[serde(default)]
    pub nodes: Option<u64>,
    /// Wall-clock ceiling per workload. Defaults on so an unbounded search
    /// can never turn every trial into a timeout.
    #[serde(default = "default_movetime")]
    pub movetime: Option<String>,
    /// Whether to sample host resources during trials
    #[serde(default = "default_sample_resources")]
    pub sample_resources: bool,
    /// Sampling tick interval
    #[serde(default = "default_sample_interval")]
    pub sample_interval: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            trial_timeout: default_trial_timeout(),
            inter_trial_delay: default_inter_trial_delay(),
            repeats: default_repeats(),
            nodes: None,
            movetime: default_movetime(),
            sample_resources: default_sample_resources(),
            sample_interval: default_sample_interval(),
        }
    }
}

fn default_trial_timeout() -> String {
    "30s".to_string()
}
fn default_inter_trial_delay() -> String {
    "250ms".to_string()
}
fn default_repeats() -> u32 {
    1
}
fn default_sample_resources() -> bool {
    true
}
fn default_sample_interval() -> String {
    "100ms".to_string()
}
fn default_movetime() -> Option<String> {
    Some("15s".to_string())
}

/// Artifact output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the artifacts land in
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Configuration key the speedup section compares against
    #[serde(default)]
    pub baseline: Option<String>,
    /// Write the Markdown summary
    #[serde(default = "default_true")]
    pub markdown: bool,
    /// Write the JSON artifact
    #[serde(default = "default_true")]
    pub json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            baseline: None,
            markdown: true,
            json: true,
        }
    }
}

fn default_output_dir() -> String {
    "target/sweepbench".to_string()
}
fn default_true() -> bool {
    true
}

/// One `[[case]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Unique case identifier
    pub id: String,
    /// FEN payload or `startpos`
    pub position: String,
    /// Report label; the id is reused when omitted
    #[serde(default)]
    pub label: Option<String>,
    /// Difficulty grade
    #[serde(default = "default_complexity")]
    pub complexity: Complexity,
}

fn default_complexity() -> Complexity {
    Complexity::Medium
}

impl CaseConfig {
    fn to_case(&self) -> TestCase {
        TestCase::new(
            self.id.clone(),
            self.position.clone(),
            self.label.clone().unwrap_or_else(|| self.id.clone()),
            self.complexity,
        )
    }
}

/// One `[[option]]` entry: an option fixed across the whole sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseOption {
    /// Option name
    pub name: String,
    /// Option value
    pub value: OptionValue,
}

/// One `[[axis]]` entry: an option varied across the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Option name
    pub option: String,
    /// Candidate values, tried in declaration order
    pub values: Vec<OptionValue>,
}

impl SweepConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover `sweep.toml` by walking up from the current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sweep.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// The case set: configured cases, or the built-in suite when none are.
    pub fn test_cases(&self) -> Vec<TestCase> {
        if self.cases.is_empty() {
            TestCase::builtin_suite()
        } else {
            self.cases.iter().map(CaseConfig::to_case).collect()
        }
    }

    /// Expand base options and axes into the full configuration set,
    /// Cartesian product in declaration order. No axes yields the single
    /// base configuration.
    pub fn configurations(&self) -> Vec<EngineOptions> {
        let base: EngineOptions = self
            .base_options
            .iter()
            .map(|o| (o.name.clone(), o.value.clone()))
            .collect();

        let mut configs = vec![base];
        for axis in &self.axes {
            let mut expanded = Vec::with_capacity(configs.len() * axis.values.len());
            for config in &configs {
                for value in &axis.values {
                    expanded.push(config.clone().with(axis.option.clone(), value.clone()));
                }
            }
            configs = expanded;
        }
        configs
    }

    /// Parse a duration string such as "3s", "500ms", "2m".
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid duration number: {}", num_part))?;

        let nanos_per_unit: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * nanos_per_unit as f64) as u64))
    }

    /// Generate a default configuration as a TOML string.
    pub fn default_toml() -> String {
        r#"# Sweepbench Configuration

[engine]
# Path to the engine binary (required)
binary = "./lc0"
# Extra arguments passed to the engine
args = []
# Handshake deadline
handshake_timeout = "10s"
# Liveness probe grace period
probe_timeout = "5s"
# Grace after `quit` before signals escalate
stop_grace = "2s"

[runner]
# Completion-marker timeout for one trial
trial_timeout = "30s"
# Settling delay between trials
inter_trial_delay = "250ms"
# How many times to run the whole matrix
repeats = 1
# Node ceiling per workload (uncomment to enable)
# nodes = 26000
# Wall-clock ceiling per workload
movetime = "15s"
# Sample host CPU/memory during trials
sample_resources = true
sample_interval = "100ms"

[output]
# Artifact directory
directory = "target/sweepbench"
# Baseline configuration key for the speedup section (uncomment to enable)
# baseline = "Lambda=0.1"
markdown = true
json = true

# Cases default to the built-in graded suite; define your own like this:
# [[case]]
# id = "opening"
# position = "startpos"
# label = "Initial position"
# complexity = "low"

# Options fixed for every configuration:
# [[option]]
# name = "Threads"
# value = 2

# Swept axes (Cartesian product, declaration order):
# [[axis]]
# option = "Lambda"
# values = [0.01, 0.1, 0.5]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = SweepConfig::default();
        assert_eq!(config.runner.trial_timeout, "30s");
        assert_eq!(config.runner.repeats, 1);
        assert!(config.runner.sample_resources);
        assert!(config.output.markdown);
        assert!(config.cases.is_empty());
    }

    #[test]
    fn default_toml_parses() {
        let config: SweepConfig = toml::from_str(&SweepConfig::default_toml()).unwrap();
        assert_eq!(config.engine.binary, "./lc0");
        assert_eq!(config.runner.inter_trial_delay, "250ms");
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(
            SweepConfig::parse_duration("3s").unwrap(),
            Duration::from_secs(3)
        );
        assert_eq!(
            SweepConfig::parse_duration("500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert_eq!(
            SweepConfig::parse_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            SweepConfig::parse_duration("2m").unwrap(),
            Duration::from_secs(120)
        );
        assert!(SweepConfig::parse_duration("3 fortnights").is_err());
        assert!(SweepConfig::parse_duration("").is_err());
    }

    #[test]
    fn parses_full_document() {
        let doc = r#"
            [engine]
            binary = "./engine"

            [runner]
            trial_timeout = "5s"
            repeats = 2

            [[case]]
            id = "opening"
            position = "startpos"
            complexity = "low"

            [[option]]
            name = "Threads"
            value = 2

            [[axis]]
            option = "Lambda"
            values = [0.01, 0.1]

            [[axis]]
            option = "Mode"
            values = ["competitive", "quantum_limit"]
        "#;
        let config: SweepConfig = toml::from_str(doc).unwrap();
        assert_eq!(config.engine.binary, "./engine");
        assert_eq!(config.runner.repeats, 2);
        assert_eq!(config.test_cases().len(), 1);

        let configs = config.configurations();
        assert_eq!(configs.len(), 4);
        // Declaration order: Lambda varies slowest, Mode fastest
        assert_eq!(configs[0].key(), "Threads=2 Lambda=0.01 Mode=competitive");
        assert_eq!(configs[1].key(), "Threads=2 Lambda=0.01 Mode=quantum_limit");
        assert_eq!(configs[3].key(), "Threads=2 Lambda=0.1 Mode=quantum_limit");
    }

    #[test]
    fn no_axes_yields_single_base_configuration() {
        let config: SweepConfig = toml::from_str(
            r#"
            [[option]]
            name = "Threads"
            value = 1
        "#,
        )
        .unwrap();
        let configs = config.configurations();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].key(), "Threads=1");
    }

    #[test]
    fn empty_case_list_falls_back_to_builtin_suite() {
        let config = SweepConfig::default();
        assert_eq!(config.test_cases().len(), TestCase::builtin_suite().len());
    }

    #[test]
    fn option_values_deserialize_by_shape() {
        let config: SweepConfig = toml::from_str(
            r#"
            [[option]]
            name = "Temperature"
            value = 0.7

            [[option]]
            name = "Threads"
            value = 4

            [[option]]
            name = "Verbose"
            value = true

            [[option]]
            name = "Mode"
            value = "hybrid"
        "#,
        )
        .unwrap();
        let opts = &config.base_options;
        assert_eq!(opts[0].value, OptionValue::Float(0.7));
        assert_eq!(opts[1].value, OptionValue::Int(4));
        assert_eq!(opts[2].value, OptionValue::Flag(true));
        assert_eq!(opts[3].value, OptionValue::Text("hybrid".to_string()));
    }
}
