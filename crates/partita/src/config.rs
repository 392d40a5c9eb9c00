#![forbid(unsafe_code)]

//! Chart configuration.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable                   | Values                         |
//! |----------------------------|--------------------------------|
//! | `PARTITA_FLAT_LEGEND`      | `1/0`, `true/false`, `on/off`  |
//! | `PARTITA_LEGEND_POSITION`  | `top`, `bottom`, `left`, `right` |
//! | `PARTITA_LEGEND_MAX_DEPTH` | number, `nan`, or `none`       |
//! | `PARTITA_CHILD_ORDER`      | `descending`, `ascending`      |
//! | `PARTITA_CACHE_CAPACITY`   | positive integer               |
//!
//! Unparseable values keep the default and are reported in
//! [`ConfigParse::errors`].

use std::env;
use std::fmt;

use partita_core::ChildOrder;
use partita_views::{DEFAULT_CACHE_CAPACITY, LegendConfig, LegendPosition};

pub const ENV_FLAT_LEGEND: &str = "PARTITA_FLAT_LEGEND";
pub const ENV_LEGEND_POSITION: &str = "PARTITA_LEGEND_POSITION";
pub const ENV_LEGEND_MAX_DEPTH: &str = "PARTITA_LEGEND_MAX_DEPTH";
pub const ENV_CHILD_ORDER: &str = "PARTITA_CHILD_ORDER";
pub const ENV_CACHE_CAPACITY: &str = "PARTITA_CACHE_CAPACITY";

/// Settings for one partition chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionConfig {
    pub legend: LegendConfig,
    /// Sibling order of the materialized tree.
    pub child_order: ChildOrder,
    /// Entries kept per projection cache.
    pub cache_capacity: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            legend: LegendConfig::default(),
            child_order: ChildOrder::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Parsed config plus everything that could not be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigParse {
    pub config: PartitionConfig,
    pub errors: Vec<ConfigError>,
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl PartitionConfig {
    /// Config from the process environment, ignoring bad values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Config from the process environment with diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> ConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Config from an arbitrary variable source.
    pub fn from_env_with<F>(mut get: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_FLAT_LEGEND) {
            match parse_bool(&value) {
                Some(parsed) => config.legend.flat_legend = parsed,
                None => errors.push(ConfigError::new("flat_legend", value, "expected bool")),
            }
        }

        if let Some(value) = get(ENV_LEGEND_POSITION) {
            match LegendPosition::parse(&value) {
                Some(parsed) => config.legend.position = parsed,
                None => errors.push(ConfigError::new(
                    "legend_position",
                    value,
                    "expected top|bottom|left|right",
                )),
            }
        }

        if let Some(value) = get(ENV_LEGEND_MAX_DEPTH) {
            match parse_max_depth(&value) {
                Some(parsed) => config.legend.max_depth = parsed,
                None => errors.push(ConfigError::new(
                    "legend_max_depth",
                    value,
                    "expected number, nan or none",
                )),
            }
        }

        if let Some(value) = get(ENV_CHILD_ORDER) {
            match ChildOrder::parse(&value) {
                Some(parsed) => config.child_order = parsed,
                None => errors.push(ConfigError::new(
                    "child_order",
                    value,
                    "expected descending|ascending",
                )),
            }
        }

        if let Some(value) = get(ENV_CACHE_CAPACITY) {
            match value.trim().parse::<usize>() {
                Ok(parsed) if parsed > 0 => config.cache_capacity = parsed,
                _ => errors.push(ConfigError::new("cache_capacity", value, "expected integer >= 1")),
            }
        }

        ConfigParse { config, errors }
    }

    /// Validate constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.cache_capacity == 0 {
            errors.push(ConfigError::new("cache_capacity", "0", "must be >= 1"));
        }
        if let Some(depth) = self.legend.max_depth
            && depth < 0.0
        {
            errors.push(ConfigError::new(
                "legend_max_depth",
                depth.to_string(),
                "must be >= 0 or nan",
            ));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendConfig) -> Self {
        self.legend = legend;
        self
    }

    #[must_use]
    pub fn with_child_order(mut self, order: ChildOrder) -> Self {
        self.child_order = order;
        self
    }

    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

#[inline]
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_max_depth(value: &str) -> Option<Option<f64>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") || value.is_empty() {
        return Some(None);
    }
    value.parse::<f64>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> ConfigParse {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        PartitionConfig::from_env_with(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let parsed = parse(&[]);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.config, PartitionConfig::default());
        assert!(parsed.config.validate().is_ok());
    }

    #[test]
    fn recognized_values_apply() {
        let parsed = parse(&[
            (ENV_FLAT_LEGEND, "yes"),
            (ENV_LEGEND_POSITION, "Bottom"),
            (ENV_LEGEND_MAX_DEPTH, "2"),
            (ENV_CHILD_ORDER, "asc"),
            (ENV_CACHE_CAPACITY, "16"),
        ]);
        assert!(parsed.errors.is_empty());
        let config = parsed.config;
        assert!(config.legend.flat_legend);
        assert_eq!(config.legend.position, LegendPosition::Bottom);
        assert_eq!(config.legend.max_depth, Some(2.0));
        assert_eq!(config.child_order, ChildOrder::Ascending);
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn nan_max_depth_is_accepted() {
        let parsed = parse(&[(ENV_LEGEND_MAX_DEPTH, "nan")]);
        assert!(parsed.errors.is_empty());
        assert!(parsed.config.legend.max_depth.is_some_and(f64::is_nan));
        assert!(parsed.config.validate().is_ok());
    }

    #[test]
    fn bad_values_keep_defaults_and_report() {
        let parsed = parse(&[
            (ENV_FLAT_LEGEND, "maybe"),
            (ENV_LEGEND_POSITION, "middle"),
            (ENV_CACHE_CAPACITY, "0"),
        ]);
        assert_eq!(parsed.config, PartitionConfig::default());
        let fields: Vec<&str> = parsed.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["flat_legend", "legend_position", "cache_capacity"]);
        assert_eq!(parsed.errors[1].to_string(), "legend_position=middle (expected top|bottom|left|right)");
    }

    #[test]
    fn validate_collects_all_violations() {
        let config = PartitionConfig::default()
            .with_cache_capacity(0)
            .with_legend(LegendConfig::default().with_max_depth(Some(-1.0)));
        let errors = config.validate().expect_err("invalid");
        assert_eq!(errors.len(), 2);
    }
}
