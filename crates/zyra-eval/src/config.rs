//! Evaluator configuration.

use serde::{Deserialize, Serialize};

/// Limits and switches for one evaluator instance.
///
/// Missing keys fall back to [`EvalConfig::default`] when loading from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Evaluation steps allowed per top-level statement.
    pub gas_limit: u64,
    /// Nested function calls allowed before `StackOverflow`.
    pub max_call_depth: usize,
    /// Also write `print`/`printf` output to stdout.
    pub echo_output: bool,
    /// Significant digits kept by decimal division.
    pub decimal_precision: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            gas_limit: 10_000_000,
            max_call_depth: 512,
            echo_output: false,
            decimal_precision: 28,
        }
    }
}

impl EvalConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EvalConfig::from_json(r#"{ "gas_limit": 500 }"#).unwrap();
        assert_eq!(config.gas_limit, 500);
        assert_eq!(config.max_call_depth, 512);
        assert_eq!(config.decimal_precision, 28);
        assert!(!config.echo_output);
    }

    #[test]
    fn test_builder() {
        let config = EvalConfig::default()
            .with_gas_limit(42)
            .with_max_call_depth(8);
        assert_eq!(config.gas_limit, 42);
        assert_eq!(config.max_call_depth, 8);
    }

    #[test]
    fn test_bad_json_is_rejected() {
        assert!(EvalConfig::from_json(r#"{ "gas_limit": "lots" }"#).is_err());
    }
}
