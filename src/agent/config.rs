//! Agent configuration loaded from TOML.

use serde::{Deserialize, Serialize};

use crate::fuzzy::Defuzzify;

use super::error::{AgentError, AgentResult};

/// Runtime settings for one agent.
///
/// ```toml
/// name = "thermostat"
/// worker_threads = 2
/// parallel_unification = true
/// strict_goals = true
/// defuzzify = { kind = "threshold", threshold = 0.5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent name used in log events.
    pub name: String,
    /// Size of the worker pool for parallel unification and parallel plan bodies.
    pub worker_threads: usize,
    /// Evaluate unification candidates on the worker pool.
    pub parallel_unification: bool,
    /// Strategy collapsing fuzzy results to booleans.
    pub defuzzify: Defuzzify,
    /// Treat a goal trigger without an applicable plan as an error.
    pub strict_goals: bool,
    /// Upper bound on triggers processed in one cycle.
    pub max_triggers_per_cycle: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".into(),
            worker_threads: 4,
            parallel_unification: false,
            defuzzify: Defuzzify::Crisp,
            strict_goals: false,
            max_triggers_per_cycle: 1024,
        }
    }
}

impl AgentConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> AgentResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| AgentError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AgentError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.worker_threads == 0 {
            return Err(invalid("worker_threads", "must be at least 1"));
        }
        if self.max_triggers_per_cycle == 0 {
            return Err(invalid("max_triggers_per_cycle", "must be at least 1"));
        }
        if let Defuzzify::Threshold(t) = self.defuzzify {
            if !(0.0..=1.0).contains(&t) {
                return Err(invalid("defuzzify", "threshold must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> AgentError {
    AgentError::InvalidConfig {
        field: field.into(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AgentConfig::default();
        assert_eq!(config.worker_threads, 4);
        assert!(!config.parallel_unification);
        assert_eq!(config.defuzzify, Defuzzify::Crisp);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
            name = "thermostat"
            strict_goals = true
            defuzzify = { kind = "threshold", threshold = 0.5 }
            "#,
        )
        .unwrap();
        assert_eq!(config.name, "thermostat");
        assert!(config.strict_goals);
        assert_eq!(config.defuzzify, Defuzzify::Threshold(0.5));
        assert_eq!(config.max_triggers_per_cycle, 1024);
    }

    #[test]
    fn zero_workers_rejected() {
        let err = AgentConfig::from_toml_str("worker_threads = 0").unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfig { .. }));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = AgentConfig::from_toml_str("worker_threads = [").unwrap_err();
        assert!(matches!(err, AgentError::ConfigParse { .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"\nworker_threads = 2").unwrap();
        let config = AgentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "from-file");
        assert_eq!(config.worker_threads, 2);

        let missing = AgentConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, AgentError::ConfigIo { .. }));
    }
}
