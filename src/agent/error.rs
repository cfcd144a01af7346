//! Agent-specific error types with rich miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::ExecutionError;

/// Errors raised by agent construction and the reasoning cycle.
#[derive(Debug, Error, Diagnostic)]
pub enum AgentError {
    #[error("no plan handles goal trigger {trigger}")]
    #[diagnostic(
        code(akh::agent::unhandled_goal),
        help(
            "Goals are expected to be achievable. Add a plan whose trigger unifies with \
             the goal and whose guard holds, or disable `strict_goals` in the agent config."
        )
    )]
    UnhandledGoal { trigger: String },

    #[error("invalid agent configuration: {field} — {message}")]
    #[diagnostic(
        code(akh::agent::invalid_config),
        help("Check the agent configuration file against the documented defaults.")
    )]
    InvalidConfig { field: String, message: String },

    #[error("failed to build worker pool: {message}")]
    #[diagnostic(
        code(akh::agent::pool),
        help("Lower `worker_threads` or check the process thread limits.")
    )]
    Pool { message: String },

    #[error("cannot read agent configuration \"{path}\": {message}")]
    #[diagnostic(
        code(akh::agent::config_io),
        help("Check that the configuration file exists and is readable.")
    )]
    ConfigIo { path: String, message: String },

    #[error("cannot parse agent configuration: {message}")]
    #[diagnostic(
        code(akh::agent::config_parse),
        help("The configuration must be valid TOML. Check the reported line and column.")
    )]
    ConfigParse { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),
}

impl From<crate::error::TermError> for AgentError {
    fn from(e: crate::error::TermError) -> Self {
        Self::Execution(e.into())
    }
}

impl From<crate::error::BeliefError> for AgentError {
    fn from(e: crate::error::BeliefError) -> Self {
        Self::Execution(e.into())
    }
}

/// Convenience alias for agent operations.
pub type AgentResult<T> = std::result::Result<T, AgentError>;
