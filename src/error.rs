//! Rich diagnostic error types for the akh-bdi runtime.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Recoverable outcomes (a literal that does
//! not unify, a guard that rejects, a body step that fails) are *not* errors: they
//! surface as false [`FuzzyValue`](crate::fuzzy::FuzzyValue)s. The types here cover
//! structural defects that must abort the current plan.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the akh-bdi runtime.
#[derive(Debug, Error, Diagnostic)]
pub enum BdiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Belief(#[from] BeliefError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Agent(#[from] crate::agent::AgentError),
}

// ---------------------------------------------------------------------------
// Term errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TermError {
    #[error("empty functor: a literal needs at least one non-empty path segment")]
    #[diagnostic(
        code(akh::term::empty_functor),
        help("Construct literals with a functor such as \"foo\" or \"a/b/foo\".")
    )]
    EmptyFunctor,

    #[error("variable \"{name}\" is read before it was bound")]
    #[diagnostic(
        code(akh::term::unbound_variable),
        help(
            "The plan reads a variable that neither the trigger, the guard, nor an \
             earlier step binds. Check the plan source for a misspelled variable name."
        )
    )]
    UnboundVariable { name: String },

    #[error("constant \"{name}\" cannot be rebound")]
    #[diagnostic(
        code(akh::term::constant_rebind),
        help("Constants receive their value when the context is created. Use a free variable instead.")
    )]
    ConstantRebind { name: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    #[diagnostic(
        code(akh::term::type_mismatch),
        help("The operation received a value of the wrong kind. Check the argument order.")
    )]
    TypeMismatch { expected: String, found: String },
}

// ---------------------------------------------------------------------------
// Belief errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BeliefError {
    #[error("empty path")]
    #[diagnostic(
        code(akh::belief::empty_path),
        help("Belief operations need a path with at least one segment.")
    )]
    EmptyPath,

    #[error("view not found: {path}")]
    #[diagnostic(
        code(akh::belief::view_not_found),
        help(
            "An intermediate view along the path does not exist. Add it first, \
             or pass a view generator so missing views are created on demand."
        )
    )]
    ViewNotFound { path: String },

    #[error("view name collision: \"{name}\" already exists under {parent}")]
    #[diagnostic(
        code(akh::belief::view_exists),
        help("Remove the existing view first, or choose a different name for the alias.")
    )]
    ViewExists { name: String, parent: String },

    #[error("alias \"{name}\" under {parent} would make the view tree cyclic")]
    #[diagnostic(
        code(akh::belief::cyclic_alias),
        help("A view cannot be attached below itself. Alias it under an unrelated view.")
    )]
    CyclicAlias { name: String, parent: String },
}

// ---------------------------------------------------------------------------
// Execution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    #[error("action not found: \"{name}\"")]
    #[diagnostic(
        code(akh::exec::action_not_found),
        help("Register the action in the ActionRegistryBuilder before constructing the agent.")
    )]
    ActionNotFound { name: String },

    #[error("action \"{name}\" needs at least {minimum} arguments, got {actual}")]
    #[diagnostic(
        code(akh::exec::argument_count),
        help("Check the call site in the plan body against the action's signature.")
    )]
    ArgumentCount {
        name: String,
        minimum: usize,
        actual: usize,
    },

    #[error("action \"{name}\" failed: {message}")]
    #[diagnostic(
        code(akh::exec::action),
        help("The action raised a hard error. Check the inner message for details.")
    )]
    Action { name: String, message: String },

    #[error("rule not found: \"{name}\"")]
    #[diagnostic(
        code(akh::exec::rule_not_found),
        help("No rule with this functor and arity is defined for the agent.")
    )]
    RuleNotFound { name: String },

    #[error("division by zero")]
    #[diagnostic(
        code(akh::exec::division_by_zero),
        help("Guard the division with a test step, e.g. `Y != 0`.")
    )]
    DivisionByZero,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Term(#[from] TermError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Belief(#[from] BeliefError),
}

/// Convenience alias for term operations.
pub type TermResult<T> = std::result::Result<T, TermError>;

/// Convenience alias for belief store operations.
pub type BeliefResult<T> = std::result::Result<T, BeliefError>;

/// Convenience alias for plan and step execution.
pub type ExecResult<T> = std::result::Result<T, ExecutionError>;

/// Convenience alias used across the crate.
pub type BdiResult<T> = std::result::Result<T, BdiError>;
