//! Action system: trait-based leaf actions in an immutable registry.
//!
//! Actions are the agent's interface to the outside world. Each action
//! implements the [`Action`] trait and is registered once, at agent
//! construction, through an [`ActionRegistryBuilder`]. The built registry is
//! read-only for the agent's whole lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ExecResult, ExecutionError};
use crate::fuzzy::FuzzyValue;
use crate::term::{Context, Term};

/// A leaf action callable from a plan body.
///
/// Implementations receive the arguments already resolved against the
/// caller's context and append their results to `returns`. They must not keep
/// the context or the argument slice beyond the call.
pub trait Action: Send + Sync {
    /// Fully-qualified action name, e.g. `generic/print`.
    fn name(&self) -> &str;

    /// Fewest arguments the action accepts.
    fn minimal_arguments(&self) -> usize {
        0
    }

    fn execute(
        &self,
        parallel: bool,
        context: &Context,
        arguments: &[Term],
        returns: &mut Vec<Term>,
    ) -> ExecResult<FuzzyValue<bool>>;
}

type ActionFn = dyn Fn(&Context, &[Term], &mut Vec<Term>) -> ExecResult<FuzzyValue<bool>> + Send + Sync;

/// An action backed by a closure.
pub struct FnAction {
    name: String,
    minimal_arguments: usize,
    body: Box<ActionFn>,
}

impl FnAction {
    pub fn new<F>(name: impl Into<String>, minimal_arguments: usize, body: F) -> Self
    where
        F: Fn(&Context, &[Term], &mut Vec<Term>) -> ExecResult<FuzzyValue<bool>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            minimal_arguments,
            body: Box::new(body),
        }
    }
}

impl Action for FnAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn minimal_arguments(&self) -> usize {
        self.minimal_arguments
    }

    fn execute(
        &self,
        _parallel: bool,
        context: &Context,
        arguments: &[Term],
        returns: &mut Vec<Term>,
    ) -> ExecResult<FuzzyValue<bool>> {
        (self.body)(context, arguments, returns)
    }
}

/// `generic/print`: emits its arguments as a tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintAction;

impl Action for PrintAction {
    fn name(&self) -> &str {
        "generic/print"
    }

    fn execute(
        &self,
        _parallel: bool,
        _context: &Context,
        arguments: &[Term],
        _returns: &mut Vec<Term>,
    ) -> ExecResult<FuzzyValue<bool>> {
        let text = arguments
            .iter()
            .map(|t| match t.raw() {
                Ok(crate::term::Value::Str(s)) => s,
                _ => t.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(target: "akh_bdi::print", "{text}");
        Ok(FuzzyValue::truth())
    }
}

/// `generic/throw`: raises an action error when its first argument is true.
///
/// An optional second argument is used as the message.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrowAction;

impl Action for ThrowAction {
    fn name(&self) -> &str {
        "generic/throw"
    }

    fn minimal_arguments(&self) -> usize {
        1
    }

    fn execute(
        &self,
        _parallel: bool,
        _context: &Context,
        arguments: &[Term],
        _returns: &mut Vec<Term>,
    ) -> ExecResult<FuzzyValue<bool>> {
        if arguments[0].raw()?.as_bool()? {
            let message = arguments
                .get(1)
                .map(|m| m.raw().and_then(|v| v.as_str()).unwrap_or_else(|_| m.to_string()))
                .unwrap_or_else(|| "thrown".into());
            return Err(ExecutionError::Action {
                name: self.name().into(),
                message,
            });
        }
        Ok(FuzzyValue::truth())
    }
}

/// Builder for an [`ActionRegistry`].
#[derive(Default)]
pub struct ActionRegistryBuilder {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. An action with the same name is replaced.
    pub fn register(mut self, action: impl Action + 'static) -> Self {
        self.actions.insert(action.name().to_owned(), Arc::new(action));
        self
    }

    /// Register a closure as an action.
    pub fn register_fn<F>(self, name: impl Into<String>, minimal_arguments: usize, body: F) -> Self
    where
        F: Fn(&Context, &[Term], &mut Vec<Term>) -> ExecResult<FuzzyValue<bool>> + Send + Sync + 'static,
    {
        self.register(FnAction::new(name, minimal_arguments, body))
    }

    /// Add `generic/print` and `generic/throw`.
    pub fn with_builtins(self) -> Self {
        self.register(PrintAction).register(ThrowAction)
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry {
            actions: self.actions,
        }
    }
}

/// Immutable name → action map.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|a| a.as_ref())
    }

    /// Sorted action names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up and run an action, checking its argument count.
    pub fn execute(
        &self,
        name: &str,
        parallel: bool,
        context: &Context,
        arguments: &[Term],
        returns: &mut Vec<Term>,
    ) -> ExecResult<FuzzyValue<bool>> {
        let action = self
            .get(name)
            .ok_or_else(|| ExecutionError::ActionNotFound { name: name.into() })?;
        if arguments.len() < action.minimal_arguments() {
            return Err(ExecutionError::ArgumentCount {
                name: name.into(),
                minimum: action.minimal_arguments(),
                actual: arguments.len(),
            });
        }
        action.execute(parallel, context, arguments, returns)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = ActionRegistry::builder().with_builtins().build();
        assert_eq!(registry.names(), vec!["generic/print", "generic/throw"]);
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn closure_action_returns_values() {
        let registry = ActionRegistry::builder()
            .register_fn("math/double", 1, |_, args, out| {
                let x = args[0].raw()?.as_i64()?;
                out.push(Term::from(x * 2));
                Ok(FuzzyValue::truth())
            })
            .build();
        let mut out = Vec::new();
        let result = registry
            .execute("math/double", false, &Context::new(), &[Term::from(21)], &mut out)
            .unwrap();
        assert!(*result.value());
        assert_eq!(out, vec![Term::from(42)]);
    }

    #[test]
    fn argument_count_checked() {
        let registry = ActionRegistry::builder().with_builtins().build();
        let err = registry
            .execute("generic/throw", false, &Context::new(), &[], &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ArgumentCount { minimum: 1, actual: 0, .. }));
    }

    #[test]
    fn throw_raises_only_when_true() {
        let registry = ActionRegistry::builder().with_builtins().build();
        let ctx = Context::new();
        assert!(registry
            .execute("generic/throw", false, &ctx, &[Term::from(false)], &mut Vec::new())
            .is_ok());
        let err = registry
            .execute("generic/throw", false, &ctx, &[Term::from(true), Term::from("boom")], &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Action { message, .. } if message == "boom"));
    }

    #[test]
    fn unknown_action_is_an_error() {
        let registry = ActionRegistry::default();
        let err = registry
            .execute("missing", false, &Context::new(), &[], &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::ActionNotFound { .. }));
    }
}
