//! Variable bindings for one plan or rule execution.

use std::collections::HashMap;

use crate::error::{TermError, TermResult};
use crate::path::Path;

use super::{Term, Variable};

/// Mapping from variable name to [`Variable`].
///
/// `Clone` duplicates the context: free and relocate slots are copied,
/// mutex slots stay shared with the original.
#[derive(Debug, Clone, Default)]
pub struct Context {
    variables: HashMap<Path, Variable>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context holding an unbound copy of each variable.
    pub fn from_variables<'a>(variables: impl IntoIterator<Item = &'a Variable>) -> Self {
        let mut context = Self::new();
        for variable in variables {
            context
                .variables
                .entry(variable.name().clone())
                .or_insert_with(|| variable.unbound_copy());
        }
        context
    }

    /// Insert or replace a variable.
    pub fn insert(&mut self, variable: Variable) {
        self.variables.insert(variable.name().clone(), variable);
    }

    pub fn get(&self, name: &Path) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &Path) -> bool {
        self.variables.contains_key(name)
    }

    /// Value of `name`, or [`TermError::UnboundVariable`].
    pub fn value(&self, name: &Path) -> TermResult<Term> {
        self.variables
            .get(name)
            .and_then(Variable::value)
            .ok_or_else(|| TermError::UnboundVariable {
                name: name.to_string(),
            })
    }

    /// Bind `name`, creating a free variable if it is not yet known.
    pub fn bind(&mut self, name: &Path, value: Term) -> TermResult<()> {
        match self.variables.get_mut(name) {
            Some(variable) => variable.set(value),
            None => {
                self.insert(Variable::new(name.clone()).bound(value)?);
                Ok(())
            }
        }
    }

    /// Apply a batch of bindings.
    pub fn apply<I>(&mut self, bindings: I) -> TermResult<()>
    where
        I: IntoIterator<Item = (Path, Term)>,
    {
        for (name, value) in bindings {
            self.bind(&name, value)?;
        }
        Ok(())
    }

    /// Write the value of every bound relocate variable to its target in `outer`.
    /// Returns the number of values written.
    pub fn propagate(&self, outer: &mut Context) -> TermResult<usize> {
        let mut written = 0;
        for variable in self.variables.values() {
            let (Some(target), Some(value)) = (variable.relocate_target(), variable.value()) else {
                continue;
            };
            outer.bind(target, value)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Names of variables currently holding a value.
    pub fn bound_names(&self) -> Vec<&Path> {
        let mut names: Vec<&Path> = self
            .variables
            .values()
            .filter(|v| v.allocated())
            .map(Variable::name)
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
