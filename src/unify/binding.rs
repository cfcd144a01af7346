//! Binding sets produced by matching one query against one candidate.

use crate::error::TermResult;
use crate::path::Path;
use crate::term::{Context, Term};

/// One variable binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Path,
    pub value: Term,
    /// Argument positions from the query root to the variable. Annotations are
    /// numbered after the positional arguments.
    pub path: Vec<usize>,
}

/// Distinct variable bindings for one candidate, in first-bound order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingSet {
    bindings: Vec<Binding>,
}

impl BindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name = value`. A repeated variable must bind to an equal term.
    pub fn bind(&mut self, name: &Path, value: &Term, path: &[usize]) -> bool {
        let value = value.resolved();
        if let Some(existing) = self.get(name) {
            return existing.resolved() == value;
        }
        self.bindings.push(Binding {
            name: name.clone(),
            value,
            path: path.to_vec(),
        });
        true
    }

    pub fn get(&self, name: &Path) -> Option<&Term> {
        self.bindings.iter().find(|b| &b.name == name).map(|b| &b.value)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Write every binding into `context`.
    pub fn apply(&self, context: &mut Context) -> TermResult<()> {
        context.apply(
            self.bindings
                .iter()
                .map(|b| (b.name.clone(), b.value.clone())),
        )
    }
}
