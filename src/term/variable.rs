//! Variables: named slots holding at most one binding.
//!
//! Four kinds exist:
//!
//! - **Free** — an ordinary slot, copied when a [`Context`](super::Context) is duplicated.
//! - **Constant** — bound on creation; any later `set` is a [`TermError::ConstantRebind`].
//! - **Mutex** — the slot lives behind an `Arc<Mutex<..>>` that every duplicate of the
//!   context shares, so parallel branches observe each other's writes.
//! - **Relocate** — a local slot that references a variable of an *outer* context by
//!   name. Writes stay local until [`Context::propagate`](super::Context::propagate)
//!   copies them outward.

use std::sync::{Arc, Mutex};

use crate::error::{TermError, TermResult};
use crate::path::Path;

use super::Term;

/// Kind of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Free,
    Constant,
    Mutex,
    /// References the outer-scope variable named `target`.
    Relocate { target: Path },
}

#[derive(Debug, Clone)]
enum Slot {
    Local(Option<Box<Term>>),
    Shared(Arc<Mutex<Option<Term>>>),
}

/// A named variable.
///
/// Equality and hashing use the name only, so a template literal `f(X)` keeps
/// its identity whether or not `X` is bound.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Path,
    kind: VariableKind,
    slot: Slot,
}

impl Variable {
    /// An unbound free variable.
    pub fn new(name: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Free,
            slot: Slot::Local(None),
        }
    }

    /// A constant, bound to `value` for its whole lifetime.
    pub fn constant(name: impl Into<Path>, value: impl Into<Term>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Constant,
            slot: Slot::Local(Some(Box::new(value.into()))),
        }
    }

    /// An unbound variable whose slot is shared by all duplicated contexts.
    pub fn mutex(name: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Mutex,
            slot: Slot::Shared(Arc::new(Mutex::new(None))),
        }
    }

    /// A variable that writes back to `target` in the outer context on propagation.
    pub fn relocate(name: impl Into<Path>, target: impl Into<Path>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::Relocate {
                target: target.into(),
            },
            slot: Slot::Local(None),
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub fn is_mutex(&self) -> bool {
        self.kind == VariableKind::Mutex
    }

    /// Outer variable this one relocates to, if any.
    pub fn relocate_target(&self) -> Option<&Path> {
        match &self.kind {
            VariableKind::Relocate { target } => Some(target),
            _ => None,
        }
    }

    /// Whether the slot holds a value.
    pub fn allocated(&self) -> bool {
        match &self.slot {
            Slot::Local(value) => value.is_some(),
            Slot::Shared(shared) => shared.lock().expect("variable lock poisoned").is_some(),
        }
    }

    /// Bound value, if any.
    pub fn value(&self) -> Option<Term> {
        match &self.slot {
            Slot::Local(value) => value.as_deref().cloned(),
            Slot::Shared(shared) => shared.lock().expect("variable lock poisoned").clone(),
        }
    }

    /// Bound value, or [`TermError::UnboundVariable`].
    pub fn get(&self) -> TermResult<Term> {
        self.value().ok_or_else(|| TermError::UnboundVariable {
            name: self.name.to_string(),
        })
    }

    /// Bind the slot.
    pub fn set(&mut self, value: Term) -> TermResult<()> {
        if self.kind == VariableKind::Constant {
            return Err(TermError::ConstantRebind {
                name: self.name.to_string(),
            });
        }
        match &mut self.slot {
            Slot::Local(slot) => *slot = Some(Box::new(value)),
            Slot::Shared(shared) => *shared.lock().expect("variable lock poisoned") = Some(value),
        }
        Ok(())
    }

    /// Builder form of [`Variable::set`] for fresh variables.
    pub fn bound(mut self, value: impl Into<Term>) -> TermResult<Self> {
        self.set(value.into())?;
        Ok(self)
    }

    /// Same name and kind, empty slot. Mutex variables get a fresh shared slot.
    pub fn unbound_copy(&self) -> Self {
        let slot = match &self.slot {
            Slot::Local(_) if self.kind == VariableKind::Constant => self.slot.clone(),
            Slot::Local(_) => Slot::Local(None),
            Slot::Shared(_) => Slot::Shared(Arc::new(Mutex::new(None))),
        };
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            slot,
        }
    }

    /// Fully independent copy, including a fresh mutex slot and deep-copied value.
    pub fn deep_copy(&self) -> Self {
        let value = self.value().map(|v| v.deep_copy());
        let slot = match &self.slot {
            Slot::Local(_) => Slot::Local(value.map(Box::new)),
            Slot::Shared(_) => Slot::Shared(Arc::new(Mutex::new(value))),
        };
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            slot,
        }
    }

    /// Whether two variables share the same mutex slot.
    pub fn shares_slot_with(&self, other: &Variable) -> bool {
        match (&self.slot, &other.slot) {
            (Slot::Shared(a), Slot::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}({})", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Value;

    #[test]
    fn free_variable_binds_once_observed() {
        let mut x = Variable::new("X");
        assert!(!x.allocated());
        assert!(x.get().is_err());
        x.set(Term::from(Value::Int(1))).unwrap();
        assert!(x.allocated());
        assert_eq!(x.get().unwrap(), Term::from(Value::Int(1)));
    }

    #[test]
    fn constant_rejects_rebinding() {
        let mut c = Variable::constant("C", Value::Int(5));
        assert!(c.allocated());
        let err = c.set(Term::from(Value::Int(6))).unwrap_err();
        assert!(matches!(err, TermError::ConstantRebind { .. }));
        assert_eq!(c.get().unwrap(), Term::from(Value::Int(5)));
    }

    #[test]
    fn mutex_slot_is_shared_between_clones() {
        let a = Variable::mutex("M");
        let mut b = a.clone();
        b.set(Term::from(Value::Int(7))).unwrap();
        assert_eq!(a.value(), Some(Term::from(Value::Int(7))));
        assert!(a.shares_slot_with(&b));
        assert!(!a.shares_slot_with(&a.unbound_copy()));
    }

    #[test]
    fn free_clone_is_independent() {
        let a = Variable::new("X");
        let mut b = a.clone();
        b.set(Term::from(Value::Int(1))).unwrap();
        assert!(!a.allocated());
    }

    #[test]
    fn equality_ignores_binding() {
        let a = Variable::new("X");
        let b = Variable::new("X").bound(Value::Int(3)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Variable::new("Y"));
    }
}
