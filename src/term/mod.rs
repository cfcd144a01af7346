//! Term model: raw values, variables, and literals.
//!
//! Every argument of a [`Literal`] is a [`Term`]. Terms carry two hashes:
//! an identity hash (used for equality and indexing) and a structure hash that
//! treats raw values and variables as placeholders, so that `f(X, 2)` and
//! `f(1, 3)` share a structure.

pub mod context;
pub mod literal;
pub mod value;
pub mod variable;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use context::Context;
pub use literal::Literal;
pub use value::Value;
pub use variable::{Variable, VariableKind};

use crate::error::{TermError, TermResult};

/// Deterministic 64-bit hash of any hashable value.
pub(crate) fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// A literal argument.
#[derive(Debug, Clone)]
pub enum Term {
    Raw(Value),
    Variable(Variable),
    Literal(Literal),
}

impl Term {
    /// Shorthand for an unbound free variable.
    pub fn var(name: &str) -> Term {
        Term::Variable(Variable::new(name))
    }

    pub fn hash_code(&self) -> u64 {
        match self {
            Term::Raw(value) => hash_of(&(0u8, value)),
            Term::Variable(variable) => hash_of(&(1u8, variable.name())),
            Term::Literal(literal) => literal.hash_code(),
        }
    }

    /// Identity hash cached by literals: boxed values contribute their
    /// variant only, so mutating a shared box keeps every holder's hash valid.
    pub(crate) fn stable_hash_code(&self) -> u64 {
        match self {
            Term::Raw(value) => {
                let mut hasher = DefaultHasher::new();
                0u8.hash(&mut hasher);
                value.hash_stable(&mut hasher);
                hasher.finish()
            }
            other => other.hash_code(),
        }
    }

    /// Raw values and variables are structure placeholders.
    pub fn structure_hash(&self) -> u64 {
        match self {
            Term::Raw(_) | Term::Variable(_) => 0,
            Term::Literal(literal) => literal.structure_hash(),
        }
    }

    pub fn has_variable(&self) -> bool {
        match self {
            Term::Raw(_) => false,
            Term::Variable(_) => true,
            Term::Literal(literal) => literal.has_variable(),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Term::Raw(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// The raw value behind this term, following a bound variable.
    pub fn raw(&self) -> TermResult<Value> {
        match self.resolved() {
            Term::Raw(value) => Ok(value),
            Term::Variable(v) => Err(TermError::UnboundVariable {
                name: v.name().to_string(),
            }),
            Term::Literal(_) => Err(TermError::TypeMismatch {
                expected: "raw value".into(),
                found: "literal".into(),
            }),
        }
    }

    /// Bound variables replaced by their values; everything else unchanged.
    pub fn resolved(&self) -> Term {
        match self {
            Term::Variable(v) => match v.value() {
                Some(value) => value.resolved(),
                None => self.clone(),
            },
            other => other.clone(),
        }
    }

    /// Fully independent copy.
    pub fn deep_copy(&self) -> Term {
        match self {
            Term::Raw(value) => Term::Raw(value.deep_copy()),
            Term::Variable(variable) => Term::Variable(variable.deep_copy()),
            Term::Literal(literal) => Term::Literal(literal.deep_copy()),
        }
    }

    /// Replace variables by their context values; unbound ones are an error.
    pub fn ground(&self, context: &Context) -> TermResult<Term> {
        match self {
            Term::Variable(v) => match context.get(v.name()).and_then(Variable::value) {
                Some(value) => value.ground(context),
                None => Err(TermError::UnboundVariable {
                    name: v.name().to_string(),
                }),
            },
            Term::Literal(literal) => Ok(Term::Literal(literal.ground(context)?)),
            Term::Raw(_) => Ok(self.clone()),
        }
    }

    pub(crate) fn collect_variables(&self, found: &mut Vec<Variable>) {
        match self {
            Term::Variable(v) => {
                if !found.contains(v) {
                    found.push(v.clone());
                }
            }
            Term::Literal(literal) => literal.collect_variables(found),
            Term::Raw(_) => {}
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Raw(a), Term::Raw(b)) => a == b,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::Literal(a), Term::Literal(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Default for Term {
    fn default() -> Self {
        Term::Raw(Value::Empty)
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Raw(value) => write!(f, "{value}"),
            Term::Variable(variable) => write!(f, "{variable}"),
            Term::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<Value> for Term {
    fn from(value: Value) -> Self {
        Term::Raw(value)
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<i64> for Term {
    fn from(i: i64) -> Self {
        Term::Raw(Value::Int(i))
    }
}

impl From<i32> for Term {
    fn from(i: i32) -> Self {
        Term::Raw(Value::from(i))
    }
}

impl From<f64> for Term {
    fn from(x: f64) -> Self {
        Term::Raw(Value::Float(x))
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Raw(Value::Bool(b))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Raw(Value::from(s))
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Raw(Value::Str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_strict_per_variant() {
        let bound = Variable::new("X").bound(1).unwrap();
        assert_ne!(Term::from(bound.clone()), Term::from(1));
        assert_eq!(Term::from(bound).resolved(), Term::from(1));
    }

    #[test]
    fn placeholders_share_structure() {
        assert_eq!(Term::from(1).structure_hash(), 0);
        assert_eq!(Term::var("X").structure_hash(), 0);
        assert_ne!(Term::from(1).hash_code(), Term::from(2).hash_code());
    }

    #[test]
    fn raw_follows_bound_variable() {
        let x = Term::from(Variable::new("X").bound("hi").unwrap());
        assert_eq!(x.raw().unwrap(), Value::Str("hi".into()));
        assert!(Term::var("Y").raw().is_err());
    }
}
