//! Triggers: belief and goal events that select plans.
//!
//! A trigger pairs a [`TriggerType`] with a literal. Plans are indexed by
//! [`TriggerKey`] (type plus fully-qualified functor), so dispatching an event
//! only looks at plans that could possibly unify with it.

use crate::path::Path;
use crate::term::Literal;

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerType {
    AddBelief,
    DeleteBelief,
    AddGoal,
    DeleteGoal,
}

impl TriggerType {
    pub fn is_goal(self) -> bool {
        matches!(self, TriggerType::AddGoal | TriggerType::DeleteGoal)
    }

    fn prefix(self) -> &'static str {
        match self {
            TriggerType::AddBelief => "+",
            TriggerType::DeleteBelief => "-",
            TriggerType::AddGoal => "+!",
            TriggerType::DeleteGoal => "-!",
        }
    }
}

/// Plan index key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerKey {
    pub kind: TriggerType,
    pub functor: Path,
}

/// An event: a belief or goal being added or deleted.
#[derive(Debug, Clone)]
pub struct Trigger {
    kind: TriggerType,
    literal: Literal,
}

impl Trigger {
    pub fn new(kind: TriggerType, literal: Literal) -> Self {
        Self { kind, literal }
    }

    pub fn add_belief(literal: Literal) -> Self {
        Self::new(TriggerType::AddBelief, literal)
    }

    pub fn delete_belief(literal: Literal) -> Self {
        Self::new(TriggerType::DeleteBelief, literal)
    }

    pub fn add_goal(literal: Literal) -> Self {
        Self::new(TriggerType::AddGoal, literal)
    }

    pub fn delete_goal(literal: Literal) -> Self {
        Self::new(TriggerType::DeleteGoal, literal)
    }

    pub fn kind(&self) -> TriggerType {
        self.kind
    }

    pub fn literal(&self) -> &Literal {
        &self.literal
    }

    pub fn is_goal(&self) -> bool {
        self.kind.is_goal()
    }

    pub fn key(&self) -> TriggerKey {
        TriggerKey {
            kind: self.kind,
            functor: self.literal.fqn_functor().clone(),
        }
    }
}

impl PartialEq for Trigger {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.literal.hash_code() == other.literal.hash_code()
    }
}

impl Eq for Trigger {}

impl std::hash::Hash for Trigger {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        state.write_u64(self.literal.hash_code());
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.literal)
    }
}
