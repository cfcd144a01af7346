//! Literal-against-literal matching.
//!
//! [`exact`] is the fast path: the candidate must have the query's argument and
//! annotation structure, and arguments are compared positionally with no
//! recursion. [`structural`] walks both literals recursively, so a query
//! variable may bind to a nested literal and a nested query literal may contain
//! variables of its own.

use crate::term::{Literal, Term};

use super::BindingSet;

/// Positional match of structurally identical literals.
pub fn exact(query: &Literal, candidate: &Literal) -> Option<BindingSet> {
    if query.negated() != candidate.negated()
        || query.arity() != candidate.arity()
        || query.argument_hash() != candidate.argument_hash()
        || query.annotation_hash() != candidate.annotation_hash()
        || query.annotations().len() != candidate.annotations().len()
    {
        return None;
    }

    let mut set = BindingSet::new();
    for (i, (q, c)) in query.arguments().iter().zip(candidate.arguments()).enumerate() {
        if !exact_term(q, c, i, &mut set) {
            return None;
        }
    }

    let offset = query.arity();
    for (i, (qa, ca)) in query
        .annotations()
        .iter()
        .zip(candidate.annotations())
        .enumerate()
    {
        if qa.fqn_functor() != ca.fqn_functor() || qa.arity() != ca.arity() {
            return None;
        }
        for (q, c) in qa.arguments().iter().zip(ca.arguments()) {
            if !exact_term(q, c, offset + i, &mut set) {
                return None;
            }
        }
    }
    Some(set)
}

fn exact_term(query: &Term, candidate: &Term, position: usize, set: &mut BindingSet) -> bool {
    match query {
        Term::Variable(v) => set.bind(v.name(), candidate, &[position]),
        ground => ground.resolved() == candidate.resolved(),
    }
}

/// Recursive structural match.
///
/// Functor, negation and arity must agree at every nesting level. A query
/// variable binds to any candidate term unless that term contains the same
/// variable (occurs-check). Annotations are matched after the arguments.
pub fn structural(query: &Literal, candidate: &Literal) -> Option<BindingSet> {
    let mut set = BindingSet::new();
    let mut path = Vec::new();
    structural_literal(query, candidate, &mut path, &mut set).then_some(set)
}

fn structural_literal(
    query: &Literal,
    candidate: &Literal,
    path: &mut Vec<usize>,
    set: &mut BindingSet,
) -> bool {
    if query.negated() != candidate.negated()
        || query.fqn_functor() != candidate.fqn_functor()
        || query.arity() != candidate.arity()
        || query.annotations().len() > candidate.annotations().len()
    {
        return false;
    }

    for (i, (q, c)) in query.arguments().iter().zip(candidate.arguments()).enumerate() {
        path.push(i);
        let ok = structural_term(q, c, path, set);
        path.pop();
        if !ok {
            return false;
        }
    }

    let offset = query.arity();
    for (i, (qa, ca)) in query
        .annotations()
        .iter()
        .zip(candidate.annotations())
        .enumerate()
    {
        path.push(offset + i);
        let ok = structural_literal(qa, ca, path, set);
        path.pop();
        if !ok {
            return false;
        }
    }
    true
}

fn structural_term(query: &Term, candidate: &Term, path: &[usize], set: &mut BindingSet) -> bool {
    let candidate = candidate.resolved();
    match (query, &candidate) {
        (Term::Variable(v), value) => {
            if occurs(v.name(), value) {
                return false;
            }
            set.bind(v.name(), value, path)
        }
        (Term::Literal(q), Term::Literal(c)) => {
            let mut nested = path.to_vec();
            structural_literal(q, c, &mut nested, set)
        }
        (Term::Raw(a), Term::Raw(b)) => a == b,
        _ => false,
    }
}

fn occurs(name: &crate::path::Path, term: &Term) -> bool {
    let mut found = Vec::new();
    term.collect_variables(&mut found);
    found.iter().any(|v| v.name() == name)
}
