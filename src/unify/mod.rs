//! Unification of query literals against the belief store.
//!
//! A query such as `sensor/temp(X, 2)` is resolved in four stages:
//!
//! 1. fetch candidates from the view index by negation flag and functor path
//! 2. match each candidate with [`matcher::exact`], falling back to
//!    [`matcher::structural`] when no candidate matches exactly
//! 3. keep binding sets that bind exactly the requested number of variables
//! 4. commit the first set, or with a guard the first set whose guard
//!    defuzzifies true on a duplicated context
//!
//! No stage is an error: an unsatisfiable query yields `None`. Only a guard that
//! raises (e.g. reading an unbound variable) surfaces as `Err`.

pub mod binding;
pub mod matcher;

pub use binding::{Binding, BindingSet};

use crate::belief::View;
use crate::error::ExecResult;
use crate::fuzzy::{Defuzzify, FuzzyValue};
use crate::pool::WorkerPool;
use crate::term::{Context, Literal};

/// Guard evaluated on a speculative context.
pub type Guard<'g> = dyn Fn(&Context) -> ExecResult<FuzzyValue<bool>> + Sync + 'g;

/// Stateless unifier configured with a defuzzification strategy and an
/// optional worker pool for parallel candidate evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Unifier<'p> {
    defuzzify: Defuzzify,
    pool: Option<&'p WorkerPool>,
}

impl<'p> Unifier<'p> {
    pub fn new(defuzzify: Defuzzify) -> Self {
        Self {
            defuzzify,
            pool: None,
        }
    }

    /// Enable parallel candidate evaluation on `pool`.
    pub fn with_pool(mut self, pool: &'p WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Match `query` against a single candidate: exact first, then structural.
    pub fn bind(&self, query: &Literal, candidate: &Literal) -> Option<BindingSet> {
        matcher::exact(query, candidate).or_else(|| matcher::structural(query, candidate))
    }

    /// Binding sets of every stored candidate that binds exactly `required`
    /// variables, in store order.
    pub fn candidates(&self, beliefs: &View, query: &Literal, required: usize) -> Vec<BindingSet> {
        let stored = beliefs.matching(query.negated(), query.fqn_functor());
        tracing::trace!(query = %query, candidates = stored.len(), "unifier candidate fetch");

        let mut sets: Vec<BindingSet> = stored
            .iter()
            .filter_map(|candidate| matcher::exact(query, candidate))
            .collect();
        if sets.is_empty() {
            sets = stored
                .iter()
                .filter_map(|candidate| matcher::structural(query, candidate))
                .collect();
        }
        sets.retain(|set| set.len() == required);
        sets
    }

    /// Unify `query` against `beliefs` in the scope of `context`.
    ///
    /// Variables already bound in `context` are substituted before matching.
    /// On success returns a duplicate of `context` extended with the committed
    /// bindings; `context` itself is never modified.
    pub fn unify(
        &self,
        beliefs: &View,
        query: &Literal,
        context: &Context,
        guard: Option<&Guard<'_>>,
        parallel: bool,
    ) -> ExecResult<Option<Context>> {
        let query = query.substitute(context);
        let required = query.variables().len();
        let sets = self.candidates(beliefs, &query, required);
        if sets.is_empty() {
            return Ok(None);
        }

        let attempt = |set: &BindingSet| -> ExecResult<Option<Context>> {
            let mut speculative = context.clone();
            set.apply(&mut speculative)?;
            match guard {
                None => Ok(Some(speculative)),
                Some(guard) => {
                    let verdict = guard(&speculative)?;
                    Ok(self.defuzzify.defuzzify(&verdict).then_some(speculative))
                }
            }
        };

        match (parallel, self.pool) {
            (true, Some(pool)) => pool
                .first_match(&sets, |_, set| attempt(set).transpose())
                .transpose(),
            _ => {
                for set in &sets {
                    if let Some(committed) = attempt(set)? {
                        return Ok(Some(committed));
                    }
                }
                Ok(None)
            }
        }
    }

    /// [`Unifier::unify`] as a fuzzy outcome, for callers that only need success.
    pub fn holds(
        &self,
        beliefs: &View,
        query: &Literal,
        context: &Context,
        guard: Option<&Guard<'_>>,
        parallel: bool,
    ) -> ExecResult<FuzzyValue<bool>> {
        Ok(FuzzyValue::from(
            self.unify(beliefs, query, context, guard, parallel)?.is_some(),
        ))
    }
}

impl Default for Unifier<'_> {
    fn default() -> Self {
        Self::new(Defuzzify::Crisp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::EmptyViewGenerator;
    use crate::path::Path;
    use crate::term::{Term, Variable};

    fn lit(functor: &str, args: Vec<Term>) -> Literal {
        Literal::new(functor, args, false, false).unwrap()
    }

    fn store(facts: &[Literal]) -> View {
        let view = View::root();
        for fact in facts {
            view.add(fact, Some(&EmptyViewGenerator)).unwrap();
        }
        view
    }

    fn greater_than_one(ctx: &Context) -> ExecResult<FuzzyValue<bool>> {
        let x = ctx.value(&Path::from("X"))?.raw()?.as_i64()?;
        Ok(FuzzyValue::from(x > 1))
    }

    #[test]
    fn exact_unification_binds_and_fails() {
        let beliefs = store(&[lit("f", vec![Term::from(1), Term::from(2)])]);
        let unifier = Unifier::default();
        let ctx = Context::new();

        let bound = unifier
            .unify(&beliefs, &lit("f", vec![Term::var("X"), Term::from(2)]), &ctx, None, false)
            .unwrap()
            .unwrap();
        assert_eq!(bound.value(&"X".into()).unwrap(), Term::from(1));
        assert!(ctx.is_empty());

        let miss = unifier
            .unify(&beliefs, &lit("f", vec![Term::var("X"), Term::from(3)]), &ctx, None, false)
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn guard_selects_satisfying_candidate() {
        let beliefs = store(&[
            lit("f", vec![Term::from(1), Term::from("a")]),
            lit("f", vec![Term::from(2), Term::from("a")]),
        ]);
        let query = lit("f", vec![Term::var("X"), Term::from("a")]);
        let pool = WorkerPool::new(2).unwrap();

        for parallel in [false, true] {
            let unifier = Unifier::default().with_pool(&pool);
            let guard: &Guard = &greater_than_one;
            let committed = unifier
                .unify(&beliefs, &query, &Context::new(), Some(guard), parallel)
                .unwrap()
                .unwrap();
            assert_eq!(committed.value(&"X".into()).unwrap(), Term::from(2));
        }
    }

    #[test]
    fn guard_rejecting_everything_fails() {
        let beliefs = store(&[lit("f", vec![Term::from(0)])]);
        let guard: &Guard = &greater_than_one;
        let outcome = Unifier::default()
            .holds(&beliefs, &lit("f", vec![Term::var("X")]), &Context::new(), Some(guard), false)
            .unwrap();
        assert!(!*outcome.value());
    }

    #[test]
    fn context_bindings_are_substituted() {
        let beliefs = store(&[
            lit("f", vec![Term::from(1), Term::from(10)]),
            lit("f", vec![Term::from(2), Term::from(20)]),
        ]);
        let mut ctx = Context::new();
        ctx.insert(Variable::new("X").bound(2).unwrap());
        ctx.insert(Variable::new("Y"));

        let committed = Unifier::default()
            .unify(&beliefs, &lit("f", vec![Term::var("X"), Term::var("Y")]), &ctx, None, false)
            .unwrap()
            .unwrap();
        assert_eq!(committed.value(&"Y".into()).unwrap(), Term::from(20));
    }

    #[test]
    fn structural_fallback_reaches_nested_values() {
        let beliefs = store(&[lit(
            "pos",
            vec![Term::from(lit("xy", vec![Term::from(3), Term::from(4)]))],
        )]);
        let query = lit("pos", vec![Term::from(lit("xy", vec![Term::var("X"), Term::var("Y")]))]);
        let committed = Unifier::default()
            .unify(&beliefs, &query, &Context::new(), None, false)
            .unwrap()
            .unwrap();
        assert_eq!(committed.value(&"X".into()).unwrap(), Term::from(3));
        assert_eq!(committed.value(&"Y".into()).unwrap(), Term::from(4));
    }

    #[test]
    fn guard_errors_propagate() {
        let beliefs = store(&[lit("f", vec![Term::from(1)])]);
        let unbound = |ctx: &Context| -> ExecResult<FuzzyValue<bool>> {
            ctx.value(&Path::from("Missing"))?;
            Ok(FuzzyValue::truth())
        };
        let guard: &Guard = &unbound;
        let result = Unifier::default().unify(
            &beliefs,
            &lit("f", vec![Term::var("X")]),
            &Context::new(),
            Some(guard),
            false,
        );
        assert!(result.is_err());
    }
}
