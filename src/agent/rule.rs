//! Rules: named step sequences called from plan bodies.
//!
//! A rule call `r(1, Y)` selects rules whose head has the same functor and
//! arity, in declaration order. Head variables matched against unbound caller
//! variables become relocate variables, so a successful body writes its results
//! back into the caller's context through [`Context::propagate`].

use crate::error::TermResult;
use crate::path::Path;
use crate::term::{Context, Literal, Term, Variable};

use super::step::Step;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    head: Literal,
    body: Vec<Step>,
}

impl Rule {
    pub fn new(head: Literal, body: Vec<Step>) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &Literal {
        &self.head
    }

    pub fn body(&self) -> &[Step] {
        &self.body
    }

    /// Whether this rule can answer `call` (same functor, negation, and arity).
    pub fn accepts(&self, call: &Literal) -> bool {
        self.head.fqn_functor() == call.fqn_functor()
            && self.head.negated() == call.negated()
            && self.head.arity() == call.arity()
    }

    /// Fresh context for the body: every rule variable unbound.
    pub fn context(&self) -> Context {
        let mut variables = self.head.variables();
        for step in &self.body {
            variables.extend(step.variables());
        }
        Context::from_variables(&variables)
    }

    /// Bind head variables from the call site.
    ///
    /// A head variable matched with an unbound caller variable becomes a
    /// relocate variable targeting it.
    pub(crate) fn bind_head(&self, name: &Path, value: &Term, context: &mut Context) -> TermResult<()> {
        match value {
            Term::Variable(outer) if !outer.allocated() => {
                context.insert(Variable::relocate(name.clone(), outer.name().clone()));
                Ok(())
            }
            bound => context.bind(name, bound.resolved()),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} :- {} steps", self.head, self.body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::expression::{BinaryOp, Expression};
    use crate::term::Value;

    fn lit(functor: &str, arguments: Vec<Term>) -> Literal {
        Literal::new(functor, arguments, false, false).unwrap()
    }

    #[test]
    fn accepts_matching_functor_and_arity() {
        let rule = Rule::new(lit("fact", vec![Term::var("N"), Term::var("R")]), vec![]);
        assert!(rule.accepts(&lit("fact", vec![Term::from(3i64), Term::var("Out")])));
        assert!(!rule.accepts(&lit("fact", vec![Term::from(3i64)])));
        assert!(!rule.accepts(&lit("fib", vec![Term::from(3i64), Term::var("Out")])));
        assert!(!rule.accepts(&lit("fact", vec![Term::from(3i64), Term::var("Out")]).negate()));
    }

    #[test]
    fn context_covers_head_and_body() {
        let rule = Rule::new(
            lit("half", vec![Term::var("N"), Term::var("R")]),
            vec![Step::Assign {
                variable: Path::from("R"),
                expression: Expression::binary(
                    BinaryOp::Divide,
                    Expression::var("N"),
                    Expression::constant(2i64),
                ),
            }],
        );
        let context = rule.context();
        assert!(context.contains(&Path::from("N")));
        assert!(context.contains(&Path::from("R")));
        assert_eq!(context.bound_names().len(), 0);
    }

    #[test]
    fn unbound_caller_variable_becomes_relocate() {
        let rule = Rule::new(lit("r", vec![Term::var("A"), Term::var("B")]), vec![]);
        let mut context = rule.context();
        rule.bind_head(&Path::from("A"), &Term::from(7i64), &mut context).unwrap();
        rule.bind_head(&Path::from("B"), &Term::var("Y"), &mut context).unwrap();

        assert_eq!(context.value(&Path::from("A")).unwrap().raw().unwrap(), Value::Int(7));
        let b = context.get(&Path::from("B")).unwrap();
        assert_eq!(b.relocate_target(), Some(&Path::from("Y")));
        assert!(!b.allocated());
    }
}
