//! Literals: functor path + ordered argument terms + annotations.
//!
//! A literal is immutable after construction. Two hashes are computed up front:
//!
//! - the **identity hash** over functor, negation, `@` flag, and each argument's
//!   identity hash in order (argument position matters);
//! - the **structure hash** over functor text, negation, and each argument's
//!   structure hash, where raw values and variables contribute `0`. Literals built
//!   from one template with different ground values share a structure hash.

use std::sync::Arc;

use crate::error::{TermError, TermResult};
use crate::path::Path;

use super::{Context, Term, Value, Variable, hash_of};

/// Prefix marking a negated literal in functor text.
pub const NEGATION: char = '~';
/// Prefix marking an `@` literal in functor text.
pub const AT: char = '@';

#[derive(Debug)]
struct LiteralInner {
    functor: Path,
    negated: bool,
    at: bool,
    arguments: Vec<Term>,
    annotations: Vec<Literal>,
    hash: u64,
    structure_hash: u64,
    argument_hash: u64,
    annotation_hash: u64,
}

/// An immutable, cheaply clonable structured fact or goal expression.
#[derive(Debug, Clone)]
pub struct Literal {
    inner: Arc<LiteralInner>,
}

impl Literal {
    /// Construct a literal. Fails only on an empty functor.
    pub fn new(
        functor: impl Into<Path>,
        arguments: Vec<Term>,
        negated: bool,
        at: bool,
    ) -> TermResult<Self> {
        Self::with_annotations(functor, arguments, Vec::new(), negated, at)
    }

    /// Construct a literal with annotations.
    pub fn with_annotations(
        functor: impl Into<Path>,
        arguments: Vec<Term>,
        annotations: Vec<Literal>,
        negated: bool,
        at: bool,
    ) -> TermResult<Self> {
        let functor = functor.into();
        if functor.is_empty() {
            return Err(TermError::EmptyFunctor);
        }

        let hash = hash_of(&(
            &functor,
            negated,
            at,
            arguments.iter().map(Term::stable_hash_code).collect::<Vec<_>>(),
        ));
        let argument_hash = hash_of(&arguments.iter().map(Term::structure_hash).collect::<Vec<_>>());
        let annotation_hash = hash_of(
            &annotations
                .iter()
                .map(Literal::structure_hash)
                .collect::<Vec<_>>(),
        );
        let structure_hash = hash_of(&(argument_hash, negated, functor.to_string()));

        Ok(Self {
            inner: Arc::new(LiteralInner {
                functor,
                negated,
                at,
                arguments,
                annotations,
                hash,
                structure_hash,
                argument_hash,
                annotation_hash,
            }),
        })
    }

    /// Construct from functor text where a leading `~` negates and `@` sets the at flag,
    /// e.g. `"~@sensor/hot"`.
    pub fn parse_functor(text: &str, arguments: Vec<Term>) -> TermResult<Self> {
        let negated = text.contains(NEGATION);
        let at = text.contains(AT);
        let clean: String = text.chars().filter(|c| *c != NEGATION && *c != AT).collect();
        Self::new(Path::parse(&clean), arguments, negated, at)
    }

    /// Fully-qualified functor path.
    pub fn fqn_functor(&self) -> &Path {
        &self.inner.functor
    }

    /// Last functor segment.
    pub fn functor(&self) -> &str {
        self.inner.functor.suffix()
    }

    /// Functor prefix (the belief view path).
    pub fn functor_path(&self) -> Path {
        self.inner.functor.prefix()
    }

    pub fn negated(&self) -> bool {
        self.inner.negated
    }

    pub fn has_at(&self) -> bool {
        self.inner.at
    }

    pub fn arguments(&self) -> &[Term] {
        &self.inner.arguments
    }

    pub fn arity(&self) -> usize {
        self.inner.arguments.len()
    }

    pub fn annotations(&self) -> &[Literal] {
        &self.inner.annotations
    }

    pub fn hash_code(&self) -> u64 {
        self.inner.hash
    }

    pub fn structure_hash(&self) -> u64 {
        self.inner.structure_hash
    }

    /// Structure hash over the arguments only.
    pub fn argument_hash(&self) -> u64 {
        self.inner.argument_hash
    }

    /// Structure hash over the annotations only.
    pub fn annotation_hash(&self) -> u64 {
        self.inner.annotation_hash
    }

    pub fn has_variable(&self) -> bool {
        self.inner.arguments.iter().any(Term::has_variable)
            || self.inner.annotations.iter().any(Literal::has_variable)
    }

    /// Distinct variables in first-seen order, arguments before annotations.
    pub fn variables(&self) -> Vec<Variable> {
        let mut found: Vec<Variable> = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    pub(crate) fn collect_variables(&self, found: &mut Vec<Variable>) {
        for term in &self.inner.arguments {
            term.collect_variables(found);
        }
        for annotation in &self.inner.annotations {
            annotation.collect_variables(found);
        }
    }

    /// Arguments that are literals with the given functor path, descending one
    /// segment per nesting level: `values_at(&"a/b".into())` on `f(a(b(1)))` yields `b(1)`.
    pub fn values_at(&self, path: &Path) -> Vec<Term> {
        let Some((head, rest)) = path.split_first() else {
            return self.inner.arguments.clone();
        };
        self.inner
            .arguments
            .iter()
            .filter_map(Term::as_literal)
            .filter(|l| l.fqn_functor().to_string() == head)
            .flat_map(|l| {
                if rest.is_empty() {
                    vec![Term::Literal(l.clone())]
                } else {
                    l.values_at(&rest)
                }
            })
            .collect()
    }

    /// Replace variables by their values in `context`.
    ///
    /// A variable bound in the context becomes its value; a variable present but
    /// unbound is kept; a variable unknown to the context becomes the
    /// [`Value::Empty`] marker. Nested literals recurse.
    pub fn unify(&self, context: &Context) -> Literal {
        self.map_arguments(&|term| match term {
            Term::Variable(v) => match context.get(v.name()) {
                Some(bound) if bound.allocated() => bound.value().unwrap_or_default(),
                Some(unbound) => Term::Variable(unbound.clone()),
                None => Term::Raw(Value::Empty),
            },
            Term::Literal(l) => Term::Literal(l.unify(context)),
            other => other.clone(),
        })
    }

    /// Replace only the variables bound in `context`; all others stay variables.
    pub fn substitute(&self, context: &Context) -> Literal {
        self.map_arguments(&|term| match term {
            Term::Variable(v) => context
                .get(v.name())
                .and_then(Variable::value)
                .unwrap_or_else(|| term.clone()),
            Term::Literal(l) => Term::Literal(l.substitute(context)),
            other => other.clone(),
        })
    }

    /// Materialize a ground candidate: every variable without a value in `context`
    /// becomes the [`Value::Empty`] sentinel, never a variable.
    pub fn allocate(&self, context: &Context) -> Literal {
        self.map_arguments(&|term| match term {
            Term::Variable(v) => context
                .get(v.name())
                .and_then(Variable::value)
                .unwrap_or(Term::Raw(Value::Empty)),
            Term::Literal(l) => Term::Literal(l.allocate(context)),
            other => other.clone(),
        })
    }

    /// Like [`Literal::allocate`] but an unbound variable is a hard error.
    pub fn ground(&self, context: &Context) -> TermResult<Literal> {
        let arguments = self
            .inner
            .arguments
            .iter()
            .map(|term| term.ground(context))
            .collect::<TermResult<Vec<_>>>()?;
        let annotations = self
            .inner
            .annotations
            .iter()
            .map(|a| a.ground(context))
            .collect::<TermResult<Vec<_>>>()?;
        self.rebuild(self.inner.functor.clone(), arguments, annotations)
    }

    /// Fully independent copy; boxed host values are cloned.
    pub fn deep_copy(&self) -> Literal {
        let arguments = self.inner.arguments.iter().map(Term::deep_copy).collect();
        let annotations = self.inner.annotations.iter().map(Literal::deep_copy).collect();
        self.rebuild_unchecked(self.inner.functor.clone(), arguments, annotations)
    }

    /// Copy with `prefix` prepended to the functor; argument instances are shared.
    pub fn shallow_copy(&self, prefix: &Path) -> Literal {
        self.rebuild_unchecked(
            prefix.append(&self.inner.functor),
            self.inner.arguments.clone(),
            self.inner.annotations.clone(),
        )
    }

    /// Copy with the functor prefix removed (the literal as stored inside a view).
    pub fn shallow_copy_suffix(&self) -> Literal {
        self.rebuild_unchecked(
            Path::parse(self.functor()),
            self.inner.arguments.clone(),
            self.inner.annotations.clone(),
        )
    }

    /// Same literal with the negation flag flipped.
    pub fn negate(&self) -> Literal {
        Literal::with_annotations(
            self.inner.functor.clone(),
            self.inner.arguments.clone(),
            self.inner.annotations.clone(),
            !self.inner.negated,
            self.inner.at,
        )
        .unwrap_or_else(|_| self.clone())
    }

    fn map_arguments(&self, f: &dyn Fn(&Term) -> Term) -> Literal {
        let arguments = self.inner.arguments.iter().map(f).collect();
        let annotations = self
            .inner
            .annotations
            .iter()
            .map(|a| a.map_arguments(f))
            .collect();
        self.rebuild_unchecked(self.inner.functor.clone(), arguments, annotations)
    }

    fn rebuild(&self, functor: Path, arguments: Vec<Term>, annotations: Vec<Literal>) -> TermResult<Literal> {
        Literal::with_annotations(functor, arguments, annotations, self.inner.negated, self.inner.at)
    }

    // Functor is known non-empty: it comes from an existing literal.
    fn rebuild_unchecked(&self, functor: Path, arguments: Vec<Term>, annotations: Vec<Literal>) -> Literal {
        Literal::with_annotations(functor, arguments, annotations, self.inner.negated, self.inner.at)
            .unwrap_or_else(|_| self.clone())
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash
                && self.inner.functor == other.inner.functor
                && self.inner.negated == other.inner.negated
                && self.inner.at == other.inner.at
                && self.inner.arguments == other.inner.arguments)
    }
}

impl Eq for Literal {}

impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.inner.hash);
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.inner.negated {
            write!(f, "{NEGATION}")?;
        }
        if self.inner.at {
            write!(f, "{AT}")?;
        }
        write!(f, "{}", self.inner.functor)?;
        if !self.inner.arguments.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.inner.arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        if !self.inner.annotations.is_empty() {
            write!(f, "[")?;
            for (i, ann) in self.inner.annotations.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{ann}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(functor: &str, args: Vec<Term>) -> Literal {
        Literal::new(functor, args, false, false).unwrap()
    }

    #[test]
    fn empty_functor_rejected() {
        assert!(matches!(
            Literal::new("", vec![], false, false),
            Err(TermError::EmptyFunctor)
        ));
        assert!(Literal::new("//", vec![], false, false).is_err());
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a = lit("f", vec![Term::from(1), Term::from(2)]);
        let b = lit("f", vec![Term::from(1), Term::from(2)]);
        let reversed = lit("f", vec![Term::from(2), Term::from(1)]);
        assert_eq!(a, b);
        assert_eq!(a.hash_code(), b.hash_code());
        assert_ne!(a, reversed);
        assert_ne!(a.hash_code(), reversed.hash_code());
    }

    #[test]
    fn flags_participate_in_identity() {
        let plain = lit("f", vec![Term::from(1)]);
        let negated = Literal::new("f", vec![Term::from(1)], true, false).unwrap();
        let at = Literal::new("f", vec![Term::from(1)], false, true).unwrap();
        assert_ne!(plain, negated);
        assert_ne!(plain, at);
        assert_eq!(plain.negate(), negated);
    }

    #[test]
    fn structure_hash_ignores_ground_values() {
        let template = lit("f", vec![Term::var("X"), Term::from(2)]);
        let one = lit("f", vec![Term::from(1), Term::from(2)]);
        let other = lit("f", vec![Term::from("zz"), Term::from(3)]);
        assert_eq!(template.structure_hash(), one.structure_hash());
        assert_eq!(one.structure_hash(), other.structure_hash());

        let nested = lit("f", vec![Term::from(lit("g", vec![Term::from(1)])), Term::from(2)]);
        assert_ne!(nested.structure_hash(), one.structure_hash());
        let negated = Literal::new("f", vec![Term::from(1), Term::from(2)], true, false).unwrap();
        assert_ne!(negated.structure_hash(), one.structure_hash());
    }

    #[test]
    fn parse_functor_flags() {
        let l = Literal::parse_functor("~@a/b", vec![]).unwrap();
        assert!(l.negated());
        assert!(l.has_at());
        assert_eq!(l.functor(), "b");
        assert_eq!(l.functor_path(), Path::parse("a"));
        assert_eq!(l.to_string(), "~@a/b");
    }

    #[test]
    fn deep_copy_is_independent() {
        let shared = Value::boxed(Value::Int(1));
        let original = lit("f", vec![Term::Raw(shared.clone())]);
        let copy = original.deep_copy();
        assert_eq!(copy, original);
        assert!(!Arc::ptr_eq(&copy.inner, &original.inner));

        let Term::Raw(copied) = &copy.arguments()[0] else {
            panic!("expected raw argument");
        };
        copied.replace_boxed(Value::Int(99)).unwrap();
        assert_eq!(original.arguments()[0], Term::from(1));
        assert_eq!(copy.arguments()[0], Term::from(99));
    }

    #[test]
    fn shallow_copy_shares_boxed_arguments() {
        let shared = Value::boxed(Value::Int(1));
        let original = lit("f", vec![Term::Raw(shared.clone())]);
        let moved = original.shallow_copy(&Path::parse("a/b"));
        assert_eq!(moved.fqn_functor(), &Path::parse("a/b/f"));
        shared.replace_boxed(Value::Int(5)).unwrap();
        assert_eq!(moved.arguments()[0], Term::from(5));
        assert_eq!(moved.shallow_copy_suffix(), original);
    }

    #[test]
    fn unify_and_allocate_against_context() {
        let template = lit(
            "f",
            vec![Term::var("X"), Term::var("Y"), Term::var("Z"), Term::from(lit("g", vec![Term::var("X")]))],
        );
        let mut ctx = Context::new();
        ctx.insert(Variable::new("X").bound(1).unwrap());
        ctx.insert(Variable::new("Y"));

        let unified = template.unify(&ctx);
        assert_eq!(unified.arguments()[0], Term::from(1));
        assert!(matches!(unified.arguments()[1], Term::Variable(_)));
        assert_eq!(unified.arguments()[2], Term::Raw(Value::Empty));
        assert_eq!(unified.arguments()[3], Term::from(lit("g", vec![Term::from(1)])));

        let allocated = template.allocate(&ctx);
        assert!(!allocated.has_variable());
        assert_eq!(allocated.arguments()[1], Term::Raw(Value::Empty));

        assert!(matches!(
            template.ground(&ctx),
            Err(TermError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn variables_are_distinct_and_ordered() {
        let l = Literal::with_annotations(
            "f",
            vec![Term::var("X"), Term::from(lit("g", vec![Term::var("Y"), Term::var("X")]))],
            vec![lit("source", vec![Term::var("S")])],
            false,
            false,
        )
        .unwrap();
        let names: Vec<String> = l.variables().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["X", "Y", "S"]);
    }

    #[test]
    fn values_descend_by_functor() {
        let l = lit(
            "f",
            vec![Term::from(lit("a", vec![Term::from(lit("b", vec![Term::from(1)]))])), Term::from(2)],
        );
        let found = l.values_at(&Path::parse("a/b"));
        assert_eq!(found, vec![Term::from(lit("b", vec![Term::from(1)]))]);
        assert_eq!(l.values_at(&Path::empty()).len(), 2);
    }

    #[test]
    fn display_renders_flags_arguments_and_annotations() {
        let l = Literal::with_annotations(
            "a/b",
            vec![Term::from(1), Term::from("x"), Term::var("X")],
            vec![lit("ann", vec![Term::from(1)])],
            true,
            true,
        )
        .unwrap();
        assert_eq!(l.to_string(), "~@a/b(1, \"x\", X)[ann(1)]");
    }
}
