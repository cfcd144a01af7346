//! Belief view nodes.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::{BeliefError, BeliefResult};
use crate::path::Path;
use crate::term::{Literal, Term, Value};

use super::{EmptyViewGenerator, ViewGenerator};

/// Literal bucket key: negation flag and functor suffix.
type BucketKey = (bool, String);

/// A named node of the belief tree.
///
/// Literals are stored relative to the view (functor suffix only) and
/// re-prefixed with the walked path when read, so a view keeps its content
/// when it is cloned or aliased under another parent.
#[derive(Debug)]
pub struct View {
    name: String,
    children: RwLock<BTreeMap<String, Arc<View>>>,
    literals: RwLock<BTreeMap<BucketKey, Vec<Literal>>>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: RwLock::new(BTreeMap::new()),
            literals: RwLock::new(BTreeMap::new()),
        }
    }

    /// The unnamed root of an agent's belief tree.
    pub fn root() -> Self {
        Self::new("")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a view from a JSON document.
    ///
    /// Objects become child views, arrays become a literal with one argument per
    /// element, scalars become a one-argument literal named after their key.
    pub fn from_json(name: impl Into<String>, json: &serde_json::Value) -> Self {
        let view = Self::new(name);
        match json {
            serde_json::Value::Object(map) => {
                for (key, value) in map {
                    view.insert_json(key, value);
                }
            }
            other => view.insert_json("value", other),
        }
        view
    }

    fn insert_json(&self, key: &str, json: &serde_json::Value) {
        let arguments: Vec<Term> = match json {
            serde_json::Value::Object(_) => {
                let child = Arc::new(View::from_json(key, json));
                self.write_children().insert(key.to_owned(), child);
                return;
            }
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| Term::Raw(Value::from_json(item)))
                .collect(),
            scalar => vec![Term::Raw(Value::from_json(scalar))],
        };
        let added = Literal::new(key, arguments, false, false)
            .map_err(|e| e.to_string())
            .and_then(|literal| {
                self.add(&literal, Some(&EmptyViewGenerator))
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = added {
            tracing::trace!(key, %error, "skipping json entry");
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add `literal` to the view addressed by its functor prefix.
    ///
    /// Returns `false` when an identical literal is already stored. Missing
    /// views are created with `generator`, or reported as
    /// [`BeliefError::ViewNotFound`] without one.
    pub fn add(&self, literal: &Literal, generator: Option<&dyn ViewGenerator>) -> BeliefResult<bool> {
        let stored = literal.shallow_copy_suffix();
        self.descend(&literal.functor_path(), &Path::empty(), generator, |view| {
            let key = (stored.negated(), stored.functor().to_owned());
            let mut literals = view.write_literals();
            let bucket = literals.entry(key).or_default();
            if bucket.contains(&stored) {
                false
            } else {
                bucket.push(stored);
                true
            }
        })
    }

    /// Attach an owned subtree below `parent`.
    pub fn add_view(
        &self,
        parent: &Path,
        view: View,
        generator: Option<&dyn ViewGenerator>,
    ) -> BeliefResult<()> {
        self.alias(parent, Arc::new(view), generator)
    }

    /// Attach an externally owned view below `parent`; both owners see the same content.
    pub fn alias(
        &self,
        parent: &Path,
        view: Arc<View>,
        generator: Option<&dyn ViewGenerator>,
    ) -> BeliefResult<()> {
        if view.name.is_empty() {
            return Err(BeliefError::EmptyPath);
        }
        self.descend(parent, &Path::empty(), generator, |node| {
            if view.reaches(node) {
                return Err(BeliefError::CyclicAlias {
                    name: view.name.clone(),
                    parent: parent.to_string(),
                });
            }
            let mut children = node.write_children();
            if children.contains_key(&view.name) {
                return Err(BeliefError::ViewExists {
                    name: view.name.clone(),
                    parent: parent.to_string(),
                });
            }
            children.insert(view.name.clone(), view);
            Ok(())
        })?
    }

    /// Remove `literal`. Returns whether it was present.
    pub fn remove(&self, literal: &Literal) -> bool {
        let stored = literal.shallow_copy_suffix();
        self.descend(&literal.functor_path(), &Path::empty(), None, |view| {
            let key = (stored.negated(), stored.functor().to_owned());
            let mut literals = view.write_literals();
            let Some(bucket) = literals.get_mut(&key) else {
                return false;
            };
            let before = bucket.len();
            bucket.retain(|l| l != &stored);
            let removed = bucket.len() != before;
            if bucket.is_empty() {
                literals.remove(&key);
            }
            removed
        })
        .unwrap_or(false)
    }

    /// Remove the view at `path` with everything below it.
    pub fn remove_view(&self, path: &Path) -> bool {
        if path.is_empty() {
            return false;
        }
        self.descend(&path.prefix(), &Path::empty(), None, |parent| {
            parent.write_children().remove(path.suffix()).is_some()
        })
        .unwrap_or(false)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn contains_literal(&self, literal: &Literal) -> bool {
        let stored = literal.shallow_copy_suffix();
        self.descend(&literal.functor_path(), &Path::empty(), None, |view| {
            view.read_literals()
                .get(&(stored.negated(), stored.functor().to_owned()))
                .is_some_and(|bucket| bucket.contains(&stored))
        })
        .unwrap_or(false)
    }

    pub fn contains_view(&self, path: &Path) -> bool {
        self.descend(path, &Path::empty(), None, |_| ()).is_ok()
    }

    /// The child view at `path`, if any. The empty path has no child.
    pub fn view(&self, path: &Path) -> Option<Arc<View>> {
        let (head, rest) = path.split_first()?;
        let child = self.read_children().get(head).cloned()?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.view(&rest)
        }
    }

    /// Stored literals with the given negation flag and fully-qualified functor.
    ///
    /// This is the unifier's candidate fetch: one tree walk and one bucket lookup.
    pub fn matching(&self, negated: bool, fqn_functor: &Path) -> Vec<Literal> {
        let prefix = fqn_functor.prefix();
        self.descend(&prefix, &Path::empty(), None, |view| {
            view.read_literals()
                .get(&(negated, fqn_functor.suffix().to_owned()))
                .map(|bucket| bucket.iter().map(|l| l.shallow_copy(&prefix)).collect())
                .unwrap_or_default()
        })
        .unwrap_or_default()
    }

    /// Every literal at or below `path`.
    ///
    /// When `path` ends in a functor rather than a view, the literals with that
    /// functor are included as well.
    pub fn literals_at(&self, path: &Path) -> Vec<Literal> {
        let mut found = Vec::new();
        if path.is_empty() {
            self.collect_literals(path, &mut found);
            return found;
        }
        if let Some(view) = self.view(path) {
            view.collect_literals(path, &mut found);
        }
        found.extend(self.matching(false, path));
        found.extend(self.matching(true, path));
        found
    }

    /// All literals keyed by fully-qualified functor path.
    pub fn literals(&self) -> BTreeMap<Path, Vec<Literal>> {
        let mut all = Vec::new();
        self.collect_literals(&Path::empty(), &mut all);
        let mut keyed: BTreeMap<Path, Vec<Literal>> = BTreeMap::new();
        for literal in all {
            keyed.entry(literal.fqn_functor().clone()).or_default().push(literal);
        }
        keyed
    }

    /// All descendant views keyed by path.
    pub fn views(&self) -> BTreeMap<Path, Arc<View>> {
        let mut found = BTreeMap::new();
        self.collect_views(&Path::empty(), &mut found);
        found
    }

    /// Number of literals at or below this view.
    pub fn len(&self) -> usize {
        let own: usize = self.read_literals().values().map(Vec::len).sum();
        let nested: usize = self.read_children().values().map(|c| c.len()).sum();
        own + nested
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Walk `path`, creating missing views with `generator`, and run `f` on the target.
    fn descend<R>(
        &self,
        path: &Path,
        walked: &Path,
        generator: Option<&dyn ViewGenerator>,
        f: impl FnOnce(&View) -> R,
    ) -> BeliefResult<R> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(f(self));
        };
        let here = walked.clone().push(head);
        let existing = self.read_children().get(head).cloned();
        let child = match (existing, generator) {
            (Some(child), _) => child,
            (None, Some(generator)) => {
                let mut children = self.write_children();
                children
                    .entry(head.to_owned())
                    .or_insert_with(|| {
                        tracing::trace!(path = %here, "creating view");
                        generator.generate(head, walked)
                    })
                    .clone()
            }
            (None, None) => {
                return Err(BeliefError::ViewNotFound {
                    path: here.to_string(),
                });
            }
        };
        child.descend(&rest, &here, generator, f)
    }

    /// Whether `target` is this view or lies below it.
    fn reaches(&self, target: &View) -> bool {
        std::ptr::eq(self, target) || self.read_children().values().any(|c| c.reaches(target))
    }

    fn collect_literals(&self, prefix: &Path, out: &mut Vec<Literal>) {
        for bucket in self.read_literals().values() {
            out.extend(bucket.iter().map(|l| l.shallow_copy(prefix)));
        }
        for (name, child) in self.read_children().iter() {
            child.collect_literals(&prefix.clone().push(name.as_str()), out);
        }
    }

    fn collect_views(&self, prefix: &Path, out: &mut BTreeMap<Path, Arc<View>>) {
        for (name, child) in self.read_children().iter() {
            let path = prefix.clone().push(name.as_str());
            child.collect_views(&path, out);
            out.insert(path, Arc::clone(child));
        }
    }

    fn read_children(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Arc<View>>> {
        self.children.read().expect("view lock poisoned")
    }

    fn write_children(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Arc<View>>> {
        self.children.write().expect("view lock poisoned")
    }

    fn read_literals(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<BucketKey, Vec<Literal>>> {
        self.literals.read().expect("view lock poisoned")
    }

    fn write_literals(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<BucketKey, Vec<Literal>>> {
        self.literals.write().expect("view lock poisoned")
    }
}

/// Deep structural copy: fresh nodes, same content.
impl Clone for View {
    fn clone(&self) -> Self {
        let children = self
            .read_children()
            .iter()
            .map(|(name, child)| (name.clone(), Arc::new(View::clone(child))))
            .collect();
        let literals = self
            .read_literals()
            .iter()
            .map(|(key, bucket)| (key.clone(), bucket.iter().map(Literal::deep_copy).collect()))
            .collect();
        Self {
            name: self.name.clone(),
            children: RwLock::new(children),
            literals: RwLock::new(literals),
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(functor: &str, args: Vec<Term>) -> Literal {
        Literal::new(functor, args, false, false).unwrap()
    }

    #[test]
    fn lazy_creation_with_generator() {
        let root = View::root();
        let fact = lit("a/b/c", vec![]);

        assert!(matches!(
            root.add(&fact, None),
            Err(BeliefError::ViewNotFound { .. })
        ));
        assert!(!root.contains_view(&Path::parse("a/b")));

        assert!(root.add(&fact, Some(&EmptyViewGenerator)).unwrap());
        assert!(root.contains_view(&Path::parse("a/b")));
        assert!(root.contains_literal(&fact));

        assert!(root.remove(&fact));
        assert!(!root.remove(&fact));
        assert!(!root.contains_literal(&fact));
    }

    #[test]
    fn duplicate_add_reports_false() {
        let root = View::root();
        let fact = lit("f", vec![Term::from(1)]);
        assert!(root.add(&fact, None).unwrap());
        assert!(!root.add(&fact, None).unwrap());
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn matching_respects_negation_and_path() {
        let root = View::root();
        let g = Some(&EmptyViewGenerator as &dyn ViewGenerator);
        root.add(&lit("s/hot", vec![Term::from(1)]), g).unwrap();
        root.add(&Literal::new("s/hot", vec![Term::from(2)], true, false).unwrap(), g)
            .unwrap();
        root.add(&lit("hot", vec![Term::from(3)]), g).unwrap();

        let positive = root.matching(false, &Path::parse("s/hot"));
        assert_eq!(positive, vec![lit("s/hot", vec![Term::from(1)])]);
        assert_eq!(root.matching(true, &Path::parse("s/hot")).len(), 1);
        assert!(root.matching(false, &Path::parse("x/hot")).is_empty());
    }

    #[test]
    fn literals_at_is_transitive() {
        let root = View::root();
        let g = Some(&EmptyViewGenerator as &dyn ViewGenerator);
        root.add(&lit("a/x", vec![]), g).unwrap();
        root.add(&lit("a/b/y", vec![]), g).unwrap();
        root.add(&lit("z", vec![]), g).unwrap();

        let under_a = root.literals_at(&Path::parse("a"));
        assert_eq!(under_a.len(), 2);
        assert!(under_a.contains(&lit("a/b/y", vec![])));
        assert_eq!(root.literals_at(&Path::parse("a/x")), vec![lit("a/x", vec![])]);
        assert_eq!(root.literals().len(), 3);
        assert_eq!(root.views().len(), 2);
    }

    #[test]
    fn clone_is_independent() {
        let root = View::root();
        root.add(&lit("a/x", vec![]), Some(&EmptyViewGenerator)).unwrap();
        let copy = root.clone();
        copy.add(&lit("a/y", vec![]), None).unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn alias_shares_content_and_rejects_collisions() {
        let root = View::root();
        let shared = Arc::new(View::new("ext"));
        root.alias(&Path::empty(), Arc::clone(&shared), None).unwrap();
        shared.add(&lit("v", vec![Term::from(1)]), None).unwrap();
        assert!(root.contains_literal(&lit("ext/v", vec![Term::from(1)])));

        let err = root.alias(&Path::empty(), Arc::new(View::new("ext")), None);
        assert!(matches!(err, Err(BeliefError::ViewExists { .. })));
        assert!(root.remove_view(&Path::parse("ext")));
        assert!(!root.contains_view(&Path::parse("ext")));
    }

    #[test]
    fn alias_below_itself_is_rejected() {
        let root = View::root();
        let a = Arc::new(View::new("a"));
        root.alias(&Path::empty(), Arc::clone(&a), None).unwrap();
        a.add_view(&Path::empty(), View::new("b"), None).unwrap();

        let onto_self = a.alias(&Path::empty(), Arc::clone(&a), None);
        assert!(matches!(onto_self, Err(BeliefError::CyclicAlias { .. })));
        let below = root.alias(&Path::parse("a/b"), Arc::clone(&a), None);
        assert!(matches!(below, Err(BeliefError::CyclicAlias { .. })));

        assert!(!root.contains_view(&Path::parse("a/a")));
        assert_eq!(root.views().len(), 2);
        assert_eq!(root.clone().len(), 0);
    }

    #[test]
    fn boxed_belief_survives_mutation() {
        let root = View::root();
        let shared = Value::boxed(Value::Int(1));
        let fact = lit("counter", vec![Term::Raw(shared.clone())]);
        root.add(&fact, None).unwrap();

        shared.replace_boxed(Value::Int(2)).unwrap();
        assert!(root.contains_literal(&fact));
        assert!(root.remove(&fact));
        assert!(root.is_empty());
    }

    #[test]
    fn concurrent_mutation_and_reads() {
        let root = View::root();
        let g = Some(&EmptyViewGenerator as &dyn ViewGenerator);
        root.add(&lit("fixed/keep", vec![]), g).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200i64 {
                    let fact = lit("s/tick", vec![Term::from(i)]);
                    root.add(&fact, Some(&EmptyViewGenerator)).unwrap();
                    if i % 2 == 0 {
                        assert!(root.remove(&fact));
                    }
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    let snapshot = root.literals();
                    assert!(snapshot.contains_key(&Path::parse("fixed/keep")));
                    assert!(root.len() >= 1);
                }
            });
        });

        assert_eq!(root.matching(false, &Path::parse("s/tick")).len(), 100);
        assert_eq!(root.len(), 101);
    }

    #[test]
    fn json_objects_become_views() {
        let view = View::from_json(
            "env",
            &serde_json::json!({
                "room": { "temp": 21, "doors": [1, 2] },
                "online": true
            }),
        );
        assert!(view.contains_view(&Path::parse("room")));
        assert!(view.contains_literal(&lit("room/temp", vec![Term::from(21)])));
        assert!(view.contains_literal(&lit("room/doors", vec![Term::from(1), Term::from(2)])));
        assert!(view.contains_literal(&lit("online", vec![Term::from(true)])));
        assert_eq!(view.len(), 3);
    }
}
