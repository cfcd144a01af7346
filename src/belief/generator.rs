//! Lazy view creation.

use std::sync::Arc;

use crate::path::Path;

use super::View;

/// Creates a view for a path segment that does not exist yet.
pub trait ViewGenerator: Send + Sync {
    /// Build the view named `name` that will be attached below `parent`.
    fn generate(&self, name: &str, parent: &Path) -> Arc<View>;
}

/// Generates empty views.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyViewGenerator;

impl ViewGenerator for EmptyViewGenerator {
    fn generate(&self, name: &str, _parent: &Path) -> Arc<View> {
        Arc::new(View::new(name))
    }
}

/// Generates views from a JSON document keyed by the full path of the new view.
///
/// A path absent from the document yields an empty view.
#[derive(Debug, Clone)]
pub struct JsonViewGenerator {
    document: serde_json::Value,
}

impl JsonViewGenerator {
    pub fn new(document: serde_json::Value) -> Self {
        Self { document }
    }
}

impl ViewGenerator for JsonViewGenerator {
    fn generate(&self, name: &str, parent: &Path) -> Arc<View> {
        let path = parent.clone().push(name);
        let found = path
            .segments()
            .iter()
            .try_fold(&self.document, |node, segment| node.get(segment.as_str()));
        match found {
            Some(json) => Arc::new(View::from_json(name, json)),
            None => Arc::new(View::new(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_generator_seeds_nested_view() {
        let generator = JsonViewGenerator::new(serde_json::json!({
            "a": { "b": { "temp": 21 } }
        }));
        let view = generator.generate("b", &Path::parse("a"));
        assert_eq!(view.name(), "b");
        assert_eq!(view.len(), 1);

        let missing = generator.generate("zz", &Path::empty());
        assert!(missing.is_empty());
    }
}
