//! Slash-separated paths naming functors, variables, and belief views.
//!
//! A literal `sensor/temperature(21)` has the fully-qualified functor path
//! `sensor/temperature`: the prefix `sensor` addresses a view in the belief
//! store and the suffix `temperature` is the literal's own functor.

use serde::{Deserialize, Serialize};

/// Segment separator.
pub const SEPARATOR: char = '/';

/// An immutable sequence of path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a path, ignoring empty segments (`"a//b/"` is `a/b`).
    pub fn parse(text: &str) -> Self {
        Self {
            segments: text
                .split(SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, or `""` for the empty path.
    pub fn suffix(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Everything but the last segment.
    pub fn prefix(&self) -> Path {
        match self.segments.split_last() {
            Some((_, rest)) => Self {
                segments: rest.to_vec(),
            },
            None => Self::empty(),
        }
    }

    /// First segment and the remaining path.
    pub fn split_first(&self) -> Option<(&str, Path)> {
        self.segments.split_first().map(|(head, rest)| {
            (
                head.as_str(),
                Path {
                    segments: rest.to_vec(),
                },
            )
        })
    }

    /// Concatenate `other` after `self`.
    pub fn append(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// Append a single segment.
    pub fn push(mut self, segment: impl Into<String>) -> Path {
        let segment = segment.into();
        if !segment.is_empty() {
            self.segments.push(segment);
        }
        self
    }

    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl From<String> for Path {
    fn from(text: String) -> Self {
        Path::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_empty_segments() {
        let p = Path::parse("/a//b/c/");
        assert_eq!(p.segments(), &["a", "b", "c"]);
        assert_eq!(p.to_string(), "a/b/c");
    }

    #[test]
    fn prefix_and_suffix() {
        let p = Path::parse("a/b/c");
        assert_eq!(p.suffix(), "c");
        assert_eq!(p.prefix(), Path::parse("a/b"));
        assert_eq!(Path::empty().suffix(), "");
        assert!(Path::parse("c").prefix().is_empty());
    }

    #[test]
    fn split_and_append() {
        let p = Path::parse("a/b/c");
        let (head, rest) = p.split_first().unwrap();
        assert_eq!(head, "a");
        assert_eq!(rest, Path::parse("b/c"));
        assert_eq!(Path::parse("a").append(&rest), p);
        assert!(p.starts_with(&Path::parse("a/b")));
    }
}
