//! Single-path resolution: `$`, `$.key`, `$[3]`, `$.a[0].b`, ...
//!
//! A KEY runs up to the next `.` or `[` and may be empty; an INDEX is one or
//! more ASCII digits. Resolution never fails: a missing key, an index out of
//! range or a malformed path all yield Undefined.

use crate::node::Kind;
use crate::view::{NodeRef, Nodes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'p> {
    Key(&'p str),
    Index(usize),
}

/// Split a path into segments, `None` when it is malformed.
pub(crate) fn parse_path(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut rest = path.strip_prefix('$')?;
    let mut segments = Vec::new();
    while let Some(marker) = rest.chars().next() {
        match marker {
            '.' => {
                let tail = &rest[1..];
                let end = tail.find(['.', '[']).unwrap_or(tail.len());
                let key = &tail[..end];
                if key.contains(']') {
                    return None;
                }
                segments.push(Segment::Key(key));
                rest = &tail[end..];
            }
            '[' => {
                let tail = &rest[1..];
                let end = tail.find(']')?;
                let digits = &tail[..end];
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                segments.push(Segment::Index(digits.parse().ok()?));
                rest = &tail[end + 1..];
            }
            _ => return None,
        }
    }
    Some(segments)
}

impl<'a> NodeRef<'a> {
    /// Resolve `path` from this node.
    ///
    /// ```
    /// use jtree_core::Document;
    ///
    /// let doc = Document::parse_str(r#"{"a":[{"b":"x"}]}"#).unwrap();
    /// assert_eq!(doc.root().path("$.a[0].b").as_str().unwrap(), "x");
    /// assert!(!doc.root().path("$.a[1].b").exists());
    /// assert!(!doc.root().path("a[0]").exists());
    /// ```
    pub fn path(&self, path: &str) -> NodeRef<'a> {
        let Some(segments) = parse_path(path) else {
            return NodeRef::undefined(self.document());
        };
        segments
            .into_iter()
            .fold(*self, |node, segment| match segment {
                Segment::Key(key) => node.key(key),
                Segment::Index(index) => node.idx(index),
            })
    }

    /// Path from the tree root to this node, "" for Undefined.
    pub fn self_path(&self) -> String {
        if !self.exists() {
            return String::new();
        }
        let mut steps = Vec::new();
        let mut current = *self;
        loop {
            let parent = current.parent();
            match parent.kind() {
                Kind::Array => steps.push(format!("[{}]", current.self_index())),
                Kind::Object => steps.push(format!(".{}", current.self_key())),
                _ => break,
            }
            current = parent;
        }
        let mut out = String::from("$");
        for step in steps.iter().rev() {
            out.push_str(step);
        }
        out
    }
}

impl<'a> Nodes<'a> {
    /// Resolve `path` from every node, dropping Undefined results.
    pub fn path(&self, path: &str) -> Nodes<'a> {
        self.iter()
            .map(|node| node.path(path))
            .filter(NodeRef::exists)
            .collect()
    }
}
