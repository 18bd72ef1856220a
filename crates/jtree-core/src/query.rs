//! Predicate search and the pipe query language.
//!
//! # Step syntax
//!
//! - `$` -- keep the current nodes
//! - `$.key`, `$[2]`, `$.a[0].b` -- resolve a path from each node
//! - `$...key` -- every descendant whose own key is `key`
//! - `$[...]` -- the elements of each array
//! - `${...}` -- the members of each object
//!
//! A combined query such as `$.items[...]...name` is split into these steps
//! and run as a pipe: each step maps the current node list to the next one.

use std::fmt;

use crate::error::{Result, TreeError};
use crate::view::{NodeRef, Nodes};
use crate::walker::{WalkState, Walker};

/// Node predicate for [`NodeRef::search`]. Any `Fn(NodeRef) -> bool`
/// closure is a matcher.
pub trait Matcher {
    fn matches(&self, node: NodeRef<'_>) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(NodeRef<'_>) -> bool,
{
    fn matches(&self, node: NodeRef<'_>) -> bool {
        self(node)
    }
}

/// Search tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Walker depth limit (0 = unlimited), counted from the tree root.
    pub depth_limit: usize,
    /// Do not look for further matches inside a matched container.
    pub skip_nested: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            depth_limit: 0,
            skip_nested: true,
        }
    }
}

impl SearchOptions {
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_nested(mut self, nested: bool) -> Self {
        self.skip_nested = !nested;
        self
    }
}

/// One step of a pipe query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStep {
    /// `$`
    Current,
    /// `$.a[0]`-style path, stored with its leading `$`.
    Path(String),
    /// `$...key`
    DeepKey(String),
    /// `$[...]`
    ArrayItems,
    /// `${...}`
    ObjectMembers,
}

impl QueryStep {
    /// Parse a single pipe step.
    pub fn parse(step: &str) -> Result<QueryStep> {
        let rest = step
            .strip_prefix('$')
            .ok_or_else(|| bad_query(step, "missing `$` prefix"))?;
        if rest.is_empty() {
            return Ok(QueryStep::Current);
        }
        if rest == "[...]" {
            return Ok(QueryStep::ArrayItems);
        }
        if rest == "{...}" {
            return Ok(QueryStep::ObjectMembers);
        }
        if let Some(key) = rest.strip_prefix("...") {
            if key.is_empty() {
                return Err(bad_query(step, "empty deep-search key"));
            }
            return Ok(QueryStep::DeepKey(key.to_string()));
        }
        if rest.starts_with('.') || rest.starts_with('[') {
            return Ok(QueryStep::Path(step.to_string()));
        }
        Err(bad_query(step, "unknown step"))
    }
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryStep::Current => f.write_str("$"),
            QueryStep::Path(path) => f.write_str(path),
            QueryStep::DeepKey(key) => write!(f, "$...{key}"),
            QueryStep::ArrayItems => f.write_str("$[...]"),
            QueryStep::ObjectMembers => f.write_str("${...}"),
        }
    }
}

fn bad_query(query: &str, reason: &str) -> TreeError {
    TreeError::BadQuery(format!("{query:?}: {reason}"))
}

/// Split a combined query into pipe steps.
///
/// Adjacent `.KEY` / `[INDEX]` segments stay together as one path step;
/// `...KEY`, `[...]` and `{...}` each become a step of their own.
///
/// ```
/// use jtree_core::{parse_query, QueryStep};
///
/// let steps = parse_query("$.a[1]...b").unwrap();
/// assert_eq!(
///     steps,
///     vec![QueryStep::Path("$.a[1]".into()), QueryStep::DeepKey("b".into())]
/// );
/// ```
pub fn parse_query(query: &str) -> Result<Vec<QueryStep>> {
    let mut rest = query
        .strip_prefix('$')
        .ok_or_else(|| bad_query(query, "must start with `$`"))?;
    let mut steps = Vec::new();
    let mut path = String::from("$");

    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("...") {
            flush_path(&mut path, &mut steps);
            let (key, tail) = split_key(tail);
            if key.is_empty() {
                return Err(bad_query(query, "empty deep-search key"));
            }
            check_key(query, key)?;
            steps.push(QueryStep::DeepKey(key.to_string()));
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("[...]") {
            flush_path(&mut path, &mut steps);
            steps.push(QueryStep::ArrayItems);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("{...}") {
            flush_path(&mut path, &mut steps);
            steps.push(QueryStep::ObjectMembers);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('.') {
            let (key, tail) = split_key(tail);
            if key.is_empty() {
                return Err(bad_query(query, "empty key"));
            }
            check_key(query, key)?;
            path.push('.');
            path.push_str(key);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('[') {
            let end = tail
                .find(']')
                .ok_or_else(|| bad_query(query, "unterminated `[`"))?;
            let digits = &tail[..end];
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_query(query, "index must be digits"));
            }
            path.push('[');
            path.push_str(digits);
            path.push(']');
            rest = &tail[end + 1..];
        } else if rest.starts_with('{') {
            return Err(bad_query(query, "`{` must open `{...}`"));
        } else {
            return Err(bad_query(query, "expected `.`, `[` or `{`"));
        }
    }
    flush_path(&mut path, &mut steps);
    if steps.is_empty() {
        steps.push(QueryStep::Current);
    }
    Ok(steps)
}

/// Key up to the next `.`, `[` or `{`.
fn split_key(text: &str) -> (&str, &str) {
    let end = text.find(['.', '[', '{']).unwrap_or(text.len());
    text.split_at(end)
}

fn check_key(query: &str, key: &str) -> Result<()> {
    if key.contains([']', '}']) {
        return Err(bad_query(query, "stray closing bracket"));
    }
    Ok(())
}

fn flush_path(path: &mut String, steps: &mut Vec<QueryStep>) {
    if path.len() > 1 {
        steps.push(QueryStep::Path(std::mem::replace(path, String::from("$"))));
    }
}

impl<'a> NodeRef<'a> {
    /// Collect the nodes of this subtree, this node included, for which
    /// `matcher` holds, in walk order. Fails with `NodeAbsent` on Undefined.
    pub fn search<M: Matcher + ?Sized>(
        &self,
        matcher: &M,
        options: SearchOptions,
    ) -> Result<Nodes<'a>> {
        let doc = self.document();
        let start = self.id().ok_or(TreeError::NodeAbsent)?;
        let mut walker = Walker::with_limit(doc, start, options.depth_limit)?;
        let mut found = Nodes::default();
        loop {
            let step = walker.next(doc);
            let Some(id) = step.node else { break };
            if step.state == WalkState::Exit {
                continue;
            }
            let node = doc.node(id);
            if matcher.matches(node) {
                found.push(node);
                if step.state == WalkState::Enter && options.skip_nested {
                    walker.skip()?;
                }
            }
        }
        Ok(found)
    }

    /// Descendants (not this node) whose own key is `key`.
    pub fn search_key(&self, key: &str, options: SearchOptions) -> Result<Nodes<'a>> {
        let start = *self;
        self.search(
            &|node: NodeRef<'_>| {
                node.id() != start.id() && node.parent().is_object() && node.self_key() == key
            },
            options,
        )
    }

    /// Run a combined query with default options.
    ///
    /// ```
    /// use jtree_core::Document;
    ///
    /// let doc = Document::parse_str(r#"{"a":[{"id":1},{"id":2}]}"#).unwrap();
    /// let ids = doc.root().query("$.a[...].id").unwrap();
    /// assert_eq!(ids.len(), 2);
    /// ```
    pub fn query(&self, query: &str) -> Result<Nodes<'a>> {
        self.query_with(query, SearchOptions::default())
    }

    pub fn query_with(&self, query: &str, options: SearchOptions) -> Result<Nodes<'a>> {
        let steps = parse_query(query)?;
        run_steps(*self, &steps, options)
    }

    /// Run an explicit list of `$`-prefixed steps.
    pub fn query_pipe<S: AsRef<str>>(&self, steps: &[S]) -> Result<Nodes<'a>> {
        self.query_pipe_with(steps, SearchOptions::default())
    }

    pub fn query_pipe_with<S: AsRef<str>>(
        &self,
        steps: &[S],
        options: SearchOptions,
    ) -> Result<Nodes<'a>> {
        if steps.is_empty() {
            return Err(TreeError::BadQuery("empty query pipe".to_string()));
        }
        let steps = steps
            .iter()
            .map(|step| QueryStep::parse(step.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        run_steps(*self, &steps, options)
    }
}

fn run_steps<'a>(start: NodeRef<'a>, steps: &[QueryStep], options: SearchOptions) -> Result<Nodes<'a>> {
    let mut current: Nodes<'a> = if start.exists() {
        Nodes::new(vec![start])
    } else {
        Nodes::default()
    };
    for step in steps {
        current = match step {
            QueryStep::Current => current,
            QueryStep::Path(path) => current.path(path),
            QueryStep::DeepKey(key) => current.search_key(key, options)?,
            QueryStep::ArrayItems => current
                .iter()
                .filter(|node| node.is_array())
                .flat_map(|node| node.children())
                .collect(),
            QueryStep::ObjectMembers => current
                .iter()
                .filter(|node| node.is_object())
                .flat_map(|node| node.children())
                .collect(),
        };
        log::trace!("query step {step} -> {} nodes", current.len());
    }
    Ok(current)
}

impl<'a> Nodes<'a> {
    /// [`NodeRef::search`] over every listed node, results concatenated.
    pub fn search<M: Matcher + ?Sized>(
        &self,
        matcher: &M,
        options: SearchOptions,
    ) -> Result<Nodes<'a>> {
        let mut found = Nodes::default();
        for node in self {
            found.extend(node.search(matcher, options)?);
        }
        Ok(found)
    }

    pub fn search_key(&self, key: &str, options: SearchOptions) -> Result<Nodes<'a>> {
        let mut found = Nodes::default();
        for node in self {
            found.extend(node.search_key(key, options)?);
        }
        Ok(found)
    }
}
