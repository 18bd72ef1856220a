//! Read-only views over a [`Document`]: [`NodeRef`] and [`Nodes`].
//!
//! A `NodeRef` pairs a document with an optional node handle. The empty case
//! is the Undefined sentinel: every navigation accessor on it, and every
//! failed lookup, yields Undefined again, so chains like
//! `root.key("a").idx(3).key("b")` never need intermediate checks.

use std::fmt;
use std::ops::Deref;

use crate::error::{Result, TreeError};
use crate::node::{Body, Document, Kind, NodeData, NodeId, Scalar};

/// Copyable read view of one node (or of Undefined).
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: Option<NodeId>,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(doc: &'a Document, id: Option<NodeId>) -> Self {
        let id = id.filter(|id| doc.contains(*id));
        Self { doc, id }
    }

    pub(crate) fn undefined(doc: &'a Document) -> Self {
        Self { doc, id: None }
    }

    /// Handle of the viewed node, `None` for Undefined.
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    fn data(&self) -> Option<&'a NodeData> {
        self.id.and_then(|id| self.doc.data(id))
    }

    fn body(&self) -> Option<&'a Body> {
        self.data().map(|d| &d.body)
    }

    fn with(&self, id: Option<NodeId>) -> NodeRef<'a> {
        NodeRef::new(self.doc, id)
    }

    pub fn kind(&self) -> Kind {
        self.body().map_or(Kind::Undefined, Body::kind)
    }

    /// True unless this is Undefined.
    pub fn exists(&self) -> bool {
        self.data().is_some()
    }

    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    pub fn is_bool(&self) -> bool {
        self.kind() == Kind::Bool
    }

    pub fn is_number(&self) -> bool {
        self.kind() == Kind::Number
    }

    /// True for numbers without a fractional part that fit an `i64`.
    pub fn is_int(&self) -> bool {
        matches!(self.body(), Some(Body::Number(n)) if is_integral(*n))
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    pub fn is_array(&self) -> bool {
        self.kind() == Kind::Array
    }

    pub fn is_object(&self) -> bool {
        self.kind() == Kind::Object
    }

    /// True for arrays and objects.
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// True for existing nodes that are not containers.
    pub fn is_scalar(&self) -> bool {
        self.exists() && !self.is_container()
    }

    /// Array element at `index`; Undefined when out of range or not an array.
    pub fn idx(&self, index: usize) -> NodeRef<'a> {
        match self.body() {
            Some(Body::Array(items)) => self.with(items.get(index).copied()),
            _ => NodeRef::undefined(self.doc),
        }
    }

    /// Object member `key`; Undefined when absent or not an object.
    pub fn key(&self, key: &str) -> NodeRef<'a> {
        match self.body() {
            Some(Body::Object(entries)) => self.with(entries.get(key).copied()),
            _ => NodeRef::undefined(self.doc),
        }
    }

    /// Parent container; Undefined for roots, detached nodes and Undefined.
    pub fn parent(&self) -> NodeRef<'a> {
        self.with(self.data().and_then(|d| d.parent))
    }

    /// Number of children, 0 for scalars and Undefined.
    pub fn len(&self) -> usize {
        self.body().map_or(0, Body::child_count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Children in storage order; empty for scalars and Undefined.
    pub fn children(&self) -> Nodes<'a> {
        let ids = self.body().map(Body::child_ids).unwrap_or_default();
        Nodes::new(ids.into_iter().map(|id| self.with(Some(id))).collect())
    }

    /// Object keys in storage order; empty for anything else.
    pub fn children_keys(&self) -> Vec<&'a str> {
        match self.body() {
            Some(Body::Object(entries)) => entries.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Position in the parent array, 0 when the parent is not an array.
    pub fn self_index(&self) -> usize {
        match (self.data(), self.parent().kind()) {
            (Some(data), Kind::Array) => data.index,
            _ => 0,
        }
    }

    /// Key in the parent object, "" when the parent is not an object.
    pub fn self_key(&self) -> &'a str {
        let Some(data) = self.data() else {
            return "";
        };
        match self.parent().body() {
            Some(Body::Object(entries)) => entries
                .get_index(data.index)
                .map_or("", |(key, _)| key.as_str()),
            _ => "",
        }
    }

    /// Next node in document order: first child, else next sibling, else the
    /// next sibling of the nearest ancestor that has one. Undefined at the end.
    pub fn next_node(&self) -> NodeRef<'a> {
        if let Some(first) = self.body().and_then(|b| b.child_at(0)) {
            return self.with(Some(first));
        }
        let mut current = *self;
        loop {
            let Some(data) = current.data() else {
                return NodeRef::undefined(self.doc);
            };
            let parent = current.parent();
            let Some(parent_body) = parent.body() else {
                return NodeRef::undefined(self.doc);
            };
            if let Some(sibling) = parent_body.child_at(data.index + 1) {
                return self.with(Some(sibling));
            }
            current = parent;
        }
    }

    /// String value.
    pub fn as_str(&self) -> Result<&'a str> {
        match self.body() {
            Some(Body::String(s)) => Ok(s.as_str()),
            Some(other) => Err(mismatch(Kind::String, other.kind())),
            None => Err(TreeError::NodeAbsent),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self.body() {
            Some(Body::Bool(b)) => Ok(*b),
            Some(other) => Err(mismatch(Kind::Bool, other.kind())),
            None => Err(TreeError::NodeAbsent),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self.body() {
            Some(Body::Number(n)) => Ok(*n),
            Some(other) => Err(mismatch(Kind::Number, other.kind())),
            None => Err(TreeError::NodeAbsent),
        }
    }

    /// Integer value; fails with `NotInteger` for fractional numbers.
    pub fn as_i64(&self) -> Result<i64> {
        let n = self.as_f64()?;
        if is_integral(n) {
            Ok(n as i64)
        } else {
            Err(TreeError::NotInteger(n))
        }
    }

    /// Owned scalar value, `None` for containers and Undefined.
    pub fn scalar(&self) -> Option<Scalar> {
        match self.body()? {
            Body::Null => Some(Scalar::Null),
            Body::Bool(b) => Some(Scalar::Bool(*b)),
            Body::Number(n) => Some(Scalar::Number(*n)),
            Body::String(s) => Some(Scalar::String(s.clone())),
            Body::Array(_) | Body::Object(_) => None,
        }
    }
}

/// Identity comparison: same document and same node (or both Undefined).
impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "NodeRef({:?}, {})", id, self.kind()),
            None => f.write_str("NodeRef(undefined)"),
        }
    }
}

fn mismatch(expected: Kind, found: Kind) -> TreeError {
    TreeError::TypeMismatch { expected, found }
}

pub(crate) fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n.abs() < 9.2e18
}

/// An ordered list of node views, the working set of searches and queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Nodes<'a>(Vec<NodeRef<'a>>);

impl<'a> Nodes<'a> {
    pub fn new(nodes: Vec<NodeRef<'a>>) -> Self {
        Self(nodes)
    }

    /// Handles of the listed nodes, skipping Undefined entries.
    pub fn ids(&self) -> Vec<NodeId> {
        self.0.iter().filter_map(NodeRef::id).collect()
    }

    pub fn into_vec(self) -> Vec<NodeRef<'a>> {
        self.0
    }

    pub(crate) fn push(&mut self, node: NodeRef<'a>) {
        self.0.push(node);
    }

    pub(crate) fn extend(&mut self, other: Nodes<'a>) {
        self.0.extend(other.0);
    }
}

impl<'a> Deref for Nodes<'a> {
    type Target = [NodeRef<'a>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for Nodes<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = std::vec::IntoIter<NodeRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, 'n> IntoIterator for &'n Nodes<'a> {
    type Item = &'n NodeRef<'a>;
    type IntoIter = std::slice::Iter<'n, NodeRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> FromIterator<NodeRef<'a>> for Nodes<'a> {
    fn from_iter<I: IntoIterator<Item = NodeRef<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
