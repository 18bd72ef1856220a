//! Node model: the [`Document`] arena, node handles and scalar values.
//!
//! Every node of every tree lives in the arena of one [`Document`] and is
//! addressed by a copyable [`NodeId`]. Containers own their children as id
//! lists; every node records its parent and its position among its siblings.
//!
//! - Arrays hold `Vec<NodeId>`; a child's `index` is its position.
//! - Objects hold an `IndexMap<String, NodeId>`: child order and the
//!   key→position map are the same structure, so they cannot drift apart.
//!   A child's key is read back from the map at the child's `index`.
//!
//! Nodes returned by the constructors are detached (no parent) until the
//! mutation engine attaches them somewhere.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{Result, TreeError};
use crate::view::NodeRef;

/// Node kind. `Undefined` is only ever reported for absent nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    Undefined,
}

impl Kind {
    pub fn is_container(self) -> bool {
        matches!(self, Kind::Array | Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Handle of a node inside a [`Document`].
///
/// Handles are only meaningful for the document that issued them; readers
/// treat foreign or stale handles as Undefined and mutators reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An owned scalar JSON value, used by the typed constructors and shorthands.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<()> for Scalar {
    fn from(_: ()) -> Self {
        Scalar::Null
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(f64::from(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Body {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
}

impl Body {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Body::Null => Kind::Null,
            Body::Bool(_) => Kind::Bool,
            Body::Number(_) => Kind::Number,
            Body::String(_) => Kind::String,
            Body::Array(_) => Kind::Array,
            Body::Object(_) => Kind::Object,
        }
    }

    pub(crate) fn child_count(&self) -> usize {
        match self {
            Body::Array(items) => items.len(),
            Body::Object(entries) => entries.len(),
            _ => 0,
        }
    }

    pub(crate) fn child_at(&self, index: usize) -> Option<NodeId> {
        match self {
            Body::Array(items) => items.get(index).copied(),
            Body::Object(entries) => entries.get_index(index).map(|(_, id)| *id),
            _ => None,
        }
    }

    pub(crate) fn child_ids(&self) -> Vec<NodeId> {
        match self {
            Body::Array(items) => items.clone(),
            Body::Object(entries) => entries.values().copied().collect(),
            _ => Vec::new(),
        }
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Null => Body::Null,
            Scalar::Bool(b) => Body::Bool(b),
            Scalar::Number(n) => Body::Number(n),
            Scalar::String(s) => Body::String(s),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    /// Position among the parent's children; meaningless while detached.
    pub(crate) index: usize,
    pub(crate) body: Body,
}

/// Arena owning the nodes of one or more trees.
///
/// A document usually has a root (the parsed value) but may also hold any
/// number of detached nodes waiting to be attached. Removed nodes stay in the
/// arena as detached nodes until the document is dropped or replaced by
/// [`Document::compacted`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    /// Create an empty document without a root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read view of the document root, Undefined when no root is set.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, self.root)
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Install a detached node as the document root.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        let data = self.data(id).ok_or(TreeError::InvalidOperation("set root"))?;
        if data.parent.is_some() {
            return Err(TreeError::AlreadyAttached);
        }
        self.root = Some(id);
        Ok(())
    }

    /// Read view of any node of this document.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, Some(id))
    }

    /// Number of nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Kind of a node, `Kind::Undefined` for unknown handles.
    pub fn kind(&self, id: NodeId) -> Kind {
        self.data(id).map_or(Kind::Undefined, |d| d.body.kind())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    /// Create an empty array node.
    pub fn new_array(&mut self) -> NodeId {
        self.alloc(Body::Array(Vec::new()))
    }

    /// Create an empty object node.
    pub fn new_object(&mut self) -> NodeId {
        self.alloc(Body::Object(IndexMap::new()))
    }

    pub fn new_string(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(Body::String(value.into()))
    }

    pub fn new_bool(&mut self, value: bool) -> NodeId {
        self.alloc(Body::Bool(value))
    }

    pub fn new_number(&mut self, value: f64) -> NodeId {
        self.alloc(Body::Number(value))
    }

    /// Create a number node from an integer; stored as `f64` like every number.
    pub fn new_int(&mut self, value: i64) -> NodeId {
        self.alloc(Body::Number(value as f64))
    }

    pub fn new_null(&mut self) -> NodeId {
        self.alloc(Body::Null)
    }

    pub fn new_scalar(&mut self, value: impl Into<Scalar>) -> NodeId {
        self.alloc(Body::from_scalar(value.into()))
    }

    /// Detached structural copy of the subtree rooted at `id`.
    ///
    /// Copies are built with an explicit work list, so the depth of the
    /// source tree is not limited by the call stack.
    pub fn deep_copy(&mut self, id: NodeId) -> Result<NodeId> {
        let body = self
            .body(id)
            .map(shallow)
            .ok_or(TreeError::InvalidOperation("deep copy"))?;
        let top = self.alloc(body);
        let mut work = vec![(id, top)];
        while let Some((src, dst)) = work.pop() {
            let children = match self.data(src) {
                Some(d) => d.body.child_ids(),
                None => continue,
            };
            for (position, child) in children.into_iter().enumerate() {
                let body = match self.data(child) {
                    Some(d) => shallow(&d.body),
                    None => continue,
                };
                let copy = self.alloc(body);
                let key = self.key_at(src, position);
                self.link_child(dst, copy, key)?;
                work.push((child, copy));
            }
        }
        Ok(top)
    }

    /// Copy of the tree under the root into a fresh arena. Removed and other
    /// detached nodes are left behind, so this is how a long editing session
    /// reclaims memory. Handles of `self` do not carry over.
    pub fn compacted(&self) -> Document {
        let mut out = Document::new();
        let Some(root) = self.root else {
            return out;
        };
        let Some(body) = self.body(root).map(shallow) else {
            return out;
        };
        let top = out.alloc(body);
        out.root = Some(top);
        let mut work = vec![(root, top)];
        while let Some((src, dst)) = work.pop() {
            let Some(data) = self.data(src) else { continue };
            for (position, child) in data.body.child_ids().into_iter().enumerate() {
                let Some(body) = self.body(child).map(shallow) else {
                    continue;
                };
                let copy = out.alloc(body);
                // Fresh nodes in a fresh container cannot collide.
                if out.link_child(dst, copy, self.key_at(src, position)).is_ok() {
                    work.push((child, copy));
                }
            }
        }
        out
    }

    /// New detached array holding deep copies of `ids`, in order.
    pub fn collect_array(&mut self, ids: &[NodeId]) -> Result<NodeId> {
        let array = self.new_array();
        for &id in ids {
            let copy = self.deep_copy(id)?;
            self.link_child(array, copy, None)?;
        }
        Ok(array)
    }

    pub(crate) fn alloc(&mut self, body: Body) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            index: 0,
            body,
        });
        id
    }

    pub(crate) fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn body(&self, id: NodeId) -> Option<&Body> {
        self.data(id).map(|d| &d.body)
    }

    pub(crate) fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.body(id).and_then(|b| b.child_at(index))
    }

    pub(crate) fn child_count(&self, id: NodeId) -> usize {
        self.body(id).map_or(0, Body::child_count)
    }

    /// Key of the child at `index` when `id` is an object.
    pub(crate) fn key_at(&self, id: NodeId, index: usize) -> Option<String> {
        match self.body(id) {
            Some(Body::Object(entries)) => entries.get_index(index).map(|(k, _)| k.clone()),
            _ => None,
        }
    }

    /// Arena size marker used to roll back a failed fragment parse.
    pub(crate) fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated after `mark`. Only valid when none of those
    /// nodes is referenced from a node allocated before `mark`.
    pub(crate) fn rollback(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    /// Append `child` to `parent` without the attach preconditions; the caller
    /// guarantees `child` is fresh. Objects require `key`.
    pub(crate) fn link_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        key: Option<String>,
    ) -> Result<()> {
        let index = match self.data_mut(parent).map(|d| &mut d.body) {
            Some(Body::Array(items)) => {
                items.push(child);
                items.len() - 1
            }
            Some(Body::Object(entries)) => {
                let key = key.ok_or(TreeError::InvalidOperation("keyed insert without key"))?;
                if entries.contains_key(&key) {
                    return Err(TreeError::DuplicateKey(key));
                }
                entries.insert_full(key, child).0
            }
            _ => return Err(TreeError::InvalidOperation("attach to scalar")),
        };
        if let Some(data) = self.data_mut(child) {
            data.parent = Some(parent);
            data.index = index;
        }
        Ok(())
    }
}

/// Body with the same scalar value, or an empty container of the same kind.
fn shallow(body: &Body) -> Body {
    match body {
        Body::Array(_) => Body::Array(Vec::new()),
        Body::Object(_) => Body::Object(IndexMap::new()),
        other => other.clone(),
    }
}
