//! Structural edits: append, set, remove, replace and key sorting.
//!
//! Every edit updates the bookkeeping of all affected nodes together with the
//! container storage: parent links, positions of shifted siblings, and (for
//! objects) the key order, which lives in the same `IndexMap` as the child
//! list. After any successful call, `children[i].index == i` holds for every
//! container touched.
//!
//! Nodes are only ever attached when detached, and the document root never
//! is. Every operation that takes a node out of a container clears its
//! parent link and hands it back.

use crate::error::{Result, TreeError};
use crate::node::{Body, Document, Kind, NodeId, Scalar};
use crate::walker::{WalkState, Walker};

impl Document {
    /// Append a detached node to the end of an array.
    pub fn append(&mut self, array: NodeId, node: NodeId) -> Result<()> {
        self.expect_kind(array, Kind::Array, "append to non-array")?;
        self.check_attachable(array, node)?;
        self.link_child(array, node, None)
    }

    /// Insert or overwrite `key` in an object.
    ///
    /// An existing key keeps its position; the displaced child is detached
    /// and returned.
    pub fn set(&mut self, object: NodeId, key: &str, node: NodeId) -> Result<Option<NodeId>> {
        self.expect_kind(object, Kind::Object, "set on non-object")?;
        self.check_attachable(object, node)?;
        let existing = match self.body(object) {
            Some(Body::Object(entries)) => entries.get_index_of(key),
            _ => None,
        };
        match existing {
            Some(index) => self.swap_child(object, index, node).map(Some),
            None => {
                self.link_child(object, node, Some(key.to_string()))?;
                Ok(None)
            }
        }
    }

    /// Remove the element at `index`; later elements shift left by one.
    pub fn remove_idx(&mut self, array: NodeId, index: usize) -> Result<NodeId> {
        let removed = match self.data_mut(array).map(|d| &mut d.body) {
            Some(Body::Array(items)) => {
                if index >= items.len() {
                    return Err(TreeError::InvalidIndex(index));
                }
                items.remove(index)
            }
            Some(_) => return Err(TreeError::InvalidOperation("remove index from non-array")),
            None => return Err(TreeError::InvalidOperation("unknown node")),
        };
        self.restamp(array, index);
        self.detach(removed);
        Ok(removed)
    }

    /// Remove member `key`; later members shift left by one.
    pub fn remove_key(&mut self, object: NodeId, key: &str) -> Result<NodeId> {
        let (index, removed) = match self.data_mut(object).map(|d| &mut d.body) {
            Some(Body::Object(entries)) => match entries.shift_remove_full(key) {
                Some((index, _, removed)) => (index, removed),
                None => return Err(TreeError::InvalidKey(key.to_string())),
            },
            Some(_) => return Err(TreeError::InvalidOperation("remove key from non-object")),
            None => return Err(TreeError::InvalidOperation("unknown node")),
        };
        self.restamp(object, index);
        self.detach(removed);
        Ok(removed)
    }

    /// Detach `node` from its parent, whatever the parent's kind.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        let (parent, index) = self.position_of(node)?;
        match self.kind(parent) {
            Kind::Array => {
                self.remove_idx(parent, index)?;
            }
            Kind::Object => {
                let key = self
                    .key_at(parent, index)
                    .ok_or_else(|| stale_position(node, index))?;
                self.remove_key(parent, &key)?;
            }
            _ => {
                return Err(TreeError::InvariantViolation(format!(
                    "parent of {node:?} is not a container"
                )))
            }
        }
        Ok(())
    }

    /// Put a detached node at `index` of an array; the former element is
    /// detached and returned.
    pub fn replace_idx(&mut self, array: NodeId, index: usize, node: NodeId) -> Result<NodeId> {
        self.expect_kind(array, Kind::Array, "replace index in non-array")?;
        if index >= self.child_count(array) {
            return Err(TreeError::InvalidIndex(index));
        }
        self.check_attachable(array, node)?;
        self.swap_child(array, index, node)
    }

    /// Put a detached node in the exact place (index or key) of `node`,
    /// which ends up detached.
    pub fn replace(&mut self, node: NodeId, new_node: NodeId) -> Result<()> {
        let (parent, index) = self.position_of(node)?;
        if !self.kind(parent).is_container() {
            return Err(TreeError::InvariantViolation(format!(
                "parent of {node:?} is not a container"
            )));
        }
        self.check_attachable(parent, new_node)?;
        self.swap_child(parent, index, new_node)?;
        Ok(())
    }

    /// Reorder an object's members by ascending key.
    pub fn sort_keys(&mut self, object: NodeId) -> Result<()> {
        match self.data_mut(object).map(|d| &mut d.body) {
            Some(Body::Object(entries)) => entries.sort_keys(),
            Some(_) => return Err(TreeError::InvalidOperation("sort keys of non-object")),
            None => return Err(TreeError::InvalidOperation("unknown node")),
        }
        self.restamp(object, 0);
        Ok(())
    }

    /// Sort the keys of every object in the subtree of `node`. Arrays keep
    /// their order.
    pub fn sort_tree_keys(&mut self, node: NodeId) -> Result<()> {
        let mut walker = Walker::new(self, node)?;
        let mut sorted = 0usize;
        loop {
            let step = walker.next(self);
            match (step.node, step.state) {
                (_, WalkState::Done) | (None, _) => break,
                (Some(id), WalkState::Enter) if self.kind(id) == Kind::Object => {
                    self.sort_keys(id)?;
                    sorted += 1;
                }
                _ => {}
            }
        }
        log::debug!("sorted keys of {sorted} objects");
        Ok(())
    }

    pub fn append_scalar(&mut self, array: NodeId, value: impl Into<Scalar>) -> Result<NodeId> {
        let node = self.new_scalar(value);
        self.append(array, node)?;
        Ok(node)
    }

    /// Scalar form of [`Document::set`]; returns the displaced child.
    pub fn set_scalar(
        &mut self,
        object: NodeId,
        key: &str,
        value: impl Into<Scalar>,
    ) -> Result<Option<NodeId>> {
        let node = self.new_scalar(value);
        self.set(object, key, node)
    }

    /// Replace `node` with a new scalar and return the new node.
    pub fn replace_with_scalar(&mut self, node: NodeId, value: impl Into<Scalar>) -> Result<NodeId> {
        let new_node = self.new_scalar(value);
        self.replace(node, new_node)?;
        Ok(new_node)
    }

    fn expect_kind(&self, id: NodeId, kind: Kind, what: &'static str) -> Result<()> {
        match self.body(id) {
            Some(body) if body.kind() == kind => Ok(()),
            Some(_) => Err(TreeError::InvalidOperation(what)),
            None => Err(TreeError::InvalidOperation("unknown node")),
        }
    }

    /// `node` must exist, be detached, not be the document root and not be
    /// `receiver` or one of its ancestors.
    fn check_attachable(&self, receiver: NodeId, node: NodeId) -> Result<()> {
        let data = self
            .data(node)
            .ok_or(TreeError::InvalidOperation("unknown node"))?;
        if data.parent.is_some() || self.root_id() == Some(node) {
            return Err(TreeError::AlreadyAttached);
        }
        let mut cursor = Some(receiver);
        while let Some(current) = cursor {
            if current == node {
                return Err(TreeError::InvalidOperation("attach into own subtree"));
            }
            cursor = self.parent_of(current);
        }
        Ok(())
    }

    /// Parent and position of an attached node, checked against the parent's
    /// storage.
    fn position_of(&self, node: NodeId) -> Result<(NodeId, usize)> {
        let data = self
            .data(node)
            .ok_or(TreeError::InvalidOperation("unknown node"))?;
        let parent = data.parent.ok_or(TreeError::NoParent)?;
        if self.child_at(parent, data.index) != Some(node) {
            return Err(stale_position(node, data.index));
        }
        Ok((parent, data.index))
    }

    /// Store `node` at `index` of `parent` and detach the previous occupant.
    fn swap_child(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<NodeId> {
        let slot = match self.data_mut(parent).map(|d| &mut d.body) {
            Some(Body::Array(items)) => items.get_mut(index),
            Some(Body::Object(entries)) => entries.get_index_mut(index).map(|(_, id)| id),
            _ => None,
        };
        let slot = slot.ok_or(TreeError::InvalidIndex(index))?;
        let old = std::mem::replace(slot, node);
        if let Some(data) = self.data_mut(node) {
            data.parent = Some(parent);
            data.index = index;
        }
        self.detach(old);
        Ok(old)
    }

    /// Rewrite the positions of `parent`'s children from `from` onwards.
    fn restamp(&mut self, parent: NodeId, from: usize) {
        let children = self.body(parent).map(Body::child_ids).unwrap_or_default();
        for (index, child) in children.into_iter().enumerate().skip(from) {
            if let Some(data) = self.data_mut(child) {
                data.index = index;
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(data) = self.data_mut(node) {
            data.parent = None;
            data.index = 0;
        }
    }
}

fn stale_position(node: NodeId, index: usize) -> TreeError {
    TreeError::InvariantViolation(format!(
        "{node:?} is not stored at position {index} of its parent"
    ))
}
