//! Iterative, resumable depth-first traversal.
//!
//! A [`Walker`] is a small cursor: the start node, the next pending move and
//! the current depth. It borrows the document only for the duration of each
//! [`Walker::next`] call, so a caller may edit the tree between steps (the
//! way [`Document::sort_tree_keys`] reorders each object right after entering
//! it). Moves are resolved lazily against the tree as it is when the step is
//! taken. Any other structural edit during a walk is unsupported.
//!
//! Steps come in four states:
//!
//! - `Enter`: a container, before its children
//! - `Pass`: a scalar
//! - `Exit`: a container, after its children (or right after `Enter` when it
//!   is empty or at the depth limit)
//! - `Done`: the walk is over; every later call returns `Done` again

use crate::error::{Result, TreeError};
use crate::node::{Document, NodeId};
use crate::view::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkState {
    Enter,
    Pass,
    Exit,
    Done,
}

/// One walker step. `node` is `None` only for `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub node: Option<NodeId>,
    pub state: WalkState,
}

impl Step {
    const DONE: Step = Step {
        node: None,
        state: WalkState::Done,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    /// Emit `Enter` or `Pass` for the node.
    Visit(NodeId),
    /// Move to the first child of an entered container.
    Descend(NodeId),
    /// Emit `Exit` for the container.
    Leave(NodeId),
    /// The node is finished; move to its next sibling or leave its parent.
    After(NodeId),
    Done,
}

/// Depth-first cursor over one subtree.
#[derive(Debug, Clone)]
pub struct Walker {
    start: NodeId,
    pending: Pending,
    depth: usize,
    limit: usize,
    last: Option<(NodeId, WalkState)>,
}

impl Walker {
    /// Walker over the subtree of `start` without a depth limit.
    pub fn new(doc: &Document, start: NodeId) -> Result<Self> {
        Self::with_limit(doc, start, 0)
    }

    /// Walker that does not descend into containers whose depth is `limit`
    /// or more (0 means unlimited).
    ///
    /// Depth is counted from the topmost ancestor of `start`, whatever node
    /// the walk starts at: that ancestor is at depth 0, its children at 1.
    pub fn with_limit(doc: &Document, start: NodeId, limit: usize) -> Result<Self> {
        if !doc.contains(start) {
            return Err(TreeError::NodeAbsent);
        }
        let mut depth = 0;
        let mut cursor = doc.parent_of(start);
        while let Some(parent) = cursor {
            depth += 1;
            cursor = doc.parent_of(parent);
        }
        Ok(Self {
            start,
            pending: Pending::Visit(start),
            depth,
            limit,
            last: None,
        })
    }

    /// Depth of the node most recently returned.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_done(&self) -> bool {
        self.pending == Pending::Done
    }

    /// Take one step.
    pub fn next(&mut self, doc: &Document) -> Step {
        loop {
            match self.pending {
                Pending::Done => {
                    self.last = None;
                    return Step::DONE;
                }
                Pending::Visit(node) => {
                    let Some(body) = doc.body(node) else {
                        self.pending = Pending::Done;
                        continue;
                    };
                    if !body.kind().is_container() {
                        self.pending = Pending::After(node);
                        return self.emit(node, WalkState::Pass);
                    }
                    let cut_off = self.limit > 0 && self.depth >= self.limit;
                    self.pending = if body.child_count() == 0 || cut_off {
                        Pending::Leave(node)
                    } else {
                        Pending::Descend(node)
                    };
                    return self.emit(node, WalkState::Enter);
                }
                Pending::Descend(node) => match doc.child_at(node, 0) {
                    Some(first) => {
                        self.depth += 1;
                        self.pending = Pending::Visit(first);
                    }
                    None => self.pending = Pending::Leave(node),
                },
                Pending::Leave(node) => {
                    self.pending = Pending::After(node);
                    return self.emit(node, WalkState::Exit);
                }
                Pending::After(node) => {
                    if node == self.start {
                        self.pending = Pending::Done;
                        continue;
                    }
                    let Some(data) = doc.data(node) else {
                        self.pending = Pending::Done;
                        continue;
                    };
                    let Some(parent) = data.parent else {
                        self.pending = Pending::Done;
                        continue;
                    };
                    self.pending = match doc.child_at(parent, data.index + 1) {
                        Some(sibling) => Pending::Visit(sibling),
                        None => {
                            self.depth = self.depth.saturating_sub(1);
                            Pending::Leave(parent)
                        }
                    };
                }
            }
        }
    }

    /// Skip the children of the container just entered; its `Exit` comes
    /// next. Only valid once, right after an `Enter` step. A failed skip
    /// leaves the walk untouched.
    pub fn skip(&mut self) -> Result<()> {
        match (self.last, self.pending) {
            (Some((entered, WalkState::Enter)), Pending::Descend(node)) if entered == node => {
                self.pending = Pending::Leave(node);
            }
            (Some((entered, WalkState::Enter)), Pending::Leave(node)) if entered == node => {}
            _ => {
                return Err(TreeError::WalkOrder(
                    "skip is only valid right after an Enter step",
                ))
            }
        }
        self.last = None;
        Ok(())
    }

    fn emit(&mut self, node: NodeId, state: WalkState) -> Step {
        self.last = Some((node, state));
        Step {
            node: Some(node),
            state,
        }
    }
}

/// Borrowing iterator over a walk; yields every step before `Done`.
pub struct Walk<'a> {
    doc: &'a Document,
    walker: Walker,
}

impl<'a> Walk<'a> {
    /// [`Walker::skip`] for the borrowing iterator; `walk.skip()` would
    /// resolve to [`Iterator::skip`].
    pub fn skip_children(&mut self) -> Result<()> {
        self.walker.skip()
    }

    pub fn depth(&self) -> usize {
        self.walker.depth()
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (NodeRef<'a>, WalkState);

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.walker.next(self.doc);
        step.node.map(|id| (self.doc.node(id), step.state))
    }
}

impl Document {
    /// Walk the subtree of `start`.
    ///
    /// ```
    /// use jtree_core::{Document, WalkState};
    ///
    /// let doc = Document::parse_str(r#"{"a":1,"b":{"c":2}}"#).unwrap();
    /// let root = doc.root_id().unwrap();
    /// let states: Vec<WalkState> = doc.walk(root).unwrap().map(|(_, s)| s).collect();
    /// assert_eq!(states.len(), 6);
    /// ```
    pub fn walk(&self, start: NodeId) -> Result<Walk<'_>> {
        self.walk_with_limit(start, 0)
    }

    pub fn walk_with_limit(&self, start: NodeId, limit: usize) -> Result<Walk<'_>> {
        Ok(Walk {
            doc: self,
            walker: Walker::with_limit(self, start, limit)?,
        })
    }
}

impl<'a> NodeRef<'a> {
    /// Walk this node's subtree; fails with `NodeAbsent` on Undefined.
    pub fn walk(&self) -> Result<Walk<'a>> {
        self.walk_with_limit(0)
    }

    pub fn walk_with_limit(&self, limit: usize) -> Result<Walk<'a>> {
        let id = self.id().ok_or(TreeError::NodeAbsent)?;
        self.document().walk_with_limit(id, limit)
    }
}
