//! Conversions between node trees and `serde_json::Value`.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::node::{Body, Document, Kind, NodeId};
use crate::view::{is_integral, NodeRef};
use crate::walker::{WalkState, Walker};

/// Undefined serializes as `null`.
///
/// serde's data model is nested, so this impl recurses once per level of the
/// tree and its depth is bounded by the call stack. Use
/// [`NodeRef::stringify`] for documents of arbitrary depth.
impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.kind() {
            Kind::Undefined | Kind::Null => serializer.serialize_unit(),
            Kind::Bool => serializer.serialize_bool(self.as_bool().unwrap_or_default()),
            Kind::Number => {
                let n = self.as_f64().unwrap_or_default();
                if is_integral(n) {
                    serializer.serialize_i64(n as i64)
                } else {
                    serializer.serialize_f64(n)
                }
            }
            Kind::String => serializer.serialize_str(self.as_str().unwrap_or_default()),
            Kind::Array => {
                let mut seq = serializer.serialize_seq(Some(self.len()))?;
                for child in self.children() {
                    seq.serialize_element(&child)?;
                }
                seq.end()
            }
            Kind::Object => {
                let mut map = serializer.serialize_map(Some(self.len()))?;
                for child in self.children() {
                    map.serialize_entry(child.self_key(), &child)?;
                }
                map.end()
            }
        }
    }
}

fn scalar_value(body: &Body) -> Value {
    match body {
        Body::Null => Value::Null,
        Body::Bool(b) => Value::Bool(*b),
        Body::Number(n) if is_integral(*n) => Value::from(*n as i64),
        Body::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        Body::String(s) => Value::String(s.clone()),
        Body::Array(_) => Value::Array(Vec::new()),
        Body::Object(_) => Value::Object(Map::new()),
    }
}

impl NodeRef<'_> {
    /// Owned `serde_json::Value` copy of this subtree; Undefined becomes
    /// `Value::Null`. Built with the walker, without recursion, but
    /// serializing or dropping the returned `Value` recurses per level.
    pub fn to_value(&self) -> Value {
        let doc = self.document();
        let Some(start) = self.id() else {
            return Value::Null;
        };
        let Ok(mut walker) = Walker::new(doc, start) else {
            return Value::Null;
        };
        // Open containers, each with the key it will be stored under.
        let mut stack: Vec<(Option<String>, Value)> = Vec::new();
        let mut result = Value::Null;
        loop {
            let step = walker.next(doc);
            let Some(id) = step.node else { break };
            let Some(data) = doc.data(id) else { break };
            let key = if id == start {
                None
            } else {
                data.parent.and_then(|p| doc.key_at(p, data.index))
            };
            let (key, value) = match step.state {
                WalkState::Enter => {
                    stack.push((key, scalar_value(&data.body)));
                    continue;
                }
                WalkState::Pass => (key, scalar_value(&data.body)),
                WalkState::Exit => match stack.pop() {
                    Some(entry) => entry,
                    None => break,
                },
                WalkState::Done => break,
            };
            match stack.last_mut() {
                Some((_, Value::Array(items))) => items.push(value),
                Some((_, Value::Object(members))) => {
                    members.insert(key.unwrap_or_default(), value);
                }
                _ => result = value,
            }
        }
        result
    }
}

impl Document {
    /// Build a detached subtree from a `serde_json::Value`.
    pub fn import_value(&mut self, value: &Value) -> Result<NodeId> {
        let top = self.alloc(value_body(value));
        let mut work = vec![(value, top)];
        while let Some((source, target)) = work.pop() {
            match source {
                Value::Array(items) => {
                    for item in items {
                        let child = self.alloc(value_body(item));
                        self.link_child(target, child, None)?;
                        work.push((item, child));
                    }
                }
                Value::Object(members) => {
                    for (key, member) in members {
                        let child = self.alloc(value_body(member));
                        self.link_child(target, child, Some(key.clone()))?;
                        work.push((member, child));
                    }
                }
                _ => {}
            }
        }
        Ok(top)
    }

    /// New document whose root is a copy of `value`.
    pub fn from_value(value: &Value) -> Result<Document> {
        let mut doc = Document::new();
        let root = doc.import_value(value)?;
        doc.set_root(root)?;
        Ok(doc)
    }
}

fn value_body(value: &Value) -> Body {
    match value {
        Value::Null => Body::Null,
        Value::Bool(b) => Body::Bool(*b),
        Value::Number(n) => Body::Number(n.as_f64().unwrap_or_default()),
        Value::String(s) => Body::String(s.clone()),
        Value::Array(_) => Body::Array(Vec::new()),
        Value::Object(_) => Body::Object(indexmap::IndexMap::new()),
    }
}
