//! JSON text output.
//!
//! Rendering is driven by the [`Walker`], so the depth of the tree is not
//! limited by the call stack. Two layouts are available:
//!
//! - **Compact** (`indent == 0`): no newlines; `spaces_after_colon`,
//!   `spaces_after_comma` and `spaces_after_bracket` insert that many spaces
//!   after `:`, `,` and an opening `[`/`{` respectively.
//! - **Pretty** (`indent > 0`): one member per line, `indent` spaces per
//!   level, one space after `:`. The spacing knobs are ignored.
//!
//! Empty containers always render as `[]` / `{}`.

use std::fmt;

use crate::node::{Body, Document, NodeId};
use crate::view::{is_integral, NodeRef, Nodes};
use crate::walker::{WalkState, Walker};

/// Output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Format {
    pub indent: usize,
    pub spaces_after_colon: usize,
    pub spaces_after_comma: usize,
    pub spaces_after_bracket: usize,
}

impl Format {
    pub fn compact() -> Self {
        Self::default()
    }

    pub fn pretty(indent: usize) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    fn is_pretty(&self) -> bool {
        self.indent > 0
    }
}

struct Writer<'f> {
    out: String,
    format: &'f Format,
}

impl Writer<'_> {
    /// Separator and indentation before the member at `position` of a
    /// container whose contents sit at `level`.
    fn member_prefix(&mut self, position: usize, level: usize) {
        if position > 0 {
            self.out.push(',');
        }
        if self.format.is_pretty() {
            self.out.push('\n');
            push_spaces(&mut self.out, level * self.format.indent);
        } else if position > 0 {
            push_spaces(&mut self.out, self.format.spaces_after_comma);
        } else {
            push_spaces(&mut self.out, self.format.spaces_after_bracket);
        }
    }

    fn key(&mut self, key: &str) {
        write_string(key, &mut self.out);
        self.out.push(':');
        if self.format.is_pretty() {
            self.out.push(' ');
        } else {
            push_spaces(&mut self.out, self.format.spaces_after_colon);
        }
    }

    fn close(&mut self, bracket: char, had_members: bool, level: usize) {
        if had_members && self.format.is_pretty() {
            self.out.push('\n');
            push_spaces(&mut self.out, level * self.format.indent);
        }
        self.out.push(bracket);
    }

    /// Render the subtree of `start`, whose own line is at `base` level.
    fn tree(&mut self, doc: &Document, start: NodeId, base: usize) {
        let Ok(mut walker) = Walker::new(doc, start) else {
            return;
        };
        let mut level = base;
        loop {
            let step = walker.next(doc);
            let Some(id) = step.node else { break };
            let Some(data) = doc.data(id) else { break };
            match step.state {
                WalkState::Enter | WalkState::Pass => {
                    if id != start {
                        self.member_prefix(data.index, level);
                        if let Some(key) = data.parent.and_then(|p| doc.key_at(p, data.index)) {
                            self.key(&key);
                        }
                    }
                    match &data.body {
                        Body::Array(_) => {
                            self.out.push('[');
                            level += 1;
                        }
                        Body::Object(_) => {
                            self.out.push('{');
                            level += 1;
                        }
                        scalar => write_scalar(scalar, &mut self.out),
                    }
                }
                WalkState::Exit => {
                    level -= 1;
                    let bracket = match data.body {
                        Body::Object(_) => '}',
                        _ => ']',
                    };
                    self.close(bracket, data.body.child_count() > 0, level);
                }
                WalkState::Done => break,
            }
        }
    }
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n(' ', count));
}

fn write_scalar(body: &Body, out: &mut String) {
    match body {
        Body::Null => out.push_str("null"),
        Body::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Body::Number(n) => write_number(*n, out),
        Body::String(s) => write_string(s, out),
        Body::Array(_) | Body::Object(_) => {}
    }
}

/// Integral values print without a decimal point; everything else uses the
/// shortest representation that parses back to the same `f64`.
fn write_number(n: f64, out: &mut String) {
    if !n.is_finite() {
        out.push_str("null");
    } else if is_integral(n) {
        out.push_str(&(n as i64).to_string());
    } else {
        out.push_str(&n.to_string());
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if c < '\u{20}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl NodeRef<'_> {
    /// Render this node as JSON text; Undefined renders as "".
    ///
    /// ```
    /// use jtree_core::{Document, Format};
    ///
    /// let doc = Document::parse_str(r#"{"a":[1,2.5,"x"]}"#).unwrap();
    /// assert_eq!(doc.root().stringify(&Format::compact()), r#"{"a":[1,2.5,"x"]}"#);
    /// assert_eq!(
    ///     doc.root().stringify(&Format::pretty(2)),
    ///     "{\n  \"a\": [\n    1,\n    2.5,\n    \"x\"\n  ]\n}"
    /// );
    /// ```
    pub fn stringify(&self, format: &Format) -> String {
        let mut writer = Writer {
            out: String::new(),
            format,
        };
        if let Some(id) = self.id() {
            writer.tree(self.document(), id, 0);
        }
        writer.out
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify(&Format::compact()))
    }
}

impl Nodes<'_> {
    /// Render the list as one JSON array; Undefined entries render as `null`.
    pub fn stringify_values(&self, format: &Format) -> String {
        let mut writer = Writer {
            out: String::from("["),
            format,
        };
        for (position, node) in self.iter().enumerate() {
            writer.member_prefix(position, 1);
            match node.id() {
                Some(id) => writer.tree(node.document(), id, 1),
                None => writer.out.push_str("null"),
            }
        }
        writer.close(']', !self.is_empty(), 0);
        writer.out
    }
}
