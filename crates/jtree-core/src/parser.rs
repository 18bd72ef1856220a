//! Streaming parser: builds a node tree from a [`TokenSource`].
//!
//! The parser keeps no call stack. It tracks the container currently being
//! filled and a pending object key; closing a container moves the cursor back
//! to the container's own parent, which the arena already records.
//!
//! A document is exactly one value. Extra tokens after it, unbalanced end
//! delimiters and truncated input are rejected with `InvalidDocument`;
//! repeated object keys with `DuplicateKey`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, TreeError};
use crate::node::{Body, Document, Kind, NodeId};
use crate::tokenizer::{Token, TokenSource, Tokenizer};

impl Document {
    /// Parse a JSON text into a new document.
    ///
    /// ```
    /// use jtree_core::Document;
    ///
    /// let doc = Document::parse_str(r#"{"a":[1,2,{"b":null}]}"#).unwrap();
    /// assert!(doc.root().path("$.a[2].b").is_null());
    /// ```
    pub fn parse_str(text: &str) -> Result<Document> {
        Self::parse_reader(text.as_bytes())
    }

    pub fn parse_slice(bytes: &[u8]) -> Result<Document> {
        Self::parse_reader(bytes)
    }

    /// Parse a document from any byte stream. The stream is read once,
    /// incrementally, through a buffered tokenizer.
    pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
        Self::parse_tokens(Tokenizer::new(reader))
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        log::debug!("parsing {}", path.display());
        Self::parse_reader(File::open(path)?)
    }

    /// Build a document from an arbitrary token sequence.
    pub fn parse_tokens<S: TokenSource>(source: S) -> Result<Document> {
        let mut doc = Document::new();
        let root = doc.build(source)?;
        doc.set_root(root)?;
        log::debug!("parsed document with {} nodes", doc.node_count());
        Ok(doc)
    }

    /// Parse a JSON text into this document's arena and return the new
    /// subtree, detached. On failure the arena is left as it was.
    pub fn parse_fragment(&mut self, text: &str) -> Result<NodeId> {
        self.read_tokens(Tokenizer::new(text.as_bytes()))
    }

    /// Token-level form of [`Document::parse_fragment`].
    pub fn read_tokens<S: TokenSource>(&mut self, source: S) -> Result<NodeId> {
        let mark = self.mark();
        let built = self.build(source);
        if built.is_err() {
            self.rollback(mark);
        }
        built
    }

    fn build<S: TokenSource>(&mut self, mut source: S) -> Result<NodeId> {
        let mut parent: Option<NodeId> = None;
        let mut pending_key: Option<String> = None;
        let mut completed: Option<NodeId> = None;

        while let Some(token) = source.next_token()? {
            if completed.is_some() {
                return Err(TreeError::invalid_document(
                    "unexpected token after a complete value",
                ));
            }
            match token {
                Token::StartArray | Token::StartObject => {
                    let container = match token {
                        Token::StartArray => self.new_array(),
                        _ => self.new_object(),
                    };
                    if let Some(p) = parent {
                        self.attach_parsed(p, container, pending_key.take())?;
                    }
                    parent = Some(container);
                }
                Token::EndArray | Token::EndObject => {
                    let open = parent.ok_or_else(|| {
                        TreeError::invalid_document("end delimiter without open container")
                    })?;
                    let expected = match token {
                        Token::EndArray => Kind::Array,
                        _ => Kind::Object,
                    };
                    if self.kind(open) != expected {
                        return Err(TreeError::invalid_document(format!(
                            "mismatched end delimiter: closing {expected} inside {}",
                            self.kind(open)
                        )));
                    }
                    if pending_key.is_some() {
                        return Err(TreeError::invalid_document("object key without value"));
                    }
                    parent = self.parent_of(open);
                    if parent.is_none() {
                        completed = Some(open);
                    }
                }
                scalar => {
                    let expects_key = parent.is_some_and(|p| self.kind(p) == Kind::Object)
                        && pending_key.is_none();
                    if expects_key {
                        match scalar {
                            Token::String(key) => {
                                pending_key = Some(key);
                                continue;
                            }
                            _ => return Err(TreeError::invalid_document("expected object key")),
                        }
                    }
                    let id = self.alloc(scalar_body(scalar));
                    match parent {
                        Some(p) => self.attach_parsed(p, id, pending_key.take())?,
                        None => completed = Some(id),
                    }
                }
            }
        }

        if parent.is_some() {
            return Err(TreeError::invalid_document(
                "unexpected end of stream inside a container",
            ));
        }
        completed.ok_or_else(|| TreeError::invalid_document("empty document"))
    }

    fn attach_parsed(&mut self, parent: NodeId, child: NodeId, key: Option<String>) -> Result<()> {
        if self.kind(parent) == Kind::Object && key.is_none() {
            return Err(TreeError::invalid_document("expected object key"));
        }
        self.link_child(parent, child, key)
    }
}

fn scalar_body(token: Token) -> Body {
    match token {
        Token::String(s) => Body::String(s),
        Token::Bool(b) => Body::Bool(b),
        Token::Number(n) => Body::Number(n),
        _ => Body::Null,
    }
}
