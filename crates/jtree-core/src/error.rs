//! Error types for parsing, mutating, reading and querying document trees.

use crate::node::Kind;
use thiserror::Error;

/// Errors raised by the tokenizer while reading a JSON byte stream.
///
/// Offsets are 0-based byte positions in the input.
#[derive(Error, Debug)]
pub enum LexError {
    /// The underlying reader failed.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// A byte that cannot start or continue a token in the current position.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    /// The input ended in the middle of a token or an open container.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    /// A number literal that does not follow the JSON number grammar.
    #[error("invalid number {text:?} at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    /// A bare word that is not `true`, `false` or `null`.
    #[error("invalid literal {text:?} at offset {offset}")]
    InvalidLiteral { text: String, offset: usize },

    /// A string literal with a bad escape sequence, control character or UTF-8.
    #[error("invalid string at offset {offset}: {source}")]
    InvalidString {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur while building, editing, reading or querying a tree.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The receiver has the wrong kind for the requested mutation
    /// (e.g. `append` on an object).
    #[error("invalid node for operation: {0}")]
    InvalidOperation(&'static str),

    /// Array position out of range.
    #[error("invalid index: {0}")]
    InvalidIndex(usize),

    /// Object key not present.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The node to attach already has a parent.
    #[error("node is already attached to a parent")]
    AlreadyAttached,

    /// Detach or replace requested on a node without a parent.
    #[error("node has no parent")]
    NoParent,

    /// An object received the same key twice.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The token stream does not describe exactly one well-formed JSON value.
    #[error("invalid document: {message}")]
    InvalidDocument {
        message: String,
        #[source]
        source: Option<LexError>,
    },

    /// Malformed path or query syntax.
    #[error("bad query format: {0}")]
    BadQuery(String),

    /// A scalar reader was invoked on a node of a different kind.
    #[error("value is not {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: Kind },

    /// An integer reader was invoked on a number with a fractional part.
    #[error("value {0} is not an integer")]
    NotInteger(f64),

    /// A reader, walk or search was invoked on Undefined.
    #[error("node does not exist")]
    NodeAbsent,

    /// `Walker::skip` called anywhere but right after an `Enter` step.
    #[error("walk order violation: {0}")]
    WalkOrder(&'static str),

    /// The parent/index bookkeeping of the tree is inconsistent.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),

    /// Reading a document from a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    pub(crate) fn invalid_document(message: impl Into<String>) -> Self {
        TreeError::InvalidDocument {
            message: message.into(),
            source: None,
        }
    }
}

impl From<LexError> for TreeError {
    fn from(err: LexError) -> Self {
        TreeError::InvalidDocument {
            message: "malformed token stream".to_string(),
            source: Some(err),
        }
    }
}

/// Convenience alias used throughout jtree-core.
pub type Result<T> = std::result::Result<T, TreeError>;
