//! # jtree-core
//!
//! Mutable, in-memory JSON document trees.
//!
//! Parse JSON text into a [`Document`], edit it in place with structural
//! operations that keep positions and key order consistent, walk it with a
//! resumable iterative [`Walker`], look nodes up with paths and pipe queries,
//! and render it back to text.
//!
//! ## Quick start
//!
//! ```rust
//! use jtree_core::{Document, Format};
//!
//! let mut doc = Document::parse_str(r#"{"b":2,"a":[1]}"#).unwrap();
//! let root = doc.root_id().unwrap();
//! let list = doc.root().key("a").id().unwrap();
//!
//! doc.append_scalar(list, "two").unwrap();
//! doc.sort_keys(root).unwrap();
//! assert_eq!(doc.root().to_string(), r#"{"a":[1,"two"],"b":2}"#);
//!
//! // Failed lookups degrade to Undefined instead of erroring.
//! assert!(!doc.root().key("missing").idx(3).key("x").exists());
//! assert_eq!(doc.root().query("$.a[...]").unwrap().len(), 2);
//! # let _ = Format::compact();
//! ```
//!
//! ## Modules
//!
//! - [`node`]: `Document` arena, `NodeId`, `Kind`, `Scalar`, constructors
//! - [`view`]: `NodeRef` read views (the Undefined-safe accessors) and `Nodes`
//! - [`tokenizer`]: byte stream → `Token`s
//! - [`parser`]: `Token`s → tree, without recursion
//! - [`mutate`]: append / set / remove / replace / key sorting
//! - [`walker`]: Enter / Pass / Exit / Done traversal
//! - [`path`]: `$.a[0].b` resolution and `self_path`
//! - [`query`]: predicate search and pipe queries
//! - [`serializer`]: compact and pretty JSON output
//! - [`value`]: `serde` / `serde_json::Value` interop
//! - [`error`]: error types

pub mod error;
pub mod mutate;
pub mod node;
pub mod parser;
pub mod path;
pub mod query;
pub mod serializer;
pub mod tokenizer;
pub mod value;
pub mod view;
pub mod walker;

pub use error::{LexError, Result, TreeError};
pub use node::{Document, Kind, NodeId, Scalar};
pub use query::{parse_query, Matcher, QueryStep, SearchOptions};
pub use serializer::Format;
pub use tokenizer::{Token, TokenSource, Tokenizer};
pub use view::{NodeRef, Nodes};
pub use walker::{Step, Walk, WalkState, Walker};
