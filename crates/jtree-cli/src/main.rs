//! `jtree` CLI: format, query and navigate JSON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Pretty-print JSON (stdin → stdout)
//! echo '{"b":1,"a":[1,2]}' | jtree fmt --indent 2
//!
//! # Compact with sorted keys, from file to file
//! jtree fmt --sort-keys -i data.json -o data.min.json
//!
//! # Run a query; results are printed as one JSON array
//! jtree query '$.items[...]...id' -i data.json
//!
//! # Resolve a single path
//! jtree path '$.items[0].name' -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jtree_core::{Document, Format, SearchOptions};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "jtree", version, about = "Format and query JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Io {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and re-serialize a document
    Fmt {
        #[command(flatten)]
        io: Io,
        /// Spaces per indentation level (0 = compact)
        #[arg(long, default_value_t = 0)]
        indent: usize,
        /// Sort object keys throughout the document
        #[arg(long)]
        sort_keys: bool,
        /// Spaces after `:` in compact output
        #[arg(long, default_value_t = 0)]
        colon: usize,
        /// Spaces after `,` in compact output
        #[arg(long, default_value_t = 0)]
        comma: usize,
        /// Spaces after an opening bracket in compact output
        #[arg(long, default_value_t = 0)]
        bracket: usize,
    },
    /// Run a query and print the matches as a JSON array
    Query {
        /// Query such as `$.items[...]...id`
        query: String,
        #[command(flatten)]
        io: Io,
        /// Also report matches nested inside other matches
        #[arg(long)]
        nested: bool,
        /// Do not search below this depth (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        depth: usize,
        /// Spaces per indentation level (0 = compact)
        #[arg(long, default_value_t = 0)]
        indent: usize,
    },
    /// Print the node at a path such as `$.a[0].b`
    Path {
        path: String,
        #[command(flatten)]
        io: Io,
        /// Spaces per indentation level (0 = compact)
        #[arg(long, default_value_t = 0)]
        indent: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Fmt {
            io,
            indent,
            sort_keys,
            colon,
            comma,
            bracket,
        } => {
            let mut doc = read_document(io.input.as_deref())?;
            if sort_keys {
                if let Some(root) = doc.root_id() {
                    doc.sort_tree_keys(root).context("Failed to sort keys")?;
                }
            }
            let format = Format {
                indent,
                spaces_after_colon: colon,
                spaces_after_comma: comma,
                spaces_after_bracket: bracket,
            };
            write_output(io.output.as_deref(), &doc.root().stringify(&format))?;
        }
        Commands::Query {
            query,
            io,
            nested,
            depth,
            indent,
        } => {
            let doc = read_document(io.input.as_deref())?;
            let options = SearchOptions::default()
                .with_nested(nested)
                .with_depth_limit(depth);
            let found = doc
                .root()
                .query_with(&query, options)
                .with_context(|| format!("Query failed: {query}"))?;
            log::debug!("query {query} matched {} nodes", found.len());
            write_output(io.output.as_deref(), &found.stringify_values(&Format::pretty(indent)))?;
        }
        Commands::Path { path, io, indent } => {
            let doc = read_document(io.input.as_deref())?;
            let node = doc.root().path(&path);
            if !node.exists() {
                anyhow::bail!("No node at path: {path}");
            }
            write_output(io.output.as_deref(), &node.stringify(&Format::pretty(indent)))?;
        }
    }

    Ok(())
}

fn read_document(path: Option<&str>) -> Result<Document> {
    let text = read_input(path)?;
    log::debug!("read {} bytes", text.len());
    Document::parse_str(&text).context("Failed to parse JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{content}\n"))
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
