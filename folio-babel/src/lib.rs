//! Markup dialects for notebook pages
//!
//!     This crate converts page text to a dialect independent document tree and back. Two
//!     dialects are built in: the native wiki markup (`.txt` pages) and Markdown (`.md` pages).
//!
//!     TLDR: For dialect authors:
//!         - A dialect is data, a [`Dialect`] descriptor holding its [`dialect::Syntax`]. There is
//!           no per-dialect code in the tokenizer, parser or serializer.
//!         - Register the descriptor with a [`DialectRegistry`]; invalid descriptors are rejected.
//!         - Every node the tree models must survive parse(serialize(tree)) in the new dialect.
//!
//! Architecture
//!
//!     Text goes through two passes. The tokenizer (./tokenizer/mod.rs) classifies each line
//!     (heading, list item, table row, fence, quote, text) and the inline tokenizer
//!     (./tokenizer/inline.rs) splits the text of one block into spans, links, images, anchors
//!     and tags. The parser (./parser.rs) folds both token streams into the tree in
//!     ./ir/nodes.rs. The serializer (./serializer.rs) walks the tree and writes the dialect's
//!     syntax back.
//!
//!     This is a pure lib: no code here reads files, environment variables or prints. The
//!     notebook crate supplies text and stores it.
//!
//!     The file structure :
//!     .
//!     ├── cancel.rs               # Cooperative cancellation for long parses
//!     ├── common
//!     │   └── links.rs            # URL recognition (GFM autolink rules)
//!     ├── dialect.rs              # Dialect descriptor definition
//!     ├── dialects                # Built-in descriptors (wiki, markdown)
//!     ├── error.rs
//!     ├── ir
//!     │   ├── edit.rs             # Structured edit operations
//!     │   └── nodes.rs            # Tree node types
//!     ├── parser.rs
//!     ├── registry.rs             # DialectRegistry for discovery and selection
//!     ├── serializer.rs
//!     └── tokenizer
//!
//! Resilience
//!
//!     Parsing never fails. Malformed input (a stray closing fence, a table separator with no
//!     header, a heading deeper than six levels) degrades to a paragraph holding the raw line
//!     and a [`Warning`] is returned next to the document. A fence that is never closed runs to
//!     the end of the page.
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # pulls in the directories below
//!     ├── markdown
//!     ├── wiki
//!     └── interop                 # cross-dialect and round-trip properties
//!
//!     Rust does not discover tests in subdirectories by default, so they are included as
//!     modules from tests/lib.rs.

pub mod cancel;
pub mod common;
pub mod dialect;
pub mod dialects;
pub mod error;
pub mod ir;
pub mod parser;
pub mod registry;
pub mod serializer;
pub mod tokenizer;

pub use cancel::CancelToken;
pub use dialect::Dialect;
pub use error::{EditError, FormatError, Warning, WarningKind};
pub use ir::nodes::Document;
pub use parser::{parse, parse_with_cancel, Parsed};
pub use registry::DialectRegistry;
pub use serializer::{serialize, serialize_file};
