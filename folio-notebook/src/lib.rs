//! Notebook storage and linking
//!
//!     A notebook is a folder of page files. This crate maps namespace paths (`Projects:Plan`) to
//!     those files, parses pages with the dialect they were created in, resolves the links inside
//!     them and keeps a graph of which page links where.
//!
//!     TLDR: For callers:
//!         - Open a notebook with [`PageStore::open`], passing explicit [`NotebookSettings`] and a
//!           [`folio_babel::DialectRegistry`]. Nothing here reads configuration files.
//!         - A path either names a page with a backing file or a placeholder that only links refer
//!           to ([`PageRef`]). Placeholders become pages through [`PageStore::materialize`] or a
//!           first [`PageStore::save`].
//!         - A page keeps the dialect it was created with. Changing the default dialect only
//!           affects pages created afterwards.
//!
//! Architecture
//!
//!     The store (./store.rs) scans the folder once into the namespace index (./index.rs), using
//!     the file layout rules in ./layout.rs. Loading a page parses it and hands its links to the
//!     resolver (./resolver.rs), whose results become edges in the link graph (./graph.rs).
//!     Markdown pages store page links as relative file paths; ./hrefs.rs converts them.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── graph.rs                # Forward edges and backlinks
//!     ├── hrefs.rs                # Page links <-> relative file paths
//!     ├── index.rs                # Namespace index and the PageIndex trait
//!     ├── layout.rs               # Page path <-> file path
//!     ├── page.rs                 # Page, PageRef
//!     ├── path.rs                 # PagePath
//!     ├── resolver.rs
//!     ├── settings.rs             # NotebookSettings
//!     ├── signature.rs            # File modification signatures
//!     └── store.rs                # PageStore
//!
//! Concurrency
//!
//!     [`PageStore`] is shared by reference across threads. Loads and saves of one page are
//!     serialized by a lock per page path; the index, graph and cache each sit behind their own
//!     lock and are held only for short lookups or updates. A page file edited by another program
//!     is detected on save and reported as [`StoreError::Conflict`]; `save_overwrite` ignores it.

pub mod error;
pub mod graph;
pub mod hrefs;
pub mod index;
pub mod layout;
pub mod page;
pub mod path;
pub mod resolver;
pub mod settings;
pub mod signature;
pub mod store;

pub use error::StoreError;
pub use graph::{LinkEdge, LinkGraph, LinkTarget};
pub use index::{NamespaceIndex, PageIndex};
pub use layout::FilesLayout;
pub use page::{Page, PageRef};
pub use path::PagePath;
pub use resolver::{resolve, ResolvedTarget};
pub use settings::NotebookSettings;
pub use signature::FileSignature;
pub use store::{LoadedPage, PageStore};
