//! Dialect independent document tree.
//!
//! Every dialect parses into [`nodes::Document`] and serializes from it.
//! Changes to a loaded tree go through the operations in [`edit`].

pub mod edit;
pub mod nodes;
