//! Markdown dialect tests
//!
//! Tests for parsing Markdown pages into the document tree and writing them back.

mod export;
mod table;
