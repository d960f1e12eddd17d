//! Dialect registry for dialect discovery and selection
//!
//! This module provides a centralized registry for all available dialects.
//! Dialects are registered as descriptors and retrieved by id or by file
//! extension.

use crate::dialect::Dialect;
use crate::dialects;
use crate::error::FormatError;
use crate::ir::nodes::Document;
use crate::parser::Parsed;
use log::debug;
use std::collections::BTreeMap;

/// Registry of markup dialects
///
/// # Examples
///
/// ```ignore
/// let registry = DialectRegistry::default();
///
/// let dialect = registry.get("markdown")?;
/// let parsed = dialect.parse("# Title");
/// ```
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Dialect>,
}

impl DialectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        DialectRegistry {
            dialects: BTreeMap::new(),
        }
    }

    /// Register a dialect
    ///
    /// The descriptor is validated first. If a dialect with the same id
    /// already exists, it is replaced.
    pub fn register(&mut self, dialect: Dialect) -> Result<(), FormatError> {
        dialect.validate()?;
        debug!(
            "registering dialect '{}' (.{})",
            dialect.id(),
            dialect.extension()
        );
        self.dialects.insert(dialect.id().to_string(), dialect);
        Ok(())
    }

    /// Get a dialect by id
    pub fn get(&self, id: &str) -> Result<&Dialect, FormatError> {
        self.dialects
            .get(id)
            .ok_or_else(|| FormatError::DialectNotFound(id.to_string()))
    }

    /// Check if a dialect exists
    pub fn has(&self, id: &str) -> bool {
        self.dialects.contains_key(id)
    }

    /// List all available dialect ids (sorted)
    pub fn list_dialects(&self) -> Vec<String> {
        self.dialects.keys().cloned().collect()
    }

    /// Iterate over the registered dialects in id order
    pub fn dialects(&self) -> impl Iterator<Item = &Dialect> {
        self.dialects.values()
    }

    /// Find the dialect that reads files with this extension (no leading dot)
    pub fn for_extension(&self, extension: &str) -> Option<&Dialect> {
        self.dialects
            .values()
            .find(|dialect| dialect.file_extensions().contains(&extension))
    }

    /// Detect dialect from filename based on file extension
    ///
    /// Returns the dialect id if a matching extension is found, or None otherwise.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = DialectRegistry::default();
    /// assert_eq!(registry.detect_dialect_from_filename("Home.txt"), Some("wiki".to_string()));
    /// assert_eq!(registry.detect_dialect_from_filename("Home.md"), Some("markdown".to_string()));
    /// assert_eq!(registry.detect_dialect_from_filename("Home.unknown"), None);
    /// ```
    pub fn detect_dialect_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;
        self.for_extension(extension)
            .map(|dialect| dialect.id().to_string())
    }

    /// Parse source text using the specified dialect
    pub fn parse(&self, source: &str, dialect: &str) -> Result<Parsed, FormatError> {
        Ok(self.get(dialect)?.parse(source))
    }

    /// Serialize a document using the specified dialect
    pub fn serialize(&self, doc: &Document, dialect: &str) -> Result<String, FormatError> {
        Ok(self.get(dialect)?.serialize(doc))
    }

    /// Create a registry with the built-in dialects
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        for dialect in [dialects::wiki(), dialects::markdown()] {
            registry.dialects.insert(dialect.id().to_string(), dialect);
        }

        registry
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
