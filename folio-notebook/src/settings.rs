//! Per-notebook settings
//!
//! The default dialect is explicit context handed to the store, never a
//! global. Changing it only affects pages materialized afterwards.

use crate::error::StoreError;
use folio_babel::dialects::wiki::WIKI_ID;
use folio_babel::DialectRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookSettings {
    /// Dialect id used for newly materialized pages.
    pub default_dialect: String,
    /// Extension for new page files; must be the default dialect's canonical
    /// extension.
    pub default_extension: String,
    pub case_sensitive_links: bool,
}

impl Default for NotebookSettings {
    fn default() -> Self {
        NotebookSettings {
            default_dialect: WIKI_ID.to_string(),
            default_extension: "txt".to_string(),
            case_sensitive_links: false,
        }
    }
}

impl NotebookSettings {
    /// Settings for a notebook whose new pages use `dialect`.
    pub fn for_dialect(registry: &DialectRegistry, dialect: &str) -> Result<Self, StoreError> {
        let extension = registry.get(dialect)?.extension().to_string();
        Ok(NotebookSettings {
            default_dialect: dialect.to_string(),
            default_extension: extension,
            ..Default::default()
        })
    }

    pub fn validate(&self, registry: &DialectRegistry) -> Result<(), StoreError> {
        let dialect = registry.get(&self.default_dialect).map_err(|_| {
            StoreError::InvalidSettings(format!(
                "unknown default file format '{}' (available: {})",
                self.default_dialect,
                registry.list_dialects().join(", ")
            ))
        })?;
        if dialect.extension() != self.default_extension {
            return Err(StoreError::InvalidSettings(format!(
                "default file extension '{}' does not match format '{}' (expected '{}')",
                self.default_extension,
                self.default_dialect,
                dialect.extension()
            )));
        }
        Ok(())
    }
}
