//! Registry for importers.

use crate::{ImportResult, Importer};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

/// Registry of importers.
///
/// The registry holds a collection of importers and can automatically
/// identify which importer to use for a given file. The first registered
/// importer that identifies a file wins.
pub struct ImporterRegistry {
    importers: Vec<Arc<dyn Importer>>,
}

/// Where an identified file belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Name of the importer that identified the file.
    pub importer: String,
    /// Account the file belongs to.
    pub account: Option<String>,
    /// Date to file it under.
    pub date: Option<NaiveDate>,
    /// New file name, if it should be renamed.
    pub name: Option<String>,
}

impl ImporterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            importers: Vec::new(),
        }
    }

    /// Register a new importer.
    pub fn register(&mut self, importer: impl Importer + 'static) {
        self.importers.push(Arc::new(importer));
    }

    /// Register an already boxed importer.
    pub fn register_boxed(&mut self, importer: Box<dyn Importer>) {
        self.importers.push(Arc::from(importer));
    }

    /// Find an importer that can handle the given file.
    pub fn identify(&self, path: &Path) -> Option<Arc<dyn Importer>> {
        self.importers
            .iter()
            .find(|importer| importer.identify(path))
            .map(Arc::clone)
    }

    /// Extract transactions from a file using the appropriate importer.
    pub fn extract(&self, path: &Path) -> Result<ImportResult> {
        let importer = self
            .identify(path)
            .with_context(|| format!("No importer found for file: {}", path.display()))?;

        importer
            .extract(path)
            .with_context(|| format!("Failed to extract from: {}", path.display()))
    }

    /// Describe where a file belongs, if any importer identifies it.
    pub fn file_info(&self, path: &Path) -> Result<Option<FileInfo>> {
        let Some(importer) = self.identify(path) else {
            return Ok(None);
        };
        let date = importer
            .file_date(path)
            .with_context(|| format!("Failed to date: {}", path.display()))?;
        Ok(Some(FileInfo {
            importer: importer.name().to_string(),
            account: importer.file_account(path).map(str::to_string),
            date,
            name: importer.file_name(path),
        }))
    }

    /// List all registered importers.
    pub fn list_importers(&self) -> Vec<(&str, &str)> {
        self.importers
            .iter()
            .map(|i| (i.name(), i.description()))
            .collect()
    }

    /// Get the number of registered importers.
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
