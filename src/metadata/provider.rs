//! Table description providers
//!
//! The cache calls a provider on a miss. Providers receive the caller's
//! [`QueryContext`] untouched and must not retry internally.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::RwLock;

use super::description::{DescribeTableOutput, TableDescription};
use super::errors::{MetadataError, MetadataResult};
use crate::context::QueryContext;

/// Future returned by [`TableDescriptionProvider::describe`]
pub type DescribeFuture<'a> =
    Pin<Box<dyn Future<Output = MetadataResult<TableDescription>> + Send + 'a>>;

/// Source of raw table descriptions
pub trait TableDescriptionProvider: Send + Sync {
    /// Describe one table
    fn describe<'a>(&'a self, ctx: &'a QueryContext, table_name: &'a str) -> DescribeFuture<'a>;
}

/// In-memory provider for fixtures and offline planning
#[derive(Debug, Default)]
pub struct StaticDescriptionProvider {
    tables: RwLock<HashMap<String, TableDescription>>,
}

impl StaticDescriptionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration
    pub fn with_table(mut self, table_name: impl Into<String>, description: TableDescription) -> Self {
        let tables = match self.tables.get_mut() {
            Ok(tables) => tables,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables.insert(table_name.into(), description);
        self
    }

    /// Registers or replaces a table description
    pub fn insert(
        &self,
        table_name: impl Into<String>,
        description: TableDescription,
    ) -> MetadataResult<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
        tables.insert(table_name.into(), description);
        Ok(())
    }

    fn lookup(&self, table_name: &str) -> MetadataResult<TableDescription> {
        let tables = self
            .tables
            .read()
            .map_err(|_| MetadataError::Internal("Lock poisoned".into()))?;
        tables
            .get(table_name)
            .cloned()
            .ok_or_else(|| MetadataError::TableNotFound(table_name.to_string()))
    }
}

impl TableDescriptionProvider for StaticDescriptionProvider {
    fn describe<'a>(&'a self, _ctx: &'a QueryContext, table_name: &'a str) -> DescribeFuture<'a> {
        Box::pin(async move { self.lookup(table_name) })
    }
}

/// Reads `<dir>/<table>.json`.
///
/// The file holds either a describe-table response (`{"Table": {...}}`) or a
/// bare table description, in the store's wire format.
#[derive(Debug, Clone)]
pub struct JsonFileDescriptionProvider {
    dir: PathBuf,
}

impl JsonFileDescriptionProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a table's description file. Names outside the store's table
    /// name alphabet are rejected so they cannot escape `dir`.
    fn path_for(&self, table_name: &str) -> MetadataResult<PathBuf> {
        let valid = !table_name.is_empty()
            && table_name != "."
            && table_name != ".."
            && table_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(MetadataError::TableNotFound(table_name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", table_name)))
    }

    async fn read(&self, table_name: &str) -> MetadataResult<TableDescription> {
        let path = self.path_for(table_name)?;
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MetadataError::TableNotFound(table_name.to_string())
            } else {
                MetadataError::Io(format!("{}: {}", path.display(), e))
            }
        })?;
        decode_description(&contents)
    }
}

impl TableDescriptionProvider for JsonFileDescriptionProvider {
    fn describe<'a>(&'a self, _ctx: &'a QueryContext, table_name: &'a str) -> DescribeFuture<'a> {
        Box::pin(self.read(table_name))
    }
}

/// Decodes a describe-table response or a bare description
pub fn decode_description(document: &str) -> MetadataResult<TableDescription> {
    let value: serde_json::Value =
        serde_json::from_str(document).map_err(|e| MetadataError::Decode(e.to_string()))?;

    let decoded = if value.get("Table").is_some() {
        serde_json::from_value::<DescribeTableOutput>(value).map(|o| o.table)
    } else {
        serde_json::from_value::<TableDescription>(value)
    };
    decoded.map_err(|e| MetadataError::Decode(e.to_string()))
}
