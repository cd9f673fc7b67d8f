//! Index model
//!
//! One [`Index`] per queryable index of a table: the primary table index plus
//! every global and local secondary index. A table's full set is a
//! [`TableIndexMetadata`], built once and never mutated afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use super::description::{KeySchemaElement, KeyType, Projection, ProjectionType};
use super::errors::{MetadataError, MetadataResult};

/// Name of the primary table index.
///
/// `$` cannot appear in a secondary index name, so this never collides.
pub const PRIMARY_INDEX_NAME: &str = "$primary";

/// Where an index comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Primary,
    GlobalSecondary,
    LocalSecondary,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Primary => "PRIMARY",
            IndexKind::GlobalSecondary => "GSI",
            IndexKind::LocalSecondary => "LSI",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queryable index of a table
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    /// Index name, [`PRIMARY_INDEX_NAME`] for the table itself
    pub name: String,
    pub kind: IndexKind,
    /// HASH element of the key schema
    pub partition_key: String,
    /// RANGE element of the key schema, if any
    pub sort_key: Option<String>,
    /// Item count at the last metadata refresh. Heuristic input only.
    pub size: u64,
    /// Attributes readable from the index when it does not hold whole items.
    /// Empty when `includes_all_attributes` is set.
    pub attribute_set: BTreeSet<String>,
    pub includes_all_attributes: bool,
    /// Primary and local secondary indexes only
    pub consistent_readable: bool,
    /// Items lacking the index's key attributes are absent from the index
    pub is_sparse: bool,
}

impl Index {
    /// Primary table index built from the table's key schema
    pub fn primary(table: &str, key_schema: &[KeySchemaElement], size: u64) -> MetadataResult<Self> {
        let (partition_key, sort_key) = keys_from_schema(table, PRIMARY_INDEX_NAME, key_schema)?;
        Ok(Self {
            name: PRIMARY_INDEX_NAME.to_string(),
            kind: IndexKind::Primary,
            partition_key,
            sort_key,
            size,
            attribute_set: BTreeSet::new(),
            includes_all_attributes: true,
            consistent_readable: true,
            is_sparse: false,
        })
    }

    pub fn is_primary(&self) -> bool {
        self.kind == IndexKind::Primary
    }

    /// Partition key followed by the sort key when present
    pub fn key_attributes(&self) -> Vec<&str> {
        let mut keys = vec![self.partition_key.as_str()];
        if let Some(sort_key) = &self.sort_key {
            keys.push(sort_key.as_str());
        }
        keys
    }

    /// True if `attribute` can be read from this index without fetching the item
    pub fn provides_attribute(&self, attribute: &str) -> bool {
        self.includes_all_attributes || self.attribute_set.contains(attribute)
    }

    /// Name used in messages: the sentinel reads poorly in error output
    pub fn display_name(&self) -> &str {
        if self.is_primary() {
            "table primary index"
        } else {
            &self.name
        }
    }
}

/// Splits a key schema into (partition key, sort key).
///
/// Exactly one HASH element and at most one RANGE element are accepted.
pub(crate) fn keys_from_schema(
    table: &str,
    index_name: &str,
    key_schema: &[KeySchemaElement],
) -> MetadataResult<(String, Option<String>)> {
    let mut partition_key = None;
    let mut sort_key = None;

    for element in key_schema {
        let slot = match element.key_type {
            KeyType::Hash => &mut partition_key,
            KeyType::Range => &mut sort_key,
        };
        if slot.is_some() {
            return Err(MetadataError::invalid(
                table,
                format!(
                    "index {} has more than one {} key",
                    index_name, element.key_type
                ),
            ));
        }
        *slot = Some(element.attribute_name.clone());
    }

    let partition_key = partition_key.ok_or_else(|| {
        MetadataError::invalid(table, format!("index {} has no HASH key", index_name))
    })?;

    Ok((partition_key, sort_key))
}

/// Resolves a projection into (includes all attributes, attribute set).
///
/// Keys are always readable from an index, so a partial projection is the
/// projected attributes plus the index's own keys plus the table's keys.
pub(crate) fn attributes_from_projection(
    table: &str,
    index_name: &str,
    projection: Option<&Projection>,
    index_keys: &[&str],
    table_keys: &[&str],
) -> MetadataResult<(bool, BTreeSet<String>)> {
    let projection_type = projection
        .and_then(|p| p.projection_type)
        .ok_or_else(|| {
            MetadataError::invalid(table, format!("index {} has no projection type", index_name))
        })?;

    if projection_type == ProjectionType::All {
        return Ok((true, BTreeSet::new()));
    }

    let mut attributes: BTreeSet<String> = index_keys
        .iter()
        .chain(table_keys.iter())
        .map(|k| k.to_string())
        .collect();

    if projection_type == ProjectionType::Include {
        if let Some(p) = projection {
            attributes.extend(p.non_key_attributes.iter().cloned());
        }
    }

    Ok((false, attributes))
}

/// Decides whether a secondary index is sparse.
///
/// The ratio of index items to table items is capped at 1.0 (counts are
/// refreshed asynchronously and may briefly disagree); an empty table counts
/// as ratio 1.0.
pub fn infer_sparseness(index_items: u64, table_items: u64, threshold: f64) -> bool {
    if threshold <= 0.0 {
        return false;
    }
    let ratio = if table_items == 0 {
        1.0
    } else {
        (index_items as f64 / table_items as f64).min(1.0)
    };
    ratio < threshold
}

/// Index set of one table, primary index first, then global secondary
/// indexes, then local secondary indexes, each in description order.
#[derive(Debug, Clone)]
pub struct TableIndexMetadata {
    table_name: String,
    indexes: Vec<Arc<Index>>,
    by_name: HashMap<String, usize>,
}

impl TableIndexMetadata {
    /// Builds the set; rejects duplicate index names
    pub fn new(table_name: impl Into<String>, indexes: Vec<Index>) -> MetadataResult<Self> {
        let table_name = table_name.into();
        let mut by_name = HashMap::with_capacity(indexes.len());
        for (position, index) in indexes.iter().enumerate() {
            if by_name.insert(index.name.clone(), position).is_some() {
                return Err(MetadataError::invalid(
                    &table_name,
                    format!("duplicate index name {}", index.name),
                ));
            }
        }
        Ok(Self {
            table_name,
            indexes: indexes.into_iter().map(Arc::new).collect(),
            by_name,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Indexes in selection order
    pub fn indexes(&self) -> &[Arc<Index>] {
        &self.indexes
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Index>> {
        self.by_name.get(name).map(|&i| &self.indexes[i])
    }

    pub fn primary(&self) -> Option<&Arc<Index>> {
        self.get(PRIMARY_INDEX_NAME)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
