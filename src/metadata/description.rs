//! Raw table description as returned by the store's describe-table call.
//!
//! Field names follow the store's `PascalCase` JSON wire format so a
//! `DescribeTable` response can be deserialized directly. Only the fields
//! index selection needs are modelled; unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key type within a key schema element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Partition key
    #[serde(rename = "HASH")]
    Hash,
    /// Sort key
    #[serde(rename = "RANGE")]
    Range,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Hash => "HASH",
            KeyType::Range => "RANGE",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of a key schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    pub attribute_name: String,
    pub key_type: KeyType,
}

impl KeySchemaElement {
    pub fn hash(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Hash,
        }
    }

    pub fn range(attribute_name: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            key_type: KeyType::Range,
        }
    }
}

/// Which attributes a secondary index copies from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectionType {
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "KEYS_ONLY")]
    KeysOnly,
    #[serde(rename = "INCLUDE")]
    Include,
}

impl ProjectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionType::All => "ALL",
            ProjectionType::KeysOnly => "KEYS_ONLY",
            ProjectionType::Include => "INCLUDE",
        }
    }
}

impl fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection settings for a secondary index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Projection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_type: Option<ProjectionType>,
    /// Non-key attributes copied when the type is `INCLUDE`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

impl Projection {
    pub fn all() -> Self {
        Self {
            projection_type: Some(ProjectionType::All),
            non_key_attributes: Vec::new(),
        }
    }

    pub fn keys_only() -> Self {
        Self {
            projection_type: Some(ProjectionType::KeysOnly),
            non_key_attributes: Vec::new(),
        }
    }

    pub fn include(attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            projection_type: Some(ProjectionType::Include),
            non_key_attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Shape shared by global and local secondary index descriptions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecondaryIndexDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<Projection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
}

impl SecondaryIndexDescription {
    pub fn new(
        name: impl Into<String>,
        key_schema: Vec<KeySchemaElement>,
        projection: Projection,
        item_count: i64,
    ) -> Self {
        Self {
            index_name: Some(name.into()),
            key_schema,
            projection: Some(projection),
            item_count: Some(item_count),
        }
    }
}

/// Global secondary index description
pub type GlobalSecondaryIndexDescription = SecondaryIndexDescription;

/// Local secondary index description
pub type LocalSecondaryIndexDescription = SecondaryIndexDescription;

/// Description of one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_schema: Vec<KeySchemaElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndexDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<LocalSecondaryIndexDescription>,
}

impl TableDescription {
    /// Table with a primary key and no secondary indexes
    pub fn new(
        table_name: impl Into<String>,
        key_schema: Vec<KeySchemaElement>,
        item_count: i64,
    ) -> Self {
        Self {
            table_name: Some(table_name.into()),
            key_schema,
            item_count: Some(item_count),
            global_secondary_indexes: Vec::new(),
            local_secondary_indexes: Vec::new(),
        }
    }

    /// Adds a global secondary index
    pub fn with_global_index(mut self, index: GlobalSecondaryIndexDescription) -> Self {
        self.global_secondary_indexes.push(index);
        self
    }

    /// Adds a local secondary index
    pub fn with_local_index(mut self, index: LocalSecondaryIndexDescription) -> Self {
        self.local_secondary_indexes.push(index);
        self
    }
}

/// Envelope of a describe-table response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeTableOutput {
    pub table: TableDescription,
}
