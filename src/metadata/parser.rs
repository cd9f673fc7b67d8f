//! Table description → index metadata
//!
//! Order of the produced set: primary index, global secondary indexes, local
//! secondary indexes. Selection breaks score ties by this order.

use super::description::{SecondaryIndexDescription, TableDescription};
use super::errors::{MetadataError, MetadataResult};
use super::index::{
    attributes_from_projection, infer_sparseness, keys_from_schema, Index, IndexKind,
    TableIndexMetadata, PRIMARY_INDEX_NAME,
};

/// Parses a table description into its index set.
///
/// `table_name` is the name the caller asked for; it is used for the result
/// and in error messages even if the description carries its own name.
/// The description is only read.
pub fn parse_table_index_metadata(
    table_name: &str,
    description: &TableDescription,
    sparseness_threshold: f64,
) -> MetadataResult<TableIndexMetadata> {
    let table_size = item_count(table_name, "table", description.item_count)?;

    let primary = Index::primary(table_name, &description.key_schema, table_size)?;
    let table_keys: Vec<String> = primary
        .key_attributes()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut indexes = Vec::with_capacity(
        1 + description.global_secondary_indexes.len() + description.local_secondary_indexes.len(),
    );
    indexes.push(primary);

    for gsi in &description.global_secondary_indexes {
        indexes.push(parse_secondary_index(
            table_name,
            gsi,
            IndexKind::GlobalSecondary,
            &table_keys,
            table_size,
            sparseness_threshold,
        )?);
    }

    for lsi in &description.local_secondary_indexes {
        indexes.push(parse_secondary_index(
            table_name,
            lsi,
            IndexKind::LocalSecondary,
            &table_keys,
            table_size,
            sparseness_threshold,
        )?);
    }

    TableIndexMetadata::new(table_name, indexes)
}

fn parse_secondary_index(
    table_name: &str,
    description: &SecondaryIndexDescription,
    kind: IndexKind,
    table_keys: &[String],
    table_size: u64,
    sparseness_threshold: f64,
) -> MetadataResult<Index> {
    let name = description
        .index_name
        .clone()
        .ok_or_else(|| MetadataError::invalid(table_name, format!("{} without a name", kind)))?;
    if name == PRIMARY_INDEX_NAME {
        return Err(MetadataError::invalid(
            table_name,
            format!("secondary index uses reserved name {}", PRIMARY_INDEX_NAME),
        ));
    }

    let size = item_count(table_name, &name, description.item_count)?;
    let (partition_key, sort_key) = keys_from_schema(table_name, &name, &description.key_schema)?;

    let mut index_keys = vec![partition_key.as_str()];
    if let Some(sk) = &sort_key {
        index_keys.push(sk.as_str());
    }
    let table_keys: Vec<&str> = table_keys.iter().map(String::as_str).collect();
    let (includes_all_attributes, attribute_set) = attributes_from_projection(
        table_name,
        &name,
        description.projection.as_ref(),
        &index_keys,
        &table_keys,
    )?;

    Ok(Index {
        name,
        kind,
        partition_key,
        sort_key,
        size,
        attribute_set,
        includes_all_attributes,
        // global secondary indexes are maintained asynchronously
        consistent_readable: kind == IndexKind::LocalSecondary,
        is_sparse: infer_sparseness(size, table_size, sparseness_threshold),
    })
}

fn item_count(table_name: &str, owner: &str, count: Option<i64>) -> MetadataResult<u64> {
    let count = count.ok_or_else(|| {
        MetadataError::invalid(table_name, format!("{} has no ItemCount", owner))
    })?;
    u64::try_from(count).map_err(|_| {
        MetadataError::invalid(
            table_name,
            format!("{} has negative ItemCount {}", owner, count),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::description::{KeySchemaElement, Projection};

    fn orders_table() -> TableDescription {
        TableDescription::new(
            "orders",
            vec![
                KeySchemaElement::hash("customerId"),
                KeySchemaElement::range("orderId"),
            ],
            100,
        )
        .with_global_index(SecondaryIndexDescription::new(
            "byStatus",
            vec![
                KeySchemaElement::hash("status"),
                KeySchemaElement::range("placedAt"),
            ],
            Projection::keys_only(),
            50,
        ))
        .with_local_index(SecondaryIndexDescription::new(
            "byTotal",
            vec![
                KeySchemaElement::hash("customerId"),
                KeySchemaElement::range("total"),
            ],
            Projection::all(),
            100,
        ))
    }

    #[test]
    fn test_primary_index_first() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 1.1).unwrap();

        let primary = &meta.indexes()[0];
        assert!(primary.is_primary());
        assert_eq!(primary.partition_key, "customerId");
        assert_eq!(primary.sort_key.as_deref(), Some("orderId"));
        assert_eq!(primary.size, 100);
        assert!(!primary.is_sparse);
    }

    #[test]
    fn test_insertion_order_primary_gsi_lsi() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 1.1).unwrap();
        let kinds: Vec<IndexKind> = meta.indexes().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IndexKind::Primary,
                IndexKind::GlobalSecondary,
                IndexKind::LocalSecondary
            ]
        );
    }

    #[test]
    fn test_gsi_properties() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 1.1).unwrap();
        let gsi = meta.get("byStatus").unwrap();

        assert!(!gsi.consistent_readable);
        assert!(!gsi.includes_all_attributes);
        assert!(gsi.is_sparse);
        assert_eq!(gsi.size, 50);
        for attr in ["status", "placedAt", "customerId", "orderId"] {
            assert!(gsi.attribute_set.contains(attr), "missing {}", attr);
        }
        assert_eq!(gsi.attribute_set.len(), 4);
    }

    #[test]
    fn test_lsi_properties() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 1.1).unwrap();
        let lsi = meta.get("byTotal").unwrap();

        assert!(lsi.consistent_readable);
        assert!(lsi.includes_all_attributes);
        assert!(lsi.attribute_set.is_empty());
        assert_eq!(lsi.partition_key, "customerId");
        // default threshold marks every secondary index sparse
        assert!(lsi.is_sparse);
    }

    #[test]
    fn test_threshold_one_full_index_not_sparse() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 1.0).unwrap();
        assert!(!meta.get("byTotal").unwrap().is_sparse);
        assert!(meta.get("byStatus").unwrap().is_sparse);
    }

    #[test]
    fn test_threshold_zero_nothing_sparse() {
        let meta = parse_table_index_metadata("orders", &orders_table(), 0.0).unwrap();
        assert!(meta.indexes().iter().all(|i| !i.is_sparse));
    }

    #[test]
    fn test_description_not_mutated() {
        let description = orders_table();
        let before = description.clone();
        parse_table_index_metadata("orders", &description, 1.1).unwrap();
        assert_eq!(description, before);
    }

    #[test]
    fn test_missing_table_item_count_rejected() {
        let mut description = orders_table();
        description.item_count = None;
        let err = parse_table_index_metadata("orders", &description, 1.1).unwrap_err();
        assert_eq!(err.code(), "AUTOINDEX_INVALID_DESCRIPTION");
    }

    #[test]
    fn test_negative_item_count_rejected() {
        let mut description = orders_table();
        description.global_secondary_indexes[0].item_count = Some(-1);
        assert!(parse_table_index_metadata("orders", &description, 1.1).is_err());
    }

    #[test]
    fn test_reserved_name_rejected() {
        let description = orders_table().with_global_index(SecondaryIndexDescription::new(
            PRIMARY_INDEX_NAME,
            vec![KeySchemaElement::hash("x")],
            Projection::all(),
            1,
        ));
        assert!(parse_table_index_metadata("orders", &description, 1.1).is_err());
    }

    #[test]
    fn test_duplicate_secondary_name_rejected() {
        let description = orders_table().with_local_index(SecondaryIndexDescription::new(
            "byStatus",
            vec![KeySchemaElement::hash("customerId"), KeySchemaElement::range("x")],
            Projection::all(),
            1,
        ));
        let err = parse_table_index_metadata("orders", &description, 1.1).unwrap_err();
        assert!(err.to_string().contains("duplicate index name byStatus"));
    }

    #[test]
    fn test_primary_without_hash_key_rejected() {
        let description = TableDescription::new("t", vec![KeySchemaElement::range("sk")], 1);
        assert!(parse_table_index_metadata("t", &description, 1.1).is_err());
    }
}
