//! Viability analysis
//!
//! Lists every reason an index cannot answer an expression. Rules are all
//! evaluated (no short-circuit) and reported in a fixed order:
//!
//! 1. Equality filter on the partition key
//! 2. Consistent read support
//! 3. Ordering by the index's sort key
//! 4. Attribute coverage
//! 5. Sort-key filter on sparse indexes
//!
//! An empty list means the index is viable.

use std::fmt;

use super::expression::Expression;
use crate::metadata::Index;

/// One reason an index cannot serve an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infraction {
    /// No equals filter on the partition key
    MissingPartitionKeyEquality { partition_key: String },
    /// Consistent read requested from a global secondary index
    ConsistentReadUnsupported,
    /// Requested order is not the index's sort key
    OrderUnsupported {
        requested: String,
        sort_key: Option<String>,
    },
    /// Selected attributes the index does not project
    AttributesNotProjected { attributes: Vec<String> },
    /// All attributes requested from a partial projection
    RequiresAllAttributes,
    /// Sparse index queried without a filter on its sort key
    SparseSortKeyUnfiltered { sort_key: String },
    /// Sparse index without a sort key to filter on
    SparseWithoutSortKey,
}

impl fmt::Display for Infraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infraction::MissingPartitionKeyEquality { partition_key } => write!(
                f,
                "expression has no equals condition on partition key attribute: {}",
                partition_key
            ),
            Infraction::ConsistentReadUnsupported => {
                write!(f, "global secondary index does not support consistent read")
            }
            Infraction::OrderUnsupported {
                requested,
                sort_key: Some(sort_key),
            } => write!(
                f,
                "expression orders by {}, which requires an index with sort key: {}",
                requested, sort_key
            ),
            Infraction::OrderUnsupported {
                requested,
                sort_key: None,
            } => write!(
                f,
                "expression orders by {}, but the index has no sort key",
                requested
            ),
            Infraction::AttributesNotProjected { attributes } => write!(
                f,
                "index does not include attributes: {}",
                attributes.join(", ")
            ),
            Infraction::RequiresAllAttributes => write!(
                f,
                "expression selects all attributes, which requires an index that projects all attributes"
            ),
            Infraction::SparseSortKeyUnfiltered { sort_key } => write!(
                f,
                "expression does not filter on sparse index sort key: {}",
                sort_key
            ),
            Infraction::SparseWithoutSortKey => {
                write!(f, "sparse index has no sort key to filter on")
            }
        }
    }
}

/// Every infraction of `index` against `expr`, in rule order
pub fn infractions(index: &Index, expr: &Expression) -> Vec<Infraction> {
    let mut found = Vec::new();

    let partition_filter = expr.filter(&index.partition_key);
    if !partition_filter.is_some_and(|f| f.is_equality()) {
        found.push(Infraction::MissingPartitionKeyEquality {
            partition_key: index.partition_key.clone(),
        });
    }

    if expr.is_consistent_read() && !index.consistent_readable {
        found.push(Infraction::ConsistentReadUnsupported);
    }

    if let Some(order) = expr.order() {
        if index.sort_key.as_deref() != Some(order.attribute.as_str()) {
            found.push(Infraction::OrderUnsupported {
                requested: order.attribute.clone(),
                sort_key: index.sort_key.clone(),
            });
        }
    }

    match expr.selected_attributes() {
        Some(selected) => {
            let missing: Vec<String> = selected
                .iter()
                .filter(|a| !index.provides_attribute(a))
                .cloned()
                .collect();
            if !missing.is_empty() {
                found.push(Infraction::AttributesNotProjected {
                    attributes: missing,
                });
            }
        }
        None if !index.includes_all_attributes => {
            found.push(Infraction::RequiresAllAttributes);
        }
        None => {}
    }

    if index.is_sparse {
        match &index.sort_key {
            Some(sort_key) if expr.filter(sort_key).is_none() => {
                found.push(Infraction::SparseSortKeyUnfiltered {
                    sort_key: sort_key.clone(),
                });
            }
            Some(_) => {}
            None => found.push(Infraction::SparseWithoutSortKey),
        }
    }

    found
}

/// True when `index` can answer `expr`
pub fn is_viable(index: &Index, expr: &Expression) -> bool {
    infractions(index, expr).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::IndexKind;
    use crate::selector::expression::Filter;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn gsi(pk: &str, sk: Option<&str>, projected: &[&str], sparse: bool) -> Index {
        Index {
            name: "gsi".into(),
            kind: IndexKind::GlobalSecondary,
            partition_key: pk.into(),
            sort_key: sk.map(String::from),
            size: 50,
            attribute_set: projected.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            includes_all_attributes: false,
            consistent_readable: false,
            is_sparse: sparse,
        }
    }

    fn primary(pk: &str, sk: Option<&str>) -> Index {
        Index {
            name: crate::metadata::PRIMARY_INDEX_NAME.into(),
            kind: IndexKind::Primary,
            partition_key: pk.into(),
            sort_key: sk.map(String::from),
            size: 100,
            attribute_set: BTreeSet::new(),
            includes_all_attributes: true,
            consistent_readable: true,
            is_sparse: false,
        }
    }

    #[test]
    fn test_primary_with_pk_equality_is_viable() {
        let expr = Expression::new().filter_eq("pk", json!("a"));
        assert!(infractions(&primary("pk", None), &expr).is_empty());
        assert!(is_viable(&primary("pk", None), &expr));
    }

    #[test]
    fn test_non_equality_partition_filter_rejected() {
        let expr = Expression::new().with_filter("pk", Filter::BeginsWith(json!("a")));
        assert_eq!(
            infractions(&primary("pk", None), &expr),
            vec![Infraction::MissingPartitionKeyEquality {
                partition_key: "pk".into()
            }]
        );
    }

    #[test]
    fn test_consistent_read_on_gsi_rejected() {
        let index = gsi("g", None, &["g", "pk"], false);
        let expr = Expression::new()
            .filter_eq("g", json!(1))
            .with_consistent_read(true)
            .select(["pk"]);
        assert_eq!(
            infractions(&index, &expr),
            vec![Infraction::ConsistentReadUnsupported]
        );
    }

    #[test]
    fn test_order_requires_matching_sort_key() {
        let expr = Expression::new().filter_eq("pk", json!(1)).order_by("created");

        assert_eq!(
            infractions(&primary("pk", Some("sk")), &expr),
            vec![Infraction::OrderUnsupported {
                requested: "created".into(),
                sort_key: Some("sk".into())
            }]
        );
        assert_eq!(
            infractions(&primary("pk", None), &expr)[0].to_string(),
            "expression orders by created, but the index has no sort key"
        );
        assert!(infractions(&primary("pk", Some("created")), &expr).is_empty());
    }

    #[test]
    fn test_missing_attributes_combined_in_one_infraction() {
        let index = gsi("g", None, &["g", "a"], false);
        let expr = Expression::new()
            .filter_eq("g", json!(1))
            .select(["a", "b", "c"]);

        let found = infractions(&index, &expr);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to_string(), "index does not include attributes: b, c");
    }

    #[test]
    fn test_all_attributes_need_full_projection() {
        let index = gsi("g", None, &["g"], false);
        let expr = Expression::new().filter_eq("g", json!(1));
        assert_eq!(
            infractions(&index, &expr),
            vec![Infraction::RequiresAllAttributes]
        );
    }

    #[test]
    fn test_sparse_index_requires_sort_key_filter() {
        let index = gsi("gsiPk", Some("gsiSk"), &["gsiPk", "gsiSk"], true);
        let without = Expression::new().filter_eq("gsiPk", json!(1)).select(["gsiPk"]);
        let with_range = without
            .clone()
            .with_filter("gsiSk", Filter::GreaterThan(json!(3)));
        let with_exists = without.clone().with_filter("gsiSk", Filter::Exists);

        assert_eq!(
            infractions(&index, &without)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["expression does not filter on sparse index sort key: gsiSk"]
        );
        assert!(infractions(&index, &with_range).is_empty());
        assert!(infractions(&index, &with_exists).is_empty());
    }

    #[test]
    fn test_sparse_hash_only_index_rejected() {
        let index = gsi("g", None, &["g"], true);
        let expr = Expression::new().filter_eq("g", json!(1)).select(["g"]);
        assert_eq!(
            infractions(&index, &expr),
            vec![Infraction::SparseWithoutSortKey]
        );

        let dense = gsi("g", None, &["g"], false);
        assert!(infractions(&dense, &expr).is_empty());
    }

    #[test]
    fn test_all_rules_collected_in_order() {
        let index = gsi("gsiPk", Some("gsiSk"), &["gsiPk"], true);
        let expr = Expression::new()
            .with_consistent_read(true)
            .order_by("other");

        let found = infractions(&index, &expr);
        assert_eq!(
            found,
            vec![
                Infraction::MissingPartitionKeyEquality {
                    partition_key: "gsiPk".into()
                },
                Infraction::ConsistentReadUnsupported,
                Infraction::OrderUnsupported {
                    requested: "other".into(),
                    sort_key: Some("gsiSk".into())
                },
                Infraction::RequiresAllAttributes,
                Infraction::SparseSortKeyUnfiltered {
                    sort_key: "gsiSk".into()
                },
            ]
        );
    }
}
