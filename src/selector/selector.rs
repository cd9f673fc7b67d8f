//! Index selector
//!
//! Evaluates every index of a table against an expression and picks the
//! viable index with the strictly highest score. Ties keep metadata order:
//! primary index, then global secondary indexes, then local secondary
//! indexes. Pure: no I/O, no shared state.

use std::sync::Arc;

use super::errors::{IndexNotViable, NoViableIndex, SelectionResult};
use super::expression::Expression;
use super::scoring::score;
use super::viability::infractions;
use crate::metadata::{Index, TableIndexMetadata};

/// Outcome for one index
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Viable { score: f64 },
    Rejected(IndexNotViable),
}

/// One index with its verdict
#[derive(Debug, Clone)]
pub struct Candidate {
    pub index: Arc<Index>,
    pub verdict: Verdict,
}

impl Candidate {
    pub fn is_viable(&self) -> bool {
        matches!(self.verdict, Verdict::Viable { .. })
    }

    pub fn score(&self) -> Option<f64> {
        match self.verdict {
            Verdict::Viable { score } => Some(score),
            Verdict::Rejected(_) => None,
        }
    }
}

/// Verdicts for every index of a table, in metadata order
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub table_name: String,
    pub candidates: Vec<Candidate>,
}

impl Evaluation {
    /// Winning candidate: strictly highest score, first seen on ties
    pub fn best(&self) -> Option<&Candidate> {
        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in &self.candidates {
            if let Some(score) = candidate.score() {
                match best {
                    Some((_, best_score)) if score <= best_score => {}
                    _ => best = Some((candidate, score)),
                }
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Viable candidates in metadata order
    pub fn viable(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_viable())
    }

    /// Rejections in metadata order
    pub fn rejections(&self) -> Vec<IndexNotViable> {
        self.candidates
            .iter()
            .filter_map(|c| match &c.verdict {
                Verdict::Rejected(rejection) => Some(rejection.clone()),
                Verdict::Viable { .. } => None,
            })
            .collect()
    }

    /// Winning index, or every rejection
    pub fn into_choice(self) -> SelectionResult<Arc<Index>> {
        if let Some(best) = self.best() {
            return Ok(Arc::clone(&best.index));
        }
        Err(NoViableIndex {
            rejections: self.rejections(),
            table_name: self.table_name,
        }
        .into())
    }
}

/// Index selector over one table's metadata
pub struct IndexSelector<'a> {
    metadata: &'a TableIndexMetadata,
}

impl<'a> IndexSelector<'a> {
    pub fn new(metadata: &'a TableIndexMetadata) -> Self {
        Self { metadata }
    }

    /// Verdict for every index.
    ///
    /// Deterministic: same metadata and expression → same evaluation.
    pub fn evaluate(&self, expr: &Expression) -> Evaluation {
        let candidates = self
            .metadata
            .indexes()
            .iter()
            .map(|index| {
                let found = infractions(index, expr);
                let verdict = if found.is_empty() {
                    Verdict::Viable {
                        score: score(index, expr),
                    }
                } else {
                    Verdict::Rejected(IndexNotViable::new(index.name.clone(), found))
                };
                Candidate {
                    index: Arc::clone(index),
                    verdict,
                }
            })
            .collect();

        Evaluation {
            table_name: self.metadata.table_name().to_string(),
            candidates,
        }
    }

    /// Best viable index for `expr`
    pub fn choose(&self, expr: &Expression) -> SelectionResult<Arc<Index>> {
        self.evaluate(expr).into_choice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        parse_table_index_metadata, KeySchemaElement, Projection, SecondaryIndexDescription,
        TableDescription, PRIMARY_INDEX_NAME,
    };
    use crate::selector::errors::SelectionError;
    use crate::selector::expression::Filter;
    use serde_json::json;

    fn table(threshold: f64) -> TableIndexMetadata {
        let description = TableDescription::new(
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
            100,
        ))
        .with_local_index(SecondaryIndexDescription::new(
            "byPlacedAt",
            vec![
                KeySchemaElement::hash("customerId"),
                KeySchemaElement::range("placedAt"),
            ],
            Projection::all(),
            100,
        ));
        parse_table_index_metadata("orders", &description, threshold).unwrap()
    }

    #[test]
    fn test_primary_wins_tie() {
        let meta = table(0.0);
        let expr = Expression::new().filter_eq("customerId", json!("c"));

        let evaluation = IndexSelector::new(&meta).evaluate(&expr);
        let viable: Vec<&str> = evaluation.viable().map(|c| c.index.name.as_str()).collect();
        assert_eq!(viable, vec![PRIMARY_INDEX_NAME, "byPlacedAt"]);

        let chosen = IndexSelector::new(&meta).choose(&expr).unwrap();
        assert_eq!(chosen.name, PRIMARY_INDEX_NAME);
    }

    #[test]
    fn test_sort_key_condition_beats_primary() {
        let meta = table(0.0);
        let expr = Expression::new()
            .filter_eq("customerId", json!("c"))
            .with_filter("placedAt", Filter::GreaterThan(json!(5)));

        let chosen = IndexSelector::new(&meta).choose(&expr).unwrap();
        assert_eq!(chosen.name, "byPlacedAt");
    }

    #[test]
    fn test_gsi_chosen_when_only_viable() {
        let meta = table(0.0);
        let expr = Expression::new()
            .filter_eq("status", json!("OPEN"))
            .select(["orderId"]);

        let chosen = IndexSelector::new(&meta).choose(&expr).unwrap();
        assert_eq!(chosen.name, "byStatus");
    }

    #[test]
    fn test_no_viable_index_lists_every_index() {
        let meta = table(1.1);
        let expr = Expression::new().filter_eq("status", json!("OPEN"));

        let err = IndexSelector::new(&meta).choose(&expr).unwrap_err();
        let rejections = err.rejections().unwrap();
        let names: Vec<&str> = rejections.iter().map(|r| r.index_name.as_str()).collect();
        assert_eq!(names, vec![PRIMARY_INDEX_NAME, "byStatus", "byPlacedAt"]);
        assert!(matches!(err, SelectionError::NoViableIndex(_)));
    }

    #[test]
    fn test_viability_and_selection_agree() {
        let meta = table(1.1);
        let expressions = [
            Expression::new().filter_eq("customerId", json!(1)),
            Expression::new()
                .filter_eq("customerId", json!(1))
                .with_filter("placedAt", Filter::Exists),
            Expression::new().filter_eq("status", json!(1)).select(["status"]),
            Expression::new()
                .filter_eq("status", json!(1))
                .with_filter("placedAt", Filter::LessThan(json!(1)))
                .select(["status"]),
        ];

        for expr in &expressions {
            let evaluation = IndexSelector::new(&meta).evaluate(expr);
            for candidate in &evaluation.candidates {
                assert_eq!(
                    candidate.is_viable(),
                    infractions(&candidate.index, expr).is_empty()
                );
            }
            if let Ok(chosen) = IndexSelector::new(&meta).choose(expr) {
                assert!(infractions(&chosen, expr).is_empty());
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let meta = table(1.1);
        let expr = Expression::new()
            .filter_eq("customerId", json!(1))
            .with_filter("placedAt", Filter::Exists);

        let first = IndexSelector::new(&meta).choose(&expr).unwrap();
        for _ in 0..10 {
            assert_eq!(IndexSelector::new(&meta).choose(&expr).unwrap().name, first.name);
        }
    }
}
