//! Explain output for index selection
//!
//! Deterministic, human-readable report of every index's verdict.

use std::fmt;

use super::expression::Expression;
use super::selector::{Evaluation, Verdict};

/// One line of the report
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLine {
    pub index_name: String,
    pub kind: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    pub score: Option<f64>,
    pub reasons: Vec<String>,
}

/// Explain report
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionExplain {
    pub table_name: String,
    /// Whether some index was viable
    pub accepted: bool,
    pub selected_index: Option<String>,
    pub selected_score: Option<f64>,
    /// Filters as `attr op`, ordered by attribute
    pub filters: Vec<String>,
    pub candidates: Vec<CandidateLine>,
}

impl SelectionExplain {
    pub fn from_evaluation(evaluation: &Evaluation, expr: &Expression) -> Self {
        let best = evaluation.best();

        let filters = expr
            .filters()
            .iter()
            .map(|(attr, filter)| format!("{} {}", attr, filter.op_name()))
            .collect();

        let candidates = evaluation
            .candidates
            .iter()
            .map(|c| CandidateLine {
                index_name: c.index.display_name().to_string(),
                kind: c.index.kind.as_str().to_string(),
                partition_key: c.index.partition_key.clone(),
                sort_key: c.index.sort_key.clone(),
                score: c.score(),
                reasons: match &c.verdict {
                    Verdict::Rejected(r) => r.reason_messages(),
                    Verdict::Viable { .. } => Vec::new(),
                },
            })
            .collect();

        Self {
            table_name: evaluation.table_name.clone(),
            accepted: best.is_some(),
            selected_index: best.map(|c| c.index.display_name().to_string()),
            selected_score: best.and_then(|c| c.score()),
            filters,
            candidates,
        }
    }
}

impl fmt::Display for SelectionExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== INDEX SELECTION ===")?;
        writeln!(f, "Table: {}", self.table_name)?;

        if !self.filters.is_empty() {
            writeln!(f, "Filters:")?;
            for filter in &self.filters {
                writeln!(f, "  - {}", filter)?;
            }
        }

        match (&self.selected_index, self.selected_score) {
            (Some(index), Some(score)) => {
                writeln!(f, "Status: ACCEPTED")?;
                writeln!(f, "Index: {} (score {:.1})", index, score)?;
            }
            _ => writeln!(f, "Status: REJECTED")?,
        }

        writeln!(f, "Candidates:")?;
        for c in &self.candidates {
            let key = match &c.sort_key {
                Some(sk) => format!("{}, {}", c.partition_key, sk),
                None => c.partition_key.clone(),
            };
            match c.score {
                Some(score) => {
                    writeln!(f, "  {} [{}] ({}) viable, score {:.1}", c.index_name, c.kind, key, score)?
                }
                None => {
                    writeln!(f, "  {} [{}] ({}) rejected", c.index_name, c.kind, key)?;
                    for reason in &c.reasons {
                        writeln!(f, "    - {}", reason)?;
                    }
                }
            }
        }

        Ok(())
    }
}
