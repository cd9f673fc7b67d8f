//! Preference among viable indexes
//!
//! Only called for indexes with no infractions. Higher is better; equal
//! scores keep metadata order, so the primary index wins ties.

use super::expression::Expression;
use crate::metadata::Index;

/// Every viable index starts here
pub const VIABLE_BASE: f64 = 1.0;

/// The expression's filter on the index's sort key can be sent as a key
/// condition, narrowing the read instead of filtering after it
pub const SORT_KEY_CONDITION_BONUS: f64 = 2.0;

/// Explicit attribute selection served from a partial projection
pub const NARROW_PROJECTION_BONUS: f64 = 0.5;

/// Score of a viable index for an expression
pub fn score(index: &Index, expr: &Expression) -> f64 {
    let mut score = VIABLE_BASE;

    let sort_key_condition = index
        .sort_key
        .as_deref()
        .and_then(|sk| expr.filter(sk))
        .is_some_and(|f| f.is_key_range());
    if sort_key_condition {
        score += SORT_KEY_CONDITION_BONUS;
    }

    if expr.selected_attributes().is_some() && !index.includes_all_attributes {
        score += NARROW_PROJECTION_BONUS;
    }

    score
}
