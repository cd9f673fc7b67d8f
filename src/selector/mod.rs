//! Index selection
//!
//! Chooses the index of a table that can answer a query expression.
//!
//! # Viability rules (all must hold)
//!
//! 1. Equals filter on the index's partition key
//! 2. Consistent reads only from primary and local secondary indexes
//! 3. Requested order must be the index's sort key
//! 4. Selected attributes must be projected (all attributes if none selected)
//! 5. Sparse indexes need a filter on their sort key
//!
//! # Preference among viable indexes
//!
//! Highest score wins (see [`scoring`]); ties go to the earliest index, and
//! the primary index always comes first.

mod errors;
mod explain;
mod expression;
pub mod scoring;
mod selector;
mod viability;

pub use errors::{
    IndexNotViable, NoViableIndex, SelectionError, SelectionErrorCode, SelectionResult,
};
pub use explain::{CandidateLine, SelectionExplain};
pub use expression::{Expression, Filter, OrderSpec, SortDirection};
pub use selector::{Candidate, Evaluation, IndexSelector, Verdict};
pub use viability::{infractions, is_viable, Infraction};
