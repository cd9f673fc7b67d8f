//! Table index metadata
//!
//! Turns a raw table description (from a [`TableDescriptionProvider`]) into
//! the set of [`Index`] models selection works on, and caches that set per
//! table for the lifetime of a client.
//!
//! # Sparseness
//!
//! A secondary index is sparse when items lacking its key attributes may be
//! missing from it. It is inferred once, at parse time, from the ratio of
//! index items to table items against the client's sparseness threshold.
//! The primary index is never sparse.
//!
//! # Staleness
//!
//! Cached entries are never refreshed. Indexes added or counts changed after
//! a table was first parsed are not seen by the same client.

mod cache;
mod description;
mod errors;
mod index;
mod parser;
mod provider;

pub use cache::{CacheLookup, MetadataCache};
pub use description::{
    DescribeTableOutput, GlobalSecondaryIndexDescription, KeySchemaElement, KeyType,
    LocalSecondaryIndexDescription, Projection, ProjectionType, SecondaryIndexDescription,
    TableDescription,
};
pub use errors::{MetadataError, MetadataResult};
pub use index::{infer_sparseness, Index, IndexKind, TableIndexMetadata, PRIMARY_INDEX_NAME};
pub use parser::parse_table_index_metadata;
pub use provider::{
    decode_description, DescribeFuture, JsonFileDescriptionProvider, StaticDescriptionProvider,
    TableDescriptionProvider,
};
