//! autoindex - automatic index selection for partitioned document-store tables
//!
//! Given a table and a query expression, picks the primary index or a
//! global/local secondary index able to answer it, or explains per index
//! why none can.

pub mod client;
pub mod config;
pub mod context;
pub mod metadata;
pub mod observability;
pub mod selector;

pub use client::Client;
pub use config::{ClientConfig, ConfigError};
pub use context::QueryContext;
pub use metadata::{Index, IndexKind, MetadataError, TableDescriptionProvider, TableIndexMetadata};
pub use selector::{Expression, Filter, IndexNotViable, NoViableIndex, SelectionError};
