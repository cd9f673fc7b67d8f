//! Parsed query expression, as seen by index selection.
//!
//! Produced by an expression parser outside this crate. Selection only cares
//! which attributes are filtered and with which kind of filter; filter values
//! are carried along for the request builder.

use std::collections::BTreeMap;

use serde_json::Value;

/// Filter condition on one attribute.
///
/// Selection matches on the variant, never on the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// attr = value
    Equals(Value),
    /// attr <> value
    NotEquals(Value),
    /// attr < value
    LessThan(Value),
    /// attr <= value
    LessOrEqual(Value),
    /// attr > value
    GreaterThan(Value),
    /// attr >= value
    GreaterOrEqual(Value),
    /// low <= attr <= high
    Between(Value, Value),
    /// string/binary prefix
    BeginsWith(Value),
    /// attr IN (values)
    In(Vec<Value>),
    /// set/list/string containment
    Contains(Value),
    /// attribute present
    Exists,
    /// attribute absent
    NotExists,
}

impl Filter {
    /// True for the equality variant only
    pub fn is_equality(&self) -> bool {
        matches!(self, Filter::Equals(_))
    }

    /// True for variants a sort-key condition can express
    pub fn is_key_range(&self) -> bool {
        matches!(
            self,
            Filter::Equals(_)
                | Filter::LessThan(_)
                | Filter::LessOrEqual(_)
                | Filter::GreaterThan(_)
                | Filter::GreaterOrEqual(_)
                | Filter::Between(_, _)
                | Filter::BeginsWith(_)
        )
    }

    /// Operator name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            Filter::Equals(_) => "eq",
            Filter::NotEquals(_) => "ne",
            Filter::LessThan(_) => "lt",
            Filter::LessOrEqual(_) => "lte",
            Filter::GreaterThan(_) => "gt",
            Filter::GreaterOrEqual(_) => "gte",
            Filter::Between(_, _) => "between",
            Filter::BeginsWith(_) => "begins_with",
            Filter::In(_) => "in",
            Filter::Contains(_) => "contains",
            Filter::Exists => "exists",
            Filter::NotExists => "not_exists",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Requested result ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub attribute: String,
    pub direction: SortDirection,
}

/// A query expression.
///
/// At most one filter per attribute; a later filter on the same attribute
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    filters: BTreeMap<String, Filter>,
    consistent_read: bool,
    order: Option<OrderSpec>,
    attributes: Option<Vec<String>>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter
    pub fn with_filter(mut self, attribute: impl Into<String>, filter: Filter) -> Self {
        self.filters.insert(attribute.into(), filter);
        self
    }

    /// Adds an equality filter
    pub fn filter_eq(self, attribute: impl Into<String>, value: Value) -> Self {
        self.with_filter(attribute, Filter::Equals(value))
    }

    /// Requests a strongly consistent read
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    /// Orders ascending by `attribute`
    pub fn order_by(self, attribute: impl Into<String>) -> Self {
        self.with_order(attribute, SortDirection::Asc)
    }

    /// Orders descending by `attribute`
    pub fn order_by_desc(self, attribute: impl Into<String>) -> Self {
        self.with_order(attribute, SortDirection::Desc)
    }

    fn with_order(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(OrderSpec {
            attribute: attribute.into(),
            direction,
        });
        self
    }

    /// Selects explicit attributes. Duplicates are dropped, first occurrence
    /// kept. Without this call every attribute is selected.
    pub fn select(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut selected: Vec<String> = Vec::new();
        for attribute in attributes {
            let attribute = attribute.into();
            if !selected.contains(&attribute) {
                selected.push(attribute);
            }
        }
        self.attributes = Some(selected);
        self
    }

    pub fn filter(&self, attribute: &str) -> Option<&Filter> {
        self.filters.get(attribute)
    }

    /// Filters ordered by attribute name
    pub fn filters(&self) -> &BTreeMap<String, Filter> {
        &self.filters
    }

    pub fn is_consistent_read(&self) -> bool {
        self.consistent_read
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    /// Explicitly selected attributes, `None` when all are requested
    pub fn selected_attributes(&self) -> Option<&[String]> {
        self.attributes.as_deref()
    }
}
