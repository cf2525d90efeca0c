//! # Query and Page Types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bound for records carried through the resolver.
pub trait Record: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Record for T {}

/// Attribute predicate understood by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// `field == value`
    Equals {
        /// Attribute name
        field: String,
        /// Expected value
        value: String,
    },
    /// `field` is one of `values`
    OneOf {
        /// Attribute name
        field: String,
        /// Accepted values
        values: Vec<String>,
    },
    /// Numeric `field` strictly greater than `value`
    After {
        /// Attribute name
        field: String,
        /// Exclusive lower bound
        value: u64,
    },
}

impl Predicate {
    /// Equality predicate.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluate against a record's attributes. A missing attribute never matches.
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals { field, value } => attributes.get(field) == Some(value),
            Self::OneOf { field, values } => attributes
                .get(field)
                .is_some_and(|actual| values.contains(actual)),
            Self::After { field, value } => attributes
                .get(field)
                .and_then(|actual| actual.parse::<u64>().ok())
                .is_some_and(|actual| actual > *value),
        }
    }
}

/// Filters of a query: an optional explicit target set plus predicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Explicit keys to list. `None` lets the indexer discover them.
    pub targets: Option<Vec<String>>,
    /// Attribute predicates, all of which must hold.
    pub predicates: Vec<Predicate>,
}

impl QueryFilters {
    /// Filters restricted to `targets`.
    pub fn for_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: Some(targets.into_iter().map(Into::into).collect()),
            predicates: Vec::new(),
        }
    }

    /// Add a predicate. Builder style.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Whether every predicate holds for `attributes`.
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        self.predicates.iter().all(|p| p.matches(attributes))
    }
}

/// A paginated query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Query filters
    pub filters: QueryFilters,
    /// Page size; `None` uses the configured default
    pub size: Option<usize>,
    /// Offset into the sorted key list
    pub start: usize,
}

impl QueryDescriptor {
    /// First page of `filters`.
    pub fn new(filters: QueryFilters) -> Self {
        Self {
            filters,
            size: None,
            start: 0,
        }
    }

    /// Set the page size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the start offset.
    pub fn starting_at(mut self, start: usize) -> Self {
        self.start = start;
        self
    }
}

/// One page of results.
///
/// `next` is `None` when the page reaches `count`, or when the source
/// returns everything at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    /// Page items
    pub data: Vec<T>,
    /// Offset of the next page
    pub next: Option<usize>,
    /// Total number of items across all pages
    pub count: usize,
}

impl<T> ResultPage<T> {
    /// Page with no items.
    pub fn empty(count: usize) -> Self {
        Self {
            data: Vec::new(),
            next: None,
            count,
        }
    }
}

/// Records sharing one grouping key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGroup<T> {
    /// Grouping key
    pub key: String,
    /// Records under the key, in backend order
    pub items: Vec<T>,
}

/// A record as stored by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedRow<T> {
    /// Grouping key
    pub key: String,
    /// Filterable attributes
    pub attributes: BTreeMap<String, String>,
    /// Record payload
    pub value: T,
}

impl<T> IndexedRow<T> {
    /// Row without attributes.
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            attributes: BTreeMap::new(),
            value,
        }
    }

    /// Add an attribute. Builder style.
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(field.into(), value.into());
        self
    }
}
