use std::borrow::Cow;
use std::cmp::Ordering;

/// Columns a listing predicate can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Surname,
    Title,
    Email,
    Department,
    Association,
    Category,
    ListName,
    Published,
}

/// Filter predicate shared by the SQL renderer and in-memory evaluation.
///
/// Text comparisons against a missing (null) field never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    True,
    False,
    Eq(Field, String),
    In(Field, Vec<String>),
    /// Case-insensitive substring match.
    ContainsCi(Field, String),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction that drops `True` terms and collapses on `False`.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut terms = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::True => {}
                Predicate::False => return Predicate::False,
                Predicate::All(inner) => terms.extend(inner),
                other => terms.push(other),
            }
        }
        match terms.len() {
            0 => Predicate::True,
            1 => terms.remove(0),
            _ => Predicate::All(terms),
        }
    }

    /// Disjunction that drops `False` terms and collapses on `True`.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut terms = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::False => {}
                Predicate::True => return Predicate::True,
                Predicate::Any(inner) => terms.extend(inner),
                other => terms.push(other),
            }
        }
        match terms.len() {
            0 => Predicate::False,
            1 => terms.remove(0),
            _ => Predicate::Any(terms),
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::all([self, other])
    }

    pub fn matches<R: Filterable + ?Sized>(&self, record: &R) -> bool {
        match self {
            Predicate::True => true,
            Predicate::False => false,
            Predicate::Eq(field, value) => record
                .field_value(*field)
                .is_some_and(|actual| actual == value.as_str()),
            Predicate::In(field, values) => record
                .field_value(*field)
                .is_some_and(|actual| values.iter().any(|v| v.as_str() == actual)),
            Predicate::ContainsCi(field, needle) => record
                .field_value(*field)
                .is_some_and(|actual| contains_ci(&actual, needle)),
            Predicate::All(terms) => terms.iter().all(|term| term.matches(record)),
            Predicate::Any(terms) => terms.iter().any(|term| term.matches(record)),
        }
    }
}

/// Case-insensitive substring test used by every free-text match.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Records that can be evaluated against a [`Predicate`].
pub trait Filterable {
    /// Text value of a field, `None` when null or not carried by the record.
    fn field_value(&self, field: Field) -> Option<Cow<'_, str>>;
}

/// A listing query: what to keep and how to order it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub predicate: Predicate,
    /// Primary sort key, ascending and case-insensitive. Ties break on id.
    pub order_by: Field,
}

impl ContentQuery {
    pub fn new(predicate: Predicate, order_by: Field) -> Self {
        Self {
            predicate,
            order_by,
        }
    }

    /// Evaluate the query against records already in memory.
    pub fn apply<R: Filterable + Clone>(&self, records: &[R]) -> Vec<R> {
        let mut kept: Vec<R> = records
            .iter()
            .filter(|record| self.predicate.matches(*record))
            .cloned()
            .collect();
        kept.sort_by(|a, b| self.compare(a, b));
        kept
    }

    /// Lowercased sort key first (missing values lead), then id.
    fn compare<R: Filterable>(&self, a: &R, b: &R) -> Ordering {
        let key = |record: &R| {
            record
                .field_value(self.order_by)
                .map(|value| value.to_lowercase())
        };
        key(a)
            .cmp(&key(b))
            .then_with(|| a.field_value(Field::Id).cmp(&b.field_value(Field::Id)))
    }
}
