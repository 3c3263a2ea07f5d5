use serde::Deserialize;
use tracing::debug;

use crate::auth::DepartmentKeywordMap;
use crate::domain::{Actor, Association, ContentKind, ContentQuery, Field, Predicate, Role};

/// Value of an enum-like filter that means "no constraint".
pub const ALL_SENTINEL: &str = "all";

/// Filters supplied by the caller of a listing, on top of role-derived visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingFilters {
    /// Free text, matched case-insensitively against the label, plus surname
    /// and department for representatives
    pub query: Option<String>,
    /// Case-insensitive department substring
    pub department: Option<String>,
    /// Exact category, `"all"` for any
    pub category: Option<String>,
    /// Exact electoral list name, `"all"` for any
    pub list_name: Option<String>,
    /// Exact association, `"all"` for any
    pub association: Option<String>,
}

/// Build the listing query an actor is entitled to run.
///
/// A network admin sees their own association plus the central one. When
/// their association has department keywords and the content kind carries a
/// department, the department must ALSO match a keyword. Note this is an AND,
/// unlike the OR used by [`can_mutate`](crate::auth::can_mutate).
///
/// Any other actor, or none, gets no role-derived condition. Explicit filters
/// are always ANDed on top. Results are ordered by label, then id.
pub fn build_visibility_filter(
    actor: Option<&Actor>,
    filters: &ListingFilters,
    kind: ContentKind,
    keywords: &DepartmentKeywordMap,
) -> ContentQuery {
    let mut terms = vec![role_condition(actor, kind, keywords)];

    if let Some(query) = text_filter(&filters.query) {
        let label = std::iter::once(kind.label_field());
        terms.push(Predicate::any(
            label
                .chain(kind.search_fields().iter().copied())
                .map(|field| Predicate::ContainsCi(field, query.to_string())),
        ));
    }

    if kind.has_department() {
        if let Some(department) = text_filter(&filters.department) {
            terms.push(Predicate::ContainsCi(
                Field::Department,
                department.to_string(),
            ));
        }
    }

    if kind.has_category() {
        if let Some(category) = enum_filter(&filters.category) {
            terms.push(Predicate::Eq(Field::Category, category.to_ascii_uppercase()));
        }
        if let Some(list_name) = enum_filter(&filters.list_name) {
            terms.push(Predicate::Eq(Field::ListName, list_name.to_string()));
        }
    }

    if let Some(association) = enum_filter(&filters.association) {
        terms.push(Predicate::Eq(
            Field::Association,
            association.to_ascii_uppercase(),
        ));
    }

    ContentQuery::new(Predicate::all(terms), kind.label_field())
}

/// Public listings: published items only, explicit filters applied.
pub fn build_public_filter(filters: &ListingFilters, kind: ContentKind) -> ContentQuery {
    let query = build_visibility_filter(None, filters, kind, &DepartmentKeywordMap::new());
    let predicate = match kind {
        ContentKind::Representative => query.predicate,
        ContentKind::Convention | ContentKind::Event | ContentKind::News => query
            .predicate
            .and(Predicate::Eq(Field::Published, "true".to_string())),
    };
    ContentQuery::new(predicate, query.order_by)
}

fn role_condition(
    actor: Option<&Actor>,
    kind: ContentKind,
    keywords: &DepartmentKeywordMap,
) -> Predicate {
    let Some(actor) = actor.filter(|a| a.role == Role::AdminNetwork) else {
        return Predicate::True;
    };

    let mut visible = Vec::with_capacity(2);
    if let Some(own) = actor.association.filter(|a| !a.is_central()) {
        visible.push(own.as_str().to_string());
    }
    visible.push(Association::MorganaOrum.as_str().to_string());
    let membership = Predicate::In(Field::Association, visible);

    let Some(own) = actor
        .association
        .filter(|own| kind.has_department() && keywords.has_keywords(*own))
    else {
        return membership;
    };

    debug!(
        kind = kind.as_str(),
        association = own.as_str(),
        "narrowing listing to department keywords"
    );
    membership.and(Predicate::any(keywords.keywords_for(own).iter().map(
        |keyword| Predicate::ContainsCi(Field::Department, keyword.clone()),
    )))
}

fn text_filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn enum_filter(value: &Option<String>) -> Option<&str> {
    text_filter(value).filter(|v| !v.eq_ignore_ascii_case(ALL_SENTINEL))
}
