use tokio_postgres::types::ToSql;

use crate::domain::{ContentQuery, Field, Predicate};

/// Maps listing fields to the columns of one table. `None` means the table
/// has no such column, which renders as a condition that never matches.
pub type ColumnMap = fn(Field) -> Option<&'static str>;

/// WHERE and ORDER BY fragments with their positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub where_clause: String,
    pub order_clause: String,
    pub params: Vec<String>,
}

impl SqlFilter {
    /// Parameters in the shape `tokio_postgres` query methods take
    pub fn param_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// `SELECT {columns} FROM {table} WHERE ... ORDER BY ...`
    pub fn select(&self, columns: &str, table: &str) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            columns, table, self.where_clause, self.order_clause
        )
    }
}

/// Render a listing query to SQL for the table described by `columns`.
pub fn render_query(query: &ContentQuery, columns: ColumnMap) -> SqlFilter {
    let mut params = Vec::new();
    let where_clause = render_predicate(&query.predicate, columns, &mut params);

    let id = columns(Field::Id).unwrap_or("id");
    // Byte order on the lowercased key, same as ContentQuery::apply
    let order_clause = match columns(query.order_by) {
        Some(column) if column != id => format!(
            "LOWER({}) COLLATE \"C\" ASC NULLS FIRST, {} COLLATE \"C\" ASC",
            column, id
        ),
        _ => format!("{} COLLATE \"C\" ASC", id),
    };

    SqlFilter {
        where_clause,
        order_clause,
        params,
    }
}

fn render_predicate(predicate: &Predicate, columns: ColumnMap, params: &mut Vec<String>) -> String {
    match predicate {
        Predicate::True => "TRUE".to_string(),
        Predicate::False => "FALSE".to_string(),
        Predicate::Eq(field, value) => match (field, columns(*field)) {
            (_, None) => "FALSE".to_string(),
            (Field::Published, Some(column)) => boolean_test(column, value),
            (_, Some(column)) => format!("{} = {}", column, bind(params, value.clone())),
        },
        Predicate::In(field, values) => match (field, columns(*field)) {
            (_, None) => "FALSE".to_string(),
            _ if values.is_empty() => "FALSE".to_string(),
            (Field::Published, Some(column)) => group(
                values.iter().map(|v| boolean_test(column, v)).collect(),
                " OR ",
            ),
            (_, Some(column)) => {
                let placeholders: Vec<String> =
                    values.iter().map(|v| bind(params, v.clone())).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
        },
        Predicate::ContainsCi(field, needle) => match columns(*field) {
            None => "FALSE".to_string(),
            Some(column) => format!(
                "{} ILIKE {}",
                column,
                bind(params, format!("%{}%", escape_like(needle)))
            ),
        },
        Predicate::All(terms) => group(
            terms
                .iter()
                .map(|t| render_predicate(t, columns, params))
                .collect(),
            " AND ",
        ),
        Predicate::Any(terms) => group(
            terms
                .iter()
                .map(|t| render_predicate(t, columns, params))
                .collect(),
            " OR ",
        ),
    }
}

fn bind(params: &mut Vec<String>, value: String) -> String {
    params.push(value);
    format!("${}", params.len())
}

fn boolean_test(column: &str, value: &str) -> String {
    if value.eq_ignore_ascii_case("true") {
        format!("{} IS TRUE", column)
    } else {
        format!("{} IS FALSE", column)
    }
}

fn group(parts: Vec<String>, separator: &str) -> String {
    format!("({})", parts.join(separator))
}

/// Escape LIKE wildcards so user text matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn representative_columns(field: Field) -> Option<&'static str> {
        match field {
            Field::Id => Some("id"),
            Field::Name => Some("name"),
            Field::Surname => Some("surname"),
            Field::Department => Some("department"),
            Field::Association => Some("association"),
            Field::Category => Some("category"),
            Field::ListName => Some("list_name"),
            Field::Email => Some("email"),
            Field::Title | Field::Published => None,
        }
    }

    fn news_columns(field: Field) -> Option<&'static str> {
        match field {
            Field::Id => Some("id"),
            Field::Title => Some("title"),
            Field::Association => Some("association"),
            Field::Published => Some("published"),
            _ => None,
        }
    }

    #[test]
    fn test_network_admin_query_renders_membership_and_keywords() {
        let predicate = Predicate::In(
            Field::Association,
            vec!["UNIMHEALTH".to_string(), "MORGANA_ORUM".to_string()],
        )
        .and(Predicate::any([
            Predicate::ContainsCi(Field::Department, "patologia".to_string()),
            Predicate::ContainsCi(Field::Department, "dimed".to_string()),
        ]));
        let sql = render_query(
            &ContentQuery::new(predicate, Field::Name),
            representative_columns,
        );

        assert_eq!(
            sql.where_clause,
            "(association IN ($1, $2) AND (department ILIKE $3 OR department ILIKE $4))"
        );
        assert_eq!(
            sql.params,
            vec!["UNIMHEALTH", "MORGANA_ORUM", "%patologia%", "%dimed%"]
        );
        assert_eq!(
            sql.order_clause,
            r#"LOWER(name) COLLATE "C" ASC NULLS FIRST, id COLLATE "C" ASC"#
        );
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        let sql = render_query(
            &ContentQuery::new(
                Predicate::ContainsCi(Field::Name, "50%_off\\".to_string()),
                Field::Name,
            ),
            representative_columns,
        );
        assert_eq!(sql.params, vec!["%50\\%\\_off\\\\%"]);
    }

    #[test]
    fn test_published_renders_as_boolean_test() {
        let sql = render_query(
            &ContentQuery::new(
                Predicate::Eq(Field::Published, "true".to_string()),
                Field::Title,
            ),
            news_columns,
        );
        assert_eq!(sql.where_clause, "published IS TRUE");
        assert!(sql.params.is_empty());
        assert_eq!(
            sql.select("id, title", "news"),
            r#"SELECT id, title FROM news WHERE published IS TRUE ORDER BY LOWER(title) COLLATE "C" ASC NULLS FIRST, id COLLATE "C" ASC"#
        );
    }

    #[test]
    fn test_unknown_column_never_matches() {
        let sql = render_query(
            &ContentQuery::new(
                Predicate::ContainsCi(Field::Department, "dicam".to_string()),
                Field::Title,
            ),
            news_columns,
        );
        assert_eq!(sql.where_clause, "FALSE");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn test_trivial_predicates() {
        let sql = render_query(
            &ContentQuery::new(Predicate::True, Field::Id),
            representative_columns,
        );
        assert_eq!(sql.where_clause, "TRUE");
        assert_eq!(sql.order_clause, r#"id COLLATE "C" ASC"#);

        let sql = render_query(
            &ContentQuery::new(Predicate::In(Field::Association, vec![]), Field::Name),
            representative_columns,
        );
        assert_eq!(sql.where_clause, "FALSE");
    }
}
