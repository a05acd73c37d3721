use playbook_core::{GameLogFilter, PlayerId};
use sqlx::{Postgres, postgres::PgArguments, query::QueryScalar};

pub(crate) const UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FilterValue {
    Int(i32),
    Text(&'static str),
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn game_log_table_name(owner: &str) -> String {
    format!("{}_game_logs", owner)
}

/// `%`, `_` and the escape character itself lose their pattern meaning.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `WHERE` clause with `$n` placeholders, always in season, week, opponent order.
pub(crate) fn filter_clause(filter: &GameLogFilter) -> (String, Vec<FilterValue>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();
    if let Some(season) = filter.season {
        values.push(FilterValue::Int(season));
        conditions.push(format!("season = ${}", values.len()));
    }
    if let Some(week) = filter.week {
        values.push(FilterValue::Int(week));
        conditions.push(format!("week = ${}", values.len()));
    }
    if let Some(opponent) = filter.opponent {
        values.push(FilterValue::Text(opponent.as_str()));
        conditions.push(format!("opponent_team = ${}", values.len()));
    }
    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn column_expr(column: &str) -> String {
    let offensive = |keys: &[&str]| {
        let pairs: Vec<String> = keys
            .iter()
            .map(|key| format!("'{}', offensive_stats->>'{}'", key, key))
            .collect();
        format!("json_build_object({})", pairs.join(", "))
    };
    match column {
        "aggregated_passing_stats" => {
            offensive(&["completions", "attempts", "passing_yards", "passing_tds"])
        }
        "aggregated_rushing_stats" => offensive(&["carries", "rushing_yards", "rushing_tds"]),
        other => quote_ident(other),
    }
}

/// One JSON object per game-log row, keyed by the requested column names.
pub(crate) fn game_log_query(
    owner: &str,
    columns: &[&str],
    filter: &GameLogFilter,
) -> (String, Vec<FilterValue>) {
    let fields: Vec<String> = columns
        .iter()
        .map(|c| format!("'{}', {}", c, column_expr(c)))
        .collect();
    let (clause, values) = filter_clause(filter);
    let sql = format!(
        "SELECT json_build_object({}) FROM {}{} ORDER BY season, week",
        fields.join(", "),
        quote_ident(&game_log_table_name(owner)),
        clause
    );
    (sql, values)
}

/// One `UNION ALL` arm per player, each yielding the player id when a matching row exists.
pub(crate) fn matching_players_query(
    ids: &[&PlayerId],
    filter: &GameLogFilter,
) -> (String, Vec<FilterValue>) {
    let (clause, values) = filter_clause(filter);
    let arms: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                "(SELECT {} AS id FROM {}{} LIMIT 1)",
                quote_literal(id.as_str()),
                quote_ident(&game_log_table_name(id.as_str())),
                clause
            )
        })
        .collect();
    (arms.join(" UNION ALL "), values)
}

pub(crate) fn bind_filter<'q, O>(
    mut query: QueryScalar<'q, Postgres, O, PgArguments>,
    values: Vec<FilterValue>,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            FilterValue::Int(v) => query.bind(v),
            FilterValue::Text(v) => query.bind(v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use playbook_core::TeamCode;

    use super::*;

    fn filter(season: Option<i32>, week: Option<i32>, opponent: Option<&str>) -> GameLogFilter {
        GameLogFilter {
            season,
            week,
            opponent: opponent.and_then(TeamCode::parse),
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("00-0019596_game_logs"), "\"00-0019596_game_logs\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_filter_clause_order() {
        let (clause, values) = filter_clause(&filter(Some(2023), Some(4), Some("kc")));
        assert_eq!(clause, " WHERE season = $1 AND week = $2 AND opponent_team = $3");
        assert_eq!(
            values,
            vec![
                FilterValue::Int(2023),
                FilterValue::Int(4),
                FilterValue::Text("KC")
            ]
        );

        let (clause, values) = filter_clause(&filter(None, Some(4), Some("NE")));
        assert_eq!(clause, " WHERE week = $1 AND opponent_team = $2");
        assert_eq!(values.len(), 2);

        let (clause, values) = filter_clause(&GameLogFilter::default());
        assert_eq!(clause, "");
        assert!(values.is_empty());
    }

    #[test]
    fn test_game_log_query() {
        let (sql, values) = game_log_query(
            "00-0019596",
            &["passing_stats", "week"],
            &filter(Some(2022), None, None),
        );
        assert_eq!(
            sql,
            "SELECT json_build_object('passing_stats', \"passing_stats\", 'week', \"week\") \
             FROM \"00-0019596_game_logs\" WHERE season = $1 ORDER BY season, week"
        );
        assert_eq!(values, vec![FilterValue::Int(2022)]);
    }

    #[test]
    fn test_aggregated_columns() {
        let (sql, _) = game_log_query("KC", &["aggregated_rushing_stats"], &GameLogFilter::default());
        assert!(sql.contains(
            "'aggregated_rushing_stats', json_build_object('carries', offensive_stats->>'carries', \
             'rushing_yards', offensive_stats->>'rushing_yards', 'rushing_tds', offensive_stats->>'rushing_tds')"
        ));
        assert!(sql.contains("FROM \"KC_game_logs\""));
    }

    #[test]
    fn test_matching_players_query() {
        let a = PlayerId::from_canonical("00-0030506").unwrap();
        let b = PlayerId::from_canonical("00-0036212").unwrap();
        let (sql, values) = matching_players_query(&[&a, &b], &filter(None, Some(1), None));
        assert_eq!(
            sql,
            "(SELECT '00-0030506' AS id FROM \"00-0030506_game_logs\" WHERE week = $1 LIMIT 1) \
             UNION ALL \
             (SELECT '00-0036212' AS id FROM \"00-0036212_game_logs\" WHERE week = $1 LIMIT 1)"
        );
        assert_eq!(values, vec![FilterValue::Int(1)]);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("Kelce"), "Kelce");
    }
}
