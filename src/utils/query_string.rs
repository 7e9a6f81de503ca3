//! Builder for `query_string(?)` full-text statements.

use crate::chain::messages::{Argument, SqlValue};

const RESERVED: &[char] = &[
    '+', '-', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '~', '*', '?', ':',
    '\\', '/', ' ', '"',
];

/// Accumulates clauses that are joined with a space into one query string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryString {
    clauses: Vec<String>,
    database: String,
    table: String,
    fields: String,
    highlight: String,
    limit: u64,
    offset: u64,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a table and field list; `limit == 0` leaves the limit clause off
    pub fn select(
        database: impl Into<String>,
        table: impl Into<String>,
        fields: impl Into<String>,
        limit: u64,
        offset: u64,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            fields: fields.into(),
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn query_string(&self) -> String {
        self.clauses.join(" ")
    }

    pub fn add(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn add_match(&mut self, field: &str, query: &str, boost: f64) -> &mut Self {
        self.add(match_query(field, query, boost))
    }

    pub fn add_match_phrase(&mut self, field: &str, query: &str, boost: f64) -> &mut Self {
        self.add(match_phrase_query(field, query, boost))
    }

    pub fn add_regexp(&mut self, field: &str, query: &str, boost: f64) -> &mut Self {
        self.add(regexp_query(field, query, boost))
    }

    pub fn add_numeric_range(&mut self, field: &str, operator: &str, value: i64, boost: f64) -> &mut Self {
        self.add(numeric_range_query(field, operator, value, boost))
    }

    pub fn add_date_range(&mut self, field: &str, operator: &str, value: &str, boost: f64) -> &mut Self {
        self.add(date_range_query(field, operator, value, boost))
    }

    pub fn add_highlight<S: AsRef<str>>(&mut self, fields: &[S]) -> &mut Self {
        self.highlight = highlight_hint(fields);
        self
    }

    /// The statement and its single STRING argument
    pub fn build(&self) -> (String, Vec<Argument>) {
        let mut sql = format!(
            "select {} {} from {}.{} where query_string(?)",
            self.highlight, self.fields, self.database, self.table
        );
        if self.limit > 0 {
            sql.push_str(&format!(" limit {}, {}", self.offset, self.limit));
        }
        (sql, vec![Argument::string(self.query_string())])
    }

    /// Pass a hand-written statement through with converted arguments
    pub fn row(sql: impl Into<String>, args: &[SqlValue]) -> (String, Vec<Argument>) {
        (sql.into(), args.iter().map(SqlValue::to_argument).collect())
    }
}

pub fn highlight_hint<S: AsRef<str>>(fields: &[S]) -> String {
    let quoted: Vec<String> = fields.iter().map(|f| format!("\"{}\"", f.as_ref())).collect();
    format!(
        r#"/*+ SET_VAR(full_text_option='{{"highlight":{{ "style":"html","fields":[{}]}}}}')*/"#,
        quoted.join(",")
    )
}

/// Escape every query-syntax character with a backslash
pub fn escape(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn match_query(field: &str, query: &str, boost: f64) -> String {
    format!("{}:{}^{:.6}", field, escape(query), boost)
}

pub fn match_phrase_query(field: &str, query: &str, boost: f64) -> String {
    format!("{field}:\"{query}\"^{boost:.6}")
}

pub fn regexp_query(field: &str, query: &str, boost: f64) -> String {
    format!("{field}:/{query}/^{boost:.6}")
}

pub fn numeric_range_query(field: &str, operator: &str, value: i64, boost: f64) -> String {
    format!("{field}:{operator}{value}^{boost:.6}")
}

pub fn date_range_query(field: &str, operator: &str, value: &str, boost: f64) -> String {
    format!("{field}:{operator}\"{value}\"^{boost:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::messages::ArgumentType;

    #[test]
    fn test_match_query_escapes() {
        assert_eq!(match_query("title", "aa+bb", 1.0), r"title:aa\+bb^1.000000");
        assert_eq!(match_query("title", r"aa\bb", 1.0), r"title:aa\\bb^1.000000");
        assert_eq!(match_query("title", "aa bb", 0.5), r"title:aa\ bb^0.500000");
        assert_eq!(match_query("title", "aa\"bb", 1.0), r#"title:aa\"bb^1.000000"#);
        assert_eq!(match_query("title", "aa'bb", 1.0), "title:aa'bb^1.000000");
        assert_eq!(match_query("title", "a/b^c", 1.0), r"title:a\/b\^c^1.000000");
    }

    #[test]
    fn test_other_clauses() {
        assert_eq!(match_phrase_query("title", "aaa+bbb", 0.1), "title:\"aaa+bbb\"^0.100000");
        assert_eq!(regexp_query("title", "aaa+bbb", 1.0), "title:/aaa+bbb/^1.000000");
        assert_eq!(numeric_range_query("year", ">=", 2001, 1.0), "year:>=2001^1.000000");
        assert_eq!(date_range_query("ts", "<", "2023-01-01", 2.0), "ts:<\"2023-01-01\"^2.000000");
    }

    #[test]
    fn test_build_with_highlight() {
        let mut qs = QueryString::select("library", "ebook", "_score,title,author", 0, 0);
        qs.add_match("title", "harry", 0.7)
            .add_match_phrase("title", "harry potter", 0.8)
            .add_highlight(&["title", "author"]);
        let (sql, args) = qs.build();
        assert_eq!(
            sql,
            r#"select /*+ SET_VAR(full_text_option='{"highlight":{ "style":"html","fields":["title","author"]}}')*/ _score,title,author from library.ebook where query_string(?)"#
        );
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].r#type, ArgumentType::String as i32);
        assert_eq!(args[0].value, "title:harry^0.700000 title:\"harry potter\"^0.800000");
    }

    #[test]
    fn test_build_with_limit() {
        let mut qs = QueryString::select("db", "t", "*", 10, 20);
        qs.add("title:x");
        let (sql, _) = qs.build();
        assert_eq!(sql, "select  * from db.t where query_string(?) limit 20, 10");
    }

    #[test]
    fn test_row_passthrough() {
        let (sql, args) = QueryString::row("select * from db.t where id = ?", &[SqlValue::from(5)]);
        assert_eq!(sql, "select * from db.t where id = ?");
        assert_eq!(args[0].value, "5");
    }
}
