//! Placeholder statement builders for the chain's SQL engine.
//!
//! Every builder returns the statement text with `?` placeholders and the
//! arguments in placeholder order. Column maps are ordered so the same input
//! always yields the same statement.

use std::collections::BTreeMap;

use crate::chain::messages::{Argument, SqlValue};
use crate::error::{Error, Result};

/// Statement text plus its bound arguments
pub type Statement = (String, Vec<Argument>);

pub fn full_table_name(database: &str, table: &str) -> String {
    format!("{database}.{table}")
}

/// `INSERT INTO t (a,b) VALUES (?,?),(?,?)`
pub fn build_batch_insert<C: AsRef<str>>(
    table: &str,
    columns: &[C],
    rows: &[Vec<SqlValue>],
) -> Result<Statement> {
    if columns.is_empty() {
        return Err(Error::Validation("empty columns".into()));
    }
    let names: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    let placeholders = format!("(?{})", ",?".repeat(names.len() - 1));

    let mut sql = format!("INSERT INTO {} ({}) VALUES ", table, names.join(","));
    let mut arguments = Vec::with_capacity(names.len() * rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.len() != names.len() {
            return Err(Error::Validation(format!(
                "column values length not match with columns: row_index={} columns={:?}",
                i, names
            )));
        }
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(&placeholders);
        arguments.extend(row.iter().map(SqlValue::to_argument));
    }
    Ok((sql, arguments))
}

pub fn build_insert(table: &str, columns: &BTreeMap<String, SqlValue>) -> Result<Statement> {
    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    let row: Vec<SqlValue> = columns.values().cloned().collect();
    build_batch_insert(table, &names, &[row])
}

/// `UPDATE t SET a=?,b=? WHERE c=? and d=?`
pub fn build_update(
    table: &str,
    set: &BTreeMap<String, SqlValue>,
    where_equal: &BTreeMap<String, SqlValue>,
) -> Result<Statement> {
    if set.is_empty() {
        return Err(Error::Validation("update sets no columns".into()));
    }
    let mut arguments: Vec<Argument> = set.values().map(SqlValue::to_argument).collect();
    arguments.extend(where_equal.values().map(SqlValue::to_argument));

    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        table,
        assignments(set, ","),
        assignments(where_equal, " and ")
    );
    Ok((sql, arguments))
}

/// `DELETE FROM t WHERE a=? and b=? [ORDER BY x ASC|DESC] [LIMIT n]`
pub fn build_delete(
    table: &str,
    where_equal: &BTreeMap<String, SqlValue>,
    order_by: &str,
    asc: bool,
    limit: u64,
) -> Result<Statement> {
    let mut sql = format!("DELETE FROM {} WHERE {}", table, assignments(where_equal, " and "));
    if !order_by.is_empty() {
        let direction = if asc { "ASC" } else { "DESC" };
        sql.push_str(&format!(" ORDER BY {order_by} {direction}"));
    }
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    let arguments = where_equal.values().map(SqlValue::to_argument).collect();
    Ok((sql, arguments))
}

fn assignments(columns: &BTreeMap<String, SqlValue>, separator: &str) -> String {
    columns
        .keys()
        .map(|k| format!("{k}=?"))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::messages::ArgumentType;

    fn map(pairs: &[(&str, SqlValue)]) -> BTreeMap<String, SqlValue> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_batch_insert() {
        let rows = vec![
            vec![SqlValue::from("name1"), SqlValue::from(3)],
            vec![SqlValue::from("name2"), SqlValue::from(4)],
            vec![SqlValue::from("name3"), SqlValue::from(5)],
        ];
        let (sql, args) = build_batch_insert("demo.t", &["name", "age"], &rows).unwrap();
        assert_eq!(sql, "INSERT INTO demo.t (name,age) VALUES (?,?),(?,?),(?,?)");
        assert_eq!(args.len(), 6);
        assert_eq!(args[1].r#type, ArgumentType::Int as i32);
        assert_eq!(args[4].value, "name3");
    }

    #[test]
    fn test_batch_insert_rejects_bad_shapes() {
        let empty: [&str; 0] = [];
        assert!(matches!(build_batch_insert("t", &empty, &[]), Err(Error::Validation(_))));

        let rows = vec![vec![SqlValue::from(1)], vec![SqlValue::from(1), SqlValue::from(2)]];
        let err = build_batch_insert("t", &["a"], &rows).unwrap_err();
        assert!(err.to_string().contains("row_index=1"));
    }

    #[test]
    fn test_insert_is_ordered() {
        let (sql, args) = build_insert("db.t", &map(&[("name", "demo".into()), ("age", 18.into())])).unwrap();
        assert_eq!(sql, "INSERT INTO db.t (age,name) VALUES (?,?)");
        assert_eq!(args[0].value, "18");
        assert_eq!(args[1].value, "demo");
    }

    #[test]
    fn test_update() {
        let set = map(&[("name", "demo_name".into()), ("age", 18.into())]);
        let wh = map(&[("author", "james".into()), ("tag", "aaa".into())]);
        let (sql, args) = build_update("demo_table", &set, &wh).unwrap();
        assert_eq!(sql, "UPDATE demo_table SET age=?,name=? WHERE author=? and tag=?");
        let values: Vec<_> = args.iter().map(|a| a.value.as_str()).collect();
        assert_eq!(values, ["18", "demo_name", "james", "aaa"]);
    }

    #[test]
    fn test_delete_variants() {
        let wh = map(&[("id", 7u64.into())]);
        assert_eq!(build_delete("db.t", &wh, "", true, 0).unwrap().0, "DELETE FROM db.t WHERE id=?");
        assert_eq!(
            build_delete("db.t", &wh, "ts", false, 10).unwrap().0,
            "DELETE FROM db.t WHERE id=? ORDER BY ts DESC LIMIT 10"
        );
        assert_eq!(
            build_delete("db.t", &wh, "ts", true, 0).unwrap().0,
            "DELETE FROM db.t WHERE id=? ORDER BY ts ASC"
        );
    }

    #[test]
    fn test_full_table_name() {
        assert_eq!(full_table_name("library", "book"), "library.book");
    }
}
