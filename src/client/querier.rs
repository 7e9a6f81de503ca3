//! Read side of the SQL index: queries and catalog listings over REST.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::endpoint::RestEndpoint;
use super::lcd::LcdClient;
use super::scan::{scan_result_set, ScanMode, Scannable};
use crate::chain::messages::Argument;
use crate::error::{Result, ScanError};
use crate::utils::num::i64_from_any;

const SQL_QUERY_PATH: &str = "/blockved/glitterchain/index/sql/query";
const LIST_TABLES_PATH: &str = "/blockved/glitterchain/index/sql/list_tables";
const LIST_DATABASES_PATH: &str = "/blockved/glitterchain/index/sql/list_databases";
const SHOW_CREATE_TABLE_PATH: &str = "/blockved/glitterchain/index/sql/show_create_table";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(default)]
    pub column_name: String,
    #[serde(default)]
    pub column_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub column_defs: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<RowData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlQueryResponse {
    #[serde(default)]
    pub results: Vec<ResultSet>,
}

#[derive(Serialize)]
struct SqlQueryRequest<'a> {
    sql: &'a str,
    arguments: &'a [Argument],
}

/// Unknown fields are kept in `extra`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub create_time: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListDatabasesResponse {
    #[serde(default)]
    pub databases: Vec<DatabaseInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub create_time: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTablesResponse {
    #[serde(default)]
    pub tables: Vec<TableInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowCreateTableResponse {
    #[serde(default)]
    pub schema: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for [`LcdClient::list_tables`]; empty fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTablesFilter {
    pub keyword: String,
    pub uid: String,
    pub database: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListTablesFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        for (key, value) in [("keyword", &self.keyword), ("uid", &self.uid), ("database", &self.database)] {
            if !value.is_empty() {
                query.push((key, value.clone()));
            }
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            query.push(("page_size", page_size.to_string()));
        }
        query
    }
}

fn filter_by_creator(response: &mut ListDatabasesResponse, creator: &str) {
    if !creator.is_empty() {
        response.databases.retain(|db| db.creator == creator);
    }
}

impl LcdClient<RestEndpoint> {
    /// Run a read-only statement
    pub async fn query(&self, sql: &str, arguments: &[Argument]) -> Result<SqlQueryResponse> {
        log::debug!("sql query: {}", sql);
        self.endpoint()
            .post_json(SQL_QUERY_PATH, &SqlQueryRequest { sql, arguments })
            .await
    }

    /// Run a statement and bind the first result set to `T`
    pub async fn query_scan<T: Scannable>(
        &self,
        sql: &str,
        arguments: &[Argument],
        mode: ScanMode,
    ) -> Result<Vec<T>> {
        let response = self.query(sql, arguments).await?;
        let first = response.results.first().ok_or(ScanError::NoResultSet)?;
        Ok(scan_result_set(first, mode)?)
    }

    pub async fn list_tables(&self, filter: &ListTablesFilter) -> Result<ListTablesResponse> {
        self.endpoint().get_json(LIST_TABLES_PATH, &filter.to_query()).await
    }

    /// All databases, or only those created by `creator` when it is non-empty
    pub async fn list_databases(&self, creator: &str) -> Result<ListDatabasesResponse> {
        let mut response = self.endpoint().get_json(LIST_DATABASES_PATH, &[]).await?;
        filter_by_creator(&mut response, creator);
        Ok(response)
    }

    pub async fn show_create_table(&self, database: &str, table: &str) -> Result<ShowCreateTableResponse> {
        let query = [("databaseName", database.to_string()), ("tableName", table.to_string())];
        self.endpoint().get_json(SHOW_CREATE_TABLE_PATH, &query).await
    }
}
