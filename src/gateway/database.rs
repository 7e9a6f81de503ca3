use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GatewayClient;
use crate::error::{Error, Result};

const URL_GET_DOCS: &str = "/v1/get_docs";
const URL_SEARCH: &str = "/v1/search";
const URL_PUT_DOC: &str = "/v1/put_doc";
const URL_LIST_SCHEMA: &str = "/v1/list_schema";
const URL_CREATE_SCHEMA: &str = "/v1/create_schema";
const URL_GET_SCHEMA: &str = "/v1/get_schema";

/// A search filter, also used for the facet buckets of a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub from: f64,
    #[serde(default)]
    pub to: f64,
    #[serde(default)]
    pub doc_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub current_page: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub total_results: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub sorted_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub page: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SortedByField {
    #[serde(default)]
    pub field: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub search_time: i64,
    #[serde(default)]
    pub index: String,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub sorted_by_field: Vec<SortedByField>,
    #[serde(default)]
    pub facet: HashMap<String, Vec<Filter>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GetDocsResult {
    #[serde(default)]
    pub total: i64,
    #[serde(rename = "hits", default)]
    pub documents: HashMap<String, Value>,
}

/// Conditions for [`Database::search`], built by chaining
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchCond {
    #[serde(rename = "index")]
    schema: String,
    query: String,
    filters: Vec<Filter>,
    #[serde(rename = "query_field")]
    selects: Vec<String>,
    #[serde(rename = "aggs_field")]
    aggs_fields: Vec<String>,
    order_by: String,
    limit: u32,
    page: u32,
}

impl SearchCond {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selects = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = expr.into();
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.limit = n;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn aggregate_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggs_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Serialize)]
struct CreateSchemaBody<'a> {
    schema_name: &'a str,
    data: Value,
}

#[derive(Serialize)]
struct PutDocRequest<'a, D: Serialize> {
    schema_name: &'a str,
    doc_data: &'a D,
}

#[derive(Serialize)]
struct GetDocsRequest<'a> {
    schema_name: &'a str,
    doc_ids: &'a [String],
}

/// Schema and document operations
pub struct Database<'a> {
    client: &'a GatewayClient,
}

fn payload_text(data: Value) -> String {
    match data {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl<'a> Database<'a> {
    pub(crate) fn new(client: &'a GatewayClient) -> Self {
        Self { client }
    }

    /// Returns the hash of the transaction that created the schema
    pub async fn create_schema(&self, schema_name: &str, schema: &str) -> Result<String> {
        let data: Value = serde_json::from_str(schema)
            .map_err(|e| Error::InvalidArgument(format!("schema is not valid JSON: {e}")))?;
        let response = self
            .client
            .post(URL_CREATE_SCHEMA, &CreateSchemaBody { schema_name, data })
            .await?;
        Ok(response.tx.unwrap_or_default())
    }

    pub async fn get_schema(&self, schema_name: &str) -> Result<String> {
        let response = self
            .client
            .get(URL_GET_SCHEMA, &[("schema_name", schema_name.to_string())])
            .await?;
        Ok(payload_text(response.data))
    }

    pub async fn list_schema(&self) -> Result<String> {
        let response = self.client.get(URL_LIST_SCHEMA, &[]).await?;
        Ok(payload_text(response.data))
    }

    /// Returns the hash of the transaction that stored the document
    pub async fn put_doc<D: Serialize>(&self, schema_name: &str, document: &D) -> Result<String> {
        let response = self
            .client
            .post(URL_PUT_DOC, &PutDocRequest { schema_name, doc_data: document })
            .await?;
        Ok(response.tx.unwrap_or_default())
    }

    pub async fn get_docs(&self, schema_name: &str, doc_ids: &[String]) -> Result<GetDocsResult> {
        let response = self
            .client
            .post(URL_GET_DOCS, &GetDocsRequest { schema_name, doc_ids })
            .await?;
        Ok(serde_json::from_value(response.data)?)
    }

    pub async fn search(&self, cond: &SearchCond) -> Result<SearchResult> {
        let response = self.client.post(URL_SEARCH, cond).await?;
        Ok(serde_json::from_value(response.data)?)
    }
}
