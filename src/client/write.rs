//! Write side: each operation is one single-message transaction.

use std::collections::BTreeMap;

use super::endpoint::{TxEndpoint, TxResponse};
use super::lcd::{CreateTxOptions, LcdClient};
use crate::chain::messages::{
    Argument, CreateDatasetRequest, EditDatasetRequest, EditTableRequest, PledgeRequest,
    ReleasePledgeRequest, RenewalDatasetRequest, ServiceStatus, SqlExecRequest, SqlGrantRequest,
    SqlValue, TxMessage,
};
use crate::chain::tx_builder::SignMode;
use crate::error::Result;
use crate::utils::sql::{build_batch_insert, build_delete, build_insert, build_update, full_table_name};

/// Access level granted on a database or table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantRole {
    /// insert / update / delete
    Writer,
    /// select
    Reader,
    Admin,
}

impl GrantRole {
    pub fn as_str(self) -> &'static str {
        match self {
            GrantRole::Writer => "writer",
            GrantRole::Reader => "reader",
            GrantRole::Admin => "admin",
        }
    }
}

impl<E: TxEndpoint> LcdClient<E> {
    pub async fn sql_exec_with_options(
        &self,
        mut options: CreateTxOptions,
        sql: &str,
        arguments: Vec<Argument>,
    ) -> Result<TxResponse> {
        let msg = SqlExecRequest {
            uid: self.address().to_string(),
            sql: sql.to_string(),
            arguments,
        };
        options.msgs = vec![msg.to_any()];
        self.sign_and_broadcast_tx(options).await
    }

    pub async fn sql_exec(&self, sql: &str, arguments: Vec<Argument>) -> Result<TxResponse> {
        let options = CreateTxOptions {
            sign_mode: SignMode::Direct,
            ..CreateTxOptions::default()
        };
        self.sql_exec_with_options(options, sql, arguments).await
    }

    /// Grant `role` to `to_uid` on a database, or on one table when `on_table` is non-empty
    pub async fn sql_grant(
        &self,
        on_database: &str,
        on_table: &str,
        to_uid: &str,
        role: GrantRole,
    ) -> Result<TxResponse> {
        let msg = SqlGrantRequest {
            from: self.address().to_string(),
            to_uid: to_uid.to_string(),
            role: role.as_str().to_string(),
            on_database: on_database.to_string(),
            on_table: on_table.to_string(),
        };
        self.send(msg).await
    }

    pub async fn grant_writer(&self, on_database: &str, on_table: &str, to_uid: &str) -> Result<TxResponse> {
        self.sql_grant(on_database, on_table, to_uid, GrantRole::Writer).await
    }

    pub async fn grant_reader(&self, on_database: &str, on_table: &str, to_uid: &str) -> Result<TxResponse> {
        self.sql_grant(on_database, on_table, to_uid, GrantRole::Reader).await
    }

    pub async fn grant_admin(&self, on_database: &str, on_table: &str, to_uid: &str) -> Result<TxResponse> {
        self.sql_grant(on_database, on_table, to_uid, GrantRole::Admin).await
    }

    pub async fn create_database(&self, database: &str) -> Result<TxResponse> {
        self.sql_exec(&format!("CREATE DATABASE IF NOT EXISTS {database}"), vec![]).await
    }

    /// `sql` is a full DDL statement naming the table as `<database>.<table>`
    pub async fn create_table(&self, sql: &str) -> Result<TxResponse> {
        self.sql_exec(sql, vec![]).await
    }

    pub async fn drop_table(&self, database: &str, table: &str) -> Result<TxResponse> {
        self.sql_exec(&format!("DROP TABLE IF EXISTS {database}.{table}"), vec![]).await
    }

    pub async fn drop_database(&self, database: &str) -> Result<TxResponse> {
        self.sql_exec(&format!("DROP DATABASE IF EXISTS {database}"), vec![]).await
    }

    pub async fn insert(
        &self,
        database: &str,
        table: &str,
        columns: &BTreeMap<String, SqlValue>,
    ) -> Result<TxResponse> {
        let (sql, args) = build_insert(&full_table_name(database, table), columns)?;
        self.sql_exec(&sql, args).await
    }

    pub async fn batch_insert<C: AsRef<str>>(
        &self,
        database: &str,
        table: &str,
        columns: &[C],
        rows: &[Vec<SqlValue>],
    ) -> Result<TxResponse> {
        let (sql, args) = build_batch_insert(&full_table_name(database, table), columns, rows)?;
        self.sql_exec(&sql, args).await
    }

    /// Conditions in `where_equal` are joined with `and`
    pub async fn update(
        &self,
        database: &str,
        table: &str,
        set: &BTreeMap<String, SqlValue>,
        where_equal: &BTreeMap<String, SqlValue>,
    ) -> Result<TxResponse> {
        let (sql, args) = build_update(&full_table_name(database, table), set, where_equal)?;
        self.sql_exec(&sql, args).await
    }

    /// Empty `order_by` and zero `limit` leave those clauses off
    pub async fn delete(
        &self,
        database: &str,
        table: &str,
        where_equal: &BTreeMap<String, SqlValue>,
        order_by: &str,
        asc: bool,
        limit: u64,
    ) -> Result<TxResponse> {
        let (sql, args) = build_delete(&full_table_name(database, table), where_equal, order_by, asc, limit)?;
        self.sql_exec(&sql, args).await
    }

    pub async fn create_dataset(
        &self,
        dataset_name: &str,
        work_status: ServiceStatus,
        hosts: &str,
        manage_addresses: &str,
        description: &str,
        duration: i64,
    ) -> Result<TxResponse> {
        let msg = CreateDatasetRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            work_status: work_status as i32,
            hosts: hosts.to_string(),
            manage_addresses: manage_addresses.to_string(),
            description: description.to_string(),
            duration,
        };
        self.send(msg).await
    }

    pub async fn edit_dataset(
        &self,
        dataset_name: &str,
        work_status: ServiceStatus,
        hosts: &str,
        manage_addresses: &str,
        description: &str,
    ) -> Result<TxResponse> {
        let msg = EditDatasetRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            work_status: work_status as i32,
            hosts: hosts.to_string(),
            manage_addresses: manage_addresses.to_string(),
            description: description.to_string(),
        };
        self.send(msg).await
    }

    pub async fn edit_table(&self, dataset_name: &str, table_name: &str, description: &str) -> Result<TxResponse> {
        let msg = EditTableRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            table_name: table_name.to_string(),
            description: description.to_string(),
        };
        self.send(msg).await
    }

    /// Extend a dataset's lease by `duration` seconds
    pub async fn renewal_dataset(&self, dataset_name: &str, duration: i64) -> Result<TxResponse> {
        let msg = RenewalDatasetRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            duration,
        };
        self.send(msg).await
    }

    pub async fn pledge(&self, dataset_name: &str, amount: u128) -> Result<TxResponse> {
        let msg = PledgeRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            amount: amount.to_string(),
        };
        self.send(msg).await
    }

    pub async fn release_pledge(&self, dataset_name: &str, amount: u128) -> Result<TxResponse> {
        let msg = ReleasePledgeRequest {
            from: self.address().to_string(),
            dataset_name: dataset_name.to_string(),
            amount: amount.to_string(),
        };
        self.send(msg).await
    }

    async fn send<M: TxMessage>(&self, msg: M) -> Result<TxResponse> {
        self.sign_and_broadcast_tx(CreateTxOptions::new(vec![msg.to_any()])).await
    }
}
