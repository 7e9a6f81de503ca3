pub mod num;
pub mod query_string;
pub mod sql;

pub use query_string::QueryString;
pub use sql::{build_batch_insert, build_delete, build_insert, build_update, full_table_name, Statement};
