pub mod cfg;
pub mod db_error;
pub mod mapping;
pub mod query;
pub mod store;
pub mod types;

pub use db_error::{Error, Result};
pub use mapping::Table;
pub use query::Query;
pub use store::{LiveColumn, SqliteStore, Store};
pub use types::{ColumnDef, ColumnType, FieldDecl, FieldType, Model, Record, Schema, Value};

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
