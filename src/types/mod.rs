mod record;
mod schema;
mod value;

pub use record::{Model, Record};
pub use schema::{ColumnDef, FieldDecl, FieldType, Schema};
pub use value::{decode, encode, quote, unquote, ColumnType, Value};
