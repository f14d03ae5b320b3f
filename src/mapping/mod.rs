mod process;
mod reconcile;
mod table;

pub use process::{process, IdentityPredicate, Processed};
pub use reconcile::{plan, SchemaOp};
pub use table::Table;
