//! Entity store adapter
//!
//! Filtered, paginated reads/writes against a partition/row-key table store.
//! `TableStore` is the adapter contract; `MongoTableStore` is the production
//! implementation, `MemoryTableStore` backs tests and dev mode.

pub mod filter;
pub mod memory;
pub mod table;

pub use filter::{CompareOp, Filter};
pub use memory::MemoryTableStore;
pub use table::{
    delete_row, get_row, put_row, query_rows, replace_row, MongoTableStore, TableRow, TableStore,
    FIELD_PK, FIELD_RK,
};
