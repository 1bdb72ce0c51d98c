//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod sqlite_store;
mod memory_store;
mod snapshot;


pub use traits::{find, find_where, insert, Direction, Filter, Order, RecordStore, RecordTransaction, StoreOp};
pub use db::init_db;
pub use sqlite_store::SqliteStore;
pub use memory_store::{MemoryStore, StoreStats};
pub use snapshot::{load_tier_list, load_tier_lists};
