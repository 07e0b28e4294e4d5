pub mod error;
pub mod keys;
pub mod kv;
pub mod messages;
pub mod posts;
pub mod session;
pub mod sqlite;
pub mod users;

pub use error::{Result, StoreError};
pub use kv::{KvStore, MemoryStore};
pub use sqlite::SqliteStore;
