pub mod memory;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod query;
pub mod scope;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::ScopedQuery;
pub use scope::TenantScope;
pub use store::{keys, Store, StoreError, StoreResult};
