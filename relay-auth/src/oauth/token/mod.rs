//! Token record persistence.

pub mod encryption;

mod memory;
mod record;
mod storage;

pub use memory::MemoryStorage;
pub use record::TokenRecord;
pub use storage::Storage;
