pub mod storage;

pub use storage::{IContactStore, IStoreTransaction, ITransactionalStore};
