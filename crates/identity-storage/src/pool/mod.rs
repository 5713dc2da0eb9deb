//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use identity_core::config::StorageConfig;
use identity_core::errors::IdentityResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> IdentityResult<Self> {
        // Writer first: it creates the file and switches it to WAL before
        // read-only connections attach.
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool. Readers are not usable here: each in-memory
    /// connection is its own database, so the engine routes reads to the writer.
    pub fn open_in_memory(config: &StorageConfig) -> IdentityResult<Self> {
        let writer = WriteConnection::open_in_memory(config)?;
        let readers = ReadPool::open_in_memory(1)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
