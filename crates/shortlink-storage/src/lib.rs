//! Storage backends for the shortlink engine.
//!
//! Both backends enforce code uniqueness with a single atomic
//! insert-if-absent and report a taken code as [`StorageError::Conflict`].

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::{SqliteRepository, SqliteSettings};

pub use shortlink_core::repository::{ReadRepository, Repository};
pub use shortlink_core::{DeletePolicy, StorageError};
