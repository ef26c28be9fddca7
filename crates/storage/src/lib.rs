#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryStore, NoteRepository, ProgressRecord, ProgressRepository, Storage, StorageError,
};
pub use sqlite::{SqliteInitError, SqliteStore};
