#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;
pub mod word_source;

pub use repository::{InMemoryProgressStore, ProgressBook, ProgressStore, Storage, StorageError};
pub use word_source::DataLoadError;
