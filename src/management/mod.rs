mod auth;
pub mod checkpoint;
pub mod library;

pub use auth::TokenManager;
pub use checkpoint::{CheckpointError, CheckpointStore, CheckpointTable, CsvCheckpointStore};
pub use library::SourceError;
