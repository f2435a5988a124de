pub mod content;
pub mod errors;
pub mod repositories;

// Re-exports
pub use errors::RepositoryError;
