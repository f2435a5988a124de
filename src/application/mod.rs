pub mod errors;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

// Re-exports
pub use server::{ServerConfig, serve};
