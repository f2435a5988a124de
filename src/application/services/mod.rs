pub mod refresh;

pub use refresh::{ContentRefreshGate, RefreshError, Served};
