pub mod config;
pub mod error;
pub mod provider;
pub mod server;

pub use config::RelayConfig;
pub use error::{ProviderError, RelayError};
pub use provider::{Insight, ModelProvider};
pub use server::RelayServer;
