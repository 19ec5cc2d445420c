pub mod access_token;
pub mod connectors;
pub mod types;

pub use types::GatewayRegistry;
