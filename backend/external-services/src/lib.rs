pub mod metrics;
pub mod redaction;
pub mod service;
pub use service::*;
