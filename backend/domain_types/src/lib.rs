pub mod errors;
pub mod order;
pub mod refund;
pub mod router_response_types;
pub mod subscription;
pub mod types;
pub mod webhooks;
