pub mod app;
pub mod configs;
pub mod error;
pub mod logger;

#[macro_export]
macro_rules! service_name {
    () => {
        env!("CARGO_CRATE_NAME")
    };
}
