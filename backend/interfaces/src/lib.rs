pub mod connector_types;
pub mod repository;
pub mod verification;
