pub mod payments;
pub mod utils;

pub use payments::Payments;
