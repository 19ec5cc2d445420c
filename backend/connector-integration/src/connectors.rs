pub mod cardpay;
pub use self::cardpay::Cardpay;

pub mod mock;
pub use self::mock::{PaymentGatewayMockError, PaymentGatewayMockOk};
