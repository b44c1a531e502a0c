mod order_number;
mod payment_signature;

pub use order_number::{generate_group_id, generate_order_number};
pub use payment_signature::{sign_payment, PaymentSignature, PaymentVerificationError};
