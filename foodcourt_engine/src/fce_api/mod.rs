pub mod checkout_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod settlement_api;
