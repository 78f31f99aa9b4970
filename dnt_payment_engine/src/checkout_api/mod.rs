mod library_api;
mod order_flow_api;

pub use library_api::LibraryApi;
pub use order_flow_api::{CheckoutConfig, OrderFlowApi};
