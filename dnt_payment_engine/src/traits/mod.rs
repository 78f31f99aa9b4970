//! Traits that backends must implement to power the checkout engine.
//!
//! [`PaymentGatewayDatabase`] is the storage backend; [`PaymentGateway`] is the external card
//! charge API. The order-flow state machine is generic over both, which is also what makes it
//! testable without a live gateway or database.
mod library_management;
mod payment_gateway;
mod payment_gateway_database;

pub use library_management::{LibraryApiError, LibraryManagement};
pub use payment_gateway::{AuthorizedCharge, CaptureResult, GatewayCustomer, GatewayError, PaymentGateway};
pub use payment_gateway_database::{PaymentEngineError, PaymentGatewayDatabase};
