//! DNT Payment Engine
//!
//! Core logic for the DNT newspaper subscription checkout. The engine owns the order lifecycle
//! (`Pending → Paid` / `Pending → Cancelled`), receipt numbering, subscription provisioning, cart
//! recovery and the library entitlement queries. It is gateway-agnostic: the card-payment provider
//! is abstracted behind the [`traits::PaymentGateway`] trait and only ever surfaces a small closed
//! set of outcomes to the order flow.
//!
//! The crate is divided into three main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the supported backend. Callers should never
//!    need to touch the database directly; the data types in [`mod@db_types`] are the public
//!    surface.
//! 2. The engine public API ([`mod@checkout_api`]): the order-flow state machine and the library
//!    API. Backends implement the traits in [`mod@traits`].
//! 3. An event/hook system ([`mod@events`]) used for fire-and-forget work such as receipt email
//!    dispatch, which must never roll back or delay an order transition.
mod checkout_api;
mod sqlite;

pub mod db_types;
pub mod events;
pub mod order_objects;
pub mod traits;

pub use checkout_api::{CheckoutConfig, LibraryApi, OrderFlowApi};
pub use sqlite::SqliteDatabase;
