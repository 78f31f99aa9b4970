//! A thin, typed client for the subset of the Omise REST API that the DNT checkout flow needs:
//! customers, card attachment and two-phase (authorize-then-capture) charges.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::OmiseApi;
pub use config::OmiseConfig;
pub use data_objects::{Card, CardList, Charge, Customer, NewCharge};
pub use error::OmiseApiError;
