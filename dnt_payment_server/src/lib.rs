pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod mailer;
pub mod receipts;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
