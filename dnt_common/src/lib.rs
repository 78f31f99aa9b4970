mod baht;

pub mod op;
mod secret;

pub use baht::{Baht, BahtConversionError, THB_CURRENCY_CODE, VAT_RATE_PERCENT};
pub use secret::Secret;
