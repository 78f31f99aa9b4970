mod omise;

pub use omise::OmiseGateway;
