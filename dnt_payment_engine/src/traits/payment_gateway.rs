use dnt_common::Baht;
use thiserror::Error;

/// The closed set of failures a gateway call can produce. Adapter-specific error types must be
/// converted into one of these before they reach the order flow; nothing else may leak through.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway processed the request and refused the charge. The message is shown to the user.
    #[error("Payment declined: {0}")]
    Declined(String),
    /// The gateway did not answer within the configured deadline. Treated exactly like a declined
    /// capture: leaving an order pending forever is the worst outcome.
    #[error("The payment gateway timed out")]
    Timeout,
    #[error("The payment gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

/// A customer record at the gateway with the card that was just attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCustomer {
    pub customer_id: String,
    pub card_id: String,
}

/// The result of opening an authorize-only charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCharge {
    pub charge_id: String,
    /// Where to send the user's browser for out-of-band (3-D Secure) authorization.
    pub authorize_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub paid: bool,
    /// Human-readable failure detail when `paid` is false.
    pub message: Option<String>,
}

/// The boundary to the external card-payment provider. Implementations are the only place in the
/// system allowed to perform network I/O to the payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Creates a customer record keyed by email, or reuses `existing_id` if the member already has
    /// one, and attaches the supplied one-time card token to it.
    async fn prepare_customer(
        &self,
        existing_id: Option<&str>,
        email: &str,
        card_token: &str,
    ) -> Result<GatewayCustomer, GatewayError>;

    /// Opens an authorize-only charge for `amount`. Funds are reserved, not collected; the user
    /// must complete authorization at the returned URL and the caller must capture afterwards.
    async fn authorize_charge(
        &self,
        amount: Baht,
        customer: &GatewayCustomer,
        return_url: &str,
    ) -> Result<AuthorizedCharge, GatewayError>;

    /// Captures a previously authorized charge.
    async fn capture_charge(&self, charge_id: &str) -> Result<CaptureResult, GatewayError>;
}
