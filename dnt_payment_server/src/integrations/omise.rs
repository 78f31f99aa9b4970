//! The Omise implementation of the engine's [`PaymentGateway`] trait.
//!
//! Everything Omise-specific stops here: wire types and `OmiseApiError`s are translated into the
//! engine's closed [`GatewayError`] set before they reach the order flow.
use dnt_common::Baht;
use dnt_payment_engine::traits::{AuthorizedCharge, CaptureResult, GatewayCustomer, GatewayError, PaymentGateway};
use log::*;
use omise_tools::{Customer, NewCharge, OmiseApi, OmiseApiError, OmiseConfig};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct OmiseGateway {
    api: OmiseApi,
}

impl OmiseGateway {
    pub fn new(config: OmiseConfig) -> Result<Self, ServerError> {
        let api = OmiseApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

fn convert_error(e: OmiseApiError) -> GatewayError {
    match e {
        OmiseApiError::Timeout => GatewayError::Timeout,
        OmiseApiError::Transport(m) => GatewayError::Unreachable(m),
        OmiseApiError::Api { message, .. } => GatewayError::Declined(message),
        e => GatewayError::UnexpectedResponse(e.to_string()),
    }
}

fn to_gateway_customer(customer: &Customer) -> Result<GatewayCustomer, GatewayError> {
    let card = customer
        .last_card()
        .ok_or_else(|| GatewayError::UnexpectedResponse(format!("Customer {} has no card attached", customer.id)))?;
    Ok(GatewayCustomer { customer_id: customer.id.clone(), card_id: card.id.clone() })
}

impl PaymentGateway for OmiseGateway {
    async fn prepare_customer(
        &self,
        existing_id: Option<&str>,
        email: &str,
        card_token: &str,
    ) -> Result<GatewayCustomer, GatewayError> {
        let customer = match existing_id {
            Some(id) => {
                debug!("🛒️ Attaching a new card to existing Omise customer {id}");
                self.api.attach_card(id, card_token).await.map_err(convert_error)?
            },
            None => {
                debug!("🛒️ Creating an Omise customer for {email}");
                self.api.create_customer(email, card_token).await.map_err(convert_error)?
            },
        };
        to_gateway_customer(&customer)
    }

    async fn authorize_charge(
        &self,
        amount: Baht,
        customer: &GatewayCustomer,
        return_url: &str,
    ) -> Result<AuthorizedCharge, GatewayError> {
        let request = NewCharge::authorize_only(amount.value(), &customer.customer_id, &customer.card_id, return_url);
        let charge = self.api.create_charge(request).await.map_err(convert_error)?;
        if let Some(code) = charge.failure_code {
            let message = charge.failure_message.unwrap_or(code);
            return Err(GatewayError::Declined(message));
        }
        let authorize_url = charge.authorize_uri.ok_or_else(|| {
            GatewayError::UnexpectedResponse(format!("Charge {} has no authorize_uri", charge.id))
        })?;
        Ok(AuthorizedCharge { charge_id: charge.id, authorize_url })
    }

    async fn capture_charge(&self, charge_id: &str) -> Result<CaptureResult, GatewayError> {
        let charge = self.api.capture_charge(charge_id).await.map_err(convert_error)?;
        let message = charge.failure_message.or(charge.failure_code);
        Ok(CaptureResult { paid: charge.paid, message })
    }
}
