use std::sync::Arc;

use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::OmiseConfig,
    data_objects::{Charge, Customer, NewCharge},
    OmiseApiError,
};

#[derive(Clone)]
pub struct OmiseApi {
    config: OmiseConfig,
    client: Arc<Client>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl OmiseApi {
    pub fn new(config: OmiseConfig) -> Result<Self, OmiseApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OmiseApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, OmiseApiError> {
        let url = self.url(path);
        trace!("Sending Omise query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(self.config.secret_key.reveal(), None::<String>);
        if let Some(body) = body {
            // Omise accepts form-encoded request bodies
            req = req.form(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("Omise query successful: {}", response.status());
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(OmiseApiError::from)?;
            let err = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| OmiseApiError::Api { code: e.code, message: e.message })
                .unwrap_or_else(|_| OmiseApiError::UnexpectedResponse(format!("HTTP {status}: {body}")));
            Err(err)
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates a new Omise customer with the given card token attached.
    pub async fn create_customer(&self, email: &str, card_token: &str) -> Result<Customer, OmiseApiError> {
        #[derive(Serialize)]
        struct NewCustomer<'a> {
            email: &'a str,
            description: String,
            card: &'a str,
        }
        let body = NewCustomer { email, description: format!("DNT subscriber {email}"), card: card_token };
        debug!("Creating Omise customer for {email}");
        let customer = self.rest_query::<Customer, _>(Method::POST, "/customers", Some(body)).await?;
        info!("Created Omise customer {}", customer.id);
        Ok(customer)
    }

    pub async fn retrieve_customer(&self, customer_id: &str) -> Result<Customer, OmiseApiError> {
        let path = format!("/customers/{customer_id}");
        debug!("Fetching Omise customer {customer_id}");
        self.rest_query::<Customer, ()>(Method::GET, &path, None).await
    }

    /// Attaches a new card (from a one-time token) to an existing customer. The updated customer
    /// record is returned; the new card is the last one in its card list.
    pub async fn attach_card(&self, customer_id: &str, card_token: &str) -> Result<Customer, OmiseApiError> {
        #[derive(Serialize)]
        struct CardUpdate<'a> {
            card: &'a str,
        }
        let path = format!("/customers/{customer_id}");
        debug!("Attaching card to Omise customer {customer_id}");
        let customer =
            self.rest_query::<Customer, _>(Method::PATCH, &path, Some(CardUpdate { card: card_token })).await?;
        info!("Attached card to Omise customer {customer_id}");
        Ok(customer)
    }

    /// Creates an authorize-only charge. The caller must redirect the user to `authorize_uri` and
    /// capture the charge explicitly once the user returns.
    pub async fn create_charge(&self, charge: NewCharge) -> Result<Charge, OmiseApiError> {
        debug!("Creating authorize-only charge of {} satang for {}", charge.amount, charge.customer);
        let charge = self.rest_query::<Charge, _>(Method::POST, "/charges", Some(charge)).await?;
        info!("Created charge {} ({})", charge.id, charge.status.as_deref().unwrap_or("unknown"));
        Ok(charge)
    }

    /// Captures a previously authorized charge, collecting the reserved funds.
    pub async fn capture_charge(&self, charge_id: &str) -> Result<Charge, OmiseApiError> {
        let path = format!("/charges/{charge_id}/capture");
        debug!("Capturing charge {charge_id}");
        let charge = self.rest_query::<Charge, ()>(Method::POST, &path, None).await?;
        info!("Captured charge {charge_id}: paid={}", charge.paid);
        Ok(charge)
    }
}
