use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cards: CardList,
}

impl Customer {
    /// The most recently attached card. Omise appends new cards, so after an attach this is the
    /// card that was just added.
    pub fn last_card(&self) -> Option<&Card> {
        self.cards.data.last()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardList {
    #[serde(default)]
    pub data: Vec<Card>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub last_digits: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub paid: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub authorize_uri: Option<String>,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
}

/// Request body for `POST /charges`. `capture` is always false in the checkout flow; funds are
/// only collected by the explicit capture call after the user returns from 3-D Secure.
#[derive(Debug, Clone, Serialize)]
pub struct NewCharge {
    pub amount: i64,
    pub currency: String,
    pub customer: String,
    pub card: String,
    pub capture: bool,
    pub return_uri: String,
}

impl NewCharge {
    pub fn authorize_only(amount: i64, customer: &str, card: &str, return_uri: &str) -> Self {
        Self {
            amount,
            currency: dnt_common::THB_CURRENCY_CODE.to_lowercase(),
            customer: customer.to_string(),
            card: card.to_string(),
            capture: false,
            return_uri: return_uri.to_string(),
        }
    }
}
