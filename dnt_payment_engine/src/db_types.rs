use std::{fmt::Display, str::FromStr, sync::OnceLock};

use chrono::{DateTime, NaiveDate, Utc};
use dnt_common::Baht;
use log::error;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      Member       -----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub email: String,
    /// The customer record id at the payment gateway, stored after the first successful checkout
    /// so later charges reuse the same customer.
    pub gateway_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      Product      -----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    /// Tax-inclusive price in satang.
    pub price: Baht,
    /// Length of the subscription period this product grants, in days.
    pub duration_days: i64,
    pub auto_renew: bool,
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created; the charge has not been captured yet.
    Pending,
    /// The charge was captured in full. Terminal.
    Paid,
    /// Authorization or capture failed, or the charge was declined. Terminal.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Paid | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------   ReceiptNumber    ----------------------------------------------------------
/// A date-scoped receipt number, `DNT-YYYYMMDD-NNNNN`. The suffix is strictly increasing per
/// calendar day, starting at 00001, and is never reused or decremented.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ReceiptNumber(String);

pub const RECEIPT_PREFIX: &str = "DNT";

fn receipt_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^DNT-(\d{8})-(\d{5})$").expect("hard-coded regex is valid"))
}

#[derive(Debug, Clone, Error)]
#[error("Not a valid receipt number: {0}")]
pub struct ReceiptFormatError(String);

impl ReceiptNumber {
    pub fn new(date: NaiveDate, sequence: u32) -> Self {
        Self(format!("{RECEIPT_PREFIX}-{}-{sequence:05}", date.format("%Y%m%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric suffix of the receipt number.
    pub fn sequence(&self) -> u32 {
        // Infallible by construction; parse is only needed for numbers loaded from storage.
        self.0.rsplit('-').next().and_then(|s| s.parse().ok()).unwrap_or(0)
    }
}

impl FromStr for ReceiptNumber {
    type Err = ReceiptFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if receipt_number_regex().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ReceiptFormatError(s.to_string()))
        }
    }
}

impl Display for ReceiptNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        Order       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub member_id: i64,
    /// Tax-inclusive total in satang.
    pub total: Baht,
    /// Tax-exclusive subtotal, `round(total / 1.07)`.
    pub sub_total: Baht,
    /// The charge-session identifier at the payment gateway. Set once authorization opens.
    pub charge_id: Option<String>,
    pub status: OrderStatusType,
    pub receipt_number: Option<ReceiptNumber>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub receipt_sent_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn vat_amount(&self) -> Baht {
        self.total - self.sub_total
    }
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub member_id: i64,
    /// The single line item. One order always maps to exactly one product.
    pub product_id: i64,
    pub total: Baht,
    pub sub_total: Baht,
}

impl NewOrder {
    pub fn new(member_id: i64, product_id: i64, total: Baht) -> Self {
        let sub_total = total.subtotal_before_vat();
        Self { member_id, product_id, total, sub_total }
    }
}

//--------------------------------------     Subscription    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub member_id: i64,
    pub order_id: i64,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub member_id: i64,
    pub order_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub auto_renew: bool,
}

//--------------------------------------      CartItem       ---------------------------------------------------------
/// The single product slot of a member's cart. A member has at most one cart, and a cart holds at
/// most one item.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: i64,
    pub product_id: i64,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     Newspaper       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Newspaper {
    pub id: i64,
    pub title: String,
    pub published_at: NaiveDate,
}
