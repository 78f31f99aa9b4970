use std::{
    fmt::Display,
    ops::{Add, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const THB_CURRENCY_CODE: &str = "THB";

/// Thai VAT rate, as a percentage. Product prices are stored tax-inclusive.
pub const VAT_RATE_PERCENT: i64 = 7;

const VAT_DIVISOR: f64 = 1.07;

/// An amount of Thai Baht, stored in integer satang (minor units) to avoid floating-point money errors.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Baht(i64);

op!(binary Baht, Add, add);
op!(binary Baht, Sub, sub);
op!(inplace Baht, SubAssign, sub_assign);
op!(unary Baht, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in satang: {0}")]
pub struct BahtConversionError(String);

impl From<i64> for Baht {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Baht {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Baht {}

impl TryFrom<u64> for Baht {
    type Error = BahtConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(BahtConversionError(format!("Value {value} is too large to convert to satang")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl FromStr for Baht {
    type Err = BahtConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| BahtConversionError(format!("{s}: {e}")))
    }
}

impl Display for Baht {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let baht = self.0 as f64 / 100.0;
        write!(f, "฿{baht:0.2}")
    }
}

impl Baht {
    pub fn from_baht(baht: i64) -> Self {
        Self(baht * 100)
    }

    /// The amount in satang.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// The tax-exclusive portion of a VAT-inclusive amount, i.e. `round(total / 1.07)`.
    pub fn subtotal_before_vat(&self) -> Baht {
        #[allow(clippy::cast_possible_truncation)]
        Baht((self.0 as f64 / VAT_DIVISOR).round() as i64)
    }

    /// The VAT portion of a tax-inclusive amount. Always `total - subtotal`, so the two parts sum
    /// back to the original amount exactly.
    pub fn vat_amount(&self) -> Baht {
        *self - self.subtotal_before_vat()
    }
}
