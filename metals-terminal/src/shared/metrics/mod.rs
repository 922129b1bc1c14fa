//! Cross-market spreads derived from the latest price snapshot
//!
//! Provides:
//! - EFP (COMEX futures vs London spot) per metal with a suspicious-basis flag
//! - Implied USD/CNY cross-rate from the gold legs
//! - Shanghai premium over London in percent
//!
//! Spreads are recomputed from every snapshot and never stored.

mod efp;
mod premium;

pub use efp::{calc_efp, efp_decimals, efp_value, is_suspicious, suspicious_ratio};
pub use premium::{calc_premium, premium_percent, shanghai_in_usd, usd_cny_rate, CrossRate};

use crate::shared::types::{Exchange, Metal, PriceSnapshot};

/// Pounds per metric tonne (COMEX copper is quoted per lb)
pub const LB_PER_TONNE: f64 = 2204.62;
/// Grams per troy ounce (SGE gold is quoted per gram)
pub const GRAMS_PER_TROY_OZ: f64 = 31.1035;
/// Troy ounces per kilogram (SHFE silver is quoted per kg)
pub const TROY_OZ_PER_KG: f64 = 32.1507;
/// USD/CNY used when the gold legs cannot imply a rate
pub const FALLBACK_USD_CNY: f64 = 7.15;

/// Why a spread could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    Missing(Exchange),
    DataError,
}

impl Unavailable {
    pub fn reason(&self) -> &'static str {
        match self {
            Unavailable::Missing(Exchange::Comex) => "NY missing",
            Unavailable::Missing(Exchange::London) => "London missing",
            Unavailable::Missing(Exchange::Shanghai) => "SHFE missing",
            Unavailable::DataError => "data error",
        }
    }
}

/// Sign of a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Direction::Up
        } else if value < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Result of a spread computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spread {
    Value { value: f64, suspicious: bool },
    Unavailable(Unavailable),
}

impl Spread {
    pub fn value(&self) -> Option<f64> {
        match self {
            Spread::Value { value, .. } => Some(*value),
            Spread::Unavailable(_) => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.value().map(Direction::from_sign)
    }
}

/// Resolve both legs of a spread, reporting the first missing venue
///
/// A leg is usable when its quote exists, is not flagged and carries a
/// positive value. Presence is checked before flags, numerator first.
fn legs(
    snapshot: &PriceSnapshot,
    metal: Metal,
    numerator: Exchange,
    base: Exchange,
) -> Result<(f64, f64), Unavailable> {
    let num_quote = snapshot.get(numerator, metal);
    let base_quote = snapshot.get(base, metal);

    match (num_quote, base_quote) {
        (None, _) => Err(Unavailable::Missing(numerator)),
        (_, None) => Err(Unavailable::Missing(base)),
        (Some(_), Some(_)) => {
            match (
                snapshot.usable_price(numerator, metal),
                snapshot.usable_price(base, metal),
            ) {
                (Some(num), Some(base)) => Ok((num, base)),
                _ => Err(Unavailable::DataError),
            }
        }
    }
}
