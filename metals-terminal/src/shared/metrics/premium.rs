//! Shanghai premium over London, via an implied USD/CNY cross-rate

use super::{legs, Spread, FALLBACK_USD_CNY, GRAMS_PER_TROY_OZ, TROY_OZ_PER_KG};
use crate::shared::types::{Exchange, Metal, PriceSnapshot};

/// USD/CNY rate used to bring Shanghai quotes into London units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossRate {
    pub rate: f64,
    /// True when derived from the gold legs, false when the fallback was used
    pub implied: bool,
}

/// Implied rate = (SGE gold CNY/g × g/oz) / London gold USD/oz, else 7.15
pub fn usd_cny_rate(snapshot: &PriceSnapshot) -> CrossRate {
    match (
        snapshot.usable_price(Exchange::Shanghai, Metal::Gold),
        snapshot.usable_price(Exchange::London, Metal::Gold),
    ) {
        (Some(shanghai), Some(london)) => CrossRate {
            rate: shanghai * GRAMS_PER_TROY_OZ / london,
            implied: true,
        },
        _ => CrossRate {
            rate: FALLBACK_USD_CNY,
            implied: false,
        },
    }
}

/// Convert a Shanghai quote into the London leg's unit
///
/// Silver CNY/kg -> USD/oz, gold CNY/g -> USD/oz, copper CNY/t -> USD/t.
pub fn shanghai_in_usd(metal: Metal, price_cny: f64, rate: f64) -> f64 {
    match metal {
        Metal::Silver => (price_cny / rate) / TROY_OZ_PER_KG,
        Metal::Gold => price_cny * GRAMS_PER_TROY_OZ / rate,
        Metal::Copper => price_cny / rate,
    }
}

/// Relative difference in percent
pub fn premium_percent(converted: f64, london: f64) -> f64 {
    (converted - london) / london * 100.0
}

/// Shanghai premium in percent for a metal, or the reason it cannot be shown
pub fn calc_premium(snapshot: &PriceSnapshot, metal: Metal, rate: CrossRate) -> Spread {
    match legs(snapshot, metal, Exchange::Shanghai, Exchange::London) {
        Ok((shanghai, london)) => Spread::Value {
            value: premium_percent(shanghai_in_usd(metal, shanghai, rate.rate), london),
            suspicious: false,
        },
        Err(unavailable) => Spread::Unavailable(unavailable),
    }
}
