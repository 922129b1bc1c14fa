//! EFP (exchange for physical): COMEX futures minus London spot

use super::{legs, Spread, LB_PER_TONNE};
use crate::shared::types::{Exchange, Metal, PriceSnapshot};

/// `|EFP| / spot` above which a basis is flagged as suspicious
///
/// Gold basis is much tighter than silver by market convention.
pub fn suspicious_ratio(metal: Metal) -> f64 {
    match metal {
        Metal::Silver => 0.5,
        Metal::Gold => 0.1,
        Metal::Copper => 0.3,
    }
}

/// Decimals used when displaying an EFP
pub fn efp_decimals(metal: Metal) -> usize {
    match metal {
        Metal::Silver => 3,
        _ => 2,
    }
}

/// Futures minus spot in the spot leg's unit
///
/// COMEX copper is USD/lb while London copper is USD/t.
pub fn efp_value(metal: Metal, futures: f64, spot: f64) -> f64 {
    match metal {
        Metal::Copper => futures * LB_PER_TONNE - spot,
        _ => futures - spot,
    }
}

/// Strict comparison: a ratio exactly at the threshold is not suspicious
pub fn is_suspicious(metal: Metal, efp: f64, spot: f64) -> bool {
    efp.abs() / spot > suspicious_ratio(metal)
}

/// EFP for a metal, or the reason it cannot be shown
pub fn calc_efp(snapshot: &PriceSnapshot, metal: Metal) -> Spread {
    match legs(snapshot, metal, Exchange::Comex, Exchange::London) {
        Ok((futures, spot)) => {
            let value = efp_value(metal, futures, spot);
            Spread::Value {
                value,
                suspicious: is_suspicious(metal, value, spot),
            }
        }
        Err(unavailable) => Spread::Unavailable(unavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::metrics::Unavailable;
    use crate::shared::types::PriceQuote;

    fn snapshot_with(comex: Option<PriceQuote>, london: Option<PriceQuote>, metal: Metal) -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::default();
        if let Some(quote) = comex {
            snapshot.insert(Exchange::Comex, metal, quote);
        }
        if let Some(quote) = london {
            snapshot.insert(Exchange::London, metal, quote);
        }
        snapshot
    }

    fn futures(price: f64) -> PriceQuote {
        PriceQuote { futures_price: Some(price), price: Some(price), ..Default::default() }
    }

    fn spot(price: f64) -> PriceQuote {
        PriceQuote { spot_price: Some(price), price: Some(price), ..Default::default() }
    }

    #[test]
    fn test_efp_is_futures_minus_spot() {
        let snapshot = snapshot_with(Some(futures(24.35)), Some(spot(24.10)), Metal::Silver);
        match calc_efp(&snapshot, Metal::Silver) {
            Spread::Value { value, suspicious } => {
                assert!((value - 0.25).abs() < 1e-9);
                assert!(!suspicious);
            }
            other => panic!("expected value, got {other:?}"),
        }

        let snapshot = snapshot_with(Some(futures(2031.4)), Some(spot(2034.9)), Metal::Gold);
        let value = calc_efp(&snapshot, Metal::Gold).value().unwrap();
        assert!((value - (-3.5)).abs() < 1e-9);
    }

    #[test]
    fn test_copper_efp_converts_pounds_to_tonnes() {
        let snapshot = snapshot_with(Some(futures(4.5)), Some(spot(9800.0)), Metal::Copper);
        let value = calc_efp(&snapshot, Metal::Copper).value().unwrap();
        assert!((value - (4.5 * 2204.62 - 9800.0)).abs() < 1e-9);
        assert!((value - 120.79).abs() < 1e-6);
    }

    #[test]
    fn test_suspicious_boundary_is_strict() {
        assert!(!is_suspicious(Metal::Gold, 200.0, 2000.0));
        assert!(is_suspicious(Metal::Gold, 200.0002, 2000.0));
        assert!(!is_suspicious(Metal::Gold, -200.0, 2000.0));

        let snapshot = snapshot_with(Some(futures(2200.0)), Some(spot(2000.0)), Metal::Gold);
        assert_eq!(
            calc_efp(&snapshot, Metal::Gold),
            Spread::Value { value: 200.0, suspicious: false }
        );
    }

    #[test]
    fn test_silver_threshold_boundary() {
        assert_eq!(suspicious_ratio(Metal::Silver), 0.5);
        assert!(!is_suspicious(Metal::Silver, 12.0, 24.0));
        assert!(is_suspicious(Metal::Silver, 12.001, 24.0));

        let snapshot = snapshot_with(Some(futures(36.0)), Some(spot(24.0)), Metal::Silver);
        assert_eq!(
            calc_efp(&snapshot, Metal::Silver),
            Spread::Value { value: 12.0, suspicious: false }
        );
    }

    #[test]
    fn test_copper_threshold() {
        assert_eq!(suspicious_ratio(Metal::Copper), 0.3);
        assert!(!is_suspicious(Metal::Copper, 300.0, 1000.0));
        assert!(is_suspicious(Metal::Copper, 300.001, 1000.0));
        assert!(!is_suspicious(Metal::Copper, -300.0, 1000.0));

        // 4.5 USD/lb is 9920.79 USD/t, 42% over a 7000 USD/t spot
        let snapshot = snapshot_with(Some(futures(4.5)), Some(spot(7000.0)), Metal::Copper);
        match calc_efp(&snapshot, Metal::Copper) {
            Spread::Value { value, suspicious } => {
                assert!((value - 2920.79).abs() < 1e-6);
                assert!(suspicious);
            }
            other => panic!("expected value, got {other:?}"),
        }

        let snapshot = snapshot_with(Some(futures(4.5)), Some(spot(9800.0)), Metal::Copper);
        assert_eq!(
            calc_efp(&snapshot, Metal::Copper),
            Spread::Value { value: 4.5 * 2204.62 - 9800.0, suspicious: false }
        );
    }

    #[test]
    fn test_suspicious_silver_still_reports_value() {
        let snapshot = snapshot_with(Some(futures(40.0)), Some(spot(24.0)), Metal::Silver);
        assert_eq!(
            calc_efp(&snapshot, Metal::Silver),
            Spread::Value { value: 16.0, suspicious: true }
        );
    }

    #[test]
    fn test_missing_and_flagged_legs() {
        let snapshot = snapshot_with(None, Some(spot(24.0)), Metal::Silver);
        assert_eq!(
            calc_efp(&snapshot, Metal::Silver),
            Spread::Unavailable(Unavailable::Missing(Exchange::Comex))
        );

        let snapshot = snapshot_with(Some(futures(24.3)), None, Metal::Silver);
        assert_eq!(
            calc_efp(&snapshot, Metal::Silver),
            Spread::Unavailable(Unavailable::Missing(Exchange::London))
        );

        let flagged = PriceQuote { is_error: true, ..futures(24.3) };
        let snapshot = snapshot_with(Some(flagged), Some(spot(24.0)), Metal::Silver);
        assert_eq!(
            calc_efp(&snapshot, Metal::Silver),
            Spread::Unavailable(Unavailable::DataError)
        );
    }
}
