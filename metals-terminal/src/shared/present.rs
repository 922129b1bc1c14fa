//! Merge fetched snapshots into a display surface
//!
//! Everything here goes through [`Surface`], so the same logic drives the
//! terminal board and the tests.

use chrono::{DateTime, Local};

use crate::shared::format::{
    format_currency, format_number, format_percent, format_signed, parse_displayed_number,
};
use crate::shared::metrics::{
    calc_efp, calc_premium, efp_decimals, usd_cny_rate, Direction, Spread,
};
use crate::shared::poller::{PollTarget, PollUpdate};
use crate::shared::surface::{
    AuditRow, Class, InventoryCard, Slot, StatRow, Surface, TickerEntry, TooltipLine,
};
use crate::shared::types::{
    Exchange, InventoryRecord, InventorySnapshot, InventoryVenue, Metal, PriceQuote,
    PriceSnapshot, Severity,
};

/// Price slots shown on the terminal page
pub const TERMINAL_PRICES: [(Exchange, Metal); 6] = [
    (Exchange::London, Metal::Silver),
    (Exchange::London, Metal::Gold),
    (Exchange::London, Metal::Copper),
    (Exchange::Comex, Metal::Silver),
    (Exchange::Comex, Metal::Gold),
    (Exchange::Comex, Metal::Copper),
];

/// Inventory venues shown on the terminal page
pub const TERMINAL_VENUES: [InventoryVenue; 2] = [InventoryVenue::Comex, InventoryVenue::Lme];

/// Markets shown on the monitor's price ticker
pub const TICKER_MARKETS: [(&str, Exchange, Metal); 7] = [
    ("London Gold", Exchange::London, Metal::Gold),
    ("London Silver", Exchange::London, Metal::Silver),
    ("London Copper", Exchange::London, Metal::Copper),
    ("COMEX Silver", Exchange::Comex, Metal::Silver),
    ("COMEX Copper", Exchange::Comex, Metal::Copper),
    ("SHFE Silver", Exchange::Shanghai, Metal::Silver),
    ("SHFE Copper", Exchange::Shanghai, Metal::Copper),
];

/// Metals with a Shanghai premium panel
pub const PREMIUM_METALS: [Metal; 2] = [Metal::Silver, Metal::Copper];

const SUSPICIOUS_BASIS_HINT: &str = "Basis anomaly detected, check units or contract month";
const NOT_AVAILABLE: &str = "N/A";

/// Backend reachability as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Disconnected,
}

/// Write a price into its slot, flashing up/down against the previous text
///
/// The previous value is parsed back out of the displayed text; when it does
/// not parse (first render) no direction is set. Equal values clear both.
pub fn update_value<S: Surface>(
    surface: &mut S,
    slot: Slot,
    value: Option<f64>,
    quote: Option<&PriceQuote>,
) {
    if let Slot::Price(_, metal) = slot {
        surface.set_debug_key(slot, metal.as_str());
    }

    let previous = surface.text(slot).and_then(parse_displayed_number);
    surface.set_text(slot, format_currency(value, "$"));

    if let (Some(previous), Some(current)) = (previous, value) {
        surface.set_class(slot, Class::Up, current > previous);
        surface.set_class(slot, Class::Down, current < previous);
    }

    if let Some(quote) = quote {
        surface.set_tooltip(slot, quote_tooltip(quote));
        surface.set_class(slot, Class::Error, quote.is_error);
    }
}

fn quote_tooltip(quote: &PriceQuote) -> Vec<TooltipLine> {
    vec![
        TooltipLine::new("Source", quote.source.as_deref().unwrap_or("Unknown")),
        TooltipLine::new("Time", quote.provider_as_of.as_deref().unwrap_or(NOT_AVAILABLE)),
        TooltipLine::new("Field", quote.field_used.as_deref().unwrap_or(NOT_AVAILABLE)),
        TooltipLine::new("Quality", if quote.is_error { "Error" } else { "OK" }),
    ]
}

/// Terminal page: London spot and COMEX futures slots
///
/// Quotes absent from the snapshot leave their slot untouched.
pub fn apply_prices<S: Surface>(surface: &mut S, snapshot: &PriceSnapshot) {
    for (exchange, metal) in TERMINAL_PRICES {
        if let Some(quote) = snapshot.get(exchange, metal) {
            update_value(
                surface,
                Slot::Price(exchange, metal),
                quote.value_for(exchange, metal),
                Some(quote),
            );
        }
    }
}

/// Terminal page: one EFP line per metal
pub fn apply_efp<S: Surface>(surface: &mut S, snapshot: &PriceSnapshot) {
    for metal in Metal::ALL {
        let slot = Slot::Efp(metal);
        let spread = calc_efp(snapshot, metal);
        let body = match spread {
            Spread::Value { value, .. } => format_signed(value, efp_decimals(metal)),
            Spread::Unavailable(unavailable) => unavailable.reason().to_string(),
        };
        surface.set_text(slot, format!("{} EFP: {}", metal.label(), body));
        apply_spread_classes(surface, slot, &spread);
    }
}

/// Monitor page: Shanghai premiums, silver EFP and the cross-rate in use
pub fn apply_premiums<S: Surface>(surface: &mut S, snapshot: &PriceSnapshot) {
    let rate = usd_cny_rate(snapshot);
    surface.set_text(
        Slot::CrossRate,
        format!(
            "USD/CNY {:.4} ({})",
            rate.rate,
            if rate.implied { "implied" } else { "fallback" }
        ),
    );
    surface.set_class(Slot::CrossRate, Class::Muted, !rate.implied);

    for metal in PREMIUM_METALS {
        let slot = Slot::Premium(metal);
        let spread = calc_premium(snapshot, metal, rate);
        let text = match spread {
            Spread::Value { value, .. } => format_percent(value),
            Spread::Unavailable(unavailable) => unavailable.reason().to_string(),
        };
        surface.set_text(slot, text);
        apply_spread_classes(surface, slot, &spread);
    }

    let slot = Slot::Efp(Metal::Silver);
    let spread = calc_efp(snapshot, Metal::Silver);
    let text = match spread {
        // "+$0.123" / "$-0.100"
        Spread::Value { value, .. } => {
            let sign = if value > 0.0 { "+" } else { "" };
            format!("{}${}", sign, format_number(Some(value), 3))
        }
        Spread::Unavailable(unavailable) => unavailable.reason().to_string(),
    };
    surface.set_text(slot, text);
    apply_spread_classes(surface, slot, &spread);
}

fn apply_spread_classes<S: Surface>(surface: &mut S, slot: Slot, spread: &Spread) {
    let (up, down, warning, muted) = match spread {
        Spread::Value { suspicious: true, .. } => (false, false, true, false),
        Spread::Value { value, .. } => match Direction::from_sign(*value) {
            Direction::Up => (true, false, false, false),
            Direction::Down => (false, true, false, false),
            Direction::Flat => (false, false, false, false),
        },
        Spread::Unavailable(_) => (false, false, false, true),
    };
    surface.set_class(slot, Class::Up, up);
    surface.set_class(slot, Class::Down, down);
    surface.set_class(slot, Class::Warning, warning);
    surface.set_class(slot, Class::Muted, muted);

    let tooltip = if warning {
        vec![TooltipLine::new("Warning", SUSPICIOUS_BASIS_HINT)]
    } else {
        Vec::new()
    };
    surface.set_tooltip(slot, tooltip);
}

/// Labels for the two quantity slots of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLabels {
    pub registered: &'static str,
    pub registered_hint: &'static str,
    pub eligible: &'static str,
    pub eligible_hint: &'static str,
}

/// LME reports warrants; every other source reports registered/eligible
pub fn slot_labels(record: &InventoryRecord) -> SlotLabels {
    if record.is_lme() {
        SlotLabels {
            registered: "On-Warrant",
            registered_hint: "Warrants still live in the LME system and available for delivery.",
            eligible: "Cancelled",
            eligible_hint: "Warrants cancelled for physical withdrawal; usually signals outflow.",
        }
    } else {
        SlotLabels {
            registered: "Registered",
            registered_hint: "Warranted metal available for delivery against futures at any time.",
            eligible: "Eligible",
            eligible_hint: "Meets exchange quality standards but not yet warranted.",
        }
    }
}

/// First 16 characters of a file hash followed by `...`
pub fn short_hash(hash: &str) -> String {
    if hash.chars().count() > 16 {
        format!("{}...", hash.chars().take(16).collect::<String>())
    } else {
        hash.to_string()
    }
}

/// Build a complete card for one venue × metal record
pub fn build_inventory_card(metal: Metal, record: &InventoryRecord) -> InventoryCard {
    let labels = slot_labels(record);
    let or_na = |value: Option<&str>| value.unwrap_or(NOT_AVAILABLE).to_string();

    let stats = vec![
        StatRow {
            label: labels.registered,
            hint: labels.registered_hint,
            value: format_number(record.registered_oz, 2),
        },
        StatRow {
            label: labels.eligible,
            hint: labels.eligible_hint,
            value: format_number(record.eligible_oz, 2),
        },
    ];

    let mut audit = vec![
        AuditRow { label: "Source", value: or_na(record.source.as_deref()) },
        AuditRow { label: "Report", value: or_na(record.source_url.as_deref()) },
        AuditRow { label: "Report date", value: or_na(record.report_date.as_deref()) },
        AuditRow { label: "Fetched at", value: or_na(record.fetched_at.as_deref()) },
        AuditRow { label: "Field", value: or_na(record.field()) },
        AuditRow { label: "Cell ref", value: or_na(record.cell_ref.as_deref()) },
        AuditRow {
            label: "SHA-256",
            value: record.file_hash.as_deref().map(short_hash).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        },
        AuditRow {
            label: "Quality",
            value: or_na(record.quality.as_ref().map(|quality| quality.label())),
        },
    ];
    if let Some(mapping) = &record.mapping {
        audit.push(AuditRow { label: "Validation", value: mapping.clone() });
    }

    InventoryCard {
        metal,
        source: or_na(record.source.as_deref()),
        unit: record
            .unit
            .clone()
            .unwrap_or_else(|| metal.default_inventory_unit().to_string()),
        total: format_number(record.total_oz, 2),
        stats,
        audit,
        quality: record.quality.clone(),
        tone: record
            .quality
            .as_ref()
            .map(|quality| quality.severity())
            .unwrap_or(Severity::Warning),
        file_hash: record.file_hash.clone(),
        mapping: record.mapping.clone(),
    }
}

/// Rebuild every card of the given venues and their asOf dates
pub fn apply_inventory<S: Surface>(
    surface: &mut S,
    snapshot: &InventorySnapshot,
    venues: &[InventoryVenue],
) {
    for &venue in venues {
        let cards = snapshot
            .venue(venue)
            .iter()
            .map(|(metal, record)| build_inventory_card(*metal, record))
            .collect();
        surface.set_cards(venue, cards);

        if let Some(date) = snapshot.report_date(venue) {
            surface.set_text(Slot::InventoryDate(venue), format!("asOf: {}", date));
        }
    }
}

/// Rebuild the monitor's ticker from the fixed market list
pub fn build_ticker(snapshot: &PriceSnapshot) -> Vec<TickerEntry> {
    TICKER_MARKETS
        .iter()
        .filter_map(|&(label, exchange, metal)| {
            let quote = snapshot.get(exchange, metal)?;
            let decimals = if metal == Metal::Silver { 3 } else { 2 };
            Some(TickerEntry {
                label,
                source: quote.source.clone().unwrap_or_default(),
                price: format_number(quote.value_for(exchange, metal), decimals),
                currency: exchange.quote_currency(),
                update_time: quote.update_time().to_string(),
                is_error: quote.is_error,
            })
        })
        .collect()
}

/// API status and last-update slots
pub fn apply_status<S: Surface>(
    surface: &mut S,
    connectivity: Connectivity,
    last_update: Option<DateTime<Local>>,
) {
    let online = connectivity == Connectivity::Online;
    surface.set_text(
        Slot::ApiStatus,
        if online { "● Online" } else { "● Disconnected" }.to_string(),
    );
    surface.set_class(Slot::ApiStatus, Class::Up, online);
    surface.set_class(Slot::ApiStatus, Class::Down, !online);

    if let Some(at) = last_update {
        surface.set_text(
            Slot::LastUpdate,
            format!("Last update: {}", at.format("%H:%M:%S")),
        );
    }
}

pub fn apply_clock<S: Surface>(surface: &mut S, now: DateTime<Local>) {
    surface.set_text(Slot::Clock, format!("System time: {}", now.format("%H:%M:%S")));
}

/// Merge one poll update into the surface
///
/// Failed reads leave whatever is displayed untouched and flip the status to
/// disconnected; successful reads are applied independently.
pub fn apply_poll_update<S: Surface>(surface: &mut S, update: &PollUpdate) {
    if let Ok(prices) = &update.prices {
        match update.target {
            PollTarget::Terminal => {
                apply_prices(surface, prices);
                apply_efp(surface, prices);
            }
            PollTarget::Monitor => {
                surface.set_ticker(build_ticker(prices));
                apply_premiums(surface, prices);
            }
        }
    }

    if let Ok(inventory) = &update.inventory {
        let venues: &[InventoryVenue] = match update.target {
            PollTarget::Terminal => &TERMINAL_VENUES,
            PollTarget::Monitor => &InventoryVenue::ALL,
        };
        apply_inventory(surface, inventory, venues);
    }

    if update.is_healthy() {
        apply_status(surface, Connectivity::Online, Some(update.received_at));
    } else {
        apply_status(surface, Connectivity::Disconnected, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ApiError;
    use crate::shared::surface::Board;
    use crate::shared::types::DataQuality;

    fn spot(price: f64) -> PriceQuote {
        PriceQuote {
            spot_price: Some(price),
            price: Some(price),
            source: Some("LBMA".to_string()),
            provider_as_of: Some("2026-01-20 10:31:02".to_string()),
            field_used: Some("spot".to_string()),
            ..Default::default()
        }
    }

    fn futures(price: f64) -> PriceQuote {
        PriceQuote {
            futures_price: Some(price),
            price: Some(price),
            source: Some("CME".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_update_value_direction() {
        let slot = Slot::Price(Exchange::London, Metal::Gold);
        let mut board = Board::new().with_unit(slot, "USD/oz");

        update_value(&mut board, slot, Some(2034.1), None);
        assert_eq!(board.text(slot), Some("$2,034.10"));
        assert!(!board.has(slot, Class::Up));
        assert!(!board.has(slot, Class::Down));

        update_value(&mut board, slot, Some(2036.0), None);
        assert!(board.has(slot, Class::Up));

        update_value(&mut board, slot, Some(2030.0), None);
        assert!(!board.has(slot, Class::Up));
        assert!(board.has(slot, Class::Down));

        update_value(&mut board, slot, Some(2030.0), None);
        assert!(!board.has(slot, Class::Up));
        assert!(!board.has(slot, Class::Down));

        assert_eq!(board.cell(slot).unwrap().unit.as_deref(), Some("USD/oz"));
        assert_eq!(board.debug_key(slot), Some("gold"));
    }

    #[test]
    fn test_update_value_flags_errors_with_tooltip() {
        let slot = Slot::Price(Exchange::Comex, Metal::Silver);
        let mut board = Board::new();
        let quote = PriceQuote { is_error: true, ..futures(24.3) };

        update_value(&mut board, slot, Some(24.3), Some(&quote));

        let cell = board.cell(slot).unwrap();
        assert!(cell.has(Class::Error));
        assert_eq!(cell.tooltip[0], TooltipLine::new("Source", "CME"));
        assert_eq!(cell.tooltip[1], TooltipLine::new("Time", "N/A"));
        assert_eq!(cell.tooltip[3], TooltipLine::new("Quality", "Error"));

        update_value(&mut board, slot, Some(24.3), Some(&futures(24.3)));
        assert!(!board.has(slot, Class::Error));
    }

    #[test]
    fn test_missing_ny_silver_efp_is_muted() {
        let mut snapshot = PriceSnapshot::default();
        snapshot.insert(Exchange::London, Metal::Silver, spot(24.0));
        let mut board = Board::new();

        apply_efp(&mut board, &snapshot);

        let slot = Slot::Efp(Metal::Silver);
        assert_eq!(board.text(slot), Some("Silver EFP: NY missing"));
        assert!(board.has(slot, Class::Muted));
        assert!(!board.has(slot, Class::Up));
        assert!(!board.has(slot, Class::Down));
    }

    #[test]
    fn test_efp_text_and_classes() {
        let mut snapshot = PriceSnapshot::default();
        snapshot.insert(Exchange::London, Metal::Silver, spot(24.10));
        snapshot.insert(Exchange::Comex, Metal::Silver, futures(24.35));
        snapshot.insert(Exchange::London, Metal::Gold, spot(2000.0));
        snapshot.insert(Exchange::Comex, Metal::Gold, futures(2300.0));
        snapshot.insert(Exchange::London, Metal::Copper, spot(9800.0));
        snapshot.insert(
            Exchange::Comex,
            Metal::Copper,
            PriceQuote { is_error: true, ..futures(4.5) },
        );
        let mut board = Board::new();

        apply_efp(&mut board, &snapshot);

        assert_eq!(board.text(Slot::Efp(Metal::Silver)), Some("Silver EFP: +0.250"));
        assert!(board.has(Slot::Efp(Metal::Silver), Class::Up));

        assert_eq!(board.text(Slot::Efp(Metal::Gold)), Some("Gold EFP: +300.00"));
        assert!(board.has(Slot::Efp(Metal::Gold), Class::Warning));
        assert_eq!(
            board.cell(Slot::Efp(Metal::Gold)).unwrap().tooltip,
            vec![TooltipLine::new("Warning", SUSPICIOUS_BASIS_HINT)]
        );

        assert_eq!(board.text(Slot::Efp(Metal::Copper)), Some("Copper EFP: data error"));
        assert!(board.has(Slot::Efp(Metal::Copper), Class::Muted));
    }

    #[test]
    fn test_premiums() {
        let mut snapshot = PriceSnapshot::default();
        snapshot.insert(Exchange::London, Metal::Gold, spot(2000.0));
        snapshot.insert(Exchange::Shanghai, Metal::Gold, spot(460.0));
        snapshot.insert(Exchange::London, Metal::Silver, spot(24.0));
        snapshot.insert(Exchange::Shanghai, Metal::Silver, spot(5500.0));
        snapshot.insert(Exchange::Comex, Metal::Silver, futures(23.9));
        let mut board = Board::new();

        apply_premiums(&mut board, &snapshot);

        assert_eq!(board.text(Slot::Premium(Metal::Silver)), Some("-0.36%"));
        assert!(board.has(Slot::Premium(Metal::Silver), Class::Down));
        assert_eq!(board.text(Slot::Premium(Metal::Copper)), Some("SHFE missing"));
        assert!(board.has(Slot::Premium(Metal::Copper), Class::Muted));
        assert_eq!(board.text(Slot::Efp(Metal::Silver)), Some("$-0.100"));
        assert!(board.has(Slot::Efp(Metal::Silver), Class::Down));
        assert_eq!(board.text(Slot::CrossRate), Some("USD/CNY 7.1538 (implied)"));
    }

    #[test]
    fn test_inventory_card_tone_and_labels() {
        struct TestCase {
            input: InventoryRecord,
            expected_tone: Severity,
            expected_registered: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: realtime COMEX record
                input: InventoryRecord {
                    source: Some("CME".to_string()),
                    quality: Some(DataQuality::Realtime),
                    ..Default::default()
                },
                expected_tone: Severity::Ok,
                expected_registered: "Registered",
            },
            TestCase {
                // TC1: stale LME record uses warrant labels
                input: InventoryRecord {
                    source: Some("LME".to_string()),
                    quality: Some(DataQuality::Stale),
                    ..Default::default()
                },
                expected_tone: Severity::Warning,
                expected_registered: "On-Warrant",
            },
            TestCase {
                // TC2: deviation between sources
                input: InventoryRecord {
                    source: Some("CME".to_string()),
                    quality: Some(DataQuality::ErrorDiff),
                    ..Default::default()
                },
                expected_tone: Severity::Error,
                expected_registered: "Registered",
            },
            TestCase {
                // TC3: unknown contract spec
                input: InventoryRecord {
                    source: Some("LME".to_string()),
                    quality: Some(DataQuality::UnknownSpec),
                    ..Default::default()
                },
                expected_tone: Severity::Error,
                expected_registered: "On-Warrant",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let card = build_inventory_card(Metal::Silver, &test.input);
            assert_eq!(card.tone, test.expected_tone, "TC{} failed", index);
            assert_eq!(card.stats[0].label, test.expected_registered, "TC{} failed", index);
        }
    }

    #[test]
    fn test_inventory_card_provenance() {
        let record = InventoryRecord {
            total_oz: Some(281234.567),
            registered_oz: Some(120.1),
            eligible_oz: None,
            source: Some("CME".to_string()),
            source_url: Some("https://www.cmegroup.com/delivery_reports/Silver_stocks.xls".to_string()),
            file_hash: Some("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08".to_string()),
            mapping: Some("total = registered + eligible".to_string()),
            quality: Some(DataQuality::Realtime),
            ..Default::default()
        };

        let card = build_inventory_card(Metal::Silver, &record);

        assert_eq!(card.total, "281,234.57");
        assert_eq!(card.unit, "Moz");
        assert_eq!(card.stats[1].value, "--.--");
        let audit = |label: &str| {
            card.audit
                .iter()
                .find(|row| row.label == label)
                .map(|row| row.value.clone())
        };
        assert_eq!(audit("SHA-256").as_deref(), Some("9f86d081884c7d65..."));
        assert_eq!(audit("Report date").as_deref(), Some("N/A"));
        assert_eq!(audit("Quality").as_deref(), Some("Realtime"));
        assert_eq!(audit("Validation").as_deref(), Some("total = registered + eligible"));
    }

    #[test]
    fn test_inventory_cards_replaced_wholesale() {
        let mut snapshot = InventorySnapshot::default();
        snapshot.comex.insert(Metal::Silver, InventoryRecord::default());
        snapshot.comex.insert(Metal::Gold, InventoryRecord::default());
        let mut board = Board::new();

        apply_inventory(&mut board, &snapshot, &TERMINAL_VENUES);
        assert_eq!(board.cards(InventoryVenue::Comex).len(), 2);

        snapshot.comex.remove(&Metal::Gold);
        apply_inventory(&mut board, &snapshot, &TERMINAL_VENUES);
        assert_eq!(board.cards(InventoryVenue::Comex).len(), 1);
        assert_eq!(board.cards(InventoryVenue::Comex)[0].metal, Metal::Silver);
    }

    #[test]
    fn test_ticker() {
        let mut snapshot = PriceSnapshot::default();
        snapshot.insert(Exchange::London, Metal::Silver, spot(24.1234));
        snapshot.insert(
            Exchange::Shanghai,
            Metal::Copper,
            PriceQuote { price: Some(66010.0), ..Default::default() },
        );

        let ticker = build_ticker(&snapshot);

        assert_eq!(ticker.len(), 2);
        assert_eq!(ticker[0].label, "London Silver");
        assert_eq!(ticker[0].price, "24.123");
        assert_eq!(ticker[0].currency, "USD");
        assert_eq!(ticker[0].update_time, "10:31:02");
        assert_eq!(ticker[1].label, "SHFE Copper");
        assert_eq!(ticker[1].price, "66,010.00");
        assert_eq!(ticker[1].currency, "CNY");
        assert_eq!(ticker[1].update_time, "--:--");
    }

    #[test]
    fn test_failed_update_keeps_prices() {
        let slot = Slot::Price(Exchange::London, Metal::Silver);
        let mut board = Board::new();
        let mut snapshot = PriceSnapshot::default();
        snapshot.insert(Exchange::London, Metal::Silver, spot(24.0));

        let healthy = PollUpdate {
            seq: 1,
            target: PollTarget::Terminal,
            received_at: Local::now(),
            prices: Ok(snapshot),
            inventory: Ok(InventorySnapshot::default()),
        };
        apply_poll_update(&mut board, &healthy);
        assert_eq!(board.text(slot), Some("$24.00"));
        assert_eq!(board.text(Slot::ApiStatus), Some("● Online"));
        assert!(board.text(Slot::LastUpdate).is_some());

        let failed = PollUpdate {
            seq: 2,
            prices: Err(ApiError::Transport("connection refused".to_string())),
            inventory: Err(ApiError::Http { status: 500, message: None }),
            ..healthy
        };
        apply_poll_update(&mut board, &failed);
        assert_eq!(board.text(slot), Some("$24.00"));
        assert_eq!(board.text(Slot::ApiStatus), Some("● Disconnected"));
        assert!(board.has(Slot::ApiStatus, Class::Down));
    }

    #[test]
    fn test_monitor_update_fills_all_venues() {
        let mut prices = PriceSnapshot::default();
        prices.insert(Exchange::London, Metal::Gold, spot(2000.0));
        prices.insert(Exchange::Shanghai, Metal::Gold, spot(460.0));
        prices.insert(Exchange::London, Metal::Silver, spot(24.10));
        prices.insert(Exchange::Comex, Metal::Silver, futures(24.35));
        prices.insert(Exchange::Shanghai, Metal::Silver, spot(5500.0));
        prices.insert(Exchange::London, Metal::Copper, spot(9100.0));
        prices.insert(Exchange::Shanghai, Metal::Copper, spot(66000.0));

        let mut inventory = InventorySnapshot::default();
        inventory.comex.insert(Metal::Silver, InventoryRecord::default());
        inventory.lme.insert(
            Metal::Copper,
            InventoryRecord { source: Some("LME".to_string()), ..Default::default() },
        );
        inventory.shfe.insert(
            Metal::Silver,
            InventoryRecord {
                source: Some("SHFE".to_string()),
                report_date: Some("2026-01-19".to_string()),
                quality: Some(DataQuality::Mocked),
                ..Default::default()
            },
        );

        let update = PollUpdate {
            seq: 1,
            target: PollTarget::Monitor,
            received_at: Local::now(),
            prices: Ok(prices),
            inventory: Ok(inventory),
        };
        let mut board = Board::new();
        apply_poll_update(&mut board, &update);

        for venue in InventoryVenue::ALL {
            assert_eq!(board.cards(venue).len(), 1, "{} cards", venue.label());
        }
        let shfe = &board.cards(InventoryVenue::Shfe)[0];
        assert_eq!(shfe.tone, Severity::Warning);
        assert_eq!(shfe.stats[0].label, "Registered");
        assert_eq!(board.cards(InventoryVenue::Lme)[0].stats[0].label, "On-Warrant");
        assert_eq!(
            board.text(Slot::InventoryDate(InventoryVenue::Shfe)),
            Some("asOf: 2026-01-19")
        );

        let labels: Vec<_> = board.ticker().iter().map(|entry| entry.label).collect();
        assert_eq!(
            labels,
            vec![
                "London Gold",
                "London Silver",
                "London Copper",
                "COMEX Silver",
                "SHFE Silver",
                "SHFE Copper",
            ]
        );

        assert_eq!(board.text(Slot::Premium(Metal::Silver)), Some("-0.78%"));
        assert!(board.has(Slot::Premium(Metal::Silver), Class::Down));
        assert_eq!(board.text(Slot::Premium(Metal::Copper)), Some("+1.38%"));
        assert!(board.has(Slot::Premium(Metal::Copper), Class::Up));
        assert_eq!(board.text(Slot::Efp(Metal::Silver)), Some("+$0.250"));
        assert_eq!(board.text(Slot::CrossRate), Some("USD/CNY 7.1538 (implied)"));

        // Terminal-only slots stay empty on the monitor
        assert_eq!(board.text(Slot::Price(Exchange::London, Metal::Silver)), None);
        assert_eq!(board.text(Slot::Efp(Metal::Gold)), None);
        assert_eq!(board.text(Slot::ApiStatus), Some("● Online"));
    }

    #[test]
    fn test_unknown_quality_tag_is_shown_verbatim() {
        let record: InventoryRecord = serde_json::from_str(
            r#"{"source": "CME", "quality": "PENDING_AUDIT", "total_oz": 12.5}"#,
        )
        .unwrap();

        let card = build_inventory_card(Metal::Gold, &record);

        assert_eq!(card.tone, Severity::Error);
        let quality = card.audit.iter().find(|row| row.label == "Quality").unwrap();
        assert_eq!(quality.value, "PENDING_AUDIT");
    }
}
