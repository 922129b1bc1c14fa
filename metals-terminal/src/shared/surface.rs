//! Display surface: the capability interface the update logic writes through
//!
//! [`Board`] is the in-memory implementation the ratatui widgets draw from;
//! update logic only sees [`Surface`], so it runs in tests without a terminal.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::shared::types::{DataQuality, Exchange, InventoryVenue, Metal, Severity};

/// Addressable display element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Price(Exchange, Metal),
    Efp(Metal),
    Premium(Metal),
    CrossRate,
    InventoryDate(InventoryVenue),
    ApiStatus,
    LastUpdate,
    Clock,
}

/// Visual state toggled on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Class {
    Up,
    Down,
    Error,
    Warning,
    Muted,
}

/// One `label: value` line of a slot's detail tooltip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipLine {
    pub label: &'static str,
    pub value: String,
}

impl TooltipLine {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

/// Quantity row of an inventory card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
}

/// Provenance row of an inventory card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub label: &'static str,
    pub value: String,
}

/// Fully rendered inventory card, replaced wholesale every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryCard {
    pub metal: Metal,
    pub source: String,
    pub unit: String,
    pub total: String,
    pub stats: Vec<StatRow>,
    pub audit: Vec<AuditRow>,
    pub quality: Option<DataQuality>,
    pub tone: Severity,
    pub file_hash: Option<String>,
    pub mapping: Option<String>,
}

/// Price ticker entry, rebuilt every cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerEntry {
    pub label: &'static str,
    pub source: String,
    pub price: String,
    pub currency: &'static str,
    pub update_time: String,
    pub is_error: bool,
}

/// Write capabilities the update logic needs
pub trait Surface {
    /// Text currently displayed in a slot
    fn text(&self, slot: Slot) -> Option<&str>;

    /// Replace a slot's text, leaving its unit label untouched
    fn set_text(&mut self, slot: Slot, text: String);

    fn set_class(&mut self, slot: Slot, class: Class, enabled: bool);

    fn set_tooltip(&mut self, slot: Slot, tooltip: Vec<TooltipLine>);

    /// Key the debug overlay fetches for this slot
    fn set_debug_key(&mut self, slot: Slot, key: &str);

    /// Replace every card of a venue
    fn set_cards(&mut self, venue: InventoryVenue, cards: Vec<InventoryCard>);

    /// Replace the whole ticker
    fn set_ticker(&mut self, entries: Vec<TickerEntry>);
}

/// Displayed state of one slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub unit: Option<String>,
    pub classes: BTreeSet<Class>,
    pub tooltip: Vec<TooltipLine>,
    pub debug_key: Option<String>,
}

impl Cell {
    pub fn has(&self, class: Class) -> bool {
        self.classes.contains(&class)
    }
}

/// In-memory surface drawn by the widgets
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: HashMap<Slot, Cell>,
    cards: BTreeMap<InventoryVenue, Vec<InventoryCard>>,
    ticker: Vec<TickerEntry>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a static unit label to a slot
    pub fn with_unit(mut self, slot: Slot, unit: impl Into<String>) -> Self {
        self.cells.entry(slot).or_default().unit = Some(unit.into());
        self
    }

    pub fn cell(&self, slot: Slot) -> Option<&Cell> {
        self.cells.get(&slot)
    }

    pub fn has(&self, slot: Slot, class: Class) -> bool {
        self.cell(slot).is_some_and(|cell| cell.has(class))
    }

    pub fn debug_key(&self, slot: Slot) -> Option<&str> {
        self.cell(slot).and_then(|cell| cell.debug_key.as_deref())
    }

    pub fn cards(&self, venue: InventoryVenue) -> &[InventoryCard] {
        self.cards.get(&venue).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ticker(&self) -> &[TickerEntry] {
        &self.ticker
    }
}

impl Surface for Board {
    fn text(&self, slot: Slot) -> Option<&str> {
        self.cells
            .get(&slot)
            .map(|cell| cell.text.as_str())
            .filter(|text| !text.is_empty())
    }

    fn set_text(&mut self, slot: Slot, text: String) {
        self.cells.entry(slot).or_default().text = text;
    }

    fn set_class(&mut self, slot: Slot, class: Class, enabled: bool) {
        let cell = self.cells.entry(slot).or_default();
        if enabled {
            cell.classes.insert(class);
        } else {
            cell.classes.remove(&class);
        }
    }

    fn set_tooltip(&mut self, slot: Slot, tooltip: Vec<TooltipLine>) {
        self.cells.entry(slot).or_default().tooltip = tooltip;
    }

    fn set_debug_key(&mut self, slot: Slot, key: &str) {
        self.cells.entry(slot).or_default().debug_key = Some(key.to_string());
    }

    fn set_cards(&mut self, venue: InventoryVenue, cards: Vec<InventoryCard>) {
        self.cards.insert(venue, cards);
    }

    fn set_ticker(&mut self, entries: Vec<TickerEntry>) {
        self.ticker = entries;
    }
}
