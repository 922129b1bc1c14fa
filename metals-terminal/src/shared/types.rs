/// Core data types for backend payloads
///
/// These types match the JSON envelopes served by the metals backend
/// at http://127.0.0.1:5000/api

use crate::shared::error::ApiError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Price venue as keyed in `/price/latest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Exchange {
    London,
    Comex,
    Shanghai,
}

impl Exchange {
    pub const ALL: [Exchange; 3] = [Exchange::London, Exchange::Comex, Exchange::Shanghai];

    /// Convert to wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::London => "London",
            Exchange::Comex => "Comex",
            Exchange::Shanghai => "Shanghai",
        }
    }

    /// Short label used in spread reasons and row headers
    pub fn short_label(&self) -> &'static str {
        match self {
            Exchange::London => "London",
            Exchange::Comex => "NY",
            Exchange::Shanghai => "SHFE",
        }
    }

    /// Currency the venue quotes in
    pub fn quote_currency(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "CNY",
            _ => "USD",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metal as keyed in every payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Copper,
}

impl Metal {
    pub const ALL: [Metal; 3] = [Metal::Gold, Metal::Silver, Metal::Copper];

    /// Convert to wire string (also the debug key)
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
            Metal::Copper => "copper",
        }
    }

    /// Capitalised display label
    pub fn label(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
            Metal::Copper => "Copper",
        }
    }

    /// Unit used when an inventory record does not declare one
    pub fn default_inventory_unit(&self) -> &'static str {
        match self {
            Metal::Copper => "t",
            _ => "Moz",
        }
    }
}

impl std::fmt::Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Warehouse venue as keyed in the inventory payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryVenue {
    Comex,
    Lme,
    Shfe,
}

impl InventoryVenue {
    pub const ALL: [InventoryVenue; 3] = [InventoryVenue::Comex, InventoryVenue::Lme, InventoryVenue::Shfe];

    pub fn label(&self) -> &'static str {
        match self {
            InventoryVenue::Comex => "COMEX",
            InventoryVenue::Lme => "LME",
            InventoryVenue::Shfe => "SHFE",
        }
    }

    /// Section heading with the unit the venue reports in
    pub fn heading(&self) -> &'static str {
        match self {
            InventoryVenue::Comex => "CME (Moz)",
            InventoryVenue::Lme => "LME (t)",
            InventoryVenue::Shfe => "SHFE (t)",
        }
    }
}

/// Data quality tag attached by the backend collectors
///
/// Tags this dashboard does not know are kept verbatim in `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum DataQuality {
    Realtime,
    Stale,
    ErrorDiff,
    UnknownSpec,
    /// Simulated fallback served when a venue has no stored data
    Mocked,
    Delayed,
    Unrecognized(String),
}

impl From<String> for DataQuality {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "REALTIME" => DataQuality::Realtime,
            "STALE" => DataQuality::Stale,
            "ERROR_DIFF" => DataQuality::ErrorDiff,
            "UNKNOWN_SPEC" => DataQuality::UnknownSpec,
            "MOCKED" => DataQuality::Mocked,
            "DELAYED" => DataQuality::Delayed,
            _ => DataQuality::Unrecognized(tag),
        }
    }
}

impl From<DataQuality> for String {
    fn from(quality: DataQuality) -> Self {
        match quality {
            DataQuality::Realtime => "REALTIME".to_string(),
            DataQuality::Stale => "STALE".to_string(),
            DataQuality::ErrorDiff => "ERROR_DIFF".to_string(),
            DataQuality::UnknownSpec => "UNKNOWN_SPEC".to_string(),
            DataQuality::Mocked => "MOCKED".to_string(),
            DataQuality::Delayed => "DELAYED".to_string(),
            DataQuality::Unrecognized(tag) => tag,
        }
    }
}

/// Display severity derived from a quality tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Error,
}

impl DataQuality {
    pub fn severity(&self) -> Severity {
        match self {
            DataQuality::Realtime => Severity::Ok,
            DataQuality::Stale | DataQuality::Mocked | DataQuality::Delayed => Severity::Warning,
            DataQuality::ErrorDiff | DataQuality::UnknownSpec | DataQuality::Unrecognized(_) => {
                Severity::Error
            }
        }
    }

    /// Display label; unknown tags show the backend's own text
    pub fn label(&self) -> &str {
        match self {
            DataQuality::Realtime => "Realtime",
            DataQuality::Stale => "Stale",
            DataQuality::ErrorDiff => "Deviation",
            DataQuality::UnknownSpec => "Unknown spec",
            DataQuality::Mocked => "Simulated",
            DataQuality::Delayed => "Delayed",
            DataQuality::Unrecognized(tag) => tag.as_str(),
        }
    }
}

/// Single metal × exchange price point
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PriceQuote {
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub spot_price: Option<f64>,
    #[serde(default)]
    pub futures_price: Option<f64>,
    /// Backend compatibility field: spot or futures, whichever was stored
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_error: bool,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub provider_as_of: Option<String>,
    #[serde(default)]
    pub field_used: Option<String>,
    #[serde(default)]
    pub quality: Option<DataQuality>,
}

impl PriceQuote {
    /// Numeric value this quote contributes for the given venue
    ///
    /// Comex is read as futures, London as spot (copper prefers the LME
    /// futures leg), and every venue falls back to `price`.
    pub fn value_for(&self, exchange: Exchange, metal: Metal) -> Option<f64> {
        let preferred = match (exchange, metal) {
            (Exchange::Comex, _) => self.futures_price,
            (Exchange::London, Metal::Copper) => self.futures_price.or(self.spot_price),
            (Exchange::London, _) => self.spot_price,
            (Exchange::Shanghai, _) => None,
        };
        preferred.or(self.price).filter(|value| value.is_finite())
    }

    /// Time portion of `provider_as_of` ("2026-01-20 10:31:02" -> "10:31:02")
    pub fn update_time(&self) -> &str {
        match self.provider_as_of.as_deref() {
            Some(as_of) => as_of.split(' ').nth(1).filter(|t| !t.is_empty()).unwrap_or(as_of),
            None => "--:--",
        }
    }
}

/// Latest quotes keyed by exchange then metal
///
/// Unknown exchange or metal keys fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PriceSnapshot {
    pub quotes: BTreeMap<Exchange, BTreeMap<Metal, PriceQuote>>,
}

impl PriceSnapshot {
    pub fn get(&self, exchange: Exchange, metal: Metal) -> Option<&PriceQuote> {
        self.quotes.get(&exchange).and_then(|by_metal| by_metal.get(&metal))
    }

    /// Value of a quote that exists, is unflagged and carries a positive price
    pub fn usable_price(&self, exchange: Exchange, metal: Metal) -> Option<f64> {
        self.get(exchange, metal)
            .filter(|quote| !quote.is_error)
            .and_then(|quote| quote.value_for(exchange, metal))
            .filter(|value| *value > 0.0)
    }

    pub fn insert(&mut self, exchange: Exchange, metal: Metal, quote: PriceQuote) {
        self.quotes.entry(exchange).or_default().insert(metal, quote);
    }
}

/// Warehouse inventory snapshot with provenance
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InventoryRecord {
    #[serde(default)]
    pub total_oz: Option<f64>,
    /// Registered (COMEX) or on-warrant (LME)
    #[serde(default)]
    pub registered_oz: Option<f64>,
    /// Eligible (COMEX) or cancelled warrants (LME)
    #[serde(default)]
    pub eligible_oz: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub quality: Option<DataQuality>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<String>,
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub field_used: Option<String>,
    #[serde(default)]
    pub cell_ref: Option<String>,
    #[serde(default)]
    pub file_hash: Option<String>,
    /// Mapping / validation description, stored as text by the backend
    #[serde(default, deserialize_with = "deserialize_text")]
    pub mapping: Option<String>,
}

impl InventoryRecord {
    /// LME records use the warrant vocabulary for the two quantity slots
    pub fn is_lme(&self) -> bool {
        self.source
            .as_deref()
            .is_some_and(|source| source.eq_ignore_ascii_case("LME"))
    }

    /// Source field the figure was read from
    pub fn field(&self) -> Option<&str> {
        self.field_name.as_deref().or(self.field_used.as_deref())
    }
}

/// Inventory keyed by venue then metal
///
/// `/comex/latest` fills `comex` (and `lme` when stored), `/inventory/aggregated`
/// fills all three venues.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub comex: BTreeMap<Metal, InventoryRecord>,
    #[serde(default)]
    pub lme: BTreeMap<Metal, InventoryRecord>,
    #[serde(default)]
    pub shfe: BTreeMap<Metal, InventoryRecord>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InventorySnapshot {
    pub fn venue(&self, venue: InventoryVenue) -> &BTreeMap<Metal, InventoryRecord> {
        match venue {
            InventoryVenue::Comex => &self.comex,
            InventoryVenue::Lme => &self.lme,
            InventoryVenue::Shfe => &self.shfe,
        }
    }

    pub fn venue_mut(&mut self, venue: InventoryVenue) -> &mut BTreeMap<Metal, InventoryRecord> {
        match venue {
            InventoryVenue::Comex => &mut self.comex,
            InventoryVenue::Lme => &mut self.lme,
            InventoryVenue::Shfe => &mut self.shfe,
        }
    }

    /// Report date representing a venue (silver record first, then any)
    pub fn report_date(&self, venue: InventoryVenue) -> Option<&str> {
        let records = self.venue(venue);
        records
            .get(&Metal::Silver)
            .and_then(|record| record.report_date.as_deref())
            .or_else(|| records.values().find_map(|record| record.report_date.as_deref()))
    }
}

/// Raw backend record behind a displayed value
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DebugRecord {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub raw_payload: serde_json::Value,
    #[serde(default)]
    pub mapping: serde_json::Value,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub provider_as_of: Option<String>,
    #[serde(default)]
    pub field_used: Option<String>,
    #[serde(default)]
    pub quality: Option<DataQuality>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_error: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Backend response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope, treating `success:false` and a missing payload as errors
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        self.data.ok_or(ApiError::EmptyPayload)
    }
}

/// Accept `true/false`, `0/1` or null for error flags
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(flag)) => flag,
        Some(Flag::Int(flag)) => flag != 0,
        Some(Flag::Float(flag)) => flag != 0.0,
        None => false,
    })
}

/// Accept a string, or any other JSON value rendered as compact text
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) if text.is_empty() => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
