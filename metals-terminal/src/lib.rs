/// Metals Terminal - Shared Library
///
/// This library provides common functionality for the two TUI binaries:
/// - metals-terminal: London/COMEX prices, EFP spreads and COMEX/LME inventory
/// - inventory-monitor: market ticker, aggregated inventory and SHFE premiums
///
/// The library includes:
/// - Core data types for backend payloads
/// - HTTP client and interval poller for the metals backend
/// - Derived spreads (EFP, Shanghai premium)
/// - Display surface, update logic and ratatui widgets
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{
    DataQuality, DebugRecord, Exchange, InventoryRecord, InventorySnapshot, InventoryVenue, Metal,
    PriceQuote, PriceSnapshot, Severity,
};

pub use shared::api::{ApiClient, ApiConfig, MarketDataSource};
pub use shared::error::ApiError;
pub use shared::poller::{PollOutcome, PollTarget, PollUpdate, Poller, PollerConfig, SequenceGate};

pub use shared::metrics::{calc_efp, calc_premium, usd_cny_rate, CrossRate, Spread, Unavailable};

// Display layer (shared across both TUIs)
pub use shared::debug::{DebugFetch, DebugOverlay, OverlayState};
pub use shared::present::{apply_clock, apply_poll_update};
pub use shared::surface::{Board, Class, Slot, Surface};
