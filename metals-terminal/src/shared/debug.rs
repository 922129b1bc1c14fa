//! Debug overlay: the raw backend record behind a displayed value
//!
//! The overlay is a small state machine owned by the UI loop. Fetches run on a
//! separate task and come back as a [`DebugFetch`]; results for a key that is
//! no longer shown are dropped.

use ratatui::layout::{Position, Rect};
use serde_json::Value;
use tracing::{debug, warn};

use crate::shared::api::MarketDataSource;
use crate::shared::error::ApiError;
use crate::shared::types::DebugRecord;

/// Overlay display state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    Loading {
        key: String,
    },
    Loaded {
        key: String,
        mapping: String,
        payload: String,
    },
    Failed {
        key: String,
        message: String,
    },
}

/// Completed fetch for one key
#[derive(Debug, Clone, PartialEq)]
pub struct DebugFetch {
    pub key: String,
    pub result: Result<DebugRecord, ApiError>,
}

/// Fetch the raw record for a key; failures are carried in the result
pub async fn load(source: &dyn MarketDataSource, key: String) -> DebugFetch {
    let result = source.get_debug_raw(&key).await;
    if let Err(error) = &result {
        warn!(%key, %error, "debug fetch failed");
    }
    DebugFetch { key, result }
}

#[derive(Debug, Clone)]
pub struct DebugOverlay {
    state: OverlayState,
    bounds: Option<Rect>,
    scroll: u16,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self {
            state: OverlayState::Hidden,
            bounds: None,
            scroll: 0,
        }
    }
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    /// Key currently shown, if any
    pub fn key(&self) -> Option<&str> {
        match &self.state {
            OverlayState::Hidden => None,
            OverlayState::Loading { key }
            | OverlayState::Loaded { key, .. }
            | OverlayState::Failed { key, .. } => Some(key),
        }
    }

    /// "Debug Data: SILVER"
    pub fn title(&self) -> Option<String> {
        self.key()
            .map(|key| format!("Debug Data: {}", key.to_uppercase()))
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }

    /// Show the overlay in its loading state; the caller starts the fetch
    pub fn open(&mut self, key: impl Into<String>) {
        let key = key.into();
        debug!(%key, "debug overlay opened");
        self.state = OverlayState::Loading { key };
        self.scroll = 0;
    }

    pub fn close(&mut self) {
        self.state = OverlayState::Hidden;
        self.bounds = None;
        self.scroll = 0;
    }

    /// Apply a completed fetch, returning false when it was stale
    pub fn apply(&mut self, fetch: DebugFetch) -> bool {
        let pending = matches!(&self.state, OverlayState::Loading { key } if *key == fetch.key);
        if !pending {
            debug!(key = %fetch.key, "discarding stale debug fetch");
            return false;
        }

        self.state = match fetch.result {
            Ok(record) => OverlayState::Loaded {
                key: fetch.key,
                mapping: render_json(&record.mapping),
                payload: render_json(&record.raw_payload),
            },
            Err(error) => OverlayState::Failed {
                key: fetch.key,
                message: error.to_string(),
            },
        };
        true
    }

    /// Area the overlay was last drawn into
    pub fn set_bounds(&mut self, area: Rect) {
        self.bounds = Some(area);
    }

    /// Close on a click outside the drawn bounds; returns true when closed
    pub fn handle_click(&mut self, column: u16, row: u16) -> bool {
        if !self.is_open() {
            return false;
        }
        let inside = self
            .bounds
            .is_some_and(|bounds| bounds.contains(Position::new(column, row)));
        if !inside {
            self.close();
        }
        !inside
    }
}

/// Pretty-printed JSON; plain strings are shown as-is and null as "N/A"
fn render_json(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
