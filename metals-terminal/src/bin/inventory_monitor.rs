/// Inventory Monitor
///
/// Market ticker across London, COMEX and SHFE, warehouse inventory aggregated
/// over COMEX/LME/SHFE, and the Shanghai premium / silver EFP spreads.
use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use metals_terminal::shared::config::{env_millis, init_logging};
use metals_terminal::shared::tui::{install_panic_hook, restore_terminal, setup_terminal};
use metals_terminal::shared::widget::{
    render_inventory_panel, render_premium_panel, render_status_bar, render_ticker,
};
use metals_terminal::{
    apply_clock, apply_poll_update, ApiClient, ApiConfig, Board, InventoryVenue,
    MarketDataSource, PollTarget, Poller, PollerConfig, SequenceGate,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging("inventory-monitor.log")?;

    let config = ApiConfig::from_env();
    info!("Backend at {}", config.base_url);
    let source: Arc<dyn MarketDataSource> = Arc::new(ApiClient::with_config(config));

    let period = env_millis("METALS_POLL_MS").unwrap_or(Duration::from_secs(2));
    let (mut poller, mut update_rx) =
        Poller::new(source, PollTarget::Monitor, PollerConfig::new(period));
    poller.start();

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let mut board = Board::new();
    let mut gate = SequenceGate::new();
    let mut auto_refresh = true;

    // Clock ticks every second independently of the poll period
    let tick_rate = Duration::from_secs(1);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        while let Ok(update) = update_rx.try_recv() {
            if gate.admit(update.seq) {
                apply_poll_update(&mut board, &update);
                dirty = true;
            }
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            apply_clock(&mut board, Local::now());
            terminal.draw(|f| render_ui(f, &board, auto_refresh))?;
            last_tick = Instant::now();
            dirty = false;
        }

        // Wake often enough to pick up poll updates between clock ticks
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0))
            .min(Duration::from_millis(200));
        if !event::poll(timeout)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => poller.trigger(),
                KeyCode::Char('a') => {
                    auto_refresh = poller.toggle();
                    info!("Auto refresh {}", if auto_refresh { "on" } else { "off" });
                }
                _ => {}
            }
            dirty = true;
        }
    }

    poller.stop();
    restore_terminal(&mut terminal)?;
    Ok(())
}

fn render_ui(f: &mut Frame, board: &Board, auto_refresh: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    render_ticker(f, chunks[0], board);
    for (area, venue) in body.iter().zip(InventoryVenue::ALL) {
        render_inventory_panel(f, *area, board, venue, None);
    }
    render_premium_panel(f, body[3], board);
    render_status_bar(f, chunks[2], board, auto_refresh, "q quit  r refresh  a auto");
}
