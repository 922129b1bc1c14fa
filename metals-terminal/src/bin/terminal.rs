/// Metals Terminal
///
/// London spot vs COMEX futures for gold, silver and copper with EFP spreads,
/// COMEX/LME warehouse inventory cards and a debug overlay for the raw backend
/// record behind the selected row.
use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseEventKind};
use metals_terminal::shared::config::{env_millis, init_logging};
use metals_terminal::shared::debug::load;
use metals_terminal::shared::tui::{install_panic_hook, restore_terminal, setup_terminal};
use metals_terminal::shared::widget::{
    render_debug_overlay, render_detail_panel, render_inventory_panel, render_price_table,
    render_status_bar, ROW_METALS,
};
use metals_terminal::{
    apply_poll_update, ApiClient, ApiConfig, Board, DebugFetch, DebugOverlay, Exchange,
    InventoryVenue, MarketDataSource, Metal, PollTarget, Poller, PollerConfig, SequenceGate, Slot,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use tokio::sync::mpsc;
use tracing::info;

/// Board with the static unit labels of the price table
fn new_board() -> Board {
    let mut board = Board::new();
    for metal in ROW_METALS {
        let london = if metal == Metal::Copper { "USD/t" } else { "USD/oz" };
        let comex = if metal == Metal::Copper { "USD/lb" } else { "USD/oz" };
        board = board
            .with_unit(Slot::Price(Exchange::London, metal), london)
            .with_unit(Slot::Price(Exchange::Comex, metal), comex);
    }
    board
}

struct App {
    board: Board,
    gate: SequenceGate,
    overlay: DebugOverlay,
    selected: usize,
    auto_refresh: bool,
}

impl App {
    fn selected_metal(&self) -> Metal {
        ROW_METALS[self.selected]
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging("metals-terminal.log")?;

    let config = ApiConfig::from_env();
    info!("Backend at {}", config.base_url);
    let source: Arc<dyn MarketDataSource> = Arc::new(ApiClient::with_config(config));

    let period = env_millis("METALS_POLL_MS").unwrap_or(Duration::from_secs(1));
    let (mut poller, mut update_rx) =
        Poller::new(Arc::clone(&source), PollTarget::Terminal, PollerConfig::new(period));
    poller.start();

    let (debug_tx, mut debug_rx) = mpsc::channel::<DebugFetch>(4);

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let mut app = App {
        board: new_board(),
        gate: SequenceGate::new(),
        overlay: DebugOverlay::new(),
        selected: 0,
        auto_refresh: true,
    };

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    loop {
        while let Ok(update) = update_rx.try_recv() {
            if app.gate.admit(update.seq) {
                apply_poll_update(&mut app.board, &update);
            }
        }
        while let Ok(fetch) = debug_rx.try_recv() {
            app.overlay.apply(fetch);
        }

        if dirty || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| render_ui(f, &mut app))?;
            last_tick = Instant::now();
            dirty = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if !event::poll(timeout)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc if app.overlay.is_open() => app.overlay.close(),
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => poller.trigger(),
                KeyCode::Char('a') => {
                    app.auto_refresh = poller.toggle();
                    info!("Auto refresh {}", if app.auto_refresh { "on" } else { "off" });
                }
                KeyCode::Up if app.overlay.is_open() => app.overlay.scroll_by(-1),
                KeyCode::Down if app.overlay.is_open() => app.overlay.scroll_by(1),
                KeyCode::Up => app.selected = app.selected.saturating_sub(1),
                KeyCode::Down => app.selected = (app.selected + 1).min(ROW_METALS.len() - 1),
                KeyCode::Char('d') | KeyCode::Enter => {
                    let metal = app.selected_metal();
                    let key = app
                        .board
                        .debug_key(Slot::Price(Exchange::London, metal))
                        .unwrap_or(metal.as_str())
                        .to_string();
                    app.overlay.open(key.clone());

                    let source = Arc::clone(&source);
                    let tx = debug_tx.clone();
                    tokio::spawn(async move {
                        let fetch = load(source.as_ref(), key).await;
                        let _ = tx.send(fetch).await;
                    });
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(_) = mouse.kind {
                    app.overlay.handle_click(mouse.column, mouse.row);
                }
            }
            _ => {}
        }
        dirty = true;
    }

    poller.stop();
    restore_terminal(&mut terminal)?;
    Ok(())
}

fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[0]);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let metal = app.selected_metal();
    render_price_table(f, top[0], &app.board, app.selected);
    render_detail_panel(f, top[1], &app.board, metal);
    render_inventory_panel(f, middle[0], &app.board, InventoryVenue::Comex, Some(metal));
    render_inventory_panel(f, middle[1], &app.board, InventoryVenue::Lme, Some(metal));
    render_status_bar(
        f,
        chunks[2],
        &app.board,
        app.auto_refresh,
        "q quit  r refresh  a auto  ↑/↓ select  d debug",
    );

    if let Some(bounds) = render_debug_overlay(f, &app.overlay) {
        app.overlay.set_bounds(bounds);
    }
}
