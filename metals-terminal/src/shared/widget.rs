//! Ratatui panels drawing a [`Board`]

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::shared::debug::{DebugOverlay, OverlayState};
use crate::shared::format::PLACEHOLDER;
use crate::shared::surface::{Board, Cell, Class, InventoryCard, Slot};
use crate::shared::types::{Exchange, InventoryVenue, Metal, Severity};

const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);

/// Row order of the price table
pub const ROW_METALS: [Metal; 3] = [Metal::Silver, Metal::Gold, Metal::Copper];

/// Color for a slot's class set; error and warning win over direction
fn class_color(cell: &Cell) -> Color {
    if cell.has(Class::Error) {
        C_SELL
    } else if cell.has(Class::Warning) {
        C_NEUTRAL
    } else if cell.has(Class::Muted) {
        C_DIM
    } else if cell.has(Class::Up) {
        C_BUY
    } else if cell.has(Class::Down) {
        C_SELL
    } else {
        C_BRIGHT
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Ok => C_BUY,
        Severity::Warning => C_NEUTRAL,
        Severity::Error => C_SELL,
    }
}

fn slot_text(board: &Board, slot: Slot) -> &str {
    board
        .cell(slot)
        .map(|cell| cell.text.as_str())
        .filter(|text| !text.is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn slot_span(board: &Board, slot: Slot) -> Span<'_> {
    let color = board.cell(slot).map(class_color).unwrap_or(C_DIM);
    Span::styled(slot_text(board, slot), Style::default().fg(color))
}

fn panel(title: &str, border: Color) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// London spot, COMEX futures and EFP per metal; the selected row is highlighted
pub fn render_price_table(f: &mut Frame, area: Rect, board: &Board, selected: usize) {
    let header = Row::new(["", "London spot", "COMEX futures", "EFP"].map(|h| {
        TableCell::from(h).style(Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD))
    }));

    let rows = ROW_METALS.iter().enumerate().map(|(index, &metal)| {
        let efp = board
            .cell(Slot::Efp(metal))
            .map(|cell| {
                // "Silver EFP: +0.250" -> "+0.250"
                let text = cell.text.split_once(": ").map(|(_, v)| v).unwrap_or(cell.text.as_str());
                Span::styled(text.to_string(), Style::default().fg(class_color(cell)))
            })
            .unwrap_or_else(|| Span::styled(PLACEHOLDER, Style::default().fg(C_DIM)));

        let unit = board
            .cell(Slot::Price(Exchange::London, metal))
            .and_then(|cell| cell.unit.clone())
            .unwrap_or_default();

        let row = Row::new(vec![
            TableCell::from(Line::from(vec![
                Span::styled(metal.label(), Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}", unit), Style::default().fg(C_DIM)),
            ])),
            TableCell::from(slot_span(board, Slot::Price(Exchange::London, metal))),
            TableCell::from(slot_span(board, Slot::Price(Exchange::Comex, metal))),
            TableCell::from(efp),
        ]);
        if index == selected {
            row.style(Style::default().add_modifier(Modifier::REVERSED))
        } else {
            row
        }
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(panel(" PRICES ", C_ACCENT));

    f.render_widget(table, area);
}

/// Tooltip lines of the selected row's quotes and EFP
pub fn render_detail_panel(f: &mut Frame, area: Rect, board: &Board, metal: Metal) {
    let mut lines = Vec::new();
    for (heading, slot) in [
        ("London", Slot::Price(Exchange::London, metal)),
        ("COMEX", Slot::Price(Exchange::Comex, metal)),
        ("EFP", Slot::Efp(metal)),
    ] {
        let Some(cell) = board.cell(slot) else {
            continue;
        };
        if cell.tooltip.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        )));
        for line in &cell.tooltip {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", line.label), Style::default().fg(C_DIM)),
                Span::styled(line.value.as_str(), Style::default().fg(C_BRIGHT)),
            ]));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No details yet", Style::default().fg(C_DIM))));
    }

    let title = format!(" {} DETAILS ", metal.label().to_uppercase());
    f.render_widget(
        Paragraph::new(lines)
            .block(panel(&title, C_DIM))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn card_lines(card: &InventoryCard, show_audit: bool) -> Vec<Line<'_>> {
    let tone = severity_color(card.tone);
    let quality = card.quality.as_ref().map(|q| q.label()).unwrap_or("N/A");

    let mut lines = vec![Line::from(vec![
        Span::styled(card.metal.label(), Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" [{}]", card.source), Style::default().fg(C_DIM)),
        Span::styled(format!(" ● {}", quality), Style::default().fg(tone)),
    ])];

    lines.push(Line::from(vec![
        Span::styled("  Total ", Style::default().fg(C_DIM)),
        Span::styled(card.total.as_str(), Style::default().fg(tone).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", card.unit), Style::default().fg(C_DIM)),
    ]));

    for stat in &card.stats {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<11}", stat.label), Style::default().fg(C_DIM)),
            Span::styled(stat.value.as_str(), Style::default().fg(C_BRIGHT)),
        ]));
    }

    if show_audit {
        for row in &card.audit {
            lines.push(Line::from(vec![
                Span::styled(format!("    {}: ", row.label), Style::default().fg(C_DIM)),
                Span::styled(row.value.as_str(), Style::default().fg(C_DIM)),
            ]));
        }
    }

    lines
}

/// One venue's inventory cards; the selected metal's card shows its audit rows
pub fn render_inventory_panel(
    f: &mut Frame,
    area: Rect,
    board: &Board,
    venue: InventoryVenue,
    audit_for: Option<Metal>,
) {
    let mut title = format!(" {} ", venue.heading());
    if let Some(cell) = board.cell(Slot::InventoryDate(venue)) {
        title.push_str(&format!("{} ", cell.text));
    }

    let cards = board.cards(venue);
    let mut lines = Vec::new();
    for card in cards {
        lines.extend(card_lines(card, audit_for == Some(card.metal)));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Waiting for inventory data...",
            Style::default().fg(C_DIM),
        )));
    }

    let border = cards
        .iter()
        .map(|card| card.tone)
        .max_by_key(|tone| match tone {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        })
        .map(severity_color)
        .unwrap_or(C_DIM);

    f.render_widget(
        Paragraph::new(lines)
            .block(panel(&title, border))
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Single-line scrolling-style ticker of every market
pub fn render_ticker(f: &mut Frame, area: Rect, board: &Board) {
    let mut spans = Vec::new();
    for entry in board.ticker() {
        let color = if entry.is_error { C_SELL } else { C_BRIGHT };
        spans.push(Span::styled(entry.label, Style::default().fg(C_ACCENT)));
        spans.push(Span::styled(
            format!(" {} {}", entry.price, entry.currency),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {} {}  │  ", entry.source, entry.update_time),
            Style::default().fg(C_DIM),
        ));
    }
    if spans.is_empty() {
        spans.push(Span::styled("Waiting for prices...", Style::default().fg(C_DIM)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans))
            .block(panel(" MARKETS ", C_ACCENT))
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Shanghai premiums, silver EFP and the cross-rate in use
pub fn render_premium_panel(f: &mut Frame, area: Rect, board: &Board) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(C_DIM));
    let lines = vec![
        Line::from(vec![label("Silver SHFE premium  "), slot_span(board, Slot::Premium(Metal::Silver))]),
        Line::from(vec![label("Copper SHFE premium  "), slot_span(board, Slot::Premium(Metal::Copper))]),
        Line::from(vec![label("Silver EFP           "), slot_span(board, Slot::Efp(Metal::Silver))]),
        Line::from(""),
        Line::from(slot_span(board, Slot::CrossRate)),
    ];

    f.render_widget(Paragraph::new(lines).block(panel(" SPREADS ", C_ACCENT)), area);
}

/// API status, last update, clock and key help
pub fn render_status_bar(f: &mut Frame, area: Rect, board: &Board, auto_refresh: bool, help: &str) {
    let mut spans = vec![slot_span(board, Slot::ApiStatus), Span::raw("  ")];
    if let Some(cell) = board.cell(Slot::LastUpdate) {
        spans.push(Span::styled(cell.text.as_str(), Style::default().fg(C_DIM)));
        spans.push(Span::raw("  "));
    }
    if let Some(cell) = board.cell(Slot::Clock) {
        spans.push(Span::styled(cell.text.as_str(), Style::default().fg(C_DIM)));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        if auto_refresh { "AUTO" } else { "PAUSED" },
        Style::default().fg(if auto_refresh { C_BUY } else { C_NEUTRAL }),
    ));
    spans.push(Span::styled(format!("  {}", help), Style::default().fg(C_DIM)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Rect of `percent_x` × `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Draw the overlay over everything else and return its bounds
pub fn render_debug_overlay(f: &mut Frame, overlay: &DebugOverlay) -> Option<Rect> {
    let title = overlay.title()?;
    let area = centered_rect(70, 70, f.area());

    let mut lines = Vec::new();
    match overlay.state() {
        OverlayState::Hidden => return None,
        OverlayState::Loading { .. } => {
            lines.push(Line::from(Span::styled("Loading...", Style::default().fg(C_DIM))));
        }
        OverlayState::Failed { message, .. } => {
            lines.push(Line::from(Span::styled(
                format!("Error: {}", message),
                Style::default().fg(C_SELL),
            )));
        }
        OverlayState::Loaded { mapping, payload, .. } => {
            lines.push(Line::from(Span::styled(
                "Mapping",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )));
            lines.extend(mapping.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Raw payload",
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            )));
            lines.extend(payload.lines().map(|l| Line::from(l.to_string())));
        }
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .block(panel(&format!(" {} (Esc to close) ", title), C_ACCENT))
            .scroll((overlay.scroll(), 0)),
        area,
    );
    Some(area)
}
