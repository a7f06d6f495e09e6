//! Service card list.
//!
//! Each roster service is drawn as a bordered card. The first inner row is
//! the header: disclosure control on the left, delete affordance (or the
//! inline confirmation) on the right. Expanded cards add a detail panel.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::aggregate::{latency_series, latest, uptime_blocks};
use crate::data::format::{format_date, format_latency, format_uptime};
use crate::engine::{CardView, ClickRegion};
use crate::ui::Theme;

/// Card height (including borders) when collapsed.
pub const COLLAPSED_HEIGHT: u16 = 3;
/// Card height (including borders) when expanded.
pub const EXPANDED_HEIGHT: u16 = 7;

const DISCLOSURE_WIDTH: u16 = 4;
const DELETE_WIDTH: u16 = 5;
const CONFIRM_WIDTH: u16 = 18;
const CONFIRM_PROMPT: &str = " Delete? ";

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn card_height(expanded: bool) -> u16 {
    if expanded {
        EXPANDED_HEIGHT
    } else {
        COLLAPSED_HEIGHT
    }
}

/// Map a click inside a card's rectangle to the region it hit.
///
/// Must agree with the header layout in [`render_card`].
pub fn region_at(column: u16, row: u16, card: Rect, pending: bool) -> ClickRegion {
    let inner = Block::default().borders(Borders::ALL).inner(card);
    if row != inner.y || column < inner.x || column >= inner.right() {
        return ClickRegion::Outside;
    }

    let right = inner.right();
    if pending {
        let surface = right.saturating_sub(CONFIRM_WIDTH);
        if column >= surface {
            let prompt = CONFIRM_PROMPT.len() as u16;
            return match column - surface {
                offset if (prompt..prompt + 3).contains(&offset) => ClickRegion::ConfirmButton,
                offset if (prompt + 4..prompt + 7).contains(&offset) => ClickRegion::CancelButton,
                _ => ClickRegion::ConfirmSurface,
            };
        }
    } else if column >= right.saturating_sub(DELETE_WIDTH) {
        return ClickRegion::DeleteButton;
    }

    if column < inner.x + DISCLOSURE_WIDTH {
        ClickRegion::Disclosure
    } else {
        ClickRegion::Header
    }
}

/// Index of the first card to draw so that the selected card is visible.
pub fn first_visible(heights: &[u16], selected: usize, available: u16) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let selected = selected.min(heights.len() - 1);
    let mut first = 0;
    while first < selected
        && heights[first..=selected].iter().map(|h| u32::from(*h)).sum::<u32>()
            > u32::from(available)
    {
        first += 1;
    }
    first
}

/// Render latency points (oldest first) as a sparkline. Gaps for DOWN checks
/// are left blank.
pub fn latency_sparkline(points: &[Option<f64>]) -> String {
    let max = points.iter().flatten().fold(0.0_f64, |acc, v| acc.max(*v));
    points
        .iter()
        .map(|point| match point {
            Some(v) if max > 0.0 => {
                let level = ((v / max) * 7.0).round() as usize;
                SPARKLINE_CHARS[level.min(7)]
            }
            Some(_) => SPARKLINE_CHARS[0],
            None => ' ',
        })
        .collect()
}

/// Render the card list and record each card's rectangle for hit-testing.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    app.card_areas.clear();

    let roster = app.dashboard.roster();
    if roster.is_empty() {
        let text = if app.dashboard.is_roster_loading() {
            "Loading services..."
        } else {
            "No services tracked yet. Press 'a' to add one."
        };
        let paragraph = Paragraph::new(text)
            .style(app.theme.muted)
            .alignment(ratatui::layout::Alignment::Center);
        let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        frame.render_widget(paragraph, row);
        return;
    }

    let cards = app.dashboard.cards();
    let heights: Vec<u16> = cards
        .iter()
        .map(|c| card_height(c.interaction.is_expanded()))
        .collect();
    let first = first_visible(&heights, app.selected, area.height);

    let mut areas = Vec::with_capacity(cards.len());
    let mut y = area.y;
    for (index, card) in cards.iter().enumerate().skip(first) {
        let height = heights[index];
        if y + height > area.bottom() {
            break;
        }
        let rect = Rect::new(area.x, y, area.width, height);
        render_card(frame, &app.theme, card, index == app.selected, rect);
        areas.push((card.service.id, rect));
        y += height;
    }
    app.card_areas = areas;
}

fn render_card(frame: &mut Frame, theme: &Theme, card: &CardView<'_>, selected: bool, area: Rect) {
    let border_style = if selected {
        theme.selected
    } else {
        Style::default().fg(theme.border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let pending = card.interaction.is_delete_pending();
    let header = Rect::new(inner.x, inner.y, inner.width, 1);
    let [disclosure, body, controls] = Layout::horizontal([
        Constraint::Length(DISCLOSURE_WIDTH),
        Constraint::Min(0),
        Constraint::Length(if pending { CONFIRM_WIDTH } else { DELETE_WIDTH }),
    ])
    .areas(header);

    let arrow = if card.interaction.is_expanded() { " ▾" } else { " ▸" };
    frame.render_widget(Paragraph::new(arrow).style(theme.muted), disclosure);
    frame.render_widget(Paragraph::new(header_line(theme, card)), body);
    frame.render_widget(Paragraph::new(controls_line(theme, card)), controls);

    if card.interaction.is_expanded() && inner.height > 1 {
        let panel = Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), inner.height - 1);
        frame.render_widget(Paragraph::new(panel_lines(theme, card)), panel);
    }
}

fn header_line<'a>(theme: &Theme, card: &CardView<'a>) -> Line<'a> {
    let newest = latest(card.history);

    let dot = match newest {
        _ if card.loading => Span::styled("◌ ", theme.muted),
        Some(record) => Span::styled("● ", theme.check_style(record.status)),
        None => Span::styled("○ ", theme.muted),
    };

    let tag = if card.is_stale() {
        Span::styled(
            "ERR",
            Style::default().fg(theme.critical).add_modifier(Modifier::BOLD),
        )
    } else if let Some(record) = newest {
        Span::styled(record.status.label(), theme.check_style(record.status))
    } else {
        Span::styled("-", theme.muted)
    };

    let uptime = match (card.aggregate.uptime_pct, card.aggregate.severity) {
        (Some(pct), Some(severity)) => {
            Span::styled(format_uptime(pct), theme.severity_style(severity))
        }
        _ => Span::styled("-", theme.muted),
    };

    Line::from(vec![
        dot,
        Span::styled(
            card.service.name.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(card.service.url.as_str(), theme.muted),
        Span::raw("  "),
        tag,
        Span::raw("  "),
        uptime,
    ])
}

fn controls_line(theme: &Theme, card: &CardView<'_>) -> Line<'static> {
    if card.deleting {
        return Line::from(Span::styled("  …", theme.muted));
    }
    if card.interaction.is_delete_pending() {
        return Line::from(vec![
            Span::raw(CONFIRM_PROMPT),
            Span::styled(
                "[y]",
                Style::default().fg(theme.critical).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled("[n]", theme.muted),
        ]);
    }
    Line::from(Span::styled("  ✕", theme.muted))
}

fn panel_lines<'a>(theme: &Theme, card: &CardView<'a>) -> Vec<Line<'a>> {
    if card.loading && card.history.is_empty() {
        return vec![Line::from(Span::styled("Loading history...", theme.muted))];
    }

    let newest = latest(card.history);
    let label = |text: &'static str| Span::styled(text, theme.header);
    let sep = || Span::styled("  │  ", theme.muted);

    let uptime = card
        .aggregate
        .uptime_pct
        .map(format_uptime)
        .unwrap_or_else(|| "-".to_string());
    let avg = card
        .aggregate
        .avg_latency
        .map(format_latency)
        .unwrap_or_else(|| "-".to_string());
    let code = newest
        .and_then(|r| r.status_code)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());

    let stats = Line::from(vec![
        label("Uptime "),
        Span::raw(uptime),
        sep(),
        label("Avg latency "),
        Span::raw(avg),
        sep(),
        label("Checks "),
        Span::raw(card.history.len().to_string()),
        sep(),
        label("Status code "),
        Span::raw(code),
    ]);

    let mut bar = vec![label("Uptime   ")];
    bar.extend(
        uptime_blocks(card.history)
            .into_iter()
            .map(|r| Span::styled("█", theme.check_style(r.status))),
    );

    let points = latency_series(card.history);
    let peak = points.iter().flatten().fold(0.0_f64, |acc, v| acc.max(*v));
    let latency = Line::from(vec![
        label("Latency  "),
        Span::styled(latency_sparkline(&points), Style::default().fg(theme.highlight)),
        Span::styled(format!("  peak {:.1}ms", peak), theme.muted),
    ]);

    let mut checked = vec![Span::styled(
        match newest {
            Some(r) => format!("Last checked {}", format_date(r.checked_at)),
            None => "No checks yet".to_string(),
        },
        theme.muted,
    )];
    if let Some(err) = card.fetch_error {
        checked.push(Span::styled(
            format!("  · refresh failed: {}", err),
            Style::default().fg(theme.critical),
        ));
    }

    vec![stats, Line::from(bar), latency, Line::from(checked)]
}
