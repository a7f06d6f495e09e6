//! Common UI components.
//!
//! This module contains the header bar, error banner, status bar, and help
//! overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Severity;

/// Render the header bar with the roster overview.
///
/// Displays: overall status indicator, service count, refresh cadence and
/// counts per uptime band.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = &app.dashboard;
    let refresh = dashboard.config().roster_interval.as_secs();

    if dashboard.is_roster_loading() {
        let line = Line::from(vec![
            Span::styled(" SLA WATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("│ Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut normal = 0;
    let mut warn = 0;
    let mut critical = 0;
    for card in dashboard.cards() {
        match card.aggregate.severity {
            Some(Severity::Normal) => normal += 1,
            Some(Severity::Warn) => warn += 1,
            Some(Severity::Critical) => critical += 1,
            None => {}
        }
    }

    let total = dashboard.roster().len();
    let status_style = if critical > 0 {
        app.theme.severity_style(Severity::Critical)
    } else if warn > 0 {
        app.theme.severity_style(Severity::Warn)
    } else {
        app.theme.severity_style(Severity::Normal)
    };

    let dim = Style::default().add_modifier(Modifier::DIM);
    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("SLA WATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", total), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " service{} tracked · refreshes every {}s │ ",
            if total == 1 { "" } else { "s" },
            refresh
        )),
        Span::styled(format!("{}", normal), Style::default().fg(app.theme.healthy)),
        Span::raw(" ok "),
        if warn > 0 {
            Span::styled(format!("{}", warn), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" warn "),
        if critical > 0 {
            Span::styled(
                format!("{}", critical),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", dim)
        },
        Span::raw(" crit"),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the global error banner, if there is one.
pub fn render_error_banner(frame: &mut Frame, app: &App, area: Rect) {
    let Some(error) = app.dashboard.global_error() else {
        return;
    };
    let paragraph = Paragraph::new(format!(" ⚠ {} ", error.message)).style(
        Style::default()
            .fg(app.theme.critical)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom.
///
/// Shows the API endpoint and context-sensitive controls, or a temporary
/// status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.form.is_some() {
        "Tab:next field Enter:add Esc:cancel"
    } else if app.dashboard.pending_delete().is_some() {
        "y:confirm delete n/Esc:cancel"
    } else {
        "↑↓:select Enter:expand d:delete a:add ?:help q:quit"
    };

    let status = format!(" {} | {}", app.source_description(), controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Center a `width` x `height` box in `area`, shrinking it to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Select service"),
        Line::from("  PgUp/PgDn   Jump 10 services"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Service card"),
        Line::from("  Enter/Space Toggle details"),
        Line::from("  →/← l/h     Expand/collapse"),
        Line::from("  d           Delete service"),
        Line::from("  y / n       Confirm / cancel delete"),
        Line::from(""),
        section(" General"),
        Line::from("  a           Add service"),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered(area, 42, 23);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}
