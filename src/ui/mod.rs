//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`cards`]: Service cards with their expandable detail panel
//! - [`form`]: Add-service modal
//! - [`common`]: Shared components (header, error banner, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Error banner (only when present)     │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ Service cards (cards::render)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - form::render
//!    - common::render_help
//! ```

pub mod cards;
pub mod common;
pub mod form;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Draw one frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = ratatui::widgets::Paragraph::new(msg)
            .alignment(ratatui::layout::Alignment::Center)
            .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
        let centered = ratatui::layout::Rect::new(
            0,
            (area.height / 2).saturating_sub(2),
            area.width,
            5.min(area.height),
        );
        frame.render_widget(paragraph, centered);
        app.card_areas.clear();
        return;
    }

    let banner_height = if app.dashboard.global_error().is_some() { 1 } else { 0 };
    let [header, banner, content, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(banner_height),
        Constraint::Min(6),
        Constraint::Length(1),
    ])
    .areas(area);

    common::render_header(frame, app, header);
    common::render_error_banner(frame, app, banner);
    cards::render(frame, app, content);
    common::render_status_bar(frame, app, status);

    if app.form.is_some() {
        form::render(frame, app, area);
    }
    if app.show_help {
        common::render_help(frame, app, area);
    }
}
