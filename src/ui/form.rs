//! Add-service modal.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AddServiceForm, FormField};
use crate::ui::common::centered;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let theme = &app.theme;

    let field = |label: &'static str, value: &str, which: FormField| {
        let focused = form.focus == which;
        let style = if focused {
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let cursor = if focused && !form.submitting { "_" } else { "" };
        Line::from(vec![
            Span::styled(label, style),
            Span::raw(format!("{}{}", value, cursor)),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field(" Name  ", &form.name, FormField::Name),
        Line::from(""),
        field(" URL   ", &form.url, FormField::Url),
        Line::from(""),
    ];
    lines.push(feedback_line(app, form));

    let block = Block::default()
        .title(" Add service ")
        .title_bottom(Line::from(" Tab:next field  Enter:add  Esc:cancel ").centered())
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.highlight));

    let form_area = centered(area, 64, 9);
    frame.render_widget(Clear, form_area);
    frame.render_widget(Paragraph::new(lines).block(block), form_area);
}

fn feedback_line<'a>(app: &App, form: &'a AddServiceForm) -> Line<'a> {
    if form.submitting {
        Line::from(Span::styled(" Adding...", app.theme.muted))
    } else if let Some(err) = form.error.as_deref() {
        Line::from(Span::styled(
            format!(" {}", err),
            Style::default().fg(app.theme.critical),
        ))
    } else {
        Line::from("")
    }
}
