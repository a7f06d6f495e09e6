use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::app::App;
use crate::engine::ClickRegion;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.form.is_some() {
        handle_form_input(app, key);
        return;
    }

    // An open delete prompt takes every key; anything but y/n dismisses it
    if let Some(id) = app.dashboard.pending_delete() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(id),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.dashboard.cancel_delete(id);
            }
            _ => {
                app.dashboard.click_outside();
            }
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Card header toggles, disclosure expands/collapses
        KeyCode::Enter | KeyCode::Char(' ') => app.click_selected(ClickRegion::Header),
        KeyCode::Right | KeyCode::Char('l') => app.set_selected_expanded(true),
        KeyCode::Left | KeyCode::Char('h') => app.set_selected_expanded(false),

        // Delete affordance
        KeyCode::Char('d') | KeyCode::Delete => app.click_selected(ClickRegion::DeleteButton),

        KeyCode::Char('a') => app.open_form(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key input while the add-service form is open
fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => return app.close_form(),
        KeyCode::Enter => return app.submit_form(),
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.next_field(),
        KeyCode::Backspace if !form.submitting => form.pop(),
        KeyCode::Char(c)
            if !form.submitting && !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            form.push(c)
        }
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.show_help {
        if let MouseEventKind::Down(_) = mouse.kind {
            app.show_help = false;
        }
        return;
    }
    if app.form.is_some() {
        return;
    }

    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => app.click_at(mouse.column, mouse.row),

        _ => {}
    }
}
