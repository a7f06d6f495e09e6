//! Application state and navigation logic.

use std::time::{Duration, Instant};

use ratatui::layout::{Position, Rect};

use crate::api::ServiceId;
use crate::engine::{CardIntent, ClickRegion, Dashboard};
use crate::ui::cards::region_at;
use crate::ui::Theme;

/// Which field of the add-service form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Url,
}

/// State of the add-service modal.
#[derive(Debug, Clone, Default)]
pub struct AddServiceForm {
    pub name: String,
    pub url: String,
    pub focus: FormField,
    /// Validation or request error, shown inside the form.
    pub error: Option<String>,
    pub submitting: bool,
}

impl AddServiceForm {
    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Url => &mut self.url,
        }
    }

    pub fn push(&mut self, c: char) {
        self.field_mut().push(c);
        self.error = None;
    }

    pub fn pop(&mut self) {
        self.field_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Url,
            FormField::Url => FormField::Name,
        };
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub dashboard: Dashboard,

    /// Index into the roster of the selected card.
    pub selected: usize,
    /// Open add-service modal, if any.
    pub form: Option<AddServiceForm>,

    // UI
    pub theme: Theme,
    /// Card rectangles from the last render, for mouse hit-testing.
    pub card_areas: Vec<(ServiceId, Rect)>,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App around a dashboard, detecting the terminal theme.
    pub fn new(dashboard: Dashboard) -> Self {
        Self::with_theme(dashboard, Theme::auto_detect())
    }

    pub fn with_theme(dashboard: Dashboard, theme: Theme) -> Self {
        Self {
            running: true,
            show_help: false,
            dashboard,
            selected: 0,
            form: None,
            theme,
            card_areas: Vec::new(),
            status_message: None,
        }
    }

    /// Returns a description of the status API in use.
    pub fn source_description(&self) -> &str {
        self.dashboard.source_description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Apply pending engine events and settle UI state around them.
    pub fn tick(&mut self) {
        self.dashboard.pump();

        if let Some(outcome) = self.dashboard.take_add_outcome() {
            match outcome {
                Ok(service) => {
                    self.form = None;
                    if let Some(index) = self.dashboard.roster().iter().position(|s| s.id == service.id) {
                        self.selected = index;
                    }
                    self.set_status_message(format!("Added {}", service.name));
                }
                Err(e) => {
                    if let Some(form) = self.form.as_mut() {
                        form.submitting = false;
                        form.error = Some(e.to_string());
                    }
                }
            }
        }

        let count = self.dashboard.roster().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    /// The service behind the selected card.
    pub fn selected_service(&self) -> Option<ServiceId> {
        self.dashboard.roster().get(self.selected).map(|s| s.id)
    }

    /// Move selection down by one card.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one card.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.dashboard.roster().len().saturating_sub(1);
        self.selected = (self.selected + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.dashboard.roster().len().saturating_sub(1);
    }

    /// Click a region of the selected card.
    pub fn click_selected(&mut self, region: ClickRegion) {
        if let Some(id) = self.selected_service() {
            self.click_card(id, region);
        }
    }

    /// Expand (`true`) or collapse (`false`) the selected card through its
    /// disclosure control.
    pub fn set_selected_expanded(&mut self, expanded: bool) {
        let Some(id) = self.selected_service() else {
            return;
        };
        let is_expanded = self
            .dashboard
            .interaction(id)
            .is_some_and(|card| card.is_expanded());
        if is_expanded != expanded {
            self.click_card(id, ClickRegion::Disclosure);
        }
    }

    /// Confirm the open delete prompt.
    pub fn confirm_delete(&mut self, id: ServiceId) {
        self.click_card(id, ClickRegion::ConfirmButton);
    }

    fn click_card(&mut self, id: ServiceId, region: ClickRegion) {
        if self.dashboard.click(id, region) == Some(CardIntent::DeleteConfirmed) {
            let name = self
                .dashboard
                .roster()
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            self.set_status_message(format!("Deleting {}...", name));
        }
    }

    /// Route a mouse click at a terminal position.
    pub fn click_at(&mut self, column: u16, row: u16) {
        let position = Position::new(column, row);
        let hit = self
            .card_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .copied();

        let Some((id, area)) = hit else {
            self.dashboard.click_outside();
            return;
        };

        if let Some(index) = self.dashboard.roster().iter().position(|s| s.id == id) {
            self.selected = index;
        }
        let pending = self
            .dashboard
            .interaction(id)
            .is_some_and(|card| card.is_delete_pending());
        self.click_card(id, region_at(column, row, area, pending));
    }

    /// Open the add-service modal.
    pub fn open_form(&mut self) {
        self.dashboard.click_outside();
        self.form = Some(AddServiceForm::default());
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Validate and submit the form. Errors stay in the form.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        match self.dashboard.add_service(&form.name, &form.url) {
            Ok(()) => {
                form.submitting = true;
                form.error = None;
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
