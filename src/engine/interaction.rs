//! Per-card interaction state.
//!
//! Each card carries two independent state machines: expand/collapse and
//! delete confirmation. Clicks are routed by region so that one machine can
//! never be driven by a click meant for the other.

/// Expand/collapse state of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    Collapsed,
    Expanded,
}

impl Expansion {
    pub fn toggled(self) -> Self {
        match self {
            Expansion::Collapsed => Expansion::Expanded,
            Expansion::Expanded => Expansion::Collapsed,
        }
    }
}

/// Delete-confirmation state of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePrompt {
    #[default]
    Idle,
    Pending,
}

/// Where on (or off) a card a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    /// The card's primary area (name, URL, status).
    Header,
    /// The dedicated expand/collapse control.
    Disclosure,
    /// The delete affordance.
    DeleteButton,
    /// Inside the confirmation surface but not on one of its buttons.
    ConfirmSurface,
    ConfirmButton,
    CancelButton,
    /// Anywhere outside this card.
    Outside,
}

/// Something a click asks the dashboard to do beyond local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardIntent {
    DeleteConfirmed,
}

/// Interaction state for one card. Purely local; nothing here touches the
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardInteraction {
    expansion: Expansion,
    prompt: DeletePrompt,
}

impl CardInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn prompt(&self) -> DeletePrompt {
        self.prompt
    }

    pub fn is_expanded(&self) -> bool {
        self.expansion == Expansion::Expanded
    }

    pub fn is_delete_pending(&self) -> bool {
        self.prompt == DeletePrompt::Pending
    }

    /// Flip expand/collapse. The header and the disclosure control both land
    /// here, so they always agree.
    pub fn toggle_expand(&mut self) -> Expansion {
        self.expansion = self.expansion.toggled();
        self.expansion
    }

    /// The delete affordance toggles the confirmation prompt.
    pub fn request_delete(&mut self) -> DeletePrompt {
        self.prompt = match self.prompt {
            DeletePrompt::Idle => DeletePrompt::Pending,
            DeletePrompt::Pending => DeletePrompt::Idle,
        };
        self.prompt
    }

    /// Returns true if a pending prompt was cancelled.
    pub fn cancel_delete(&mut self) -> bool {
        let was_pending = self.is_delete_pending();
        self.prompt = DeletePrompt::Idle;
        was_pending
    }

    /// Confirm a pending prompt. The prompt returns to idle whatever the
    /// outcome of the delete; returns false if nothing was pending.
    pub fn confirm_delete(&mut self) -> bool {
        let was_pending = self.is_delete_pending();
        self.prompt = DeletePrompt::Idle;
        was_pending
    }

    /// Any interaction outside the confirmation surface. Returns true if it
    /// dismissed a pending prompt.
    pub fn outside_click(&mut self) -> bool {
        self.cancel_delete()
    }

    /// Route a click on this card.
    ///
    /// While a prompt is pending, a click outside the confirmation surface
    /// only dismisses it; it does not also toggle expansion.
    pub fn click(&mut self, region: ClickRegion) -> Option<CardIntent> {
        if self.is_delete_pending() {
            match region {
                ClickRegion::ConfirmButton => {
                    self.confirm_delete();
                    return Some(CardIntent::DeleteConfirmed);
                }
                ClickRegion::ConfirmSurface => {}
                ClickRegion::CancelButton
                | ClickRegion::DeleteButton
                | ClickRegion::Header
                | ClickRegion::Disclosure
                | ClickRegion::Outside => {
                    self.cancel_delete();
                }
            }
            return None;
        }

        match region {
            ClickRegion::Header | ClickRegion::Disclosure => {
                self.toggle_expand();
            }
            ClickRegion::DeleteButton => {
                self.request_delete();
            }
            ClickRegion::ConfirmSurface
            | ClickRegion::ConfirmButton
            | ClickRegion::CancelButton
            | ClickRegion::Outside => {}
        }
        None
    }
}
