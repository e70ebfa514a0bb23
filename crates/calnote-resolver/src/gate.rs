//! Confirmation before creating notes.

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
    /// The prompt was closed without an answer.
    Dismiss,
}

/// A yes/no question shown before a file-creating action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    /// Label of the accepting action.
    pub cta: String,
}

impl Prompt {
    /// Prompt for creating the note called `filename`.
    #[must_use]
    pub fn new_note(kind: &str, filename: &str) -> Self {
        let mut chars = kind.chars();
        let kind: String = chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default();
        Self {
            title: format!("New {kind} note"),
            message: format!("File {filename} does not exist. Would you like to create it?"),
            cta: "Create".to_string(),
        }
    }
}

/// Host dialog that asks the user.
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> Decision;
}

/// Accepts every prompt without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &Prompt) -> Decision {
        Decision::Accept
    }
}

/// Decides whether a file-creating action may go ahead.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationGate {
    required: bool,
}

impl ConfirmationGate {
    #[must_use]
    pub fn new(required: bool) -> Self {
        Self { required }
    }

    /// `true` when creation may proceed. Without a requirement the user is
    /// never asked.
    pub fn permits(&self, confirm: &mut dyn Confirm, prompt: &Prompt) -> bool {
        if !self.required {
            return true;
        }
        let decision = confirm.confirm(prompt);
        tracing::debug!(?decision, title = %prompt.title, "confirmation answered");
        decision == Decision::Accept
    }
}
