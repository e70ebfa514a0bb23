//! Host collaborators injected into the resolver.

use calnote_core::Result;
use calnote_vault::{FoldStore, MetadataIndex, NoteFile, Vault};

use crate::gate::Confirm;

/// Where a note should be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenTarget {
    /// Reuse the current unpinned pane.
    #[default]
    Reuse,
    /// Split the active pane and open in the new half.
    Split,
}

/// Opaque handle to a workspace pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneId(pub u32);

/// View state passed along when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenState {
    /// Focus the pane after opening.
    pub active: bool,
}

/// Pane management of the host editor.
pub trait Workspace {
    fn acquire_pane(&mut self, target: OpenTarget) -> PaneId;

    /// # Errors
    ///
    /// Returns an error if the host cannot display the file.
    fn open_file(&mut self, pane: PaneId, file: &NoteFile, state: OpenState) -> Result<()>;
}

/// Non-fatal user notices.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(notice = message);
    }
}

/// Every collaborator the resolver talks to.
pub struct Host<'a> {
    pub vault: &'a dyn Vault,
    pub metadata: &'a dyn MetadataIndex,
    pub workspace: &'a mut dyn Workspace,
    pub confirm: &'a mut dyn Confirm,
    pub notifier: &'a dyn Notifier,
    /// Fold state is optional; hosts without it skip the copy step.
    pub folds: Option<&'a dyn FoldStore>,
}
