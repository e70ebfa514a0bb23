//! # calnote-resolver
//!
//! Resolves calendar periods to periodic notes in a vault.
//!
//! - [`NoteResolver`]: compute a period's note path, find it, or create it
//!   from a template and open it in the workspace
//! - [`ConfirmationGate`]: optional yes/no prompt before creating files
//! - [`Host`]: the injected vault, workspace, metadata, fold and prompt
//!   collaborators
//! - [`labels`]: header labels and month grid indicators for calendar views

pub mod gate;
pub mod host;
pub mod labels;
pub mod resolver;

pub use gate::{AutoConfirm, Confirm, ConfirmationGate, Decision, Prompt};
pub use host::{Host, LogNotifier, Notifier, OpenState, OpenTarget, PaneId, Workspace};
pub use labels::{CalendarIndexes, HeaderLabel, LabelDecorator};
pub use resolver::{NoteResolver, Resolution};
