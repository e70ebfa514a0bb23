//! # calnote-vault
//!
//! Host collaborators consumed by calnote and their filesystem
//! implementations.
//!
//! The vault is the authoritative store of notes. Everything calnote
//! needs from it goes through the traits in this crate:
//! - [`Vault`]: lookup, read, exclusive create, folders, listing
//! - [`MetadataIndex`]: resolving a template link to a file
//! - [`FoldStore`]: collapsed-section state per file
//!
//! [`FsVault`] and [`FsFoldStore`] implement them over a directory tree,
//! [`NoteIndex`] maps date-UIDs to existing notes and [`VaultWatcher`]
//! reports when an index should be rebuilt.

pub mod fs;
pub mod index;
pub mod watcher;

use std::fmt;

use serde::{Deserialize, Serialize};

use calnote_core::error::VaultError;

pub use fs::{FsFoldStore, FsVault};
pub use index::NoteIndex;
pub use watcher::{VaultEvent, VaultWatcher};

/// Normalize a vault-relative path: forward slashes, no empty or `.`
/// segments, no leading or trailing slash.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .replace('\u{00A0}', " ")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// A normalized, vault-relative path to a markdown note.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VaultPath(String);

impl VaultPath {
    /// Normalize `raw` and ensure it carries the `.md` extension.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let mut path = normalize_path(raw);
        if !path.ends_with(".md") {
            path.push_str(".md");
        }
        Self(path)
    }

    /// Path of `filename` inside `folder`.
    #[must_use]
    pub fn note(folder: &str, filename: &str) -> Self {
        Self::new(&format!("{folder}/{filename}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Containing folder, `None` at the vault root.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('/').map(|(parent, _)| parent)
    }

    /// File name without folder or extension.
    #[must_use]
    pub fn basename(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        name.strip_suffix(".md").unwrap_or(name)
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a note that exists in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NoteFile {
    pub path: VaultPath,
    pub basename: String,
}

impl NoteFile {
    #[must_use]
    pub fn new(path: VaultPath) -> Self {
        let basename = path.basename().to_string();
        Self { path, basename }
    }
}

/// File-backed note store.
///
/// `create` must be exclusive: when the path is taken it fails with
/// [`VaultError::AlreadyExists`] instead of overwriting.
pub trait Vault {
    fn get_by_path(&self, path: &VaultPath) -> Option<NoteFile>;

    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if the file vanished, or
    /// [`VaultError::Io`] if it cannot be read.
    fn read(&self, file: &NoteFile) -> Result<String, VaultError>;

    /// # Errors
    ///
    /// Returns [`VaultError::AlreadyExists`] if the path is taken, or
    /// [`VaultError::Io`] for any other failure.
    fn create(&self, path: &VaultPath, content: &str) -> Result<NoteFile, VaultError>;

    /// Create a folder and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the folder cannot be created.
    fn create_folder(&self, path: &str) -> Result<(), VaultError>;

    fn folder_exists(&self, path: &str) -> bool;

    /// All markdown notes under `folder`, recursively, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the folder cannot be walked.
    fn list_markdown(&self, folder: &str) -> Result<Vec<NoteFile>, VaultError>;
}

/// Link resolution over the vault's notes.
pub trait MetadataIndex {
    /// Resolve a link path (`templates/daily`, `daily.md`, `daily`) to a note.
    fn resolve_link(&self, linkpath: &str) -> Option<NoteFile>;
}

/// A collapsed line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRange {
    pub from: usize,
    pub to: usize,
}

/// Collapsed-section state of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldInfo {
    pub folds: Vec<FoldRange>,
    pub lines: usize,
}

/// Persistence of per-file fold state.
pub trait FoldStore {
    fn load(&self, path: &VaultPath) -> Option<FoldInfo>;

    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the state cannot be persisted.
    fn save(&self, path: &VaultPath, info: &FoldInfo) -> Result<(), VaultError>;
}
