//! Filesystem-backed vault and fold store.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use calnote_core::error::VaultError;

use crate::{normalize_path, FoldInfo, FoldStore, MetadataIndex, NoteFile, Vault, VaultPath};

/// Directory holding calnote's own state inside a vault.
pub const STATE_DIR: &str = ".calnote";

fn io_error(path: impl AsRef<Path>, source: std::io::Error) -> VaultError {
    VaultError::Io {
        path: path.as_ref().display().to_string(),
        source,
    }
}

/// A vault rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open the vault at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] if `root` is not a directory.
    pub fn open(root: &Path) -> Result<Self, VaultError> {
        if !root.is_dir() {
            return Err(VaultError::NotFound(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of calnote's state directory.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Absolute location of a vault-relative path.
    #[must_use]
    pub fn absolute(&self, relative: &str) -> PathBuf {
        normalize_path(relative)
            .split('/')
            .filter(|seg| !seg.is_empty())
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    fn relative(&self, absolute: &Path) -> Option<String> {
        let rel = absolute.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        Some(parts.join("/"))
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

impl FsVault {
    /// Exclusive create; a failed write removes the half-written file so
    /// the path stays free for the next attempt.
    fn create_with(
        &self,
        path: &VaultPath,
        content: &str,
        write: impl FnOnce(&mut fs::File, &[u8]) -> std::io::Result<()>,
    ) -> Result<NoteFile, VaultError> {
        let abs = self.absolute(path.as_str());
        let mut handle = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => VaultError::AlreadyExists(path.to_string()),
                _ => io_error(&abs, e),
            })?;
        if let Err(e) = write(&mut handle, content.as_bytes()) {
            drop(handle);
            if let Err(cleanup) = fs::remove_file(&abs) {
                tracing::warn!(path = %path, error = %cleanup, "cannot remove partial note");
            }
            return Err(io_error(&abs, e));
        }
        tracing::debug!(path = %path, bytes = content.len(), "created note");
        Ok(NoteFile::new(path.clone()))
    }
}

impl Vault for FsVault {
    fn get_by_path(&self, path: &VaultPath) -> Option<NoteFile> {
        self.absolute(path.as_str())
            .is_file()
            .then(|| NoteFile::new(path.clone()))
    }

    fn read(&self, file: &NoteFile) -> Result<String, VaultError> {
        let abs = self.absolute(file.path.as_str());
        fs::read_to_string(&abs).map_err(|e| match e.kind() {
            ErrorKind::NotFound => VaultError::NotFound(file.path.to_string()),
            _ => io_error(&abs, e),
        })
    }

    fn create(&self, path: &VaultPath, content: &str) -> Result<NoteFile, VaultError> {
        self.create_with(path, content, |file, bytes| file.write_all(bytes))
    }

    fn create_folder(&self, path: &str) -> Result<(), VaultError> {
        let abs = self.absolute(path);
        fs::create_dir_all(&abs).map_err(|e| io_error(&abs, e))
    }

    fn folder_exists(&self, path: &str) -> bool {
        self.absolute(path).is_dir()
    }

    fn list_markdown(&self, folder: &str) -> Result<Vec<NoteFile>, VaultError> {
        let base = self.absolute(folder);
        if !base.is_dir() {
            tracing::debug!(folder, "folder missing, nothing to list");
            return Ok(Vec::new());
        }

        let mut notes = Vec::new();
        for entry in WalkDir::new(&base).into_iter().filter_entry(|e| !is_hidden(e)) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| base.clone());
                io_error(path, std::io::Error::other(e))
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }
            if let Some(rel) = self.relative(path) {
                notes.push(NoteFile::new(VaultPath::new(&rel)));
            }
        }
        notes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(notes)
    }
}

impl MetadataIndex for FsVault {
    fn resolve_link(&self, linkpath: &str) -> Option<NoteFile> {
        let link = linkpath.split('#').next().unwrap_or_default().trim();
        let link = normalize_path(link);
        if link.is_empty() {
            return None;
        }

        let exact = VaultPath::new(&link);
        if let Some(file) = self.get_by_path(&exact) {
            return Some(file);
        }

        let wanted = exact.basename().to_string();
        let notes = self.list_markdown("").ok()?;
        let mut matches: Vec<NoteFile> = notes
            .into_iter()
            .filter(|note| note.basename == wanted)
            .collect();
        matches.sort_by_key(|note| (note.path.as_str().matches('/').count(), note.path.clone()));
        matches.into_iter().next()
    }
}

/// Fold state persisted as one JSON map in `.calnote/folds.json`.
#[derive(Debug, Clone)]
pub struct FsFoldStore {
    file: PathBuf,
}

impl FsFoldStore {
    #[must_use]
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }

    /// The fold store of a filesystem vault.
    #[must_use]
    pub fn for_vault(vault: &FsVault) -> Self {
        Self::new(vault.state_dir().join("folds.json"))
    }

    fn read_all(&self) -> Result<BTreeMap<String, FoldInfo>, VaultError> {
        match fs::read_to_string(&self.file) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                io_error(&self.file, std::io::Error::new(ErrorKind::InvalidData, e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(io_error(&self.file, e)),
        }
    }
}

impl FoldStore for FsFoldStore {
    fn load(&self, path: &VaultPath) -> Option<FoldInfo> {
        match self.read_all() {
            Ok(mut all) => all.remove(path.as_str()),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable fold state");
                None
            }
        }
    }

    fn save(&self, path: &VaultPath, info: &FoldInfo) -> Result<(), VaultError> {
        let mut all = self.read_all()?;
        all.insert(path.to_string(), info.clone());
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&all)
            .map_err(|e| io_error(&self.file, std::io::Error::other(e)))?;
        fs::write(&self.file, json).map_err(|e| io_error(&self.file, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FoldRange;

    fn vault() -> (tempfile::TempDir, FsVault) {
        let dir = tempfile::tempdir().unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn open_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsVault::open(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }

    #[test]
    fn create_is_exclusive() {
        let (_dir, vault) = vault();
        let path = VaultPath::new("2026-01-31");
        let file = vault.create(&path, "# first").unwrap();
        assert_eq!(vault.read(&file).unwrap(), "# first");

        let err = vault.create(&path, "# second").unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(vault.read(&file).unwrap(), "# first");
    }

    #[test]
    fn failed_write_leaves_no_partial_note() {
        let (dir, vault) = vault();
        let path = VaultPath::new("2026-03-14");
        let err = vault
            .create_with(&path, "# 2026-03-14", |file, bytes| {
                file.write_all(&bytes[..3])?;
                Err(std::io::Error::other("disk full"))
            })
            .unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
        assert!(!dir.path().join("2026-03-14.md").exists());
        assert!(vault.get_by_path(&path).is_none());

        let file = vault.create(&path, "# 2026-03-14").unwrap();
        assert_eq!(vault.read(&file).unwrap(), "# 2026-03-14");
    }

    #[test]
    fn create_in_missing_folder_is_io_error() {
        let (_dir, vault) = vault();
        let err = vault
            .create(&VaultPath::new("missing/2026.md"), "")
            .unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
    }

    #[test]
    fn folders_and_lookup() {
        let (_dir, vault) = vault();
        assert!(!vault.folder_exists("journal/daily"));
        vault.create_folder("journal/daily").unwrap();
        assert!(vault.folder_exists("journal/daily"));

        let path = VaultPath::note("journal/daily", "2026-02-01");
        assert!(vault.get_by_path(&path).is_none());
        vault.create(&path, "").unwrap();
        assert_eq!(vault.get_by_path(&path).unwrap().basename, "2026-02-01");
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let (_dir, vault) = vault();
        let file = NoteFile::new(VaultPath::new("ghost"));
        assert!(matches!(vault.read(&file), Err(VaultError::NotFound(_))));
    }

    #[test]
    fn list_markdown_skips_hidden_and_other_files() {
        let (dir, vault) = vault();
        fs::create_dir_all(dir.path().join("daily/2026")).unwrap();
        fs::create_dir_all(dir.path().join(".calnote")).unwrap();
        fs::write(dir.path().join("daily/2026/2026-01-02.md"), "").unwrap();
        fs::write(dir.path().join("daily/2026-01-01.md"), "").unwrap();
        fs::write(dir.path().join("daily/notes.txt"), "").unwrap();
        fs::write(dir.path().join(".calnote/hidden.md"), "").unwrap();

        let all: Vec<String> = vault
            .list_markdown("")
            .unwrap()
            .into_iter()
            .map(|n| n.path.to_string())
            .collect();
        assert_eq!(all, vec!["daily/2026-01-01.md", "daily/2026/2026-01-02.md"]);
        assert!(vault.list_markdown("weekly").unwrap().is_empty());
    }

    #[test]
    fn resolve_link_prefers_exact_path_then_shallowest_basename() {
        let (dir, vault) = vault();
        fs::create_dir_all(dir.path().join("templates/old")).unwrap();
        fs::write(dir.path().join("templates/daily.md"), "new").unwrap();
        fs::write(dir.path().join("templates/old/daily.md"), "old").unwrap();

        let exact = vault.resolve_link("templates/old/daily").unwrap();
        assert_eq!(exact.path.as_str(), "templates/old/daily.md");

        let by_name = vault.resolve_link("daily").unwrap();
        assert_eq!(by_name.path.as_str(), "templates/daily.md");

        assert!(vault.resolve_link("weekly").is_none());
        assert!(vault.resolve_link("  ").is_none());
    }

    #[test]
    fn fold_store_roundtrip() {
        let (_dir, vault) = vault();
        let store = FsFoldStore::for_vault(&vault);
        let path = VaultPath::new("templates/daily");
        assert!(store.load(&path).is_none());

        let info = FoldInfo {
            folds: vec![FoldRange { from: 2, to: 5 }],
            lines: 12,
        };
        store.save(&path, &info).unwrap();
        store
            .save(&VaultPath::new("other"), &FoldInfo::default())
            .unwrap();
        assert_eq!(store.load(&path), Some(info));
        assert!(vault.state_dir().join("folds.json").is_file());
    }
}
