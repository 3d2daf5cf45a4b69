// src/fs/mock.rs

//! In-memory [`FileSystem`] with a logical clock for modification times.
//!
//! Every write advances the clock by one second, so a touched file always
//! has a strictly newer timestamp than before without any real sleeping.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use super::{FileMeta, FileSystem};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified: SystemTime },
    Dir { modified: SystemTime },
}

#[derive(Debug, Default)]
struct MockState {
    // BTreeMap keeps directory listings in a stable order.
    entries: BTreeMap<PathBuf, MockEntry>,
    failures: HashMap<PathBuf, ErrorKind>,
    ticks: u64,
}

impl MockState {
    fn next_time(&mut self) -> SystemTime {
        self.ticks += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + self.ticks)
    }

    fn ensure_parents(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            if !self.entries.contains_key(dir) {
                let modified = self.next_time();
                self.entries
                    .insert(dir.to_path_buf(), MockEntry::Dir { modified });
            }
            current = dir.parent();
        }
    }

    fn check_failure(&self, path: &Path) -> io::Result<()> {
        match self.failures.get(path) {
            Some(kind) => Err(io::Error::new(*kind, format!("injected failure for {path:?}"))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    /// A mock filesystem whose only entry is the directory `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let fs = Self::default();
        fs.add_dir(root);
        fs
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state();
        state.ensure_parents(path);
        let modified = state.next_time();
        state
            .entries
            .insert(path.to_path_buf(), MockEntry::Dir { modified });
    }

    /// Create or overwrite a file, stamping it with a fresh modification time.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut state = self.state();
        state.ensure_parents(path);
        let modified = state.next_time();
        state.entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                content: content.into(),
                modified,
            },
        );
    }

    /// Bump the modification time of an existing file without changing its
    /// content. Returns false if there is no such file.
    pub fn touch(&self, path: impl AsRef<Path>) -> bool {
        let mut state = self.state();
        let modified = state.next_time();
        match state.entries.get_mut(path.as_ref()) {
            Some(MockEntry::File { modified: m, .. }) => {
                *m = modified;
                true
            }
            _ => false,
        }
    }

    /// Force a specific modification time, e.g. to move it backwards.
    pub fn set_modified(&self, path: impl AsRef<Path>, when: SystemTime) {
        let mut state = self.state();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified = when;
        }
    }

    pub fn modified(&self, path: impl AsRef<Path>) -> Option<SystemTime> {
        match self.state().entries.get(path.as_ref()) {
            Some(MockEntry::File { modified, .. }) | Some(MockEntry::Dir { modified }) => {
                Some(*modified)
            }
            None => None,
        }
    }

    /// Move a file, keeping its content and modification time.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> bool {
        let mut state = self.state();
        match state.entries.remove(from.as_ref()) {
            Some(entry) => {
                state.ensure_parents(to.as_ref());
                state.entries.insert(to.as_ref().to_path_buf(), entry);
                true
            }
            None => false,
        }
    }

    /// Remove a file or a directory together with everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.state()
            .entries
            .retain(|p, _| p != path && !p.starts_with(path));
    }

    /// Make every access to `path` fail with `kind`.
    pub fn fail_with(&self, path: impl AsRef<Path>, kind: ErrorKind) {
        self.state()
            .failures
            .insert(path.as_ref().to_path_buf(), kind);
    }

    pub fn clear_failure(&self, path: impl AsRef<Path>) {
        self.state().failures.remove(path.as_ref());
    }
}

impl FileSystem for MockFileSystem {
    fn symlink_metadata(&self, path: &Path) -> io::Result<FileMeta> {
        let state = self.state();
        state.check_failure(path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(FileMeta {
                is_dir: false,
                modified: *modified,
            }),
            Some(MockEntry::Dir { modified }) => Ok(FileMeta {
                is_dir: true,
                modified: *modified,
            }),
            None => Err(io::Error::new(
                ErrorKind::NotFound,
                format!("no such file or directory: {path:?}"),
            )),
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.state();
        state.check_failure(path)?;
        match state.entries.get(path) {
            Some(MockEntry::Dir { .. }) => Ok(state
                .entries
                .keys()
                .filter(|p| p.parent() == Some(path))
                .cloned()
                .collect()),
            Some(MockEntry::File { .. }) => Err(io::Error::new(
                ErrorKind::Other,
                format!("not a directory: {path:?}"),
            )),
            None => Err(io::Error::new(
                ErrorKind::NotFound,
                format!("no such file or directory: {path:?}"),
            )),
        }
    }

    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let state = self.state();
        state.check_failure(path)?;
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir { .. }) => Err(io::Error::new(
                ErrorKind::Other,
                format!("is a directory: {path:?}"),
            )),
            None => Err(io::Error::new(
                ErrorKind::NotFound,
                format!("no such file or directory: {path:?}"),
            )),
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // Tests use absolute paths throughout; only existence is checked.
        let state = self.state();
        state.check_failure(path)?;
        if state.entries.contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(io::Error::new(
                ErrorKind::NotFound,
                format!("no such file or directory: {path:?}"),
            ))
        }
    }
}
