use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use catalog_ci_protocol::paths::normalize_repo_path;

/// Read-only view of the checked-out repository.
///
/// Paths are repository-relative with `/` separators. Implementations must
/// not have side effects.
pub trait FileProbe {
    fn exists(&self, rel_path: &str) -> bool;

    fn read_to_string(&self, rel_path: &str) -> io::Result<String>;
}

/// Probe backed by the local filesystem, rooted at the checkout.
pub struct LocalProbe {
    root: PathBuf,
}

impl LocalProbe {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Probe rooted at the process working directory, where CI runs from.
    pub fn current_dir() -> io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel_path: &str) -> PathBuf {
        let normalized = normalize_repo_path(rel_path);
        normalized
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl FileProbe for LocalProbe {
    fn exists(&self, rel_path: &str) -> bool {
        self.resolve(rel_path).exists()
    }

    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.resolve(rel_path))
    }
}

/// In-memory probe, mostly for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryProbe {
    files: BTreeMap<String, String>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, rel_path: &str, contents: &str) -> Self {
        self.files
            .insert(normalize_repo_path(rel_path), contents.to_string());
        self
    }
}

impl FileProbe for MemoryProbe {
    fn exists(&self, rel_path: &str) -> bool {
        let normalized = normalize_repo_path(rel_path);
        let dir_prefix = format!("{normalized}/");
        self.files.contains_key(&normalized)
            || self.files.keys().any(|k| k.starts_with(&dir_prefix))
    }

    fn read_to_string(&self, rel_path: &str) -> io::Result<String> {
        self.files
            .get(&normalize_repo_path(rel_path))
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, rel_path.to_string()))
    }
}
