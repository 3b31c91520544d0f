use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::discovery::namespace::NamespaceMap;

/// A candidate declaration file found under a plugin namespace root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Plugin namespace the root directory belongs to
    pub namespace: String,
    /// Absolute path of the file
    pub path: PathBuf,
    /// Directory of the file relative to the namespace root (empty at the root)
    pub sub_path: PathBuf,
}

/// Recursively enumerates declaration files below namespace roots.
///
/// Order within a directory is whatever the filesystem returns and is not
/// stable across runs or platforms; callers comparing results should sort.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    extensions: Vec<String>,
}

impl DirectoryWalker {
    /// Create a walker matching the given extensions (case-insensitive, no dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Lazily walk every directory of an already-suffixed namespace map
    pub fn walk(&self, namespaces: &NamespaceMap) -> Walk<'_> {
        let roots = namespaces
            .iter()
            .flat_map(|(namespace, dirs)| {
                dirs.iter()
                    .map(move |dir| (namespace.to_string(), absolutize(dir)))
            })
            .collect();
        Walk {
            walker: self,
            roots,
            current: None,
            pending_dirs: Vec::new(),
            pending_files: VecDeque::new(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy().to_lowercase();
                self.extensions.iter().any(|wanted| *wanted == ext)
            }
            None => false,
        }
    }
}

fn absolutize(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Iterator returned by [`DirectoryWalker::walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    walker: &'a DirectoryWalker,
    roots: VecDeque<(String, PathBuf)>,
    current: Option<(String, PathBuf)>,
    pending_dirs: Vec<PathBuf>,
    pending_files: VecDeque<WalkEntry>,
}

impl Walk<'_> {
    fn scan_dir(&mut self, dir: &Path) {
        let Some((namespace, root)) = &self.current else {
            return;
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read directory {}: {}", dir.display(), e);
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!("Failed to get file type for {}: {}", path.display(), e);
                    continue;
                }
            };

            // Symlinked directories are not followed
            if file_type.is_dir() {
                self.pending_dirs.push(path);
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && self.walker.matches(&path)
            {
                let sub_path = dir.strip_prefix(root).unwrap_or(Path::new("")).to_path_buf();
                self.pending_files.push_back(WalkEntry {
                    namespace: namespace.clone(),
                    path,
                    sub_path,
                });
            }
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            if let Some(entry) = self.pending_files.pop_front() {
                return Some(entry);
            }
            if let Some(dir) = self.pending_dirs.pop() {
                self.scan_dir(&dir);
                continue;
            }
            let (namespace, root) = self.roots.pop_front()?;
            if root.is_dir() {
                self.pending_dirs.push(root.clone());
                self.current = Some((namespace, root));
            } else {
                debug!("Skipping missing plugin directory {} ({})", root.display(), namespace);
            }
        }
    }
}
