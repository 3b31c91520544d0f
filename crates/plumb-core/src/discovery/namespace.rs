use std::path::PathBuf;

use crate::kernel::constants::NAMESPACE_SEPARATOR;

/// Ordered mapping from base namespace to its root directories.
///
/// Supplied by the host. Namespaces keep their insertion order; inserting a
/// namespace twice appends the directory to the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root directory for a namespace
    pub fn insert(&mut self, namespace: impl Into<String>, dir: impl Into<PathBuf>) -> &mut Self {
        let namespace = namespace.into();
        let dir = dir.into();
        match self.entries.iter_mut().find(|(name, _)| *name == namespace) {
            Some((_, dirs)) => dirs.push(dir),
            None => self.entries.push((namespace, vec![dir])),
        }
        self
    }

    /// Builder-style variant of [`insert`](Self::insert)
    pub fn with(mut self, namespace: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.insert(namespace, dir);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(name, dirs)| (name.as_str(), dirs.as_slice()))
    }

    pub fn dirs(&self, namespace: &str) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, dirs)| dirs.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map every base namespace to its plugin namespace.
    ///
    /// `Plugin/Runner` turns `app::runner` into `app::runner::Plugin::Runner`
    /// and `/src` into `/src/Plugin/Runner`. An empty sub-directory returns
    /// the map unchanged.
    pub fn with_suffix(&self, subdir: &str) -> NamespaceMap {
        let segments: Vec<&str> = subdir.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return self.clone();
        }

        let namespace_suffix = segments.join(NAMESPACE_SEPARATOR);
        let relative: PathBuf = segments.iter().collect();

        let entries = self
            .entries
            .iter()
            .map(|(name, dirs)| {
                let namespace = format!("{}{}{}", name, NAMESPACE_SEPARATOR, namespace_suffix);
                let dirs = dirs.iter().map(|dir| dir.join(&relative)).collect();
                (namespace, dirs)
            })
            .collect();
        NamespaceMap { entries }
    }
}

impl<N: Into<String>, D: Into<PathBuf>> FromIterator<(N, D)> for NamespaceMap {
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        let mut map = NamespaceMap::new();
        for (namespace, dir) in iter {
            map.insert(namespace, dir);
        }
        map
    }
}
