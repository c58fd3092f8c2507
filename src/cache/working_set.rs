//! The working set (SSM): system ids selected for bulk operations

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::{persist, store};

const FILE_NAME: &str = "ssm";

/// Persisted selection of system ids. Unlike the entity caches it never
/// expires; the stored timestamp is ignored.
#[derive(Debug, Default)]
pub struct WorkingSet {
    ids: BTreeSet<i64>,
    file: Option<PathBuf>,
}

impl WorkingSet {
    /// Bind to `dir` and load the selection found there
    pub fn load(&mut self, dir: &Path) {
        let file = dir.join(FILE_NAME);
        self.ids = store::load::<BTreeSet<i64>>(&file).mapping;
        self.file = Some(file);
    }

    /// Add ids, returning how many were new
    pub fn add(&mut self, ids: impl IntoIterator<Item = i64>) -> usize {
        let before = self.ids.len();
        self.ids.extend(ids);
        self.persist();
        self.ids.len() - before
    }

    /// Remove ids, returning how many were present
    pub fn remove(&mut self, ids: impl IntoIterator<Item = i64>) -> usize {
        let removed = ids.into_iter().filter(|id| self.ids.remove(id)).count();
        self.persist();
        removed
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.persist();
    }

    fn persist(&self) {
        persist(self.file.as_deref(), &self.ids, store::expired_at());
    }

    pub fn ids(&self) -> &BTreeSet<i64> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_remove_counts() {
        let mut set = WorkingSet::default();

        assert_eq!(set.add([1, 2, 3]), 3);
        assert_eq!(set.add([3, 4]), 1);
        assert_eq!(set.remove([1, 9]), 1);
        assert_eq!(set.ids().iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_selection_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut set = WorkingSet::default();
        set.load(temp_dir.path());
        set.add([1000010000, 1000010001]);

        let mut reloaded = WorkingSet::default();
        reloaded.load(temp_dir.path());
        assert_eq!(reloaded.len(), 2);

        reloaded.clear();
        let mut again = WorkingSet::default();
        again.load(temp_dir.path());
        assert!(again.is_empty());
    }
}
