use crate::error::LoaderError;
use crate::reader::load_partner_table;
use core_types::PartnerTable;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// A read-only cache of loaded partner bases.
///
/// Entries are keyed by canonical path and remember the file's modification
/// time; a source whose modification time changed is reloaded. The cache is
/// owned by its caller and only changes through `&mut self`.
///
/// Hits only happen when a process builds several reports from one source;
/// a one-shot command loads through it exactly once.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<PathBuf, CachedSource>,
}

#[derive(Debug)]
struct CachedSource {
    modified: SystemTime,
    table: Arc<PartnerTable>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `path`, loading it on first use or when
    /// the file was modified since it was cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<PartnerTable>, LoaderError> {
        let unavailable = |source| LoaderError::Unavailable {
            path: path.to_path_buf(),
            source,
        };
        let key = fs::canonicalize(path).map_err(unavailable)?;
        let modified = fs::metadata(&key)
            .and_then(|m| m.modified())
            .map_err(unavailable)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                tracing::debug!(path = %key.display(), "Partner base served from cache.");
                return Ok(Arc::clone(&entry.table));
            }
            tracing::info!(path = %key.display(), "Partner base changed on disk, reloading.");
        }

        let table = Arc::new(load_partner_table(&key)?);
        self.entries.insert(
            key,
            CachedSource {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drops the entry for `path`. Returns whether anything was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
