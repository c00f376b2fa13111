use crate::model::PaperRecord;
use crate::Result;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk cache of every record fetched so far, keyed by paper URL.
///
/// The file is rewritten in full on every [`RequestCache::save`].
#[derive(Debug, Default)]
pub struct RequestCache {
    path: PathBuf,
    entries: BTreeMap<String, PaperRecord>,
}

impl RequestCache {
    pub fn empty<A: AsRef<Path>>(path: A) -> Self {
        RequestCache {
            path: path.as_ref().to_path_buf(),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_file<A: AsRef<Path>>(path: A) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let reader = std::io::BufReader::new(file);
        let entries = serde_json::from_reader(reader)?;
        Ok(RequestCache {
            path: path.as_ref().to_path_buf(),
            entries,
        })
    }

    /// A missing or unreadable cache file yields an empty cache.
    pub fn load_or_default<A: AsRef<Path>>(path: A) -> Self {
        match Self::from_file(&path) {
            Ok(cache) => {
                debug!(
                    "Loaded {} cached records from {:?}",
                    cache.len(),
                    path.as_ref()
                );
                cache
            }
            Err(e) => {
                let not_found = matches!(
                    e.kind(),
                    crate::ErrorKind::IoError(io) if io.kind() == std::io::ErrorKind::NotFound
                );
                if !not_found {
                    warn!("Ignoring unreadable cache {:?}: {}", path.as_ref(), e);
                }
                Self::empty(path)
            }
        }
    }

    /// Stores every non-null record that carries a URL; returns how many were stored.
    pub fn insert_records(&mut self, records: &[Option<PaperRecord>]) -> usize {
        let mut stored = 0;
        for record in records.iter().flatten() {
            if let Some(url) = &record.url {
                self.entries.insert(url.clone(), record.clone());
                stored += 1;
            }
        }
        stored
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&PaperRecord> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let file = std::fs::File::create(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.entries)?;
        Ok(())
    }
}
