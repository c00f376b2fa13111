use crate::Result;
use log::info;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Titles of papers already read, stored one per line.
#[derive(Debug, Default, Clone)]
pub struct CompletedPapers {
    path: PathBuf,
    titles: BTreeSet<String>,
}

impl CompletedPapers {
    pub fn empty<A: AsRef<Path>>(path: A) -> Self {
        CompletedPapers {
            path: path.as_ref().to_path_buf(),
            titles: BTreeSet::new(),
        }
    }

    pub fn from_file<A: AsRef<Path>>(path: A) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let titles = data
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(CompletedPapers {
            path: path.as_ref().to_path_buf(),
            titles,
        })
    }

    /// A missing file is an empty list; any other read failure is an error so
    /// an unreadable list is never overwritten.
    pub fn load_or_default<A: AsRef<Path>>(path: A) -> Result<Self> {
        match Self::from_file(&path) {
            Ok(completed) => Ok(completed),
            Err(e) => {
                let not_found = matches!(
                    e.kind(),
                    crate::ErrorKind::IoError(io) if io.kind() == std::io::ErrorKind::NotFound
                );
                if !not_found {
                    return Err(e);
                }
                info!(
                    "No completed list at {:?} yet, starting empty",
                    path.as_ref()
                );
                Ok(Self::empty(path))
            }
        }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// Returns false if the title was already recorded.
    pub fn mark(&mut self, title: &str) -> bool {
        self.titles.insert(title.to_string())
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        let file = std::fs::File::create(&self.path)?;
        let mut writer = std::io::BufWriter::new(file);
        for title in &self.titles {
            writeln!(writer, "{title}")?;
        }
        writer.flush()?;
        Ok(())
    }
}
