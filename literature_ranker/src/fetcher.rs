use crate::cache::RequestCache;
use crate::model::PaperRecord;
use crate::semantic_scholar::PaperSource;
use crate::Result;
use log::debug;

/// Batch lookups with write-through into the request cache.
pub struct MetadataFetcher<S> {
    source: S,
    cache: RequestCache,
}

impl<S: PaperSource> MetadataFetcher<S> {
    pub fn new(source: S, cache: RequestCache) -> Self {
        MetadataFetcher { source, cache }
    }

    /// One batch call; the cache file is rewritten before returning.
    pub async fn fetch(&mut self, ids: &[String]) -> Result<Vec<Option<PaperRecord>>> {
        let records = self.source.fetch_batch(ids).await?;
        let stored = self.cache.insert_records(&records);
        self.cache.save()?;

        debug!(
            "Fetched {}/{} records, cache now holds {}",
            stored,
            ids.len(),
            self.cache.len()
        );

        Ok(records)
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::PaperStub;
    use crate::ErrorKind;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory provider that records every batch it was asked for.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub papers: HashMap<String, PaperRecord>,
        pub calls: RefCell<Vec<Vec<String>>>,
        pub reject: bool,
    }

    impl FakeSource {
        pub fn with(records: Vec<PaperRecord>) -> Self {
            FakeSource {
                papers: records
                    .into_iter()
                    .map(|r| (r.paper_id().unwrap_or_default().to_string(), r))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl PaperSource for FakeSource {
        async fn fetch_batch(&self, ids: &[String]) -> Result<Vec<Option<PaperRecord>>> {
            self.calls.borrow_mut().push(ids.to_vec());
            if self.reject {
                return Err(ErrorKind::BadRequest(400, "rejected".into()).into());
            }
            Ok(ids.iter().map(|id| self.papers.get(id).cloned()).collect())
        }
    }

    pub(crate) fn paper(id: &str, title: &str, citations: u64) -> PaperRecord {
        PaperRecord {
            paper: PaperStub {
                paper_id: Some(id.to_string()),
                title: Some(title.to_string()),
            },
            url: Some(format!("https://www.semanticscholar.org/paper/{id}")),
            citation_count: Some(citations),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_persists_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request_cache.json");
        let source = FakeSource::with(vec![paper("a", "A", 1)]);
        let mut fetcher = MetadataFetcher::new(source, RequestCache::empty(&path));

        let records = fetcher
            .fetch(&["a".to_string(), "unknown".to_string()])
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].is_none());
        assert_eq!(fetcher.source().calls.borrow().len(), 1);

        let on_disk = RequestCache::load_or_default(&path);
        assert!(on_disk
            .get("https://www.semanticscholar.org/paper/a")
            .is_some());
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request_cache.json");
        let source = FakeSource {
            reject: true,
            ..Default::default()
        };
        let mut fetcher = MetadataFetcher::new(source, RequestCache::empty(&path));
        let err = fetcher.fetch(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::BadRequest(..)));
        assert!(!path.exists());
    }
}
