use crate::model::PaperRecord;
use crate::query::query_api_raw;
use crate::Result;
use reqwest::Client;
use serde::Serialize;

pub const DEFAULT_API_BASE: &str = "https://api.semanticscholar.org";

pub const PAPER_FIELD_QUERY: &str = "paperId,title,url,abstract,tldr,authors,referenceCount,citationCount,influentialCitationCount,publicationDate,year,references,citations";

/// Anything that can resolve a batch of paper identifiers.
///
/// The result holds one entry per requested identifier, in request order,
/// with `None` for identifiers the provider could not resolve.
#[allow(async_fn_in_trait)]
pub trait PaperSource {
    async fn fetch_batch(&self, ids: &[String]) -> Result<Vec<Option<PaperRecord>>>;
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String],
}

pub struct SemanticScholar {
    host: String,
    api_key: Option<String>,
    client: Client,
}

impl SemanticScholar {
    pub fn new(host: &str, api_key: Option<String>) -> Self {
        SemanticScholar {
            host: host.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }
}

impl PaperSource for SemanticScholar {
    async fn fetch_batch(&self, ids: &[String]) -> Result<Vec<Option<PaperRecord>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/graph/v1/paper/batch?fields={}",
            self.host, PAPER_FIELD_QUERY
        );
        let query = self.client.post(url).json(&BatchRequest { ids });
        let query = if let Some(key) = &self.api_key {
            query.header("x-api-key", key)
        } else {
            query
        };

        query_api_raw(query).await
    }
}
