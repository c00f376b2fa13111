use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A reference or citation edge as nested in a provider record.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PaperStub {
    #[serde(alias = "paperId")]
    pub paper_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct Author {
    #[serde(alias = "authorId")]
    pub author_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct Tldr {
    pub model: Option<String>,
    pub text: Option<String>,
}

/// Full paper record as returned by the batch endpoint.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
pub struct PaperRecord {
    #[serde(flatten)]
    pub paper: PaperStub,
    pub url: Option<String>,
    #[serde(alias = "abstract")]
    pub abstract_text: Option<String>,
    pub tldr: Option<Tldr>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Author>,
    #[serde(alias = "referenceCount")]
    pub reference_count: Option<u64>,
    #[serde(alias = "citationCount")]
    pub citation_count: Option<u64>,
    #[serde(alias = "influentialCitationCount")]
    pub influential_citation_count: Option<u64>,
    #[serde(alias = "publicationDate")]
    pub publication_date: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<PaperStub>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub citations: Vec<PaperStub>,
}

impl PaperRecord {
    pub fn title(&self) -> Option<&str> {
        self.paper.title.as_deref()
    }

    pub fn paper_id(&self) -> Option<&str> {
        self.paper.paper_id.as_deref()
    }

    pub fn tldr_text(&self) -> Option<&str> {
        self.tldr.as_ref().and_then(|t| t.text.as_deref())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum RankingMetric {
    #[default]
    #[value(name = "citations")]
    Citations,
    #[value(name = "influential_citations")]
    InfluentialCitations,
    #[value(name = "citations_per_day")]
    CitationsPerDay,
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RankingMetric::Citations => "citations",
            RankingMetric::InfluentialCitations => "influential_citations",
            RankingMetric::CitationsPerDay => "citations_per_day",
        };
        f.pad(name)
    }
}

/// Which text is shown below a title during the walkthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum DescriptionType {
    #[value(name = "None")]
    None,
    #[value(name = "abstract")]
    Abstract,
    #[default]
    #[value(name = "tldr")]
    Tldr,
}
