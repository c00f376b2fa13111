use crate::model::{Author, PaperRecord, RankingMetric};
use chrono::NaiveDate;
use log::warn;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Assumed age of a paper that carries neither a date nor a year.
pub const FALLBACK_AGE_DAYS: i64 = 365;

/// Accumulated metric value per title.
pub type CitationCountMap = HashMap<String, f64>;

/// Display-only metadata per title.
pub type TitleMetadataMap = HashMap<String, TitleMetadata>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TitleMetadata {
    pub authors: Vec<Author>,
    pub publication_date: Option<String>,
    pub year: Option<i32>,
    pub tldr: Option<String>,
    pub abstract_text: Option<String>,
}

impl TitleMetadata {
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn date_label(&self) -> String {
        match (&self.publication_date, self.year) {
            (Some(date), _) => date.clone(),
            (None, Some(year)) => year.to_string(),
            (None, None) => "<no date>".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedPaper {
    pub title: String,
    pub value: f64,
    pub score: f64,
}

/// Days since publication, preferring the exact date over January 1 of the year.
///
/// Clamped to at least one day so same-day and future dates stay finite.
pub fn days_since_publication(record: &PaperRecord, today: NaiveDate) -> i64 {
    let published = record
        .publication_date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .or_else(|| record.year.and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)));

    match published {
        Some(date) => (today - date).num_days().max(1),
        None => {
            warn!(
                "No publication date for {}, assuming {} days",
                record.title().unwrap_or("<unknown>"),
                FALLBACK_AGE_DAYS
            );
            FALLBACK_AGE_DAYS
        }
    }
}

/// Raw ranking value; absent counts are zero.
pub fn metric_value(record: &PaperRecord, metric: RankingMetric, today: NaiveDate) -> f64 {
    match metric {
        RankingMetric::Citations => record.citation_count.unwrap_or(0) as f64,
        RankingMetric::InfluentialCitations => {
            record.influential_citation_count.unwrap_or(0) as f64
        }
        RankingMetric::CitationsPerDay => {
            record.citation_count.unwrap_or(0) as f64
                / days_since_publication(record, today) as f64
        }
    }
}

/// `ln(value + 1)`: zero for zero, growing ever more slowly.
pub fn importance_score(value: f64) -> f64 {
    value.ln_1p()
}

/// Sums metric values of all records sharing a title. Untitled records are ignored.
pub fn citation_counts(
    records: &[PaperRecord],
    metric: RankingMetric,
    today: NaiveDate,
) -> CitationCountMap {
    let mut counts = CitationCountMap::with_capacity(records.len());
    for record in records {
        if let Some(title) = record.title() {
            *counts.entry(title.to_string()).or_insert(0.0) += metric_value(record, metric, today);
        }
    }
    counts
}

/// First record seen for a title provides its display metadata.
pub fn title_metadata(records: &[PaperRecord]) -> TitleMetadataMap {
    let mut metadata = TitleMetadataMap::with_capacity(records.len());
    for record in records {
        if let Some(title) = record.title() {
            metadata
                .entry(title.to_string())
                .or_insert_with(|| TitleMetadata {
                    authors: record.authors.clone(),
                    publication_date: record.publication_date.clone(),
                    year: record.year,
                    tldr: record.tldr_text().map(String::from),
                    abstract_text: record.abstract_text.clone(),
                });
        }
    }
    metadata
}

/// Descending by importance score; ties broken by title.
pub fn rank(counts: &CitationCountMap) -> Vec<RankedPaper> {
    let mut ranked: Vec<RankedPaper> = counts
        .iter()
        .map(|(title, value)| RankedPaper {
            title: title.clone(),
            value: *value,
            score: importance_score(*value),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    ranked
}
