use crate::completion::ChatCompletion;
use crate::model::{PaperRecord, RankingMetric};
use crate::scorer::metric_value;
use crate::Result;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

lazy_static! {
    static ref AFFIRMATIVE: Regex = RegexBuilder::new("yes")
        .case_insensitive(true)
        .build()
        .unwrap();
}

pub fn classification_prompt(subfield: &str, abstract_text: &str) -> String {
    format!(
        "Determine if the following paper is in the {subfield} subfield using the abstract:\n{abstract_text}\n Is this paper in the {subfield} subfield? Answer yes or no."
    )
}

/// Any occurrence of "yes", in any case, counts as a match.
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE.is_match(answer)
}

/// Stable sort, highest metric first.
pub fn sort_by_metric(records: &mut [PaperRecord], metric: RankingMetric, today: NaiveDate) {
    records.sort_by(|a, b| {
        metric_value(b, metric, today)
            .partial_cmp(&metric_value(a, metric, today))
            .unwrap_or(Ordering::Equal)
    });
}

/// Keeps only papers a chat model places in a free-text subfield.
pub struct RelevanceFilter<C> {
    completion: C,
    subfield: String,
}

impl<C: ChatCompletion> RelevanceFilter<C> {
    pub fn new(completion: C, subfield: &str) -> Self {
        RelevanceFilter {
            completion,
            subfield: subfield.to_string(),
        }
    }

    pub fn subfield(&self) -> &str {
        &self.subfield
    }

    /// Ranks by `metric`, truncates to `max_count`, then asks once per paper.
    ///
    /// Papers without an abstract are dropped without asking. Survivors keep
    /// their ranked order.
    pub async fn apply(
        &self,
        mut records: Vec<PaperRecord>,
        metric: RankingMetric,
        max_count: Option<usize>,
        today: NaiveDate,
    ) -> Result<Vec<PaperRecord>> {
        sort_by_metric(&mut records, metric, today);
        if let Some(max_count) = max_count {
            records.truncate(max_count);
        }

        let mut included = Vec::with_capacity(records.len());
        for record in records {
            let title = record.title().unwrap_or("<unknown>").to_string();
            let Some(abstract_text) = record.abstract_text.as_deref() else {
                debug!("No abstract for {title}");
                continue;
            };

            let answer = self
                .completion
                .complete(
                    SYSTEM_PROMPT,
                    &classification_prompt(&self.subfield, abstract_text),
                )
                .await?;

            if is_affirmative(&answer) {
                info!("INCLUDE {title}");
                included.push(record);
            } else {
                info!("DELETE {title}");
            }
        }

        Ok(included)
    }
}
