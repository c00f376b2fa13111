use crate::completed::CompletedPapers;
use crate::completion::ChatCompletion;
use crate::expander::{downsample, expand_universe, MAX_UNIVERSE_SIZE};
use crate::fetcher::MetadataFetcher;
use crate::model::{DescriptionType, PaperRecord, RankingMetric};
use crate::relevance::RelevanceFilter;
use crate::scorer::{citation_counts, rank, title_metadata, RankedPaper, TitleMetadataMap};
use crate::semantic_scholar::PaperSource;
use crate::walkthrough::{
    run_walkthrough, write_report, Prompt, WalkthroughOptions, WalkthroughOutcome,
};
use crate::Result;
use chrono::NaiveDate;
use log::{debug, info};
use rand::Rng;
use std::collections::HashSet;
use std::io::Write;

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub k_steps: usize,
    pub ignore_super_cited: u64,
    pub use_multiplicity: bool,
    pub metric: RankingMetric,
    pub max_num_papers_to_read: Option<usize>,
    pub max_universe_size: usize,
    pub interactive: bool,
    pub description_type: DescriptionType,
    pub today: NaiveDate,
}

impl SessionOptions {
    pub fn new(today: NaiveDate) -> Self {
        SessionOptions {
            k_steps: 1,
            ignore_super_cited: 1000,
            use_multiplicity: true,
            metric: RankingMetric::Citations,
            max_num_papers_to_read: None,
            max_universe_size: MAX_UNIVERSE_SIZE,
            interactive: false,
            description_type: DescriptionType::Tldr,
            today,
        }
    }
}

/// Result of the expansion rounds.
#[derive(Clone, Debug, Default)]
pub struct Discovery {
    /// Records of the last round that ran.
    pub records: Vec<PaperRecord>,
    pub rounds: usize,
    pub seen_titles: HashSet<String>,
}

#[derive(Clone, Debug)]
pub struct SessionReport {
    pub ranked: Vec<RankedPaper>,
    pub outcome: WalkthroughOutcome,
}

pub struct Session<S, C, R> {
    fetcher: MetadataFetcher<S>,
    filter: Option<RelevanceFilter<C>>,
    options: SessionOptions,
    rng: R,
}

impl<S: PaperSource, C: ChatCompletion, R: Rng> Session<S, C, R> {
    pub fn new(
        fetcher: MetadataFetcher<S>,
        filter: Option<RelevanceFilter<C>>,
        options: SessionOptions,
        rng: R,
    ) -> Self {
        Session {
            fetcher,
            filter,
            options,
            rng,
        }
    }

    pub fn fetcher(&self) -> &MetadataFetcher<S> {
        &self.fetcher
    }

    /// Expands, fetches and optionally filters for up to `k_steps` rounds.
    ///
    /// Each round seeds the next with its surviving candidates, minus every
    /// title already used as a seed.
    pub async fn discover(&mut self, paper_ids: &[String]) -> Result<Discovery> {
        let mut discovery = Discovery::default();
        let mut candidates: Vec<String> = paper_ids.to_vec();

        for round in 1..=self.options.k_steps {
            if candidates.is_empty() {
                info!("Round {round}: no candidates left, stopping");
                break;
            }

            let seeds = self.fetcher.fetch(&candidates).await?;
            let expansion = expand_universe(
                &seeds,
                self.options.ignore_super_cited,
                self.options.use_multiplicity,
            );
            discovery.seen_titles.extend(expansion.seed_titles);

            let universe = downsample(
                expansion.universe,
                self.options.max_universe_size,
                &mut self.rng,
            );
            info!(
                "Round {round}: {} seeds, {} candidates",
                candidates.len(),
                universe.len()
            );

            let ids: Vec<String> = universe.into_iter().map(|e| e.paper_id).collect();
            let fetched = self.fetcher.fetch(&ids).await?;
            let unresolved = fetched.iter().filter(|r| r.is_none()).count();
            if unresolved > 0 {
                debug!("Round {round}: {unresolved} ids could not be resolved");
            }
            let mut records: Vec<PaperRecord> = fetched.into_iter().flatten().collect();

            if let Some(filter) = &self.filter {
                records = filter
                    .apply(
                        records,
                        self.options.metric,
                        self.options.max_num_papers_to_read,
                        self.options.today,
                    )
                    .await?;
                info!(
                    "Round {round}: {} papers in {}",
                    records.len(),
                    filter.subfield()
                );
            }

            let mut next = HashSet::new();
            candidates = records
                .iter()
                .filter(|r| r.title().map_or(true, |t| !discovery.seen_titles.contains(t)))
                .filter_map(|r| r.paper_id())
                .filter(|id| next.insert(id.to_string()))
                .map(String::from)
                .collect();

            discovery.records = records;
            discovery.rounds = round;
        }

        Ok(discovery)
    }

    /// Discovery, ranking, walkthrough and persistence of the completed list.
    ///
    /// The score summary is only written when a completed list was supplied.
    pub async fn run<P: Prompt, W: Write>(
        &mut self,
        paper_ids: &[String],
        mut completed: Option<CompletedPapers>,
        prompt: &mut P,
        out: &mut W,
    ) -> Result<SessionReport> {
        let discovery = self.discover(paper_ids).await?;
        let (ranked, metadata) = self.rank_records(&discovery.records);

        let options = WalkthroughOptions {
            interactive: self.options.interactive,
            max_num_papers_to_read: self.options.max_num_papers_to_read,
            description_type: self.options.description_type,
            metric: self.options.metric,
        };
        let outcome = run_walkthrough(
            &ranked,
            &metadata,
            completed.as_mut(),
            options,
            prompt,
            out,
        )?;

        if let Some(completed) = &completed {
            if self.options.interactive {
                completed.save()?;
                info!(
                    "Saved {} completed papers to {:?}",
                    completed.len(),
                    completed.path()
                );
            }
            write_report(out, &outcome)?;
        }

        Ok(SessionReport { ranked, outcome })
    }

    pub fn rank_records(&self, records: &[PaperRecord]) -> (Vec<RankedPaper>, TitleMetadataMap) {
        let counts = citation_counts(records, self.options.metric, self.options.today);
        (rank(&counts), title_metadata(records))
    }
}
