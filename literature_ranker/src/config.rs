use crate::completion::{DEFAULT_COMPLETION_ENDPOINT, DEFAULT_COMPLETION_MODEL};
use crate::model::{DescriptionType, RankingMetric};
use crate::semantic_scholar::DEFAULT_API_BASE;
use crate::{ErrorKind, Result};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};

pub const SEMANTIC_SCHOLAR_KEY_VAR: &str = "SEMANTIC_SCHOLAR_API_KEY";
pub const SEMANTIC_SCHOLAR_KEY_FILE: &str = "api.key";
pub const COMPLETION_KEY_VAR: &str = "OPENAI_API_KEY";

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Rank papers around a seed set by citation impact and track which ones you have read",
    long_about = None
)]
pub struct Args {
    /// Seed paper ids, e.g. ARXIV:2409.11321 or a Semantic Scholar id
    #[arg(long = "paper_ids", num_args = 1.., required = true)]
    pub paper_ids: Vec<String>,
    /// Newline separated titles of papers already read
    #[arg(long = "completed_paper_list")]
    pub completed_paper_list: Option<PathBuf>,
    /// Ask for every unread paper whether it has been read
    #[arg(long = "interactive_mode")]
    pub interactive_mode: bool,
    #[arg(long = "ranking_metric", value_enum, default_value_t = RankingMetric::Citations)]
    pub ranking_metric: RankingMetric,
    /// Stop once this many unread papers were listed
    #[arg(long = "max_num_papers_to_read", alias = "num_papers_to_read")]
    pub max_num_papers_to_read: Option<usize>,
    #[arg(long = "paper_description_type", value_enum, default_value_t = DescriptionType::Tldr)]
    pub paper_description_type: DescriptionType,
    /// Only keep papers a language model places in this subfield
    #[arg(long = "target_subfield_filter")]
    pub target_subfield_filter: Option<String>,
    /// Number of expansion rounds
    #[arg(
        long = "k_steps",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub k_steps: u32,
    /// Citations of papers with at least this many citations are not followed
    #[arg(long = "ignore_super_cited", default_value_t = 1000)]
    pub ignore_super_cited: u64,
    /// Count every paper once, no matter how many seeds point at it
    #[arg(long = "deduplicate_universe")]
    pub deduplicate_universe: bool,
    #[arg(long = "cache_file", default_value = "request_cache.json")]
    pub cache_file: PathBuf,
    /// Seed for downsampling large universes
    #[arg(long = "seed")]
    pub seed: Option<u64>,
    /// Full-screen prompt instead of line prompts
    #[arg(long = "tui")]
    pub tui: bool,
    #[arg(long = "api_base", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    #[arg(long = "completion_endpoint", default_value = DEFAULT_COMPLETION_ENDPOINT)]
    pub completion_endpoint: String,
    #[arg(long = "completion_model", default_value = DEFAULT_COMPLETION_MODEL)]
    pub completion_model: String,
}

/// Arguments plus resolved secrets, validated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub args: Args,
    pub semantic_scholar_key: Option<String>,
    pub completion_key: Option<String>,
}

/// `env_key` if set, else the trimmed contents of `key_file`.
pub fn read_semantic_scholar_key(env_key: Option<String>, key_file: &Path) -> Option<String> {
    env_key
        .or_else(|| std::fs::read_to_string(key_file).ok())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

impl Settings {
    pub fn resolve(args: Args) -> Result<Self> {
        let semantic_scholar_key = read_semantic_scholar_key(
            env::var(SEMANTIC_SCHOLAR_KEY_VAR).ok(),
            Path::new(SEMANTIC_SCHOLAR_KEY_FILE),
        );
        let completion_key = if args.target_subfield_filter.is_some() {
            let key = env::var(COMPLETION_KEY_VAR)
                .map_err(|_| ErrorKind::MissingApiKey(COMPLETION_KEY_VAR.to_string()))?;
            Some(key)
        } else {
            None
        };
        Self::with_keys(args, semantic_scholar_key, completion_key)
    }

    pub fn with_keys(
        args: Args,
        semantic_scholar_key: Option<String>,
        completion_key: Option<String>,
    ) -> Result<Self> {
        if args.interactive_mode && args.completed_paper_list.is_none() {
            return Err(ErrorKind::InteractiveWithoutCompletedList.into());
        }
        if args.target_subfield_filter.is_some() && completion_key.is_none() {
            return Err(ErrorKind::MissingApiKey(COMPLETION_KEY_VAR.to_string()).into());
        }

        Ok(Settings {
            args,
            semantic_scholar_key,
            completion_key,
        })
    }
}
