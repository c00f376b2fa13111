use clap::Parser;
use literature_ranker::cache::RequestCache;
use literature_ranker::completed::CompletedPapers;
use literature_ranker::completion::OpenAiChat;
use literature_ranker::config::{Args, Settings};
use literature_ranker::fetcher::MetadataFetcher;
use literature_ranker::relevance::RelevanceFilter;
use literature_ranker::semantic_scholar::SemanticScholar;
use literature_ranker::session::{Session, SessionOptions};
use literature_ranker::tui::TerminalPrompt;
use literature_ranker::walkthrough::LinePrompt;
use literature_ranker::Result;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

async fn run(settings: Settings) -> Result<()> {
    let args = settings.args;

    let cache = RequestCache::load_or_default(&args.cache_file);
    info!("Loaded {} cached records from {:?}", cache.len(), cache.path());
    let source = SemanticScholar::new(&args.api_base, settings.semantic_scholar_key);
    let fetcher = MetadataFetcher::new(source, cache);

    let filter = match (&args.target_subfield_filter, settings.completion_key) {
        (Some(subfield), Some(key)) => Some(RelevanceFilter::new(
            OpenAiChat::new(&args.completion_endpoint, key, &args.completion_model),
            subfield,
        )),
        _ => None,
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let options = SessionOptions {
        k_steps: args.k_steps as usize,
        ignore_super_cited: args.ignore_super_cited,
        use_multiplicity: !args.deduplicate_universe,
        metric: args.ranking_metric,
        max_num_papers_to_read: args.max_num_papers_to_read,
        interactive: args.interactive_mode,
        description_type: args.paper_description_type,
        ..SessionOptions::new(chrono::Local::now().date_naive())
    };

    let completed = args
        .completed_paper_list
        .as_ref()
        .map(CompletedPapers::load_or_default)
        .transpose()?;

    let mut session = Session::new(fetcher, filter, options, rng);

    if args.interactive_mode && args.tui {
        // the card owns the screen, so the listing is shown once it is gone
        let mut buffer = Vec::new();
        let result = {
            let mut prompt = TerminalPrompt::new(args.target_subfield_filter.as_deref());
            session
                .run(&args.paper_ids, completed, &mut prompt, &mut buffer)
                .await
        };
        std::io::stdout().write_all(&buffer)?;
        result?;
    } else {
        let stdin = std::io::stdin();
        let mut prompt = LinePrompt::new(stdin.lock(), std::io::stdout());
        let mut stdout = std::io::stdout();
        session
            .run(&args.paper_ids, completed, &mut prompt, &mut stdout)
            .await?;
    }

    let cache = session.fetcher().cache();
    info!("{} records cached in {:?}", cache.len(), cache.path());

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();

    let result = match Settings::resolve(args) {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{}", e);
        for cause in e.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
