use crate::completed::CompletedPapers;
use crate::model::{DescriptionType, RankingMetric};
use crate::scorer::{RankedPaper, TitleMetadata, TitleMetadataMap};
use crate::Result;
use std::io::{BufRead, Write};

/// A reader's answer to "have you read this paper?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Read,
    Unread,
    /// Abort the walkthrough.
    Quit,
    /// Stop asking; every remaining paper counts as unread.
    StopAsking,
}

impl Answer {
    /// `y`, `q` and `c` in any case; anything else means unread.
    pub fn parse(input: &str) -> Answer {
        match input.trim().to_lowercase().as_str() {
            "y" => Answer::Read,
            "q" => Answer::Quit,
            "c" => Answer::StopAsking,
            _ => Answer::Unread,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PromptState {
    Ask,
    SkipRemaining,
    Stop,
}

/// Everything shown for one unread paper.
#[derive(Clone, Copy, Debug)]
pub struct PaperCard<'a> {
    pub position: usize,
    pub total: usize,
    pub paper: &'a RankedPaper,
    pub metadata: Option<&'a TitleMetadata>,
    pub description: Option<&'a str>,
}

pub trait Prompt {
    fn ask(&mut self, card: &PaperCard<'_>) -> Result<Answer>;
}

/// Line-oriented prompt, normally on stdin/stdout.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompt { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, _card: &PaperCard<'_>) -> Result<Answer> {
        writeln!(self.output, "\tHave you read this paper? (y/n, q to quit, c to stop asking)")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // closed input
            return Ok(Answer::Quit);
        }
        Ok(Answer::parse(&line))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WalkthroughOptions {
    pub interactive: bool,
    pub max_num_papers_to_read: Option<usize>,
    pub description_type: DescriptionType,
    pub metric: RankingMetric,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalkthroughOutcome {
    pub total_possible_score: f64,
    pub read_score: f64,
    pub to_read: Vec<RankedPaper>,
    pub newly_read: Vec<String>,
    pub quit: bool,
}

impl WalkthroughOutcome {
    pub fn read_fraction(&self) -> f64 {
        if self.total_possible_score > 0.0 {
            self.read_score / self.total_possible_score
        } else {
            0.0
        }
    }
}

fn description<'a>(metadata: Option<&'a TitleMetadata>, kind: DescriptionType) -> Option<&'a str> {
    let metadata = metadata?;
    match kind {
        DescriptionType::None => None,
        DescriptionType::Abstract => metadata.abstract_text.as_deref(),
        DescriptionType::Tldr => metadata.tldr.as_deref(),
    }
}

fn write_card<W: Write>(out: &mut W, card: &PaperCard<'_>) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{:<5.2}\t{}", card.paper.score, card.paper.title)?;
    if let Some(metadata) = card.metadata {
        writeln!(out, "\t{}\t{}", metadata.date_label(), metadata.author_names())?;
    }
    if let Some(text) = card.description {
        writeln!(out, "\t{}", text)?;
    }
    Ok(())
}

/// Walks the ranking from the top, tallying scores and collecting unread papers.
///
/// Titles found in `completed` count as read without being shown. Papers
/// marked read at the prompt are added to `completed`.
pub fn run_walkthrough<P: Prompt, W: Write>(
    ranked: &[RankedPaper],
    metadata: &TitleMetadataMap,
    mut completed: Option<&mut CompletedPapers>,
    options: WalkthroughOptions,
    prompt: &mut P,
    out: &mut W,
) -> Result<WalkthroughOutcome> {
    let mut outcome = WalkthroughOutcome::default();
    let mut state = if options.interactive {
        PromptState::Ask
    } else {
        PromptState::SkipRemaining
    };

    writeln!(out, "{:10}\tPaper Title", options.metric)?;

    for (index, paper) in ranked.iter().enumerate() {
        outcome.total_possible_score += paper.score;

        if completed
            .as_ref()
            .is_some_and(|c| c.contains(&paper.title))
        {
            outcome.read_score += paper.score;
        } else {
            let paper_metadata = metadata.get(&paper.title);
            let card = PaperCard {
                position: index + 1,
                total: ranked.len(),
                paper,
                metadata: paper_metadata,
                description: description(paper_metadata, options.description_type),
            };
            write_card(out, &card)?;

            let mut has_read = false;
            if state == PromptState::Ask {
                match prompt.ask(&card)? {
                    Answer::Read => {
                        outcome.read_score += paper.score;
                        if let Some(completed) = completed.as_deref_mut() {
                            completed.mark(&paper.title);
                        }
                        outcome.newly_read.push(paper.title.clone());
                        has_read = true;
                    }
                    Answer::Quit => {
                        state = PromptState::Stop;
                        break;
                    }
                    Answer::StopAsking => state = PromptState::SkipRemaining,
                    Answer::Unread => {}
                }
            }
            if !has_read {
                outcome.to_read.push(paper.clone());
            }
        }

        if let Some(max) = options.max_num_papers_to_read {
            if outcome.to_read.len() >= max {
                break;
            }
        }
    }

    outcome.quit = state == PromptState::Stop;
    out.flush()?;
    Ok(outcome)
}

pub fn write_report<W: Write>(out: &mut W, outcome: &WalkthroughOutcome) -> Result<()> {
    writeln!(out, "Total possible score: {}", outcome.total_possible_score)?;
    writeln!(out, "Read score: {}", outcome.read_score)?;
    writeln!(
        out,
        "Fraction of possible score read: {}",
        outcome.read_fraction()
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scorer::importance_score;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Replays canned answers and remembers which titles were asked about.
    #[derive(Default)]
    pub(crate) struct ScriptedPrompt {
        pub answers: VecDeque<Answer>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompt {
        pub fn new(answers: &[Answer]) -> Self {
            ScriptedPrompt {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn ask(&mut self, card: &PaperCard<'_>) -> Result<Answer> {
            self.asked.push(card.paper.title.clone());
            Ok(self.answers.pop_front().unwrap_or(Answer::Unread))
        }
    }

    fn ranked(n: usize) -> Vec<RankedPaper> {
        (0..n)
            .map(|i| {
                let value = (100 - i * 10) as f64;
                RankedPaper {
                    title: format!("Paper {i}"),
                    value,
                    score: importance_score(value),
                }
            })
            .collect()
    }

    fn interactive() -> WalkthroughOptions {
        WalkthroughOptions {
            interactive: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_answers() {
        assert_eq!(Answer::parse("y\n"), Answer::Read);
        assert_eq!(Answer::parse("Y"), Answer::Read);
        assert_eq!(Answer::parse("Q"), Answer::Quit);
        assert_eq!(Answer::parse("c"), Answer::StopAsking);
        assert_eq!(Answer::parse("n"), Answer::Unread);
        assert_eq!(Answer::parse("yes"), Answer::Unread);
    }

    #[test]
    fn test_score_accounting() {
        let papers = ranked(4);
        let dir = tempfile::tempdir().unwrap();
        let mut completed = CompletedPapers::empty(dir.path().join("done.csv"));
        completed.mark("Paper 2");

        let mut prompt = ScriptedPrompt::new(&[Answer::Read, Answer::Unread, Answer::Unread]);
        let outcome = run_walkthrough(
            &papers,
            &TitleMetadataMap::new(),
            Some(&mut completed),
            interactive(),
            &mut prompt,
            &mut std::io::sink(),
        )
        .unwrap();

        let total: f64 = papers.iter().map(|p| p.score).sum();
        assert!((outcome.total_possible_score - total).abs() < 1e-9);
        let read = papers[0].score + papers[2].score;
        assert!((outcome.read_score - read).abs() < 1e-9);
        assert_eq!(prompt.asked, vec!["Paper 0", "Paper 1", "Paper 3"]);
        assert_eq!(outcome.newly_read, vec!["Paper 0"]);
        assert!(completed.contains("Paper 0"));
        assert_eq!(outcome.to_read.len(), 2);
        assert!(!outcome.quit);
    }

    #[test]
    fn test_quit_stops_immediately() {
        let papers = ranked(5);
        let dir = tempfile::tempdir().unwrap();
        let mut completed = CompletedPapers::empty(dir.path().join("done.csv"));
        let mut prompt = ScriptedPrompt::new(&[Answer::Read, Answer::Quit, Answer::Read]);

        let outcome = run_walkthrough(
            &papers,
            &TitleMetadataMap::new(),
            Some(&mut completed),
            interactive(),
            &mut prompt,
            &mut std::io::sink(),
        )
        .unwrap();

        assert!(outcome.quit);
        assert_eq!(prompt.asked.len(), 2);
        assert_eq!(completed.len(), 1);
        assert!(outcome.to_read.is_empty());
    }

    #[test]
    fn test_stop_asking_treats_rest_as_unread() {
        let papers = ranked(5);
        let mut prompt = ScriptedPrompt::new(&[Answer::Unread, Answer::StopAsking, Answer::Read]);
        let mut out = Vec::new();
        let outcome = run_walkthrough(
            &papers,
            &TitleMetadataMap::new(),
            None,
            interactive(),
            &mut prompt,
            &mut out,
        )
        .unwrap();

        assert_eq!(prompt.asked.len(), 2);
        assert_eq!(outcome.to_read.len(), 5);
        assert_eq!(outcome.read_score, 0.0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Paper 4"));
    }

    #[test]
    fn test_max_papers_to_read_stops_listing() {
        let papers = ranked(5);
        let options = WalkthroughOptions {
            max_num_papers_to_read: Some(2),
            ..Default::default()
        };
        let mut prompt = ScriptedPrompt::default();
        let outcome = run_walkthrough(
            &papers,
            &TitleMetadataMap::new(),
            None,
            options,
            &mut prompt,
            &mut std::io::sink(),
        )
        .unwrap();

        assert!(prompt.asked.is_empty());
        assert_eq!(outcome.to_read.len(), 2);
        assert!((outcome.total_possible_score - papers[0].score - papers[1].score).abs() < 1e-9);
    }

    #[test]
    fn test_card_shows_metadata_and_description() {
        let papers = ranked(1);
        let mut metadata = TitleMetadataMap::new();
        metadata.insert(
            "Paper 0".to_string(),
            TitleMetadata {
                publication_date: Some("2021-03-04".into()),
                tldr: Some("Short summary.".into()),
                abstract_text: Some("Long abstract.".into()),
                ..Default::default()
            },
        );
        let options = WalkthroughOptions {
            description_type: DescriptionType::Abstract,
            metric: RankingMetric::Citations,
            ..Default::default()
        };
        let mut out = Vec::new();
        run_walkthrough(
            &papers,
            &metadata,
            None,
            options,
            &mut ScriptedPrompt::default(),
            &mut out,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("citations \tPaper Title\n"));
        assert!(text.contains("4.62 \tPaper 0\n"));
        assert!(text.contains("\t2021-03-04\t"));
        assert!(text.contains("\tLong abstract.\n"));
        assert!(!text.contains("Short summary."));
    }

    #[test]
    fn test_line_prompt_reads_answers() {
        let papers = ranked(1);
        let card = PaperCard {
            position: 1,
            total: 1,
            paper: &papers[0],
            metadata: None,
            description: None,
        };
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new(Cursor::new("Y\nq\n"), &mut output);
        assert_eq!(prompt.ask(&card).unwrap(), Answer::Read);
        assert_eq!(prompt.ask(&card).unwrap(), Answer::Quit);
        assert_eq!(prompt.ask(&card).unwrap(), Answer::Quit);
        drop(prompt);
        assert!(String::from_utf8(output).unwrap().contains("Have you read this paper?"));
    }

    #[test]
    fn test_report_fraction() {
        let outcome = WalkthroughOutcome {
            total_possible_score: 4.0,
            read_score: 1.0,
            ..Default::default()
        };
        let mut out = Vec::new();
        write_report(&mut out, &outcome).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total possible score: 4\n"));
        assert!(text.contains("Fraction of possible score read: 0.25\n"));
        assert_eq!(WalkthroughOutcome::default().read_fraction(), 0.0);
    }
}
