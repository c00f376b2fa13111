use crate::model::{PaperRecord, PaperStub};
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Upper bound on candidates fetched per round; the batch endpoint accepts at most 500 ids.
pub const MAX_UNIVERSE_SIZE: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniverseEntry {
    pub paper_id: String,
    pub title: Option<String>,
}

impl UniverseEntry {
    fn from_stub(stub: &PaperStub) -> Option<Self> {
        match &stub.paper_id {
            Some(paper_id) => Some(UniverseEntry {
                paper_id: paper_id.clone(),
                title: stub.title.clone(),
            }),
            None => {
                debug!(
                    "NOID {}",
                    stub.title.clone().unwrap_or("<unknown>".to_string())
                );
                None
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Expansion {
    pub universe: Vec<UniverseEntry>,
    /// Titles of the seed records themselves.
    pub seed_titles: HashSet<String>,
}

/// Follows every reference of every seed, and its citations only while the
/// seed has fewer than `ignore_super_cited` citations.
pub fn expand_universe(
    seeds: &[Option<PaperRecord>],
    ignore_super_cited: u64,
    use_multiplicity: bool,
) -> Expansion {
    let mut expansion = Expansion::default();

    for seed in seeds.iter().flatten() {
        if let Some(title) = seed.title() {
            expansion.seed_titles.insert(title.to_string());
        }

        expansion
            .universe
            .extend(seed.references.iter().filter_map(UniverseEntry::from_stub));

        if seed.citation_count.unwrap_or(0) < ignore_super_cited {
            expansion
                .universe
                .extend(seed.citations.iter().filter_map(UniverseEntry::from_stub));
        } else {
            debug!(
                "Not following citations of super-cited {}",
                seed.title().unwrap_or("<unknown>")
            );
        }
    }

    if !use_multiplicity {
        let mut unique = HashSet::with_capacity(expansion.universe.len());
        expansion.universe.retain(|entry| unique.insert(entry.clone()));
    }

    expansion
}

/// Uniform random subset of at most `limit` entries.
pub fn downsample<R: Rng>(
    universe: Vec<UniverseEntry>,
    limit: usize,
    rng: &mut R,
) -> Vec<UniverseEntry> {
    if universe.len() <= limit {
        return universe;
    }

    warn!(
        "Universe of {} papers downsampled to {}",
        universe.len(),
        limit
    );
    universe.choose_multiple(rng, limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(expansion: &Expansion) -> Vec<&str> {
        expansion
            .universe
            .iter()
            .map(|e| e.paper_id.as_str())
            .collect()
    }

    fn stub(id: &str) -> PaperStub {
        PaperStub {
            paper_id: Some(id.to_string()),
            title: Some(format!("Title {id}")),
        }
    }

    fn seed(
        title: &str,
        citation_count: u64,
        references: &[&str],
        citations: &[&str],
    ) -> PaperRecord {
        PaperRecord {
            paper: PaperStub {
                paper_id: Some(title.to_lowercase()),
                title: Some(title.to_string()),
            },
            citation_count: Some(citation_count),
            references: references.iter().map(|id| stub(id)).collect(),
            citations: citations.iter().map(|id| stub(id)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_citations_followed_below_threshold() {
        let seeds = vec![Some(seed("S", 10, &["r1"], &["c1", "c2"]))];
        let expansion = expand_universe(&seeds, 1000, true);
        assert_eq!(ids(&expansion), vec!["r1", "c1", "c2"]);
        assert_eq!(expansion.universe[1].title.as_deref(), Some("Title c1"));
        assert!(expansion.seed_titles.contains("S"));
    }

    #[test]
    fn test_citations_dropped_at_threshold() {
        let seeds = vec![Some(seed("S", 1000, &["r1", "r2"], &["c1"]))];
        let expansion = expand_universe(&seeds, 1000, true);
        assert_eq!(ids(&expansion), vec!["r1", "r2"]);
    }

    #[test]
    fn test_dedup_never_larger_than_multiset() {
        let seeds = vec![
            Some(seed("A", 1, &["r1", "r2"], &["c1"])),
            None,
            Some(seed("B", 1, &["r1"], &["c1", "c2"])),
        ];
        let multiset = expand_universe(&seeds, 1000, true);
        let unique = expand_universe(&seeds, 1000, false);

        assert_eq!(multiset.universe.len(), 6);
        assert_eq!(ids(&unique), vec!["r1", "r2", "c1", "c2"]);
        assert!(unique.universe.len() <= multiset.universe.len());

        let set: HashSet<_> = unique.universe.iter().collect();
        assert_eq!(set.len(), unique.universe.len());
        assert_eq!(unique.seed_titles.len(), 2);
    }

    #[test]
    fn test_edges_without_id_are_skipped() {
        let mut record = seed("S", 1, &["r1"], &[]);
        record.references.push(PaperStub {
            paper_id: None,
            title: Some("Unresolvable".into()),
        });
        let expansion = expand_universe(&[Some(record)], 1000, true);
        assert_eq!(ids(&expansion), vec!["r1"]);
    }

    #[test]
    fn test_downsample_caps_size() {
        let universe: Vec<_> = (0..1200)
            .map(|i| UniverseEntry {
                paper_id: i.to_string(),
                title: None,
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = downsample(universe.clone(), MAX_UNIVERSE_SIZE, &mut rng);
        assert_eq!(sampled.len(), MAX_UNIVERSE_SIZE);
        assert!(sampled.iter().all(|e| universe.contains(e)));

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(downsample(universe, MAX_UNIVERSE_SIZE, &mut rng), sampled);
    }

    #[test]
    fn test_downsample_keeps_small_universe() {
        let universe = vec![UniverseEntry {
            paper_id: "x".into(),
            title: None,
        }];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(downsample(universe.clone(), 500, &mut rng), universe);
    }
}
