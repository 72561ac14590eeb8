//! Monte-Carlo PageRank by random-surfer sampling
//!
//! Simulates one long Markov chain over the link graph and reports how
//! often each page was visited. Long-run visit frequency converges to the
//! stationary distribution.

use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use crate::config::{check_chains, check_damping, check_sample_count, RankConfig};
use crate::error::{Error, Result};
use crate::graph::{LinkGraph, NodeId};
use crate::pagerank::RankDistribution;
use crate::transition::TransitionSampler;

/// Visit counts from a sampling run
#[derive(Debug, Clone, PartialEq)]
pub struct SampleResult {
    /// Visits per node (indexed by node ID); sums to `sample_count`
    pub counts: Vec<u64>,
    /// Total number of samples drawn
    pub sample_count: usize,
    /// Number of independent chains the samples came from
    pub chains: usize,
    /// Seed of the first chain
    pub seed: u64,
}

impl SampleResult {
    /// Visit frequency per node
    pub fn scores(&self) -> Vec<f64> {
        let n = self.sample_count as f64;
        self.counts.iter().map(|&c| c as f64 / n).collect()
    }
}

/// Sampling PageRank estimator
#[derive(Debug, Clone)]
pub struct SamplingEstimator {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Total number of samples
    pub sample_count: usize,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
    /// Number of independent chains
    pub chains: usize,
}

impl Default for SamplingEstimator {
    fn default() -> Self {
        Self::from_config(&RankConfig::default())
    }
}

impl SamplingEstimator {
    /// Create a new SamplingEstimator with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the sampling-related fields of a run config
    pub fn from_config(config: &RankConfig) -> Self {
        Self {
            damping: config.damping,
            sample_count: config.sample_count,
            seed: config.seed,
            chains: config.chains,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the number of samples
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Fix the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Split the samples over `chains` independent walks
    ///
    /// Chain `i` is seeded with `seed + i`. With one chain (the default) this
    /// is the single-trajectory estimator.
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Run the estimator and return raw visit counts
    pub fn run<N: NodeId>(&self, graph: &LinkGraph<N>) -> Result<SampleResult> {
        check_damping(self.damping)?;
        check_sample_count(self.sample_count)?;
        check_chains(self.chains, self.sample_count)?;
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }

        trace_stage!(
            "sampling",
            nodes = graph.num_nodes(),
            samples = self.sample_count,
            chains = self.chains
        );

        let seed = self.seed.unwrap_or_else(rand::random);

        let counts = if self.chains == 1 {
            run_chain(graph, self.damping, seed, self.sample_count)?
        } else {
            let per_chain = self.sample_count / self.chains;
            let remainder = self.sample_count % self.chains;
            let partials = (0..self.chains)
                .into_par_iter()
                .map(|i| {
                    let len = per_chain + usize::from(i < remainder);
                    run_chain(graph, self.damping, seed.wrapping_add(i as u64), len)
                })
                .collect::<Result<Vec<_>>>()?;

            // Merge by summing counts so normalisation stays over total samples
            let mut counts = vec![0u64; graph.num_nodes()];
            for partial in partials {
                for (total, c) in counts.iter_mut().zip(partial) {
                    *total += c;
                }
            }
            counts
        };

        trace_event!(debug, seed, "sampling finished");

        Ok(SampleResult {
            counts,
            sample_count: self.sample_count,
            chains: self.chains,
            seed,
        })
    }

    /// Run the estimator and label visit frequencies by page
    pub fn rank<N: NodeId>(&self, graph: &LinkGraph<N>) -> Result<RankDistribution<N>> {
        let result = self.run(graph)?;
        graph.distribution(&result.scores())
    }
}

/// Walk one chain of `samples` pages, counting visits.
fn run_chain<N: NodeId>(
    graph: &LinkGraph<N>,
    damping: f64,
    seed: u64,
    samples: usize,
) -> Result<Vec<u64>> {
    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut sampler = TransitionSampler::new(graph, damping)?;
    let mut counts = vec![0u64; graph.num_nodes()];

    let mut current = sampler.start(&mut rng);
    counts[current as usize] += 1;
    for _ in 1..samples {
        current = sampler.next(current, &mut rng);
        counts[current as usize] += 1;
    }

    Ok(counts)
}

/// Estimate PageRank from `sample_count` steps of one random walk.
///
/// Unseeded; use [`SamplingEstimator::with_seed`] for reproducible runs.
pub fn sample_rank<N: NodeId>(
    graph: &LinkGraph<N>,
    damping: f64,
    sample_count: usize,
) -> Result<RankDistribution<N>> {
    SamplingEstimator::new()
        .with_damping(damping)
        .with_sample_count(sample_count)
        .rank(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_pair_graph() -> LinkGraph<&'static str> {
        LinkGraph::from_pages([("A", vec!["B"]), ("B", vec!["A"])]).unwrap()
    }

    fn build_dangling_graph() -> LinkGraph<&'static str> {
        LinkGraph::from_pages([("A", vec!["B", "C"]), ("B", vec![]), ("C", vec!["A"])]).unwrap()
    }

    #[test]
    fn test_counts_sum_to_sample_count() {
        let graph = build_dangling_graph();
        let result = SamplingEstimator::new()
            .with_sample_count(5_000)
            .with_seed(7)
            .run(&graph)
            .unwrap();

        assert_eq!(result.counts.iter().sum::<u64>(), 5_000);
        let sum: f64 = result.scores().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_page_present() {
        // "D" is unreachable from the others but still gets a key
        let graph = LinkGraph::from_pages([
            ("A", vec!["B"]),
            ("B", vec!["A"]),
            ("D", vec!["A"]),
        ])
        .unwrap();
        let ranks = SamplingEstimator::new()
            .with_sample_count(100)
            .with_seed(1)
            .rank(&graph)
            .unwrap();

        assert_eq!(ranks.len(), 3);
        for id in ["A", "B", "D"] {
            assert!(ranks.get(&id).is_some());
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let graph = build_pair_graph();
        let estimator = SamplingEstimator::new()
            .with_sample_count(10_000)
            .with_seed(42);

        let first = estimator.rank(&graph).unwrap();
        let second = estimator.rank(&graph).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pair_graph_is_balanced() {
        let graph = build_pair_graph();
        let ranks = SamplingEstimator::new()
            .with_sample_count(10_000)
            .with_seed(17)
            .rank(&graph)
            .unwrap();

        assert!((ranks.get(&"A").unwrap() - 0.5).abs() < 0.03);
        assert!((ranks.get(&"B").unwrap() - 0.5).abs() < 0.03);
    }

    #[test]
    fn test_single_sample() {
        let graph = build_dangling_graph();
        let result = SamplingEstimator::new()
            .with_sample_count(1)
            .with_seed(3)
            .run(&graph)
            .unwrap();

        assert_eq!(result.counts.iter().filter(|&&c| c == 1).count(), 1);
        assert_eq!(result.counts.iter().sum::<u64>(), 1);
    }

    #[test]
    fn test_chains_merge_by_count() {
        let graph = build_dangling_graph();
        let result = SamplingEstimator::new()
            .with_sample_count(10_001)
            .with_chains(4)
            .with_seed(9)
            .run(&graph)
            .unwrap();

        assert_eq!(result.chains, 4);
        assert_eq!(result.counts.iter().sum::<u64>(), 10_001);
    }

    #[test]
    fn test_chains_reproducible() {
        let graph = build_dangling_graph();
        let estimator = SamplingEstimator::new().with_chains(3).with_seed(21);
        assert_eq!(
            estimator.run(&graph).unwrap(),
            estimator.run(&graph).unwrap()
        );
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let graph = build_pair_graph();
        let result = SamplingEstimator::new()
            .with_sample_count(500)
            .run(&graph)
            .unwrap();
        let replay = SamplingEstimator::new()
            .with_sample_count(500)
            .with_seed(result.seed)
            .run(&graph)
            .unwrap();
        assert_eq!(result.counts, replay.counts);
    }

    #[test]
    fn test_invalid_parameters() {
        let graph = build_pair_graph();
        assert!(matches!(
            sample_rank(&graph, 0.85, 0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            sample_rank(&graph, 0.0, 10),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            SamplingEstimator::new()
                .with_sample_count(2)
                .with_chains(3)
                .run(&graph),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_graph() {
        let graph: LinkGraph<String> = LinkGraph::default();
        assert!(matches!(
            sample_rank(&graph, 0.85, 10),
            Err(Error::EmptyGraph)
        ));
    }
}
