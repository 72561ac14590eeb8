//! Side-by-side report of both estimators
//!
//! The formatting boundary: estimators produce [`RankDistribution`]s, this
//! module renders them as text or JSON.

use std::fmt;

use serde::Serialize;

use crate::config::RankConfig;
use crate::error::Result;
use crate::graph::{LinkGraph, NodeId};
use crate::pagerank::iterative::IterativeSolver;
use crate::pagerank::sampling::SamplingEstimator;
use crate::pagerank::RankDistribution;

/// Both rank distributions of one run, plus run diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct RankReport<N: NodeId> {
    /// Samples drawn by the sampling estimator
    pub sample_count: usize,
    /// Seed the sampling estimator used
    pub seed: u64,
    /// Visit frequencies
    pub sampling: RankDistribution<N>,
    /// Sweeps performed by the solver
    pub iterations: usize,
    /// Whether the solver met its tolerance
    pub converged: bool,
    /// Power-iteration ranks
    pub iteration: RankDistribution<N>,
}

impl<N: NodeId> RankReport<N> {
    /// Run both estimators on `graph` with `config`.
    pub fn compute(graph: &LinkGraph<N>, config: &RankConfig) -> Result<Self> {
        config.validate()?;

        let sampled = SamplingEstimator::from_config(config).run(graph)?;
        let solved = IterativeSolver::from_config(config).run(graph)?;

        Ok(Self {
            sample_count: sampled.sample_count,
            seed: sampled.seed,
            sampling: graph.distribution(&sampled.scores())?,
            iterations: solved.iterations,
            converged: solved.converged,
            iteration: graph.distribution(&solved.scores)?,
        })
    }

    /// Largest per-page disagreement between the two estimators
    pub fn max_abs_difference(&self) -> f64 {
        self.sampling.max_abs_difference(&self.iteration)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String>
    where
        N: Serialize,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<N: NodeId + fmt::Display> fmt::Display for RankReport<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PageRank Results from Sampling (n = {})",
            self.sample_count
        )?;
        for (page, rank) in self.sampling.iter() {
            writeln!(f, "  {page}: {rank:.4}")?;
        }
        writeln!(f, "PageRank Results from Iteration")?;
        for (page, rank) in self.iteration.iter() {
            writeln!(f, "  {page}: {rank:.4}")?;
        }
        Ok(())
    }
}
