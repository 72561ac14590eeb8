//! PageRank estimators
//!
//! This module provides the two estimators of the random-surfer stationary
//! distribution: Monte-Carlo sampling along one long walk, and power
//! iteration to a fixed point.

pub mod iterative;
pub mod sampling;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::NodeId;

/// Result of an iterative PageRank computation
#[derive(Debug, Clone)]
pub struct RankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Largest per-node change on the final sweep
    pub delta: f64,
    /// Whether the algorithm converged
    pub converged: bool,
}

impl RankResult {
    /// Create a new rank result
    pub fn new(scores: Vec<f64>, iterations: usize, delta: f64, converged: bool) -> Self {
        Self {
            scores,
            iterations,
            delta,
            converged,
        }
    }

    /// Get top N nodes by score
    pub fn top_n(&self, n: usize) -> Vec<(u32, f64)> {
        let mut indexed: Vec<_> = self
            .scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (i as u32, s))
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(n);
        indexed
    }

    /// Get the score for a specific node
    pub fn score(&self, node: u32) -> f64 {
        self.scores.get(node as usize).copied().unwrap_or(0.0)
    }
}

/// Rank per page identifier, ordered by identifier
///
/// The key set always equals the node set of the graph it was computed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankDistribution<N: NodeId> {
    ranks: BTreeMap<N, f64>,
}

impl<N: NodeId> RankDistribution<N> {
    /// Rank of a page, if it is in the distribution
    pub fn get(&self, id: &N) -> Option<f64> {
        self.ranks.get(id).copied()
    }

    /// Iterate over `(page, rank)` in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&N, f64)> + '_ {
        self.ranks.iter().map(|(id, &rank)| (id, rank))
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Check if the distribution is empty
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Sum of all ranks (1 up to rounding for any estimator output)
    pub fn total(&self) -> f64 {
        self.ranks.values().sum()
    }

    /// Highest-ranked pages, ties broken by identifier
    pub fn top_n(&self, n: usize) -> Vec<(&N, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }

    /// Largest absolute per-page difference against another distribution.
    ///
    /// Pages missing from either side count with rank 0.
    pub fn max_abs_difference(&self, other: &Self) -> f64 {
        let mine = self
            .ranks
            .iter()
            .map(|(id, &r)| (r - other.get(id).unwrap_or(0.0)).abs());
        let theirs = other
            .ranks
            .iter()
            .filter(|(id, _)| !self.ranks.contains_key(*id))
            .map(|(_, &r)| r.abs());
        mine.chain(theirs).fold(0.0, f64::max)
    }
}

impl<N: NodeId> FromIterator<(N, f64)> for RankDistribution<N> {
    fn from_iter<I: IntoIterator<Item = (N, f64)>>(iter: I) -> Self {
        Self {
            ranks: iter.into_iter().collect(),
        }
    }
}
