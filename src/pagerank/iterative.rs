//! Iterative PageRank by power iteration
//!
//! Each sweep applies the PageRank recurrence to every page at once:
//!
//! ```text
//! new[p] = (1 - d) / N
//!        + d * Σ_{q -> p} old[q] / outdeg(q)
//!        + d * Σ_{q dangling} old[q] / N
//! ```
//!
//! The last term hands the mass sitting on dangling pages back to every page
//! uniformly; without it the vector leaks mass each sweep.
//!
//! A sweep reads only the previous vector and writes only the next one, so
//! the convergence check always compares two complete vectors.

use rayon::prelude::*;

use super::{RankDistribution, RankResult};
use crate::config::{
    check_damping, check_max_iterations, check_tolerance, NonConvergence, RankConfig,
};
use crate::error::{Error, Result};
use crate::graph::{LinkGraph, NodeId};

/// How far an initial vector's sum may stray from 1.
const INITIAL_SUM_TOLERANCE: f64 = 1e-6;

/// Power-iteration PageRank solver
#[derive(Debug, Clone)]
pub struct IterativeSolver {
    /// Damping factor (typically 0.85)
    pub damping: f64,
    /// Largest per-node change accepted as converged
    pub tolerance: f64,
    /// Maximum number of sweeps
    pub max_iterations: usize,
    /// Compute each sweep on the rayon pool
    pub parallel: bool,
    /// What to do when `max_iterations` is reached
    pub non_convergence: NonConvergence,
}

impl Default for IterativeSolver {
    fn default() -> Self {
        Self::from_config(&RankConfig::default())
    }
}

/// Decision taken after comparing two consecutive vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Converged,
    Exhausted,
}

impl IterativeSolver {
    /// Create a new IterativeSolver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the solver-related fields of a run config
    pub fn from_config(config: &RankConfig) -> Self {
        Self {
            damping: config.damping,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            parallel: config.parallel,
            non_convergence: config.non_convergence,
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable parallel sweeps
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the non-convergence policy
    pub fn with_non_convergence(mut self, policy: NonConvergence) -> Self {
        self.non_convergence = policy;
        self
    }

    /// Run from the uniform vector `1/N`
    pub fn run<N: NodeId>(&self, graph: &LinkGraph<N>) -> Result<RankResult> {
        self.validate()?;
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        let n = graph.num_nodes();
        self.solve(graph, vec![1.0 / n as f64; n])
    }

    /// Run from a caller-supplied probability vector
    ///
    /// `initial` must have one non-negative entry per node and sum to 1.
    pub fn run_from<N: NodeId>(&self, graph: &LinkGraph<N>, initial: &[f64]) -> Result<RankResult> {
        self.validate()?;
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        if initial.len() != graph.num_nodes() {
            return Err(Error::InvalidParameter(format!(
                "initial vector has {} entries for {} nodes",
                initial.len(),
                graph.num_nodes()
            )));
        }
        if initial.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::InvalidParameter(
                "initial vector must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = initial.iter().sum();
        if (sum - 1.0).abs() > INITIAL_SUM_TOLERANCE {
            return Err(Error::InvalidParameter(format!(
                "initial vector sums to {sum}, expected 1"
            )));
        }
        self.solve(graph, initial.to_vec())
    }

    /// Run and label the scores by page
    pub fn rank<N: NodeId>(&self, graph: &LinkGraph<N>) -> Result<RankDistribution<N>> {
        let result = self.run(graph)?;
        graph.distribution(&result.scores)
    }

    fn validate(&self) -> Result<()> {
        check_damping(self.damping)?;
        check_tolerance(self.tolerance)?;
        check_max_iterations(self.max_iterations)
    }

    fn solve<N: NodeId>(&self, graph: &LinkGraph<N>, mut scores: Vec<f64>) -> Result<RankResult> {
        let n = graph.num_nodes();
        trace_stage!(
            "iteration",
            nodes = n,
            edges = graph.num_edges(),
            parallel = self.parallel
        );

        let inv_out_degree = inverse_out_degrees(graph);
        let dangling = graph.dangling_nodes();
        let teleport = (1.0 - self.damping) / n as f64;

        let mut next = vec![0.0; n];
        let mut iterations = 0;

        loop {
            // `scores` is the frozen snapshot for this sweep
            let dangling_mass: f64 = dangling.iter().map(|&q| scores[q as usize]).sum();
            let base = teleport + self.damping * dangling_mass / n as f64;

            let sweep = Sweep {
                graph,
                previous: &scores,
                inv_out_degree: &inv_out_degree,
                base,
                damping: self.damping,
            };
            if self.parallel {
                next.par_iter_mut()
                    .enumerate()
                    .for_each(|(p, slot)| *slot = sweep.value(p as u32));
            } else {
                for (p, slot) in next.iter_mut().enumerate() {
                    *slot = sweep.value(p as u32);
                }
            }
            iterations += 1;

            let delta = max_abs_change(&scores, &next);
            std::mem::swap(&mut scores, &mut next);

            match self.decide(delta, iterations) {
                Step::Continue => {}
                Step::Converged => {
                    normalize(&mut scores);
                    trace_event!(debug, iterations, delta, "iteration converged");
                    return Ok(RankResult::new(scores, iterations, delta, true));
                }
                Step::Exhausted => return self.exhausted(scores, iterations, delta),
            }
        }
    }

    fn decide(&self, delta: f64, iterations: usize) -> Step {
        if delta <= self.tolerance {
            Step::Converged
        } else if iterations >= self.max_iterations {
            Step::Exhausted
        } else {
            Step::Continue
        }
    }

    fn exhausted(&self, mut scores: Vec<f64>, iterations: usize, delta: f64) -> Result<RankResult> {
        normalize(&mut scores);
        match self.non_convergence {
            NonConvergence::Fail => Err(Error::DidNotConverge {
                iterations,
                delta,
                scores,
            }),
            NonConvergence::BestEffort => {
                trace_event!(
                    warn,
                    iterations,
                    delta,
                    tolerance = self.tolerance,
                    "iteration did not converge, returning last vector"
                );
                Ok(RankResult::new(scores, iterations, delta, false))
            }
        }
    }
}

/// Read-only inputs of one sweep.
struct Sweep<'a, N: NodeId> {
    graph: &'a LinkGraph<N>,
    previous: &'a [f64],
    inv_out_degree: &'a [f64],
    base: f64,
    damping: f64,
}

impl<N: NodeId> Sweep<'_, N> {
    /// New value of page `p`, pulled from its in-links.
    fn value(&self, p: u32) -> f64 {
        let inflow: f64 = self
            .graph
            .in_links(p)
            .iter()
            .map(|&q| self.previous[q as usize] * self.inv_out_degree[q as usize])
            .sum();
        self.base + self.damping * inflow
    }
}

/// `1 / outdeg(q)` per node, 0 for dangling nodes.
fn inverse_out_degrees<N: NodeId>(graph: &LinkGraph<N>) -> Vec<f64> {
    (0..graph.num_nodes() as u32)
        .map(|q| match graph.out_degree(q) {
            0 => 0.0,
            deg => 1.0 / deg as f64,
        })
        .collect()
}

fn max_abs_change(old: &[f64], new: &[f64]) -> f64 {
    old.iter()
        .zip(new)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Rescale to sum 1 (the recurrence preserves mass; this only absorbs rounding).
fn normalize(scores: &mut [f64]) {
    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        for score in scores {
            *score /= sum;
        }
    }
}

/// Estimate PageRank by power iteration until every page changes by at most
/// `tolerance` in one sweep.
pub fn iterate_rank<N: NodeId>(
    graph: &LinkGraph<N>,
    damping: f64,
    tolerance: f64,
) -> Result<RankDistribution<N>> {
    IterativeSolver::new()
        .with_damping(damping)
        .with_tolerance(tolerance)
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

    fn build_isolated_graph() -> LinkGraph<&'static str> {
        // A <-> B, C has no links in or out
        LinkGraph::from_pages([("A", vec!["B"]), ("B", vec!["A"]), ("C", vec![])]).unwrap()
    }

    #[test]
    fn test_pair_graph_equal_scores() {
        let graph = build_pair_graph();
        let ranks = iterate_rank(&graph, 0.85, 0.001).unwrap();

        assert!((ranks.get(&"A").unwrap() - 0.5).abs() < 1e-6);
        assert!((ranks.get(&"B").unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_dangling_graph_matches_closed_form() {
        // B = C = 0.475 / (1 + 0.85 - 0.85 / 3), A = 1 - 2B
        let graph = build_dangling_graph();
        let ranks = iterate_rank(&graph, 0.85, 0.001).unwrap();

        let b = 0.475 / (1.85 - 0.85 / 3.0);
        assert!((ranks.get(&"B").unwrap() - b).abs() < 0.01);
        assert!((ranks.get(&"C").unwrap() - b).abs() < 0.01);
        assert!((ranks.get(&"A").unwrap() - (1.0 - 2.0 * b)).abs() < 0.01);
        assert!((ranks.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = build_isolated_graph();
        let result = IterativeSolver::new().run(&graph).unwrap();

        assert!(result.converged);
        let sum: f64 = result.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_page_keeps_restart_mass() {
        // C is only reached by restarts, including those out of C itself
        let graph = build_isolated_graph();
        let result = IterativeSolver::new()
            .with_tolerance(1e-12)
            .run(&graph)
            .unwrap();

        // Stationary C solves c = 0.05 + 0.85 * c / 3
        let c = 0.05 / (1.0 - 0.85 / 3.0);
        assert!((result.scores[2] - c).abs() < 1e-9);
        assert!((result.scores[0] - result.scores[1]).abs() < 1e-12);
    }

    #[test]
    fn test_omitting_dangling_term_leaks_mass() {
        let graph = build_isolated_graph();
        let n = graph.num_nodes();
        let d = 0.85;
        let old = vec![1.0 / n as f64; n];

        // One sweep of the recurrence without the dangling term
        let leaky: Vec<f64> = (0..n as u32)
            .map(|p| {
                let inflow: f64 = graph
                    .in_links(p)
                    .iter()
                    .map(|&q| old[q as usize] / graph.out_degree(q) as f64)
                    .sum();
                (1.0 - d) / n as f64 + d * inflow
            })
            .collect();
        let leaky_sum: f64 = leaky.iter().sum();
        assert!((leaky_sum - (1.0 - d / 3.0)).abs() < 1e-12);

        // The same sweep with the dangling term keeps every bit of it
        let inv_out_degree = inverse_out_degrees(&graph);
        let dangling_mass: f64 = graph.dangling_nodes().iter().map(|&q| old[q as usize]).sum();
        let sweep = Sweep {
            graph: &graph,
            previous: &old,
            inv_out_degree: &inv_out_degree,
            base: (1.0 - d) / n as f64 + d * dangling_mass / n as f64,
            damping: d,
        };
        let full_sum: f64 = (0..n as u32).map(|p| sweep.value(p)).sum();
        assert!((full_sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_idempotent_on_converged_output() {
        let graph = build_dangling_graph();
        let solver = IterativeSolver::new();
        let first = solver.run(&graph).unwrap();
        let again = solver.run_from(&graph, &first.scores).unwrap();

        assert_eq!(again.iterations, 1);
        for (a, b) in first.scores.iter().zip(&again.scores) {
            assert!((a - b).abs() < solver.tolerance);
        }
    }

    #[test]
    fn test_convergence_requires_every_node() {
        // Only a strict all-nodes check reports delta <= tolerance at the end
        let graph = build_dangling_graph();
        let result = IterativeSolver::new().with_tolerance(1e-9).run(&graph).unwrap();
        assert!(result.converged);
        assert!(result.delta <= 1e-9);
        assert!(result.iterations > 1);
    }

    #[test]
    fn test_did_not_converge() {
        let graph = build_dangling_graph();
        let err = IterativeSolver::new()
            .with_max_iterations(2)
            .with_tolerance(1e-15)
            .run(&graph)
            .unwrap_err();

        match err {
            Error::DidNotConverge {
                iterations,
                delta,
                scores,
            } => {
                assert_eq!(iterations, 2);
                assert!(delta > 1e-15);
                assert_eq!(scores.len(), 3);
                let sum: f64 = scores.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_best_effort_returns_partial() {
        let graph = build_dangling_graph();
        let result = IterativeSolver::new()
            .with_max_iterations(1)
            .with_tolerance(1e-15)
            .with_non_convergence(NonConvergence::BestEffort)
            .run(&graph)
            .unwrap();

        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
        assert_eq!(result.scores.len(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let graph = build_dangling_graph();
        let sequential = IterativeSolver::new().with_tolerance(1e-10).run(&graph).unwrap();
        let parallel = IterativeSolver::new()
            .with_tolerance(1e-10)
            .with_parallel(true)
            .run(&graph)
            .unwrap();

        assert_eq!(sequential.iterations, parallel.iterations);
        assert_eq!(sequential.scores, parallel.scores);
    }

    #[test]
    fn test_single_node_graph() {
        let graph = LinkGraph::from_pages([("only", Vec::<&str>::new())]).unwrap();
        let result = IterativeSolver::new().run(&graph).unwrap();

        assert_eq!(result.scores, vec![1.0]);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_damping_factor() {
        // Lower damping = more restarts = more uniform scores
        let graph = build_dangling_graph();
        let low = IterativeSolver::new().with_damping(0.5).run(&graph).unwrap();
        let high = IterativeSolver::new().with_damping(0.95).run(&graph).unwrap();

        let spread = |r: &RankResult| r.scores[0] - r.scores[1];
        assert!(spread(&high) > spread(&low));
    }

    #[test]
    fn test_run_from_rejects_bad_vectors() {
        let graph = build_pair_graph();
        let solver = IterativeSolver::new();

        for bad in [vec![1.0], vec![0.7, 0.7], vec![1.5, -0.5], vec![f64::NAN, 0.5]] {
            assert!(matches!(
                solver.run_from(&graph, &bad),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let graph = build_pair_graph();
        assert!(matches!(
            iterate_rank(&graph, 1.0, 0.001),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            iterate_rank(&graph, 0.85, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            IterativeSolver::new().with_max_iterations(0).run(&graph),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_graph() {
        let graph: LinkGraph<String> = LinkGraph::default();
        assert!(matches!(
            iterate_rank(&graph, 0.85, 0.001),
            Err(Error::EmptyGraph)
        ));
    }
}
