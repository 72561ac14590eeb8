//! # linkrank
//!
//! PageRank for a fixed corpus of hyperlinked documents.
//!
//! Two independent estimators approximate the stationary distribution of a
//! random surfer who follows a link with probability `damping` and restarts
//! at a uniformly random page otherwise:
//!
//! - [`pagerank::sampling`]: counts visits along one long random walk.
//! - [`pagerank::iterative`]: power iteration until every page's value
//!   changes by at most `tolerance` in one sweep.
//!
//! Pages without outgoing links are treated as linking to every page, so
//! both estimators return distributions that sum to 1.
//!
//! ```rust
//! use linkrank::{iterate_rank, sample_rank, LinkGraph};
//!
//! let graph = LinkGraph::from_pages([
//!     ("a", vec!["b", "c"]),
//!     ("b", vec![]),
//!     ("c", vec!["a"]),
//! ])?;
//!
//! let sampled = sample_rank(&graph, 0.85, 10_000)?;
//! let iterated = iterate_rank(&graph, 0.85, 0.001)?;
//! assert!((iterated.total() - 1.0).abs() < 1e-9);
//! assert_eq!(sampled.len(), 3);
//! # Ok::<(), linkrank::Error>(())
//! ```

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for an estimator stage (when the `tracing` feature
/// is enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("rank_stage", stage = $name).entered();
    };
    ($name:expr, $($fields:tt)+) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("rank_stage", stage = $name, $($fields)+).entered();
    };
}

/// Emit a tracing event at the given level (when the `tracing` feature is
/// enabled).
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)+);
    };
}

pub mod config;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod pagerank;
pub mod report;
pub mod transition;

pub use config::{NonConvergence, RankConfig};
pub use error::{Error, Result};
pub use graph::{LinkGraph, LinkGraphBuilder, NodeId};
pub use pagerank::iterative::{iterate_rank, IterativeSolver};
pub use pagerank::sampling::{sample_rank, SampleResult, SamplingEstimator};
pub use pagerank::{RankDistribution, RankResult};
pub use report::RankReport;
pub use transition::{transition, transition_by_id, TransitionSampler};
