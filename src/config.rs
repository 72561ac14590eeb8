//! Run configuration shared by the estimators and the driver.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "damping": 0.85,
//!   "sample_count": 10000,
//!   "tolerance": 0.001,
//!   "max_iterations": 10000,
//!   "seed": 42,
//!   "chains": 1,
//!   "parallel": false,
//!   "non_convergence": "fail"
//! }
//! ```
//!
//! Every field is optional; omitted fields take the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;
/// Default number of samples drawn by the sampling estimator.
pub const DEFAULT_SAMPLE_COUNT: usize = 10_000;
/// Default per-node absolute convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 0.001;
/// Default iteration ceiling for the iterative solver.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// What the iterative solver does when it exhausts `max_iterations`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonConvergence {
    /// Return [`Error::DidNotConverge`].
    #[default]
    Fail,
    /// Return the last vector with `converged = false` and log a warning.
    BestEffort,
}

/// Full configuration surface for one ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Probability of following a link rather than restarting at random.
    pub damping: f64,
    /// Total number of samples drawn by the sampling estimator.
    pub sample_count: usize,
    /// Largest per-node change the solver accepts as converged.
    pub tolerance: f64,
    /// Iteration ceiling for the solver.
    pub max_iterations: usize,
    /// Seed for reproducible sampling. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Number of independent sampling chains.
    pub chains: usize,
    /// Compute solver sweeps on the rayon pool.
    pub parallel: bool,
    /// Solver behaviour on hitting `max_iterations`.
    pub non_convergence: NonConvergence,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            sample_count: DEFAULT_SAMPLE_COUNT,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
            chains: 1,
            parallel: false,
            non_convergence: NonConvergence::Fail,
        }
    }
}

impl RankConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the sample count
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
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

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of sampling chains
    pub fn with_chains(mut self, chains: usize) -> Self {
        self.chains = chains;
        self
    }

    /// Enable or disable parallel solver sweeps
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the non-convergence policy
    pub fn with_non_convergence(mut self, policy: NonConvergence) -> Self {
        self.non_convergence = policy;
        self
    }

    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        check_damping(self.damping)?;
        check_sample_count(self.sample_count)?;
        check_tolerance(self.tolerance)?;
        check_max_iterations(self.max_iterations)?;
        check_chains(self.chains, self.sample_count)
    }
}

pub(crate) fn check_damping(damping: f64) -> Result<()> {
    if damping.is_finite() && damping > 0.0 && damping < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "damping factor must lie in (0, 1), got {damping}"
        )))
    }
}

pub(crate) fn check_sample_count(sample_count: usize) -> Result<()> {
    if sample_count == 0 {
        return Err(Error::InvalidParameter(
            "sample count must be positive".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "tolerance must be positive and finite, got {tolerance}"
        )))
    }
}

pub(crate) fn check_max_iterations(max_iterations: usize) -> Result<()> {
    if max_iterations == 0 {
        return Err(Error::InvalidParameter(
            "max_iterations must be positive".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_chains(chains: usize, sample_count: usize) -> Result<()> {
    if chains == 0 || chains > sample_count {
        return Err(Error::InvalidParameter(format!(
            "chain count must lie in 1..={sample_count}, got {chains}"
        )));
    }
    Ok(())
}
