//! Random-surfer transition model
//!
//! From a page with links, the surfer follows one of its links with
//! probability `damping` (chosen uniformly) and restarts at a uniformly
//! random page otherwise. From a dangling page the surfer always restarts:
//! the damping factor plays no part there since there are no links to
//! weight.

use rand::Rng;

use crate::config::check_damping;
use crate::error::{Error, Result};
use crate::graph::{LinkGraph, NodeId};

/// Next-page distribution from `node`, indexed by node.
///
/// The returned vector has one entry per node and sums to 1.
pub fn transition<N: NodeId>(graph: &LinkGraph<N>, node: u32, damping: f64) -> Result<Vec<f64>> {
    check_damping(damping)?;
    if graph.is_empty() {
        return Err(Error::EmptyGraph);
    }
    if node as usize >= graph.num_nodes() {
        return Err(Error::InvalidParameter(format!(
            "node {node} out of range for {} nodes",
            graph.num_nodes()
        )));
    }

    let mut dist = vec![0.0; graph.num_nodes()];
    fill_transition(graph, node, damping, &mut dist);
    Ok(dist)
}

/// Same as [`transition`], addressing the source page by identifier.
pub fn transition_by_id<N: NodeId>(graph: &LinkGraph<N>, id: &N, damping: f64) -> Result<Vec<f64>> {
    let node = graph
        .index_of(id)
        .ok_or_else(|| Error::InvalidParameter(format!("unknown page {id:?}")))?;
    transition(graph, node, damping)
}

/// Write the transition distribution of `node` into `out`.
///
/// Caller guarantees a valid node, a non-empty graph and
/// `out.len() == graph.num_nodes()`.
fn fill_transition<N: NodeId>(graph: &LinkGraph<N>, node: u32, damping: f64, out: &mut [f64]) {
    let n = graph.num_nodes() as f64;
    let links = graph.out_links(node);

    if links.is_empty() {
        out.fill(1.0 / n);
        return;
    }

    out.fill((1.0 - damping) / n);
    let follow = damping / links.len() as f64;
    for &target in links {
        out[target as usize] += follow;
    }
}

/// Inverse-CDF lookup table over a small set of outcomes
#[derive(Debug, Clone)]
struct CumulativeTable {
    cdf: Vec<f64>,
}

impl CumulativeTable {
    fn from_weights(weights: &[f64]) -> Self {
        let mut running = 0.0;
        let cdf = weights
            .iter()
            .map(|&w| {
                running += w;
                running
            })
            .collect();
        Self { cdf }
    }

    fn len(&self) -> usize {
        self.cdf.len()
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let total = self.cdf[self.cdf.len() - 1];
        let u = rng.gen::<f64>() * total;
        let idx = self.cdf.partition_point(|&c| c <= u);
        // u < total, but rounding can still push it past the last bucket
        idx.min(self.cdf.len() - 1)
    }
}

/// Draws successive pages of a random-surfer walk.
///
/// A linked page's table has one bucket for restarting (weight
/// `1 - damping`) followed by one bucket per out-link (weight
/// `damping / outdegree` each). A restart then lands on a uniform page, so
/// the draw follows [`transition`] exactly while each table stays at
/// `outdegree + 1` entries. Tables are built on first visit and reused;
/// dangling pages draw uniformly without a table.
#[derive(Debug)]
pub struct TransitionSampler<'g, N: NodeId> {
    graph: &'g LinkGraph<N>,
    damping: f64,
    tables: Vec<Option<CumulativeTable>>,
}

impl<'g, N: NodeId> TransitionSampler<'g, N> {
    /// Create a sampler over a non-empty graph
    pub fn new(graph: &'g LinkGraph<N>, damping: f64) -> Result<Self> {
        check_damping(damping)?;
        if graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        Ok(Self {
            graph,
            damping,
            tables: vec![None; graph.num_nodes()],
        })
    }

    /// Draw a uniformly random starting page
    pub fn start<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..self.graph.num_nodes() as u32)
    }

    /// Draw the page visited after `current`
    pub fn next<R: Rng>(&mut self, current: u32, rng: &mut R) -> u32 {
        let graph = self.graph;
        let links = graph.out_links(current);
        if links.is_empty() {
            return self.start(rng);
        }

        let damping = self.damping;
        let table = self.tables[current as usize].get_or_insert_with(|| {
            let follow = damping / links.len() as f64;
            let mut weights = Vec::with_capacity(links.len() + 1);
            weights.push(1.0 - damping);
            weights.resize(links.len() + 1, follow);
            CumulativeTable::from_weights(&weights)
        });

        match table.draw(rng) {
            0 => self.start(rng),
            bucket => links[bucket - 1],
        }
    }

    /// Number of cumulative tables built so far
    pub fn cached_tables(&self) -> usize {
        self.tables.iter().filter(|t| t.is_some()).count()
    }

    /// Total entries held across all cached tables
    pub fn cached_entries(&self) -> usize {
        self.tables.iter().flatten().map(CumulativeTable::len).sum()
    }
}
