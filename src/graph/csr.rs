//! Compressed Sparse Row (CSR) link graph
//!
//! Out-links drive the transition model and the sampler; in-links let the
//! iterative solver compute each page's new value by pulling from its
//! predecessors, so every node can be updated independently.

use rustc_hash::FxHashMap;

use super::builder::LinkGraphBuilder;
use super::NodeId;
use crate::error::{Error, Result};
use crate::pagerank::RankDistribution;

/// An immutable directed link graph in CSR format
///
/// Node `i` is the `i`-th identifier in ascending order. Out-links of node
/// `i` are `out_idx[out_ptr[i]..out_ptr[i + 1]]`, sorted and de-duplicated;
/// in-links are stored the same way.
#[derive(Debug, Clone)]
pub struct LinkGraph<N: NodeId> {
    ids: Vec<N>,
    index: FxHashMap<N, u32>,
    out_ptr: Vec<usize>,
    out_idx: Vec<u32>,
    in_ptr: Vec<usize>,
    in_idx: Vec<u32>,
}

impl<N: NodeId> LinkGraph<N> {
    /// Build a graph from `(page, links)` pairs in one step.
    ///
    /// Equivalent to feeding every pair to a [`LinkGraphBuilder`].
    pub fn from_pages<I, L>(pages: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, L)>,
        L: IntoIterator<Item = N>,
    {
        let mut builder = LinkGraphBuilder::new();
        for (id, links) in pages {
            builder.add_page(id, links)?;
        }
        builder.build()
    }

    /// Assemble from resolved adjacency lists (one sorted list per node).
    pub(crate) fn from_parts(
        ids: Vec<N>,
        index: FxHashMap<N, u32>,
        adjacency: Vec<Vec<u32>>,
    ) -> Self {
        let n = ids.len();
        let mut out_ptr = Vec::with_capacity(n + 1);
        let mut out_idx = Vec::with_capacity(adjacency.iter().map(Vec::len).sum());
        let mut in_degree = vec![0usize; n];

        out_ptr.push(0);
        for targets in &adjacency {
            for &t in targets {
                in_degree[t as usize] += 1;
            }
            out_idx.extend_from_slice(targets);
            out_ptr.push(out_idx.len());
        }

        let mut in_ptr = Vec::with_capacity(n + 1);
        in_ptr.push(0);
        for degree in &in_degree {
            let last = in_ptr[in_ptr.len() - 1];
            in_ptr.push(last + degree);
        }

        // Sources are visited in ascending order, so each in-list ends up sorted
        let mut cursor = in_ptr[..n].to_vec();
        let mut in_idx = vec![0u32; out_idx.len()];
        for (source, targets) in adjacency.iter().enumerate() {
            for &t in targets {
                in_idx[cursor[t as usize]] = source as u32;
                cursor[t as usize] += 1;
            }
        }

        Self {
            ids,
            index,
            out_ptr,
            out_idx,
            in_ptr,
            in_idx,
        }
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.ids.len()
    }

    /// Total number of directed links
    pub fn num_edges(&self) -> usize {
        self.out_idx.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All node identifiers, in index order
    pub fn ids(&self) -> &[N] {
        &self.ids
    }

    /// Identifier of a node index
    pub fn id(&self, node: u32) -> &N {
        &self.ids[node as usize]
    }

    /// Index of an identifier
    pub fn index_of(&self, id: &N) -> Option<u32> {
        self.index.get(id).copied()
    }

    /// Pages linked to by `node`
    pub fn out_links(&self, node: u32) -> &[u32] {
        let node = node as usize;
        &self.out_idx[self.out_ptr[node]..self.out_ptr[node + 1]]
    }

    /// Pages linking to `node`
    pub fn in_links(&self, node: u32) -> &[u32] {
        let node = node as usize;
        &self.in_idx[self.in_ptr[node]..self.in_ptr[node + 1]]
    }

    /// Out-degree of a node
    pub fn out_degree(&self, node: u32) -> usize {
        let node = node as usize;
        self.out_ptr[node + 1] - self.out_ptr[node]
    }

    /// Whether a node has no outgoing links
    pub fn is_dangling(&self, node: u32) -> bool {
        self.out_degree(node) == 0
    }

    /// Find dangling nodes (nodes with no outgoing links)
    pub fn dangling_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes() as u32)
            .filter(|&n| self.is_dangling(n))
            .collect()
    }

    /// Attach identifiers to a score vector indexed by node.
    ///
    /// Fails with `InvalidParameter` unless there is one score per node.
    pub fn distribution(&self, scores: &[f64]) -> Result<RankDistribution<N>> {
        if scores.len() != self.num_nodes() {
            return Err(Error::InvalidParameter(format!(
                "score vector has {} entries for {} nodes",
                scores.len(),
                self.num_nodes()
            )));
        }
        Ok(self
            .ids
            .iter()
            .cloned()
            .zip(scores.iter().copied())
            .collect())
    }
}

impl<N: NodeId> Default for LinkGraph<N> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            index: FxHashMap::default(),
            out_ptr: vec![0],
            out_idx: Vec::new(),
            in_ptr: vec![0],
            in_idx: Vec::new(),
        }
    }
}
