//! Graph builder with link validation
//!
//! Collects `(page, links)` pairs and resolves them into dense node
//! indices. Self links, duplicate links and links to pages outside the
//! corpus are dropped at [`LinkGraphBuilder::build`] time.

use rustc_hash::{FxHashMap, FxHashSet};

use super::csr::LinkGraph;
use super::NodeId;
use crate::error::{Error, Result};

/// A page as recorded by the builder, before link resolution
#[derive(Debug, Clone)]
struct PendingPage<N> {
    id: N,
    links: Vec<N>,
}

/// A mutable collector of pages and their outgoing links
#[derive(Debug)]
pub struct LinkGraphBuilder<N: NodeId> {
    pages: Vec<PendingPage<N>>,
    seen: FxHashSet<N>,
    strict: bool,
}

impl<N: NodeId> Default for LinkGraphBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> LinkGraphBuilder<N> {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            seen: FxHashSet::default(),
            strict: false,
        }
    }

    /// Reject links to unknown pages instead of dropping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Record a page and the pages it links to.
    ///
    /// Fails with [`Error::InvalidGraph`] if `id` was already added.
    pub fn add_page<I>(&mut self, id: N, links: I) -> Result<()>
    where
        I: IntoIterator<Item = N>,
    {
        if !self.seen.insert(id.clone()) {
            return Err(Error::InvalidGraph(format!("duplicate page {id:?}")));
        }
        self.pages.push(PendingPage {
            id,
            links: links.into_iter().collect(),
        });
        Ok(())
    }

    /// Number of pages recorded so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if no pages have been recorded
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Resolve links and freeze the graph.
    pub fn build(self) -> Result<LinkGraph<N>> {
        let Self {
            mut pages, strict, ..
        } = self;

        if pages.len() > u32::MAX as usize {
            return Err(Error::InvalidGraph(format!(
                "{} pages exceed the u32 index space",
                pages.len()
            )));
        }

        // Sorted ids give a deterministic index assignment
        pages.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index: FxHashMap<N, u32> =
            FxHashMap::with_capacity_and_hasher(pages.len(), Default::default());
        for (i, page) in pages.iter().enumerate() {
            index.insert(page.id.clone(), i as u32);
        }

        let mut adjacency = Vec::with_capacity(pages.len());
        for (i, page) in pages.iter().enumerate() {
            let mut targets = Vec::with_capacity(page.links.len());
            for link in &page.links {
                match index.get(link) {
                    Some(&t) if t as usize == i => {}
                    Some(&t) => targets.push(t),
                    None if strict => {
                        return Err(Error::InvalidGraph(format!(
                            "page {:?} links to unknown page {link:?}",
                            page.id
                        )));
                    }
                    None => {}
                }
            }
            targets.sort_unstable();
            targets.dedup();
            adjacency.push(targets);
        }

        let ids = pages.into_iter().map(|p| p.id).collect();
        Ok(LinkGraph::from_parts(ids, index, adjacency))
    }
}
