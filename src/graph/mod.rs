//! Link graph construction and representation
//!
//! Pages are collected by a [`LinkGraphBuilder`], validated, and frozen
//! into an immutable CSR-backed [`LinkGraph`] that both estimators read.

pub mod builder;
pub mod csr;

pub use builder::LinkGraphBuilder;
pub use csr::LinkGraph;

use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a page in the corpus.
///
/// Any hashable, totally ordered, cloneable key qualifies; the driver uses
/// file names (`String`). `Send + Sync` lets the estimators share a graph
/// across the rayon pool.
pub trait NodeId: Clone + Eq + Hash + Ord + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Ord + Debug + Send + Sync> NodeId for T {}
