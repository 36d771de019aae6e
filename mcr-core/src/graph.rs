/*!
Immutable, CSR-style weighted graph backing the MLC engine.

# Structs
- `EdgeRecord`: one `(u, v, weights, hidden_weights)` edge as supplied by a caller.
- `GraphCache`: owns a `petgraph::graph::DiGraph` built once from edge records, plus a
  sparse per-node category-list table consulted by the MLC node-visit hook.
*/

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::Error;

/// One edge as supplied to [`GraphCache::set_edges`]: `weights` are added to a
/// label's `values`, `hidden_weights` to its `hidden_values`.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub u: usize,
    pub v: usize,
    pub weights: Vec<i64>,
    pub hidden_weights: Vec<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeWeight {
    pub weights: Vec<i64>,
    pub hidden_weights: Vec<i64>,
}

/// Immutable adjacency structure for the MLC engine. Built once via
/// [`GraphCache::set_edges`]; nodes are inferred as the union of edge
/// endpoints up to an explicit node count, so isolated nodes can still be
/// addressed (e.g. a walking graph node with no outgoing edges).
#[derive(Clone)]
pub struct GraphCache {
    graph: DiGraph<(), EdgeWeight>,
    node_categories: HashMap<usize, Vec<u32>>,
    n_values: usize,
    n_hidden: usize,
}

impl GraphCache {
    /// Creates an empty cache with `node_count` nodes, ready for
    /// [`set_edges`](Self::set_edges). `n_values`/`n_hidden` fix the edge
    /// weight-vector widths `W`/`H` for this cache.
    pub fn new(node_count: usize, n_values: usize, n_hidden: usize) -> Self {
        let mut graph = DiGraph::with_capacity(node_count, node_count * 2);
        for _ in 0..node_count {
            graph.add_node(());
        }
        GraphCache {
            graph,
            node_categories: HashMap::new(),
            n_values,
            n_hidden,
        }
    }

    /// Builds the adjacency lists from `edges`; nodes are those already
    /// present via [`new`](Self::new). Edge lists end up grouped by source
    /// inside `petgraph`'s CSR-like internal storage, giving O(1) amortised
    /// outgoing iteration.
    pub fn set_edges(&mut self, edges: Vec<EdgeRecord>) -> Result<(), Error> {
        for edge in edges {
            self.validate_node(edge.u)?;
            self.validate_node(edge.v)?;
            if edge.weights.iter().any(|&w| w < 0) || edge.hidden_weights.iter().any(|&w| w < 0) {
                return Err(Error::NegativeWeight(format!(
                    "edge {}->{} carries a negative weight component",
                    edge.u, edge.v
                )));
            }
            self.graph.add_edge(
                NodeIndex::new(edge.u),
                NodeIndex::new(edge.v),
                EdgeWeight {
                    weights: edge.weights,
                    hidden_weights: edge.hidden_weights,
                },
            );
        }
        Ok(())
    }

    /// Attaches a sparse node -> POI-category-list table; nodes absent from
    /// `map` carry no categories and the node-visit hook is a no-op there.
    pub fn set_node_weights(&mut self, map: HashMap<usize, Vec<u32>>) {
        self.node_categories = map;
    }

    pub fn validate_node(&self, id: usize) -> Result<(), Error> {
        if id >= self.graph.node_count() {
            Err(Error::UnknownNode(id))
        } else {
            Ok(())
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn n_values(&self) -> usize {
        self.n_values
    }

    pub fn n_hidden(&self) -> usize {
        self.n_hidden
    }

    pub fn categories_at(&self, node: usize) -> Option<&[u32]> {
        self.node_categories.get(&node).map(Vec::as_slice)
    }

    pub(crate) fn edges_from(&self, node: usize) -> impl Iterator<Item = (usize, &EdgeWeight)> {
        self.graph
            .edges(NodeIndex::new(node))
            .map(|e| (e.target().index(), e.weight()))
    }
}
