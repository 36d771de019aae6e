/*!
# mcr_core

**mcr_core** computes multi-criteria, multi-modal reachability from a single
origin in an urban transport network: scheduled public transport, on-demand
bicycle rides, personal-car driving, and walking, combined into a single
Pareto frontier of (time, cost, ...) trade-offs per reachable location.

Three engines do the work:

- [`mlc`]: a Multi-Label Correcting generalisation of Dijkstra over a
  [`graph::GraphCache`], where every node holds a [`label::Bag`] of
  non-dominated [`label::Label`]s instead of a single distance.
- [`raptor`]: a round-based, multi-criteria RAPTOR engine over
  [`gtfs::GtfsTimetable`], polymorphic over any label implementing
  [`raptor::McLabel`].
- [`orchestrator`]: chains [`step::Step`]s wrapping either engine into an
  iterative round structure, translating node-id spaces at each boundary.

```ignore
use mcr_core::prelude::*;

let mut graph = GraphCache::new(2, 1, 0);
graph.set_edges(vec![EdgeRecord { u: 0, v: 1, weights: vec![600], hidden_weights: vec![0] }]).unwrap();

let bags = mlc::run_single_source(&graph, 0, 0, &MlcOptions::default()).unwrap();
assert!(bags.get(&1).is_some());
```
*/

use thiserror::Error;

pub mod batch;
pub mod config;
pub mod graph;
pub mod gtfs;
pub mod label;
pub mod mlc;
pub mod orchestrator;
pub mod path;
pub mod prelude;
pub mod raptor;
pub mod step;
pub mod time;

/// Error type spanning the taxonomy of section 7 of the design document:
/// input validation, data consistency, resource exhaustion. Empty results and
/// partial step failure are not fatal and are therefore not represented here;
/// they surface as empty bag maps plus a logged warning.
#[derive(Error, Debug)]
pub enum Error {
    #[error("node id {0} is out of range for this graph cache")]
    UnknownNode(usize),
    #[error("unknown edge-update rule: {0}")]
    UnknownUpdateRule(String),
    #[error("malformed start time: {0}")]
    MalformedStartTime(String),
    #[error("missing required GTFS key: {0}")]
    MissingGtfsKey(String),
    #[error("FIFO violation on route {route}: trip {trip} stop {stop}")]
    FifoViolation {
        route: String,
        trip: String,
        stop: String,
    },
    #[error("negative edge weight detected: {0}")]
    NegativeWeight(String),
    #[error("origin bag is empty and no fallback was configured")]
    EmptyOriginBag,
    #[error("graph cache node count {0} exceeds the configured index width")]
    IndexOverflow(usize),
    #[error("unknown stop id: {0}")]
    UnknownStop(String),
}
