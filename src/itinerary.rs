/*!
Wires a walking leg and a public-transport leg through the MCR [`Orchestrator`]
and hands back its tabular output, the same shape the design document's
external-interface section specifies: one row per surviving label.

Example
-------
>>> from mcr import PyGraphCache, PyGtfsTimetable, run_walk_transit_mcr
>>>
>>> walk = PyGraphCache(node_count=2, n_values=2, n_hidden=0)
>>> gtfs = PyGtfsTimetable(trips=[...], stop_times=[...])
>>> rows = run_walk_transit_mcr(
...     walk, gtfs, footpaths={}, node_to_stop={0: "818"}, stop_to_node={"818": 0, "835": 1},
...     origin=0, start_time=54000, rounds=1, max_transfers=10, min_transfer_secs=0,
... )
*/

use hashbrown::HashMap;
use pyo3::prelude::*;

use mcr_core::orchestrator::Orchestrator;
use mcr_core::step::{PublicTransportStep, WalkingStep};

use crate::graph::PyGraphCache;
use crate::gtfs::PyGtfsTimetable;

/// One row of the MCR tabular output: one row per surviving label, across
/// every round of the run.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct PyTabularRow {
    pub osm_node_id: i64,
    pub time: i64,
    pub cost: i64,
    pub n_transfers: i32,
    pub round: u32,
    pub human_readable_time: String,
}

/// Runs one origin through a walk -> public-transit -> walk round structure:
/// an initial walking leg onto the transit network, `rounds` rounds of
/// McRAPTOR, and the same walking graph again each round for the final
/// walk-off. `node_to_stop`/`stop_to_node` translate between the walking
/// graph's node-id space and the GTFS stop-id space at the step boundary.
#[pyfunction]
#[pyo3(signature = (
    walk_graph, gtfs, footpaths, node_to_stop, stop_to_node,
    origin, start_time, rounds, max_transfers=10, min_transfer_secs=0, track_paths=false
))]
#[allow(clippy::too_many_arguments)]
pub fn run_walk_transit_mcr(
    walk_graph: &PyGraphCache,
    gtfs: &PyGtfsTimetable,
    footpaths: HashMap<String, Vec<(String, u32)>>,
    node_to_stop: HashMap<usize, String>,
    stop_to_node: HashMap<String, usize>,
    origin: usize,
    start_time: i64,
    rounds: u32,
    max_transfers: u32,
    min_transfer_secs: u32,
    track_paths: bool,
) -> PyResult<Vec<PyTabularRow>> {
    let n_values = walk_graph.inner.n_values();
    let n_hidden = walk_graph.inner.n_hidden();

    let to_walk_map: HashMap<usize, usize> = (0..walk_graph.inner.node_count())
        .map(|i| (i, i))
        .collect();

    let initial_walk = WalkingStep::new(
        walk_graph.inner.clone(),
        to_walk_map.clone(),
        to_walk_map.clone(),
        false,
    );
    let pt = PublicTransportStep::new(
        gtfs.inner.clone(),
        footpaths,
        node_to_stop,
        stop_to_node,
        max_transfers,
        min_transfer_secs,
    );

    let mut orchestrator = Orchestrator::new(
        vec![vec![Box::new(initial_walk)]],
        vec![vec![Box::new(pt)]],
        track_paths,
    );

    let output = orchestrator
        .run(origin, start_time, rounds, n_values, n_hidden)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{e}")))?;

    Ok(output
        .to_tabular(orchestrator.path_manager())
        .into_iter()
        .map(|row| PyTabularRow {
            osm_node_id: row.osm_node_id,
            time: row.time,
            cost: row.cost,
            n_transfers: row.n_transfers,
            round: row.round,
            human_readable_time: row.human_readable_time,
        })
        .collect())
}
