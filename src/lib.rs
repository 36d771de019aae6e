/*!
# mcr

**mcr** is a library exposing a multi-criteria, multi-modal reachability (MCR)
search over a street graph and a GTFS timetable. Core logic is implemented in
pure Rust in the [`mcr_core`] crate; this crate is the thin PyO3 boundary that
puts it in front of Python callers.

The search chains heterogeneous legs (walking, cycling, driving, and public
transit) through successive rounds, keeping a Pareto-optimal bag of labels
per node at every step rather than collapsing to a single scalar cost.

### GTFS and street network ingestion are the host's job

This crate takes already-parsed graphs and timetables; it does not read GTFS
feeds or OSM `.pbf` files itself. Build those upstream and hand in the
`(u, v, weights, hidden_weights)` edge lists and `(trip_id, stop_id, ...)`
stop-time rows this crate's constructors expect.
*/

use pyo3::prelude::*;

use crate::algo::{calculate_reachability_matrix, run_mlc_single_source, PyLabel};
use crate::graph::PyGraphCache;
use crate::gtfs::{run_mcraptor_arrival_only, PyGtfsTimetable};
use crate::itinerary::{run_walk_transit_mcr, PyTabularRow};

pub mod algo;
pub mod graph;
pub mod gtfs;
pub mod itinerary;

#[pymodule]
fn _mcr_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(run_mlc_single_source, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_reachability_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(run_mcraptor_arrival_only, m)?)?;
    m.add_function(wrap_pyfunction!(run_walk_transit_mcr, m)?)?;
    m.add_class::<PyGraphCache>()?;
    m.add_class::<PyGtfsTimetable>()?;
    m.add_class::<PyLabel>()?;
    m.add_class::<PyTabularRow>()?;
    Ok(())
}
