/*!
This module exposes the MLC engine to Python. It includes functions to:

- Compute Pareto-optimal labels from a single origin node ([`run_mlc_single_source()`]).
- Reduce a batch of origins to a dense reachability matrix, one `rayon` task per
  origin ([`calculate_reachability_matrix()`]).

The module also defines [`PyLabel`], a Python-facing view of a Pareto label's
`values`/`hidden_values`/`node_id` triple.

# Examples
```python
from mcr import PyGraphCache, run_mlc_single_source

graph = PyGraphCache(node_count=3, n_values=2, n_hidden=1)
graph.set_edges([(0, 1, [600, 0], [600]), (1, 2, [300, 0], [300])])

labels = run_mlc_single_source(graph, source=0, start_time=0)
```
*/

use hashbrown::HashMap;
use pyo3::prelude::*;
use rayon::prelude::*;

use mcr_core::label::Label;
use mcr_core::mlc::{self, FareSchedule, MlcOptions, UpdateRule};

use crate::graph::PyGraphCache;

/// A Python wrapper around a single Pareto-optimal [`Label`]: the raw
/// `values` vector (time, cost, category flags...), the hidden criteria that
/// do not participate in dominance, and the node it was produced at.
#[pyclass(get_all)]
#[derive(Clone, Debug)]
pub struct PyLabel {
    pub values: Vec<i64>,
    pub hidden_values: Vec<i64>,
    pub node_id: usize,
}

impl From<&Label> for PyLabel {
    fn from(label: &Label) -> Self {
        PyLabel {
            values: label.values.clone(),
            hidden_values: label.hidden_values.clone(),
            node_id: label.node_id,
        }
    }
}

fn resolve_update_rule(name: Option<&str>) -> PyResult<Option<UpdateRule>> {
    let Some(name) = name else { return Ok(None) };
    let fare_schedule = FareSchedule::default_bike_schedule();
    UpdateRule::resolve(name, &fare_schedule, 0)
        .map(Some)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Finds the Pareto-optimal labels reachable from a single origin node, via
/// the MLC engine's entry point (i): one seed label with
/// `values = (start_time, 0, ...)`.
///
/// # Arguments
/// * `graph` - A reference to a `PyGraphCache` object.
/// * `source` - The source node index.
/// * `start_time` - Seconds since midnight the search starts at.
/// * `update_rule` - One of `"default"`, `"next_bike_no_tariff"`,
///   `"next_bike_tariff"`, or `"personal_car"`; `None` disables edge updates.
/// * `enable_limit` - Enables the running-minimum pruning pass.
/// # Returns
/// A `HashMap` from node index to that node's bag of labels.
#[pyfunction]
#[pyo3(name = "run_mlc_single_source", signature = (graph, source, start_time, update_rule=None, enable_limit=false))]
pub fn run_mlc_single_source(
    graph: &PyGraphCache,
    source: usize,
    start_time: i64,
    update_rule: Option<&str>,
    enable_limit: bool,
) -> PyResult<HashMap<usize, Vec<PyLabel>>> {
    let resolved = resolve_update_rule(update_rule)?;
    let opts = MlcOptions {
        update_rule: resolved.as_ref(),
        enable_limit,
        track_paths: false,
    };
    let bags = mlc::run_single_source(&graph.inner, source, start_time, &opts)
        .map_err(|e| pyo3::exceptions::PyRuntimeError::new_err(format!("{e}")))?;

    Ok(bags
        .into_iter()
        .map(|(node, bag)| (node, bag.iter().map(PyLabel::from).collect()))
        .collect())
}

/// Calculate a reachability matrix for a set of origins, providing the best
/// (lowest `values[0]`) arrival time to every node reached, one node per
/// origin in parallel over the `rayon` pool.
#[pyfunction]
#[pyo3(signature = (graph, sources, start_time, update_rule=None))]
pub fn calculate_reachability_matrix(
    graph: &PyGraphCache,
    sources: Vec<usize>,
    start_time: i64,
    update_rule: Option<&str>,
) -> PyResult<HashMap<usize, HashMap<usize, i64>>> {
    let resolved = resolve_update_rule(update_rule)?;
    let opts = MlcOptions {
        update_rule: resolved.as_ref(),
        enable_limit: false,
        track_paths: false,
    };

    let od_matrix: HashMap<usize, HashMap<usize, i64>> = sources
        .par_iter()
        .filter_map(|&source| {
            let bags = mlc::run_single_source(&graph.inner, source, start_time, &opts).ok()?;
            let mut best_times = HashMap::with_capacity(bags.len());
            for (node, bag) in bags {
                if let Some(best) = bag.iter().map(|l| l.values[0]).min() {
                    best_times.insert(node, best);
                }
            }
            Some((source, best_times))
        })
        .collect();

    Ok(od_matrix)
}
