/*!
Python bindings for the immutable [`GraphCache`](mcr_core::graph::GraphCache)
backing the MLC engine. Main logic lives in [`mcr_core::graph`]; this module
only translates between Python values and the Rust structures.

### Example Usage in Python
```python
from mcr import PyGraphCache

graph = PyGraphCache(node_count=3, n_values=2, n_hidden=1)
graph.set_edges([(0, 1, [600, 0], [600]), (1, 2, [300, 0], [300])])
```
*/

use hashbrown::HashMap;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use mcr_core::graph::{EdgeRecord, GraphCache};

/// Python-facing wrapper around a built [`GraphCache`]. Immutable once its
/// edges are set, mirroring the Rust type's own lifecycle.
#[pyclass]
pub struct PyGraphCache {
    pub(crate) inner: GraphCache,
}

#[pymethods]
impl PyGraphCache {
    #[new]
    fn new(node_count: usize, n_values: usize, n_hidden: usize) -> Self {
        PyGraphCache {
            inner: GraphCache::new(node_count, n_values, n_hidden),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "PyGraphCache(node_count={}, n_values={}, n_hidden={})",
            self.inner.node_count(),
            self.inner.n_values(),
            self.inner.n_hidden()
        )
    }

    /// Builds the adjacency lists from `(u, v, weights, hidden_weights)` tuples.
    fn set_edges(&mut self, edges: Vec<(usize, usize, Vec<i64>, Vec<i64>)>) -> PyResult<()> {
        let records = edges
            .into_iter()
            .map(|(u, v, weights, hidden_weights)| EdgeRecord {
                u,
                v,
                weights,
                hidden_weights,
            })
            .collect();
        self.inner
            .set_edges(records)
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Attaches a sparse node -> POI-category-list table.
    fn set_node_weights(&mut self, map: HashMap<usize, Vec<u32>>) {
        self.inner.set_node_weights(map);
    }

    #[getter]
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }
}
