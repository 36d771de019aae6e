/*!
Python bindings for the read-only [`GtfsTimetable`](mcr_core::gtfs::GtfsTimetable)
and the McRAPTOR engine that searches it. Main logic lives in
[`mcr_core::gtfs`] and [`mcr_core::raptor`]; this module only translates
between Python values and the Rust structures.

### Example Usage in Python
```python
from mcr import PyGtfsTimetable, run_mcraptor_arrival_only

gtfs = PyGtfsTimetable(trips=[("T16", "R16")], stop_times=[
    ("T16", "818", 0, 54480, 54480),
    ("T16", "317", 1, 54540, 54540),
])
bags = run_mcraptor_arrival_only(gtfs, {}, {"818": 54000}, max_transfers=10, min_transfer_secs=0)
```
*/

use hashbrown::HashMap;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use mcr_core::gtfs::{GtfsTimetable, StopTimeRecord, TripRecord};
use mcr_core::raptor::{self, ArrivalLabel};

#[pyclass]
#[derive(Clone)]
pub struct PyGtfsTimetable {
    pub(crate) inner: GtfsTimetable,
}

#[pymethods]
impl PyGtfsTimetable {
    /// Builds all five indices from the `trips` and `stop_times` flat tables
    /// and validates the FIFO invariant, raising `ValueError` on failure.
    #[new]
    fn new(
        trips: Vec<(String, String)>,
        stop_times: Vec<(String, String, u32, u32, u32)>,
    ) -> PyResult<Self> {
        let trips: Vec<TripRecord> = trips
            .into_iter()
            .map(|(trip_id, route_id)| TripRecord { trip_id, route_id })
            .collect();
        let stop_times: Vec<StopTimeRecord> = stop_times
            .into_iter()
            .map(|(trip_id, stop_id, stop_sequence, arrival_seconds, departure_seconds)| {
                StopTimeRecord {
                    trip_id,
                    stop_id,
                    stop_sequence,
                    arrival_seconds,
                    departure_seconds,
                }
            })
            .collect();
        let inner = GtfsTimetable::build(&trips, &stop_times)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(PyGtfsTimetable { inner })
    }

    fn __repr__(&self) -> String {
        format!(
            "PyGtfsTimetable(routes={}, stops={}, trips={})",
            self.inner.route_id_set.len(),
            self.inner.stop_id_set.len(),
            self.inner.trip_id_set.len()
        )
    }
}

/// Runs McRAPTOR with the arrival-time-only label (scenario 2 of the testable
/// properties: exactly one label per stop bag). `input` maps origin stop id
/// to its start-of-journey arrival time in seconds.
#[pyfunction]
#[pyo3(signature = (gtfs, footpaths, input, max_transfers=10, min_transfer_secs=0))]
pub fn run_mcraptor_arrival_only(
    gtfs: &PyGtfsTimetable,
    footpaths: HashMap<String, Vec<(String, u32)>>,
    input: HashMap<String, u32>,
    max_transfers: u32,
    min_transfer_secs: u32,
) -> PyResult<HashMap<String, u32>> {
    let input: HashMap<String, Vec<ArrivalLabel>> = input
        .into_iter()
        .map(|(stop, arrival_time)| (stop, vec![ArrivalLabel { arrival_time }]))
        .collect();

    let result = raptor::run(&gtfs.inner, &footpaths, input, max_transfers, min_transfer_secs)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    Ok(result
        .into_iter()
        .filter_map(|(stop, labels)| labels.into_iter().map(|l| l.arrival_time).min().map(|t| (stop, t)))
        .collect())
}
