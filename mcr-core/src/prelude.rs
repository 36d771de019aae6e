//! Convenience re-export of the types a host most commonly needs to wire up
//! a run: the graph and GTFS data structures, the label/bag algebra, the two
//! engines' entry points, the step wrappers, the orchestrator, and `Error`.

pub use crate::batch::{partition_batch, run_batch, BatchError, BatchResult};
pub use crate::config::McrConfig;
pub use crate::graph::{EdgeRecord, GraphCache};
pub use crate::gtfs::{GtfsTimetable, StopTimeRecord, TripRecord};
pub use crate::label::{Bag, Label, PathToken};
pub use crate::mlc::{self, FareSchedule, MlcOptions, UpdateRule};
pub use crate::orchestrator::{BagMap, Orchestrator, RunOutput, TabularRow};
pub use crate::path::{GtfsPath, PathManager, PathType, ReconstructedLeg};
pub use crate::raptor::{self, ArrivalLabel, McLabel, PathLabel};
pub use crate::step::{BicycleStep, CarStep, PublicTransportStep, Step, WalkingStep};
pub use crate::time::{format_hhmmss, parse_hhmmss};
pub use crate::Error;
