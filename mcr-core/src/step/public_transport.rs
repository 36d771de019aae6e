//! The public-transport step: wraps McRAPTOR behind the same `Step`
//! boundary, translating between node ids on the mobility side and stop ids
//! on the timetable side.

use hashbrown::HashMap;

use crate::gtfs::{GtfsTimetable, StopId};
use crate::label::{Bag, Label, PathToken};
use crate::path::{GtfsPath, PathManager};
use crate::raptor::{self, McLabel, PathLabel, RaptorToken};
use crate::step::Step;
use crate::Error;

/// A [`PathLabel`] paired with the path/node state it carried in from the
/// mobility side, so a leg's recorded [`GtfsPath`] segment can be appended to
/// the traveller's actual prior path instead of starting a fresh one.
#[derive(Clone)]
struct PtLabel {
    inner: PathLabel,
    prefix_path: Vec<PathToken>,
    hidden_values: Vec<i64>,
}

impl McLabel for PtLabel {
    fn arrival_time(&self) -> u32 {
        self.inner.arrival_time()
    }
    fn strictly_dominates(&self, other: &Self) -> bool {
        self.inner.strictly_dominates(&other.inner)
    }
    fn update_along_trip(&mut self, arrival_time: u32, stop_id: &str, trip_id: &str) {
        self.inner.update_along_trip(arrival_time, stop_id, trip_id);
    }
    fn update_before_route_bag_merge(&mut self, departure_time: u32, stop_id: &str) {
        self.inner.update_before_route_bag_merge(departure_time, stop_id);
    }
    fn update_before_stop_bag_merge(&mut self, stop_id: &str) {
        self.inner.update_before_stop_bag_merge(stop_id);
    }
    fn update_along_footpath(&mut self, walking_time: u32, stop_id: &str) {
        self.inner.update_along_footpath(walking_time, stop_id);
    }
}

pub struct PublicTransportStep {
    gtfs: GtfsTimetable,
    footpaths: HashMap<StopId, Vec<(StopId, u32)>>,
    node_to_stop: HashMap<usize, StopId>,
    stop_to_node: HashMap<StopId, usize>,
    max_transfers: u32,
    min_transfer_secs: u32,
}

impl PublicTransportStep {
    pub fn new(
        gtfs: GtfsTimetable,
        footpaths: HashMap<StopId, Vec<(StopId, u32)>>,
        node_to_stop: HashMap<usize, StopId>,
        stop_to_node: HashMap<StopId, usize>,
        max_transfers: u32,
        min_transfer_secs: u32,
    ) -> Self {
        PublicTransportStep {
            gtfs,
            footpaths,
            node_to_stop,
            stop_to_node,
            max_transfers,
            min_transfer_secs,
        }
    }
}

impl Step for PublicTransportStep {
    fn name(&self) -> &str {
        "public_transport"
    }

    fn run(
        &mut self,
        input_bags: HashMap<usize, Bag>,
        _path_index_offset: usize,
        path_manager: Option<&mut PathManager>,
    ) -> Result<HashMap<usize, Bag>, Error> {
        let mut input: HashMap<StopId, Vec<PtLabel>> = HashMap::new();
        for (node, bag) in input_bags {
            // Start restriction (§4.F): only osm nodes mapped from stops may
            // board; anything else in the incoming bag map (e.g. the walking
            // origin) is silently skipped rather than treated as a fatal
            // unknown node, the same way `BicycleStep` filters non-dock nodes.
            let stop_id = match self.node_to_stop.get(&node) {
                Some(stop_id) => stop_id.clone(),
                None => continue,
            };
            for label in bag.into_labels() {
                let arrival_time = *label.values.first().unwrap_or(&0) as u32;
                let mut pt_label = PtLabel {
                    inner: PathLabel::start(&stop_id, arrival_time),
                    prefix_path: label.path.clone(),
                    hidden_values: label.hidden_values.clone(),
                };
                pt_label.inner.cost = label.values.get(1).copied().unwrap_or(0);
                input.entry(stop_id.clone()).or_default().push(pt_label);
            }
        }

        let result = raptor::run(
            &self.gtfs,
            &self.footpaths,
            input,
            self.max_transfers,
            self.min_transfer_secs,
        )?;

        let mut path_manager = path_manager;
        let mut output: HashMap<usize, Bag> = HashMap::new();

        for (stop, labels) in result {
            let node_id = match self.stop_to_node.get(&stop) {
                Some(&id) => id,
                None => continue,
            };
            for pt_label in labels {
                // Min-path-length filter: a label that never rode a trip
                // made no progress on this step and is dropped rather than
                // handed back unchanged, so a stop with no usable transit
                // connection simply contributes nothing.
                if pt_label.inner.n_stops == 0 {
                    continue;
                }

                let start_stop_id = pt_label
                    .inner
                    .path
                    .iter()
                    .find_map(|token| match token {
                        RaptorToken::Stop(s) => Some(s.clone()),
                        RaptorToken::Trip(_) => None,
                    })
                    .unwrap_or_else(|| stop.clone());
                let trip_id = pt_label
                    .inner
                    .path
                    .iter()
                    .rev()
                    .find_map(|token| match token {
                        RaptorToken::Trip(t) => Some(t.clone()),
                        RaptorToken::Stop(_) => None,
                    })
                    .unwrap_or_default();

                let values = vec![pt_label.inner.arrival_time as i64, pt_label.inner.cost];
                let mut path = pt_label.prefix_path.clone();
                if let Some(pm) = path_manager.as_deref_mut() {
                    let segment_id = pm.add_gtfs_segment(GtfsPath {
                        start_stop_id,
                        trip_id,
                        end_stop_id: stop.clone(),
                        values: values.clone(),
                        hidden_values: pt_label.hidden_values.clone(),
                    });
                    path.push(PathToken::Segment(segment_id));
                }

                let label = Label {
                    values,
                    hidden_values: pt_label.hidden_values,
                    path,
                    node_id,
                };
                output.entry(node_id).or_insert_with(Bag::new).insert(label);
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::{StopTimeRecord, TripRecord};

    fn toy_step() -> PublicTransportStep {
        let trips = vec![TripRecord { trip_id: "T16".into(), route_id: "R16".into() }];
        let stop_times = vec![
            StopTimeRecord { trip_id: "T16".into(), stop_id: "818".into(), stop_sequence: 0, arrival_seconds: 54480, departure_seconds: 54480 },
            StopTimeRecord { trip_id: "T16".into(), stop_id: "317".into(), stop_sequence: 1, arrival_seconds: 54540, departure_seconds: 54540 },
        ];
        let gtfs = GtfsTimetable::build(&trips, &stop_times).unwrap();
        let node_to_stop: HashMap<usize, StopId> = [(1, "818".to_string())].into_iter().collect();
        let stop_to_node: HashMap<StopId, usize> =
            [("818".to_string(), 1), ("317".to_string(), 2)].into_iter().collect();
        PublicTransportStep::new(gtfs, HashMap::new(), node_to_stop, stop_to_node, 10, 0)
    }

    #[test]
    fn rides_a_trip_and_records_a_gtfs_segment() {
        let mut step = toy_step();
        let mut manager = PathManager::new();
        let mut input = HashMap::new();
        input.insert(1, Bag::from_labels(vec![Label::new(vec![54000, 0], vec![], 1)]));

        let output = step.run(input, 0, Some(&mut manager)).unwrap();
        let label = output[&2].iter().next().unwrap();
        assert_eq!(label.values[0], 54540);
        match label.path.last().unwrap() {
            PathToken::Segment(id) => {
                let gtfs_path = manager.gtfs_segment(*id).unwrap();
                assert_eq!(gtfs_path.start_stop_id, "818");
                assert_eq!(gtfs_path.end_stop_id, "317");
                assert_eq!(gtfs_path.trip_id, "T16");
            }
            _ => panic!("expected a segment token"),
        }
    }

    #[test]
    fn a_label_that_never_boards_is_dropped() {
        let mut step = toy_step();
        let mut input = HashMap::new();
        // start time after the only trip departs: nothing to board
        input.insert(1, Bag::from_labels(vec![Label::new(vec![99999, 0], vec![], 1)]));
        let output = step.run(input, 0, None).unwrap();
        assert!(output.get(&2).map(Bag::is_empty).unwrap_or(true));
    }

    #[test]
    fn non_stop_node_in_input_is_skipped_not_fatal() {
        let mut step = toy_step();
        let mut input = HashMap::new();
        // node 0 is not in node_to_stop (e.g. the walking origin passed
        // through by the orchestrator alongside the stop-mapped node 1).
        input.insert(0, Bag::from_labels(vec![Label::new(vec![50000, 0], vec![], 0)]));
        input.insert(1, Bag::from_labels(vec![Label::new(vec![54000, 0], vec![], 1)]));

        let output = step.run(input, 0, None).unwrap();
        assert!(output.contains_key(&2));
    }
}
