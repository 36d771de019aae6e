//! Multi-Criteria RAPTOR: a round-based Pareto timetable search over
//! [`GtfsTimetable`], polymorphic over any label implementing [`McLabel`].

use hashbrown::{HashMap, HashSet};

use crate::gtfs::{GtfsTimetable, RouteId, StopId, TripId};
use crate::Error;

/// An opaque token in a McRAPTOR-with-path label's path: either a stop the
/// journey passed through or a trip it rode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaptorToken {
    Stop(StopId),
    Trip(TripId),
}

/// Label interface McRAPTOR is polymorphic over (contract in the design
/// document's McRAPTOR engine section).
pub trait McLabel: Clone {
    fn arrival_time(&self) -> u32;
    /// Dominance in the label's own attribute space (e.g. arrival time, or
    /// arrival time + cost).
    fn strictly_dominates(&self, other: &Self) -> bool;
    /// Called when the label rides to the next stop on its current trip.
    fn update_along_trip(&mut self, arrival_time: u32, stop_id: &str, trip_id: &str);
    /// Called when the label boards a trip at `stop_id` at `departure_time`.
    fn update_before_route_bag_merge(&mut self, departure_time: u32, stop_id: &str);
    /// Called when a riding label is inserted into the stop's bag.
    fn update_before_stop_bag_merge(&mut self, stop_id: &str);
    /// Called when the label crosses a footpath of `walking_time` seconds to `stop_id`.
    fn update_along_footpath(&mut self, walking_time: u32, stop_id: &str);
}

/// Arrival-time-only label: scenario 2 of the testable-properties section
/// (every stop bag has exactly one label).
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalLabel {
    pub arrival_time: u32,
}

impl McLabel for ArrivalLabel {
    fn arrival_time(&self) -> u32 {
        self.arrival_time
    }
    fn strictly_dominates(&self, other: &Self) -> bool {
        self.arrival_time <= other.arrival_time
    }
    fn update_along_trip(&mut self, arrival_time: u32, _stop_id: &str, _trip_id: &str) {
        self.arrival_time = arrival_time;
    }
    fn update_before_route_bag_merge(&mut self, _departure_time: u32, _stop_id: &str) {}
    fn update_before_stop_bag_merge(&mut self, _stop_id: &str) {}
    fn update_along_footpath(&mut self, walking_time: u32, _stop_id: &str) {
        self.arrival_time += walking_time;
    }
}

/// Multi-criteria (arrival time + cost) label carrying a compressed path of
/// `Stop`/`Trip` tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLabel {
    pub arrival_time: u32,
    pub cost: i64,
    pub n_stops: u32,
    pub path: Vec<RaptorToken>,
}

impl PathLabel {
    pub fn start(stop_id: &str, arrival_time: u32) -> Self {
        PathLabel {
            arrival_time,
            cost: 0,
            n_stops: 0,
            path: vec![RaptorToken::Stop(stop_id.to_string())],
        }
    }

    fn push_stop_if_new(&mut self, stop_id: &str) {
        let token = RaptorToken::Stop(stop_id.to_string());
        if self.path.last() != Some(&token) {
            self.path.push(token);
        }
    }
}

impl McLabel for PathLabel {
    fn arrival_time(&self) -> u32 {
        self.arrival_time
    }
    fn strictly_dominates(&self, other: &Self) -> bool {
        self.arrival_time <= other.arrival_time && self.cost <= other.cost
    }
    fn update_along_trip(&mut self, arrival_time: u32, _stop_id: &str, trip_id: &str) {
        self.arrival_time = arrival_time;
        self.n_stops += 1;
        let token = RaptorToken::Trip(trip_id.to_string());
        if self.path.last() != Some(&token) {
            self.path.push(token);
        }
    }
    fn update_before_route_bag_merge(&mut self, _departure_time: u32, stop_id: &str) {
        self.push_stop_if_new(stop_id);
    }
    fn update_before_stop_bag_merge(&mut self, stop_id: &str) {
        self.push_stop_if_new(stop_id);
    }
    fn update_along_footpath(&mut self, walking_time: u32, stop_id: &str) {
        self.arrival_time += walking_time;
        self.push_stop_if_new(stop_id);
    }
}

fn stop_bag_insert<L: McLabel>(bag: &mut Vec<L>, label: L) -> bool {
    if bag.iter().any(|existing| existing.strictly_dominates(&label)) {
        return false;
    }
    bag.retain(|existing| !label.strictly_dominates(existing));
    bag.push(label);
    true
}

fn route_bag_insert<L: McLabel>(bag: &mut Vec<(L, TripId)>, label: L, trip: TripId) -> bool {
    if bag.iter().any(|(existing, _)| existing.strictly_dominates(&label)) {
        return false;
    }
    bag.retain(|(existing, _)| !label.strictly_dominates(existing));
    bag.push((label, trip));
    true
}

/// Scans `trip_ids_by_route[route]` (already departure-ordered, ties broken
/// by trip id) for the earliest trip departing `stop` no earlier than `ready`.
fn earliest_trip(
    gtfs: &GtfsTimetable,
    route: &RouteId,
    stop: &str,
    ready: u32,
) -> Option<TripId> {
    let trip_ids = gtfs.trip_ids_by_route.get(route)?;
    trip_ids
        .iter()
        .find(|trip| {
            gtfs.times_by_stop_by_trip
                .get(*trip)
                .and_then(|times| times.get(stop))
                .map(|&(_, dep)| dep >= ready)
                .unwrap_or(false)
        })
        .cloned()
}

/// Runs the round-based McRAPTOR search. `footpaths[s]` lists `(s', walking
/// seconds)` pairs; a footpath from a stop to itself is ignored.
pub fn run<L: McLabel>(
    gtfs: &GtfsTimetable,
    footpaths: &HashMap<StopId, Vec<(StopId, u32)>>,
    input: HashMap<StopId, Vec<L>>,
    max_transfers: u32,
    min_transfer_secs: u32,
) -> Result<HashMap<StopId, Vec<L>>, Error> {
    for stop in input.keys() {
        if !gtfs.stop_id_set.is_empty() && !gtfs.stop_id_set.contains(stop) {
            return Err(Error::UnknownStop(stop.clone()));
        }
    }

    let mut bags: HashMap<StopId, Vec<L>> = input;
    let mut marked: HashSet<StopId> = bags.keys().cloned().collect();

    for _round in 1..=max_transfers {
        if marked.is_empty() {
            break;
        }
        let previous = bags.clone();
        let mut newly_marked: HashSet<StopId> = HashSet::new();

        let mut q: HashMap<RouteId, usize> = HashMap::new();
        for stop in &marked {
            if let Some(routes) = gtfs.routes_by_stop.get(stop) {
                for route in routes {
                    let idx = match gtfs.idx_by_stop_by_route.get(route).and_then(|m| m.get(stop)) {
                        Some(idx) => *idx,
                        None => continue,
                    };
                    q.entry(route.clone())
                        .and_modify(|cur| {
                            if idx < *cur {
                                *cur = idx;
                            }
                        })
                        .or_insert(idx);
                }
            }
        }

        for (route, start_idx) in &q {
            let stops = match gtfs.stops_by_route.get(route) {
                Some(s) => s,
                None => continue,
            };
            let mut route_bag: Vec<(L, TripId)> = Vec::new();

            for idx in *start_idx..stops.len() {
                let stop = &stops[idx];

                for (label, trip) in route_bag.iter_mut() {
                    let (arrival, _) = gtfs
                        .times_by_stop_by_trip
                        .get(trip)
                        .and_then(|m| m.get(stop))
                        .ok_or_else(|| Error::MissingGtfsKey(format!("{trip}@{stop}")))?;
                    label.update_along_trip(*arrival, stop, trip);
                }

                let output_bag = bags.entry(stop.clone()).or_default();
                for (label, _trip) in route_bag.iter() {
                    let mut absorbed = label.clone();
                    absorbed.update_before_stop_bag_merge(stop);
                    if stop_bag_insert(output_bag, absorbed) {
                        newly_marked.insert(stop.clone());
                    }
                }

                if let Some(input_stop_bag) = previous.get(stop) {
                    for label in input_stop_bag {
                        let ready = label.arrival_time() + min_transfer_secs;
                        if let Some(trip) = earliest_trip(gtfs, route, stop, ready) {
                            let departure = gtfs.times_by_stop_by_trip[&trip][stop].1;
                            let mut boarding = label.clone();
                            boarding.update_before_route_bag_merge(departure, stop);
                            route_bag_insert(&mut route_bag, boarding, trip);
                        }
                    }
                }
            }
        }

        // §4.E step 3 relaxes footpaths from the stops marked *this* round's
        // route scan (`newly_marked`), not the stops that seeded it
        // (`marked`): otherwise a trailing footpath after the last boarding
        // a `max_transfers`-bounded search allows never gets relaxed. Snapshot
        // before relaxing since relaxation itself grows `newly_marked`.
        let route_scan_marked: Vec<StopId> = newly_marked.iter().cloned().collect();
        for stop in &route_scan_marked {
            if let Some(edges) = footpaths.get(stop) {
                let arriving: Vec<L> = bags.get(stop).cloned().unwrap_or_default();
                for (other_stop, walk_secs) in edges {
                    if other_stop == stop {
                        continue;
                    }
                    for label in &arriving {
                        let mut relaxed = label.clone();
                        relaxed.update_along_footpath(*walk_secs, other_stop);
                        let out = bags.entry(other_stop.clone()).or_default();
                        if stop_bag_insert(out, relaxed) {
                            newly_marked.insert(other_stop.clone());
                        }
                    }
                }
            }
        }

        marked = newly_marked;
    }

    Ok(bags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::{StopTimeRecord, TripRecord};

    fn cologne_toy_network() -> GtfsTimetable {
        let trips = vec![
            TripRecord { trip_id: "T16".into(), route_id: "R16".into() },
            TripRecord { trip_id: "T13".into(), route_id: "R13".into() },
        ];
        let stop_times = vec![
            StopTimeRecord { trip_id: "T16".into(), stop_id: "818".into(), stop_sequence: 0, arrival_seconds: 54480, departure_seconds: 54480 },
            StopTimeRecord { trip_id: "T16".into(), stop_id: "317".into(), stop_sequence: 1, arrival_seconds: 54540, departure_seconds: 54540 },
            StopTimeRecord { trip_id: "T13".into(), stop_id: "317".into(), stop_sequence: 0, arrival_seconds: 55200, departure_seconds: 55200 },
            StopTimeRecord { trip_id: "T13".into(), stop_id: "251".into(), stop_sequence: 1, arrival_seconds: 55860, departure_seconds: 55860 },
        ];
        GtfsTimetable::build(&trips, &stop_times).unwrap()
    }

    #[test]
    fn reference_walk_reaches_ehrenfeld_via_two_trips_and_a_footpath() {
        let gtfs = cologne_toy_network();
        let mut footpaths = HashMap::new();
        footpaths.insert("251".to_string(), vec![("835".to_string(), 147)]);

        let mut input = HashMap::new();
        input.insert("818".to_string(), vec![PathLabel::start("818", 54000)]);

        let result = run(&gtfs, &footpaths, input, 10, 0).unwrap();
        let label = result["835"]
            .iter()
            .min_by_key(|l| l.arrival_time)
            .unwrap();
        assert_eq!(label.arrival_time, 55860 + 147); // 15:33:27
    }

    #[test]
    fn arrival_only_label_matches_path_label_times() {
        let gtfs = cologne_toy_network();
        let mut footpaths = HashMap::new();
        footpaths.insert("251".to_string(), vec![("835".to_string(), 147)]);

        let mut input = HashMap::new();
        input.insert("818".to_string(), vec![ArrivalLabel { arrival_time: 54000 }]);

        let result = run(&gtfs, &footpaths, input, 10, 0).unwrap();
        assert_eq!(result["835"].len(), 1);
        assert_eq!(result["835"][0].arrival_time, 55860 + 147);
    }

    #[test]
    fn self_footpath_is_ignored() {
        let gtfs = cologne_toy_network();
        let mut footpaths = HashMap::new();
        footpaths.insert("818".to_string(), vec![("818".to_string(), 60)]);
        let mut input = HashMap::new();
        input.insert("818".to_string(), vec![ArrivalLabel { arrival_time: 54000 }]);
        let result = run(&gtfs, &footpaths, input, 1, 0).unwrap();
        assert_eq!(result["818"][0].arrival_time, 54000);
    }

    #[test]
    fn footpath_after_the_last_allowed_boarding_is_still_relaxed() {
        // max_transfers = 1: the single boarding (818 -[T16]-> 317) uses up
        // the whole transfer budget. The trailing footpath (317 -> 900) is
        // not itself a boarding, so it must still be relaxed in the same
        // round that the route scan marks 317, not deferred past the last round.
        let gtfs = cologne_toy_network();
        let mut footpaths = HashMap::new();
        footpaths.insert("317".to_string(), vec![("900".to_string(), 30)]);
        let mut input = HashMap::new();
        input.insert("818".to_string(), vec![PathLabel::start("818", 54000)]);

        let result = run(&gtfs, &footpaths, input, 1, 0).unwrap();
        let label = result["900"].iter().min_by_key(|l| l.arrival_time).unwrap();
        assert_eq!(label.arrival_time, 54540 + 30);
    }

    #[test]
    fn empty_gtfs_returns_input_unchanged() {
        let gtfs = GtfsTimetable::default();
        let footpaths = HashMap::new();
        let mut input = HashMap::new();
        input.insert("818".to_string(), vec![ArrivalLabel { arrival_time: 54000 }]);
        let result = run(&gtfs, &footpaths, input.clone(), 10, 0).unwrap();
        assert_eq!(result["818"][0].arrival_time, input["818"][0].arrival_time);
    }
}
