//! Full-stack tests driving `mcr_core`'s `Orchestrator` the way a host
//! process would, rather than exercising one engine in isolation. Reuses the
//! Cologne Ehrenfeld toy network (stops `818`/`317`/`251`/`835`, trips
//! `T16`/`T13`) that the unit tests inside `mcr-core` build the same way, so
//! the numbers line up with those lower-level assertions.

use hashbrown::HashMap;
use mcr_core::prelude::*;

fn cologne_gtfs() -> GtfsTimetable {
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

fn cologne_footpaths() -> HashMap<String, Vec<(String, u32)>> {
    let mut footpaths = HashMap::new();
    footpaths.insert("251".to_string(), vec![("835".to_string(), 147)]);
    footpaths
}

/// Walks 120s onto the transit network, rides T16 then T13, and walks a
/// 147s footpath off it: the reference journey's arrival (`15:33:27`), and
/// the path-reconstruction round-trip invariant across both a mobility leg
/// and a transit leg (reconstructing the label's path and summing each
/// leg's own travel time recovers `values[0] - start_time` exactly).
#[test]
fn walk_then_transit_round_trip_preserves_total_time() {
    let mut walk_graph = GraphCache::new(2, 2, 0);
    walk_graph
        .set_edges(vec![EdgeRecord { u: 0, v: 1, weights: vec![120, 0], hidden_weights: vec![] }])
        .unwrap();
    let identity: HashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();
    let initial_walk = WalkingStep::new(walk_graph, identity.clone(), identity, false);

    let node_to_stop: HashMap<usize, String> = [(1, "818".to_string())].into_iter().collect();
    let stop_to_node: HashMap<String, usize> =
        [("818".to_string(), 1), ("835".to_string(), 2)].into_iter().collect();
    let pt = PublicTransportStep::new(cologne_gtfs(), cologne_footpaths(), node_to_stop, stop_to_node, 10, 0);

    let mut orchestrator = Orchestrator::new(
        vec![vec![Box::new(initial_walk)]],
        vec![vec![Box::new(pt)]],
        true,
    );

    let start_time = parse_hhmmss("15:00:00").unwrap() as i64;
    let output = orchestrator.run(0, start_time, 1, 2, 0).unwrap();

    let final_bag = &output.bags_by_round[1][&2];
    let label = final_bag.iter().next().unwrap();
    assert_eq!(label.values[0], parse_hhmmss("15:33:27").unwrap() as i64);

    let path_manager = orchestrator.path_manager().unwrap();
    let legs = path_manager.reconstruct(label);
    assert_eq!(legs.len(), 2);

    let mut previous_end = start_time;
    let mut total = 0i64;
    for leg in &legs {
        let end = leg.end_values()[0];
        total += end - previous_end;
        previous_end = end;
    }
    assert_eq!(total, label.values[0] - start_time);
}

/// An arrival-time-only McRAPTOR label reaches every stop at the same time
/// as the multi-criteria `PathLabel` the orchestrator's `PublicTransportStep`
/// uses internally, and its stop bag holds exactly one label throughout.
#[test]
fn arrival_only_label_matches_multi_criteria_arrival() {
    let gtfs = cologne_gtfs();
    let footpaths = cologne_footpaths();

    let mut input = HashMap::new();
    input.insert("818".to_string(), vec![ArrivalLabel { arrival_time: 54000 }]);
    let result = raptor::run(&gtfs, &footpaths, input, 10, 0).unwrap();

    let bag_at_destination = &result["835"];
    assert_eq!(bag_at_destination.len(), 1);
    assert_eq!(bag_at_destination[0].arrival_time, parse_hhmmss("15:33:27").unwrap());
}

/// When no node in reach is a bicycle dock, `BicycleStep` contributes
/// nothing to its step list, but the list still progresses on the other
/// step's output: the orchestrator does not let one empty step discard a
/// round's walking progress.
#[test]
fn bicycle_without_docks_still_lets_the_list_progress_via_walking() {
    let mut bike_graph = GraphCache::new(2, 2, 1);
    bike_graph
        .set_edges(vec![EdgeRecord { u: 0, v: 1, weights: vec![300, 0], hidden_weights: vec![300] }])
        .unwrap();
    let identity: HashMap<usize, usize> = [(0, 0), (1, 1)].into_iter().collect();
    let bicycle = BicycleStep::new(
        bike_graph,
        identity.clone(),
        identity.clone(),
        Default::default(), // no node is tagged as a dock
        UpdateRule::NextBikeNoTariff,
        false,
    );

    let mut walk_graph = GraphCache::new(2, 2, 0);
    walk_graph
        .set_edges(vec![EdgeRecord { u: 0, v: 1, weights: vec![600, 0], hidden_weights: vec![] }])
        .unwrap();
    let walking = WalkingStep::new(walk_graph, identity.clone(), identity, false);

    let mut orchestrator = Orchestrator::new(
        vec![],
        vec![vec![Box::new(bicycle), Box::new(walking)]],
        false,
    );

    let output = orchestrator.run(0, 0, 1, 2, 1).unwrap();
    let label = output.bags_by_round[1][&1].iter().next().unwrap();
    assert_eq!(label.values[0], 600); // walking's time, not bicycling's
}
