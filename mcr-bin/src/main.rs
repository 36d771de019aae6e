//! Example host process for `mcr_core`: wires together a toy walking graph
//! and a toy GTFS timetable (the Cologne Ehrenfeld reference scenario used
//! throughout the test suite), runs one MCR round, and prints the resulting
//! bags. GTFS ingestion, OSM ingestion, and CLI argument parsing are a real
//! host's job; this binary hardcodes a small embedded network instead.

use mcr_core::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let gtfs = build_toy_gtfs()?;
    let mut footpaths = hashbrown::HashMap::new();
    footpaths.insert("251".to_string(), vec![("835".to_string(), 147)]);

    // Node 0 stands in for the OSM node snapped to stop 818; the walking
    // graph has no edges since this demo only exercises the walk -> PT chain.
    let walk_graph = GraphCache::new(2, 2, 0);

    let mut node_to_stop = hashbrown::HashMap::new();
    node_to_stop.insert(0usize, "818".to_string());
    let mut stop_to_node = hashbrown::HashMap::new();
    stop_to_node.insert("818".to_string(), 0usize);
    stop_to_node.insert("835".to_string(), 1usize);

    let pt_step = PublicTransportStep::new(gtfs, footpaths, node_to_stop, stop_to_node, 10, 0);
    let walking_step = WalkingStep::new(
        walk_graph,
        (0..2).map(|i| (i, i)).collect(),
        (0..2).map(|i| (i, i)).collect(),
        false,
    );

    let mut orchestrator = Orchestrator::new(
        vec![vec![Box::new(walking_step)]],
        vec![vec![Box::new(pt_step)]],
        true,
    );

    let start_time = parse_hhmmss("15:00:00")?;
    let output = orchestrator.run(0, start_time as i64, 1, 2, 0)?;

    for (round, bags) in output.bags_by_round.iter().enumerate() {
        for (node, bag) in bags {
            for label in bag.iter() {
                let arrival = format_hhmmss(label.values[0].max(0) as u32);
                println!("round {round}: node {node} arrival {arrival} cost {}", label.values[1]);
            }
        }
    }

    for row in output.to_tabular(orchestrator.path_manager()) {
        println!("{row:?}");
    }

    Ok(())
}

fn build_toy_gtfs() -> Result<GtfsTimetable, mcr_core::Error> {
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
    GtfsTimetable::build(&trips, &stop_times)
}
