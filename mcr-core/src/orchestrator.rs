//! MCR orchestrator: chains heterogeneous steps (walking/bicycle/car MLC,
//! public-transport McRAPTOR) into an iterative round structure, translating
//! node-id spaces at each step boundary and merging Pareto bags across
//! parallel step lists (component G of the design document).

use hashbrown::HashMap;
use tracing::{info, warn, warn_span};

use crate::label::{Bag, Label, PathToken};
use crate::path::PathManager;
use crate::step::Step;
use crate::time::format_hhmmss;
use crate::Error;

/// A bag dictionary keyed by external (OSM) node id: the unit every step
/// boundary and every round snapshot is expressed in.
pub type BagMap = HashMap<usize, Bag>;

/// One ordered list of steps run sequentially within a round; its members'
/// outputs are merged pairwise once the whole list has run.
pub type StepList = Vec<Box<dyn Step>>;

/// Merges `other` into `acc` at every node via [`Bag::merge`], the pairwise
/// bag-merge the round loop applies across a step list's outputs.
pub fn merge_bag_maps(acc: &mut BagMap, other: BagMap) {
    for (node, bag) in other {
        acc.entry(node).or_insert_with(Bag::new).merge(&bag);
    }
}

/// Merges every map in `maps` into one, left to right. `merge_over([a, b])`
/// equals `merge_over([b, a])` as sets, since [`Bag::merge`] does.
pub fn merge_over(maps: impl IntoIterator<Item = BagMap>) -> BagMap {
    let mut acc = BagMap::new();
    for m in maps {
        merge_bag_maps(&mut acc, m);
    }
    acc
}

/// Drives the round loop of §4.G: seed a start bag at the origin, run
/// `initial_steps` once, then run `repeating_steps` for `rounds` additional
/// rounds, merging every list's outputs by pairwise bag-merge at every node.
pub struct Orchestrator {
    initial_steps: Vec<StepList>,
    repeating_steps: Vec<StepList>,
    path_manager: Option<PathManager>,
}

impl Orchestrator {
    pub fn new(
        initial_steps: Vec<StepList>,
        repeating_steps: Vec<StepList>,
        track_paths: bool,
    ) -> Self {
        Orchestrator {
            initial_steps,
            repeating_steps,
            path_manager: track_paths.then(PathManager::new),
        }
    }

    pub fn path_manager(&self) -> Option<&PathManager> {
        self.path_manager.as_ref()
    }

    /// The single seed label at `origin`: `values[0] = start_time_secs`,
    /// every other `values`/`hidden_values` slot zero, path either empty or
    /// `[origin]` depending on whether path tracking is enabled.
    pub fn start_bag(
        origin: usize,
        start_time_secs: i64,
        n_values: usize,
        n_hidden: usize,
        track_paths: bool,
    ) -> BagMap {
        let mut label = Label::seed(start_time_secs, n_values, n_hidden, origin);
        if track_paths {
            label.path.push(PathToken::Node(origin as u64));
        }
        let mut bags = BagMap::new();
        bags.insert(origin, Bag::from_labels(vec![label]));
        bags
    }

    /// Runs the round loop for `rounds` additional rounds after the seed,
    /// returning `rounds + 1` bag snapshots (round 0 is the seed after
    /// `initial_steps`). A round in which every list produces an empty merged
    /// bag is logged as "no progress" and ends the loop early (§7 item 5).
    pub fn run(
        &mut self,
        origin: usize,
        start_time_secs: i64,
        rounds: u32,
        n_values: usize,
        n_hidden: usize,
    ) -> Result<RunOutput, Error> {
        let track_paths = self.path_manager.is_some();
        let start = std::time::Instant::now();
        let _span = warn_span!("mcr_run", origin, start_time_secs, rounds).entered();

        let mut bags_by_round: Vec<BagMap> =
            Vec::with_capacity(rounds as usize + 1);
        let mut round0 = Self::start_bag(origin, start_time_secs, n_values, n_hidden, track_paths);

        for list in &mut self.initial_steps {
            round0 = Self::run_list(list, &round0, 0, self.path_manager.as_mut())?;
        }
        bags_by_round.push(round0);

        for k in 1..=rounds {
            let mut acc = bags_by_round[(k - 1) as usize].clone();
            for (pos, list) in self.repeating_steps.iter_mut().enumerate() {
                let offset = (2 * k as usize).saturating_sub(1) + pos;
                acc = Self::run_list(list, &acc, offset, self.path_manager.as_mut())?;
            }
            if acc.values().all(Bag::is_empty) {
                warn!(round = k, "no progress this round; stopping early");
                bags_by_round.push(acc);
                break;
            }
            bags_by_round.push(acc);
        }

        if bags_by_round
            .iter()
            .skip(1)
            .all(|bags| bags.values().all(Bag::is_empty))
        {
            warn!("MCR run produced no labels at any non-origin node");
        }

        info!(elapsed_ms = start.elapsed().as_millis() as u64, "MCR run complete");

        Ok(RunOutput { bags_by_round })
    }

    /// Runs every step in `list` on the same `input` bag map, merging their
    /// outputs pairwise. Steps within a list see the same input rather than
    /// chaining off each other's output: the list is a set of alternatives
    /// run in parallel over the round's starting bags, not a sequence.
    fn run_list(
        list: &mut StepList,
        input: &BagMap,
        path_index_offset: usize,
        mut path_manager: Option<&mut PathManager>,
    ) -> Result<BagMap, Error> {
        let mut merged = BagMap::new();
        for step in list.iter_mut() {
            let output = step.run(input.clone(), path_index_offset, path_manager.as_deref_mut())?;
            merge_bag_maps(&mut merged, output);
        }
        Ok(merged)
    }
}

/// One row of the tabular output shape (§4.G/§6): one row per label. The two
/// schema descriptions in the design document name overlapping but not
/// identical column sets (`round` vs. `n_transfers`); this type carries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub osm_node_id: i64,
    pub time: i64,
    pub cost: i64,
    pub n_transfers: i32,
    pub round: u32,
    pub human_readable_time: String,
}

/// The structured output shape: one bag snapshot per round plus, when path
/// tracking was enabled, the segment registry needed to reconstruct journeys.
pub struct RunOutput {
    pub bags_by_round: Vec<BagMap>,
}

impl RunOutput {
    /// Flattens every round's bags into one row per label, matching the
    /// tabular output shape of §6. `path_manager` is only consulted to count
    /// public-transport segments for the `n_transfers` column; pass `None` if
    /// path tracking was disabled (the column is then always zero).
    pub fn to_tabular(&self, path_manager: Option<&PathManager>) -> Vec<TabularRow> {
        let mut rows = Vec::new();
        for (round, bags) in self.bags_by_round.iter().enumerate() {
            for (&node, bag) in bags {
                for label in bag.iter() {
                    let time = label.values.first().copied().unwrap_or(0);
                    let cost = label.values.get(1).copied().unwrap_or(0);
                    let n_transfers = path_manager
                        .map(|pm| count_transit_segments(pm, label))
                        .unwrap_or(0);
                    rows.push(TabularRow {
                        osm_node_id: node as i64,
                        time,
                        cost,
                        n_transfers,
                        round: round as u32,
                        human_readable_time: format_hhmmss(time.max(0) as u32),
                    });
                }
            }
        }
        rows
    }
}

fn count_transit_segments(pm: &PathManager, label: &Label) -> i32 {
    label
        .path
        .iter()
        .filter(|token| matches!(token, PathToken::Segment(id) if pm.gtfs_segment(*id).is_some()))
        .count() as i32
}
