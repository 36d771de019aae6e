//! The personal-car step: MLC over a combined drive/walk graph with a flat
//! per-edge cost and no start restriction (a private car is assumed parked
//! at the traveller's current position).

use hashbrown::HashMap;

use crate::graph::GraphCache;
use crate::label::Bag;
use crate::mlc::{self, MlcOptions, UpdateRule};
use crate::path::{PathManager, PathType};
use crate::step::Step;
use crate::Error;

pub struct CarStep {
    graph: GraphCache,
    to_internal: HashMap<usize, usize>,
    from_internal: HashMap<usize, usize>,
    update_rule: UpdateRule,
    enable_limit: bool,
}

impl CarStep {
    pub fn new(
        graph: GraphCache,
        to_internal: HashMap<usize, usize>,
        from_internal: HashMap<usize, usize>,
        fixed_cost_per_edge: i64,
        enable_limit: bool,
    ) -> Self {
        CarStep {
            graph,
            to_internal,
            from_internal,
            update_rule: UpdateRule::PersonalCar { fixed_cost_per_edge },
            enable_limit,
        }
    }
}

impl Step for CarStep {
    fn name(&self) -> &str {
        "personal_car"
    }

    fn run(
        &mut self,
        input_bags: HashMap<usize, Bag>,
        path_index_offset: usize,
        path_manager: Option<&mut PathManager>,
    ) -> Result<HashMap<usize, Bag>, Error> {
        let mut internal_input: HashMap<usize, Bag> = HashMap::new();
        for (node, bag) in input_bags {
            let internal_id = *self.to_internal.get(&node).ok_or(Error::UnknownNode(node))?;
            let entry = internal_input.entry(internal_id).or_insert_with(Bag::new);
            for mut label in bag.into_labels() {
                label.node_id = internal_id;
                entry.insert(label);
            }
        }

        let opts = MlcOptions {
            update_rule: Some(&self.update_rule),
            enable_limit: self.enable_limit,
            track_paths: path_manager.is_some(),
        };
        let result = mlc::run_with_bags(&self.graph, internal_input, &opts)?;

        let mut output: HashMap<usize, Bag> = HashMap::new();
        for (internal_id, bag) in result {
            let external_id = match self.from_internal.get(&internal_id) {
                Some(&id) => id,
                None => continue,
            };
            let entry = output.entry(external_id).or_insert_with(Bag::new);
            for mut label in bag.into_labels() {
                label.node_id = external_id;
                if let Some(first) = label.hidden_values.first_mut() {
                    *first = 0;
                }
                entry.insert(label);
            }
        }

        if let Some(pm) = path_manager {
            pm.extract_all_paths_from_bags(&mut output, PathType::DrivingWalking, path_index_offset);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeRecord;
    use crate::label::Label;

    #[test]
    fn flat_cost_is_applied_per_edge() {
        let mut graph = GraphCache::new(2, 2, 0);
        graph
            .set_edges(vec![EdgeRecord {
                u: 0,
                v: 1,
                weights: vec![120, 0],
                hidden_weights: vec![],
            }])
            .unwrap();
        let to_internal: HashMap<usize, usize> = [(100, 0), (101, 1)].into_iter().collect();
        let from_internal: HashMap<usize, usize> = [(0, 100), (1, 101)].into_iter().collect();
        let mut step = CarStep::new(graph, to_internal, from_internal, 50, false);

        let mut input = HashMap::new();
        input.insert(100, Bag::from_labels(vec![Label::new(vec![0, 0], vec![], 100)]));
        let output = step.run(input, 0, None).unwrap();
        let label = output[&101].iter().next().unwrap();
        assert_eq!(label.values[1], 50);
    }
}
