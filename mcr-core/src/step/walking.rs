//! The unrestricted walking step: every MCR round's baseline mode, with no
//! start/end restriction and no edge-update rule.

use hashbrown::HashMap;

use crate::graph::GraphCache;
use crate::label::Bag;
use crate::mlc::{self, MlcOptions};
use crate::path::{PathManager, PathType};
use crate::step::Step;
use crate::Error;

/// Wraps a walking [`GraphCache`] keyed in an external (OSM) node-id space.
pub struct WalkingStep {
    graph: GraphCache,
    to_internal: HashMap<usize, usize>,
    from_internal: HashMap<usize, usize>,
    enable_limit: bool,
}

impl WalkingStep {
    pub fn new(
        graph: GraphCache,
        to_internal: HashMap<usize, usize>,
        from_internal: HashMap<usize, usize>,
        enable_limit: bool,
    ) -> Self {
        WalkingStep {
            graph,
            to_internal,
            from_internal,
            enable_limit,
        }
    }
}

impl Step for WalkingStep {
    fn name(&self) -> &str {
        "walking"
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
            update_rule: None,
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
                entry.insert(label);
            }
        }

        if let Some(pm) = path_manager {
            pm.extract_all_paths_from_bags(&mut output, PathType::Walking, path_index_offset);
        }
        Ok(output)
    }
}
