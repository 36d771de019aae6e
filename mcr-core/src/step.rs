//! Uniform wrapper around one stage of the MCR pipeline: translates node-id
//! spaces at the boundary, then delegates to either the MLC engine or
//! McRAPTOR.

use hashbrown::HashMap;

use crate::label::Bag;
use crate::path::PathManager;
use crate::Error;

pub mod bicycle;
pub mod car;
pub mod public_transport;
pub mod walking;

pub use bicycle::BicycleStep;
pub use car::CarStep;
pub use public_transport::PublicTransportStep;
pub use walking::WalkingStep;

/// One stage of the MCR pipeline. `run` consumes a bag dictionary keyed in
/// the external (OSM) node-id space and returns one in the same space;
/// `path_index_offset` tells the step (via the path manager) how many of a
/// label's leading path tokens belong to earlier steps.
pub trait Step {
    fn run(
        &mut self,
        input_bags: HashMap<usize, Bag>,
        path_index_offset: usize,
        path_manager: Option<&mut PathManager>,
    ) -> Result<HashMap<usize, Bag>, Error>;

    fn name(&self) -> &str;
}
