//! Run-wide configuration threaded through every component. The struct's
//! shape is in scope; the file format a host loads it from is not (see the
//! on-disk-artifact non-goal).

use serde::{Deserialize, Serialize};

use crate::mlc::FareSchedule;

/// Run-wide knobs shared by the MLC engine, McRAPTOR, and the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McrConfig {
    /// Discard labels that cannot improve any per-component minimum already
    /// realised at their target node (the MLC engine's `enable_limit`).
    pub enable_limit: bool,
    /// When set, labels carry empty paths and no `PathManager` is instantiated.
    pub disable_paths: bool,
    pub max_transfers: u32,
    pub min_transfer_time_secs: u32,
    pub bike_fare_tiers: Vec<(i64, i64)>,
    pub personal_car_fixed_cost_per_edge: i64,
}

impl Default for McrConfig {
    fn default() -> Self {
        McrConfig {
            enable_limit: false,
            disable_paths: false,
            max_transfers: 10,
            min_transfer_time_secs: 60,
            bike_fare_tiers: vec![(0, 0), (1800, 100), (3600, 250), (7200, 500)],
            personal_car_fixed_cost_per_edge: 50,
        }
    }
}

impl McrConfig {
    pub fn fare_schedule(&self) -> FareSchedule {
        FareSchedule::new(self.bike_fare_tiers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = McrConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: McrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.max_transfers, config.max_transfers);
    }
}
