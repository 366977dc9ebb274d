use crate::engine::WALK_SPEED;
use serde::{Deserialize, Serialize};

/// Tunables of the query pipeline. Defaults mirror the compile-time
/// constants, so a missing configuration section behaves identically to no
/// configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Pedestrian speed in meters per second.
    #[serde(default = "default_walking_speed")]
    pub walking_speed_m_s: f64,
}

pub fn default_walking_speed() -> f64 {
    WALK_SPEED
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            walking_speed_m_s: default_walking_speed(),
        }
    }
}
