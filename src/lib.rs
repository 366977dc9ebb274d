pub mod config;
pub mod engine;
pub mod geometry;
pub mod graph;
pub mod response;
pub mod solver;
pub mod time;

pub use chrono;
pub use chrono_tz;
pub use tracing;

pub use config::PlannerConfig;
pub use graph::{GraphBuilder, GraphStore};
pub use response::Directions;
pub use solver::{plan, BadRequest, PlanRequest};
pub use time::{PositiveDuration, SecondsSinceDayStart};
