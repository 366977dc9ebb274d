pub mod builder;
pub mod queries;
pub mod store;

pub use builder::{GraphBuilder, ModelError};
pub use store::{Attr, EntityId, GraphStore, Value};
