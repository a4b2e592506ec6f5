pub mod config;
pub mod engine;
pub mod neighbor;
pub mod prefix_index;
pub mod registry;

pub use config::StoreConfig;
pub use engine::{IngestEnd, LineOutcome, RoutingEngine};
pub use neighbor::{Neighbor, NeighborState};
pub use prefix_index::{InsertOutcome, PrefixIndex};
pub use registry::NeighborRegistry;
