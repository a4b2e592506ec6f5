pub(crate) mod af;
pub mod match_options;
pub(crate) mod prefix_id;
pub(crate) mod route;

pub use prefix_id::PrefixId;
pub use route::RouteDescriptor;

pub mod errors;
pub mod stats;
