pub mod model;
pub mod store;

pub use model::{IterationTree, TreeStatistics};
pub use store::TreeStore;
