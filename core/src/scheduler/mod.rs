mod cache;
mod dependencies;
mod finder;
mod graph;

pub use cache::DependencyCache;
pub use finder::{StoreTaskFinder, TaskFinder};
pub use graph::{find_dependency_cycles, format_cycle_path};
