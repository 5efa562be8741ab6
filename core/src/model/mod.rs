mod host;
mod patch;
mod task;

pub use host::HostTarget;
pub use patch::{ModulePatch, Patch};
pub use task::{Task, TaskStatus};
