//! Execution core of the MCI task orchestrator: runnable-task discovery,
//! remote command lifecycle and plugin-based command dispatch.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod plugin;
pub mod remote;
pub mod scheduler;
pub mod store;
