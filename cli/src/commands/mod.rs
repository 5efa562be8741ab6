pub mod cli;
pub mod exec;
pub mod runnable;
