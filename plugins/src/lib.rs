pub mod factory;
pub mod git;
pub mod patch;
pub mod shell;
