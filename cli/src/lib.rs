//! mci-cli library; modules are exposed for tests.

pub mod commands;
pub mod http;
