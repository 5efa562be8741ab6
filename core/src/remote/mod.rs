mod command;
mod pump;
mod quote;

pub use command::{RemoteCommand, RemotePhase};
pub use pump::OutputSink;
pub use quote::shell_quote;
