use thiserror::Error;

/// Lifecycle and execution failures of a [`crate::remote::RemoteCommand`].
#[derive(Error, Debug)]
pub enum RemoteCommandError {
    #[error("remote command on {host} was already started")]
    AlreadyStarted { host: String },

    #[error("remote command on {host} was not started")]
    NotStarted { host: String },

    #[error("remote command on {host} already finished")]
    AlreadyFinished { host: String },

    #[error("failed to spawn '{program}' for {host}: {source}")]
    Spawn {
        program: String,
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting on remote command for {host}: {source}")]
    Wait {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("remote command on {host} exited with {}", describe_code(.code))]
    ExitStatus { host: String, code: Option<i32> },

    #[error("failed to kill remote command for {host}: {source}")]
    Kill {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("remote command on {host} was killed")]
    Killed { host: String },

    #[error("remote command on {host} was cancelled")]
    Cancelled { host: String },

    #[error("remote command on {host} timed out after {timeout_ms}ms")]
    TimedOut { host: String, timeout_ms: u64 },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl RemoteCommandError {
    /// Exit code of the remote process, when it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitStatus { code, .. } => *code,
            _ => None,
        }
    }
}
