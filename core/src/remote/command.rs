use std::future::Future;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::{RemoteConfig, DEFAULT_BACKGROUND_LOG};
use crate::error::RemoteCommandError;
use crate::model::HostTarget;

use super::pump::{spawn_pump, OutputSink};

const REDACTED: &str = "<redacted>";

/// Observable lifecycle position of a [`RemoteCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemotePhase {
    Constructed,
    Running,
    Exited,
    Killed,
}

enum State {
    Constructed,
    Running {
        child: Child,
        pumps: Pumps,
    },
    Exited {
        status: ExitStatus,
    },
    Killed,
}

type Pumps = Vec<JoinHandle<std::io::Result<u64>>>;

/// One shell command executed on a remote host through the remote-shell client.
///
/// The value is single-use: `start` may succeed once, after which the command
/// can be waited on or stopped. Stopping only kills the local client process;
/// a command started with `background(true)` is detached on the remote side
/// and keeps running.
pub struct RemoteCommand {
    command: String,
    host: String,
    user: Option<String>,
    options: Vec<String>,
    background: bool,
    program: String,
    background_log: String,
    redact_log: bool,
    stdout: Option<OutputSink>,
    stderr: Option<OutputSink>,
    state: State,
}

impl RemoteCommand {
    pub fn new(host: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            host: host.into(),
            user: None,
            options: Vec::new(),
            background: false,
            program: "ssh".to_string(),
            background_log: DEFAULT_BACKGROUND_LOG.to_string(),
            redact_log: false,
            stdout: None,
            stderr: None,
            state: State::Constructed,
        }
    }

    /// Command aimed at `target`, using its login principal and options.
    pub fn for_host(target: &HostTarget, command: impl Into<String>) -> Self {
        let mut cmd = Self::new(target.host.clone(), command).options(target.options.clone());
        cmd.user = target.user.clone();
        cmd
    }

    /// Apply process-wide defaults. Default options go ahead of the ones already set.
    pub fn with_config(mut self, cfg: &RemoteConfig) -> Self {
        let mut options = cfg.default_options.clone();
        options.append(&mut self.options);
        self.options = options;
        self.program = cfg.program.clone();
        self.background_log = cfg.background_log.clone();
        self.redact_log = cfg.redact_command_log;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn background_log(mut self, path: impl Into<String>) -> Self {
        self.background_log = path.into();
        self
    }

    pub fn redact_log(mut self, redact: bool) -> Self {
        self.redact_log = redact;
        self
    }

    pub fn stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = Some(sink);
        self
    }

    pub fn stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = Some(sink);
        self
    }

    pub fn phase(&self) -> RemotePhase {
        match self.state {
            State::Constructed => RemotePhase::Constructed,
            State::Running { .. } => RemotePhase::Running,
            State::Exited { .. } => RemotePhase::Exited,
            State::Killed => RemotePhase::Killed,
        }
    }

    /// OS pid of the local client process while it runs.
    pub fn pid(&self) -> Option<u32> {
        match &self.state {
            State::Running { child, .. } => child.id(),
            _ => None,
        }
    }

    /// `user@host`, or the bare host.
    pub fn destination(&self) -> String {
        match self.user.as_deref().filter(|u| !u.is_empty()) {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// Command text sent to the remote shell.
    pub fn remote_command_text(&self) -> String {
        if self.background {
            format!("nohup {} >& {} &", self.command, self.background_log)
        } else {
            self.command.clone()
        }
    }

    /// Arguments passed to the client program: options, destination, command.
    pub fn invocation(&self) -> Vec<String> {
        let mut args = self.options.clone();
        args.push(self.destination());
        args.push(self.remote_command_text());
        args
    }

    /// Full invocation as written to the log.
    pub fn display_invocation(&self) -> String {
        let mut parts = Vec::with_capacity(self.options.len() + 3);
        parts.push(self.program.clone());
        parts.extend(self.options.iter().cloned());
        parts.push(self.destination());
        if self.redact_log {
            parts.push(REDACTED.to_string());
        } else {
            parts.push(self.remote_command_text());
        }
        parts.join(" ")
    }

    /// Spawn the client process and return without waiting for it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<(), RemoteCommandError> {
        if !matches!(self.state, State::Constructed) {
            return Err(RemoteCommandError::AlreadyStarted {
                host: self.host.clone(),
            });
        }

        tracing::warn!(
            host = %self.host,
            background = self.background,
            "remote command executing: '{}'",
            self.display_invocation()
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(self.invocation())
            .stdin(Stdio::null())
            .stdout(piped_if(self.stdout.is_some()))
            .stderr(piped_if(self.stderr.is_some()));

        let mut child = cmd.spawn().map_err(|source| RemoteCommandError::Spawn {
            program: self.program.clone(),
            host: self.host.clone(),
            source,
        })?;

        let mut pumps = Vec::with_capacity(2);
        if let (Some(rd), Some(sink)) = (child.stdout.take(), self.stdout.take()) {
            pumps.push(spawn_pump(rd, sink, "stdout"));
        }
        if let (Some(rd), Some(sink)) = (child.stderr.take(), self.stderr.take()) {
            pumps.push(spawn_pump(rd, sink, "stderr"));
        }

        self.state = State::Running { child, pumps };
        Ok(())
    }

    /// Block until the client process exits and its output is copied.
    /// A non-zero exit is an error.
    pub async fn wait(&mut self) -> Result<(), RemoteCommandError> {
        let (status, pumps) = self.reap().await?;
        Self::drain(&self.host, pumps).await;
        self.exit_result(status)
    }

    /// Wait for the client process itself and record its status. Output
    /// pumps are handed back still running.
    ///
    /// Cancel safe: dropped before the child exits, the command stays `Running`.
    async fn reap(&mut self) -> Result<(ExitStatus, Pumps), RemoteCommandError> {
        let (child, pumps) = match &mut self.state {
            State::Running { child, pumps } => (child, pumps),
            State::Constructed => {
                return Err(RemoteCommandError::NotStarted {
                    host: self.host.clone(),
                })
            }
            State::Exited { .. } => {
                return Err(RemoteCommandError::AlreadyFinished {
                    host: self.host.clone(),
                })
            }
            State::Killed => {
                return Err(RemoteCommandError::Killed {
                    host: self.host.clone(),
                })
            }
        };

        let status = child.wait().await.map_err(|source| RemoteCommandError::Wait {
            host: self.host.clone(),
            source,
        })?;
        let pumps = std::mem::take(pumps);
        self.state = State::Exited { status };
        Ok((status, pumps))
    }

    async fn drain(host: &str, pumps: Pumps) {
        for pump in pumps {
            match pump.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(host = %host, error = %e, "remote output copy failed")
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::warn!(host = %host, error = %e, "remote output task aborted")
                }
            }
        }
    }

    fn exit_result(&self, status: ExitStatus) -> Result<(), RemoteCommandError> {
        if status.success() {
            Ok(())
        } else {
            Err(RemoteCommandError::ExitStatus {
                host: self.host.clone(),
                code: status.code(),
            })
        }
    }

    /// `start` followed by `wait`.
    pub async fn run(&mut self) -> Result<(), RemoteCommandError> {
        self.start()?;
        self.wait().await
    }

    /// Kill the local client process and reap it.
    ///
    /// Does not reach a detached remote process started in background mode.
    pub async fn stop(&mut self) -> Result<(), RemoteCommandError> {
        let (child, pumps) = match &mut self.state {
            State::Running { child, pumps } => (child, pumps),
            State::Constructed => {
                return Err(RemoteCommandError::NotStarted {
                    host: self.host.clone(),
                })
            }
            State::Exited { .. } => {
                return Err(RemoteCommandError::AlreadyFinished {
                    host: self.host.clone(),
                })
            }
            State::Killed => return Ok(()),
        };

        child.kill().await.map_err(|source| RemoteCommandError::Kill {
            host: self.host.clone(),
            source,
        })?;
        for pump in pumps.drain(..) {
            pump.abort();
        }
        self.state = State::Killed;

        tracing::info!(host = %self.host, background = self.background, "remote command stopped");
        Ok(())
    }

    /// Wait for exit unless `cancel` resolves first, in which case the command
    /// is stopped and `Cancelled` is returned.
    ///
    /// Once the client process has exited its status is the result, even if
    /// `cancel` fires while output is still being copied; the copy is then
    /// abandoned.
    pub async fn wait_or_cancel<F>(&mut self, cancel: F) -> Result<(), RemoteCommandError>
    where
        F: Future<Output = ()>,
    {
        if !matches!(self.state, State::Running { .. }) {
            return self.wait().await;
        }

        tokio::pin!(cancel);
        let reaped = tokio::select! {
            res = self.reap() => Some(res),
            _ = &mut cancel => None,
        };

        let (status, pumps) = match reaped {
            Some(res) => res?,
            None => {
                self.stop().await?;
                return Err(RemoteCommandError::Cancelled {
                    host: self.host.clone(),
                });
            }
        };

        let aborts: Vec<_> = pumps.iter().map(|p| p.abort_handle()).collect();
        tokio::select! {
            _ = Self::drain(&self.host, pumps) => {}
            _ = &mut cancel => {
                for handle in aborts {
                    handle.abort();
                }
                tracing::warn!(host = %self.host, "remote output abandoned after exit");
            }
        }
        self.exit_result(status)
    }

    /// Wait at most `timeout`, stopping the command when it elapses.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> Result<(), RemoteCommandError> {
        match self.wait_or_cancel(tokio::time::sleep(timeout)).await {
            Err(RemoteCommandError::Cancelled { host }) => Err(RemoteCommandError::TimedOut {
                host,
                timeout_ms: timeout.as_millis() as u64,
            }),
            other => other,
        }
    }
}

impl std::fmt::Debug for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCommand")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("options", &self.options)
            .field("background", &self.background)
            .field("program", &self.program)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

fn piped_if(capture: bool) -> Stdio {
    if capture {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}
