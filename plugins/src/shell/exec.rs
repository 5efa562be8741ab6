use async_trait::async_trait;
use mci_core::api::{
    parse_params_into, shell_quote, Command, CommandError, CommandParams, ExecutionContext,
};
use serde::Deserialize;

use super::{EXEC_CMD_NAME, SHELL_PLUGIN_NAME};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Params {
    script: String,
    #[serde(default)]
    background: bool,
    #[serde(default)]
    working_dir: Option<String>,
    #[serde(default)]
    continue_on_err: bool,
}

/// Runs a script on the host, optionally detached from the connection.
#[derive(Debug, Default)]
pub struct ShellExecCommand {
    shell: String,
    params: Params,
}

impl ShellExecCommand {
    pub fn new(shell: String) -> Self {
        Self {
            shell,
            params: Params::default(),
        }
    }

    /// Command text handed to the remote command. Detached scripts are wrapped
    /// in the configured shell so the whole script runs under `nohup`.
    pub fn command_text(&self, ctx: &ExecutionContext) -> String {
        let script = match self.params.working_dir.as_deref() {
            Some(dir) => format!("cd {} && {}", shell_quote(&ctx.resolve_path(dir)), self.params.script),
            None => self.params.script.clone(),
        };

        if self.params.background {
            format!("{} -c {}", self.shell, shell_quote(&script))
        } else {
            script
        }
    }
}

#[async_trait]
impl Command for ShellExecCommand {
    fn name(&self) -> &str {
        EXEC_CMD_NAME
    }

    fn plugin(&self) -> &str {
        SHELL_PLUGIN_NAME
    }

    fn parse_params(&mut self, params: &CommandParams) -> Result<(), CommandError> {
        let parsed: Params = parse_params_into(EXEC_CMD_NAME, params)?;
        if parsed.script.trim().is_empty() {
            return Err(CommandError::invalid_params(EXEC_CMD_NAME, "script must not be empty"));
        }
        self.params = parsed;
        Ok(())
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<(), CommandError> {
        let mut remote = ctx
            .remote(self.command_text(ctx))
            .background(self.params.background);

        match remote.run().await {
            Ok(()) => Ok(()),
            Err(e) if self.params.continue_on_err => {
                tracing::warn!(task_id = %ctx.task.id, error = %e, "script failed; continuing");
                Ok(())
            }
            Err(e) => Err(CommandError::remote(EXEC_CMD_NAME, e)),
        }
    }
}
