use async_trait::async_trait;
use mci_core::api::{
    parse_params_into, shell_quote, Command, CommandError, CommandParams, ExecutionContext,
    RepositorySource,
};
use serde::Deserialize;

use super::{GET_PROJECT_CMD_NAME, GIT_PLUGIN_NAME};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Params {
    directory: String,
}

/// Clones the task's project and checks out the task revision.
#[derive(Debug, Default)]
pub struct GitGetProjectCommand {
    directory: String,
    clone_depth: Option<u32>,
}

impl GitGetProjectCommand {
    pub fn new(clone_depth: Option<u32>) -> Self {
        Self {
            directory: String::new(),
            clone_depth,
        }
    }
}

/// Shell script run on the host: fresh clone into `directory`, then reset to `revision`.
pub fn get_project_script(
    repo: &RepositorySource,
    directory: &str,
    revision: &str,
    clone_depth: Option<u32>,
) -> String {
    let dir = shell_quote(directory);
    let mut clone = String::from("git clone");
    if let Some(depth) = clone_depth {
        clone.push_str(&format!(" --depth {depth}"));
    }
    if let Some(branch) = repo.branch.as_deref().filter(|b| !b.is_empty()) {
        clone.push_str(&format!(" --branch {}", shell_quote(branch)));
    }
    clone.push_str(&format!(" {} {}", shell_quote(&repo.url), dir));

    let mut lines = vec![
        "set -o errexit".to_string(),
        format!("rm -rf {dir}"),
        clone,
        format!("cd {dir}"),
    ];
    if !revision.is_empty() {
        lines.push(format!("git reset --hard {}", shell_quote(revision)));
    }
    lines.join("\n")
}

#[async_trait]
impl Command for GitGetProjectCommand {
    fn name(&self) -> &str {
        GET_PROJECT_CMD_NAME
    }

    fn plugin(&self) -> &str {
        GIT_PLUGIN_NAME
    }

    fn parse_params(&mut self, params: &CommandParams) -> Result<(), CommandError> {
        let parsed: Params = parse_params_into(GET_PROJECT_CMD_NAME, params)?;
        if parsed.directory.trim().is_empty() {
            return Err(CommandError::invalid_params(
                GET_PROJECT_CMD_NAME,
                "directory must not be empty",
            ));
        }
        self.directory = parsed.directory;
        Ok(())
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<(), CommandError> {
        let repo = ctx.repository.as_ref().ok_or_else(|| CommandError::Failed {
            command: GET_PROJECT_CMD_NAME.to_string(),
            reason: format!("no repository configured for project '{}'", ctx.task.project),
        })?;

        let directory = ctx.resolve_path(&self.directory);
        tracing::info!(
            task_id = %ctx.task.id,
            repo = %repo.url,
            revision = %ctx.task.revision,
            directory = %directory,
            "fetching project source"
        );

        let script = get_project_script(repo, &directory, &ctx.task.revision, self.clone_depth);
        ctx.remote(script)
            .run()
            .await
            .map_err(|e| CommandError::remote(GET_PROJECT_CMD_NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn script_clones_and_resets() {
        let repo = RepositorySource {
            url: "git@github.com:acme/widget.git".into(),
            branch: Some("main".into()),
        };
        let script = get_project_script(&repo, "src", "abc123", Some(50));
        assert_eq!(
            script,
            "set -o errexit\n\
             rm -rf src\n\
             git clone --depth 50 --branch main git@github.com:acme/widget.git src\n\
             cd src\n\
             git reset --hard abc123"
        );
    }

    #[test]
    fn empty_revision_skips_reset() {
        let repo = RepositorySource {
            url: "https://example.com/r.git".into(),
            branch: None,
        };
        let script = get_project_script(&repo, "my dir", "", None);
        assert!(script.contains("git clone https://example.com/r.git 'my dir'"));
        assert!(!script.contains("reset"));
    }

    #[test]
    fn directory_param_is_required() {
        let mut cmd = GitGetProjectCommand::default();
        assert!(cmd.parse_params(&CommandParams::new()).is_err());

        let blank: CommandParams = serde_json::from_str(r#"{"directory":"  "}"#).unwrap();
        assert!(cmd.parse_params(&blank).is_err());

        let ok: CommandParams = serde_json::from_str(r#"{"directory":"src"}"#).unwrap();
        cmd.parse_params(&ok).unwrap();
        assert_eq!(cmd.directory, "src");
    }
}
