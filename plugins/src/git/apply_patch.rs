use async_trait::async_trait;
use mci_core::api::{
    parse_params_into, shell_quote, Command, CommandError, CommandParams, ExecutionContext,
    ModulePatch,
};
use serde::Deserialize;

use super::{APPLY_PATCH_CMD_NAME, GIT_PLUGIN_NAME};

const HEREDOC_MARKER: &str = "MCI_PATCH_EOF";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Params {
    directory: String,
}

/// Applies the diffs of a patch build on top of a checked-out project.
/// Tasks that are not part of a patch build are left untouched.
#[derive(Debug, Default)]
pub struct GitApplyPatchCommand {
    directory: String,
}

/// Script resetting `directory` to the module's base revision and applying its diff.
pub fn apply_patch_script(
    directory: &str,
    module: &ModulePatch,
    scratch_file: &str,
) -> Result<String, CommandError> {
    if module.diff.lines().any(|l| l == HEREDOC_MARKER) {
        return Err(CommandError::Failed {
            command: APPLY_PATCH_CMD_NAME.to_string(),
            reason: format!("diff for module '{}' contains a reserved line", module.name),
        });
    }

    let target = if module.name.is_empty() {
        directory.to_string()
    } else {
        format!("{}/{}", directory.trim_end_matches('/'), module.name)
    };
    let file = shell_quote(scratch_file);
    let mut diff = module.diff.clone();
    if !diff.ends_with('\n') {
        diff.push('\n');
    }

    Ok(format!(
        "set -o errexit\n\
         cd {target}\n\
         git reset --hard {githash}\n\
         cat > {file} <<'{HEREDOC_MARKER}'\n\
         {diff}{HEREDOC_MARKER}\n\
         git apply --check {file}\n\
         git apply --stat {file}\n\
         git apply {file}\n\
         rm -f {file}",
        target = shell_quote(&target),
        githash = shell_quote(&module.githash),
    ))
}

#[async_trait]
impl Command for GitApplyPatchCommand {
    fn name(&self) -> &str {
        APPLY_PATCH_CMD_NAME
    }

    fn plugin(&self) -> &str {
        GIT_PLUGIN_NAME
    }

    fn parse_params(&mut self, params: &CommandParams) -> Result<(), CommandError> {
        let parsed: Params = parse_params_into(APPLY_PATCH_CMD_NAME, params)?;
        self.directory = parsed.directory;
        Ok(())
    }

    async fn execute(&self, ctx: &ExecutionContext) -> Result<(), CommandError> {
        let Some(patch) = ctx.patch.as_ref() else {
            tracing::info!(task_id = %ctx.task.id, "not a patch build; nothing to apply");
            return Ok(());
        };

        let directory = ctx.resolve_path(&self.directory);
        for module in patch.patches.iter().filter(|m| !m.is_empty()) {
            let label = if module.name.is_empty() {
                "project"
            } else {
                module.name.as_str()
            };
            tracing::info!(
                task_id = %ctx.task.id,
                patch_id = %patch.id,
                module = label,
                "applying patch"
            );

            let scratch = format!("/tmp/mci_patch_{}_{}.diff", ctx.task.id, label);
            let script = apply_patch_script(&directory, module, &scratch)?;
            ctx.remote(script)
                .run()
                .await
                .map_err(|e| CommandError::remote(APPLY_PATCH_CMD_NAME, e))?;
        }

        Ok(())
    }
}
