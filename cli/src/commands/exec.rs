use std::path::Path;

use mci_core::api::{
    AppContext, CliError, Command, CommandSpec, ExecutionContext, HostTarget, Patch,
    RepositorySource, Task,
};

use super::cli::ExecArgs;

pub async fn handle_exec(args: ExecArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let task = load_task(ctx, &args.task).await?;
    let specs = load_command_specs(&args.commands)?;

    // Every command is resolved before the first one runs.
    let plugins = ctx.plugins();
    let commands = specs
        .iter()
        .map(|spec| plugins.resolve(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let exec_ctx = build_context(&args, task, ctx)?;
    run_commands(&commands, &exec_ctx).await?;
    Ok(0)
}

async fn load_task(ctx: &AppContext, task_id: &str) -> Result<Task, CliError> {
    let mut found = ctx
        .store()
        .find_tasks_by_ids(&[task_id.to_string()])
        .await?;
    found
        .pop()
        .ok_or_else(|| CliError::Config(format!("task '{task_id}' not found")))
}

fn load_command_specs(path: &Path) -> Result<Vec<CommandSpec>, CliError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Config(format!("invalid command list {}: {e}", path.display())))
}

fn build_context(
    args: &ExecArgs,
    task: Task,
    ctx: &AppContext,
) -> Result<ExecutionContext, CliError> {
    let mut host = HostTarget::new(args.host.clone()).with_options(args.ssh_opts.clone());
    if let Some(user) = &args.user {
        host = host.with_user(user.clone());
    }

    let is_patch = task.is_patch();
    let mut exec_ctx = ExecutionContext::new(task, host)
        .with_remote_config(ctx.cfg().remote.clone())
        .with_work_dir(args.work_dir.clone());

    if let Some(url) = &args.repo_url {
        exec_ctx = exec_ctx.with_repository(RepositorySource {
            url: url.clone(),
            branch: args.repo_branch.clone(),
        });
    }

    match &args.patch {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let patch: Patch = serde_json::from_str(&raw).map_err(|e| {
                CliError::Config(format!("invalid patch document {}: {e}", path.display()))
            })?;
            exec_ctx = exec_ctx.with_patch(patch);
        }
        None if is_patch => {
            tracing::warn!(task_id = %exec_ctx.task.id, "patch task executed without a patch document");
        }
        None => {}
    }

    Ok(exec_ctx)
}

async fn run_commands(
    commands: &[Box<dyn Command>],
    exec_ctx: &ExecutionContext,
) -> Result<(), CliError> {
    for (idx, command) in commands.iter().enumerate() {
        tracing::info!(
            task_id = %exec_ctx.task.id,
            step = idx + 1,
            total = commands.len(),
            plugin = command.plugin(),
            command = command.name(),
            "running command"
        );
        command.execute(exec_ctx).await.map_err(|e| {
            tracing::error!(
                task_id = %exec_ctx.task.id,
                command = command.name(),
                error = %e,
                "command failed"
            );
            CliError::Command(e)
        })?;
    }

    tracing::info!(task_id = %exec_ctx.task.id, "all commands finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mci_core::api::{AppConfig, InMemoryTaskStore, PluginError};
    use mci_plugins::factory::BuiltinPluginsFactory;

    fn app_context(tasks: Vec<Task>, cfg: AppConfig) -> AppContext {
        AppContext::new(
            cfg,
            Arc::new(InMemoryTaskStore::new(tasks)),
            &BuiltinPluginsFactory::default(),
        )
        .unwrap()
    }

    fn args(dir: &Path, commands: &str) -> ExecArgs {
        let path = dir.join("commands.json");
        std::fs::write(&path, commands).unwrap();
        ExecArgs {
            tasks: dir.join("tasks.json"),
            task: "compile".into(),
            host: "worker".into(),
            user: None,
            ssh_opts: Vec::new(),
            commands: path,
            repo_url: None,
            repo_branch: None,
            work_dir: dir.to_string_lossy().to_string(),
            patch: None,
        }
    }

    #[tokio::test]
    async fn unknown_command_fails_before_anything_runs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = app_context(vec![Task::new("compile")], AppConfig::default());
        let commands = serde_json::json!([
            {"plugin": "shell", "command": "exec", "params": {"script": "touch ran", "working_dir": "."}},
            {"plugin": "shell", "command": "nonexistent"}
        ]);
        let args = args(dir.path(), &commands.to_string());

        let err = handle_exec(args, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Plugin(PluginError::UnknownCommand { ref command, .. }) if command == "nonexistent"
        ));
        assert!(!dir.path().join("ran").exists());
    }

    #[tokio::test]
    async fn missing_task_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = app_context(Vec::new(), AppConfig::default());
        let err = handle_exec(args(dir.path(), "[]"), &ctx).await.unwrap_err();
        assert!(err.to_string().contains("compile"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn commands_run_in_order_on_the_host() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = AppConfig::default();
        cfg.remote.program = "bash".into();
        cfg.remote.default_options = vec!["-c".into(), "eval \"$1\"".into()];
        let ctx = app_context(vec![Task::new("compile")], cfg);

        let commands = serde_json::json!([
            {"plugin": "shell", "command": "exec", "params": {"script": "echo one >> log", "working_dir": "."}},
            {"plugin": "shell", "command": "exec", "params": {"script": "echo two >> log", "working_dir": "."}}
        ]);
        let args = args(dir.path(), &commands.to_string());

        assert_eq!(handle_exec(args, &ctx).await.unwrap(), 0);
        let log = std::fs::read_to_string(dir.path().join("log")).unwrap();
        assert_eq!(log, "one\ntwo\n");
    }
}
