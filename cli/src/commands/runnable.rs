use std::sync::Arc;

use mci_core::api::{AppConfig, CliError, InMemoryTaskStore, StoreTaskFinder, Task, TaskFinder};

use super::cli::RunnableArgs;

pub async fn handle_runnable(args: RunnableArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let tasks = find_runnable(&args, cfg).await?;
    tracing::info!(count = tasks.len(), "runnable tasks found");

    if args.json {
        let out = serde_json::to_string_pretty(&tasks)?;
        println!("{out}");
    } else {
        for task in &tasks {
            println!("{}", task.id);
        }
    }
    Ok(0)
}

async fn find_runnable(args: &RunnableArgs, cfg: &AppConfig) -> Result<Vec<Task>, CliError> {
    let store = InMemoryTaskStore::from_json_file(&args.tasks)?;
    let finder = StoreTaskFinder::from_config(Arc::new(store), &cfg.scheduler);
    Ok(finder.find_runnable_tasks().await?)
}
