use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mci", version, about = "Task orchestration for continuous integration")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the undispatched tasks whose dependencies have all succeeded.
    Runnable(RunnableArgs),
    /// Run a command list for one task on its host.
    Exec(ExecArgs),
    /// Serve plugin APIs over HTTP.
    Serve(ServeArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunnableArgs {
    /// JSON file holding the task documents.
    #[arg(long)]
    pub tasks: PathBuf,

    /// Emit the runnable tasks as a JSON array instead of one id per line.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExecArgs {
    #[arg(long)]
    pub tasks: PathBuf,

    /// Id of the task to execute.
    #[arg(long)]
    pub task: String,

    #[arg(long)]
    pub host: String,

    #[arg(long)]
    pub user: Option<String>,

    /// Extra remote-shell option, e.g. `--ssh-opt=-p --ssh-opt=2200`.
    /// Can be specified multiple times.
    #[arg(long = "ssh-opt", action = clap::ArgAction::Append, allow_hyphen_values = true)]
    pub ssh_opts: Vec<String>,

    /// JSON array of `{plugin, command, params}` entries.
    #[arg(long)]
    pub commands: PathBuf,

    #[arg(long)]
    pub repo_url: Option<String>,

    #[arg(long)]
    pub repo_branch: Option<String>,

    /// Base directory on the host for relative command paths.
    #[arg(long, default_value = ".")]
    pub work_dir: String,

    /// JSON patch document applied by patch-aware commands.
    #[arg(long)]
    pub patch: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ServeArgs {
    /// Overrides `http_server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Overrides `http_server.port`.
    #[arg(long)]
    pub port: Option<u16>,

    /// Task documents exposed through the runnable endpoint.
    #[arg(long)]
    pub tasks: Option<PathBuf>,

    /// JSON array of patch documents served by the git plugin.
    #[arg(long)]
    pub patches: Option<PathBuf>,

    #[arg(long)]
    pub session_id: Option<String>,
}
