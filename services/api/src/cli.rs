use crate::report::{run_dashboard_report, DashboardArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taiger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TaiGer dashboard service",
    about = "Serve or inspect TaiGer student dashboards: application locks and open tasks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the task list and lock table for a student snapshot
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file with the student snapshots to serve (one object or an array)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dashboard(args) => run_dashboard_report(args),
    }
}
