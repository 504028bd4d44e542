use crate::demo::{run_demo, run_import, DemoArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use flatshare::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Flatmate Finder",
    about = "Run and demonstrate the flatmate listing marketplace from the command line",
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
    /// Work with listing exports
    Listings {
        #[command(subcommand)]
        command: ListingsCommand,
    },
    /// Run an end-to-end CLI demo: publish, search, save, and contact listers
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ListingsCommand {
    /// Validate a listing CSV export and summarise what would be published
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Listings {
            command: ListingsCommand::Import(args),
        } => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
