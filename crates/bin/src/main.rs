use clap::Parser;
use tracing_subscriber::EnvFilter;

mod api;
mod backend;
mod cli;
mod commands;
mod output;
mod server;
mod session;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so command output stays clean
    let default_level = match cli.command {
        Commands::Serve(_) => "lexlist=info",
        _ => "lexlist=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match &cli.command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Health(args) => commands::health::run(args).await,
        Commands::Register(args) => commands::client::register(args, format).await,
        Commands::Login(args) => commands::client::login(args, format).await,
        Commands::Lists(command) => commands::client::lists(command, format).await,
        Commands::Entries(command) => commands::client::entries(command, format).await,
    }
}
