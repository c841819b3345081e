use anyhow::Result;
use clap::Parser;
use reelgen::cli::{
    handle_cache_command, handle_config_command, handle_make_command, handle_search_command, Cli,
    CliCommand, MakeCliArgs,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(CliCommand::Version) => {
            println!("reelgen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(CliCommand::Make(args)) => handle_make_command(args).await,
        Some(CliCommand::Search(args)) => handle_search_command(args).await,
        Some(CliCommand::Cache(args)) => handle_cache_command(args),
        Some(CliCommand::Config(args)) => handle_config_command(args),
        None => handle_make_command(MakeCliArgs::default()).await,
    }
}
