use anyhow::{Context, Result};
use attache_cli::commands::{add, download, list, remove, Session};
use attache_cli::config::{Cli, Command};
use attache_service::BlockingAttachmentClient;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.connection.client_config()?;
    debug!("{config:?}");
    let server = config.server.clone();
    let client =
        BlockingAttachmentClient::new(config).context("failed to set up the tracker client")?;

    let session = Session {
        client: &client,
        server: &server,
        project: cli.project.as_deref(),
    };

    match &cli.command {
        Command::List(args) => list::run(&session, args),
        Command::Download(args) => download::run(&session, args),
        Command::Add(args) => add::run(&session, args),
        Command::Remove(args) => remove::run(&session, args),
    }
}
