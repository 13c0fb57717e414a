mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::TallyConfig;
use tracing_subscriber::EnvFilter;

use commands::serve::ServeOverrides;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Tally expense tracker")]
struct Cli {
    /// Path to the YAML configuration file (default: tally.yaml if present)
    #[arg(long, short, global = true, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API.
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,

        /// Keep the document in memory instead of the configured store
        #[arg(long, default_value_t = false)]
        ephemeral: bool,
    },

    /// Load the document and report consistency problems.
    Check,

    /// Replace every plaintext password in the document with an Argon2 hash.
    HashPasswords,
}

fn init_tracing(config: &TallyConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TallyConfig::load(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.cmd {
        Command::Serve {
            host,
            port,
            ephemeral,
        } => {
            let overrides = ServeOverrides {
                host,
                port,
                ephemeral,
            };
            commands::serve::run(commands::serve::apply_overrides(config, &overrides)).await?
        }

        Command::Check => {
            if !commands::check::run(&config).await? {
                std::process::exit(1);
            }
        }

        Command::HashPasswords => commands::passwords::run(&config).await?,
    }

    Ok(())
}
