use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::process;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tvmaze_client::{ClientConfig, Embed, TvMazeClient, TvMazeError, UpdatePeriod};

#[derive(Parser)]
#[command(name = "tvmaze")]
#[command(about = "Query the TVMaze API and print the JSON responses")]
struct Cli {
    /// Base URL of the API (overrides TVMAZE_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides TVMAZE_API_TIMEOUT_SECS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one page of the show index (zero-based)
    Shows { page: u32 },

    /// Show details for a single show
    Show {
        id: u32,

        /// Related resources to embed
        #[arg(long, value_enum)]
        embed: Vec<EmbedArg>,
    },

    /// List the seasons of a show
    Seasons { show_id: u32 },

    /// List the episodes of a show
    Episodes { show_id: u32 },

    /// Show details for a network
    Network { id: u32 },

    /// Show details for a webchannel
    Webchannel { id: u32 },

    /// List shows updated within a period
    Updates {
        #[arg(long, value_enum, default_value = "day")]
        since: PeriodArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PeriodArg {
    Day,
    Week,
    Month,
}

impl From<PeriodArg> for UpdatePeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Day => UpdatePeriod::Day,
            PeriodArg::Week => UpdatePeriod::Week,
            PeriodArg::Month => UpdatePeriod::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmbedArg {
    Seasons,
    Episodes,
    Cast,
    Crew,
    #[value(name = "nextepisode")]
    NextEpisode,
    #[value(name = "previousepisode")]
    PreviousEpisode,
    Images,
    Akas,
}

impl From<EmbedArg> for Embed {
    fn from(arg: EmbedArg) -> Self {
        match arg {
            EmbedArg::Seasons => Embed::Seasons,
            EmbedArg::Episodes => Embed::Episodes,
            EmbedArg::Cast => Embed::Cast,
            EmbedArg::Crew => Embed::Crew,
            EmbedArg::NextEpisode => Embed::NextEpisode,
            EmbedArg::PreviousEpisode => Embed::PreviousEpisode,
            EmbedArg::Images => Embed::Images,
            EmbedArg::Akas => Embed::Akas,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] TvMazeError),

    #[error("No {kind} found with ID {id}")]
    NotFound { kind: &'static str, id: u32 },

    #[error("Failed to render JSON: {0}")]
    Output(#[from] serde_json::Error),
}

/// Installs a stderr subscriber; RUST_LOG wins over the -v count
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_found<T: Serialize>(kind: &'static str, id: u32, value: Option<T>) -> Result<(), CliError> {
    match value {
        Some(value) => print_json(&value),
        None => Err(CliError::NotFound { kind, id }),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = TvMazeClient::with_config(&config)?;

    match cli.command {
        Command::Shows { page } => print_json(&client.shows_page(page)?),
        Command::Show { id, embed } => {
            let embeds: Vec<Embed> = embed.into_iter().map(Embed::from).collect();
            print_found("show", id, client.show_with_embeds(id, &embeds)?)
        }
        Command::Seasons { show_id } => print_json(&client.seasons(show_id)?),
        Command::Episodes { show_id } => print_json(&client.episodes(show_id)?),
        Command::Network { id } => print_found("network", id, client.network(id)?),
        Command::Webchannel { id } => print_found("webchannel", id, client.webchannel(id)?),
        Command::Updates { since } => {
            // Sorted for stable output
            let updates: BTreeMap<String, i64> =
                client.show_updates(since.into())?.into_iter().collect();
            print_json(&updates)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
