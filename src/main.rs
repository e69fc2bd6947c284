use clap::{Parser, Subcommand};
use spotlink::cli::commands;
use spotlink::cli::output::{print_error, OutputMode};
use spotlink::{FollowType, SearchType, SpotlinkError, TimeRange};

#[derive(Parser)]
#[command(name = "spotlink", version, about = "Spotify Web API from the command line")]
struct Cli {
    /// Path to a spotlink.json config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Access token for API commands
    #[arg(long, global = true, env = "SPOTLINK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize in the browser and print an access token
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Show the current user's profile
    Me,

    /// List the current user's top tracks
    Top {
        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// short_term, medium_term or long_term
        #[arg(long, default_value_t = TimeRange::MediumTerm)]
        time_range: TimeRange,
    },

    /// Search the catalog
    Search {
        query: String,

        /// track, artist, album or playlist
        #[arg(long = "type", default_value_t = SearchType::Track)]
        search_type: SearchType,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Look up one or more tracks by id
    Track {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List the current user's saved tracks
    Saved {
        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Check whether tracks are in the user's library
    #[command(name = "saved-contains")]
    SavedContains {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Look up an artist by id
    Artist { id: String },

    /// List followed artists
    Following {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Check whether the user follows artists or users
    #[command(name = "following-contains")]
    FollowingContains {
        #[arg(required = true)]
        ids: Vec<String>,

        /// artist or user
        #[arg(long = "type", default_value_t = FollowType::Artist)]
        follow_type: FollowType,
    },

    /// Skip to the next track
    Next {
        /// Target device id
        #[arg(long)]
        device: Option<String>,
    },

    /// Pause playback
    Pause {
        /// Target device id
        #[arg(long)]
        device: Option<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the effective config and its source file
    Show,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SPOTLINK_LOG_LEVEL")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli).await {
        print_error(&e, json);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), SpotlinkError> {
    let mode = OutputMode::from_flag(cli.json);
    let config_path = cli.config.as_deref();

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => spotlink::cli::config_cmd::run_config_show(config_path, mode).await,
        };
    }

    let config = spotlink::load_config(config_path)?;
    if let Commands::Login { no_browser } = cli.command {
        return commands::run_login(config, !no_browser, mode).await;
    }

    let session = commands::token_session(config, cli.token.as_deref()).await?;
    match cli.command {
        Commands::Me => commands::run_me(&session, mode).await,
        Commands::Top {
            limit,
            offset,
            time_range,
        } => commands::run_top(&session, limit, offset, time_range, mode).await,
        Commands::Search {
            query,
            search_type,
            limit,
        } => commands::run_search(&session, &query, search_type, limit, mode).await,
        Commands::Track { ids } => commands::run_track(&session, &ids, mode).await,
        Commands::Saved { limit, offset } => commands::run_saved(&session, limit, offset, mode).await,
        Commands::SavedContains { ids } => commands::run_saved_contains(&session, &ids, mode).await,
        Commands::Artist { id } => commands::run_artist(&session, &id, mode).await,
        Commands::Following { limit } => commands::run_following(&session, limit, mode).await,
        Commands::FollowingContains { ids, follow_type } => {
            commands::run_following_contains(&session, &ids, follow_type, mode).await
        }
        Commands::Next { device } => commands::run_next(&session, device.as_deref(), mode).await,
        Commands::Pause { device } => commands::run_pause(&session, device.as_deref(), mode).await,
        Commands::Login { .. } | Commands::Config { .. } => Ok(()),
    }
}
