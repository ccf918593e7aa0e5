//! CLI argument definitions for the lexlist binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lexlist::{EntryId, ListId, constants::DEFAULT_MAX_RANK_LENGTH};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default)
    Sqlite,
    /// PostgreSQL database
    Postgres,
    /// In-memory with JSON persistence (for development and ephemeral deployments)
    Inmemory,
}

/// Ordered lists server and client
#[derive(Parser, Debug)]
#[command(name = "lexlist")]
#[command(about = "lexlist: ordered lists that never renumber")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the lexlist server
    Serve(ServeArgs),
    /// Check health of a running lexlist server
    Health(HealthArgs),
    /// Create an account on a running server
    Register(CredentialsArgs),
    /// Log in and print an access token
    Login(CredentialsArgs),
    /// Manage lists
    #[command(subcommand)]
    Lists(ListsCommand),
    /// Manage entries
    #[command(subcommand)]
    Entries(EntriesCommand),
}

/// Backend configuration shared by commands that open storage directly
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "LEXLIST_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores lexlist.db
    /// For InMemory: stores lexlist.json
    #[arg(short = 'D', long, env = "LEXLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "LEXLIST_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "LEXLIST_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "LEXLIST_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    /// Rank length that triggers an automatic rebalance of a list
    #[arg(long, default_value_t = DEFAULT_MAX_RANK_LENGTH, env = "LEXLIST_MAX_RANK_LENGTH")]
    pub max_rank_length: usize,

    /// Lifetime of an access token
    #[arg(long, default_value_t = 300, env = "LEXLIST_SESSION_TTL_MINUTES")]
    pub session_ttl_minutes: u64,

    /// Create this admin account on startup if it does not exist
    #[arg(long, env = "LEXLIST_ADMIN_USERNAME", requires = "admin_password")]
    pub admin_username: Option<String>,

    /// Password for the bootstrap admin account
    #[arg(long, env = "LEXLIST_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Server URL (the /health path is appended if missing)
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "LEXLIST_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Connection settings for client commands
#[derive(clap::Args, Debug, Clone)]
pub struct ClientArgs {
    /// Server URL
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "LEXLIST_URL")]
    pub url: String,

    /// Access token from `lexlist login`
    #[arg(long, env = "LEXLIST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Arguments for register and login
#[derive(clap::Args, Debug)]
pub struct CredentialsArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "LEXLIST_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Subcommand, Debug)]
pub enum ListsCommand {
    /// Show visible lists
    List {
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Create a list
    Create {
        name: String,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Show a list and its entries in order
    Get {
        id: ListId,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Rename a list
    Update {
        id: ListId,
        name: String,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Delete a list and all of its entries
    Delete {
        id: ListId,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Move an entry to a position (clamped to the list bounds)
    Reorder {
        id: ListId,
        #[arg(long)]
        entry: EntryId,
        #[arg(long, allow_negative_numbers = true)]
        index: i64,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Reassign short ranks to every entry of a list
    Rebalance {
        id: ListId,
        #[command(flatten)]
        client: ClientArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntriesCommand {
    /// Show visible entries
    List {
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Add an entry to a list
    Create {
        #[arg(long)]
        list: ListId,
        message: String,
        /// Insert at this position instead of appending
        #[arg(long, allow_negative_numbers = true)]
        index: Option<i64>,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Show one entry
    Get {
        id: EntryId,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Replace an entry's message
    Update {
        id: EntryId,
        message: String,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Delete an entry
    Delete {
        id: EntryId,
        #[command(flatten)]
        client: ClientArgs,
    },
    /// Flip an entry between active and done
    Toggle {
        id: EntryId,
        #[command(flatten)]
        client: ClientArgs,
    },
}
