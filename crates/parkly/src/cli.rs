//! Clap derive structures for the `parkly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// parkly -- admin console for the parking-management backend
#[derive(Debug, Parser)]
#[command(
    name = "parkly",
    version,
    about = "Administer parking spots, users, payments and reservations",
    long_about = "Admin console for the parking-management backend.\n\n\
        Log in once with `parkly login`; the session is kept per profile\n\
        until you log out or the backend rejects the token.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "PARKLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "PARKLY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Accept-Language sent to the backend (overrides profile)
    #[arg(long, env = "PARKLY_LOCALE", global = true)]
    pub locale: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "PARKLY_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PARKLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds [default: from config, else 30]
    #[arg(long, env = "PARKLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Table names accepted by `columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    Users,
    Spots,
    Payments,
    Reservations,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session for the active profile
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// Totals and category breakdowns across all collections
    #[command(alias = "dash")]
    Dashboard,

    /// Manage user accounts
    #[command(alias = "u")]
    Users(ResourceArgs),

    /// Manage parking spots, their images and availability
    #[command(alias = "s")]
    Spots(SpotsArgs),

    /// Manage payments
    #[command(alias = "pay")]
    Payments(ResourceArgs),

    /// Manage reservations
    #[command(alias = "res")]
    Reservations(ResourceArgs),

    /// Show or change which table columns are displayed
    Columns(ColumnsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (prompted when omitted)
    #[arg(long, short = 'u', env = "PARKLY_USERNAME")]
    pub username: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "PARKLY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── Shared Resource Arguments ────────────────────────────────────────

/// Search and pagination shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive text search over the table's searchable fields
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Rows per page [default: from config, else per table]
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Show every matching row instead of one page
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Record fields for create / update.
#[derive(Debug, Args)]
pub struct DraftArgs {
    /// JSON file with the record fields
    #[arg(long, short = 'F', value_name = "PATH")]
    pub from_file: Option<PathBuf>,

    /// Set one field, repeatable. FIELD=VALUE sets a string,
    /// FIELD:=JSON a raw JSON value (e.g. --set amount:=15000)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,
}

/// Operations every managed table supports.
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record
    Get {
        /// Record ID
        id: String,
    },

    /// Create a record
    Create(DraftArgs),

    /// Replace a record's fields
    Update {
        /// Record ID
        id: String,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Users, payments and reservations share one command set.
#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Args)]
pub struct SpotsArgs {
    #[command(subcommand)]
    pub command: SpotsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SpotsCommand {
    #[command(flatten)]
    Common(ResourceCommand),

    /// Show a spot with its images, reviews, cost and rating
    Detail {
        /// Spot ID
        id: String,
    },

    /// Upload an image for a spot
    UploadImage {
        /// Spot ID
        id: String,

        /// Image file to upload
        file: PathBuf,
    },

    /// Delete one of a spot's images by its stored file name
    DeleteImage {
        /// Spot ID
        id: String,

        /// Stored image file name (see `spots detail`)
        file_name: String,
    },

    /// Set the currently free B and C places
    Availability {
        /// Spot ID
        id: String,

        /// Free B-class places
        #[arg(long = "b-spots", short = 'b')]
        b_spots: u32,

        /// Free C-class places
        #[arg(long = "c-spots", short = 'c')]
        c_spots: u32,
    },

    /// Find spots within a radius of a point or an address
    Nearby {
        /// Search radius in kilometres
        #[arg(long, short = 'r', default_value = "1")]
        radius: f64,

        /// Longitude of the centre
        #[arg(long, requires = "latitude", allow_negative_numbers = true)]
        longitude: Option<f64>,

        /// Latitude of the centre
        #[arg(long, requires = "longitude", allow_negative_numbers = true)]
        latitude: Option<f64>,

        /// Geocode this address for the centre instead
        #[arg(long, conflicts_with_all = ["longitude", "latitude"])]
        address: Option<String>,
    },

    /// Look up coordinates for an address
    Geocode {
        /// Free-text address
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COLUMNS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Table to configure
    pub table: TableKind,

    /// Flip one column, repeatable
    #[arg(long, short = 't', value_name = "KEY")]
    pub toggle: Vec<String>,

    /// Show every column
    #[arg(long, conflicts_with = "none")]
    pub all: bool,

    /// Hide every column
    #[arg(long)]
    pub none: bool,

    /// Restore the default selection
    #[arg(long, conflicts_with_all = ["all", "none", "toggle"])]
    pub reset: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, locale, timeout, insecure, ca_cert, geocoder_url, token_store)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    #[command(alias = "use")]
    SetDefault {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
