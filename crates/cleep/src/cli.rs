//! Clap derive structures for the `cleep` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cleep -- manage a Cleep device's parameters from the command line
#[derive(Debug, Parser)]
#[command(
    name = "cleep",
    version,
    about = "Manage Cleep device parameters from the command line",
    long_about = "Reads and changes the settings owned by a Cleep device's parameters\n\
        module: hostname, position, sun times, country, timezone and\n\
        secured access accounts. Every change is confirmed by re-reading\n\
        the device configuration.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "CLEEP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device URL (overrides profile)
    #[arg(long, short = 'u', env = "CLEEP_URL", global = true)]
    pub url: Option<String>,

    /// Username for secured access (overrides profile)
    #[arg(long, env = "CLEEP_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for secured access
    #[arg(long, env = "CLEEP_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Module name of the parameters panel
    #[arg(long, env = "CLEEP_MODULE", global = true)]
    pub module: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLEEP_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CLEEP_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CLEEP_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the device parameters
    #[command(alias = "s")]
    Show,

    /// Rename the device
    Hostname(HostnameArgs),

    /// Set the device position (sun times are recomputed)
    #[command(alias = "pos")]
    Position(PositionArgs),

    /// Show today's sunrise and sunset
    Sun,

    /// Manage secured access
    Auth(AuthArgs),

    /// List the devices of the parameters module
    #[command(alias = "dev")]
    Devices,

    /// Stream device events
    Events(EventsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Parameters ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostnameArgs {
    /// New hostname (letter first, at least 5 characters, no trailing dash)
    pub name: String,
}

#[derive(Debug, Args)]
#[command(allow_negative_numbers = true)]
pub struct PositionArgs {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Enable secured access
    Enable,

    /// Disable secured access
    Disable,

    /// List accounts
    #[command(alias = "ls")]
    List,

    /// Create an account
    Add {
        /// Account name
        account: String,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Delete {
        /// Account name
        account: String,
    },
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// Follow events until interrupted
    Watch {
        /// Only show events whose name starts with this prefix
        #[arg(long, short = 'f')]
        filter: Option<String>,

        /// Stop after this many events
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Keep the clock device in sync and print it on every tick
        #[arg(long)]
        clock: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
