//! Clap derive structures for the `huelink` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// huelink -- mirror Philips Hue groups to a remote relay
#[derive(Debug, Parser)]
#[command(
    name = "huelink",
    version,
    about = "Bridge Philips Hue lighting groups to a remote relay",
    long_about = "Exposes the lighting groups of a Philips Hue bridge over a local HTTP\n\
        API and keeps them in sync with a remote relay over a persistent,\n\
        auto-reconnecting websocket.",
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
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, env = "HUELINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Hue bridge IP address or URL (overrides config)
    #[arg(long = "hue-ip", alias = "bridge", env = "HUELINK_HUE_IP", global = true)]
    pub hue_ip: Option<String>,

    /// Hue bridge app key, a.k.a. username (overrides config and keyring)
    #[arg(
        long = "hue-username",
        alias = "app-key",
        env = "HUELINK_HUE_USERNAME",
        global = true,
        hide_env_values = true
    )]
    pub hue_username: Option<String>,

    /// Bridge request timeout in seconds
    #[arg(long, env = "HUELINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HUELINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the local HTTP API and the relay connection
    #[command(alias = "run")]
    Serve(ServeArgs),

    /// Pair with a Hue bridge by pressing its link button
    Pair(PairArgs),

    /// Inspect and control lighting groups
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Local HTTP port
    #[arg(long, env = "HUELINK_PORT")]
    pub port: Option<u16>,

    /// Deployment environment reported by the health check
    #[arg(
        long = "env",
        env = "HUELINK_ENV",
        value_parser = ["development", "staging", "production"]
    )]
    pub environment: Option<String>,

    /// Discover the bridge and pair before serving
    #[arg(long = "discover-hue")]
    pub discover: bool,

    /// Connect to the remote relay
    #[arg(long = "remote", alias = "relay", env = "HUELINK_REMOTE")]
    pub remote: bool,

    /// Relay address as host[:port]
    #[arg(long = "remote-url", alias = "relay-url", env = "HUELINK_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Dial the relay with wss:// instead of ws://
    #[arg(long = "remote-secure")]
    pub remote_secure: bool,

    /// Seconds to wait before redialing the relay
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<u64>,

    /// Seconds between group_state broadcasts
    #[arg(long, value_name = "SECS")]
    pub broadcast_interval: Option<u64>,
}

// ── Pair ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Device type reported to the bridge (shown in the Hue app)
    #[arg(long, default_value = "huelink#cli")]
    pub device_type: String,

    /// Seconds to keep retrying while waiting for the link button
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub wait: u64,

    /// Store the app key in the config file instead of the system keyring
    #[arg(long)]
    pub plaintext: bool,
}

// ── Groups ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List all groups on the bridge
    #[command(alias = "ls")]
    List,

    /// Switch (and optionally dim) every group with the given name
    Set(GroupSetArgs),
}

#[derive(Debug, Args)]
pub struct GroupSetArgs {
    /// Group name (exact, case-sensitive)
    pub name: String,

    /// Turn the group on
    #[arg(long, conflicts_with = "off", required_unless_present = "off")]
    pub on: bool,

    /// Turn the group off
    #[arg(long)]
    pub off: bool,

    /// Brightness (0-255)
    #[arg(long, short = 'b')]
    pub brightness: Option<u8>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
