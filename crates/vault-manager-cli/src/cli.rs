use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "vault-manager")]
#[command(about = "Reconcile a Vault server against a declarative YAML document")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Config profile name
    #[arg(short, long, global = true, env = "VAULT_MANAGER_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

/// How to reach Vault. Each flag overrides the profile config.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Vault address (overrides config and VAULT_ADDR env var)
    #[arg(short, long, global = true, env = "VAULT_ADDR")]
    pub address: Option<String>,

    /// Vault token (falls back to ~/.vault-token)
    #[arg(long, global = true, env = "VAULT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Vault Enterprise namespace
    #[arg(long, global = true, env = "VAULT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum, Default, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Converge Vault to the document
    Apply(ApplyArgs),
    /// Show what apply would change, without changing anything
    Diff(DiffArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Path to the YAML document (reads from stdin if omitted)
    pub file: Option<String>,
    /// Report intended changes without writing or deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct DiffArgs {
    /// Path to the YAML document (reads from stdin if omitted)
    pub file: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (address, namespace, timeout_secs)
    pub key: String,
    /// Value
    pub value: String,
}
