//! Clap argument types and their conversion into domain payloads.

use clap::Parser;

use roster::config::Config;
use roster::models::{NewUser, UserPatch};
use roster::output::OutputFormat;
use roster::view::ReconcileStrategy;

/// Manage users in a remote REST collection.
#[derive(Parser, Debug)]
#[command(name = "roster", version = roster::constants::VERSION)]
pub struct Cli {
    /// Collection endpoint (overrides config and ROSTER_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format.
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// How the cache is reconciled after a mutation.
    #[arg(long, global = true)]
    pub strategy: Option<ReconcileStrategy>,

    /// Do not hide locally deleted ids from listings.
    #[arg(long, global = true, default_value_t = false)]
    pub no_tombstones: bool,

    /// Log requests and cache activity to stderr.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List users, optionally filtered.
    List(ListArgs),

    /// Create a user.
    Create(CreateArgs),

    /// Update fields of an existing user.
    Update(UpdateArgs),

    /// Delete a user.
    Delete(DeleteArgs),

    /// Start an interactive session.
    Shell,

    /// Print the effective configuration.
    Config,

    /// Print version and build information.
    Version,
}

/// Arguments for the `list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Case-insensitive text matched against name, email and department.
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

/// Arguments for the `create` subcommand.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub department: Option<String>,
}

/// Arguments for the `update` subcommand.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Id of the user to update.
    pub id: u64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub department: Option<String>,
}

/// Arguments for the `delete` subcommand.
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Id of the user to delete.
    pub id: u64,
}

impl Cli {
    /// Apply global flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref url) = self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.api.timeout_secs = Some(secs);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(strategy) = self.strategy {
            config.sync.strategy = strategy;
        }
        if self.no_tombstones {
            config.sync.tombstones = false;
        }
    }
}

impl From<CreateArgs> for NewUser {
    fn from(args: CreateArgs) -> Self {
        NewUser {
            name: args.name,
            email: args.email,
            department: args.department,
        }
    }
}

impl UpdateArgs {
    pub fn patch(&self) -> UserPatch {
        UserPatch {
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone().map(Some),
        }
    }
}
