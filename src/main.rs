//! roster — user management CLI over a remote REST collection.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use roster::client;
use roster::config;
use roster::constants;
use roster::env;
use roster::models;
use roster::output;
use roster::session;
use roster::view;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, CreateArgs, DeleteArgs, ListArgs, UpdateArgs};
use client::{HttpUserClient, TombstoneOverlay, UserResource};
use config::Config;
use env::Env;
use models::NewUser;
use output::OutputFormat;
use view::UserListController;

type Controller = UserListController<Arc<dyn UserResource>>;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("could not determine working directory")?;
    let mut config = Config::load(Some(&cwd), &Env::real()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Command::List(args) => run_list(args, &config).await,
        Command::Create(args) => run_create(args, &config).await,
        Command::Update(args) => run_update(args, &config).await,
        Command::Delete(args) => run_delete(args, &config).await,
        Command::Shell => run_shell(&config).await,
        Command::Config => run_config(&config),
        Command::Version => run_version(),
    }
}

/// Route `tracing` output to stderr. `--verbose` wins over `RUST_LOG`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("roster=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build the resource stack described by the configuration.
fn connect(config: &Config) -> Result<Controller> {
    let base_url = config.base_url()?;
    let http = HttpUserClient::new(base_url, config.timeout())
        .context("failed to create HTTP client")?;
    let resource: Arc<dyn UserResource> = if config.sync.tombstones {
        Arc::new(TombstoneOverlay::new(http))
    } else {
        Arc::new(http)
    };
    Ok(UserListController::new(resource, config.sync.strategy))
}

/// Print queued notifications to stderr.
fn flush_notifications(controller: &Controller) {
    for notification in controller.drain_notifications() {
        eprintln!("{}", notification.styled());
    }
}

fn print_users(format: OutputFormat, users: &[models::User]) {
    print!("{}", format.render(users));
}

/// List users, optionally filtered.
async fn run_list(args: ListArgs, config: &Config) -> Result<()> {
    let controller = connect(config)?;
    let result = controller.mount().await;
    flush_notifications(&controller);
    result.context("could not load users")?;

    let users = controller.filtered(args.search.as_deref().unwrap_or_default());
    print_users(config.output.format, &users);
    Ok(())
}

/// Create a user.
async fn run_create(args: CreateArgs, config: &Config) -> Result<()> {
    let user = NewUser::from(args).validate()?;
    let controller = connect(config)?;

    let result = controller.submit_create(user).await;
    flush_notifications(&controller);
    let created = result.context("could not create user")?;

    print_users(config.output.format, &[created]);
    Ok(())
}

/// Update a user.
async fn run_update(args: UpdateArgs, config: &Config) -> Result<()> {
    let patch = args.patch().validate()?;
    let controller = connect(config)?;

    // The cached record completes partial patches; without it the patch goes as-is.
    if controller.mount().await.is_err() {
        controller.drain_notifications();
        tracing::warn!("could not load users; sending partial update");
    }

    let result = controller.submit_update(args.id, patch).await;
    flush_notifications(&controller);
    let updated = result.context("could not update user")?;

    print_users(config.output.format, &[updated]);
    Ok(())
}

/// Delete a user.
async fn run_delete(args: DeleteArgs, config: &Config) -> Result<()> {
    let controller = connect(config)?;

    let result = controller.submit_delete(args.id).await;
    flush_notifications(&controller);
    result.context("could not delete user")?;
    Ok(())
}

/// Interactive session on stdin/stdout.
async fn run_shell(config: &Config) -> Result<()> {
    let controller = connect(config)?;
    eprintln!(
        "  {} {} {}",
        constants::APP_NAME.bold(),
        config.api.base_url.dimmed(),
        "· type `help` for commands".dimmed(),
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let mut session = session::Session::new(controller, config.output.format);
    session
        .run(stdin, stdout)
        .await
        .context("session I/O failed")
}

/// Print the effective configuration.
fn run_config(config: &Config) -> Result<()> {
    config.base_url()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}
