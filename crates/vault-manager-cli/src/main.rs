mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use vault_manager_core::ReconcileError;
use vault_manager_vault::VaultClient;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init_tracing_with_level(&cli.log_level);

    if let Err(e) = run(&cli).await {
        if let Some(err) = e.downcast_ref::<ReconcileError>() {
            tracing::error!(
                category = %err.category(),
                kind = err.kind(),
                key = err.key(),
                "Reconciliation aborted"
            );
        }
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let profile = &cli.profile;
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Apply(args) => {
            let client = make_client(cli)?;
            commands::apply::apply(client, &args.file, args.dry_run, format).await?;
        }
        Commands::Diff(args) => {
            let client = make_client(cli)?;
            commands::apply::apply(client, &args.file, true, format).await?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let cfg = config::load_profile(profile)?;
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Address".cyan(),
                    cfg.address.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Namespace".cyan(),
                    cfg.namespace.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}s",
                    "Timeout".cyan(),
                    cfg.timeout_secs.unwrap_or(config::DEFAULT_TIMEOUT_SECS)
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = config::load_profile(profile)?;
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
    }

    Ok(())
}

fn make_client(cli: &Cli) -> Result<VaultClient> {
    let profile = config::load_profile(&cli.profile)?;
    let stored_token = match &cli.connection.token {
        Some(_) => None,
        None => config::load_token_file()?,
    };
    let vault_config = config::resolve_vault_config(&cli.connection, &profile, stored_token)?;
    Ok(VaultClient::new(vault_config)?)
}
