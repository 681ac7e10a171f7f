use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use tracing::info;
use vault_manager_vault::{VaultClient, default_registry};

use crate::cli::OutputFormat;
use crate::output::print_outcomes;

fn read_document(file: &Option<String>) -> Result<Vec<u8>> {
    match file {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read file: {path}")),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

pub async fn apply(
    client: VaultClient,
    file: &Option<String>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let raw = read_document(file)?;
    info!(address = client.address(), dry_run, "Reconciling Vault");

    let registry = default_registry(client)?;
    let outcomes = registry.apply_document(&raw, dry_run).await?;

    print_outcomes(&outcomes, format)
}
