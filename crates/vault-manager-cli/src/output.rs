use anyhow::Result;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;
use vault_manager_core::ApplyOutcome;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_outcomes(outcomes: &[ApplyOutcome], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcomes)?);
        }
        OutputFormat::Table => print_as_table(outcomes),
    }
    Ok(())
}

fn print_as_table(outcomes: &[ApplyOutcome]) {
    let rows = outcome_rows(outcomes);
    if rows.is_empty() {
        println!("No changes.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Kind", "Key", "Action"]);
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");

    let (written, deleted) = outcomes.iter().fold((0, 0), |(w, d), o| {
        (w + o.written.len(), d + o.deleted.len())
    });
    let dry_run = outcomes.iter().any(|o| o.dry_run);
    if dry_run {
        let summary = format!("{written} to write, {deleted} to delete");
        println!("{} {}", summary.yellow(), "(dry run, nothing changed)".dimmed());
    } else {
        print_success(&format!("{written} written, {deleted} deleted"));
    }
}

/// One `[kind, key, action]` row per write or delete, in apply order.
fn outcome_rows(outcomes: &[ApplyOutcome]) -> Vec<[String; 3]> {
    let mut rows = Vec::new();
    for outcome in outcomes {
        let (write, delete) = if outcome.dry_run {
            ("would write", "would delete")
        } else {
            ("written", "deleted")
        };
        for key in &outcome.written {
            rows.push([outcome.kind.clone(), key.clone(), write.to_string()]);
        }
        for key in &outcome.deleted {
            rows.push([outcome.kind.clone(), key.clone(), delete.to_string()]);
        }
    }
    rows
}
