use anyhow::Context;
use clap::{value_parser, Arg, Command};
use reflist_core::{CanonicalEntry, CanonicalSnapshot};
use reflist_editor::{ReferenceList, Reconciler, Validator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("reflist")
        .version(reflist_editor::VERSION)
        .about("Inspect stored reference-list field values")
        .subcommand_required(true)
        .subcommand(
            Command::new("validate")
                .about("Check a stored value for missing or duplicate ids")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of {id, comment} entries"),
                ),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Rebuild a locale's value against the default locale's value")
                .arg(
                    Arg::new("local")
                        .long("local")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Stored value of the locale being synchronized"),
                )
                .arg(
                    Arg::new("canonical")
                        .long("canonical")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Stored value of the default locale"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("validate", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing file argument")?;
            let entries = read_entries(path)?;

            let report = Validator::new().validate(&entries);
            let valid = report.is_valid();
            tracing::info!(entries = entries.len(), valid, "validated");

            let output = serde_json::json!({ "valid": valid, "issues": report.issues });
            println!("{}", serde_json::to_string_pretty(&output)?);

            std::process::exit(if valid { 0 } else { 1 });
        }
        Some(("reconcile", args)) => {
            let local = args
                .get_one::<PathBuf>("local")
                .context("missing --local")?;
            let canonical = args
                .get_one::<PathBuf>("canonical")
                .context("missing --canonical")?;

            let list = ReferenceList::from_persisted(Some(read_entries(local)?));
            let snapshot = CanonicalSnapshot::new(read_entries(canonical)?);
            let reconciled = Reconciler::new()
                .reconcile(&list, &snapshot)
                .context("canonical value was not processed")?;

            println!("{}", serde_json::to_string_pretty(&reconciled.to_entries())?);
        }
        _ => {}
    }

    Ok(())
}

fn read_entries(path: &Path) -> anyhow::Result<Vec<CanonicalEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let entries: Option<Vec<CanonicalEntry>> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(entries.unwrap_or_default())
}
