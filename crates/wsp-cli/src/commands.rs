use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use wsp_assertions::{default_registry, read_with_options, write_with_options};
use wsp_cli::summary::{PolicySummary, apply_table_style};
use wsp_core::{Assertion, ReadMode, ReadOptions, Version, WriteOptions, WspConfig};

use crate::cli::{NormalizeArgs, ReadArgs, ReadOptionsArgs};

/// Loads codec options from `path`, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<WspConfig> {
    match path {
        Some(path) => WspConfig::load(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(WspConfig::default()),
    }
}

/// Command line flags override the config file; they never relax it.
fn read_options(config: &WspConfig, args: &ReadOptionsArgs) -> ReadOptions {
    let mut options = config.read.clone();
    if args.strict {
        options.mode = ReadMode::Strict;
    }
    if args.omit_disabled {
        options.include_disabled = false;
    }
    options
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read policy from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read policy {}", path.display()))
}

fn read_policy(path: &Path, options: &ReadOptions) -> Result<Option<Box<dyn Assertion>>> {
    let xml = read_input(path)?;
    read_with_options(&xml, options).with_context(|| format!("parse policy {}", path.display()))
}

pub fn run_read(args: &ReadArgs, config: &WspConfig) -> Result<PolicySummary> {
    let span = info_span!("read", input = %args.input.display());
    let _guard = span.enter();
    let options = read_options(config, &args.read);
    let policy = read_policy(&args.input, &options)?;
    let summary = PolicySummary::from_policy(args.input.display().to_string(), policy.as_deref());
    if summary.quarantined > 0 {
        warn!(
            quarantined = summary.quarantined,
            "policy contains unrecognized assertions"
        );
    }
    info!(
        assertions = summary.assertions,
        disabled = summary.disabled,
        "read complete"
    );
    Ok(summary)
}

pub fn run_normalize(args: &NormalizeArgs, config: &WspConfig) -> Result<()> {
    let span = info_span!("normalize", input = %args.input.display());
    let _guard = span.enter();
    let read = read_options(config, &args.read);
    let mut write = WriteOptions {
        legacy_compatible: config.write.legacy_compatible || args.legacy,
        ..config.write.clone()
    };
    if let Some(text) = &args.target_version {
        let version = text
            .parse::<Version>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid target version {text:?}"))?;
        write.target_version = Some(version);
    }

    let policy = read_policy(&args.input, &read)?;
    let xml = write_with_options(policy.as_deref(), &write).context("write policy")?;
    match &args.output {
        Some(path) => {
            fs::write(path, xml).with_context(|| format!("write {}", path.display()))?;
            info!(output = %path.display(), "normalized policy written");
        }
        None => print!("{xml}"),
    }
    Ok(())
}

pub fn run_kinds() -> Result<()> {
    let registry = default_registry().context("build registry")?;
    let mut rows: Vec<[String; 5]> = Vec::new();
    for (table, mappings) in [("primary", registry.primary()), ("legacy", registry.legacy())] {
        for mapping in mappings.iter() {
            rows.push([
                mapping.external_name().to_string(),
                mapping.mapped_type().name().to_string(),
                mapping.describe().to_string(),
                mapping
                    .since_version()
                    .map_or_else(|| "-".to_string(), ToString::to_string),
                table.to_string(),
            ]);
        }
    }
    rows.sort();

    let mut table = Table::new();
    table.set_header(vec!["Name", "Type", "Kind", "Since", "Table"]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}
