//! `kcrename` - CLI for kconfig-rename
//!
//! This binary renames Kconfig symbols and their `CONFIG_` references across
//! a source tree, either one symbol at a time or from a mapping file.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use kconfig_rename::cli::{Cli, Command, ConfigCommand};
use kconfig_rename::renamer::FileKind;
use kconfig_rename::{init_logging, BatchReport, Config, RenameReport, Renamer, ScanReport};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity(), cli.log_file.as_deref())?;

    let config_path = cli.config_path();

    // Validation reports a broken file instead of failing to start on it
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        validate_config(file.clone().unwrap_or(config_path));
        return Ok(());
    }

    let config = Config::load_from(Some(config_path.clone())).context("loading configuration")?;
    let json_default = config.output.json;

    match cli.command {
        Command::Rename(cmd) => {
            let report = Renamer::new(config)
                .dry_run(cmd.dry_run)
                .rename_symbol(&cmd.symbol, &cmd.new_symbol, &cmd.tree.root_dir)?;
            if cmd.tree.json || json_default {
                print_json(&report)?;
            } else {
                print_rename(&report);
            }
        }
        Command::Apply(cmd) => {
            let batch = Renamer::new(config)
                .dry_run(cmd.dry_run)
                .rename_from_mapping_file(&cmd.mapping_file, &cmd.tree.root_dir)?;
            if cmd.tree.json || json_default {
                print_json(&batch)?;
            } else {
                print_batch(&batch);
            }
        }
        Command::Scan(cmd) => {
            let report = Renamer::new(config).scan(&cmd.symbol, &cmd.tree.root_dir)?;
            if cmd.tree.json || json_default {
                print_json(&report)?;
            } else {
                print_scan(&report);
            }
        }
        Command::Config(config_cmd) => handle_config(&config, &config_path, config_cmd)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_rename(report: &RenameReport) {
    let verb = if report.dry_run { "Would update" } else { "Updated" };

    println!("{} -> {}", report.old, report.new);
    if report.mappings.is_empty() {
        println!("  No symbols found starting with {}", report.old);
        return;
    }
    for (old, new) in report.mappings.iter() {
        println!("  {old} -> {new}");
    }
    for change in &report.changed {
        println!(
            "  {verb} {} ({} replacements)",
            change.path.display(),
            change.replacements
        );
    }
    for failure in &report.failures {
        println!("  Failed {}: {}", failure.path.display(), failure.message);
    }
    println!(
        "  {verb} {} of {} Kconfig files and {} of {} source files",
        report.changed_count(FileKind::Kconfig),
        report.kconfig_files_scanned,
        report.changed_count(FileKind::Source),
        report.source_files_scanned
    );
}

fn print_batch(batch: &BatchReport) {
    for issue in &batch.issues {
        println!(
            "{}:{}: skipped \"{}\": {}",
            batch.mapping_file.display(),
            issue.line,
            issue.text,
            issue.reason
        );
    }
    for report in &batch.renames {
        print_rename(report);
    }
    for error in &batch.errors {
        println!(
            "{}:{}: {}",
            batch.mapping_file.display(),
            error.line,
            error.message
        );
    }
}

fn print_scan(report: &ScanReport) {
    if report.members.is_empty() {
        println!("No symbols found starting with {}", report.symbol);
    } else {
        for member in &report.members {
            println!("{member}");
        }
    }
    for failure in &report.failures {
        println!("Failed {}: {}", failure.path.display(), failure.message);
    }
}

fn handle_config(config: &Config, config_path: &Path, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Scan]");
                println!("  Kconfig names:      {}", config.scan.kconfig_names.join(", "));
                println!(
                    "  Source extensions:  {}",
                    config.scan.source_extensions.join(", ")
                );
                println!(
                    "  Source file names:  {}",
                    config.scan.source_file_names.join(", ")
                );
                println!("  Excluded dirs:      {}", config.scan.exclude_dirs.join(", "));
                println!("  Strict sub-symbols: {}", config.scan.strict_subsymbols);
                println!();
                println!("[Output]");
                println!("  JSON:               {}", config.output.json);
            }
        }
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Validate { file } => {
            validate_config(file.unwrap_or_else(|| config_path.to_path_buf()));
        }
    }
    Ok(())
}

fn validate_config(path: PathBuf) {
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => println!("Configuration is valid."),
        Err(e) => println!("Configuration error: {e}"),
    }
}
