//! `iosync` command-line entry point.
//!
//! # Responsibility
//! - Layer configuration, start logging, and dispatch one engine operation.
//! - Render results as text or JSON; failures as `error[<code>]: <message>`.

mod cli;
mod config;
mod error;

use clap::Parser;
use cli::{Cli, Commands, ExportArgs, ImportArgs, InspectArgs};
use config::CliConfig;
use error::{CliError, CliResult};
use iosync_core::{
    export_instruments, import_instruments, init_logging, inspect_store, preview_import,
    SyncConfig, UpdateReport,
};
use log::info;
use serde::Serialize;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        output_error(&cli, &err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let file_config = CliConfig::load(cli.config.as_deref()).map_err(CliError::Config)?;
    let logging = file_config.logging_settings(cli.log_level.as_deref(), cli.log_dir.as_deref());
    if let Some(dir) = &logging.dir {
        init_logging(&logging.level, dir)
            .map_err(|err| CliError::Logging(err.to_string()))?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        iosync_core::core_version()
    );

    let sync = file_config.sync;
    match &cli.command {
        Commands::Export(args) => cmd_export(cli, args, &sync),
        Commands::Import(args) => cmd_import(cli, args, &sync),
        Commands::Inspect(args) => cmd_inspect(cli, args, sync),
    }
}

fn cmd_export(cli: &Cli, args: &ExportArgs, config: &SyncConfig) -> CliResult<()> {
    let summary = export_instruments(&args.store, &args.snapshot, config)?;
    if cli.json {
        return print_json(&summary);
    }

    for section in &summary.sections {
        println!("{:<14} {}", section.category.name(), section.rows);
    }
    println!(
        "wrote {} rows to {}",
        summary.rows_written,
        args.snapshot.display()
    );
    if !summary.unclassified.is_empty() {
        println!(
            "skipped {} records with no category flag set",
            summary.unclassified.len()
        );
    }
    Ok(())
}

fn cmd_import(cli: &Cli, args: &ImportArgs, config: &SyncConfig) -> CliResult<()> {
    let report = if args.dry_run {
        preview_import(&args.store, &args.snapshot, config)?
    } else {
        import_instruments(&args.store, &args.snapshot, config)?
    };
    if cli.json {
        return print_json(&report);
    }

    if report.dry_run {
        print_planned_changes(&report);
        println!(
            "would modify {} of {} matched rows",
            report.modified_count(),
            report.rows_matched
        );
    } else {
        println!(
            "modified {} of {} matched rows",
            report.modified_count(),
            report.rows_matched
        );
    }
    Ok(())
}

fn print_planned_changes(report: &UpdateReport) {
    for row in &report.rows {
        println!("{} row {} {}", row.section, row.row, row.key);
        for change in &row.changes {
            println!("  {}: {} -> {}", change.column, change.before, change.after);
        }
    }
}

fn cmd_inspect(cli: &Cli, args: &InspectArgs, mut config: SyncConfig) -> CliResult<()> {
    if let Some(limit) = args.limit {
        config.preview_limit = limit;
    }
    let overview = inspect_store(&args.store, args.table.as_deref(), &config)?;
    if cli.json {
        return print_json(&overview);
    }

    println!("tables: {}", overview.tables.join(", "));
    if let Some(preview) = &overview.preview {
        println!();
        println!("{}", preview.table);
        println!("{}", preview.columns.join("\t"));
        for row in &preview.rows {
            println!("{}", row.join("\t"));
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn output_error(cli: &Cli, err: &CliError) {
    if cli.json {
        let json = serde_json::json!({
            "error": err.code(),
            "message": err.to_string(),
        });
        eprintln!("{json}");
    } else {
        eprintln!("error[{}]: {}", err.code(), err);
    }
}
