mod commands;
mod logging;
mod preview;
mod progress;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use commands::{Cli, Commands, OutputFormat, RenameArgs};
use dlrename_core::{AppConfig, Error, OperationKind, RenameEngine};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();

    let config = match dlrename_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Some(Commands::Rename(rename_args)) => rename_command(config, &rename_args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            ExitCode::SUCCESS
        }
        None => {
            let _ = Cli::command().print_long_help();
            ExitCode::SUCCESS
        }
    }
}

/// Holds the log guard for the whole run so the file is flushed before exit.
fn rename_command(mut config: AppConfig, args: &RenameArgs) -> ExitCode {
    args.apply_to(&mut config);

    let _guard = match logging::init_logger(&config.log_dir) {
        Ok((guard, _)) => guard,
        Err(err) => {
            eprintln!(
                "Error creating log directory {}: {}",
                config.log_dir.display(),
                err
            );
            return ExitCode::FAILURE;
        }
    };

    match run_rename(config, args) {
        Ok(code) => code,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_rename(config: AppConfig, args: &RenameArgs) -> anyhow::Result<ExitCode> {
    info!("{}", "=".repeat(80));
    info!("DLsite Folder Renaming Tool");
    info!("{}", "=".repeat(80));
    info!("Target directory: {}", args.directory.display());
    info!("CSV file: {}", config.data_file.display());
    info!("Max folder name length: {}", config.max_length);
    if args.dry_run {
        info!("DRY RUN MODE - No changes will be made");
    }

    let engine = RenameEngine::new(config).context("Invalid configuration")?;
    if !engine.config().data_file.is_file() {
        bail!("CSV file not found: {}", engine.config().data_file.display());
    }

    let records = engine.load_records().context("Failed to load CSV")?;
    let reporter = CliReporter::new();
    let plan = engine.compute_plan(&args.directory, &records, &reporter)?;

    if !plan.has_work() {
        warn!("No renaming operations to perform");
        info!("This could mean:");
        info!("  - All folders are already renamed");
        info!("  - No folders with an identifier found");
        info!("  - No matching entries in CSV");
        if args.format == OutputFormat::Json {
            preview::print_json(&plan)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let accepted = match engine.check(plan) {
        Ok(accepted) => accepted,
        Err(Error::Conflicts(groups)) => {
            preview::print_conflicts(&groups);
            error!("Please resolve duplicates before proceeding");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };

    match args.format {
        OutputFormat::Table => preview::print_table(&accepted),
        OutputFormat::Json => preview::print_json(&accepted)?,
    }

    if args.dry_run {
        info!("Dry run complete. Run without --dry-run to apply changes.");
        return Ok(ExitCode::SUCCESS);
    }

    if !args.yes {
        info!(
            "{} folder(s) will be changed",
            accepted.count(OperationKind::Rename) + accepted.count(OperationKind::MtimeOnly)
        );
        if !prompt_confirm("Proceed with renaming?", Some(false))? {
            info!("Operation cancelled by user");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let report = engine.execute(&accepted, &reporter);
    preview::print_summary(&report);

    if report.is_success() {
        info!("All operations completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(
            "Completed with {} failure(s), see the log for details",
            report.summary.failed
        );
        Ok(ExitCode::FAILURE)
    }
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        // EOF on stdin counts as no answer
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
