// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod commands;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode as ProcessExitCode;

use bijux_conformance_adapters::AtomicFileSink;
use bijux_conformance_core::catalog::{explain_output, list_output};
use bijux_conformance_core::config::parse_timestamp;
use bijux_conformance_core::summary::{render_json, render_text_summary};
use bijux_conformance_core::{
    load_catalog, load_inputs, load_suite_config, run_report, Catalog, EngineError, GroupSelection,
};
use bijux_conformance_model::{suite_results_json_schema, CanonicalId, ExitCode, MachineError};
use chrono::Utc;
use clap::{error::ErrorKind, ArgAction, Parser};
use serde_json::{json, Value};
use tracing::info;

use crate::commands::{CatalogCommand, Commands, SummaryFormat};
use crate::logging::{init_tracing, LogFlags};

#[derive(Parser)]
#[command(name = "bijux-conformance", version)]
#[command(about = "Conformance report engine: EARL graphs and HTML dashboards")]
#[command(
    after_help = "Environment:\n  BIJUX_LOG_LEVEL   Log verbosity override\n  RUST_LOG          Fallback log filter"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, global = true, default_value_t = false)]
    trace: bool,
    #[arg(long = "log-json", global = true, default_value_t = false)]
    log_json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy)]
struct OutputMode {
    json: bool,
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => return Err(CliError::usage(&err.to_string())),
        },
    };
    let command = cli.command.ok_or_else(|| CliError {
        exit_code: ExitCode::Usage,
        machine: MachineError::new("usage_error", "missing command; see --help"),
    })?;
    init_tracing(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.log_json,
    });
    let output_mode = OutputMode { json: cli.json };

    match command {
        Commands::Report {
            config,
            catalog,
            results,
            output_dir,
            timestamp,
            format,
        } => run_report_command(
            ReportArgs {
                config,
                catalog,
                results,
                output_dir,
                timestamp,
                format,
            },
            output_mode,
        ),
        Commands::Catalog { command } => run_catalog_command(command, output_mode),
        Commands::ResultsSchema => {
            let schema = serde_json::to_string_pretty(&suite_results_json_schema())
                .map_err(|err| CliError::internal(err.to_string()))?;
            println!("{schema}");
            Ok(())
        }
    }
}

struct ReportArgs {
    config: PathBuf,
    catalog: PathBuf,
    results: PathBuf,
    output_dir: Option<PathBuf>,
    timestamp: Option<String>,
    format: SummaryFormat,
}

fn run_report_command(args: ReportArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let timestamp = match &args.timestamp {
        Some(raw) => parse_timestamp(raw).map_err(|err| CliError::usage(&err.to_string()))?,
        None => Utc::now(),
    };
    let mut inputs = load_inputs(&args.config, &args.catalog, &args.results)?;
    if let Some(dir) = args.output_dir {
        inputs.config.report.output_dir = dir;
    }
    let sink = AtomicFileSink::new(inputs.config.report.output_dir.clone());
    info!(output_dir = %sink.root().display(), "writing report artifacts");
    let run = run_report(
        &inputs.config,
        &inputs.catalog,
        &inputs.feed,
        &timestamp,
        &sink,
    )?;

    let summary = if args.format == SummaryFormat::Json || output_mode.json {
        render_json(&run).map_err(CliError::internal)?
    } else {
        render_text_summary(&run)
    };
    println!("{summary}");

    if run.writes.is_success() {
        return Ok(());
    }
    let mut machine = MachineError::new(
        "artifact_write_failed",
        &format!("{} report artifact(s) could not be written", run.writes.failed.len()),
    );
    for failed in &run.writes.failed {
        machine = machine.with_detail(&failed.file_name, &failed.error.to_string());
    }
    Err(CliError {
        exit_code: run.exit_code(),
        machine,
    })
}

fn catalog_for(catalog: &Path, config: Option<&Path>) -> Result<Catalog, CliError> {
    let selection = match config {
        Some(path) => load_suite_config(path).map_err(EngineError::from)?.selection,
        None => GroupSelection::all(),
    };
    load_catalog(catalog, selection).map_err(|err| EngineError::from(err).into())
}

fn run_catalog_command(command: CatalogCommand, output_mode: OutputMode) -> Result<(), CliError> {
    match command {
        CatalogCommand::Validate { catalog, config } => {
            let loaded = catalog_for(&catalog, config.as_deref())?;
            let indirect = loaded.all().filter(|d| d.is_indirect()).count();
            emit_ok(
                output_mode,
                json!({
                    "command": "catalog validate",
                    "status": "ok",
                    "descriptors": loaded.len(),
                    "indirect": indirect,
                    "groups": loaded.groups(),
                }),
                &format!(
                    "catalog ok: {} descriptors ({indirect} indirect) in {} groups",
                    loaded.len(),
                    loaded.groups().len()
                ),
            )
        }
        CatalogCommand::List { catalog, config } => {
            let loaded = catalog_for(&catalog, config.as_deref())?;
            let rows = loaded.all().collect::<Vec<_>>();
            emit_ok(
                output_mode,
                json!({"command": "catalog list", "tests": rows}),
                &list_output(&loaded),
            )
        }
        CatalogCommand::Explain {
            catalog,
            config,
            id,
        } => {
            let loaded = catalog_for(&catalog, config.as_deref())?;
            let id = CanonicalId::parse(id.as_str()).map_err(|err| CliError::usage(&err.to_string()))?;
            let text = explain_output(&loaded, &id).map_err(|message| CliError {
                exit_code: ExitCode::Validation,
                machine: MachineError::new("unknown_test", &message),
            })?;
            emit_ok(
                output_mode,
                json!({"command": "catalog explain", "test": loaded.get(&id)}),
                &text,
            )
        }
    }
}

fn emit_ok(output_mode: OutputMode, payload: Value, text: &str) -> Result<(), CliError> {
    if output_mode.json {
        let encoded = serde_json::to_string(&payload).map_err(|e| CliError::internal(e.to_string()))?;
        println!("{encoded}");
    } else {
        println!("{text}");
    }
    Ok(())
}

struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn usage(detail: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::new("usage_error", "invalid command line arguments")
                .with_detail("error", detail),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::new("internal_error", &message),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        Self {
            exit_code: err.exit_code(),
            machine: MachineError::new(err.code(), &err.to_string()),
        }
    }
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
        for (key, value) in &error.machine.details {
            eprintln!("  {key}: {value}");
        }
    }
}
