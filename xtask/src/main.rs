// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

fn cargo(root: &Path, args: &[&str]) -> Result<(), String> {
    let rendered = format!("cargo {}", args.join(" "));
    let status = Command::new(env::var("CARGO").unwrap_or_else(|_| "cargo".to_string()))
        .args(args)
        .current_dir(root)
        .status()
        .map_err(|e| format!("failed to run `{rendered}`: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("command failed: {rendered}"))
    }
}

fn check(root: &Path) -> Result<(), String> {
    cargo(root, &["fmt", "--all", "--", "--check"])?;
    cargo(
        root,
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )?;
    cargo(root, &["test", "--workspace"])
}

fn sample_report(root: &Path) -> Result<(), String> {
    let fixtures = root.join("crates/bijux-conformance/tests/fixtures");
    let out = root.join("target/sample-report");
    let path = |p: PathBuf| p.display().to_string();
    let (config, catalog, results, out) = (
        path(fixtures.join("conformance.toml")),
        path(fixtures.join("catalog.toml")),
        path(fixtures.join("results.json")),
        path(out),
    );
    cargo(
        root,
        &[
            "run", "-q", "-p", "bijux-conformance", "--", "report",
            "--config", &config,
            "--catalog", &catalog,
            "--results", &results,
            "--output-dir", &out,
        ],
    )?;
    eprintln!("sample report written to {out}");
    Ok(())
}

fn main() -> ExitCode {
    let arg = env::args().nth(1).unwrap_or_else(|| "help".to_string());
    let Some(root) = Path::new(env!("CARGO_MANIFEST_DIR")).parent() else {
        eprintln!("xtask must live inside the workspace");
        return ExitCode::FAILURE;
    };

    let result = match arg.as_str() {
        "check" => check(root),
        "sample-report" => sample_report(root),
        "help" | "--help" | "-h" => {
            eprintln!("xtask commands:");
            eprintln!("  check           fmt, clippy and tests for the workspace");
            eprintln!("  sample-report   render the bundled fixtures into target/sample-report");
            Ok(())
        }
        _ => Err(format!(
            "unknown xtask command: {arg} (try `cargo run -p xtask -- help`)"
        )),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
