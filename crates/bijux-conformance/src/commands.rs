// SPDX-License-Identifier: Apache-2.0

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Build the EARL graph and dashboard for one suite run.
    Report {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        results: PathBuf,
        /// Overrides `report.output_dir` from the configuration.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// RFC 3339 run timestamp; defaults to now.
        #[arg(long)]
        timestamp: Option<String>,
        #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
        format: SummaryFormat,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Print the JSON schema accepted by `report --results`.
    ResultsSchema,
}

#[derive(Subcommand)]
pub(crate) enum CatalogCommand {
    Validate {
        #[arg(long)]
        catalog: PathBuf,
        /// Applies the configuration's group selection.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    List {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Explain {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Canonical id, e.g. `GroupA-Foo`.
        id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SummaryFormat {
    Text,
    Json,
}
