use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use passbook_finance::OutputFormat;
use passbook_ingest::Strategy;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod report;
mod state;

use commands::{ConvertOpts, SourceOpts};

#[derive(Parser, Debug)]
#[command(
    name = "passbook",
    version,
    about = "Convert payment-statement PDFs into CSV/XLSX transaction tables"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.passbook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Statement PDF
    pdf: PathBuf,

    /// Password for encrypted statements
    #[arg(long)]
    password: Option<String>,

    /// Statement dialect (see `passbook dialects`)
    #[arg(long)]
    dialect: Option<String>,

    /// Extraction strategy: auto, lines or blob
    #[arg(long)]
    strategy: Option<Strategy>,
}

impl From<SourceArgs> for SourceOpts {
    fn from(a: SourceArgs) -> Self {
        Self {
            pdf: a.pdf,
            password: a.password,
            dialect: a.dialect,
            strategy: a.strategy,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement and write CSV or XLSX
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output path; extension is set from the format (default: next to the PDF)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// csv or xlsx
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Skip category tagging and the Category column
        #[arg(long)]
        no_category: bool,

        /// Leave out the Transaction ID column
        #[arg(long)]
        no_transaction_id: bool,

        /// Print summary metrics after writing
        #[arg(long)]
        summary: bool,

        /// Records to preview before writing (0 disables)
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },

    /// Print totals, per-category spend and the statement period
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the filtered text lines extracted from a statement
    Lines {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write a decrypted copy of an encrypted statement
    Unlock {
        pdf: PathBuf,

        #[arg(long)]
        password: Option<String>,

        /// Where to write the decrypted PDF
        #[arg(short, long)]
        out: PathBuf,
    },

    /// List built-in statement dialects
    Dialects,

    /// Write a default config to ~/.passbook/config.toml (or --config)
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info; stdout is reserved for tables
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    if let Command::InitConfig = cli.command {
        return config::init_config(cli.config.as_deref());
    }
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert {
            source,
            out,
            format,
            no_category,
            no_transaction_id,
            summary,
            preview,
        } => {
            let opts = ConvertOpts {
                out,
                format,
                no_category,
                no_transaction_id,
                summary,
                preview,
            };
            commands::convert(&source.into(), &opts, &cfg)?;
        }

        Command::Summary { source, json } => {
            commands::summary(&source.into(), json, &cfg)?;
        }

        Command::Lines { source } => {
            commands::lines(&source.into(), &cfg)?;
        }

        Command::Unlock { pdf, password, out } => {
            commands::unlock(&pdf, password.as_deref(), &out)?;
        }

        Command::Dialects => {
            commands::dialects(&cfg)?;
        }

        Command::InitConfig => {}
    }

    Ok(())
}
