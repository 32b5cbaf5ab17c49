//! `msgtools` binary: generate message bundle and logger implementations from a source tree.

use clap::{Args, Parser, Subcommand};
use msgtools::{
    FileWriter, MemoryWriter, Report, SourceWriter,
    config::{ConfigError, MsgtoolsConfig},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing_subscriber::{EnvFilter, fmt};

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "msgtools", version, about = "Generate message bundle and message logger implementations")]
struct Cli {
    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info", env = "MSGTOOLS_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate implementations and write them to the output directory.
    Generate(RunArgs),

    /// Resolve and validate only; nothing is written.
    Check(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Source directory scanned for annotated traits.
    #[arg(long, default_value = "src")]
    src: PathBuf,

    /// Config file; `msgtools.toml` in the working directory when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory, overriding `[output] dir`.
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long)]
    runtime_crate: Option<String>,

    #[arg(long)]
    skip_translations: bool,

    /// Root searched for translation properties files.
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Properties file used for `${key}` substitution.
    #[arg(long)]
    expressions: Option<PathBuf>,

    /// Also write a translation skeleton for this locale.
    #[arg(long)]
    skeleton: Option<String>,

    #[arg(long)]
    no_header: bool,

    /// Write the run report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl RunArgs {
    // flags override file values
    fn config(&self) -> Result<MsgtoolsConfig, ConfigError> {
        let mut config = MsgtoolsConfig::discover(self.config.as_deref(), Path::new("."))?;
        let generator = &mut config.generator;

        if let Some(runtime_crate) = &self.runtime_crate {
            generator.runtime_crate.clone_from(runtime_crate);
        }
        if self.skip_translations {
            generator.skip_translations = true;
        }
        if let Some(dir) = &self.translations {
            generator.translation_files_path = Some(dir.clone());
        }
        if let Some(path) = &self.expressions {
            generator.expression_properties = Some(path.clone());
        }
        if let Some(locale) = &self.skeleton {
            generator.skeleton_locale = Some(locale.clone());
        }
        if self.no_header {
            generator.generated_header = false;
        }
        if let Some(dir) = &self.out {
            config.output.dir.clone_from(dir);
        }

        Ok(config)
    }
}

///
/// ReportFile
///

#[derive(Serialize)]
struct ReportFile<'a> {
    version: &'static str,
    #[serde(flatten)]
    report: &'a Report,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli.command) {
        Ok(report) if !report.has_errors() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(target: "msgtools", "{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(command: &Command) -> Result<Report, Box<dyn std::error::Error>> {
    let (args, write) = match command {
        Command::Generate(args) => (args, true),
        Command::Check(args) => (args, false),
    };
    let config = args.config()?;

    let mut file_writer;
    let mut memory_writer;
    let writer: &mut dyn SourceWriter = if write {
        file_writer = FileWriter::new(&config.output.dir);
        &mut file_writer
    } else {
        memory_writer = MemoryWriter::new();
        &mut memory_writer
    };

    let report = msgtools::generate_dir(&config, &args.src, writer)?;
    for diagnostic in &report.diagnostics {
        eprintln!("{diagnostic}");
    }

    if let Some(path) = &args.report {
        let file = ReportFile {
            version: msgtools::VERSION,
            report: &report,
        };
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
    }

    Ok(report)
}
