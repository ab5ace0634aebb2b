//! escheck CLI
//!
//! Generates a check module from test definitions and runs it in a host.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use escheck::codegen::{self, GenerateOptions, GenerationReport, KeyStyle};
use escheck::data::TestSuite;
use escheck::filter::{self, FilterSpec, PathFilter};
use escheck::host::{HostOptions, NodeHost, ScriptHost};
use escheck::report::{ReportOptions, Reporter};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "escheck")]
#[command(author, version, about = "Generate and run ECMAScript compatibility checks", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,

    #[command(flatten)]
    report: ReportArgs,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the check module only
    Generate {
        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Run an existing check module and print the report
    Run {
        /// Check module to run
        #[arg(short, long, default_value = "./escheck.js")]
        file: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args, Clone, Debug)]
struct GenerateArgs {
    /// Test path patterns to include, e.g. `es6//const` (default: everything)
    #[arg(value_name = "FILTER")]
    includes: Vec<String>,

    /// Test path pattern to exclude (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "FILTER")]
    excludes: Vec<String>,

    /// Named filter to include, e.g. `es6_bindings` (repeatable)
    #[arg(short, long = "preset", value_name = "NAME")]
    presets: Vec<String>,

    /// Test definition file
    #[arg(short, long, default_value = "./tests.json")]
    data: PathBuf,

    /// Target file
    #[arg(short, long, default_value = "./escheck.js")]
    file: PathBuf,

    /// Try to minify test bodies
    #[arg(long)]
    minify: bool,

    /// Use quoted test names instead of identifiers as keys
    #[arg(long)]
    quoted_keys: bool,
}

#[derive(Args, Clone, Debug)]
struct ReportArgs {
    /// Only display summary lines for groups
    #[arg(short, long)]
    summary: bool,

    /// Show errors thrown by tests
    #[arg(short, long)]
    errors: bool,

    /// Only show tests which fail
    #[arg(short = 'l', long)]
    fail: bool,

    /// Indent tests by depth
    #[arg(long)]
    indent: bool,

    /// Display the source code of tests
    #[arg(long)]
    src: bool,

    /// JavaScript host program used to run the checks
    #[arg(long, default_value = "node")]
    host: String,

    /// Also write the results as JSON to this file
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    let verbose = cli.verbose > 0;

    let result = match cli.command {
        Some(Commands::Generate { generate }) => generate_checks(&generate, verbose).map(|_| ()),
        Some(Commands::Run { file, report }) => run_checks(&file, &report, &[], verbose),
        None => generate_checks(&cli.generate, verbose)
            .and_then(|generation| {
                run_checks(&cli.generate.file, &cli.report, &generation.excluded, verbose)
            }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn parse_filters(items: &[String]) -> anyhow::Result<Vec<FilterSpec>> {
    items
        .iter()
        .map(|item| item.parse::<FilterSpec>().with_context(|| format!("invalid filter '{}'", item)))
        .collect()
}

fn non_empty(specs: Vec<FilterSpec>) -> Option<Vec<FilterSpec>> {
    if specs.is_empty() {
        None
    } else {
        Some(specs)
    }
}

fn generate_options(args: &GenerateArgs, verbose: bool) -> anyhow::Result<GenerateOptions> {
    let mut includes = parse_filters(&args.includes)?;
    for name in &args.presets {
        includes.push(filter::preset(name)?);
    }
    let excludes = parse_filters(&args.excludes)?;
    if verbose {
        let show = |specs: &[FilterSpec]| {
            specs.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        };
        tracing::info!("Will include following filters: [{}]", show(&includes));
        tracing::info!("Will exclude following filters: [{}]", show(&excludes));
    }
    Ok(GenerateOptions {
        filter: PathFilter::new(non_empty(includes), non_empty(excludes)),
        minify: args.minify,
        verbose,
        key_style: if args.quoted_keys {
            KeyStyle::Quoted
        } else {
            KeyStyle::Identifier
        },
    })
}

fn generate_checks(args: &GenerateArgs, verbose: bool) -> anyhow::Result<GenerationReport> {
    let options = generate_options(args, verbose)?;
    let suite = TestSuite::load(&args.data)
        .with_context(|| format!("unable to load test definitions from '{}'", args.data.display()))?;
    let generation = codegen::write_checks(&args.file, &suite, &options);
    println!("{}", generation);
    Ok(generation)
}

fn run_checks(
    file: &Path,
    args: &ReportArgs,
    excluded: &[String],
    verbose: bool,
) -> anyhow::Result<()> {
    let host = NodeHost::new(args.host.clone());
    let host_options = HostOptions { sources: args.src };
    let run = match host.run_module(file, &host_options) {
        Ok(run) => run,
        Err(escheck::Error::ModuleLoad { .. }) => {
            println!("unable to load file {}", file.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("unable to run checks with '{}'", host.name()))
        }
    };

    let options = ReportOptions {
        summary: args.summary,
        fail: args.fail,
        errors: args.errors,
        indent: args.indent,
        src: args.src,
        verbose,
    };
    Reporter::new(options, io::stdout().lock()).render(&run, excluded)?;

    if let Some(path) = &args.report_json {
        let out = File::create(path)
            .with_context(|| format!("unable to create '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(out), &run)?;
        tracing::info!(file = %path.display(), "wrote JSON report");
    }
    Ok(())
}
