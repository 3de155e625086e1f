use clap::{Parser, ValueEnum};
use decoupled_sim::coord::{Coordinator, FailurePolicy, RunConfig, RunReport};
use decoupled_sim::error::CoordError;
use decoupled_sim::invoke::{Invoker, ProcessInvoker};
use decoupled_sim::store::{FsHandoffStore, HandoffStore, MissingSnapshotPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "decoupled-sim",
    about = "Run scheduler and ember simulations successively until the scheduler snapshot is empty"
)]
struct Args {
    /// File that holds the current scheduler snapshot
    #[arg(long = "xml")]
    xml: Option<PathBuf>,

    /// File the network simulator output is redirected into
    #[arg(long = "emberOut", alias = "ember-out")]
    ember_out: Option<PathBuf>,

    /// File that holds the scheduler parameters
    #[arg(long = "schedPy", alias = "sched-py")]
    sched_py: Option<PathBuf>,

    /// Program that parses the snapshot and runs the network simulator
    #[arg(long = "sched_parser", alias = "sched-parser")]
    sched_parser: Option<String>,

    /// Program that parses the network output and runs the scheduler
    #[arg(long = "ember_parser", alias = "ember-parser")]
    ember_parser: Option<String>,

    /// Load run configuration from JSON; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory collaborators run in; relative paths resolve against it
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Program used for the first scheduler run (default: sst)
    #[arg(long)]
    bootstrap: Option<String>,

    /// Skip the first scheduler run; the snapshot must already exist
    #[arg(long, conflicts_with = "bootstrap")]
    no_bootstrap: bool,

    /// State file to truncate before the run (repeatable)
    #[arg(long = "reset-file")]
    reset_files: Vec<PathBuf>,

    /// Do not truncate any state files before the run
    #[arg(long, conflicts_with = "reset_files")]
    no_reset: bool,

    /// Stop with an error after this many rounds if work remains
    #[arg(long)]
    max_rounds: Option<u64>,

    /// What to do when a collaborator exits non-zero
    #[arg(long, value_enum)]
    on_failure: Option<OnFailure>,

    /// How to treat a snapshot file that does not exist
    #[arg(long, value_enum)]
    missing_snapshot: Option<OnMissing>,

    /// Write the run report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Disable tracing output
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnFailure {
    Halt,
    Proceed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnMissing {
    Complete,
    Error,
}

fn build_config(args: &Args) -> Result<RunConfig, CoordError> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => {
            let missing = |flag: &str| CoordError::Config(format!("--{flag} is required"));
            RunConfig::new(
                args.xml.clone().ok_or_else(|| missing("xml"))?,
                args.ember_out.clone().ok_or_else(|| missing("emberOut"))?,
                args.sched_py.clone().ok_or_else(|| missing("schedPy"))?,
                args.sched_parser.clone().ok_or_else(|| missing("sched_parser"))?,
                args.ember_parser.clone().ok_or_else(|| missing("ember_parser"))?,
            )
        }
    };

    if let Some(v) = &args.xml {
        cfg.snapshot = v.clone();
    }
    if let Some(v) = &args.ember_out {
        cfg.network_output = v.clone();
    }
    if let Some(v) = &args.sched_py {
        cfg.scheduler_config = v.clone();
    }
    if let Some(v) = &args.sched_parser {
        cfg.network_program = v.clone();
    }
    if let Some(v) = &args.ember_parser {
        cfg.scheduler_program = v.clone();
    }
    if args.workdir.is_some() {
        cfg.workdir = args.workdir.clone();
    }
    if args.no_bootstrap {
        cfg.bootstrap = None;
    } else if args.bootstrap.is_some() {
        cfg.bootstrap = args.bootstrap.clone();
    }
    if args.no_reset {
        cfg.reset_files.clear();
    } else if !args.reset_files.is_empty() {
        cfg.reset_files = args.reset_files.clone();
    }
    if args.max_rounds.is_some() {
        cfg.max_rounds = args.max_rounds;
    }
    if let Some(p) = args.on_failure {
        cfg.on_failure = match p {
            OnFailure::Halt => FailurePolicy::Halt,
            OnFailure::Proceed => FailurePolicy::Proceed,
        };
    }
    if let Some(p) = args.missing_snapshot {
        cfg.missing_snapshot = match p {
            OnMissing::Complete => MissingSnapshotPolicy::Complete,
            OnMissing::Error => MissingSnapshotPolicy::Error,
        };
    }
    cfg.validate()?;
    Ok(cfg)
}

/// 运行到结束或出错；两种情况下都返回已积累的报告。
fn drive<I: Invoker, S: HandoffStore>(
    mut coord: Coordinator<I, S>,
) -> (RunReport, Result<(), CoordError>) {
    let result = coord.run().map(|_| ());
    (coord.report(), result)
}

fn run(config: RunConfig) -> Result<(RunReport, Result<(), CoordError>), CoordError> {
    let outcome = match config.workdir.clone() {
        Some(dir) => drive(Coordinator::new(
            config,
            ProcessInvoker::in_dir(&dir),
            FsHandoffStore::rooted_at(&dir),
        )?),
        None => drive(Coordinator::new(
            config,
            ProcessInvoker::new(),
            FsHandoffStore::new(),
        )?),
    };
    Ok(outcome)
}

fn exit_code(err: &CoordError) -> ExitCode {
    match err {
        CoordError::RoundLimit { .. } => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn write_report(path: &Path, report: &RunReport) -> Result<(), CoordError> {
    let raw = serde_json::to_string_pretty(report)
        .map_err(|e| CoordError::Config(format!("serialize report: {e}")))?;
    fs::write(path, raw).map_err(|source| CoordError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 日志写到 stderr，外部程序的 stdout 可能被重定向到交接文件
    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let (report, result) = match build_config(&args).and_then(run) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code(&e);
        }
    };

    println!(
        "rounds={} termination={:?} invocations={}",
        report.rounds,
        report.termination,
        report.invocations.len()
    );
    let mut code = match &result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_code(e)
        }
    };
    if let Some(path) = &args.report_json {
        if let Err(e) = write_report(path, &report) {
            eprintln!("error: {e}");
            if result.is_ok() {
                code = ExitCode::FAILURE;
            }
        }
    }
    code
}
