use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gcvm::{
    runtime::{GcConfig, VM, workload},
    script::{RunReport, Runner, demos, parse_script},
};

/// Drive a mark-and-sweep collected stack VM from scripts.
#[derive(Parser, Debug)]
#[command(name = "gcvm", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    gc: GcArgs,

    /// Log collector activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GcArgs {
    /// Load collector settings from a JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lower bound on the allocation threshold
    #[arg(long, global = true, value_name = "N")]
    gc_threshold: Option<usize>,

    /// Maximum root stack depth
    #[arg(long, global = true, value_name = "N")]
    stack_capacity: Option<usize>,

    /// Never collect automatically (explicit `gc` still runs)
    #[arg(long, global = true)]
    no_gc: bool,

    /// Print the collector telemetry report after running
    #[arg(long, global = true)]
    gc_telemetry: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a script file
    Run {
        file: PathBuf,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the bundled scenarios, or just the named one
    Demo { name: Option<String> },
    /// Churn garbage on several independent VMs in parallel
    Stress {
        #[arg(long, default_value_t = 4)]
        vms: usize,
        #[arg(long, default_value_t = 10_000)]
        rounds: usize,
        #[arg(long, default_value_t = 32)]
        batch: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gcvm=debug" } else { "gcvm=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn dispatch(cli: &Cli) -> Result<()> {
    let config = resolve_config(&cli.gc)?;
    match &cli.command {
        Commands::Run { file, json } => run_file(file, *json, config, cli.gc.gc_telemetry),
        Commands::Demo { name } => run_demo(name.as_deref(), config, cli.gc.gc_telemetry),
        Commands::Stress { vms, rounds, batch } => run_stress(config, *vms, *rounds, *batch),
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &GcArgs) -> Result<GcConfig> {
    let mut config = match &args.config {
        Some(path) => GcConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GcConfig::default(),
    };
    if let Some(threshold) = args.gc_threshold {
        config = config.with_min_threshold(threshold);
    }
    if let Some(capacity) = args.stack_capacity {
        config = config.with_stack_capacity(capacity);
    }
    if args.no_gc {
        config = config.with_gc_enabled(false);
    }
    Ok(config.validate()?)
}

fn run_file(file: &Path, json: bool, config: GcConfig, telemetry: bool) -> Result<()> {
    let source =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let report = run_script(&source, config, telemetry)
        .with_context(|| format!("{} failed", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn run_demo(only: Option<&str>, config: GcConfig, telemetry: bool) -> Result<()> {
    let selected: Vec<(&str, &str)> = match only {
        Some(name) => {
            let source = demos::find(name).ok_or_else(|| {
                let known: Vec<&str> = demos::names().collect();
                anyhow::anyhow!("unknown demo `{name}` (available: {})", known.join(", "))
            })?;
            vec![(name, source)]
        }
        None => demos::SCENARIOS.to_vec(),
    };
    for (name, source) in selected {
        println!("== {name} ==");
        let report =
            run_script(source, config, telemetry).with_context(|| format!("{name} failed"))?;
        print!("{}", report.render_text());
        println!();
    }
    Ok(())
}

fn run_script(source: &str, config: GcConfig, telemetry: bool) -> Result<RunReport> {
    let statements = parse_script(source)?;
    let mut vm = VM::with_config(config);
    let mut runner = Runner::new(&mut vm);
    runner.run(&statements)?;
    let report = runner.into_report();
    if telemetry {
        print_telemetry(&vm);
    }
    Ok(report)
}

#[cfg(feature = "gc-telemetry")]
fn print_telemetry(vm: &VM) {
    eprintln!("{}", vm.gc_telemetry_report());
}

#[cfg(not(feature = "gc-telemetry"))]
fn print_telemetry(_vm: &VM) {
    tracing::warn!("--gc-telemetry requires building with the `gc-telemetry` feature");
}

fn run_stress(config: GcConfig, vms: usize, rounds: usize, batch: usize) -> Result<()> {
    info!(vms, rounds, batch, "starting stress run");
    let results: Vec<(usize, usize, usize)> = (0..vms)
        .into_par_iter()
        .map(|_| -> Result<_> {
            let mut vm = VM::with_config(config);
            workload::churn(&mut vm, rounds, batch)?;
            let heap = vm.heap();
            Ok((
                heap.total_allocations(),
                heap.total_collections(),
                heap.capacity(),
            ))
        })
        .collect::<Result<_>>()?;

    for (idx, (allocations, collections, capacity)) in results.iter().enumerate() {
        println!(
            "vm {idx}: {allocations} allocations, {collections} collections, {capacity} slots"
        );
    }
    Ok(())
}
