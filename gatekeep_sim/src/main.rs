//! Gatekeep CLI
//!
//! Runs a random light controller behind the gatekeeper on the reference
//! intersection and reports the certificates it issued.

use clap::Parser;
use gatekeep_core::{AtomicEval, Formula};
use gatekeep_sim::specs::{light_eval, traffic_eval, SpecId};
use gatekeep_sim::{
    GatekeepResult, Gatekeeper, GatekeeperConfig, Intersection, IntersectionConfig, LightObserver,
    LoopConfig, LoopReport, Observer, RandomController, RunExport, TrafficObserver, WorkerPool,
};
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Gatekeep runtime-verification CLI
#[derive(Parser, Debug)]
#[command(name = "gatekeep")]
#[command(about = "Certify controller actions against temporal specifications", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Specification to enforce (safety, shield)
    #[arg(short = 'S', long, default_value = "safety")]
    spec: String,

    /// Rollouts sampled per action
    #[arg(short = 'n', long, default_value = "10")]
    trajectories: usize,

    /// Maximum steps per rollout
    #[arg(long, default_value = "10")]
    horizon: usize,

    /// Gatekept steps per loop
    #[arg(short, long, default_value = "10")]
    iterations: usize,

    /// Independent repetitions (with --parallel)
    #[arg(short, long, default_value = "10")]
    repetitions: usize,

    /// Worker threads (with --parallel)
    #[arg(short, long, default_value = "5")]
    workers: usize,

    /// Fan repetitions out across the worker pool
    #[arg(long)]
    parallel: bool,

    /// Acceptance threshold for certificates
    #[arg(long, default_value_t = gatekeep_sim::DEFAULT_ACCEPTANCE_THRESHOLD)]
    threshold: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export certificates and rollouts to a JSON file
    #[arg(long)]
    export: Option<String>,
}

/// Builds the gatekeeper for one observer and runs it.
fn run<P>(
    args: &Args,
    seed: u64,
    formula: Formula,
    observer: P,
    atomic_eval: Arc<dyn AtomicEval<P::Observation>>,
) -> GatekeepResult<LoopReport<gatekeep_sim::Phase, P::Observation>>
where
    P: Observer<Intersection> + Clone + 'static,
{
    let sim_config = IntersectionConfig {
        seed,
        ..Default::default()
    };
    sim_config.validate()?;
    let sim = Intersection::new(sim_config);
    let controller = RandomController::new(seed.wrapping_mul(0x9e3779b97f4a7c15));
    let config = GatekeeperConfig::default()
        .with_trajectories(args.trajectories)
        .with_horizon(args.horizon)
        .with_threshold(args.threshold);

    let mut gatekeeper = Gatekeeper::new(sim, controller, observer, formula, atomic_eval, config)?;
    debug!("{:?}", gatekeeper);

    let report = if args.parallel {
        let loops = LoopConfig::default()
            .with_iterations(args.iterations)
            .with_repetitions(args.repetitions)
            .with_workers(args.workers);
        let pool = WorkerPool::new(loops.workers)?;
        gatekeeper.run_parallel(&pool, &loops)?
    } else {
        gatekeeper.run_loop(args.iterations)?
    };
    gatekeeper.close();

    Ok(report)
}

/// Runs the selected specification and builds its export.
fn execute(args: &Args, spec: SpecId, seed: u64) -> GatekeepResult<RunExport> {
    let formula = spec.formula();
    let mut export = RunExport::new(spec.name(), &formula.to_string(), seed, args.threshold);

    match spec {
        SpecId::Safety => {
            let report = run(args, seed, formula, TrafficObserver::default(), traffic_eval())?;
            export.add_report(&report);
        }
        SpecId::Shield => {
            let report = run(args, seed, formula, LightObserver, light_eval())?;
            export.add_report(&report);
        }
    }

    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        info!("Exported {} certificates to {}", export.certificates.len(), path);
    }

    Ok(export)
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let spec: SpecId = args.spec.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!(
            "Available specifications: {}",
            SpecId::all().iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );
        std::process::exit(1);
    });

    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    if !args.json {
        info!("Gatekeep v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("{} (seed={}): {}", spec.name(), seed, spec.description());
    }

    let export = match execute(&args, spec, seed) {
        Ok(export) => export,
        Err(e) => {
            error!("✗ {} (seed={}) FAILED: {}", spec.name(), seed, e);
            std::process::exit(1);
        }
    };

    if args.json {
        let summary = serde_json::json!({
            "spec": export.spec,
            "formula": export.formula,
            "seed": export.seed,
            "certificates": export.certificates.len(),
            "accepted": export.accepted,
            "rejected": export.rejected,
            "trajectories": export.trajectories.len(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "✓ {} certificates issued: {} accepted, {} rejected ({} rollouts)",
            export.certificates.len(),
            export.accepted,
            export.rejected,
            export.trajectories.len()
        );
    }
}
