//! Binary entrypoint for instant-print.
//!
//! Parses arguments, loads profiles and fans images out to blocking workers;
//! all image work lives in the library crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio::task::JoinSet;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use instant_print::output::write_bundle;
use instant_print::scan::collect_inputs;
use instant_print::{
    DebugSink, DirectorySink, NullSink, Overrides, ProcessRequest, ProfileSet, StyleParameters,
    process_with,
};

/// Turn photographs into instant-film style prints.
#[derive(Debug, Parser)]
#[command(name = "instant-print", version, about)]
struct Cli {
    /// Image files or directories to process
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Directory receiving the prints
    #[arg(short, long, value_name = "DIR", default_value = "prints")]
    out_dir: PathBuf,

    /// Style profile name
    #[arg(short, long, default_value = "classic")]
    profile: String,

    /// YAML file with extra profiles
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Override photo grain intensity (0..1)
    #[arg(long, value_name = "INTENSITY")]
    grain: Option<f32>,

    /// Override rotation angle in degrees
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    rotation: Option<f32>,

    /// Skip the normal map
    #[arg(long)]
    no_normal: bool,

    /// Dump intermediate frames
    #[arg(long)]
    debug: bool,

    /// Where intermediate frames go (one subdirectory per input)
    #[arg(long, value_name = "DIR", default_value = instant_print::debug::DEFAULT_DEBUG_DIR)]
    debug_dir: PathBuf,

    /// Give up on an image after this long, e.g. "30s"
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Images processed at once (defaults to available cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter =
        EnvFilter::from_default_env().add_directive(format!("instant_print={level}").parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let profiles = match &cli.config {
        Some(path) => ProfileSet::from_yaml_file(path)
            .with_context(|| format!("loading profiles from {}", path.display()))?,
        None => ProfileSet::default(),
    };
    let params = profiles
        .get(&cli.profile)
        .with_context(|| {
            let known: Vec<_> = profiles.names().collect();
            format!("available profiles: {}", known.join(", "))
        })?
        .clone();

    let inputs = collect_inputs(&cli.inputs).context("collecting inputs")?;
    if inputs.is_empty() {
        bail!("no images found in the given inputs");
    }
    info!(count = inputs.len(), profile = %cli.profile, "processing images");

    let request = ProcessRequest {
        profile: cli.profile.clone(),
        debug: cli.debug,
        debug_dir: cli.debug_dir.clone(),
        generate_normal: !cli.no_normal,
        overrides: Overrides {
            seed: cli.seed,
            grain_intensity: cli.grain,
            rotation_angle: cli.rotation,
        },
    };
    let jobs = cli
        .jobs
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1)
        .max(1);

    let mut tasks: JoinSet<(PathBuf, Result<()>)> = JoinSet::new();
    let mut failures = 0usize;
    for path in inputs {
        while tasks.len() >= jobs {
            failures += reap(&mut tasks).await;
        }
        let request = request.clone();
        let params = params.clone();
        let out_dir = cli.out_dir.clone();
        let timeout = cli.timeout;
        tasks.spawn(async move {
            let result = run_one(path.clone(), request, params, out_dir, timeout).await;
            (path, result)
        });
    }
    while !tasks.is_empty() {
        failures += reap(&mut tasks).await;
    }

    if failures > 0 {
        bail!("{failures} image(s) failed");
    }
    Ok(())
}

async fn reap(tasks: &mut JoinSet<(PathBuf, Result<()>)>) -> usize {
    match tasks.join_next().await {
        Some(Ok((path, Ok(())))) => {
            info!(path = %path.display(), "done");
            0
        }
        Some(Ok((path, Err(err)))) => {
            error!(path = %path.display(), error = %format!("{err:#}"), "failed");
            1
        }
        Some(Err(err)) => {
            error!(error = %err, "worker panicked");
            1
        }
        None => 0,
    }
}

async fn run_one(
    path: PathBuf,
    request: ProcessRequest,
    params: StyleParameters,
    out_dir: PathBuf,
    timeout: Option<Duration>,
) -> Result<()> {
    let work =
        tokio::task::spawn_blocking(move || render_file(&path, &request, &params, &out_dir));
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(joined) => joined,
            Err(_) => {
                // The blocking worker cannot be interrupted; its result is dropped.
                warn!(?limit, "image exceeded deadline, abandoning");
                bail!("timed out after {}", humantime::format_duration(limit));
            }
        },
        None => work.await,
    };
    joined.context("worker failed")?
}

fn render_file(
    path: &Path,
    request: &ProcessRequest,
    params: &StyleParameters,
    out_dir: &Path,
) -> Result<()> {
    let image = image::open(path).with_context(|| format!("decoding {}", path.display()))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_string();

    let mut sink: Box<dyn DebugSink> = if request.debug {
        Box::new(DirectorySink::new(request.debug_dir.join(&stem)))
    } else {
        Box::new(NullSink)
    };
    let bundle = process_with(&image, request, params, sink.as_mut())
        .with_context(|| format!("processing {}", path.display()))?;
    let written = write_bundle(&bundle, out_dir, &stem).context("writing outputs")?;
    info!(
        print = %written.print.display(),
        angle = bundle.style_info.rotation_angle,
        seed = bundle.style_info.seed,
        "print ready"
    );
    Ok(())
}
