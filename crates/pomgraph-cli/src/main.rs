use clap::Parser;
use pomgraph_core::{
    ArtifactCache, ArtifactIdent, HttpRepository, PomGraphError, RepositoryClient, ResolverConfig,
    Result,
};
use pomgraph_resolver::Resolver;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod output;

use output::ArtifactSummary;

const PROGRESS_INTERVAL: usize = 10_000;

/// Resolve Maven artifacts and print their dependency graphs as JSON lines
#[derive(Parser, Debug)]
#[command(name = "pomgraph", version, about)]
struct Cli {
    /// Artifacts to resolve, as groupId:artifactId:version
    #[arg(value_name = "COORDINATES")]
    coordinates: Vec<String>,

    /// File with one groupId:artifactId:version per line
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Resolve a local pom.xml instead of published artifacts
    #[arg(long, value_name = "FILE", conflicts_with_all = ["coordinates", "input"])]
    pom: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, env = "POMGRAPH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after direct dependencies
    #[arg(long)]
    no_transitives: bool,

    /// Worker threads, overriding the configuration file
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Pretty-print each result
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    // stdout carries results only
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = ResolverConfig::load_or_default(cli.config.as_deref())?;
    if cli.no_transitives {
        config.resolve_transitives = false;
    }
    if let Some(jobs) = cli.jobs {
        config.parallelism = jobs;
    }
    debug!("configuration: {:?}", config);

    let repository = HttpRepository::new(&config)?;
    let resolver = Resolver::new(repository, Arc::new(ArtifactCache::new()), config);

    if let Some(path) = &cli.pom {
        let resolved = resolver.resolve_local_pom_file(path)?;
        println!("{}", ArtifactSummary::from(&resolved).to_json(cli.pretty)?);
        return Ok(ExitCode::SUCCESS);
    }

    let idents = read_coordinates(cli)?;
    if idents.is_empty() {
        error!("nothing to resolve: pass coordinates, --input or --pom");
        return Ok(ExitCode::from(2));
    }

    let summaries = resolve_batch(&resolver, &idents)?;
    for summary in &summaries {
        println!("{}", summary.to_json(cli.pretty)?);
    }

    Ok(if summaries.len() == idents.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_coordinates(cli: &Cli) -> Result<Vec<ArtifactIdent>> {
    let mut lines = cli.coordinates.clone();
    if let Some(path) = &cli.input {
        let content = std::fs::read_to_string(path)?;
        lines.extend(parse_input(&content));
    }
    lines.iter().map(|line| line.parse()).collect()
}

/// Non-empty lines of an input file, without `#` comments.
fn parse_input(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves every identity on a rayon pool, skipping failures.
fn resolve_batch<R: RepositoryClient>(
    resolver: &Resolver<R>,
    idents: &[ArtifactIdent],
) -> Result<Vec<ArtifactSummary>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(resolver.config().parallelism)
        .build()
        .map_err(|e| PomGraphError::Config {
            message: format!("cannot start worker pool: {e}"),
        })?;
    let processed = AtomicUsize::new(0);

    let summaries: Vec<ArtifactSummary> = pool.install(|| {
        idents
            .par_iter()
            .filter_map(|ident| {
                let result = resolver.resolve_artifact(ident);
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 {
                    info!("processed {} artifacts", done);
                }
                match result {
                    Ok(resolved) => Some(ArtifactSummary::from(&resolved)),
                    Err(e) if e.is_not_found() => {
                        debug!("skipping {}: {}", ident, e);
                        None
                    }
                    Err(e) => {
                        error!("failed to resolve {}: {}", ident, e);
                        None
                    }
                }
            })
            .collect()
    });

    info!(
        "processed {} artifacts, collected {}",
        idents.len(),
        summaries.len()
    );
    Ok(summaries)
}
