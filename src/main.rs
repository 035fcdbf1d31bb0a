use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use manifest_collector::collectors::collector_for;
use manifest_collector::config::Config;
use manifest_collector::file_types::ManifestKind;
use manifest_collector::reports::{
    DependencyReport, generate_json_report, generate_markdown_report, generate_summary,
};

#[derive(Parser)]
#[command(name = "manifest-collector")]
#[command(about = "Extract positioned dependencies from project manifests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Summary,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect the dependencies declared in a manifest
    Collect {
        /// Path to the manifest (requirements.txt, go.mod, pom.xml, package.json)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Go executable used to list imports
        #[arg(long)]
        go: Option<String>,

        /// package.json section to report (repeatable)
        #[arg(long = "section")]
        sections: Vec<String>,
    },
    /// Profile manifest parsing (for use with cargo-flamegraph)
    ProfileParse {
        /// Path to the manifest to parse
        #[arg(short, long)]
        file: PathBuf,

        /// Number of iterations (for meaningful profiling)
        #[arg(short, long, default_value = "1000")]
        iterations: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Collect {
            file,
            output,
            config,
            go,
            sections,
        } => run_collect(&file, output, config.as_deref(), go, sections).await,
        Commands::ProfileParse { file, iterations } => run_profile_parse(&file, iterations).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading config {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(Config::from_init_options(Some(value)))
}

fn detect_kind(file: &Path) -> anyhow::Result<ManifestKind> {
    match ManifestKind::detect_path(file) {
        Some(kind) => Ok(kind),
        None => bail!("Unsupported file type: {}", file.display()),
    }
}

async fn run_collect(
    file: &Path,
    output: OutputFormat,
    config_path: Option<&Path>,
    go: Option<String>,
    sections: Vec<String>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path).await?;
    if let Some(go) = go {
        config.go.executable = go;
    }
    if !sections.is_empty() {
        config.npm.sections = sections;
    }

    let kind = detect_kind(file)?;
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    let manifest = file.to_string_lossy();
    let collector = collector_for(kind, &manifest, &config)?;
    let dependencies = collector
        .collect(&content)
        .await
        .with_context(|| format!("collecting dependencies from {}", file.display()))?;

    tracing::info!(
        "Collected {} dependencies from {} ({})",
        dependencies.len(),
        file.display(),
        kind
    );

    let report = DependencyReport::new(&manifest, kind, &dependencies);
    match output {
        OutputFormat::Json => println!("{}", generate_json_report(&report)?),
        OutputFormat::Markdown => println!("{}", generate_markdown_report(&report)),
        OutputFormat::Summary => println!("{}", generate_summary(&report)),
    }

    Ok(())
}

async fn run_profile_parse(file: &Path, iterations: usize) -> anyhow::Result<()> {
    use manifest_collector::parsers::{
        Parser, gomod::GoModParser, package_json::PackageJsonParser, pom::PomParser,
        requirements::RequirementsParser,
    };

    let kind = detect_kind(file)?;
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;

    eprintln!("Profiling parse operations for: {}", file.display());
    eprintln!("Iterations: {iterations}");
    eprintln!("File size: {} bytes", content.len());

    let start = Instant::now();

    for _ in 0..iterations {
        match kind {
            ManifestKind::Requirements => {
                std::hint::black_box(RequirementsParser::new().parse(&content));
            }
            ManifestKind::GoMod => {
                // No toolchain here: module scan only
                std::hint::black_box(GoModParser::new().parse(&content, &[]));
            }
            ManifestKind::Pom => {
                std::hint::black_box(PomParser::new().parse(&content));
            }
            ManifestKind::PackageJson => {
                std::hint::black_box(PackageJsonParser::new().parse(&content)?);
            }
        }
    }

    let elapsed = start.elapsed();
    eprintln!("\nProfiling complete!");
    eprintln!("Total time: {elapsed:?}");
    eprintln!(
        "Average per iteration: {:?}",
        elapsed / iterations.max(1) as u32
    );

    Ok(())
}
