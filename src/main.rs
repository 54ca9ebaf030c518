use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use depscope::analysis::Classifier;
use depscope::config::Config;
use depscope::dependencies::{normalize_package_name, DeclaredDependencies};
use depscope::discovery::{first_party_modules, FileFinder};
use depscope::environment::{find_site_packages, index_from_site_packages, InstalledIndex};
use depscope::imports::{extract_notebook_imports, ImportExtractor, UsageMap};
use depscope::manifest::load_project_manifest;
use depscope::report::{render, ReportFormat};
use depscope::stdlib::PythonVersion;

#[derive(Parser)]
#[command(name = "depscope")]
#[command(version = "0.1.0")]
#[command(about = "Dependency usage checker for Python projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check declared dependencies against actual imports
    Check {
        /// Project root to analyze (defaults to current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// site-packages directory (defaults to the project's .venv)
        #[arg(long)]
        site_packages: Option<PathBuf>,

        /// Report format
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Target Python version for stdlib membership, e.g. "3.11"
        #[arg(long)]
        python_version: Option<PythonVersion>,

        /// Skip .ipynb files
        #[arg(long)]
        ignore_notebooks: bool,
    },
    /// Show version information
    Version,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check {
            path,
            site_packages,
            format,
            python_version,
            ignore_notebooks,
        }) => match check(path, site_packages, format, python_version, ignore_notebooks) {
            Ok(issue_count) if issue_count == 0 => ExitCode::SUCCESS,
            Ok(_) => ExitCode::FAILURE,
            Err(err) => {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        },
        Some(Commands::Version) => {
            println!("depscope v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        None => {
            println!("depscope - Dependency usage checker for Python projects");
            println!("Run 'depscope check' to analyze the current project");
            println!("Run 'depscope --help' for more information");
            ExitCode::SUCCESS
        }
    }
}

/// Runs one full analysis and renders the report. Returns the issue count.
fn check(
    path: PathBuf,
    site_packages: Option<PathBuf>,
    format: ReportFormat,
    python_version: Option<PythonVersion>,
    ignore_notebooks: bool,
) -> anyhow::Result<usize> {
    let config = Config::from_pyproject(&path.join("pyproject.toml"))
        .context("failed to load configuration")?;

    let version = match python_version {
        Some(version) => version,
        None => match &config.python_version {
            Some(raw) => raw.parse().context("invalid python_version in config")?,
            None => PythonVersion::default(),
        },
    };

    let ignore_notebooks = ignore_notebooks || config.ignore_notebooks;
    let finder = if config.exclude.is_empty() {
        FileFinder::with_default_excludes(&config.extend_exclude, ignore_notebooks)
    } else {
        let mut patterns = config.exclude.clone();
        patterns.extend(config.extend_exclude.iter().cloned());
        FileFinder::new(&patterns, ignore_notebooks)
    }
    .context("invalid exclude pattern")?;

    let manifest = load_project_manifest(&path)?;
    let declared = DeclaredDependencies::from_raw(manifest.dependencies, &manifest.path);

    let mut extractor = ImportExtractor::new()?;
    let mut usage = UsageMap::new();
    for file in finder.find(&path) {
        let extracted = if file.extension().and_then(|e| e.to_str()) == Some("ipynb") {
            extract_notebook_imports(&mut extractor, &file)
        } else {
            extractor.extract_file(&file)
        };
        match extracted {
            Ok(occurrences) => {
                for occurrence in occurrences {
                    usage.add(occurrence);
                }
            }
            Err(err) => warn!("skipping {}: {err}", file.display()),
        }
    }

    let index = match site_packages.or_else(|| find_site_packages(&path)) {
        Some(site_packages) => index_from_site_packages(&site_packages)?,
        None => {
            warn!("no site-packages directory found; all imports will resolve as unknown");
            InstalledIndex::new()
        }
    };

    let mut first_party: BTreeSet<String> = first_party_modules(&path);
    first_party.extend(config.known_first_party.iter().cloned());
    if let Some(name) = &manifest.project_name {
        first_party.insert(normalize_package_name(name).replace('-', "_"));
    }

    let classifier = Classifier::new(&usage, &declared, &index, first_party, version, &config);
    let issues = classifier.classify();

    let stdout = io::stdout();
    render(format, &issues, &mut stdout.lock())?;
    Ok(issues.len())
}
