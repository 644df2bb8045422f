//! chart-bumper - Keeps Helm charts current.
//!
//! Updates `# bump:` annotated image references and chart dependencies, then bumps the
//! chart version by the size of the change since a base revision.

use std::error::Error;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chart_bumper::bump::{self, BaseSource, BumpOptions, Collaborators, DEFAULT_SCAN_GLOBS};
use chart_bumper::directives::scan_files;
use chart_bumper::document::Document;
use chart_bumper::logging;
use chart_bumper::resolve::{
    DependencyIndex, DigestResolver, GitHistory, HistoricalContentReader, StaticIndex, StaticRegistry, TagLister,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info_span, Span};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "chart-bumper", version, about)]
struct Cli {
    /// Log verbosity; 6 or higher shows debug events. RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbosity", global = true, default_value_t = 0)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Update annotated images and dependencies, then bump the chart version.
    Bump(BumpArgs),
    /// List the `# bump:` directives of files.
    Scan {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print directives as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the scalar at an address such as `$.image.tag`.
    Get { file: PathBuf, address: String },
    /// Set the scalar at an address, printing the result unless --write is given.
    Set {
        file: PathBuf,
        address: String,
        value: String,
        #[arg(long)]
        write: bool,
    },
}

#[derive(Debug, Args)]
struct BumpArgs {
    /// Current Chart.yaml.
    #[arg(long)]
    cur: PathBuf,

    /// Base Chart.yaml to compare against.
    #[arg(long, conflicts_with = "base_ref", required_unless_present = "base_ref")]
    base: Option<PathBuf>,

    /// Git revision holding the base Chart.yaml, e.g. origin/main or HEAD~1.
    #[arg(long)]
    base_ref: Option<String>,

    /// Repository-relative path of the base Chart.yaml (defaults to --cur).
    #[arg(long, requires = "base_ref")]
    base_ref_path: Option<String>,

    /// Git repository used with --base-ref.
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Write changes to disk instead of printing the new Chart.yaml.
    #[arg(long)]
    write: bool,

    /// Update images annotated with `# bump:` (requires --write).
    #[arg(long, requires = "registry")]
    update_images: bool,

    /// Registry fixture answering tag and digest lookups.
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Update Chart.yaml dependencies from their chart repositories (requires --write).
    #[arg(long, requires = "index")]
    update_deps: bool,

    /// Chart index fixture answering repository index lookups.
    #[arg(long)]
    index: Option<PathBuf>,

    /// Comma-separated file patterns, relative to the chart directory, scanned for directives.
    #[arg(long, default_value = DEFAULT_SCAN_GLOBS)]
    scan_glob: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbosity) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let span = info_span!("chart-bumper");
    match run(cli.command, &span) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Command, span: &Span) -> CliResult<()> {
    match command {
        Command::Bump(args) => run_bump(args, span),
        Command::Scan { files, json } => run_scan(&files, json, span),
        Command::Get { file, address } => {
            let doc = Document::parse(&read(&file)?)?;
            match doc.get_string(&address)? {
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => Err(format!("{}: {} not found", file.display(), address).into()),
            }
        }
        Command::Set {
            file,
            address,
            value,
            write,
        } => {
            let mut doc = Document::parse(&read(&file)?)?;
            doc.set_string(&address, &value)?;
            if write {
                bump::write_if_changed(&file, &doc.to_bytes())?;
            } else {
                io::stdout().write_all(&doc.to_bytes())?;
            }
            Ok(())
        }
    }
}

fn read(file: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(file).map_err(|e| format!("{}: {}", file.display(), e).into())
}

fn run_scan(files: &[PathBuf], json: bool, span: &Span) -> CliResult<()> {
    let directives = scan_files(files, span)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&directives)?);
        return Ok(());
    }
    for d in &directives {
        println!(
            "{}:{}: {} image={} strategy={} current={}",
            d.file.display(),
            d.line,
            d.address,
            d.image,
            d.strategy,
            d.current_text
        );
    }
    Ok(())
}

fn run_bump(args: BumpArgs, span: &Span) -> CliResult<()> {
    let span = info_span!(parent: span, "bump", chart = %args.cur.display());

    let history = match &args.base_ref {
        Some(_) => Some(GitHistory::open(&args.repo, &span)?),
        None => None,
    };
    let base = match (&args.base, &args.base_ref) {
        (Some(file), _) => BaseSource::File(file.clone()),
        (None, Some(revision)) => BaseSource::Revision {
            revision: revision.clone(),
            path: args
                .base_ref_path
                .clone()
                .unwrap_or_else(|| args.cur.to_string_lossy().replace('\\', "/")),
        },
        (None, None) => return Err("one of --base or --base-ref is required".into()),
    };
    let registry = args.registry.as_deref().map(StaticRegistry::from_file).transpose()?;
    let index = args.index.as_deref().map(StaticIndex::from_file).transpose()?;

    let collaborators = Collaborators {
        tags: registry.as_ref().map(|r| r as &dyn TagLister),
        digests: registry.as_ref().map(|r| r as &dyn DigestResolver),
        index: index.as_ref().map(|i| i as &dyn DependencyIndex),
        history: history.as_ref().map(|h| h as &dyn HistoricalContentReader),
    };
    let options = BumpOptions {
        chart: args.cur.clone(),
        base,
        write: args.write,
        update_images: args.update_images,
        update_deps: args.update_deps,
        scan_globs: args.scan_glob.clone(),
    };

    let report = bump::run(&options, collaborators, &span)?;
    if !args.write {
        io::stdout().write_all(&report.chart.output)?;
    }
    write_github_output(report.changed())?;
    Ok(())
}

/// Appends `changed=<bool>` to the file named by `GITHUB_OUTPUT`, when set.
fn write_github_output(changed: bool) -> CliResult<()> {
    let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "changed={}", changed)?;
    Ok(())
}
