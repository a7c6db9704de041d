//! limbo-unpack - Command-line tool for unpacking LIMBO package files.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::Level;

use limbo::prelude::*;

/// Name list files loaded from the active project.
const LIST_PATTERN: &str = "*.filelist";

/// limbo-unpack - LIMBO package file extraction tool
#[derive(Parser, Debug)]
#[command(name = "limbo-unpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Package file to unpack
    input: PathBuf,

    /// Output directory [default: <input without extension>_unpack]
    output: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short = 'o', long)]
    overwrite: bool,

    /// Don't extract unknown files (also accepted as -nu)
    #[arg(long = "no-unknowns")]
    no_unknowns: bool,

    /// Be verbose
    #[arg(short, long)]
    verbose: bool,

    /// Projects directory holding current.txt and the project name lists
    #[arg(long, env = "LIMBO_PROJECTS")]
    projects: Option<PathBuf>,

    /// List the index instead of extracting
    #[arg(short, long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse_from(legacy_args(std::env::args_os()));
    init_logging(cli.verbose);

    let manager = ProjectManager::load(projects_root(cli.projects.as_deref()))
        .context("Failed to read projects directory")?;
    log::debug!("projects root: {}", manager.root().display());
    if manager.active_project().is_none() {
        println!("Warning: no active project loaded.");
    }

    let context = ProjectContext::load(&manager, LIST_PATTERN).context("Failed to load name lists")?;
    if let Some(project) = context.project() {
        println!(
            "Project {}: {} known names",
            project.name(),
            context.names().len()
        );
    }

    let source = MmapSource::open(&cli.input)
        .with_context(|| format!("Failed to open package {}", cli.input.display()))?;
    let extractor = Extractor::new(&source, &context).context("Failed to read package index")?;

    if cli.list {
        cmd_list(&extractor, &context);
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));

    cmd_extract(&extractor, &source, &output, &cli)
}

fn cmd_extract(
    extractor: &Extractor<'_, MmapSource>,
    source: &MmapSource,
    output: &Path,
    cli: &Cli,
) -> Result<()> {
    let total = extractor.package().len();
    println!(
        "Extracting {} entries from {} to {}...",
        total,
        source.name(),
        output.display()
    );

    let pb = if cli.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let bar = pb.clone();
    let options = ExtractOptions::default()
        .overwrite_existing(cli.overwrite)
        .extract_unknowns(!cli.no_unknowns)
        .verbose(cli.verbose)
        .on_progress(Arc::new(move |_: &Progress<'_>| bar.inc(1)));

    let start = Instant::now();
    let report = extractor
        .extract(output, &options)
        .context("Extraction failed")?;
    pb.finish_and_clear();

    println!(
        "Wrote {} files in {:?} ({} decompressed, {} left compressed, {} existing, {} unknown skipped, {} unreadable, {} rejected)",
        report.written,
        start.elapsed(),
        report.decompressed,
        report.fallbacks,
        report.skipped_existing,
        report.skipped_unknown,
        report.unreadable,
        report.rejected
    );

    Ok(())
}

fn cmd_list(extractor: &Extractor<'_, MmapSource>, context: &ProjectContext) {
    let mut known = 0;
    for entry in extractor.package() {
        let name = context.resolve(entry.name_hash);
        if name.is_some() {
            known += 1;
        }

        println!(
            "{:08X} {:>12} {:>12} {}",
            entry.name_hash,
            entry.offset,
            entry.size,
            name.as_deref().unwrap_or("<unknown>")
        );
    }

    println!(
        "\nTotal: {} entries ({} known)",
        extractor.package().len(),
        known
    );
}

/// Rewrite the historical `-nu` spelling, which clap cannot express as a short flag.
fn legacy_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg == "-nu" {
                OsString::from("--no-unknowns")
            } else {
                arg
            }
        })
        .collect()
}

/// `<input without extension>_unpack`
fn default_output(input: &Path) -> PathBuf {
    let mut name = input.with_extension("").into_os_string();
    name.push("_unpack");
    PathBuf::from(name)
}

/// Explicit root, else `projects/` next to the executable.
fn projects_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("projects")))
        .unwrap_or_else(|| PathBuf::from("projects"))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(
                buf,
                "{}: {}",
                level.as_str().to_ascii_lowercase(),
                record.args()
            ),
        })
        .init();
}
