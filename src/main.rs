//! gfi - inventory file trees and reconcile inventories.
//!
//! Usage:
//!   gfi get ROOTS...        Write a snapshot of one or more trees
//!   gfi diff SNAPSHOTS...   Report field differences between snapshots
//!   gfi sum TABLES...       Join one column across delimited tables
//!   gfi size ROOTS...       Write per-directory size totals
//!   gfi --help              Show help

mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gfi_core::snapshot;
use gfi_core::table::{parse_delimiter, write_rows};
use gfi_core::{
    ErrorPolicy, KindFilter, PathFilter, SnapshotFormat, SortSpec, WalkConfig, remote_path,
};
use gfi_reconcile::{
    AggregateConfig, Aggregator, ReconcileConfig, Reconciler, load_sources, load_tables,
};
use gfi_scan::{BuildReport, DIR_SUMMARY_HEADER, InventoryBuilder, ScanProgress, summarize_dirs};

use settings::Settings;

#[derive(Parser)]
#[command(
    name = "gfi",
    version,
    about = "Get file information and reconcile it across trees",
    long_about = "gfi captures file trees as inventory snapshots and compares \
                  snapshots field by field.\n\n\
                  Run `gfi get` on each tree, then `gfi diff` on the snapshots."
)]
struct Cli {
    /// Settings file (defaults to <config dir>/gfi/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "gfi_scan=debug" (RUST_LOG wins when set)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Do not print progress
    #[arg(long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk directory trees and write one inventory snapshot
    Get {
        /// Root directories (glob patterns allowed)
        #[arg(required = true)]
        roots: Vec<String>,

        /// Output path (defaults to <cwd>/<timestamp>.<ext>)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sort entries by full path
        #[arg(short, long)]
        sort: bool,

        /// Skip entries that cannot be read
        #[arg(short = 'e', long = "err")]
        skip_errors: bool,

        /// Snapshot format (defaults to the output extension, else csv)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Read the roots through the administrative share of HOST
        #[arg(long)]
        host: Option<String>,

        /// Walker threads (defaults to every core)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Descend into symlinked directories
        #[arg(long)]
        follow_symlinks: bool,

        #[command(flatten)]
        patterns: PatternArgs,

        #[command(flatten)]
        kinds: KindArgs,
    },

    /// Reconcile two or more snapshots
    Diff {
        /// Snapshot files (glob patterns allowed)
        #[arg(required = true)]
        sources: Vec<String>,

        /// Output path (defaults to <cwd>/<timestamp>.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sort columns, comma separated (ex: 1,2,0)
        #[arg(short = 's', long = "sorts", default_value = "0,1")]
        sorts: SortSpec,

        #[command(flatten)]
        patterns: PatternArgs,

        #[command(flatten)]
        kinds: KindArgs,
    },

    /// Join one value column across delimited tables by a key column
    Sum {
        /// Table files (glob patterns allowed)
        #[arg(required = true)]
        tables: Vec<String>,

        /// Output path (defaults to <cwd>/<timestamp>.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Key column number
        #[arg(short, long, default_value_t = 0)]
        key: usize,

        /// Value column number
        #[arg(short, long = "val", default_value_t = 1)]
        value: usize,

        /// Input delimiter: one character, or "tab" (defaults to tab)
        #[arg(short = 'D', long)]
        delimiter: Option<String>,

        /// Sort columns, comma separated (ex: 0,1,2)
        #[arg(short = 's', long = "sorts", default_value = "0")]
        sorts: SortSpec,

        #[command(flatten)]
        patterns: PatternArgs,
    },

    /// Walk directory trees and write per-directory totals
    Size {
        /// Root directories (glob patterns allowed)
        #[arg(required = true)]
        roots: Vec<String>,

        /// Output path (defaults to <cwd>/<timestamp>.tsv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sort columns, comma separated (defaults to full path order)
        #[arg(short = 's', long = "sorts")]
        sorts: Option<SortSpec>,

        /// Skip directories that cannot be read
        #[arg(short = 'e', long = "err")]
        skip_errors: bool,

        /// Walker threads (defaults to every core)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        #[command(flatten)]
        patterns: PatternArgs,
    },
}

#[derive(Args, Clone)]
struct PatternArgs {
    /// Keep only paths matching this regex (repeatable)
    #[arg(short = 'm', long = "match")]
    matches: Vec<String>,

    /// Drop paths matching this regex, even if matched (repeatable)
    #[arg(short = 'i', long = "ignore")]
    ignores: Vec<String>,
}

#[derive(Args, Clone, Copy)]
struct KindArgs {
    /// Files only
    #[arg(short = 'f', long = "file")]
    files_only: bool,

    /// Directories only
    #[arg(short = 'd', long = "dir", conflicts_with = "files_only")]
    dirs_only: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Tsv,
    Json,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Json => Self::Json,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| settings.log_level.clone())
        .unwrap_or_else(|| "warn".to_string());
    setup_logging(&level)?;

    match cli.command {
        Command::Get {
            roots,
            out,
            sort,
            skip_errors,
            format,
            host,
            threads,
            follow_symlinks,
            patterns,
            kinds,
        } => {
            let mut roots = expand_globs(&roots);
            if let Some(host) = host.as_deref() {
                roots = roots.iter().map(|r| remote_path(host, r)).collect();
            }
            let filter = build_filter(&patterns, &settings)?.with_kind(kind_filter(kinds));
            let config = WalkConfig::builder()
                .roots(roots)
                .filter(filter)
                .threads(threads.or(settings.threads).unwrap_or(0))
                .follow_symlinks(follow_symlinks)
                .error_policy(ErrorPolicy::from_skip(skip_errors || settings.skip_errors))
                .sort(sort)
                .build()
                .map_err(|e| eyre!("{e}"))?;
            let format = format.map(SnapshotFormat::from).or(settings.format);
            run_get(&config, out, format, cli.silent)?;
        }
        Command::Diff {
            sources,
            out,
            sorts,
            patterns,
            kinds,
        } => {
            let filter = build_filter(&patterns, &settings)?.with_kind(kind_filter(kinds));
            let config = ReconcileConfig::builder()
                .filter(filter)
                .sort(sorts)
                .build()
                .map_err(|e| eyre!("{e}"))?;
            run_diff(&expand_globs(&sources), config, out)?;
        }
        Command::Sum {
            tables,
            out,
            key,
            value,
            delimiter,
            sorts,
            patterns,
        } => {
            let delimiter = match delimiter.or_else(|| settings.delimiter.clone()) {
                Some(text) => parse_delimiter(&text)?,
                None => b'\t',
            };
            let config = AggregateConfig::builder()
                .key_column(key)
                .value_column(value)
                .filter(build_filter(&patterns, &settings)?)
                .sort(sorts)
                .build()
                .map_err(|e| eyre!("{e}"))?;
            run_sum(&expand_globs(&tables), delimiter, config, out)?;
        }
        Command::Size {
            roots,
            out,
            sorts,
            skip_errors,
            threads,
            patterns,
        } => {
            let config = WalkConfig::builder()
                .roots(expand_globs(&roots))
                .threads(threads.or(settings.threads).unwrap_or(0))
                .error_policy(ErrorPolicy::from_skip(skip_errors || settings.skip_errors))
                .sort(true)
                .build()
                .map_err(|e| eyre!("{e}"))?;
            let filter = build_filter(&patterns, &settings)?;
            run_size(&config, &filter, sorts, out, cli.silent)?;
        }
    }

    Ok(())
}

/// Walk the roots and write one snapshot.
fn run_get(
    config: &WalkConfig,
    out: Option<PathBuf>,
    format: Option<SnapshotFormat>,
    silent: bool,
) -> Result<()> {
    let report = build_inventory(config, silent)?;
    if report.is_empty() {
        println!("There is no information to get.");
        return Ok(());
    }

    let format = format
        .or_else(|| out.as_deref().map(SnapshotFormat::from_path))
        .unwrap_or_default();
    let out = match out {
        Some(path) => path,
        None => default_output(format.extension())?,
    };

    snapshot::write_inventory(&out, &report.inventory, format)
        .wrap_err("Failed to write snapshot")?;
    println!("Write to [{}]. ([{}] row)", out.display(), report.inventory.count);

    if !silent {
        let files = report.inventory.iter().filter(|e| !e.is_dir()).count();
        let bytes: u64 = report.inventory.iter().map(|e| e.size_bytes()).sum();
        eprintln!(
            " {} files, {} directories, {} in {:.2}s",
            files,
            report.inventory.count - files,
            format_size(bytes),
            report.elapsed.as_secs_f64()
        );
        if report.has_warnings() {
            eprintln!(" {} warning(s) during scan", report.warnings.len());
        }
    }

    Ok(())
}

/// Reconcile snapshots and write the differences.
fn run_diff(paths: &[PathBuf], config: ReconcileConfig, out: Option<PathBuf>) -> Result<()> {
    let sources = load_sources(paths).wrap_err("Failed to load snapshots")?;
    let report = Reconciler::with_config(config).reconcile(&sources)?;

    if !report.has_differences() {
        println!("There is no difference !");
        return Ok(());
    }

    let out = output_or_default(out, "csv")?;
    write_rows(&out, &report.header, report.to_rows(), delimiter_for(&out))
        .wrap_err("Failed to write differences")?;
    println!("Write to [{}]. ([{}] row)", out.display(), report.len());
    Ok(())
}

/// Join tables on a key column and write the result.
fn run_sum(
    paths: &[PathBuf],
    delimiter: u8,
    config: AggregateConfig,
    out: Option<PathBuf>,
) -> Result<()> {
    let tables = load_tables(paths, delimiter).wrap_err("Failed to load tables")?;
    let report = Aggregator::with_config(config).aggregate(&tables)?;

    if report.is_empty() {
        println!("There is no output !");
        return Ok(());
    }

    let out = output_or_default(out, "csv")?;
    write_rows(&out, &report.header, report.to_rows(), delimiter_for(&out))
        .wrap_err("Failed to write table")?;
    println!("Write to [{}]. ([{}] row)", out.display(), report.len());
    Ok(())
}

/// Walk the roots and write a subtree total for every directory.
fn run_size(
    config: &WalkConfig,
    filter: &PathFilter,
    sorts: Option<SortSpec>,
    out: Option<PathBuf>,
    silent: bool,
) -> Result<()> {
    let report = build_inventory(config, silent)?;
    let summaries: Vec<_> = summarize_dirs(&report.inventory)
        .into_iter()
        .filter(|s| filter.matches_key(&s.entry.key))
        .collect();

    if summaries.is_empty() {
        println!("There is no information to get.");
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = summaries.iter().map(|s| s.to_row()).collect();
    if let Some(sorts) = sorts {
        sorts.validate(DIR_SUMMARY_HEADER.len())?;
        sorts.sort_rows(&mut rows);
    }

    let out = output_or_default(out, "tsv")?;
    write_rows(&out, &DIR_SUMMARY_HEADER, &rows, delimiter_for(&out))
        .wrap_err("Failed to write sizes")?;
    println!("Write to [{}]. ([{}] row)", out.display(), rows.len());

    if !silent {
        let bytes: u64 = report
            .inventory
            .iter()
            .filter(|e| !e.is_dir())
            .map(|e| e.size_bytes())
            .sum();
        eprintln!(
            " {} directories, {} in {:.2}s",
            summaries.len(),
            format_size(bytes),
            report.elapsed.as_secs_f64()
        );
    }

    Ok(())
}

/// Build an inventory, printing a running count unless silent.
fn build_inventory(config: &WalkConfig, silent: bool) -> Result<BuildReport> {
    let builder = InventoryBuilder::new();
    let printer = (!silent).then(|| spawn_progress_printer(builder.subscribe()));

    let result = builder.build(config);
    drop(builder);
    if let Some(handle) = printer {
        let _ = handle.join();
    }

    result.wrap_err("Scan failed")
}

/// Print `Count: N` on stderr for each progress update until the sender closes.
fn spawn_progress_printer(mut rx: broadcast::Receiver<ScanProgress>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut printed = false;
        loop {
            match rx.blocking_recv() {
                Ok(progress) => {
                    eprint!("Count: {}\r", progress.entries_found);
                    let _ = std::io::stderr().flush();
                    printed = true;
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        if printed {
            eprintln!();
        }
    })
}

/// Compile include/exclude patterns; command-line lists replace settings lists.
fn build_filter(patterns: &PatternArgs, settings: &Settings) -> Result<PathFilter> {
    let matches = if patterns.matches.is_empty() { &settings.matches } else { &patterns.matches };
    let ignores = if patterns.ignores.is_empty() { &settings.ignores } else { &patterns.ignores };
    Ok(PathFilter::new(matches, ignores)?)
}

fn kind_filter(kinds: KindArgs) -> KindFilter {
    KindFilter::from_flags(kinds.files_only, kinds.dirs_only)
}

/// Expand glob patterns; a pattern matching nothing is kept as given.
fn expand_globs(args: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for arg in args {
        let matched: Vec<PathBuf> = match glob::glob(arg) {
            Ok(iter) => iter.filter_map(Result::ok).collect(),
            Err(err) => {
                debug!(pattern = %arg, "not a glob pattern: {err}");
                Vec::new()
            }
        };
        if matched.is_empty() {
            paths.push(PathBuf::from(arg));
        } else {
            paths.extend(matched);
        }
    }
    paths
}

fn output_or_default(out: Option<PathBuf>, extension: &str) -> Result<PathBuf> {
    match out {
        Some(path) => Ok(path),
        None => default_output(extension),
    }
}

/// `<cwd>/YYYYMMDD-HHMMSS.mmm.<ext>`
fn default_output(extension: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir().wrap_err("Cannot resolve working directory")?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
    Ok(cwd.join(format!("{stamp}.{extension}")))
}

fn delimiter_for(path: &Path) -> u8 {
    SnapshotFormat::from_path(path).delimiter()
}

fn setup_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {e}"))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_diff_defaults() {
        let cli = Cli::parse_from(["gfi", "diff", "a.csv", "b.csv"]);
        let Command::Diff { sources, sorts, .. } = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(sources, vec!["a.csv", "b.csv"]);
        assert_eq!(sorts.columns(), &[0, 1]);
    }

    #[test]
    fn test_file_and_dir_flags_conflict() {
        assert!(Cli::try_parse_from(["gfi", "get", "-f", "-d", "."]).is_err());
    }

    #[test]
    fn test_expand_globs() {
        let temp = tempfile::TempDir::new().unwrap();
        fs::write(temp.path().join("a.csv"), "").unwrap();
        fs::write(temp.path().join("b.csv"), "").unwrap();
        fs::write(temp.path().join("c.txt"), "").unwrap();

        let pattern = temp.path().join("*.csv").to_string_lossy().into_owned();
        let missing = temp.path().join("none-*").to_string_lossy().into_owned();
        let paths = expand_globs(&[pattern, missing.clone()]);

        assert_eq!(
            paths,
            vec![
                temp.path().join("a.csv"),
                temp.path().join("b.csv"),
                PathBuf::from(missing)
            ]
        );
    }

    #[test]
    fn test_cli_patterns_replace_settings() {
        let settings = Settings {
            ignores: vec!["x".to_string()],
            matches: vec!["y".to_string()],
            ..Settings::default()
        };
        let patterns = PatternArgs {
            matches: Vec::new(),
            ignores: vec!["z".to_string()],
        };
        let filter = build_filter(&patterns, &settings).unwrap();
        assert!(filter.matches_key("xy"));
        assert!(!filter.matches_key("yz"));
        assert!(!filter.matches_key("x"));
    }

    #[test]
    fn test_default_output_name() {
        let path = default_output("csv").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), "20240101-000000.000.csv".len());
        assert!(name.ends_with(".csv"));
    }
}
