use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use humansize::{format_size, BINARY};
use logsweep::{
    find_log_files, validate_access, FileOutcome, LogRewriter, RetentionOptions, RetentionPolicy,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prune old entries from application log files by date and severity",
    long_about = None
)]
struct Args {
    /// Directories to search for .log files (defaults to current directory)
    #[arg(default_values_t = vec![String::from(".")])]
    paths: Vec<String>,

    /// Days of logs to keep; 0 clears everything (subject to --level)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    days: i64,

    /// Copy each file to <name>.log.backup.<timestamp> before rewriting
    #[arg(long, short)]
    backup: bool,

    /// Custom date-matching regular expression (replaces the built-in patterns)
    #[arg(long)]
    pattern: Option<String>,

    /// Retain only lines of this severity (EMERGENCY..DEBUG); lines with no
    /// detectable level are always kept
    #[arg(long, short)]
    level: Option<String>,

    /// Stream through a temp file regardless of file size
    #[arg(long)]
    memory_efficient: bool,

    /// Write removed lines to a gzip archive next to each file
    #[arg(long, short)]
    compress: bool,

    /// Report what would be removed without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Recurse into subdirectories
    #[arg(long, short)]
    recursive: bool,

    /// Show backup/archive paths and the strategy used per file
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let options = RetentionOptions {
        days: args.days,
        level: args.level.clone(),
        pattern: args.pattern.clone(),
        dry_run: args.dry_run,
        backup: args.backup,
        compress: args.compress,
        memory_efficient: args.memory_efficient,
    };
    // All validation errors surface here, before any file is touched.
    let policy = RetentionPolicy::from_options(&options)?;
    let dry_run = policy.dry_run;

    let paths: Vec<PathBuf> = args.paths.iter().map(PathBuf::from).collect();
    let files = find_log_files(&paths, args.recursive);
    if files.is_empty() {
        println!(
            "{}",
            format!("No log files found in {}", args.paths.join(", ")).yellow()
        );
        return Ok(ExitCode::SUCCESS);
    }

    if !dry_run {
        validate_access(&files)?;
    }

    let rewriter = LogRewriter::new(policy);
    let mut total_removed: u64 = 0;
    let mut total_reclaimed: u64 = 0;
    for file in &files {
        let outcome = rewriter.process_file(file)?;
        report_file(&outcome, dry_run, args.verbose);
        total_removed += outcome.lines_removed;
        total_reclaimed += outcome.bytes_before.saturating_sub(outcome.bytes_after);
    }

    println!("========================================");
    println!(
        "Files processed: {}, lines removed: {}, size reclaimed: {}",
        files.len(),
        total_removed,
        format_size(total_reclaimed, BINARY).bold()
    );
    if dry_run {
        println!("{}", "Dry run mode: no files were modified.".yellow());
    }

    Ok(ExitCode::SUCCESS)
}

fn report_file(outcome: &FileOutcome, dry_run: bool, verbose: bool) {
    let verb = if dry_run { "would remove" } else { "removed" };
    println!(
        "{}: {} {} of {} lines ({} -> {})",
        outcome.path.display().to_string().bold(),
        verb,
        outcome.lines_removed,
        outcome.lines_examined,
        format_size(outcome.bytes_before, BINARY),
        format_size(outcome.bytes_after, BINARY)
    );

    if verbose {
        let strategy = if outcome.streamed {
            "streaming"
        } else {
            "in-memory"
        };
        println!("  strategy: {}", strategy);
        if let Some(backup) = &outcome.backup_path {
            println!("  backup:   {}", backup.display().to_string().green());
        }
        if let Some(archive) = &outcome.archive_path {
            println!("  archive:  {}", archive.display().to_string().green());
        }
    }
}
