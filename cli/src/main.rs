//! plugin-sync - Command-line interface for the sync engine.
//!
//! Mirrors allowlisted plugin files from a source-of-truth repository into
//! a downstream packaging repository. Three subcommands: `sync` (preview by
//! default, `--commit` to apply), `diff`, and `status`.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{Command as ProcessCommand, Stdio};

use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::TextDiff;

use engine::reconcile::reconcile;
use engine::state::{Side, StateStore};
use engine::sync::{self, DiffClass, PlanAction, SyncObserver};
use engine::{FileSelection, SyncError};

/// Files and directories eligible for syncing. Entries ending in `/` are
/// expanded recursively; the rest are exact file names at the source root.
const ALLOWLIST: &[&str] = &[
    "src/",
    "scripts/",
    "manifest.yml",
    "package.json",
    "package-lock.json",
    "webpack.config.js",
    "tsconfig.json",
    "Makefile",
    ".eslintignore",
    "LICENSE",
];

/// Build output inside allowlisted directories, excluded from syncing.
const IGNORELIST: &[&str] = &["src/version.ts"];

/// plugin-sync - propagate plugin sources into a packaging repository
#[derive(Parser, Debug)]
#[command(name = "plugin-sync")]
#[command(version = "0.1.0")]
#[command(about = "Mirror allowlisted plugin files into a downstream target directory")]
struct Args {
    /// Plugin source directory
    #[arg(long, value_name = "PATH", default_value = ".")]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview or apply a one-way sync into the target
    Sync {
        /// Target directory
        target: PathBuf,

        /// Apply changes (default is a read-only preview)
        #[arg(long)]
        commit: bool,

        /// Bypass the target-drift confirmation
        #[arg(long)]
        force: bool,
    },
    /// Show live differences between source and target
    Diff {
        /// Target directory
        target: PathBuf,
    },
    /// Classify tracked files against the last sync snapshot
    Status {
        /// Target directory
        target: PathBuf,
    },
}

/// Asks the operator yes/no questions.
///
/// The terminal implementation declines automatically when stdin is not a
/// terminal, so automated runs always take the non-destructive path.
trait Prompter {
    fn confirm(&self, question: &str) -> bool;
}

/// Prompter backed by the interactive terminal.
struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str) -> bool {
        if !io::stdin().is_terminal() {
            return false;
        }
        print!("{} [y/N] ", question);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

fn info(msg: &str) {
    println!("{}", msg.green());
}

fn warn(msg: &str) {
    println!("{}", msg.yellow());
}

fn header(msg: &str) {
    println!("{}", msg.cyan().bold());
}

/// The fixed plugin file selection.
fn plugin_selection() -> FileSelection {
    FileSelection::new(ALLOWLIST, IGNORELIST)
}

/// Best-effort short revision of the source checkout; "unknown" whenever
/// the lookup fails for any reason.
fn git_short_rev(source: &Path) -> String {
    ProcessCommand::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(source)
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Validate the target directory, offering interactive creation only when
/// the caller authorized it (commit mode).
fn validate_target(
    target: &Path,
    create_ok: bool,
    prompter: &dyn Prompter,
) -> Result<PathBuf, String> {
    if !target.is_dir() {
        if !create_ok {
            return Err(SyncError::TargetNotFound {
                path: target.to_path_buf(),
            }
            .to_string());
        }
        warn(&format!(
            "Target directory does not exist: {}",
            target.display()
        ));
        if prompter.confirm("Create it?") {
            fs::create_dir_all(target)
                .map_err(|e| format!("Failed to create {}: {}", target.display(), e))?;
            info(&format!("Created {}", target.display()));
        } else {
            return Err("Aborted — target directory does not exist".to_string());
        }
    }
    Ok(target.to_path_buf())
}

/// Prints files as they are copied or deleted during a commit.
struct CliObserver;

impl SyncObserver for CliObserver {
    fn file_copied(&self, rel: &str) {
        println!("  {}", rel);
    }

    fn file_deleted(&self, rel: &str) {
        println!("  {}", format!("deleted: {}", rel).red());
    }
}

fn cmd_sync(
    source: &Path,
    target: &Path,
    commit: bool,
    force: bool,
    prompter: &dyn Prompter,
) -> Result<(), String> {
    let target = validate_target(target, commit, prompter)?;

    header(&format!(
        "Syncing {} -> {}",
        source.display(),
        target.display()
    ));
    println!();

    let selection = plugin_selection();
    let files = selection.resolve(source).map_err(|e| e.to_string())?;
    if files.is_empty() {
        return Err(SyncError::EmptyFileSet.to_string());
    }

    if !commit {
        info("PREVIEW — files that would be synced (pass --commit to apply):");
        println!();
        let plan = sync::preview(source, &target, &files).map_err(|e| e.to_string())?;
        for (rel, action) in plan {
            match action {
                PlanAction::Create => println!("  {}", format!("+ {}", rel).green()),
                PlanAction::Update => println!("  {}", format!("~ {}", rel).yellow()),
            }
        }
        println!();
        info(&format!("Total: {} files in allowlist", files.len()));
        return Ok(());
    }

    let state = StateStore::for_source(source);

    if !force {
        let drifted = sync::target_drift(&state, &target, &files).map_err(|e| e.to_string())?;
        if !drifted.is_empty() {
            println!();
            warn("Warning: The following files were modified in the target since last sync:");
            for rel in &drifted {
                println!("  {}", rel.yellow());
            }
            println!();
            if !prompter.confirm("Overwrite target changes?") {
                return Err(
                    "Aborted — target has local modifications. Use 'diff' to review".to_string(),
                );
            }
        }
    }

    let outcome = sync::apply(source, &target, &files, &selection, &CliObserver)
        .map_err(|e| e.to_string())?;

    println!();
    state
        .save(source, &target, &files, &git_short_rev(source))
        .map_err(|e| e.to_string())?;
    info(&format!(
        "Sync complete — {} copied, {} unchanged, {} deleted ({} total)",
        outcome.copied, outcome.unchanged, outcome.deleted, outcome.total
    ));

    println!();
    warn("Reminder: Run 'npm run build' in the target to regenerate static assets.");
    if target.join("manifest.yml").is_file() {
        warn("Reminder: Check that app.id in the target's manifest.yml is correct for the enterprise app.");
    }

    Ok(())
}

/// Print a unified diff for a modified file, or a binary-differs note when
/// either side is not valid UTF-8.
fn print_modified_diff(source: &Path, target: &Path, rel: &str) -> Result<(), String> {
    let read = |root: &Path| {
        let full = root.join(rel);
        fs::read(&full).map_err(|e| {
            SyncError::ReadError {
                path: full,
                source: e,
            }
            .to_string()
        })
    };
    let src_bytes = read(source)?;
    let dst_bytes = read(target)?;

    match (String::from_utf8(src_bytes), String::from_utf8(dst_bytes)) {
        (Ok(src_text), Ok(dst_text)) => {
            let diff = TextDiff::from_lines(&src_text, &dst_text);
            print!(
                "{}",
                diff.unified_diff()
                    .header(&format!("source/{}", rel), &format!("target/{}", rel))
            );
            println!();
        }
        _ => {
            println!("  (binary file differs)");
            println!();
        }
    }
    Ok(())
}

fn cmd_diff(source: &Path, target: &Path, prompter: &dyn Prompter) -> Result<(), String> {
    let target = validate_target(target, false, prompter)?;

    header(&format!(
        "Diff: {} <-> {}",
        source.display(),
        target.display()
    ));
    println!();

    let selection = plugin_selection();
    let files = selection.resolve(source).map_err(|e| e.to_string())?;

    let (entries, extras) =
        sync::compare_trees(source, &target, &files, &selection).map_err(|e| e.to_string())?;

    let mut source_only = 0;
    let mut target_only = 0;
    let mut modified = 0;
    let mut identical = 0;

    for (rel, class) in &entries {
        match class {
            DiffClass::SourceOnly => {
                println!("{}", format!("+ [source only] {}", rel).green());
                source_only += 1;
            }
            DiffClass::TargetOnly => {
                println!("{}", format!("- [target only] {}", rel).red());
                target_only += 1;
            }
            DiffClass::Modified => {
                println!("{}", format!("~ [modified]    {}", rel).yellow());
                print_modified_diff(source, &target, rel)?;
                modified += 1;
            }
            DiffClass::Identical => identical += 1,
        }
    }

    for rel in &extras {
        println!("{}", format!("- [target only] {}", rel).red());
        target_only += 1;
    }

    println!();
    println!("-------------------------------------------");
    if source_only + target_only + modified > 0 {
        println!(
            "  {}  {}  {}  Identical: {}",
            format!("Source only: {}", source_only).green(),
            format!("Target only: {}", target_only).red(),
            format!("Modified: {}", modified).yellow(),
            identical
        );
    } else {
        info("No differences — source and target are in sync.");
    }

    Ok(())
}

fn cmd_status(source: &Path, target: &Path, prompter: &dyn Prompter) -> Result<(), String> {
    let target = validate_target(target, false, prompter)?;

    let state = StateStore::for_source(source);
    if !state.has_snapshot() {
        return Err(SyncError::NoSyncState.to_string());
    }

    header(&format!(
        "Sync status: {} <-> {}",
        source.display(),
        target.display()
    ));
    println!();

    match state.load_meta().map_err(|e| e.to_string())? {
        Some(meta) => {
            println!("Last sync: {}", meta.timestamp);
            println!("Commit:    {}", meta.source_commit);
        }
        None => {
            println!("Last sync: ?");
            println!("Commit:    ?");
        }
    }
    println!();

    let files = plugin_selection().resolve(source).map_err(|e| e.to_string())?;
    let old_source = state.load_manifest(Side::Source).map_err(|e| e.to_string())?;
    let old_target = state.load_manifest(Side::Target).map_err(|e| e.to_string())?;

    let report =
        reconcile(&files, source, &target, &old_source, &old_target).map_err(|e| e.to_string())?;

    if !report.source_changed.is_empty() {
        println!(
            "{}",
            format!("Source changed ({}):", report.source_changed.len()).green()
        );
        for rel in &report.source_changed {
            println!("  {}", rel);
        }
        println!();
    }

    if !report.target_changed.is_empty() {
        println!(
            "{}",
            format!("Target changed ({}):", report.target_changed.len()).yellow()
        );
        for rel in &report.target_changed {
            println!("  {}", rel);
        }
        println!();
    }

    if !report.conflicts.is_empty() {
        println!(
            "{}",
            format!(
                "Conflicts — both sides changed ({}):",
                report.conflicts.len()
            )
            .red()
        );
        for rel in &report.conflicts {
            println!("  {}", rel);
        }
        println!();
    }

    if report.is_clean() {
        info("No changes since last sync.");
    }

    Ok(())
}

/// Dispatch a parsed command. Separated from `main` for testability; exit
/// codes are assigned only at the outermost boundary.
fn run_cli(args: &Args, prompter: &dyn Prompter) -> Result<(), String> {
    match &args.command {
        Command::Sync {
            target,
            commit,
            force,
        } => cmd_sync(&args.source, target, *commit, *force, prompter),
        Command::Diff { target } => cmd_diff(&args.source, target, prompter),
        Command::Status { target } => cmd_status(&args.source, target, prompter),
    }
}

fn main() {
    let args = Args::parse();

    let exit_code = match run_cli(&args, &TerminalPrompter) {
        Ok(()) => 0,
        Err(msg) => {
            eprintln!("{}", format!("Error: {}", msg).red());
            1
        }
    };

    std::process::exit(exit_code);
}
