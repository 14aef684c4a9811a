//! Chapter-Scout main entry point
//!
//! This is the command-line interface for the Chapter-Scout bookmark checker.

use anyhow::Context;
use chapter_scout::config::{load_config, validate, Config};
use chapter_scout::output::{
    open_candidates, render_scan_failures, wait_for_enter, CommandOpener, OpenFilter, Report,
};
use chapter_scout::probe::{listen_for_interrupts, run_check, Shutdown};
use chapter_scout::scan::{BumpOptions, BumpPlan};
use chapter_scout::state::StatusKind;
use chapter_scout::SiteRegistry;
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Chapter-Scout: a polite manga chapter checker
///
/// Chapter-Scout reads a folder of chapter bookmarks, checks each site for
/// newer chapters one request at a time per site, and opens the ones worth
/// a look in your browser.
#[derive(Parser, Debug)]
#[command(name = "chapter-scout")]
#[command(version = "1.0.0")]
#[command(about = "A polite manga chapter checker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every bookmark under a directory and open the interesting ones
    Check(CheckArgs),

    /// Move a bookmark on to a later chapter
    Bump(BumpArgs),

    /// List the sites chapters can be checked on
    Sites {
        /// Path to TOML configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Directory of bookmark files (.url, .desktop, .webloc)
    #[arg(value_name = "DIR")]
    directory: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Domains to skip (repeatable or comma-separated)
    #[arg(long = "skip", value_name = "DOMAIN", value_delimiter = ',')]
    skip: Vec<String>,

    /// Program used to open URLs
    #[arg(long, value_name = "BIN")]
    opener: Option<String>,

    /// Open results without waiting for enter
    #[arg(long, overrides_with = "prompt")]
    no_prompt: bool,

    /// Wait for enter before opening results
    #[arg(long, overrides_with = "no_prompt")]
    prompt: bool,

    /// Seconds each site waits between two bookmarks
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Milliseconds to wait between opening two URLs
    #[arg(long, value_name = "MS")]
    open_delay_ms: Option<u64>,

    /// Number of sites checked at the same time
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Do not open chapters too early to check
    #[arg(long)]
    skip_tiny: bool,

    /// Do not open chapters with a .5 release before them
    #[arg(long)]
    skip_point_five: bool,

    /// Outcomes to list but not open (e.g. Broken,Missing)
    #[arg(long = "skip-kind", value_name = "KIND", value_delimiter = ',')]
    skip_kinds: Vec<StatusKind>,
}

impl CheckArgs {
    /// Layers command-line flags over the file configuration
    fn apply(&self, config: &mut Config) {
        config.skip_domains.extend(self.skip.iter().cloned());
        if let Some(opener) = &self.opener {
            config.open.opener = opener.clone();
        }
        if self.no_prompt {
            config.open.prompt = false;
        }
        if self.prompt {
            config.open.prompt = true;
        }
        if let Some(delay) = self.delay {
            config.probe.bucket_delay_secs = delay;
        }
        if let Some(delay_ms) = self.open_delay_ms {
            config.open.delay_ms = delay_ms;
        }
        if let Some(concurrency) = self.concurrency {
            config.dispatch.max_concurrent_domains = concurrency;
        }
        if self.skip_tiny {
            config.open.skip_kinds.push(StatusKind::Tiny);
        }
        if self.skip_point_five {
            config.open.skip_kinds.push(StatusKind::PointFive);
        }
        config.open.skip_kinds.extend(self.skip_kinds.iter().copied());
    }
}

#[derive(Args, Debug)]
struct BumpArgs {
    /// Bookmark file to update
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Chapter to move to instead of the next one
    #[arg(long, value_name = "N")]
    to: Option<f64>,

    /// Only change the URL, not the file name
    #[arg(short, long)]
    url_only: bool,

    /// Show the change without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Accept the change without prompting
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Check(args) => handle_check(args).await,
        Command::Bump(args) => handle_bump(args),
        Command::Sites { config } => handle_sites(config.as_deref()),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("chapter_scout=info,warn"),
            1 => EnvFilter::new("chapter_scout=debug,info"),
            2 => EnvFilter::new("chapter_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr)
        .init();
}

fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Handles `check`: scan, classify, report, open
async fn handle_check(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let mut config = load(args.config.as_deref())?;
    args.apply(&mut config);
    validate(&config).context("Invalid settings")?;

    let registry = SiteRegistry::from_config(&config)?;
    tracing::info!(
        "{} site(s) registered, {} domain(s) skipped",
        registry.len(),
        config.skip_domains.len()
    );

    let shutdown = Arc::new(Shutdown::new());
    let listener = tokio::spawn(listen_for_interrupts(Arc::clone(&shutdown)));

    let run = run_check(&config, registry, &args.directory, shutdown.token())
        .await
        .with_context(|| format!("Failed to check {}", args.directory.display()))?;

    let report = Report::new(&run.report.urls);
    print!("{}", render_scan_failures(&run.scan_failures));
    print!("{}", report.render_errors());
    print!("{}", report.render_untested());

    let groups = report.open_groups();
    if !groups.is_empty() {
        if config.open.prompt {
            wait_for_enter("Testing complete. Hit enter to open websites.").await?;
        }
        let opener = CommandOpener::new(config.open.opener.as_str());
        let filter = OpenFilter::from_config(&config.open);
        let summary = open_candidates(&opener, &groups, &filter, config.open.delay()).await;
        tracing::info!(
            "Opened {} URL(s), {} failed, {} left closed",
            summary.opened,
            summary.failed,
            summary.skipped
        );
    }

    println!("{}", report.summary_line());
    println!("Done!");
    listener.abort();

    if run.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Handles `bump`: rewrite a bookmark to a later chapter
fn handle_bump(args: BumpArgs) -> anyhow::Result<ExitCode> {
    let options = BumpOptions {
        to: args.to,
        url_only: args.url_only,
    };
    let plan = BumpPlan::for_file(&args.file, options)
        .with_context(|| format!("Cannot bump {}", args.file.display()))?;

    println!("\n{}\n", plan.describe());

    let accepted = if args.yes {
        println!("Auto accepting.");
        true
    } else {
        confirm("Accept? [N/y] ")?
    };
    if !accepted {
        return Ok(ExitCode::FAILURE);
    }

    if args.dry_run {
        println!("This is a dry run!");
    } else {
        plan.apply()?;
    }
    Ok(ExitCode::SUCCESS)
}

fn confirm(prompt: &str) -> io::Result<bool> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    match answer.trim() {
        "y" => Ok(true),
        answer if answer.eq_ignore_ascii_case("n") || answer.is_empty() => Ok(false),
        _ => {
            println!("Unknown input.");
            Ok(false)
        }
    }
}

/// Handles `sites`: list the effective site table
fn handle_sites(config: Option<&Path>) -> anyhow::Result<ExitCode> {
    let config = load(config)?;
    let registry = SiteRegistry::from_config(&config)?;

    println!("Registered sites ({}):", registry.len());
    for domain in registry.domains() {
        if let Some(detector) = registry.get(domain) {
            println!("  - {}: {:?}", domain, detector);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapter_scout::config::OpenConfig;

    fn check_args(flags: &[&str]) -> CheckArgs {
        let argv = ["chapter-scout", "check", "bookmarks"]
            .into_iter()
            .chain(flags.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Check(args) => args,
            other => panic!("expected check, got {:?}", other),
        }
    }

    fn applied(flags: &[&str]) -> Config {
        let mut config = Config::default();
        check_args(flags).apply(&mut config);
        config
    }

    #[test]
    fn test_delay_paces_bookmarks_of_one_site() {
        let config = applied(&["--delay", "5"]);
        assert_eq!(config.probe.bucket_delay_secs, 5.0);
        assert_eq!(config.open.delay_ms, OpenConfig::default().delay_ms);
    }

    #[test]
    fn test_open_delay_paces_browser_opens() {
        let config = applied(&["--open-delay-ms", "50"]);
        assert_eq!(config.open.delay_ms, 50);
        assert_eq!(config.probe.bucket_delay_secs, 0.0);
    }

    #[test]
    fn test_skip_flags_fill_skip_kinds() {
        let config = applied(&["--skip-tiny", "--skip-kind", "Broken,missing"]);
        assert_eq!(
            config.open.skip_kinds,
            vec![StatusKind::Tiny, StatusKind::Broken, StatusKind::Missing]
        );

        let config = applied(&["--skip-point-five"]);
        assert_eq!(config.open.skip_kinds, vec![StatusKind::PointFive]);
    }

    #[test]
    fn test_unknown_skip_kind_is_rejected() {
        let argv = ["chapter-scout", "check", "bookmarks", "--skip-kind", "Sideways"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_remaining_flags() {
        let config = applied(&[
            "--skip",
            "a.com,b.com",
            "--opener",
            "firefox",
            "--no-prompt",
            "--concurrency",
            "3",
        ]);
        assert_eq!(config.skip_domains, vec!["a.com", "b.com"]);
        assert_eq!(config.open.opener, "firefox");
        assert!(!config.open.prompt);
        assert_eq!(config.dispatch.max_concurrent_domains, 3);
        assert_eq!(config.probe.bucket_delay_secs, 0.0);
        assert!(config.open.skip_kinds.is_empty());
    }

    #[test]
    fn test_oversized_delay_fails_validation() {
        let config = applied(&["--delay", "1e30"]);
        assert!(validate(&config).is_err());
    }
}
