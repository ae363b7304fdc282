use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use rollwatch_core::app::{CollectSummary, ReviewRollPoller, RollDriver, describe_task_outcome};
use rollwatch_core::config::RollConfig;
use rollwatch_core::domain::{ChangeId, ChangeSnapshot, RollMode, TaskOutcome, TaskResult};
use rollwatch_core::impls::{RecordingSleeper, ScriptedChangeFetcher};
use rollwatch_core::ports::{Sleeper, SystemClock, TokioSleeper, UlidGenerator};

#[derive(Parser)]
#[command(name = "rollwatch", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify task-distribution result records (a JSON object or array)
    Classify {
        file: PathBuf,
        /// Lines of output to show for IO timeouts
        #[arg(long, default_value_t = 50)]
        tail: usize,
    },

    /// Replay a JSON array of change snapshots through the roll poller
    Roll {
        script: PathBuf,
        #[arg(long)]
        change: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Record sleeps instead of waiting
        #[arg(long)]
        no_sleep: bool,
    },
}

fn classify(file: &Path, tail: usize) -> anyhow::Result<bool> {
    let s = std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let results = TaskResult::many_from_json(&s)?;
    let summary = CollectSummary::from_results(&results);

    for (result, (task_id, outcome)) in results.iter().zip(summary.outcomes()) {
        println!("{task_id} {outcome}");
        if *outcome == TaskOutcome::IoTimeout {
            println!("{}", describe_task_outcome(result, *outcome, tail));
        }
    }

    if let Some((task_id, outcome)) = summary.first_fatal() {
        warn!(%task_id, %outcome, "collect has fatal outcomes");
    }
    Ok(summary.all_succeeded())
}

async fn roll(
    script: &Path,
    change: String,
    dry_run: bool,
    config: Option<&Path>,
    no_sleep: bool,
) -> anyhow::Result<bool> {
    let config = match config {
        Some(path) => RollConfig::load_from(path)?,
        None => RollConfig::default(),
    };
    let s =
        std::fs::read_to_string(script).with_context(|| format!("read {}", script.display()))?;
    let snapshots: Vec<ChangeSnapshot> =
        serde_json::from_str(&s).with_context(|| "parse snapshot script")?;

    let sleeper: Arc<dyn Sleeper> = if no_sleep {
        Arc::new(RecordingSleeper::new())
    } else {
        Arc::new(TokioSleeper)
    };
    let fetcher = Arc::new(ScriptedChangeFetcher::from_snapshots(snapshots));
    let poller = ReviewRollPoller::new(fetcher, sleeper).with_selectors(config.selectors());
    let mut driver = RollDriver::new(
        poller,
        Arc::new(UlidGenerator::new(SystemClock)),
        config.schedule()?,
    );
    if let Some(host) = &config.review_host {
        driver = driver.with_review_host(host.clone());
    }

    let mode = if dry_run {
        RollMode::DryRun
    } else {
        RollMode::Production
    };
    let report = driver.roll(ChangeId::new(change), mode).await?;
    println!("{} {} {:?}", report.change_id, report.outcome, report.follow_up);

    match report.into_result() {
        Ok(_) => Ok(true),
        Err(e) => {
            eprintln!("{e}");
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let ok = match cli.cmd {
        Command::Classify { file, tail } => classify(&file, tail)?,
        Command::Roll {
            script,
            change,
            dry_run,
            config,
            no_sleep,
        } => roll(&script, change, dry_run, config.as_deref(), no_sleep).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
