use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use swarmgate::admission::{AdmissionController, NoticeBoard, RoundOutcome, SkipReason};
use swarmgate::cli::{Cli, Commands};
use swarmgate::client::{EpicApi, HttpEpicClient};
use swarmgate::config::{self, AppConfig};
use swarmgate::poll;
use swarmgate::queue::{self, QueueState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli)?;
    tracing::info!(base_url = %config.base_url, "Config loaded");

    match &cli.command {
        Commands::Spawn { epic_id } => cmd_spawn(&config, epic_id).await,
        Commands::Status { epic_id } => cmd_status(&config, epic_id).await,
        Commands::Watch { epic_id, admit } => cmd_watch(&config, epic_id, *admit).await,
        Commands::Stop { epic_id } => cmd_stop(&config, epic_id).await,
    }
}

fn stagger(config: &AppConfig) -> Duration {
    Duration::from_millis(config.spawn_stagger_ms)
}

/// One refresh, one admission round, one line of output.
async fn cmd_spawn(config: &AppConfig, epic_id: &str) -> anyhow::Result<()> {
    let client = HttpEpicClient::new(config, epic_id)?;
    let state = client.refresh_state().await?;
    let controller = AdmissionController::new(client, stagger(config));

    match controller.run_round(&state).await {
        RoundOutcome::Skipped(SkipReason::NothingToSpawn) => {
            println!("Nothing to spawn: no ready children or no free slots.");
        }
        RoundOutcome::Skipped(SkipReason::RoundInProgress) => {
            println!("An admission round is already running.");
        }
        RoundOutcome::Finished(report) => match report.notice() {
            Some(text) => println!("{text}"),
            None => println!("No workers spawned (backend had no eligible child)."),
        },
    }
    Ok(())
}

async fn cmd_status(config: &AppConfig, epic_id: &str) -> anyhow::Result<()> {
    let client = HttpEpicClient::new(config, epic_id)?;
    let state = client.refresh_state().await?;
    print_state(&state);
    Ok(())
}

/// Poll the epic on the configured interval; with `admit`, run an admission
/// round after each refresh. Ctrl-C stops the poller and exits.
async fn cmd_watch(config: &AppConfig, epic_id: &str, admit: bool) -> anyhow::Result<()> {
    let client = Arc::new(HttpEpicClient::new(config, epic_id)?);
    let controller = AdmissionController::new(client.as_ref().clone(), stagger(config));
    let mut notices = NoticeBoard::new(Duration::from_secs(config.notice_ttl_secs));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = poll::start_refresh_loop(
        client,
        Duration::from_secs(config.poll_interval_secs),
        tx,
    );

    println!("Watching epic {epic_id} (Ctrl-C to stop)");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            state = rx.recv() => {
                let Some(state) = state else { break };
                if admit
                    && let RoundOutcome::Finished(report) = controller.run_round(&state).await
                    && let Some(text) = report.notice()
                {
                    notices.post(text);
                }
                print_watch_line(&state, notices.current());
            }
        }
    }

    handle.shutdown().await;
    println!("Stopped watching.");
    Ok(())
}

async fn cmd_stop(config: &AppConfig, epic_id: &str) -> anyhow::Result<()> {
    let client = HttpEpicClient::new(config, epic_id)?;
    client.stop().await?;
    println!("Backend will stop admitting new work for epic {epic_id}.");
    Ok(())
}

fn print_state(state: &QueueState) {
    let p = queue::partition(&state.children);
    println!(
        "Epic {}: {} ready, {} in progress, {} blocked, {} completed",
        state.epic_id,
        p.ready.len(),
        p.in_progress.len(),
        p.blocked.len(),
        p.completed.len(),
    );
    for child in &state.children {
        match &child.assignee {
            Some(assignee) => {
                println!("  [{}] {} - {} ({assignee})", child.status, child.id, child.title)
            }
            None => println!("  [{}] {} - {}", child.status, child.id, child.title),
        }
    }
}

fn print_watch_line(state: &QueueState, notice: Option<&str>) {
    let p = queue::partition(&state.children);
    let timestamp = chrono::Local::now().format("%H:%M:%S");
    let mut line = format!(
        "[{timestamp}] ready {} | working {} | blocked {} | done {}",
        p.ready.len(),
        p.in_progress.len(),
        p.blocked.len(),
        p.completed.len(),
    );
    if let Some(text) = notice {
        line.push_str(" | ");
        line.push_str(text);
    }
    println!("{line}");
}
