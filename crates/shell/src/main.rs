use anyhow::Context;
use onbeat_api::HttpMusicService;
use onbeat_engine::{CpalBackend, LevelMeter};
use onbeat_project::{FileStorage, Storage};
use onbeat_shell::dto::Event;
use onbeat_shell::state::relock;
use onbeat_shell::{AppState, Config, execute_line, fault, poll};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("onbeat=debug".parse()?),
        )
        .init();

    fault::install_panic_hook();

    let config = Config::load();
    let storage_dir = config.storage_dir();
    tracing::info!("starting OnBeat, state in {}", storage_dir.display());

    let app = Arc::new(AppState::new(
        config.clone(),
        Box::new(move || -> Box<dyn Storage> { Box::new(FileStorage::new(storage_dir.clone())) }),
        Arc::new(HttpMusicService::new(config.api_base.clone())),
        LevelMeter::new(Box::new(CpalBackend)),
    ));

    let (events, mut outbox) = mpsc::unbounded_channel::<Event>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = outbox.recv().await {
            let mut line = match serde_json::to_vec(&event) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("failed to encode event: {e}");
                    continue;
                }
            };
            line.push(b'\n');
            if stdout.write_all(&line).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let loops = poll::start_all(&app, &events);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let handler = Arc::clone(&app);
        let replies = tokio::task::spawn_blocking(move || execute_line(&handler, &line))
            .await
            .context("command task failed")?;
        for event in replies {
            if events.send(event).is_err() {
                break;
            }
        }
    }

    tracing::info!("stdin closed, shutting down");
    if let Err(e) = relock(&app.store).save() {
        tracing::warn!("final save failed: {e}");
    }
    drop(loops);
    drop(events);
    let _ = writer.await;
    Ok(())
}

