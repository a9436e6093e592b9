//! Terminal viewer joining a jukebox session as an anonymous guest.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use futures::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_guest::api::HttpJukeboxApi;
use jukebox_guest::services::identity;
use jukebox_guest::state::SessionView;
use jukebox_guest::{EngineConfig, SessionEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = EngineConfig::from_env();
    let owner_id = env::var("JUKEBOX_OWNER_ID")
        .context("JUKEBOX_OWNER_ID must be set; scan the owner's session code to obtain it")?;

    let guest_id = identity::get_or_create_guest_id(&config.guest_id_path);
    info!(%owner_id, %guest_id, backend = %config.base_url, "joining session");

    let backend = Arc::new(HttpJukeboxApi::new(&config.base_url, config.request_timeout)?);
    let engine = SessionEngine::start(config, backend, &owner_id, &guest_id);

    let mut updates = WatchStream::new(engine.update_watcher());
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            tick = updates.next() => {
                if tick.is_none() {
                    break;
                }
                render(&engine.view().await);
            }
        }
    }

    info!("leaving session");
    engine.shutdown();
    Ok(())
}

/// Print the synchronized view as a plain text frame.
fn render(view: &SessionView) {
    match &view.now_playing {
        Some(track) => println!(
            "now playing: {} — {}",
            track.title,
            track.artist_names.join(", ")
        ),
        None => println!("now playing: (nothing)"),
    }
    for track in &view.queue {
        let cooldown = if track.in_cooldown {
            format!("  [cooldown, {} more]", track.cooldown_remaining)
        } else {
            String::new()
        };
        println!(
            "  {:>3} votes  {} — {}{}",
            track.vote_count,
            track.title,
            track.artist_names.join(", "),
            cooldown
        );
    }
    if let Some(pending) = &view.pending_vote {
        println!("  voted: {pending}");
    }
    if let Some(error) = &view.last_vote_error {
        println!("  ! {error}");
    }
    if let Some(error) = &view.last_fetch_error {
        println!("  ~ out of sync: {error}");
    }
    println!();
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM before tearing the session down.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
