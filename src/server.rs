use std::{fs, io::ErrorKind, os::unix::fs::FileTypeExt, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
    signal::unix::{SignalKind, signal},
    task::{JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    config::Config,
    order::OrderDispatcher,
    pipeline::Coordinator,
    protocol::{ClientMessage, ServerMessage, encode_server_message, parse_client_message},
    recommender::{
        RecommendationClient, adapters::build_generator, credentials::EnvCredentialProvider,
    },
};

pub fn build_coordinator(config: &Config, shutdown: CancellationToken) -> Result<Coordinator> {
    let generator = build_generator(&config.recommender, Arc::new(EnvCredentialProvider))
        .context("failed to construct recommendation generator")?;
    let recommender = RecommendationClient::new(generator, &config.recommender);
    let dispatcher = OrderDispatcher::from_config(&config.order)
        .context("failed to construct order dispatcher")?
        .with_shutdown(shutdown);

    tracing::info!(
        target: "server",
        generator = config.recommender.dialect.as_str(),
        order_backend = dispatcher.backend_name(),
        window_secs = config.pipeline.window_secs,
        min_count = config.pipeline.min_count,
        cooldown_secs = config.pipeline.cooldown_secs,
        "coordinator_ready"
    );
    Ok(Coordinator::new(
        config.pipeline.clone(),
        recommender,
        dispatcher,
    ))
}

pub async fn run(config: Config) -> Result<()> {
    let shutdown = CancellationToken::new();
    let coordinator = Arc::new(build_coordinator(&config, shutdown.clone())?);

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        let signal_name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = signal_token.cancelled() => return,
        };
        tracing::info!(target: "server", signal = signal_name, "shutdown_signal_received");
        signal_token.cancel();
    });

    serve(&config.server.socket_path, coordinator, shutdown).await
}

/// Accepts NDJSON clients on `socket_path` until `shutdown` is cancelled,
/// either externally or by an `exit` message. Returns once every client task
/// has finished, so a trigger already in flight still places its order.
pub async fn serve(
    socket_path: &Path,
    coordinator: Arc<Coordinator>,
    shutdown: CancellationToken,
) -> Result<()> {
    prepare_socket_path(socket_path)?;
    let listener = UnixListener::bind(socket_path)
        .with_context(|| format!("unable to bind socket {}", socket_path.display()))?;
    tracing::info!(
        target: "server",
        socket_path = %socket_path.display(),
        "server_listening"
    );

    let mut clients = JoinSet::new();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accept_result = listener.accept() => match accept_result {
                Ok((stream, _)) => {
                    let coordinator = Arc::clone(&coordinator);
                    let shutdown = shutdown.clone();
                    clients.spawn(
                        async move {
                            if let Err(err) = handle_client(stream, coordinator, shutdown).await {
                                tracing::warn!(target: "server", error = %format!("{err:#}"), "client_failed");
                            }
                        }
                        .in_current_span(),
                    );
                }
                Err(err) => tracing::warn!(target: "server", error = %err, "accept_failed"),
            },
            Some(joined) = clients.join_next(), if !clients.is_empty() => log_client_join(joined),
        }
    }

    // client tasks stop reading on shutdown but finish the request in hand
    drop(listener);
    tracing::info!(target: "server", pending_clients = clients.len(), "server_draining");
    while let Some(joined) = clients.join_next().await {
        log_client_join(joined);
    }

    cleanup_socket_path(socket_path)?;
    tracing::info!(target: "server", "server_stopped");
    Ok(())
}

fn log_client_join(joined: Result<(), JoinError>) {
    if let Err(err) = joined {
        tracing::warn!(target: "server", error = %err, "client_task_aborted");
    }
}

async fn handle_client(
    stream: UnixStream,
    coordinator: Arc<Coordinator>,
    shutdown: CancellationToken,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match parse_client_message(line) {
            Ok(message) => match respond(&coordinator, message, &shutdown).await {
                Some(response) => response,
                None => break,
            },
            Err(err) => {
                tracing::debug!(target: "server", error = %err, "invalid_message");
                ServerMessage::Error {
                    message: err.to_string(),
                }
            }
        };

        let encoded = encode_server_message(&response).context("failed to encode response")?;
        writer
            .write_all(encoded.as_bytes())
            .await
            .context("failed to write response")?;
    }

    Ok(())
}

/// Returns `None` once the client asked the server to stop.
async fn respond(
    coordinator: &Coordinator,
    message: ClientMessage,
    shutdown: &CancellationToken,
) -> Option<ServerMessage> {
    let response = match message {
        ClientMessage::Detect => coordinator.handle_event().await.into(),
        ClientMessage::Setup(profile) => {
            coordinator.update_profile(profile).await;
            ServerMessage::ProfileSaved
        }
        ClientMessage::Profile => ServerMessage::Profile {
            profile: coordinator.profile().await.as_ref().clone(),
        },
        ClientMessage::Status => coordinator.status().await.into(),
        ClientMessage::Exit => {
            tracing::info!(target: "server", "exit_requested");
            shutdown.cancel();
            return None;
        }
    };
    Some(response)
}

fn prepare_socket_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create {}", parent.display()))?;
    }

    match fs::symlink_metadata(path) {
        Ok(metadata) => {
            if metadata.file_type().is_socket() || metadata.is_file() {
                fs::remove_file(path)
                    .with_context(|| format!("unable to remove stale socket {}", path.display()))?;
            } else {
                bail!(
                    "socket path exists but is not removable as file/socket: {}",
                    path.display()
                );
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("unable to inspect {}", path.display()));
        }
    }

    Ok(())
}

fn cleanup_socket_path(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("unable to remove {}", path.display())),
    }
}
