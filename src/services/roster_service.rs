//! Single-flight orchestration of the external roster fetch.
//!
//! The task itself is an opaque collaborator: the server writes a small input
//! descriptor, invokes the configured command, classifies each output line by
//! its bracketed severity tag, interprets the exit status, and checks that
//! the expected artifact appeared. Failures are logged, never fatal.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
};
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    error::ServiceError,
    services::template_service,
    state::{RunningJob, SharedState},
};

/// Error raised while driving the external roster task.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The job descriptor could not be written.
    #[error("failed to write job descriptor {path}: {source}")]
    Descriptor {
        /// Descriptor path.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
    /// The configured command has no program to run.
    #[error("roster task command is empty")]
    EmptyCommand,
    /// The external process could not be launched.
    #[error("failed to launch roster task: {0}")]
    Spawn(#[source] std::io::Error),
    /// Waiting on the external process failed.
    #[error("failed while waiting for roster task: {0}")]
    Wait(#[source] std::io::Error),
}

/// Exit classification of one task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// The task exited with status zero.
    Clean,
    /// The task exited non-zero; failure is reported but non-fatal.
    Failed(Option<i32>),
}

/// Severity parsed from one line of task output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSeverity {
    /// Informational output, also the default for untagged lines.
    Info,
    /// A recoverable problem reported by the task.
    Warn,
    /// An error reported by the task.
    Error,
    /// A success marker.
    Ok,
}

/// Abstraction over "run the fetch, stream its lines, report its exit".
///
/// Production installs [`ProcessRosterTask`]; tests install in-process stubs.
pub trait RosterTask: Send + Sync {
    /// Run the fetch for `key`, logging captured output lines as they arrive.
    fn run(&self, key: &str) -> BoxFuture<'static, Result<TaskExit, RosterError>>;
}

/// [`RosterTask`] backed by the configured external command.
pub struct ProcessRosterTask {
    command: Vec<String>,
}

impl ProcessRosterTask {
    /// Build the task runner from the configured scraper argv.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            command: config.scraper_command.clone(),
        }
    }
}

impl RosterTask for ProcessRosterTask {
    fn run(&self, key: &str) -> BoxFuture<'static, Result<TaskExit, RosterError>> {
        let command = self.command.clone();
        let key = key.to_string();
        Box::pin(async move {
            let (program, args) = command.split_first().ok_or(RosterError::EmptyCommand)?;
            info!(key, program, "launching roster scraper");

            let mut child = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(RosterError::Spawn)?;

            let mut readers = Vec::new();
            if let Some(stdout) = child.stdout.take() {
                readers.push(tokio::spawn(async move {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log_task_line(&line);
                    }
                }));
            }
            if let Some(stderr) = child.stderr.take() {
                readers.push(tokio::spawn(async move {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        log_task_line(&line);
                    }
                }));
            }

            let status = child.wait().await.map_err(RosterError::Wait)?;
            for reader in readers {
                let _ = reader.await;
            }

            if status.success() {
                Ok(TaskExit::Clean)
            } else {
                Ok(TaskExit::Failed(status.code()))
            }
        })
    }
}

/// Classify one output line by its optional bracketed severity tag.
///
/// Unrecognized tags and untagged lines default to informational.
pub fn classify_line(line: &str) -> (LineSeverity, &str) {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix('[')
        && let Some((tag, message)) = rest.split_once(']')
    {
        let severity = match tag.trim().to_ascii_lowercase().as_str() {
            "info" => Some(LineSeverity::Info),
            "warn" | "warning" => Some(LineSeverity::Warn),
            "error" | "err" => Some(LineSeverity::Error),
            "ok" => Some(LineSeverity::Ok),
            _ => None,
        };
        if let Some(severity) = severity {
            return (severity, message.trim_start());
        }
    }
    (LineSeverity::Info, line)
}

fn log_task_line(line: &str) {
    match classify_line(line) {
        (LineSeverity::Warn, message) => warn!(source = "scraper", "{message}"),
        (LineSeverity::Error, message) => error!(source = "scraper", "{message}"),
        (LineSeverity::Info | LineSeverity::Ok, message) => {
            info!(source = "scraper", "{message}")
        }
    }
}

/// Outcome of a fetch trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fetch was accepted and is now running in the background.
    Started,
    /// A fetch was already running; this trigger was dropped.
    AlreadyRunning,
    /// The artifact already exists and no refetch was forced.
    UpToDate,
}

/// Deterministic artifact path for a game key.
pub fn artifact_path(characters_dir: &Path, key: &str) -> PathBuf {
    characters_dir.join(format!("characters_{key}.json"))
}

/// Trigger the single-flight fetch for `key`.
///
/// Skips work when the artifact is already present unless `force` is set.
/// Never blocks on a running fetch: contention means the trigger is dropped.
pub async fn trigger_fetch(state: &SharedState, key: &str, force: bool) -> FetchOutcome {
    let artifact = artifact_path(&state.config().characters_dir, key);
    if !force && artifact.exists() {
        return FetchOutcome::UpToDate;
    }

    let Some(running) = state.roster().try_accept(key, state.hub()) else {
        info!(key, "roster fetch already running; trigger dropped");
        return FetchOutcome::AlreadyRunning;
    };

    let task = state.roster_task();
    let descriptor = state.config().descriptor_file.clone();
    tokio::spawn(run_accepted(task, descriptor, artifact, running));
    FetchOutcome::Started
}

/// Trigger the fetch for the active template's declared game key.
pub async fn trigger_for_active(
    state: &SharedState,
    force: bool,
) -> Result<FetchOutcome, ServiceError> {
    let active = template_service::active_template(state).await;
    let Some(key) = template_service::template_game_key(&state.config().templates_root, &active)
    else {
        return Err(ServiceError::InvalidInput(format!(
            "template `{active}` declares no game key"
        )));
    };
    Ok(trigger_fetch(state, &key, force).await)
}

/// Drive one accepted fetch to completion.
///
/// The [`RunningJob`] token drops on every exit path, releasing the guard
/// and publishing the finish notification even when a step fails.
async fn run_accepted(
    task: Arc<dyn RosterTask>,
    descriptor: PathBuf,
    artifact: PathBuf,
    running: RunningJob,
) {
    let key = running.key().to_string();

    if let Err(err) = write_descriptor(&descriptor, &key).await {
        error!(key, error = %err, "could not prepare roster fetch");
        return;
    }

    match task.run(&key).await {
        Ok(TaskExit::Clean) => {
            if artifact.exists() {
                info!(key, "roster fetch completed");
            } else {
                warn!(
                    key,
                    artifact = %artifact.display(),
                    "roster fetch reported success but produced no artifact"
                );
            }
        }
        Ok(TaskExit::Failed(code)) => {
            error!(key, code = ?code, "roster fetch exited with failure");
        }
        Err(err) => {
            error!(key, error = %err, "roster fetch could not run");
        }
    }

    remove_descriptor(&descriptor).await;
}

async fn write_descriptor(path: &Path, key: &str) -> Result<(), RosterError> {
    let payload = serde_json::json!({ "game": key });
    tokio::fs::write(path, payload.to_string())
        .await
        .map_err(|source| RosterError::Descriptor {
            path: path.to_path_buf(),
            source,
        })
}

/// Removed on success and failure paths alike; a missing file is fine.
async fn remove_descriptor(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await
        && err.kind() != ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %err, "failed to remove job descriptor");
    }
}
