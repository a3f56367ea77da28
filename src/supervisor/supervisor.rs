// src/supervisor/supervisor.rs
//! Lifecycle supervision of the external interception engine
//!
//! State machine:
//!
//! ```text
//! Stopped --start--> Starting --spawn ok--> Running
//! Running --stop or external exit--> Stopping/Stopped
//! ```
//!
//! A failed spawn returns directly to `Stopped`. The supervisor owns
//! exactly one child-process handle and one active session filename; its
//! four operations are the only mutation points. `stop()` sends one
//! termination signal and trusts the engine to exit; the exit watcher —
//! shared with the unsolicited-death path — performs the final transition.

use crate::supervisor::events::{parse_event_line, EventBuffer};
use crate::utils::config::CaptureConfig;
use crate::utils::errors::{CaptureError, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Supervisor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Configuration for the engine supervisor
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Engine executable, resolved through PATH before spawning
    pub engine_command: String,

    /// Arguments passed to the engine
    pub engine_args: Vec<String>,

    /// Directory holding session log files; created on start
    pub capture_dir: PathBuf,

    /// Required session filename extension (without the dot)
    pub file_extension: String,

    /// Relayed-event ring buffer capacity
    pub event_capacity: usize,
}

impl From<&CaptureConfig> for SupervisorConfig {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            engine_command: config.engine.command.clone(),
            engine_args: config.engine.args.clone(),
            capture_dir: config.capture.log_dir.clone(),
            file_extension: config.capture.file_extension.clone(),
            event_capacity: config.events.buffer_capacity,
        }
    }
}

/// In-memory status snapshot; never probes the filesystem or process table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    pub is_running: bool,
    pub current_file: Option<String>,
}

struct Inner {
    state: SupervisorState,
    pid: Option<u32>,
    current_file: Option<String>,
    /// Bumped on every successful spawn so a stale exit watcher cannot
    /// clobber the state of a later session
    generation: u64,
}

/// Supervisor for the external interception engine process
pub struct EngineSupervisor {
    config: SupervisorConfig,
    inner: Arc<Mutex<Inner>>,
    events: Arc<EventBuffer>,
}

impl EngineSupervisor {
    /// Create a supervisor in the `Stopped` state.
    pub fn new(config: SupervisorConfig) -> Self {
        let events = Arc::new(EventBuffer::new(config.event_capacity));
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: SupervisorState::Stopped,
                pid: None,
                current_file: None,
                generation: 0,
            })),
            events,
        }
    }

    /// Ring buffer of relayed engine events, for the dashboard to poll.
    pub fn events(&self) -> Arc<EventBuffer> {
        Arc::clone(&self.events)
    }

    /// Full path a session filename resolves to.
    pub fn session_path(&self, filename: &str) -> PathBuf {
        self.config.capture_dir.join(filename)
    }

    /// Start a capture session writing to `filename`.
    ///
    /// Rejected unless currently `Stopped`. The filename is validated
    /// before any filesystem or process work; a failed spawn reverts to
    /// `Stopped` and surfaces the error.
    pub async fn start(&self, filename: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != SupervisorState::Stopped {
            return Err(CaptureError::Validation("already running".to_string()));
        }

        self.validate_filename(filename)?;

        inner.state = SupervisorState::Starting;

        let mut child = match self.spawn_engine(filename).await {
            Ok(child) => child,
            Err(e) => {
                inner.state = SupervisorState::Stopped;
                return Err(e);
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let pid = child.id();

        inner.state = SupervisorState::Running;
        inner.pid = pid;
        inner.current_file = Some(filename.to_string());
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);

        info!(
            "Interception engine started (pid {:?}), logging to {filename}",
            pid
        );

        if let Some(stdout) = stdout {
            let events = Arc::clone(&self.events);
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(event) = parse_event_line(&line) {
                        events.push(event.data);
                    }
                }
            });
        }

        if let Some(stderr) = stderr {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("engine stderr: {line}");
                }
            });
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let status = child.wait().await;
            let mut guard = inner.lock().await;
            if guard.generation != generation {
                // A later session owns the state now
                return;
            }
            let solicited = guard.state == SupervisorState::Stopping;
            guard.state = SupervisorState::Stopped;
            guard.pid = None;
            guard.current_file = None;
            drop(guard);

            match status {
                Ok(exit) if solicited => {
                    info!("Interception engine stopped ({exit})");
                }
                Ok(exit) => {
                    // Unsolicited death; never auto-retried
                    error!("Interception engine exited on its own ({exit})");
                }
                Err(e) => {
                    error!("Failed to await interception engine exit: {e}");
                }
            }
        });

        Ok(())
    }

    /// Stop the running capture session.
    ///
    /// Fire-and-forget: sends one termination signal, clears the active
    /// session, and lets the exit watcher land the `Stopped` state.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.state != SupervisorState::Running {
            return Err(CaptureError::Validation("not running".to_string()));
        }

        let pid = inner
            .pid
            .ok_or_else(|| CaptureError::Runtime("running engine has no pid".to_string()))?;

        inner.state = SupervisorState::Stopping;
        inner.current_file = None;
        drop(inner);

        info!("Stopping interception engine (pid {pid})");
        signal_terminate(pid)
    }

    /// Current state and active filename, from in-memory bookkeeping only.
    pub async fn status(&self) -> SupervisorStatus {
        let inner = self.inner.lock().await;
        SupervisorStatus {
            state: inner.state,
            is_running: inner.state == SupervisorState::Running,
            current_file: inner.current_file.clone(),
        }
    }

    /// Allow-list filename check: `[A-Za-z0-9_-]+` plus the configured
    /// extension. Runs before any filesystem or process work.
    fn validate_filename(&self, filename: &str) -> Result<()> {
        let suffix = format!(".{}", self.config.file_extension);
        let stem = filename.strip_suffix(suffix.as_str()).ok_or_else(|| {
            CaptureError::Validation(format!(
                "invalid filename '{filename}': expected the '{suffix}' extension"
            ))
        })?;

        if stem.is_empty()
            || !stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CaptureError::Validation(format!(
                "invalid filename '{filename}': use only letters, numbers, hyphens, and underscores"
            )));
        }

        Ok(())
    }

    /// Ensure the capture directory exists and spawn the engine with the
    /// target filename in its environment.
    async fn spawn_engine(&self, filename: &str) -> Result<Child> {
        tokio::fs::create_dir_all(&self.config.capture_dir)
            .await
            .map_err(|e| {
                CaptureError::Storage(format!(
                    "failed to create capture directory {}: {e}",
                    self.config.capture_dir.display()
                ))
            })?;

        let executable = which::which(&self.config.engine_command).map_err(|e| {
            CaptureError::Spawn(format!(
                "engine executable '{}' not found in PATH: {e}",
                self.config.engine_command
            ))
        })?;

        debug!("Spawning interception engine: {:?}", executable);

        Command::new(executable)
            .args(&self.config.engine_args)
            .env("LOG_FILE_NAME", filename)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                warn!("Engine spawn failed: {e}");
                CaptureError::Spawn(format!("failed to spawn interception engine: {e}"))
            })
    }
}

#[cfg(unix)]
fn signal_terminate(pid: u32) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(|e| {
        CaptureError::Runtime(format!("failed to signal engine (pid {pid}): {e}"))
    })
}

#[cfg(windows)]
fn signal_terminate(pid: u32) -> Result<()> {
    // The engine spawns sub-children on Windows; kill the whole tree
    std::process::Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/f", "/t"])
        .spawn()
        .map(|_| ())
        .map_err(|e| CaptureError::Runtime(format!("failed to kill engine (pid {pid}): {e}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path, command: &str, args: &[&str]) -> SupervisorConfig {
        SupervisorConfig {
            engine_command: command.to_string(),
            engine_args: args.iter().map(|a| a.to_string()).collect(),
            capture_dir: dir.to_path_buf(),
            file_extension: "json".to_string(),
            event_capacity: 16,
        }
    }

    async fn wait_for_state(supervisor: &EngineSupervisor, state: SupervisorState) {
        for _ in 0..200 {
            if supervisor.status().await.state == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("supervisor never reached {state:?}");
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let dir = tempdir().unwrap();
        let supervisor = EngineSupervisor::new(config(dir.path(), "sleep", &["30"]));

        supervisor.start("box-traffic-logs.json").await.unwrap();

        let status = supervisor.status().await;
        assert_eq!(status.state, SupervisorState::Running);
        assert!(status.is_running);
        assert_eq!(status.current_file.as_deref(), Some("box-traffic-logs.json"));

        supervisor.stop().await.unwrap();
        let status = supervisor.status().await;
        assert!(status.current_file.is_none());

        wait_for_state(&supervisor, SupervisorState::Stopped).await;
    }

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let dir = tempdir().unwrap();
        let supervisor = EngineSupervisor::new(config(dir.path(), "sleep", &["30"]));

        supervisor.start("a.json").await.unwrap();
        let err = supervisor.start("b.json").await.unwrap_err();
        assert!(err.to_string().contains("already running"));

        // The original session is untouched
        assert_eq!(
            supervisor.status().await.current_file.as_deref(),
            Some("a.json")
        );

        supervisor.stop().await.unwrap();
        wait_for_state(&supervisor, SupervisorState::Stopped).await;
    }

    #[tokio::test]
    async fn test_stop_while_stopped_is_rejected() {
        let dir = tempdir().unwrap();
        let supervisor = EngineSupervisor::new(config(dir.path(), "sleep", &["30"]));

        let err = supervisor.stop().await.unwrap_err();
        assert!(err.to_string().contains("not running"));
    }

    #[tokio::test]
    async fn test_external_exit_resets_state() {
        let dir = tempdir().unwrap();
        let supervisor = EngineSupervisor::new(config(dir.path(), "true", &[]));

        supervisor.start("short-lived.json").await.unwrap();

        // The process exits on its own; no stop() call
        wait_for_state(&supervisor, SupervisorState::Stopped).await;
        let status = supervisor.status().await;
        assert!(!status.is_running);
        assert!(status.current_file.is_none());
    }

    #[tokio::test]
    async fn test_restart_after_external_exit() {
        let dir = tempdir().unwrap();
        let supervisor = EngineSupervisor::new(config(dir.path(), "true", &[]));

        supervisor.start("first.json").await.unwrap();
        wait_for_state(&supervisor, SupervisorState::Stopped).await;

        supervisor.start("second.json").await.unwrap();
        assert_eq!(
            supervisor.status().await.current_file.as_deref(),
            Some("second.json")
        );
        wait_for_state(&supervisor, SupervisorState::Stopped).await;
    }

    #[tokio::test]
    async fn test_invalid_filename_rejected_before_any_io() {
        let dir = tempdir().unwrap();
        let capture_dir = dir.path().join("never-created");
        let supervisor = EngineSupervisor::new(config(&capture_dir, "sleep", &["30"]));

        for bad in ["../../etc/passwd", "no-extension", "spaced name.json", ".json"] {
            let err = supervisor.start(bad).await.unwrap_err();
            assert!(matches!(err, CaptureError::Validation(_)), "{bad}");
        }

        assert_eq!(supervisor.status().await.state, SupervisorState::Stopped);
        assert!(!capture_dir.exists());
    }

    #[tokio::test]
    async fn test_spawn_failure_reverts_to_stopped() {
        let dir = tempdir().unwrap();
        let supervisor =
            EngineSupervisor::new(config(dir.path(), "definitely-not-a-real-engine", &[]));

        let err = supervisor.start("a.json").await.unwrap_err();
        assert!(matches!(err, CaptureError::Spawn(_)));

        let status = supervisor.status().await;
        assert_eq!(status.state, SupervisorState::Stopped);
        assert!(status.current_file.is_none());
    }

    #[tokio::test]
    async fn test_stdout_relay_collects_log_events() {
        use crate::interception::record::{LogRecord, ResponseRecord};
        use crate::supervisor::events::EngineEvent;

        let dir = tempdir().unwrap();

        let event = EngineEvent::log(LogRecord::Response(ResponseRecord {
            url: "https://relay.example".to_string(),
            method: "GET".to_string(),
            host: "https://relay.example".to_string(),
            content_type: String::new(),
            body: None,
        }));
        let line = serde_json::to_string(&event).unwrap();

        // Engine stand-in: one diagnostic line, one structured event
        let script = format!("echo 'proxy ready'; echo '{line}'");
        let supervisor = EngineSupervisor::new(config(dir.path(), "sh", &["-c", script.as_str()]));

        supervisor.start("relay.json").await.unwrap();
        wait_for_state(&supervisor, SupervisorState::Stopped).await;

        let events = supervisor.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events.recent()[0].url(), "https://relay.example");
    }
}
