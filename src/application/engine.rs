use crate::config::EngineSettings;
use crate::domain::error::DomainError;
use crate::domain::ports::process_runner::{CommandRunner, ProcessHandle};
use crate::domain::ports::vector_engine::VectorEngine;
use crate::domain::values::engine_state::EngineState;
use crate::domain::values::launch_strategy::LaunchStrategy;
use crate::infrastructure::process::launcher::{LaunchOutcome, Launcher};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    pub url: String,
    pub state: EngineState,
}

/// What this manager launched, if anything.
#[derive(Default)]
struct LaunchSlot {
    process: Option<Box<dyn ProcessHandle>>,
    container: Option<String>,
}

/// Keeps the vector engine reachable.
///
/// Health is always re-probed rather than trusted from cached state. Launches
/// are single-flight: concurrent callers wait on the launch slot and re-probe
/// once they hold it, so at most one engine process is ever started.
pub struct EngineProcessManager {
    engine: Arc<dyn VectorEngine>,
    runner: Arc<dyn CommandRunner>,
    settings: EngineSettings,
    state: Mutex<EngineState>,
    slot: tokio::sync::Mutex<LaunchSlot>,
}

impl EngineProcessManager {
    pub fn new(engine: Arc<dyn VectorEngine>, runner: Arc<dyn CommandRunner>, settings: EngineSettings) -> Self {
        Self {
            engine,
            runner,
            settings,
            state: Mutex::new(EngineState::NotRunning),
            slot: tokio::sync::Mutex::new(LaunchSlot::default()),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, next: EngineState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != next {
            debug!(from = %*state, to = %next, "engine state transition");
            *state = next;
        }
    }

    async fn probe(&self) -> bool {
        self.engine.heartbeat().await.is_ok()
    }

    pub async fn status(&self) -> EngineStatus {
        let running = self.probe().await;
        if running {
            self.set_state(EngineState::Running);
        } else if self.state().is_running() {
            // A stale Running is dropped; Starting and Failed are left as they are.
            self.set_state(EngineState::NotRunning);
        }
        EngineStatus {
            running,
            url: self.engine.endpoint(),
            state: self.state(),
        }
    }

    /// Returns once the engine answers its heartbeat, launching it if needed.
    pub async fn ensure_running(&self) -> Result<(), DomainError> {
        if self.probe().await {
            self.set_state(EngineState::Running);
            return Ok(());
        }

        let mut slot = self.slot.lock().await;
        if self.probe().await {
            self.set_state(EngineState::Running);
            return Ok(());
        }

        self.set_state(EngineState::Starting);
        if let Some(mut stale) = slot.process.take() {
            warn!(pid = ?stale.pid(), "held engine process is not answering, terminating it");
            if let Err(e) = stale.terminate().await {
                warn!("failed to terminate stale engine process: {e}");
            }
        }

        let data_dir = match self.prepare_data_dir().await {
            Ok(dir) => dir,
            Err(reason) => {
                self.set_state(EngineState::Failed(reason.clone()));
                return Err(DomainError::EngineUnavailable(reason));
            }
        };

        let launcher = Launcher::new(self.runner.as_ref(), self.settings.port, &data_dir);
        let mut failures = Vec::new();
        for strategy in &self.settings.strategies {
            let label = strategy.label();
            info!(strategy = label, "launching vector engine");
            let outcome = match launcher.launch(strategy).await {
                Ok(outcome) => outcome,
                Err(reason) => {
                    warn!(strategy = label, "launch failed: {reason}");
                    failures.push(format!("{label}: {reason}"));
                    continue;
                }
            };

            if self.wait_healthy().await {
                match outcome {
                    LaunchOutcome::Spawned(handle) => slot.process = Some(handle),
                    LaunchOutcome::Container(name) => slot.container = Some(name),
                }
                self.set_state(EngineState::Running);
                info!(strategy = label, url = %self.engine.endpoint(), "vector engine running");
                return Ok(());
            }

            let attempts = self.settings.health.attempts;
            warn!(strategy = label, attempts, "engine did not become healthy");
            if let LaunchOutcome::Spawned(mut handle) = outcome {
                if let Err(e) = handle.terminate().await {
                    warn!("failed to terminate unhealthy engine process: {e}");
                }
            }
            failures.push(format!("{label}: not healthy after {attempts} health checks"));
        }

        let reason = if failures.is_empty() {
            "no launch strategies configured".to_string()
        } else {
            failures.join("; ")
        };
        self.set_state(EngineState::Failed(reason.clone()));
        Err(DomainError::EngineUnavailable(reason))
    }

    async fn prepare_data_dir(&self) -> Result<PathBuf, String> {
        let dir = &self.settings.data_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("cannot create data directory {}: {e}", dir.display()))?;
        tokio::fs::canonicalize(dir)
            .await
            .map_err(|e| format!("cannot resolve data directory {}: {e}", dir.display()))
    }

    async fn wait_healthy(&self) -> bool {
        let policy = self.settings.health;
        for attempt in 1..=policy.attempts {
            tokio::time::sleep(policy.interval).await;
            if self.probe().await {
                debug!(attempt, "engine heartbeat ok");
                return true;
            }
        }
        false
    }

    /// Best effort; failures are logged and never returned.
    pub async fn stop(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(mut process) = slot.process.take() {
            match process.terminate().await {
                Ok(()) => info!(pid = ?process.pid(), "engine process stopped"),
                Err(e) => warn!("failed to stop engine process: {e}"),
            }
        } else {
            // Without a record of what we launched, fall back to the configured container.
            let container = slot.container.take().or_else(|| self.configured_container());
            if let (Some(name), Some(runtime)) = (container, self.container_runtime()) {
                match self.runner.run(&runtime, &["stop".to_string(), name.clone()]).await {
                    Ok(out) if out.success => info!(container = %name, "engine container stopped"),
                    Ok(out) => warn!(container = %name, "failed to stop engine container: {}", out.failure_reason()),
                    Err(e) => warn!(container = %name, "failed to stop engine container: {e}"),
                }
            } else {
                debug!("no engine process or container to stop");
            }
        }
        self.set_state(EngineState::NotRunning);
    }

    fn container_runtime(&self) -> Option<String> {
        self.settings.strategies.iter().find_map(|s| match s {
            LaunchStrategy::Container { runtime, .. } => Some(runtime.clone()),
            _ => None,
        })
    }

    fn configured_container(&self) -> Option<String> {
        self.settings.strategies.iter().find_map(|s| match s {
            LaunchStrategy::Container { name, .. } => Some(name.clone()),
            _ => None,
        })
    }
}
