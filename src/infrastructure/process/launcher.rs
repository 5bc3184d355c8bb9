//! Evaluation of launch strategies against a [`CommandRunner`].

use crate::domain::ports::process_runner::{CommandRunner, ProcessHandle};
use crate::domain::values::launch_strategy::{
    InterpreterCandidate, LaunchStrategy, CONTAINER_DATA_PATH, CONTAINER_ENGINE_PORT, ENGINE_MODULE,
};
use std::path::Path;
use tracing::{debug, info};

/// What a successful launch left behind.
pub enum LaunchOutcome {
    /// A background process owned by this program.
    Spawned(Box<dyn ProcessHandle>),
    /// The engine lives in a named container managed by the runtime.
    Container(String),
}

pub struct Launcher<'a> {
    runner: &'a dyn CommandRunner,
    port: u16,
    data_dir: &'a Path,
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl<'a> Launcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, port: u16, data_dir: &'a Path) -> Self {
        Self {
            runner,
            port,
            data_dir,
        }
    }

    pub async fn launch(&self, strategy: &LaunchStrategy) -> Result<LaunchOutcome, String> {
        match strategy {
            LaunchStrategy::Container {
                runtime,
                name,
                image,
            } => self.launch_container(runtime, name, image).await,
            LaunchStrategy::LocalInterpreter { candidates } => self.launch_interpreter(candidates).await,
        }
    }

    /// Runs a command and returns its stdout, or the failure reason.
    async fn checked(&self, program: &str, argv: Vec<String>) -> Result<String, String> {
        let out = self.runner.run(program, &argv).await?;
        if out.success {
            Ok(out.stdout)
        } else {
            Err(format!(
                "`{program} {}` failed: {}",
                argv.join(" "),
                out.failure_reason()
            ))
        }
    }

    async fn container_listed(&self, runtime: &str, name: &str, all: bool) -> Result<bool, String> {
        let mut argv = args(&["ps"]);
        if all {
            argv.push("-a".into());
        }
        argv.extend(args(&["--filter", &format!("name=^{name}$"), "--format", "{{.Names}}"]));
        let stdout = self.checked(runtime, argv).await?;
        Ok(stdout.lines().any(|line| line.trim() == name))
    }

    async fn launch_container(&self, runtime: &str, name: &str, image: &str) -> Result<LaunchOutcome, String> {
        self.checked(runtime, args(&["--version"]))
            .await
            .map_err(|e| format!("{runtime} is not available: {e}"))?;

        if self.container_listed(runtime, name, true).await? {
            if self.container_listed(runtime, name, false).await? {
                info!(container = name, "engine container already running");
            } else {
                info!(container = name, "starting existing engine container");
                self.checked(runtime, args(&["start", name])).await?;
            }
            return Ok(LaunchOutcome::Container(name.to_string()));
        }

        info!(container = name, image, "creating engine container");
        let publish = format!("{}:{CONTAINER_ENGINE_PORT}", self.port);
        let volume = format!("{}:{CONTAINER_DATA_PATH}", self.data_dir.display());
        self.checked(
            runtime,
            args(&["run", "-d", "-p", &publish, "-v", &volume, "--name", name, image]),
        )
        .await?;
        Ok(LaunchOutcome::Container(name.to_string()))
    }

    /// First candidate that exists and can run the engine module's `--help`.
    pub async fn select_interpreter<'c>(
        &self,
        candidates: &'c [InterpreterCandidate],
    ) -> Result<&'c InterpreterCandidate, String> {
        let mut reasons = Vec::new();
        for candidate in candidates {
            let program = candidate.program();
            if let Some(path) = candidate.required_path() {
                if !path.exists() {
                    reasons.push(format!("{} {program}: not found", candidate.label()));
                    continue;
                }
            }
            match self.checked(&program, args(&["-m", ENGINE_MODULE, "--help"])).await {
                Ok(_) => {
                    debug!(candidate = candidate.label(), %program, "interpreter selected");
                    return Ok(candidate);
                }
                Err(reason) => reasons.push(format!("{} {program}: {reason}", candidate.label())),
            }
        }
        if reasons.is_empty() {
            return Err("no interpreter candidates configured".into());
        }
        Err(format!("no usable interpreter ({})", reasons.join("; ")))
    }

    async fn launch_interpreter(&self, candidates: &[InterpreterCandidate]) -> Result<LaunchOutcome, String> {
        let candidate = self.select_interpreter(candidates).await?;
        let program = candidate.program();
        let data = self.data_dir.display().to_string();
        let port = self.port.to_string();
        let handle = self
            .runner
            .spawn(&program, &args(&["-m", ENGINE_MODULE, "run", "--path", &data, "--port", &port]))
            .await?;
        info!(%program, pid = ?handle.pid(), "spawned engine process");
        Ok(LaunchOutcome::Spawned(handle))
    }
}
