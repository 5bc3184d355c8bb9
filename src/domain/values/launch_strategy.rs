use std::path::{Path, PathBuf};
use std::time::Duration;

/// Python module that provides the engine's command line.
pub const ENGINE_MODULE: &str = "chromadb.cli.cli";

/// Port the engine listens on inside its container.
pub const CONTAINER_ENGINE_PORT: u16 = 8000;

/// Where the container image keeps its persistent data.
pub const CONTAINER_DATA_PATH: &str = "/chroma/chroma";

/// An interpreter installation that may be able to run the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterCandidate {
    /// Isolated per-application install (pipx venv).
    AppVenv(PathBuf),
    /// Virtual environment inside the project directory.
    ProjectVenv(PathBuf),
    /// Interpreter resolved from `PATH`.
    System(String),
}

impl InterpreterCandidate {
    pub fn program(&self) -> String {
        match self {
            InterpreterCandidate::AppVenv(p) | InterpreterCandidate::ProjectVenv(p) => {
                p.display().to_string()
            }
            InterpreterCandidate::System(cmd) => cmd.clone(),
        }
    }

    /// Candidates backed by a concrete file must exist before they are probed.
    pub fn required_path(&self) -> Option<&Path> {
        match self {
            InterpreterCandidate::AppVenv(p) | InterpreterCandidate::ProjectVenv(p) => Some(p),
            InterpreterCandidate::System(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterpreterCandidate::AppVenv(_) => "app-venv",
            InterpreterCandidate::ProjectVenv(_) => "project-venv",
            InterpreterCandidate::System(_) => "system",
        }
    }
}

/// One way of bringing the engine up, tried in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStrategy {
    Container {
        runtime: String,
        name: String,
        image: String,
    },
    LocalInterpreter {
        candidates: Vec<InterpreterCandidate>,
    },
}

impl LaunchStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            LaunchStrategy::Container { .. } => "container",
            LaunchStrategy::LocalInterpreter { .. } => "local-interpreter",
        }
    }

    /// Container first, then interpreters from most to least isolated.
    pub fn defaults(
        home: Option<&Path>,
        project_root: &Path,
        container_name: &str,
        image: &str,
    ) -> Vec<LaunchStrategy> {
        let mut candidates = Vec::new();
        if let Some(home) = home {
            candidates.push(InterpreterCandidate::AppVenv(
                home.join(".local/pipx/venvs/chromadb/bin/python"),
            ));
        }
        candidates.push(InterpreterCandidate::ProjectVenv(
            project_root.join("venv").join("bin").join("python"),
        ));
        candidates.push(InterpreterCandidate::System("python3".into()));
        candidates.push(InterpreterCandidate::System("python".into()));

        vec![
            LaunchStrategy::Container {
                runtime: "docker".into(),
                name: container_name.into(),
                image: image.into(),
            },
            LaunchStrategy::LocalInterpreter { candidates },
        ]
    }
}

/// How long to wait for a freshly launched engine to answer its heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            attempts: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_order() {
        let strategies = LaunchStrategy::defaults(
            Some(Path::new("/home/u")),
            Path::new("/srv/app"),
            "chromadb",
            "chromadb/chroma",
        );
        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0].label(), "container");

        let LaunchStrategy::LocalInterpreter { candidates } = &strategies[1] else {
            panic!("second strategy should be the interpreter");
        };
        let labels: Vec<_> = candidates.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["app-venv", "project-venv", "system", "system"]);
        assert_eq!(
            candidates[0].program(),
            "/home/u/.local/pipx/venvs/chromadb/bin/python"
        );
        assert_eq!(candidates[1].program(), "/srv/app/venv/bin/python");
    }

    #[test]
    fn test_no_home_skips_app_venv() {
        let strategies = LaunchStrategy::defaults(None, Path::new("."), "c", "i");
        let LaunchStrategy::LocalInterpreter { candidates } = &strategies[1] else {
            panic!("second strategy should be the interpreter");
        };
        assert_eq!(candidates[0].label(), "project-venv");
    }

    #[test]
    fn test_system_candidate_has_no_required_path() {
        assert!(InterpreterCandidate::System("python3".into())
            .required_path()
            .is_none());
    }

    #[test]
    fn test_default_health_policy() {
        let policy = HealthPolicy::default();
        assert_eq!(policy.attempts, 10);
        assert_eq!(policy.interval, Duration::from_secs(1));
    }
}
