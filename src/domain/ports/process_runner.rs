use async_trait::async_trait;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Trimmed stderr, falling back to stdout, for error reasons.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// A background process started by this program.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    fn pid(&self) -> Option<u32>;
    async fn terminate(&mut self) -> Result<(), String>;
}

/// Runs external programs. Errors are reasons suitable for aggregation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion and captures output. `Err` only if it could not start.
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String>;

    /// Starts a detached background process with null stdio.
    async fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn ProcessHandle>, String>;
}
