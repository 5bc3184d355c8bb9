use crate::domain::ports::process_runner::{CommandOutput, CommandRunner, ProcessHandle};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Runs real programs through `tokio::process`.
pub struct SystemRunner;

struct ChildHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for ChildHandle {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self) -> Result<(), String> {
        self.child
            .kill()
            .await
            .map_err(|e| format!("failed to terminate pid {:?}: {e}", self.child.id()))
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("failed to run {program}: {e}"))?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn ProcessHandle>, String> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| format!("failed to spawn {program}: {e}"))?;
        Ok(Box::new(ChildHandle { child }))
    }
}
