//! Spawning built invocations
//!
//! Children inherit stdin, stdout and stderr. Long-running programs are
//! started with [`ProcessRunner::run_cancellable`], which keeps the launcher
//! alive through Ctrl-C and SIGTERM so the child can shut down on its own
//! and report its real exit status.

use crate::error::{LauncherError, LauncherResult};
use crate::invoke::Invocation;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Runs invocations to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run and wait; a non-zero exit is an error
    async fn run(&self, invocation: &Invocation) -> LauncherResult<()>;

    /// Like [`ProcessRunner::run`], but interrupt and terminate signals
    /// received meanwhile are left to the child
    async fn run_cancellable(&self, invocation: &Invocation) -> LauncherResult<()>;
}

/// Runner spawning real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn spawn(invocation: &Invocation) -> LauncherResult<Child> {
        debug!("Executing: {}", invocation);
        Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| LauncherError::command_failed(invocation.program.display().to_string(), e))
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> LauncherResult<()> {
        let mut child = Self::spawn(invocation)?;
        let status = child
            .wait()
            .await
            .map_err(|e| LauncherError::command_failed(invocation.program.display().to_string(), e))?;
        check_status(status, invocation)
    }

    async fn run_cancellable(&self, invocation: &Invocation) -> LauncherResult<()> {
        let mut child = Self::spawn(invocation)?;
        let mut terminate = Terminate::new()?;

        let (tx, mut rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = tx.send(child.wait().await);
        });

        let waited = loop {
            tokio::select! {
                waited = &mut rx => break waited,
                _ = signal::ctrl_c() => info!("Interrupt received, waiting for the program to exit"),
                _ = terminate.recv() => info!("Terminate received, waiting for the program to exit"),
            }
        };

        let status = waited
            .map_err(|_| LauncherError::Internal("child wait task ended without a result".to_string()))?
            .map_err(|e| LauncherError::command_failed(invocation.program.display().to_string(), e))?;
        check_status(status, invocation)
    }
}

fn check_status(status: ExitStatus, invocation: &Invocation) -> LauncherResult<()> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(LauncherError::ChildExit {
            command: invocation.program.display().to_string(),
            code,
        }),
        None => Err(LauncherError::ProcessSignaled),
    }
}

/// SIGTERM listener; never fires off unix
#[cfg(unix)]
struct Terminate(signal::unix::Signal);

#[cfg(unix)]
impl Terminate {
    fn new() -> LauncherResult<Self> {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map(Self)
            .map_err(|e| LauncherError::io("installing SIGTERM handler", e))
    }

    async fn recv(&mut self) {
        self.0.recv().await;
    }
}

#[cfg(not(unix))]
struct Terminate;

#[cfg(not(unix))]
impl Terminate {
    fn new() -> LauncherResult<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        std::future::pending::<()>().await
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn success() {
        SystemRunner.run(&sh("exit 0")).await.unwrap();
        SystemRunner.run_cancellable(&sh("exit 0")).await.unwrap();
    }

    #[tokio::test]
    async fn exit_code_reported() {
        let err = SystemRunner.run(&sh("exit 3")).await.unwrap_err();
        assert!(matches!(err, LauncherError::ChildExit { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);

        let err = SystemRunner.run_cancellable(&sh("exit 7")).await.unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn killed_by_signal() {
        let err = SystemRunner.run(&sh("kill -9 $$")).await.unwrap_err();
        assert!(matches!(err, LauncherError::ProcessSignaled));
    }

    #[tokio::test]
    async fn missing_program() {
        let inv = Invocation::new("/nonexistent/program", Vec::new());
        let err = SystemRunner.run(&inv).await.unwrap_err();
        assert!(matches!(err, LauncherError::CommandFailed { .. }));
    }
}
