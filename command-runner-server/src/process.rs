use std::io::Read;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to start shell: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to read command output: {0}")]
    Io(#[from] std::io::Error),
    #[error("command failed: {0}")]
    Failed(ExitStatus),
}

/// Runs command lines with a shell, e.g. `bash -c <content>`.
#[derive(Debug, Clone)]
pub struct Executor {
    shell: PathBuf,
}

impl Executor {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Runs `content` and waits for it to terminate.
    ///
    /// Stdout and stderr share one pipe, so the output keeps the order in
    /// which the shell wrote it. On a non-zero exit the output is discarded.
    pub async fn run(&self, content: &str) -> Result<String, ExecutionError> {
        let start = Instant::now();
        let (mut reader, writer) = std::io::pipe()?;

        // The command keeps its copies of the write end until dropped,
        // reading to EOF needs them gone.
        let mut child = {
            let mut command = Command::new(&self.shell);
            command
                .arg("-c")
                .arg(content)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer)
                .kill_on_drop(true);
            command.spawn().map_err(ExecutionError::Spawn)?
        };

        let read_output = tokio::task::spawn_blocking(move || {
            let mut combined = Vec::new();
            reader.read_to_end(&mut combined).map(|_| combined)
        });

        let status = child.wait().await?;
        let combined = read_output.await.map_err(std::io::Error::other)??;
        let time_taken = start.elapsed();
        log::debug!(status:display, time_taken:debug; "shell exited");
        log::trace!("Output: {}", String::from_utf8_lossy(&combined).trim());

        if !status.success() {
            return Err(ExecutionError::Failed(status));
        }
        Ok(String::from_utf8_lossy(&combined).into_owned())
    }
}
