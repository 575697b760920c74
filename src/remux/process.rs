//! Owned handle to one running transcoder.

use std::io;
use std::process::ExitStatus;

use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};

use super::command::TranscoderCommand;

/// The child's standard streams, split off so each can move into its own task.
#[derive(Debug)]
pub struct TranscoderPipes {
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
    pub stderr: ChildStderr,
}

/// A spawned transcoder. The process is SIGKILLed if this is dropped unreaped.
#[derive(Debug)]
pub struct TranscoderProcess {
    child: Child,
    pid: Option<u32>,
}

impl TranscoderProcess {
    pub fn spawn(command: &TranscoderCommand) -> io::Result<(Self, TranscoderPipes)> {
        let mut child = command.to_command().spawn()?;
        let pid = child.id();

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("transcoder stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("transcoder stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("transcoder stderr not captured"))?;

        Ok((
            Self { child, pid },
            TranscoderPipes {
                stdin,
                stdout,
                stderr,
            },
        ))
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Send SIGKILL without waiting. A no-op if the process already exited.
    pub fn kill_now(&mut self) -> io::Result<()> {
        match self.child.try_wait()? {
            Some(_) => Ok(()),
            None => self.child.start_kill(),
        }
    }

    /// Wait for the process to exit and collect its status.
    pub async fn reap(mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }
}
