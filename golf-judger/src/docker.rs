//! [`SandboxProvider`] backed by the `docker` command line client.

use crate::config;
use crate::provider::{BuildOutput, Logs, SandboxProvider, WaitStatus};
use crate::{Error, Result};

use golf_utils::os_cmd::OsCmd;

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DockerProvider {
    bin: PathBuf,
}

impl DockerProvider {
    pub fn new(config: &config::Docker) -> Self {
        Self {
            bin: config.bin.clone(),
        }
    }

    fn cmd(&self, subcommand: &str) -> OsCmd {
        let mut cmd = OsCmd::new(&self.bin);
        cmd.arg(subcommand);
        cmd
    }

    async fn output(&self, action: &'static str, cmd: &OsCmd) -> Result<Output> {
        debug!("executing command\n{:?}\n", cmd);
        to_command(cmd)
            .output()
            .await
            .map_err(|err| Error::provider(action, err.to_string()))
    }

    /// Like [`output`](Self::output), but a non-zero exit is an error.
    async fn checked(&self, action: &'static str, cmd: &OsCmd) -> Result<Output> {
        let output = self.output(action, cmd).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::provider(action, stderr.trim()));
        }
        Ok(output)
    }
}

fn to_command(cmd: &OsCmd) -> Command {
    let mut command = Command::new(&cmd.bin);
    command.args(&cmd.args);
    for (k, v) in &cmd.env {
        command.env(k, v);
    }
    command.stdin(Stdio::null());
    command.kill_on_drop(true);
    command
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn parse_exit_status(stdout: &[u8]) -> WaitStatus {
    match String::from_utf8_lossy(stdout).trim().parse::<i32>() {
        Ok(code) => WaitStatus::Exited(code),
        Err(_) => WaitStatus::Unknown,
    }
}

#[async_trait]
impl SandboxProvider for DockerProvider {
    async fn image_exists(&self, tag: &str) -> Result<bool> {
        let mut cmd = self.cmd("images");
        cmd.arg("-q").arg(tag);
        let output = self.checked("list images", &cmd).await?;
        Ok(!output.stdout.iter().all(u8::is_ascii_whitespace))
    }

    async fn build(&self, tag: &str, context: &Path) -> Result<BuildOutput> {
        let mut cmd = self.cmd("build");
        cmd.arg("-t").arg(tag).arg(context);
        let output = self.output("build image", &cmd).await?;
        Ok(BuildOutput {
            success: output.status.success(),
            stdout: lossy(&output.stdout),
            stderr: lossy(&output.stderr),
        })
    }

    async fn run(&self, tag: &str, command: &[String]) -> Result<String> {
        let mut cmd = self.cmd("run");
        cmd.arg("-d").arg(tag).args(command);
        let output = self.checked("run container", &cmd).await?;
        let id = lossy(&output.stdout).trim().to_owned();
        if id.is_empty() {
            return Err(Error::provider("run container", "no container id"));
        }
        Ok(id)
    }

    async fn wait(&self, instance: &str, timeout: Duration) -> Result<WaitStatus> {
        let mut cmd = self.cmd("wait");
        cmd.arg(instance);
        debug!("executing command\n{:?}\n", cmd);

        // the `docker wait` child is killed when the timeout drops it
        match time::timeout(timeout, to_command(&cmd).output()).await {
            Err(_) => Ok(WaitStatus::TimedOut),
            Ok(Err(err)) => Err(Error::provider("wait container", err.to_string())),
            Ok(Ok(output)) if !output.status.success() => {
                warn!(%instance, stderr = %lossy(&output.stderr), "docker wait failed");
                Ok(WaitStatus::Unknown)
            }
            Ok(Ok(output)) => Ok(parse_exit_status(&output.stdout)),
        }
    }

    async fn kill(&self, instance: &str) -> Result<()> {
        let mut cmd = self.cmd("kill");
        cmd.arg(instance);
        let output = self.output("kill container", &cmd).await?;
        if !output.status.success() {
            // it may have exited between the timeout and the kill
            warn!(%instance, stderr = %lossy(&output.stderr), "docker kill failed");
        }
        Ok(())
    }

    async fn logs(&self, instance: &str) -> Result<Logs> {
        let mut cmd = self.cmd("logs");
        cmd.arg(instance);
        let output = self.checked("read container logs", &cmd).await?;
        Ok(Logs {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    async fn delete_instance(&self, instance: &str) -> Result<()> {
        let mut cmd = self.cmd("rm");
        cmd.arg("-f").arg(instance);
        self.checked("remove container", &cmd).await?;
        Ok(())
    }

    async fn delete_image(&self, tag: &str) -> Result<()> {
        let mut cmd = self.cmd("rmi");
        cmd.arg("-f").arg(tag);
        self.checked("remove image", &cmd).await?;
        Ok(())
    }
}
