use crate::image::{self, ImageSpec};
use crate::provider::{SandboxProvider, WaitStatus};
use crate::Result;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// How long a killed instance gets to report that it is gone.
const KILL_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// `None` when the instance timed out or its status could not be read.
    pub exit_status: Option<i32>,
    pub timed_out: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration: Duration,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

pub struct SandboxExecutor {
    provider: Arc<dyn SandboxProvider>,
    script_path: String,
    timeout: Duration,
}

impl SandboxExecutor {
    pub fn new(
        provider: Arc<dyn SandboxProvider>,
        script_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            script_path: script_path.into(),
            timeout,
        }
    }

    pub fn command(&self, image: &ImageSpec, args: &[String]) -> Vec<String> {
        let mut command = Vec::with_capacity(args.len() + 2);
        command.push(image.language().execute_command().to_owned());
        command.extend_from_slice(args);
        command.push(self.script_path.clone());
        command
    }

    /// Runs the script of `image`, then reclaims the instance and every
    /// ephemeral tag `image` owns.
    #[tracing::instrument(skip_all, fields(image = image.tag_name()))]
    pub async fn execute(&self, image: ImageSpec, args: &[String]) -> Result<ExecutionResult> {
        let command = self.command(&image, args);
        let result = self.run(image.tag_name(), &command).await;
        image::reclaim(&*self.provider, image).await;
        result
    }

    async fn run(&self, tag: &str, command: &[String]) -> Result<ExecutionResult> {
        let t0 = Instant::now();
        let instance = self.provider.run(tag, command).await?;
        debug!(%instance, ?command, "instance started");

        let result = self.supervise(&instance, t0).await;

        match self.provider.delete_instance(&instance).await {
            Ok(()) => debug!(%instance, "instance deleted"),
            Err(err) => warn!(%instance, %err, "failed to delete instance"),
        }
        result
    }

    async fn supervise(&self, instance: &str, t0: Instant) -> Result<ExecutionResult> {
        let (exit_status, timed_out) = match self.provider.wait(instance, self.timeout).await? {
            WaitStatus::Exited(code) => (Some(code), false),
            WaitStatus::Unknown => (None, false),
            WaitStatus::TimedOut => {
                warn!(timeout = ?self.timeout, "execution timed out, killing instance");
                // delete_instance below removes it either way
                match self.provider.kill(instance).await {
                    Ok(()) => match self.provider.wait(instance, KILL_GRACE).await {
                        Ok(status) => debug!(?status, "killed instance terminated"),
                        Err(err) => warn!(%err, "failed to wait for killed instance"),
                    },
                    Err(err) => warn!(%err, "failed to kill instance"),
                }
                (None, true)
            }
        };
        let duration = t0.elapsed();

        // read only after termination so nothing written right before exit is lost
        let logs = self.provider.logs(instance).await?;

        info!(
            ?exit_status,
            timed_out,
            ?duration,
            stdout = logs.stdout.len(),
            stderr = logs.stderr.len(),
            "execution finished"
        );

        Ok(ExecutionResult {
            exit_status,
            timed_out,
            stdout: logs.stdout,
            stderr: logs.stderr,
            duration,
        })
    }
}
