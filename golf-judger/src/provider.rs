//! The seam between the judge and whatever runs containers.

use crate::Result;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    Exited(i32),
    /// Still running when the timeout elapsed.
    TimedOut,
    /// Terminated, but the exit status could not be read.
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct Logs {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Primitives of an external sandbox runtime.
///
/// Instances are started detached; every call is expected to return once the
/// runtime has acknowledged it.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    async fn image_exists(&self, tag: &str) -> Result<bool>;

    /// Builds `tag` from the manifest and files found in `context`.
    ///
    /// A failed build is reported through [`BuildOutput::success`], errors
    /// are reserved for failures of the provider itself.
    async fn build(&self, tag: &str, context: &Path) -> Result<BuildOutput>;

    /// Starts `command` in a fresh instance of `tag` and returns its id.
    async fn run(&self, tag: &str, command: &[String]) -> Result<String>;

    async fn wait(&self, instance: &str, timeout: Duration) -> Result<WaitStatus>;

    async fn kill(&self, instance: &str) -> Result<()>;

    /// Everything the instance has written so far.
    async fn logs(&self, instance: &str) -> Result<Logs>;

    async fn delete_instance(&self, instance: &str) -> Result<()>;

    async fn delete_image(&self, tag: &str) -> Result<()>;
}
