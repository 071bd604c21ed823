use crate::config::Config;
use crate::exec::{ExecutionResult, SandboxExecutor};
use crate::hole::{Binding, Hole};
use crate::image::{ImageBuilder, ImageSpec};
use crate::lang::ConstantMode;
use crate::normalize::{normalize, Trim};
use crate::provider::SandboxProvider;
use crate::registry::LanguageRegistry;
use crate::{Error, Result};

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Why a case did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Failure {
    ExecutionTimeout,
    RuntimeFailure,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    pub index: usize,
    pub passed: bool,
    pub failure: Option<Failure>,
    pub constants: Vec<Binding>,
    pub exit_status: Option<i32>,
    pub timed_out: bool,
    /// Normalized unless the run failed before comparison.
    pub output: String,
    pub sample: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub passed: bool,
    pub cases_run: usize,
    pub cases_total: usize,
    /// The first failing case, or the last case when everything passed.
    pub case: CaseResult,
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Grades one execution against its expected sample.
///
/// A run that did not exit with 0 fails without looking at its output.
pub fn compare(
    index: usize,
    constants: Vec<Binding>,
    execution: &ExecutionResult,
    sample: &str,
    trim: Option<Trim>,
) -> CaseResult {
    let failure;
    let output;
    let sample_shown;

    if execution.timed_out {
        failure = Some(Failure::ExecutionTimeout);
        output = lossy(&execution.stdout);
        sample_shown = sample.to_owned();
    } else if !execution.is_success() {
        failure = Some(Failure::RuntimeFailure);
        output = lossy(&execution.stdout);
        sample_shown = sample.to_owned();
    } else {
        let actual = normalize(&execution.stdout, trim);
        let expected = normalize(sample.as_bytes(), trim);
        failure = if actual == expected {
            None
        } else {
            Some(Failure::Mismatch)
        };
        output = lossy(actual);
        sample_shown = lossy(expected);
    }

    CaseResult {
        index,
        passed: failure.is_none(),
        failure,
        constants,
        exit_status: execution.exit_status,
        timed_out: execution.timed_out,
        output,
        sample: sample_shown,
        stderr: lossy(&execution.stderr),
    }
}

/// Drives a submission through every case of a hole.
pub struct Judger {
    registry: LanguageRegistry,
    builder: ImageBuilder,
    executor: SandboxExecutor,
    script_path: String,
}

impl Judger {
    pub fn new(config: &Config, provider: Arc<dyn SandboxProvider>) -> Self {
        let registry =
            LanguageRegistry::with_builtins(provider.clone(), &config.docker.languages_dir);
        Self::with_registry(config, provider, registry)
    }

    pub fn with_registry(
        config: &Config,
        provider: Arc<dyn SandboxProvider>,
        registry: LanguageRegistry,
    ) -> Self {
        let judge = &config.judge;
        Self {
            registry,
            builder: ImageBuilder::new(provider.clone(), &judge.workspace_root),
            executor: SandboxExecutor::new(provider, &judge.script_path, judge.timeout()),
            script_path: judge.script_path.clone(),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LanguageRegistry {
        &mut self.registry
    }

    /// Judges the script at `script_path` (on the host) against `hole`.
    ///
    /// Stops at the first failing case. Errors are harness failures and
    /// never mean that the submission is wrong.
    #[tracing::instrument(skip_all, fields(hole = %hole.name, lang = language_id))]
    pub async fn judge(
        &self,
        hole: &Hole,
        language_id: &str,
        script_path: &Path,
    ) -> Result<JudgeVerdict> {
        let language = self.registry.resolve(language_id)?;
        self.registry.ensure_base_image(&*language).await?;
        let base = ImageSpec::base(language);

        let cases = hole.cases();
        let cases_total = cases.len();
        info!(cases = cases_total, "judging");

        // an empty expansion still runs the script once with nothing bound
        let mut cases = cases.into_iter().enumerate();
        let (index, bindings) = cases.next().unwrap_or((0, Vec::new()));
        let mut case = self
            .judge_case(hole, &base, index, bindings, script_path)
            .await?;

        loop {
            if !case.passed {
                warn!(
                    index = case.index,
                    failure = ?case.failure,
                    constants = ?case.constants,
                    "case failed"
                );
                return Ok(JudgeVerdict {
                    passed: false,
                    cases_run: case.index + 1,
                    cases_total,
                    case,
                });
            }
            info!(index = case.index, "case passed");

            match cases.next() {
                Some((index, bindings)) => {
                    case = self
                        .judge_case(hole, &base, index, bindings, script_path)
                        .await?;
                }
                None => break,
            }
        }

        Ok(JudgeVerdict {
            passed: true,
            cases_run: case.index + 1,
            cases_total,
            case,
        })
    }

    async fn judge_case(
        &self,
        hole: &Hole,
        base: &ImageSpec,
        index: usize,
        bindings: Vec<Binding>,
        script_path: &Path,
    ) -> Result<CaseResult> {
        let script = tokio::fs::read(script_path)
            .await
            .map_err(|e| Error::io(script_path, e))?;

        let language = base.language();
        let (script, args) = match language.constant_mode() {
            ConstantMode::Inject => {
                let script = bindings.iter().fold(script, |script, b| {
                    language.add_constant(&script, &b.name, &b.value)
                });
                (script, Vec::new())
            }
            ConstantMode::Argument => (script, language.runtime_args(&bindings)),
        };

        let files = [(self.script_path.as_str(), script.as_slice())];
        let mut image = self.builder.build(base, &files, &[]).await?;
        for &capability in &hole.disable_functionality {
            image = self.builder.restrict(image, capability).await?;
        }

        let execution = self.executor.execute(image, &args).await?;
        let sample = hole.sample.expected(&bindings);

        Ok(compare(index, bindings, &execution, &sample, hole.trim))
    }
}
