#![allow(dead_code)]

use golf_judger::hole::{Binding, ConstantValue};
use golf_judger::lang::{Capability, ConstantMode, Language};
use golf_judger::provider::{BuildOutput, Logs, SandboxProvider, WaitStatus};
use golf_judger::{Config, Error, Judger, Result};
use golf_utils::tracing::setup_tracing;

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        setup_tracing();
    });
}

/// What a fake instance does once started.
#[derive(Debug, Clone)]
pub enum Outcome {
    Exit { code: i32, stdout: String },
    Hang,
    Unparsable,
}

impl Outcome {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Outcome::Exit {
            code: 0,
            stdout: stdout.into(),
        }
    }
}

/// Everything a fake instance gets to see.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub script: Vec<u8>,
    pub command: Vec<String>,
    pub directives: Vec<String>,
}

pub type Behavior = Box<dyn Fn(&Invocation) -> Outcome + Send + Sync>;

#[derive(Debug, Clone, Default)]
struct Image {
    files: HashMap<String, Vec<u8>>,
    directives: Vec<String>,
}

#[derive(Debug)]
struct Instance {
    outcome: Outcome,
    killed: bool,
}

#[derive(Default)]
struct State {
    images: HashMap<String, Image>,
    instances: HashMap<String, Instance>,
    builds: Vec<String>,
    commands: Vec<Vec<String>>,
    invocations: Vec<Invocation>,
    deleted_images: Vec<String>,
    deleted_instances: Vec<String>,
    kills: usize,
    next_instance: usize,
}

/// An in-memory sandbox runtime that records every call.
///
/// Builds understand `FROM`, `ADD` and treat any other line as an opaque
/// directive. A context without a manifest builds an empty base image.
pub struct SpyProvider {
    behavior: Behavior,
    fail_builds: bool,
    fail_kills: bool,
    state: Mutex<State>,
}

impl SpyProvider {
    pub fn new(behavior: impl Fn(&Invocation) -> Outcome + Send + Sync + 'static) -> Self {
        Self {
            behavior: Box::new(behavior),
            fail_builds: false,
            fail_kills: false,
            state: Mutex::new(State::default()),
        }
    }

    pub fn failing_builds(mut self) -> Self {
        self.fail_builds = true;
        self
    }

    pub fn failing_kills(mut self) -> Self {
        self.fail_kills = true;
        self
    }

    pub fn with_image(self, tag: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(tag.to_owned(), Image::default());
        self
    }

    pub fn runs(&self) -> usize {
        self.state.lock().unwrap().commands.len()
    }

    pub fn builds(&self) -> Vec<String> {
        self.state.lock().unwrap().builds.clone()
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    pub fn deleted_images(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_images.clone()
    }

    pub fn deleted_instances(&self) -> usize {
        self.state.lock().unwrap().deleted_instances.len()
    }

    pub fn live_instances(&self) -> usize {
        self.state.lock().unwrap().instances.len()
    }

    pub fn kills(&self) -> usize {
        self.state.lock().unwrap().kills
    }

    pub fn has_image(&self, tag: &str) -> bool {
        self.state.lock().unwrap().images.contains_key(tag)
    }
}

fn read_context(state: &State, context: &Path) -> Image {
    let manifest = match fs::read_to_string(context.join("Dockerfile")) {
        Ok(manifest) => manifest,
        Err(_) => return Image::default(),
    };

    let mut image = Image::default();
    for line in manifest.lines() {
        let mut words = line.splitn(3, ' ');
        match (words.next(), words.next(), words.next()) {
            (Some("FROM"), Some(base), None) => {
                image = state.images.get(base).cloned().unwrap_or_default();
            }
            (Some("ADD"), Some(source), Some(target)) => {
                let contents = fs::read(context.join(source)).unwrap();
                image.files.insert(target.to_owned(), contents);
            }
            _ => image.directives.push(line.to_owned()),
        }
    }
    image
}

#[async_trait]
impl SandboxProvider for SpyProvider {
    async fn image_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.has_image(tag))
    }

    async fn build(&self, tag: &str, context: &Path) -> Result<BuildOutput> {
        let mut state = self.state.lock().unwrap();
        state.builds.push(tag.to_owned());
        if self.fail_builds {
            return Ok(BuildOutput {
                success: false,
                stdout: String::new(),
                stderr: "ADD failed: no space left on device".to_owned(),
            });
        }
        let image = read_context(&state, context);
        state.images.insert(tag.to_owned(), image);
        Ok(BuildOutput {
            success: true,
            ..BuildOutput::default()
        })
    }

    async fn run(&self, tag: &str, command: &[String]) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let image = match state.images.get(tag) {
            Some(image) => image,
            None => {
                return Err(Error::Provider {
                    action: "run container",
                    message: format!("no such image: {}", tag),
                })
            }
        };

        let script = command
            .last()
            .and_then(|path| image.files.get(path))
            .cloned()
            .unwrap_or_default();
        let invocation = Invocation {
            script,
            command: command.to_vec(),
            directives: image.directives.clone(),
        };
        let outcome = (self.behavior)(&invocation);

        state.next_instance += 1;
        let id = format!("instance-{}", state.next_instance);
        state.commands.push(command.to_vec());
        state.invocations.push(invocation);
        state.instances.insert(
            id.clone(),
            Instance {
                outcome,
                killed: false,
            },
        );
        Ok(id)
    }

    async fn wait(&self, instance: &str, _: Duration) -> Result<WaitStatus> {
        let state = self.state.lock().unwrap();
        let instance = &state.instances[instance];
        Ok(match instance.outcome {
            Outcome::Exit { code, .. } => WaitStatus::Exited(code),
            Outcome::Hang if instance.killed => WaitStatus::Exited(137),
            Outcome::Hang => WaitStatus::TimedOut,
            Outcome::Unparsable => WaitStatus::Unknown,
        })
    }

    async fn kill(&self, instance: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.kills += 1;
        if self.fail_kills {
            return Err(Error::Provider {
                action: "kill container",
                message: "permission denied".to_owned(),
            });
        }
        if let Some(instance) = state.instances.get_mut(instance) {
            instance.killed = true;
        }
        Ok(())
    }

    async fn logs(&self, instance: &str) -> Result<Logs> {
        let state = self.state.lock().unwrap();
        Ok(match &state.instances[instance].outcome {
            Outcome::Exit { stdout, .. } => Logs {
                stdout: stdout.clone().into_bytes(),
                stderr: Vec::new(),
            },
            _ => Logs::default(),
        })
    }

    async fn delete_instance(&self, instance: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.instances.remove(instance);
        state.deleted_instances.push(instance.to_owned());
        Ok(())
    }

    async fn delete_image(&self, tag: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.images.remove(tag);
        state.deleted_images.push(tag.to_owned());
        Ok(())
    }
}

/// A language that receives its constants as `-c NAME=value` flags.
#[derive(Debug)]
pub struct Flags;

impl Language for Flags {
    fn lang_name(&self) -> &str {
        "flags"
    }

    fn tag_name(&self) -> &str {
        "flags-1.0"
    }

    fn execute_command(&self) -> &str {
        "/tmp/execute"
    }

    fn constant_mode(&self) -> ConstantMode {
        ConstantMode::Argument
    }

    fn add_constant(&self, _: &[u8], _: &str, _: &ConstantValue) -> Vec<u8> {
        panic!("constants are passed as arguments")
    }

    fn restriction(&self, _: Capability) -> Option<Vec<String>> {
        None
    }
}

/// Reads back a constant bound by the php prelude.
pub fn defined(script: &[u8], name: &str) -> Option<String> {
    let script = String::from_utf8_lossy(script);
    let prefix = format!("define('{}', ", name);
    let start = script.find(&prefix)? + prefix.len();
    let len = script[start..].find(");")?;
    Some(script[start..start + len].to_owned())
}

pub fn defined_int(script: &[u8], name: &str) -> i64 {
    defined(script, name).unwrap().parse().unwrap()
}

pub fn bindings(pairs: &[(&str, i64)]) -> Vec<Binding> {
    pairs
        .iter()
        .map(|&(name, n)| Binding::new(name, ConstantValue::Int(n)))
        .collect()
}

/// A judger wired to `provider`, building inside a scratch directory.
pub struct Fixture {
    pub judger: Judger,
    pub workspace: TempDir,
}

impl Fixture {
    pub fn new(provider: Arc<SpyProvider>) -> Self {
        init();
        let workspace = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.judge.workspace_root = workspace.path().join("builds");
        config.docker.languages_dir = workspace.path().join("languages");

        let mut judger = Judger::new(&config, provider);
        judger.registry_mut().register(Arc::new(Flags));
        Self { judger, workspace }
    }

    pub fn script(&self, contents: &str) -> std::path::PathBuf {
        let path = self.workspace.path().join("submission");
        fs::write(&path, contents).unwrap();
        path
    }
}
