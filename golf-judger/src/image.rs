use crate::lang::{Capability, Language};
use crate::provider::SandboxProvider;
use crate::{Error, Result};

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

const MANIFEST_NAME: &str = "Dockerfile";

/// A buildable sandbox state.
///
/// Never mutated: layering anything on top yields a new value. The tags the
/// judge created on the way are owned by the value and deleted with it, see
/// [`reclaim`].
#[derive(Debug, Clone)]
pub struct ImageSpec {
    tag_name: String,
    language: Arc<dyn Language>,
    /// Oldest first. Empty for base images.
    ephemeral: Vec<String>,
}

impl ImageSpec {
    /// The language's base image, which is kept across runs.
    pub fn base(language: Arc<dyn Language>) -> Self {
        Self {
            tag_name: language.tag_name().to_owned(),
            language,
            ephemeral: Vec::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn language(&self) -> &Arc<dyn Language> {
        &self.language
    }

    pub fn ephemeral_tags(&self) -> &[String] {
        &self.ephemeral
    }

    fn layer(&self, tag_name: String) -> Self {
        let mut ephemeral = self.ephemeral.clone();
        ephemeral.push(tag_name.clone());
        Self {
            tag_name,
            language: self.language.clone(),
            ephemeral,
        }
    }
}

/// A scratch directory holding the files of a single build.
///
/// Removed when dropped.
#[derive(Debug)]
pub struct BuildContext {
    root: PathBuf,
    files: usize,
}

impl BuildContext {
    pub fn create(workspace_root: &Path, name: &str) -> Result<Self> {
        let root = workspace_root.join(name);
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self { root, files: 0 })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` under a generated name and returns that name.
    pub fn add_file(&mut self, contents: &[u8]) -> Result<String> {
        let name = format!("file-{}", self.files);
        let path = self.root.join(&name);
        fs::write(&path, contents).map_err(|e| Error::io(&path, e))?;
        self.files += 1;
        Ok(name)
    }

    pub fn write_manifest(&self, manifest: &str) -> Result<()> {
        let path = self.root.join(MANIFEST_NAME);
        fs::write(&path, manifest).map_err(|e| Error::io(&path, e))
    }
}

impl Drop for BuildContext {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.root) {
            warn!(%err, path = %self.root.display(), "failed to remove build context");
        }
    }
}

/// Renders the build manifest. Directives always come after the files.
pub fn manifest(base: &str, added: &[(String, &str)], directives: &[String]) -> String {
    let mut out = format!("FROM {}\n", base);
    for (source, target) in added {
        let _ = writeln!(out, "ADD {} {}", source, target);
    }
    for directive in directives {
        out.push_str(directive);
        out.push('\n');
    }
    out
}

pub struct ImageBuilder {
    provider: Arc<dyn SandboxProvider>,
    workspace_root: PathBuf,
}

impl ImageBuilder {
    pub fn new(provider: Arc<dyn SandboxProvider>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            workspace_root: workspace_root.into(),
        }
    }

    /// Layers `files` (target path, contents) and then `directives` on top of
    /// `base`.
    #[tracing::instrument(skip_all, fields(base = base.tag_name()))]
    pub async fn build(
        &self,
        base: &ImageSpec,
        files: &[(&str, &[u8])],
        directives: &[String],
    ) -> Result<ImageSpec> {
        let tag = format!("golf-{}", Uuid::new_v4().to_simple());

        let mut context = BuildContext::create(&self.workspace_root, &tag)?;
        let mut added = Vec::with_capacity(files.len());
        for &(target, contents) in files {
            added.push((context.add_file(contents)?, target));
        }
        let manifest = manifest(base.tag_name(), &added, directives);
        debug!(%tag, "manifest:\n{}", manifest);
        context.write_manifest(&manifest)?;

        let output = self.provider.build(&tag, context.root()).await?;
        drop(context);

        if !output.success || !self.provider.image_exists(&tag).await? {
            return Err(Error::Build {
                tag,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        info!(%tag, "built image");
        Ok(base.layer(tag))
    }

    /// Revokes `capability` by layering the language's restriction on top of
    /// `image`. On failure everything `image` owned is reclaimed.
    pub async fn restrict(&self, image: ImageSpec, capability: Capability) -> Result<ImageSpec> {
        let directives = match image.language().restriction(capability) {
            Some(directives) => directives,
            None => {
                let language = image.language().lang_name().to_owned();
                self.discard(image).await;
                return Err(Error::UnsupportedCapability {
                    language,
                    capability,
                });
            }
        };

        match self.build(&image, &[], &directives).await {
            Ok(restricted) => Ok(restricted),
            Err(err) => {
                self.discard(image).await;
                Err(err)
            }
        }
    }

    /// Deletes the tags `image` owns without running it.
    pub async fn discard(&self, image: ImageSpec) {
        reclaim(&*self.provider, image).await
    }
}

/// Deletes every ephemeral tag of `image`, newest first.
///
/// Failures are logged and do not stop the remaining deletions.
pub async fn reclaim(provider: &dyn SandboxProvider, image: ImageSpec) {
    for tag in image.ephemeral.iter().rev() {
        match provider.delete_image(tag).await {
            Ok(()) => info!(%tag, "reclaimed image"),
            Err(err) => warn!(%tag, %err, "failed to reclaim image"),
        }
    }
}
