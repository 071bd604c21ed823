use crate::lang::php::Php;
use crate::lang::Language;
use crate::provider::SandboxProvider;
use crate::{Error, Result};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashSet;
use tracing::{debug, info};

/// Languages known to this process and the base images already verified.
pub struct LanguageRegistry {
    provider: Arc<dyn SandboxProvider>,
    languages_dir: PathBuf,
    languages: HashMap<String, Arc<dyn Language>>,
    verified: DashSet<String>,
}

impl LanguageRegistry {
    pub fn new(provider: Arc<dyn SandboxProvider>, languages_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            languages_dir: languages_dir.into(),
            languages: HashMap::new(),
            verified: DashSet::new(),
        }
    }

    /// A registry holding the bundled languages.
    pub fn with_builtins(
        provider: Arc<dyn SandboxProvider>,
        languages_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut registry = Self::new(provider, languages_dir);
        registry.register(Arc::new(Php::new("php-5.4")));
        registry.register(Arc::new(Php::new("php-5.5")));
        registry
    }

    pub fn register(&mut self, language: Arc<dyn Language>) -> Option<Arc<dyn Language>> {
        self.languages
            .insert(language.lang_name().to_owned(), language)
    }

    pub fn resolve(&self, language_id: &str) -> Result<Arc<dyn Language>> {
        match self.languages.get(language_id) {
            Some(language) => Ok(language.clone()),
            None => Err(Error::UnknownLanguage(language_id.to_owned())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the base image of `language` from its definition directory
    /// unless the provider already has it.
    ///
    /// A tag is checked at most once per registry. Other processes may race
    /// to build the same tag, which is harmless.
    #[tracing::instrument(skip_all, fields(tag = language.tag_name()))]
    pub async fn ensure_base_image(&self, language: &dyn Language) -> Result<()> {
        let tag = language.tag_name();
        if self.verified.contains(tag) {
            debug!("base image already verified");
            return Ok(());
        }

        if !self.provider.image_exists(tag).await? {
            let definition = self.languages_dir.join(tag);
            info!(path = %definition.display(), "building base image");

            let output = self.provider.build(tag, &definition).await?;
            if !output.success || !self.provider.image_exists(tag).await? {
                return Err(Error::Build {
                    tag: tag.to_owned(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                });
            }
        }

        self.verified.insert(tag.to_owned());
        Ok(())
    }
}
