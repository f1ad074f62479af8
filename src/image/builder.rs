use super::reference::{validate_name, validate_os};
use super::{
    BuildContext, ImageError, ImageReference, ImageSource, Manifest, Procedure, StagedFile,
};
use crate::config::ImageScriptConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::process::{CommandLine, ProcessRunner, RunOptions, SystemProcessRunner};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle of an [`ImageBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderState {
    /// No source image yet
    Created,
    /// `from` has been called; procedures may still be applied
    SourceSet,
    /// `build` has run; the builder only answers queries from now on
    Finalized,
}

/// Creates image references and builders that share one configuration and
/// one pair of collaborators
#[derive(Clone)]
pub struct ImageFactory {
    config: ImageScriptConfig,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
}

impl ImageFactory {
    /// Factory writing to the real file system and spawning real processes
    pub fn new(config: ImageScriptConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(RealFileSystem::new()),
            Arc::new(SystemProcessRunner::new()),
        )
    }

    pub fn with_collaborators(
        config: ImageScriptConfig,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self { config, fs, runner }
    }

    /// References an image that exists outside this tool
    pub fn import_image(
        &self,
        name: impl Into<String>,
        os: impl Into<String>,
    ) -> Result<ImageReference, ImageError> {
        ImageReference::imported(name, os)
    }

    /// Starts describing a new image called `name`
    pub fn create_image(
        &self,
        name: impl Into<String>,
        os: impl Into<String>,
    ) -> Result<ImageBuilder, ImageError> {
        let (name, os) = (name.into(), os.into());
        validate_name(&name)?;
        validate_os(&os)?;

        let context = BuildContext::new(name.clone(), os.clone(), &self.config.contexts_root);
        debug!(image = %name, os = %os, path = ?context.base_path(), "created image builder");

        Ok(ImageBuilder {
            image: ImageReference::built(name, os),
            source: None,
            context,
            state: BuilderState::Created,
            config: self.config.clone(),
            fs: Arc::clone(&self.fs),
            runner: Arc::clone(&self.runner),
        })
    }
}

impl Default for ImageFactory {
    /// Environment configuration with real collaborators
    fn default() -> Self {
        Self::new(ImageScriptConfig::default())
    }
}

impl fmt::Debug for ImageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// References an external image using the default factory
pub fn import_image(
    name: impl Into<String>,
    os: impl Into<String>,
) -> Result<ImageReference, ImageError> {
    ImageReference::imported(name, os)
}

/// Starts a builder using the default factory (environment configuration,
/// real file system, real processes)
pub fn create_image(
    name: impl Into<String>,
    os: impl Into<String>,
) -> Result<ImageBuilder, ImageError> {
    ImageFactory::default().create_image(name, os)
}

/// Fluent description of one image, compiled into a manifest by [`build`](Self::build)
///
/// `from` and `execute` consume the builder and hand it back so calls chain
/// with `?`. A builder is not meant to be shared between threads while it is
/// being configured; separate builders are fully independent.
pub struct ImageBuilder {
    image: ImageReference,
    source: Option<ImageReference>,
    context: BuildContext,
    state: BuilderState,
    config: ImageScriptConfig,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
}

impl ImageBuilder {
    /// Sets the image this one is built on
    ///
    /// Names are imported with the builder's own os. Calling `from` again
    /// replaces the previous source.
    pub fn from(mut self, image: impl Into<ImageSource>) -> Result<Self, ImageError> {
        self.ensure_open("from")?;

        let source = image.into().resolve(self.image.os())?;
        if let Some(previous) = &self.source {
            debug!(image = %self.image, previous = %previous, source = %source, "replacing source image");
        } else {
            debug!(image = %self.image, source = %source, "source image set");
        }

        self.source = Some(source);
        self.state = BuilderState::SourceSet;
        Ok(self)
    }

    /// Applies `procedure` to this image's build context
    pub fn execute<P: Procedure + ?Sized>(mut self, procedure: &P) -> Result<Self, ImageError> {
        self.ensure_open("execute")?;

        let before = self.context.len();
        procedure.apply(&mut self.context);
        debug!(
            image = %self.image,
            procedure = procedure.name(),
            added = self.context.len() - before,
            "procedure applied"
        );
        Ok(self)
    }

    /// Synthesizes the manifest without writing or building anything
    pub fn preview(&self) -> Result<Manifest, ImageError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ImageError::invalid_state("no source image"))?;
        Ok(Manifest::synthesize(&self.context, source))
    }

    /// Stages the context's files, writes the manifest and runs the build tool
    ///
    /// The builder is finalized even when writing or building fails, and a
    /// manifest that was written stays on disk.
    pub fn build(&mut self) -> Result<(), ImageError> {
        match self.state {
            BuilderState::Created => return Err(ImageError::invalid_state("no source image")),
            BuilderState::Finalized => {
                return Err(ImageError::invalid_state(format!(
                    "image '{}' has already been built",
                    self.image
                )))
            }
            BuilderState::SourceSet => {}
        }
        self.state = BuilderState::Finalized;

        let manifest = self.preview()?;
        self.stage_files()?;

        let path = self.manifest_path();
        let content = manifest.render();

        info!(image = %self.image, path = ?path, "writing manifest");
        debug!(manifest = %content, "synthesized manifest");

        self.fs
            .write_text(&path, &content)
            .map_err(|source| ImageError::IoFailure {
                path: path.clone(),
                source,
            })?;

        let command = self.build_command();
        let options = if self.config.capture_output {
            RunOptions::captured()
        } else {
            RunOptions::default()
        };

        info!(image = %self.image, command = %command, "building image");
        self.runner.run(&command, &options)?;
        info!(image = %self.image, "image built");

        Ok(())
    }

    /// Command `build` hands to the process runner
    pub fn build_command(&self) -> CommandLine {
        CommandLine::program(self.config.build_tool.as_str())
            .arg("build")
            .flag("-t", self.image.name())
            .arg(self.context.base_path().to_string_lossy())
    }

    pub fn name(&self) -> &str {
        self.image.name()
    }

    pub fn os(&self) -> &str {
        self.image.os()
    }

    /// Reference to the image this builder produces, usable as another
    /// builder's source
    pub fn reference(&self) -> &ImageReference {
        &self.image
    }

    pub fn source(&self) -> Option<&ImageReference> {
        self.source.as_ref()
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Where `build` writes the manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.context.resolve([&self.config.manifest_name])
    }

    /// Materializes the context's staged files under the staging directory
    fn stage_files(&self) -> Result<(), ImageError> {
        for staged in self.context.staged() {
            let target = self.context.staging_path(staged.target())?;
            debug!(image = %self.image, target = ?target, "staging file");

            let result = match staged {
                StagedFile::File { source, .. } => self.fs.copy_file(source, &target),
                StagedFile::Directory { source, .. } => self.fs.copy_dir(source, &target),
                StagedFile::Json { value, .. } => self.fs.write_json(&target, value),
            };
            result.map_err(|source| ImageError::IoFailure {
                path: target.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn ensure_open(&self, operation: &str) -> Result<(), ImageError> {
        if self.state == BuilderState::Finalized {
            return Err(ImageError::invalid_state(format!(
                "cannot call {} on image '{}' after it has been built",
                operation, self.image
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ImageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuilder")
            .field("image", &self.image)
            .field("source", &self.source)
            .field("state", &self.state)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
