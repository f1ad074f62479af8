use super::{ImageError, ImageReference};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// File placed in the staging directory before the build tool runs
///
/// Targets are relative to the staging directory, which is also the build
/// tool's context, so `COPY <target> ...` lines can reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StagedFile {
    /// Copy of a host file
    File { source: PathBuf, target: PathBuf },
    /// Recursive copy of a host directory
    Directory { source: PathBuf, target: PathBuf },
    /// JSON document written verbatim
    Json {
        target: PathBuf,
        value: serde_json::Value,
    },
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        match self {
            StagedFile::File { target, .. }
            | StagedFile::Directory { target, .. }
            | StagedFile::Json { target, .. } => target,
        }
    }
}

/// Instruction queues and staging location of one built image
///
/// Procedures append to the queues; lines keep the order they were pushed in.
/// There is no way to remove or reorder a line once pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildContext {
    name: String,
    os: String,
    base_path: PathBuf,
    installers_image: Option<ImageReference>,
    installers: Vec<String>,
    build: Vec<String>,
    clean: Vec<String>,
    staged: Vec<StagedFile>,
}

impl BuildContext {
    /// Creates an empty context staged at `<contexts_root>/<name>`
    pub fn new(name: impl Into<String>, os: impl Into<String>, contexts_root: &Path) -> Self {
        let name = name.into();
        let base_path = contexts_root.join(&name);
        Self {
            name,
            os: os.into(),
            base_path,
            installers_image: None,
            installers: Vec::new(),
            build: Vec::new(),
            clean: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Name of the image this context builds
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    /// Staging directory handed to the build tool
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Joins `parts` onto the staging directory
    pub fn resolve<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        parts
            .into_iter()
            .fold(self.base_path.clone(), |path, part| path.join(part))
    }

    /// Overrides the source image of the installers stage
    pub fn set_installers_image(&mut self, image: ImageReference) {
        self.installers_image = Some(image);
    }

    pub fn installers_image(&self) -> Option<&ImageReference> {
        self.installers_image.as_ref()
    }

    pub fn push_installer(&mut self, instruction: impl Into<String>) {
        self.installers.push(instruction.into());
    }

    pub fn push_build(&mut self, instruction: impl Into<String>) {
        self.build.push(instruction.into());
    }

    pub fn push_clean(&mut self, instruction: impl Into<String>) {
        self.clean.push(instruction.into());
    }

    pub fn installers(&self) -> &[String] {
        &self.installers
    }

    pub fn build(&self) -> &[String] {
        &self.build
    }

    pub fn clean(&self) -> &[String] {
        &self.clean
    }

    /// Copies host file `source` to `<base_path>/<target>` when the image is built
    pub fn stage_file(&mut self, source: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.staged.push(StagedFile::File {
            source: source.into(),
            target: target.into(),
        });
    }

    /// Copies host directory `source` into `<base_path>/<target>` when the image is built
    pub fn stage_dir(&mut self, source: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.staged.push(StagedFile::Directory {
            source: source.into(),
            target: target.into(),
        });
    }

    /// Writes `value` to `<base_path>/<target>` when the image is built
    pub fn stage_json(&mut self, target: impl Into<PathBuf>, value: serde_json::Value) {
        self.staged.push(StagedFile::Json {
            target: target.into(),
            value,
        });
    }

    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Location of a staged file's target
    ///
    /// Fails unless `target` is a relative path made only of normal segments,
    /// so nothing can be staged outside the staging directory.
    pub fn staging_path(&self, target: &Path) -> Result<PathBuf, ImageError> {
        let contained = target.components().next().is_some()
            && target
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(ImageError::InvalidArgument(format!(
                "staged file target {:?} must be a relative path inside the staging directory",
                target
            )));
        }
        Ok(self.base_path.join(target))
    }

    /// Total number of queued instructions
    pub fn len(&self) -> usize {
        self.installers.len() + self.build.len() + self.clean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
