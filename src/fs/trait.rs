//! FileSystem trait definition

use anyhow::{Context, Result};
use std::path::Path;

/// Abstraction over the file operations the image builder needs
///
/// Staging directories and manifests go through this trait so builders can be
/// exercised against [`MockFileSystem`](super::MockFileSystem) without touching disk.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create a directory and all of its missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Write text to a file, creating missing parent directories
    ///
    /// Existing content is overwritten unconditionally.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Copy a file to `dest`, creating missing parent directories
    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()>;

    /// Copy the contents of directory `src` into `dest`, recursively
    ///
    /// Files already present in `dest` are overwritten; others are left alone.
    fn copy_dir(&self, src: &Path, dest: &Path) -> Result<()>;

    /// Write `value` as JSON indented by two spaces
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize JSON for {:?}", path))?;
        self.write_text(path, &content)
    }
}
