use super::FileSystem;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        fs::write(path, content).context(format!("Failed to write file {:?}", path))
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        fs::copy(src, dest)
            .map(|_| ())
            .context(format!("Failed to copy {:?} to {:?}", src, dest))
    }

    fn copy_dir(&self, src: &Path, dest: &Path) -> Result<()> {
        if !src.is_dir() {
            bail!("Not a directory: {:?}", src);
        }
        self.create_dir_all(dest)?;

        let entries =
            fs::read_dir(src).context(format!("Failed to read directory {:?}", src))?;
        for entry in entries {
            let entry = entry.context(format!("Failed to read directory {:?}", src))?;
            let path = entry.path();
            let target = dest.join(entry.file_name());
            if path.is_dir() {
                self.copy_dir(&path, &target)?;
            } else {
                self.copy_file(&path, &target)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_text_creates_parents() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let path = temp.path().join("a/b/c/Dockerfile");

        fs.write_text(&path, "FROM scratch").unwrap();

        assert!(fs.is_dir(&temp.path().join("a/b/c")));
        assert_eq!(fs.read_to_string(&path).unwrap(), "FROM scratch");
    }

    #[test]
    fn test_write_text_overwrites() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let path = temp.path().join("Dockerfile");

        fs.write_text(&path, "FROM old\nRUN echo old").unwrap();
        fs.write_text(&path, "FROM new").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "FROM new");
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        let result = fs.read_to_string(&temp.path().join("missing"));
        assert!(result.is_err());
        assert!(!fs.exists(&temp.path().join("missing")));
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let src = temp.path().join("setup.ps1");
        std::fs::write(&src, "Write-Host setup").unwrap();

        let dest = temp.path().join("ctx/app/files/setup.ps1");
        fs.copy_file(&src, &dest).unwrap();

        assert_eq!(fs.read_to_string(&dest).unwrap(), "Write-Host setup");
        assert_eq!(fs.read_to_string(&src).unwrap(), "Write-Host setup");
    }

    #[test]
    fn test_copy_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();

        let result = fs.copy_file(&temp.path().join("missing"), &temp.path().join("out"));

        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to copy"));
    }

    #[test]
    fn test_copy_dir_is_recursive() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let src = temp.path().join("assets");
        std::fs::create_dir_all(src.join("nested/deeper")).unwrap();
        std::fs::write(src.join("a.txt"), "a").unwrap();
        std::fs::write(src.join("nested/deeper/b.txt"), "b").unwrap();

        let dest = temp.path().join("ctx/app/assets");
        fs.write_text(&dest.join("keep.txt"), "kept").unwrap();
        fs.copy_dir(&src, &dest).unwrap();

        assert_eq!(fs.read_to_string(&dest.join("a.txt")).unwrap(), "a");
        assert_eq!(fs.read_to_string(&dest.join("nested/deeper/b.txt")).unwrap(), "b");
        assert_eq!(fs.read_to_string(&dest.join("keep.txt")).unwrap(), "kept");
    }

    #[test]
    fn test_copy_dir_requires_directory() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(fs.copy_dir(&file, &temp.path().join("out")).is_err());
        assert!(fs.copy_dir(&temp.path().join("missing"), &temp.path().join("out")).is_err());
    }

    #[test]
    fn test_write_json_is_pretty() {
        let temp = TempDir::new().unwrap();
        let fs = RealFileSystem::new();
        let path = temp.path().join("ctx/config.json");

        fs.write_json(&path, &serde_json::json!({ "name": "app" }))
            .unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "{\n  \"name\": \"app\"\n}");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_text_into_read_only_directory_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let locked = temp.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();

        let fs = RealFileSystem::new();
        let result = fs.write_text(&locked.join("Dockerfile"), "FROM scratch");

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();

        // root ignores directory permissions
        if result.is_ok() {
            return;
        }
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to write file"));
    }
}
