use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryType {
    File,
    Directory,
}

#[derive(Debug, Clone)]
struct MockEntry {
    content: Option<String>,
    entry_type: EntryType,
}

/// In-memory file system that records every write
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    read_only: RwLock<HashSet<PathBuf>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            read_only: RwLock::new(HashSet::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files.write().unwrap();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                entry_type: EntryType::File,
            },
        );
    }

    /// Makes writes under `path` fail, emulating a permission error
    pub fn deny_writes(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        self.read_only.write().unwrap().insert(path);
    }

    /// Paths of all files currently stored, in sorted order
    pub fn files(&self) -> Vec<PathBuf> {
        self.files
            .read()
            .unwrap()
            .iter()
            .filter(|(_, e)| e.entry_type == EntryType::File)
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                entry_type: EntryType::Directory,
            });
        }
    }

    fn is_denied(&self, path: &Path) -> bool {
        self.read_only
            .read()
            .unwrap()
            .iter()
            .any(|denied| path.starts_with(denied))
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files.read().unwrap().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.files
            .read()
            .unwrap()
            .get(&path)
            .map(|e| e.entry_type == EntryType::Directory)
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let files = self.files.read().unwrap();
        let entry = files
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        if self.is_denied(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        let mut files = self.files.write().unwrap();
        Self::ensure_parents(&mut files, &path);
        Ok(())
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        let path = self.normalize_path(path);
        if self.is_denied(&path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        if self.is_dir(&path) {
            return Err(anyhow!("Is a directory: {:?}", path));
        }
        self.add_file(&path, content);
        Ok(())
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> Result<()> {
        let content = self.read_to_string(src)?;
        self.write_text(dest, &content)
    }

    fn copy_dir(&self, src: &Path, dest: &Path) -> Result<()> {
        let src = self.normalize_path(src);
        let dest = self.normalize_path(dest);
        if !self.is_dir(&src) {
            return Err(anyhow!("Not a directory: {:?}", src));
        }
        self.create_dir_all(&dest)?;

        let nested: Vec<(PathBuf, MockEntry)> = self
            .files
            .read()
            .unwrap()
            .range(src.clone()..)
            .take_while(|(path, _)| path.starts_with(&src))
            .filter(|(path, _)| *path != &src)
            .map(|(path, entry)| (path.clone(), entry.clone()))
            .collect();

        for (path, entry) in nested {
            let relative = path.strip_prefix(&src)?;
            let target = dest.join(relative);
            match entry.content {
                Some(content) => self.write_text(&target, &content)?,
                None => self.create_dir_all(&target)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello");

        assert!(fs.exists(Path::new("/mock/test.txt")));
        assert!(fs.is_dir(Path::new("/mock")));
    }

    #[test]
    fn test_write_text_creates_parents() {
        let fs = MockFileSystem::new();
        fs.write_text(Path::new(".dockercontexts/app/Dockerfile"), "FROM base")
            .unwrap();

        assert!(fs.is_dir(Path::new("/mock/.dockercontexts/app")));
        assert_eq!(
            fs.read_to_string(Path::new("/mock/.dockercontexts/app/Dockerfile"))
                .unwrap(),
            "FROM base"
        );
    }

    #[test]
    fn test_write_text_overwrites() {
        let fs = MockFileSystem::new();
        fs.write_text(Path::new("a.txt"), "one").unwrap();
        fs.write_text(Path::new("a.txt"), "two").unwrap();

        assert_eq!(fs.read_to_string(Path::new("a.txt")).unwrap(), "two");
        assert_eq!(fs.files(), vec![PathBuf::from("/mock/a.txt")]);
    }

    #[test]
    fn test_deny_writes() {
        let fs = MockFileSystem::new();
        fs.deny_writes("locked");

        assert!(fs.write_text(Path::new("locked/file"), "x").is_err());
        assert!(fs.create_dir_all(Path::new("locked/sub")).is_err());
        assert!(fs.write_text(Path::new("open/file"), "x").is_ok());
    }

    #[test]
    fn test_write_over_directory_fails() {
        let fs = MockFileSystem::new();
        fs.create_dir_all(Path::new("dir")).unwrap();

        assert!(fs.write_text(Path::new("dir"), "x").is_err());
    }

    #[test]
    fn test_copy_file() {
        let fs = MockFileSystem::new();
        fs.add_file("/host/setup.ps1", "Write-Host setup");

        fs.copy_file(Path::new("/host/setup.ps1"), Path::new("ctx/app/files/setup.ps1"))
            .unwrap();

        assert_eq!(
            fs.read_to_string(Path::new("ctx/app/files/setup.ps1")).unwrap(),
            "Write-Host setup"
        );
        assert!(fs.copy_file(Path::new("/host/missing"), Path::new("out")).is_err());
    }

    #[test]
    fn test_copy_dir_recursive() {
        let fs = MockFileSystem::new();
        fs.add_file("/host/assets/a.txt", "a");
        fs.add_file("/host/assets/nested/b.txt", "b");
        fs.add_file("/host/assets-other/c.txt", "c");

        fs.copy_dir(Path::new("/host/assets"), Path::new("/ctx/assets"))
            .unwrap();

        assert_eq!(fs.read_to_string(Path::new("/ctx/assets/a.txt")).unwrap(), "a");
        assert_eq!(
            fs.read_to_string(Path::new("/ctx/assets/nested/b.txt")).unwrap(),
            "b"
        );
        assert!(!fs.exists(Path::new("/ctx/assets/c.txt")));
        assert!(fs.copy_dir(Path::new("/host/assets/a.txt"), Path::new("/out")).is_err());
    }

    #[test]
    fn test_write_json_respects_denied_paths() {
        let fs = MockFileSystem::new();
        fs.deny_writes("/locked");
        let value = serde_json::json!({ "packages": ["nodejs"] });

        fs.write_json(Path::new("/ctx/packages.json"), &value).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs.read_to_string(Path::new("/ctx/packages.json")).unwrap())
                .unwrap();
        assert_eq!(written, value);
        assert!(fs.write_json(Path::new("/locked/packages.json"), &value).is_err());
    }
}
