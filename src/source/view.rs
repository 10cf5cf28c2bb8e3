use crate::fs::{DirEntry, FileSystem, RealFileSystem};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Directories never descended into when probing for file extensions.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "bin",
    "obj",
    "vendor",
    "__pycache__",
    ".venv",
    "target",
];

type ListingCache = HashMap<PathBuf, Option<Arc<Vec<DirEntry>>>>;

/// Immutable handle to one source directory for the duration of a run.
///
/// Every query is answered relative to `root`. The tree is assumed not to
/// change while the view is alive, so directory listings and file reads are
/// memoized. I/O failures are reported as absence: a file that cannot be read
/// behaves exactly like a file that does not exist.
pub struct SourceView {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    listings: RwLock<ListingCache>,
    reads: RwLock<HashMap<(PathBuf, usize), Option<String>>>,
}

impl SourceView {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
            listings: RwLock::new(HashMap::new()),
            reads: RwLock::new(HashMap::new()),
        }
    }

    /// View over a real directory on disk.
    pub fn for_directory(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(RealFileSystem::new()), root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> PathBuf {
        let trimmed = relative_path.trim_start_matches("./").trim_matches('/');
        if trimmed.is_empty() {
            self.root.clone()
        } else {
            self.root.join(trimmed)
        }
    }

    pub fn exists(&self, relative_path: &str) -> bool {
        self.fs.exists(&self.resolve(relative_path))
    }

    pub fn is_file(&self, relative_path: &str) -> bool {
        self.fs.is_file(&self.resolve(relative_path))
    }

    pub fn is_dir(&self, relative_path: &str) -> bool {
        self.fs.is_dir(&self.resolve(relative_path))
    }

    /// Names of the entries directly under the source root.
    pub fn list_top_level(&self) -> BTreeSet<String> {
        self.list_dir("")
    }

    /// Names of the entries directly under `relative_path`; empty when the
    /// directory is missing or unreadable.
    pub fn list_dir(&self, relative_path: &str) -> BTreeSet<String> {
        self.entries(&self.resolve(relative_path))
            .map(|entries| entries.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Names of the subdirectories directly under `relative_path`.
    pub fn list_subdirectories(&self, relative_path: &str) -> BTreeSet<String> {
        self.entries(&self.resolve(relative_path))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.is_dir())
                    .map(|e| e.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads at most `max_bytes` of a file as text. Missing files, directories
    /// and read failures all yield `None`. Invalid UTF-8 is replaced lossily.
    pub fn read_if_exists(&self, relative_path: &str, max_bytes: usize) -> Option<String> {
        let path = self.resolve(relative_path);
        let key = (path.clone(), max_bytes);

        if let Some(cached) = self
            .reads
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return cached.clone();
        }

        let content = if self.fs.is_file(&path) {
            match self.fs.read_bytes(&path, max_bytes) {
                Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    trace!(path = %path.display(), error = %e, "Treating unreadable file as absent");
                    None
                }
            }
        } else {
            None
        };

        self.reads
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, content.clone());
        content
    }

    /// Relative paths (with `/` separators) of files ending in `.{extension}`,
    /// searched breadth-first down to `max_depth` levels below the root
    /// (depth 1 is the root itself). Well-known dependency and build output
    /// directories are skipped. Results are sorted.
    pub fn find_files_with_extension(&self, extension: &str, max_depth: usize) -> Vec<String> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut found = Vec::new();
        let mut frontier = vec![String::new()];

        for _ in 0..max_depth {
            let mut next = Vec::new();
            for dir in &frontier {
                let Some(entries) = self.entries(&self.resolve(dir)) else {
                    continue;
                };
                for entry in entries.iter() {
                    let relative = if dir.is_empty() {
                        entry.name.clone()
                    } else {
                        format!("{}/{}", dir, entry.name)
                    };
                    if entry.is_file() && entry.name.ends_with(&suffix) {
                        found.push(relative);
                    } else if entry.is_dir() && !IGNORED_DIRS.contains(&entry.name.as_str()) {
                        next.push(relative);
                    }
                }
            }
            frontier = next;
        }

        found.sort();
        found
    }

    /// True when any file with the extension exists within `max_depth` levels.
    pub fn has_files_with_extension(&self, extension: &str, max_depth: usize) -> bool {
        !self.find_files_with_extension(extension, max_depth).is_empty()
    }

    fn entries(&self, path: &Path) -> Option<Arc<Vec<DirEntry>>> {
        if let Some(cached) = self
            .listings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
        {
            return cached.clone();
        }

        let listing = match self.fs.read_dir(path) {
            Ok(mut entries) => {
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                Some(Arc::new(entries))
            }
            Err(e) => {
                trace!(path = %path.display(), error = %e, "Treating unreadable directory as empty");
                None
            }
        };

        self.listings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_path_buf(), listing.clone());
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn mock_view(files: &[(&str, &str)]) -> SourceView {
        let mock = MockFileSystem::new();
        for (path, content) in files {
            mock.add_file(path, content);
        }
        SourceView::new(Arc::new(mock), "/mock")
    }

    #[test]
    fn test_exists_and_top_level() {
        let view = mock_view(&[("requirements.txt", "flask"), ("src/app.py", "")]);

        assert!(view.exists("requirements.txt"));
        assert!(view.exists("./src/app.py"));
        assert!(!view.exists("package.json"));
        assert_eq!(
            view.list_top_level(),
            BTreeSet::from(["requirements.txt".to_string(), "src".to_string()])
        );
    }

    #[test]
    fn test_read_if_exists_bounds_and_absence() {
        let view = mock_view(&[("runtime.txt", "python-3.9.7\n")]);

        assert_eq!(view.read_if_exists("runtime.txt", 6).as_deref(), Some("python"));
        assert_eq!(
            view.read_if_exists("runtime.txt", 1024).as_deref(),
            Some("python-3.9.7\n")
        );
        assert!(view.read_if_exists("missing.txt", 1024).is_none());
    }

    #[test]
    fn test_read_failure_is_absence() {
        let mock = MockFileSystem::new();
        mock.add_unreadable_file("package.json");
        let view = SourceView::new(Arc::new(mock), "/mock");

        assert!(view.exists("package.json"));
        assert!(view.read_if_exists("package.json", 1024).is_none());
    }

    #[test]
    fn test_directory_read_is_absence() {
        let view = mock_view(&[("config/hugo.toml", "")]);
        assert!(view.read_if_exists("config", 1024).is_none());
    }

    #[test]
    fn test_find_files_with_extension_respects_depth_and_ignores() {
        let view = mock_view(&[
            ("main.py", ""),
            ("pkg/util.py", ""),
            ("pkg/deep/more/x.py", ""),
            ("node_modules/dep/index.py", ""),
            ("README.md", ""),
        ]);

        assert_eq!(view.find_files_with_extension("py", 1), vec!["main.py"]);
        assert_eq!(
            view.find_files_with_extension(".py", 2),
            vec!["main.py", "pkg/util.py"]
        );
        assert_eq!(view.find_files_with_extension("py", 4).len(), 3);
        assert!(!view.has_files_with_extension("rb", 4));
    }

    #[test]
    fn test_real_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/app\n\ngo 1.21\n").unwrap();
        fs::create_dir(temp.path().join("cmd")).unwrap();

        let view = SourceView::for_directory(temp.path());
        assert!(view.is_file("go.mod"));
        assert!(view.is_dir("cmd"));
        assert_eq!(
            view.list_subdirectories(""),
            BTreeSet::from(["cmd".to_string()])
        );
        assert!(view
            .read_if_exists("go.mod", 1024)
            .unwrap()
            .contains("go 1.21"));
    }
}
