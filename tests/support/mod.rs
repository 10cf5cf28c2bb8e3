use buildsmith::fs::MockFileSystem;
use buildsmith::version::{DefaultProviderSource, ProviderSource};
use buildsmith::SourceView;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SOURCE_ROOT: &str = "/app";
pub const SDK_ROOT: &str = "/opt";

#[allow(dead_code)]
pub fn buildsmith_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_buildsmith"))
}

/// Writes `(path, content)` pairs under `root`. Paths ending in `/` become
/// empty directories.
#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let target = root.join(path.trim_end_matches('/'));
        if path.ends_with('/') {
            fs::create_dir_all(&target).unwrap();
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&target, content).unwrap();
    }
}

/// An in-memory source tree under `/app` plus installed SDK directories
/// under `/opt`, e.g. `python/3.9.7`.
#[allow(dead_code)]
pub fn mock_app(files: &[(&str, &str)], sdks: &[&str]) -> (SourceView, Arc<dyn ProviderSource>) {
    let fs = Arc::new(MockFileSystem::with_root(PathBuf::from(SOURCE_ROOT)));
    for (path, content) in files {
        match path.strip_suffix('/') {
            Some(dir) => fs.add_dir(dir),
            None => fs.add_file(path, content),
        }
    }
    for sdk in sdks {
        fs.add_dir(Path::new(SDK_ROOT).join(sdk));
    }

    let view = SourceView::new(fs.clone(), SOURCE_ROOT);
    let providers: Arc<dyn ProviderSource> = Arc::new(DefaultProviderSource::new(fs));
    (view, providers)
}
