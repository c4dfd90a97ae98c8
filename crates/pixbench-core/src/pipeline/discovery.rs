//! Input discovery: lists the image files directly inside a directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::error::BenchError;

/// Discovers image files in the input directory.
pub struct FileDiscovery {
    suffixes: Vec<String>,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &InputConfig) -> Self {
        Self {
            suffixes: config
                .extensions
                .iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.')))
                .collect(),
        }
    }

    /// List supported files directly inside `dir`, sorted by path.
    ///
    /// Subdirectories are not descended into. A missing or unreadable
    /// directory is an error; there is nothing to benchmark without it.
    /// An entry whose metadata cannot be read (a dangling symlink, say) is
    /// kept when its name matches, so the decoder reports it as one failed
    /// image instead of ending the run.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, BenchError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let Some(path) = err.path().filter(|p| *p != dir).map(Path::to_path_buf)
                    else {
                        return Err(BenchError::Discovery {
                            path: dir.to_path_buf(),
                            source: err,
                        });
                    };
                    if self.is_supported(&path) {
                        tracing::debug!("Keeping unreadable entry {:?}: {}", path, err);
                        files.push(path);
                    } else {
                        tracing::debug!("Skipping unreadable entry {:?}: {}", path, err);
                    }
                    continue;
                }
            };
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        tracing::debug!("Discovered {} image(s) in {:?}", files.len(), dir);
        Ok(files)
    }

    /// Case-sensitive suffix match on the file name.
    fn is_supported(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(&InputConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let discovery = discovery();

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("dir/archive.tar.png")));
        assert!(!discovery.is_supported(Path::new("test.JPG")));
        assert!(!discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("png")));
    }

    #[test]
    fn test_discover_is_flat_and_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "c.jpeg", "notes.txt", "shout.PNG"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }
        let nested = tmp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("deep.png"), b"").unwrap();
        std::fs::create_dir(tmp.path().join("folder.png")).unwrap();

        let files = discovery().discover(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpg", "b.png", "c.jpeg"]);
    }

    #[test]
    fn test_discover_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discovery().discover(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_dir_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discovery().discover(&tmp.path().join("missing")).unwrap_err();
        assert!(matches!(err, BenchError::Discovery { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_kept_for_the_decoder() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("good.png"), b"").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.png"), tmp.path().join("dangling.png"))
            .unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.txt"), tmp.path().join("stale.txt"))
            .unwrap();

        let files = discovery().discover(tmp.path()).unwrap();
        assert_eq!(
            files,
            [tmp.path().join("dangling.png"), tmp.path().join("good.png")]
        );
    }

    #[test]
    fn test_custom_extensions_accept_leading_dot() {
        let config = InputConfig {
            extensions: vec![".bmp".to_string()],
            ..InputConfig::default()
        };
        let discovery = FileDiscovery::new(&config);
        assert!(discovery.is_supported(Path::new("scan.bmp")));
        assert!(!discovery.is_supported(Path::new("scan.png")));
    }
}
