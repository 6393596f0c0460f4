//! Destinations for rendered pages. A [`Sink`] receives `(relative path,
//! content)` pairs; the builder decides the paths and the sink decides where
//! they end up.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Accepts rendered pages.
pub trait Sink {
    /// Stores `content` at `relative_path`. Paths use `/` separators and never
    /// start with one.
    fn write(&mut self, relative_path: &Path, content: &str) -> Result<()>;
}

/// Writes pages to files under a root directory, creating parent directories
/// on first use.
pub struct DirSink {
    root: PathBuf,
    seen_dirs: HashSet<PathBuf>,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> DirSink {
        DirSink {
            root: root.into(),
            seen_dirs: HashSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Removes `relative_dir` under the root along with everything in it.
    /// A directory that doesn't exist is not an error. `relative_dir` must
    /// name a directory strictly below the root.
    pub fn clean(&mut self, relative_dir: &Path) -> Result<()> {
        let mut components = relative_dir.components().peekable();
        if components.peek().is_none()
            || !components.all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::CleanOutsideRoot(relative_dir.to_owned()));
        }
        let dir = self.root.join(relative_dir);
        self.seen_dirs.retain(|seen| !seen.starts_with(&dir));
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) => match e.kind() {
                io::ErrorKind::NotFound => Ok(()),
                _ => Err(Error::Clean { path: dir, err: e }),
            },
        }
    }
}

impl Sink for DirSink {
    fn write(&mut self, relative_path: &Path, content: &str) -> Result<()> {
        let path = self.root.join(relative_path);
        if let Some(dir) = path.parent() {
            if self.seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir).map_err(|err| Error::Write {
                    path: dir.to_owned(),
                    err,
                })?;
            }
        }
        std::fs::write(&path, content).map_err(|err| Error::Write {
            path: path.clone(),
            err,
        })?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

/// Keeps pages in memory, ordered by path. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    pub fn get(&self, relative_path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(relative_path.as_ref()).map(String::as_str)
    }
}

impl Sink for MemorySink {
    fn write(&mut self, relative_path: &Path, content: &str) -> Result<()> {
        self.files.insert(relative_path.to_owned(), content.to_owned());
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a page or its directory can't be written.
    Write { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: io::Error },

    /// Returned when asked to clean the root itself or a path outside it.
    CleanOutsideRoot(PathBuf),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::CleanOutsideRoot(path) => write!(
                f,
                "Refusing to clean '{}': not a subdirectory of the output root",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { path: _, err } => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::CleanOutsideRoot(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dir_sink_creates_directories() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut sink = DirSink::new(dir.path());
        sink.write(Path::new("index.html"), "home")?;
        sink.write(Path::new("labels/rust-1.html"), "rust")?;
        sink.write(Path::new("labels/web-1.html"), "web")?;

        assert_eq!("home", std::fs::read_to_string(dir.path().join("index.html"))?);
        assert_eq!(
            "rust",
            std::fs::read_to_string(dir.path().join("labels/rust-1.html"))?
        );
        Ok(())
    }

    #[test]
    fn test_dir_sink_clean() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut sink = DirSink::new(dir.path());
        sink.write(Path::new("posts/a.html"), "a")?;
        sink.clean(Path::new("posts"))?;
        assert!(!dir.path().join("posts").exists());

        // cleaning a missing directory is fine, and writing recreates it
        sink.clean(Path::new("posts"))?;
        sink.write(Path::new("posts/b.html"), "b")?;
        assert!(dir.path().join("posts/b.html").is_file());
        Ok(())
    }

    #[test]
    fn test_dir_sink_clean_stays_below_root() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let mut sink = DirSink::new(dir.path());
        sink.write(Path::new("CNAME"), "example.org")?;
        for bad in ["", ".", "..", "posts/../.."] {
            assert!(
                matches!(sink.clean(Path::new(bad)), Err(Error::CleanOutsideRoot(_))),
                "cleaned {:?}",
                bad
            );
        }
        assert!(dir.path().join("CNAME").is_file());
        Ok(())
    }

    #[test]
    fn test_memory_sink_overwrites() -> Result<()> {
        let mut sink = MemorySink::new();
        sink.write(Path::new("labels/c-1.html"), "first")?;
        sink.write(Path::new("labels/c-1.html"), "second")?;
        assert_eq!(Some("second"), sink.get("labels/c-1.html"));
        assert_eq!(1, sink.files.len());
        Ok(())
    }
}
