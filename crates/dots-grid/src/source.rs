//! Where program and library text comes from.
//!
//! The loader never touches the filesystem directly; it goes through a
//! [`SourceProvider`]. [`FsSource`] reads real files, [`MemorySource`]
//! serves a fixed set of in-memory files (tests, embedded programs).

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Supplies program text by path.
pub trait SourceProvider {
    /// Read the whole file at `path` as UTF-8 text.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// A stable identity for `path`, used to detect include cycles.
    ///
    /// Two spellings of the same file must map to the same identity.
    fn identity(&self, path: &Path) -> PathBuf;
}

impl<P: SourceProvider + ?Sized> SourceProvider for &P {
    fn read(&self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }

    fn identity(&self, path: &Path) -> PathBuf {
        (**self).identity(path)
    }
}

/// Reads files from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl SourceProvider for FsSource {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn identity(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }
}

/// Serves files from an in-memory map keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, String>,
}

impl MemorySource {
    /// An empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Add (or replace) a file in place.
    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), text.into());
    }
}

impl SourceProvider for MemorySource {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory file '{}'", path.display()),
            )
        })
    }

    fn identity(&self, path: &Path) -> PathBuf {
        normalize(path)
    }
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dot_segments() {
        assert_eq!(normalize(Path::new("a/./b/../c.dots")), PathBuf::from("a/c.dots"));
        assert_eq!(normalize(Path::new("./x.dots")), PathBuf::from("x.dots"));
    }

    #[test]
    fn memory_source_reads_by_any_spelling() {
        let src = MemorySource::new().with_file("lib/add.dots", "-");
        assert_eq!(src.read(Path::new("lib/./add.dots")).unwrap(), "-");
        assert_eq!(
            src.identity(Path::new("lib/x/../add.dots")),
            src.identity(Path::new("lib/add.dots"))
        );
    }

    #[test]
    fn memory_source_missing_file_is_not_found() {
        let err = MemorySource::new().read(Path::new("nope.dots")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
