//! Filesystem queries used by the resolver.

use std::io;
use std::path::Path;

use crate::fs::paths::same_file;

/// Read-only view of the filesystem the resolver checks candidates against.
pub trait FileProbe {
    /// Whether anything (file, directory, dangling link) occupies `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether two paths refer to the same underlying file.
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;
}

/// The local filesystem, queried fresh on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        same_file(a, b)
    }
}
