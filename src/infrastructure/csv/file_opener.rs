use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Opens source files for reading.
///
/// Schema inference and record streaming only touch file contents through
/// this trait; path resolution still stats and lists the filesystem directly.
pub trait FileOpener: Send + Sync {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Reads from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileOpener;

impl FileOpener for LocalFileOpener {
    fn open(&self, path: &Path) -> std::io::Result<Box<dyn Read + Send>> {
        // The csv reader buffers internally
        Ok(Box::new(File::open(path)?))
    }
}
