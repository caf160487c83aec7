/*!
Implementation of a virtual filesystem with a pluggable backend and change
watching.

watchfs is the filesystem capability boundary for svgbarrel: everything the
engine learns about icon directories, and every barrel module it writes back,
goes through [`Vfs`]. Code built on top of it can run against the real
filesystem in production and against [`InMemoryFs`] in tests without changing
shape.

## Current features
* Read-and-write API similar to `std::fs`
* Pluggable backends
    * `StdBackend`, which uses `std::fs` and the `notify` crate
    * `InMemoryFs`, a simple in-memory filesystem useful for testing

## Future features
* Hash-based and timestamp-based caching layers
*/

mod in_memory_fs;
mod snapshot;
mod std_backend;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crossbeam_channel::Receiver;

pub use in_memory_fs::InMemoryFs;
pub use snapshot::FsSnapshot;
pub use std_backend::StdBackend;

mod sealed {
    use super::*;

    /// Sealing trait for [`FsBackend`].
    pub trait Sealed {}

    impl Sealed for StdBackend {}
    impl Sealed for InMemoryFs {}
}

/// Trait that transforms `io::Result<T>` into `io::Result<Option<T>>`.
pub trait IoResultExt<T> {
    /// Turns the `NotFound` error case into a successful `None`.
    fn with_not_found(self) -> io::Result<Option<T>>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_not_found(self) -> io::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// A change observed under a watched directory.
///
/// Backends report the most specific kind they know. Consumers that only care
/// that *something* happened to a path can use [`FsEvent::path`].
#[derive(Debug, Clone)]
pub enum FsEvent {
    /// A file or directory appeared at the path.
    Add(PathBuf),
    /// The contents of the file at the path changed.
    Modify(PathBuf),
    /// The file or directory at the path went away.
    Remove(PathBuf),
}

impl FsEvent {
    pub fn path(&self) -> &Path {
        match self {
            FsEvent::Add(path) | FsEvent::Modify(path) | FsEvent::Remove(path) => path,
        }
    }
}

/// Backend that can be used to create a [`Vfs`].
///
/// This trait is sealed and cannot be implemented outside this crate.
pub trait FsBackend: sealed::Sealed + Send + 'static {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()>;
    fn read_dir(&mut self, path: &Path) -> io::Result<ReadDir>;
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;
    fn metadata(&mut self, path: &Path) -> io::Result<Metadata>;
    fn canonicalize(&mut self, path: &Path) -> io::Result<PathBuf>;

    fn event_receiver(&self) -> Receiver<FsEvent>;
    fn watch(&mut self, path: &Path) -> io::Result<()>;
    fn unwatch(&mut self, path: &Path) -> io::Result<()>;
}

/// Vfs equivalent to [`std::fs::DirEntry`].
pub struct DirEntry {
    pub(crate) path: PathBuf,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Vfs equivalent to [`std::fs::ReadDir`].
pub struct ReadDir {
    pub(crate) inner: Box<dyn Iterator<Item = io::Result<DirEntry>>>,
}

impl Iterator for ReadDir {
    type Item = io::Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Vfs equivalent to [`std::fs::Metadata`].
#[derive(Debug)]
pub struct Metadata {
    pub(crate) is_file: bool,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn is_dir(&self) -> bool {
        !self.is_file
    }
}

/// A virtual filesystem with a configurable backend.
///
/// All methods take `&self`; access to the backend is serialized with an
/// internal lock, so a `Vfs` can be shared between threads behind an `Arc`.
pub struct Vfs {
    backend: Mutex<Box<dyn FsBackend>>,
}

impl Vfs {
    /// Creates a new `Vfs` with the given backend.
    pub fn new<B: FsBackend>(backend: B) -> Self {
        Vfs {
            backend: Mutex::new(Box::new(backend)),
        }
    }

    /// Creates a new `Vfs` using the default backend, [`StdBackend`].
    pub fn new_default() -> Self {
        Self::new(StdBackend::new())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Box<dyn FsBackend>> {
        self.backend.lock().unwrap()
    }

    /// Read a file from the VFS, interpreting its contents as UTF-8.
    #[inline]
    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> io::Result<String> {
        let path = path.as_ref();
        let contents = self.lock().read(path)?;

        String::from_utf8(contents).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("File at {} contained invalid UTF-8", path.display()),
            )
        })
    }

    /// Write a file to the VFS, replacing any previous contents.
    #[inline]
    pub fn write<P: AsRef<Path>, C: AsRef<[u8]>>(&self, path: P, contents: C) -> io::Result<()> {
        let path = path.as_ref();
        self.lock().write(path, contents.as_ref())
    }

    /// Read all of the children of a directory.
    #[inline]
    pub fn read_dir<P: AsRef<Path>>(&self, path: P) -> io::Result<ReadDir> {
        let path = path.as_ref();
        self.lock().read_dir(path)
    }

    /// Creates a directory at the provided location, recursively creating
    /// all parent components if they are missing.
    #[inline]
    pub fn create_dir_all<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        self.lock().create_dir_all(path)
    }

    /// Get metadata about a file or directory.
    #[inline]
    pub fn metadata<P: AsRef<Path>>(&self, path: P) -> io::Result<Metadata> {
        let path = path.as_ref();
        self.lock().metadata(path)
    }

    /// Resolve the path to a canonical, absolute form.
    #[inline]
    pub fn canonicalize<P: AsRef<Path>>(&self, path: P) -> io::Result<PathBuf> {
        let path = path.as_ref();
        self.lock().canonicalize(path)
    }

    /// Retrieve the channel that the backend reports changes on.
    ///
    /// Only paths subscribed with [`Vfs::watch`] produce events.
    #[inline]
    pub fn event_receiver(&self) -> Receiver<FsEvent> {
        self.lock().event_receiver()
    }

    /// Subscribe to changes under the given directory and everything below
    /// it.
    #[inline]
    pub fn watch<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        self.lock().watch(path)
    }

    /// Stop watching the given directory.
    #[inline]
    pub fn unwatch<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        self.lock().unwatch(path)
    }
}
