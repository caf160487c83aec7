use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{DirEntry, FsBackend, FsEvent, FsSnapshot, Metadata, ReadDir};

fn not_found<T>(path: &Path) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    ))
}

fn must_be_file<T>(path: &Path) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::Other,
        format!("{} must be a file", path.display()),
    ))
}

fn must_be_dir<T>(path: &Path) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::Other,
        format!("{} must be a directory", path.display()),
    ))
}

/// An in-memory filesystem that can be used as a [`Vfs`][crate::Vfs] backend
/// in tests.
///
/// State is shared between clones, so a test can hand one handle to the Vfs
/// and keep another to mutate the tree and raise events from the outside.
#[derive(Clone)]
pub struct InMemoryFs {
    inner: Arc<Mutex<InMemoryFsInner>>,
}

impl InMemoryFs {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = unbounded();

        InMemoryFs {
            inner: Arc::new(Mutex::new(InMemoryFsInner {
                entries: HashMap::new(),
                orphans: BTreeSet::new(),
                event_sender,
                event_receiver,
            })),
        }
    }

    /// Loads a tree of files and directories at the given path.
    pub fn load_snapshot<P: Into<PathBuf>>(
        &self,
        path: P,
        snapshot: FsSnapshot,
    ) -> io::Result<()> {
        let mut inner = self.lock();
        inner.load_snapshot(path.into(), snapshot);
        Ok(())
    }

    /// Removes a file or directory tree, like a deletion that happened behind
    /// the backend's back. No event is raised.
    pub fn remove<P: AsRef<Path>>(&self, path: P) {
        let mut inner = self.lock();
        inner.remove(path.as_ref());
    }

    /// Delivers an event to whoever holds this backend's event receiver.
    pub fn raise_event(&self, event: FsEvent) {
        // The receiver stored alongside the sender keeps the channel
        // connected even before anyone subscribes.
        let inner = self.lock();
        let _ = inner.event_sender.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryFsInner> {
        self.inner.lock().unwrap()
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

struct InMemoryFsInner {
    entries: HashMap<PathBuf, Entry>,
    orphans: BTreeSet<PathBuf>,
    event_sender: Sender<FsEvent>,
    event_receiver: Receiver<FsEvent>,
}

impl InMemoryFsInner {
    fn load_snapshot(&mut self, path: PathBuf, snapshot: FsSnapshot) {
        match snapshot {
            FsSnapshot::File { contents } => {
                self.insert_entry(path, Entry::File { contents });
            }
            FsSnapshot::Dir { children } => {
                self.insert_entry(
                    path.clone(),
                    Entry::Dir {
                        children: BTreeSet::new(),
                    },
                );

                for (name, child) in children {
                    self.load_snapshot(path.join(name), child);
                }
            }
        }
    }

    fn insert_entry(&mut self, path: PathBuf, entry: Entry) {
        let linked = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                match self.entries.get_mut(parent) {
                    Some(Entry::Dir { children }) => {
                        children.insert(path.clone());
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        };

        if !linked {
            self.orphans.insert(path.clone());
        }

        self.entries.insert(path, entry);
    }

    fn remove(&mut self, path: &Path) {
        if let Some(Entry::Dir { children }) = self.entries.remove(path) {
            for child in children {
                self.remove(&child);
            }
        }

        if let Some(parent) = path.parent() {
            if let Some(Entry::Dir { children }) = self.entries.get_mut(parent) {
                children.remove(path);
            }
        }

        self.orphans.remove(path);
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.entries.get(path) {
            Some(Entry::File { contents }) => Ok(contents.clone()),
            Some(Entry::Dir { .. }) => must_be_file(path),
            None => not_found(path),
        }
    }

    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()> {
        match self.entries.get_mut(path) {
            Some(Entry::File { contents }) => {
                *contents = data.to_vec();
                Ok(())
            }
            Some(Entry::Dir { .. }) => must_be_file(path),
            None => {
                self.insert_entry(
                    path.to_path_buf(),
                    Entry::File {
                        contents: data.to_vec(),
                    },
                );
                Ok(())
            }
        }
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        match self.entries.get(path) {
            // Children are kept in a BTreeSet, so enumeration order is
            // stable and name-sorted.
            Some(Entry::Dir { children }) => Ok(children.iter().cloned().collect()),
            Some(Entry::File { .. }) => must_be_dir(path),
            None => not_found(path),
        }
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        match self.entries.get(path) {
            Some(Entry::File { .. }) => Ok(Metadata { is_file: true }),
            Some(Entry::Dir { .. }) => Ok(Metadata { is_file: false }),
            None => not_found(path),
        }
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        let mut ancestors: Vec<PathBuf> = path.ancestors().map(Path::to_path_buf).collect();
        ancestors.reverse();

        for ancestor in ancestors {
            if ancestor.as_os_str().is_empty() {
                continue;
            }

            match self.entries.get(&ancestor) {
                Some(Entry::Dir { .. }) => {}
                Some(Entry::File { .. }) => return must_be_dir(&ancestor),
                None => self.insert_entry(
                    ancestor,
                    Entry::Dir {
                        children: BTreeSet::new(),
                    },
                ),
            }
        }

        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::new();

        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                other => resolved.push(other.as_os_str()),
            }
        }

        if self.entries.contains_key(&resolved) {
            Ok(resolved)
        } else {
            not_found(&resolved)
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    File { contents: Vec<u8> },
    Dir { children: BTreeSet<PathBuf> },
}

impl FsBackend for InMemoryFs {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>> {
        self.lock().read(path)
    }

    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.lock().write(path, data)
    }

    fn read_dir(&mut self, path: &Path) -> io::Result<ReadDir> {
        let paths = self.lock().read_dir(path)?;
        let entries: Vec<io::Result<DirEntry>> = paths
            .into_iter()
            .map(|path| Ok(DirEntry { path }))
            .collect();

        Ok(ReadDir {
            inner: Box::new(entries.into_iter()),
        })
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        self.lock().create_dir_all(path)
    }

    fn metadata(&mut self, path: &Path) -> io::Result<Metadata> {
        self.lock().metadata(path)
    }

    fn canonicalize(&mut self, path: &Path) -> io::Result<PathBuf> {
        self.lock().canonicalize(path)
    }

    fn event_receiver(&self) -> Receiver<FsEvent> {
        self.lock().event_receiver.clone()
    }

    fn watch(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn unwatch(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
