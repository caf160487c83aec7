use std::io;
use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver};
use notify::{Event, EventKind, RecursiveMode, Watcher};

#[cfg(target_os = "macos")]
use notify::{Config, PollWatcher};

#[cfg(not(target_os = "macos"))]
use notify::RecommendedWatcher;

#[cfg(target_os = "macos")]
use std::time::Duration;

use crate::{DirEntry, FsBackend, FsEvent, Metadata, ReadDir};

/// `Vfs` backend that uses `std::fs` and the `notify` crate for watching.
pub struct StdBackend {
    #[cfg(not(target_os = "macos"))]
    watcher: RecommendedWatcher,

    // The recommended watcher on macOS, FSEvents, reports the directory
    // containing a change rather than the changed file. Poll instead.
    #[cfg(target_os = "macos")]
    watcher: PollWatcher,

    watcher_receiver: Receiver<FsEvent>,
}

impl StdBackend {
    pub fn new() -> StdBackend {
        let (tx, rx) = unbounded();

        let event_handler = move |res: notify::Result<Event>| match res {
            Ok(event) => match event.kind {
                EventKind::Create(_) => {
                    for path in event.paths {
                        let _ = tx.send(FsEvent::Add(path));
                    }
                }
                EventKind::Modify(_) => {
                    for path in event.paths {
                        let _ = tx.send(FsEvent::Modify(path));
                    }
                }
                EventKind::Remove(_) => {
                    for path in event.paths {
                        let _ = tx.send(FsEvent::Remove(path));
                    }
                }
                _ => {}
            },
            Err(e) => println!("watch error: {:?}", e),
        };

        #[cfg(not(target_os = "macos"))]
        let watcher = notify::recommended_watcher(event_handler).unwrap();

        #[cfg(target_os = "macos")]
        let watcher = PollWatcher::new(
            event_handler,
            Config::default().with_poll_interval(Duration::from_millis(200)),
        )
        .unwrap();

        Self {
            watcher,
            watcher_receiver: rx,
        }
    }
}

impl FsBackend for StdBackend {
    fn read(&mut self, path: &Path) -> io::Result<Vec<u8>> {
        fs_err::read(path)
    }

    fn write(&mut self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs_err::write(path, data)
    }

    fn read_dir(&mut self, path: &Path) -> io::Result<ReadDir> {
        let mut entries = fs_err::read_dir(path)?.collect::<io::Result<Vec<_>>>()?;

        // Sort by file name so enumeration order does not depend on the
        // platform's directory iteration order.
        entries.sort_by_cached_key(|entry| entry.file_name());

        let inner = entries
            .into_iter()
            .map(|entry| Ok(DirEntry { path: entry.path() }));

        Ok(ReadDir {
            inner: Box::new(inner),
        })
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        fs_err::create_dir_all(path)
    }

    fn metadata(&mut self, path: &Path) -> io::Result<Metadata> {
        let metadata = fs_err::metadata(path)?;

        Ok(Metadata {
            is_file: metadata.is_file(),
        })
    }

    fn canonicalize(&mut self, path: &Path) -> io::Result<PathBuf> {
        fs_err::canonicalize(path)
    }

    fn event_receiver(&self) -> Receiver<FsEvent> {
        self.watcher_receiver.clone()
    }

    fn watch(&mut self, path: &Path) -> io::Result<()> {
        self.watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|inner| io::Error::new(io::ErrorKind::Other, inner))
    }

    fn unwatch(&mut self, path: &Path) -> io::Result<()> {
        self.watcher
            .unwatch(path)
            .map_err(|inner| io::Error::new(io::ErrorKind::Other, inner))
    }
}

impl Default for StdBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::Vfs;

    #[test]
    fn read_dir_is_sorted_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("zebra.svg"), b"z").unwrap();
        fs_err::write(dir.path().join("aardvark.svg"), b"a").unwrap();
        fs_err::write(dir.path().join("menu.svg"), b"m").unwrap();

        let vfs = Vfs::new_default();

        let names: Vec<String> = vfs
            .read_dir(dir.path())
            .unwrap()
            .map(|entry| {
                entry
                    .unwrap()
                    .path()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(names, vec!["aardvark.svg", "menu.svg", "zebra.svg"]);
    }

    #[test]
    fn metadata_distinguishes_files_from_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("menu.svg"), b"m").unwrap();
        fs_err::create_dir(dir.path().join("social")).unwrap();

        let vfs = Vfs::new_default();

        assert!(vfs.metadata(dir.path().join("menu.svg")).unwrap().is_file());
        assert!(vfs.metadata(dir.path().join("social")).unwrap().is_dir());
        assert!(vfs.metadata(dir.path().join("missing")).is_err());
    }
}
