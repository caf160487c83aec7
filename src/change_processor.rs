//! Defines the process by which changes are pulled from the Vfs, filtered,
//! and turned into scoped barrel regenerations during a live session.
//!
//! This object is owned by a SyncSession.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{select, Receiver, Sender};
use jod_thread::JoinHandle;

use watchfs::FsEvent;

use crate::{barrel::ICON_SUFFIX, synchronizer::BarrelSynchronizer};

pub struct ChangeProcessor {
    shutdown_sender: Sender<()>,
    _thread_handle: JoinHandle<()>,
}

impl ChangeProcessor {
    pub fn start(
        synchronizer: Arc<BarrelSynchronizer>,
        roots: Vec<PathBuf>,
        events: Receiver<FsEvent>,
        rescan_sender: Sender<PathBuf>,
    ) -> Self {
        let (shutdown_sender, shutdown_receiver) = crossbeam_channel::bounded(1);

        let thread_handle = jod_thread::Builder::new()
            .name("ChangeProcessor thread".to_owned())
            .spawn(move || {
                log::trace!("ChangeProcessor thread started");
                Self::main_task(shutdown_receiver, synchronizer, roots, events, rescan_sender);
                log::trace!("ChangeProcessor thread stopped");
            })
            .expect("Could not start ChangeProcessor thread");

        Self {
            shutdown_sender,
            _thread_handle: thread_handle,
        }
    }

    fn main_task(
        shutdown_receiver: Receiver<()>,
        synchronizer: Arc<BarrelSynchronizer>,
        roots: Vec<PathBuf>,
        events: Receiver<FsEvent>,
        rescan_sender: Sender<PathBuf>,
    ) {
        loop {
            select! {
                recv(events) -> event => {
                    let event = match event {
                        Ok(event) => event,
                        Err(_) => break,
                    };

                    log::trace!("Fs event: {:?}", event);

                    let path = event.path();

                    if !is_icon_path(path) {
                        continue;
                    }

                    // The roots themselves are containers, never icons,
                    // even when a root's own name matches the suffix.
                    if !roots.iter().any(|root| path.starts_with(root) && path != root) {
                        log::trace!("Ignoring event outside all watched roots");
                        continue;
                    }

                    let dir = match path.parent() {
                        Some(dir) => dir.to_path_buf(),
                        None => continue,
                    };

                    // One failed regeneration must not take the session
                    // down; the next event gets a fresh chance.
                    match synchronizer.handle_change(path) {
                        Ok(true) => {
                            let _ = rescan_sender.send(dir);
                        }
                        Ok(false) => {}
                        Err(err) => {
                            log::error!(
                                "Failed to regenerate barrel in {}: {}",
                                dir.display(),
                                err
                            );
                        }
                    }
                },
                recv(shutdown_receiver) -> _ => {
                    log::trace!("ChangeProcessor shutdown signal received");
                    break;
                },
            }
        }
    }
}

impl Drop for ChangeProcessor {
    fn drop(&mut self) {
        // The send wakes the worker immediately; if it already exited, the
        // failed send does not matter.
        let _ = self.shutdown_sender.send(());
    }
}

/// Only files named like icons are interesting; this also keeps the barrels
/// the session writes itself from feeding back into it.
fn is_icon_path(path: &Path) -> bool {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => name.ends_with(ICON_SUFFIX),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn icon_paths_are_classified_by_file_name() {
        assert!(is_icon_path(Path::new("/icons/menu.svg")));
        assert!(is_icon_path(Path::new("/icons/social/arrow-down.svg")));
        assert!(!is_icon_path(Path::new("/icons/index.ts")));
        assert!(!is_icon_path(Path::new("/icons/menu.png")));
        assert!(!is_icon_path(Path::new("/icons/menu.svg.bak")));
    }
}
