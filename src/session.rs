//! A SyncSession is the engine's entry point: constructing one validates the
//! configuration, performs the initial generation pass over every icon
//! directory, and, if enabled, keeps the barrels live until shutdown.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use thiserror::Error;

use watchfs::Vfs;

use crate::{
    change_processor::ChangeProcessor, project::Project, synchronizer::BarrelSynchronizer,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("at least one icon directory must be configured")]
    NoIconDirs,

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}

/// One live run of the engine over a single project.
///
/// Everything happens in `new`: missing roots are created, every root is
/// scanned, and with watching enabled a change processor keeps running in
/// the background until the session is shut down or dropped.
pub struct SyncSession {
    project: Project,
    roots: Vec<PathBuf>,
    vfs: Arc<Vfs>,

    /// Yields the directory of every barrel regenerated after the initial
    /// pass, mostly so hosts and tests can wait for changes to settle.
    rescan_receiver: Receiver<PathBuf>,

    change_processor: Option<ChangeProcessor>,
}

impl SyncSession {
    /// Starts a new session: the single call a host makes once its own
    /// configuration is final. When it returns, every configured directory
    /// exists and holds an up-to-date barrel.
    pub fn new(vfs: Vfs, project: Project) -> Result<SyncSession, SessionError> {
        if project.icon_dirs.is_empty() {
            return Err(SessionError::NoIconDirs);
        }

        let roots = project.resolved_icon_dirs();
        let vfs = Arc::new(vfs);
        let synchronizer = Arc::new(BarrelSynchronizer::new(Arc::clone(&vfs), &project));

        log::trace!("Starting SyncSession with {} root(s)", roots.len());

        for root in &roots {
            vfs.create_dir_all(root)?;
            synchronizer.sync_root(root)?;
        }

        let (rescan_sender, rescan_receiver) = crossbeam_channel::unbounded();

        let change_processor = if project.watch {
            for root in &roots {
                vfs.watch(root)?;
                log::info!("Watching for changes in {}", root.display());
            }

            log::trace!("Starting ChangeProcessor");
            Some(ChangeProcessor::start(
                Arc::clone(&synchronizer),
                roots.clone(),
                vfs.event_receiver(),
                rescan_sender,
            ))
        } else {
            None
        };

        Ok(SyncSession {
            project,
            roots,
            vfs,
            rescan_receiver,
            change_processor,
        })
    }

    /// Whether this session keeps reacting to changes after the initial
    /// pass.
    pub fn is_watching(&self) -> bool {
        self.change_processor.is_some()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The fully resolved icon directories this session manages.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// A channel that yields the directory of every barrel regenerated in
    /// response to a change.
    pub fn rescan_receiver(&self) -> Receiver<PathBuf> {
        self.rescan_receiver.clone()
    }

    /// Stops the change processor and unsubscribes from every watched root.
    ///
    /// Dropping the session has the same effect; this form reports unwatch
    /// errors instead of swallowing them.
    pub fn shutdown(mut self) -> io::Result<()> {
        // Joins the worker thread, so no regeneration races the unwatch
        // calls below. A session that never watched has nothing to
        // unsubscribe.
        let was_watching = self.change_processor.take().is_some();

        if was_watching {
            for root in &self.roots {
                self.vfs.unwatch(root)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::time::Duration;

    use maplit::hashmap;
    use watchfs::{FsEvent, FsSnapshot, InMemoryFs};

    fn test_project(icon_dirs: Vec<PathBuf>, watch: bool) -> Project {
        Project {
            icon_dirs,
            index_file_name: "index.ts".to_owned(),
            watch,
            recursive: true,
            component_prefix: String::new(),
            folder_location: PathBuf::from("/"),
        }
    }

    #[test]
    fn session_requires_at_least_one_root() {
        let vfs = Vfs::new(InMemoryFs::new());

        assert!(matches!(
            SyncSession::new(vfs, test_project(vec![], false)),
            Err(SessionError::NoIconDirs)
        ));
    }

    #[test]
    fn missing_roots_are_created_and_seeded() {
        let imfs = InMemoryFs::new();
        let vfs = Vfs::new(imfs);

        let project = test_project(vec![PathBuf::from("/app/icons")], false);
        let session = SyncSession::new(vfs, project).unwrap();

        assert!(!session.is_watching());
        assert_eq!(
            session.vfs.read_to_string("/app/icons/index.ts").unwrap(),
            "// No SVG icons found in this directory.\n"
        );
    }

    #[test]
    fn initial_pass_covers_every_root() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot(
            "/a",
            FsSnapshot::dir(hashmap! {
                "close.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();
        imfs.load_snapshot(
            "/b",
            FsSnapshot::dir(hashmap! {
                "menu.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();

        let vfs = Vfs::new(imfs);
        let project = test_project(vec![PathBuf::from("/a"), PathBuf::from("/b")], false);
        let session = SyncSession::new(vfs, project).unwrap();

        assert!(session
            .vfs
            .read_to_string("/a/index.ts")
            .unwrap()
            .contains("Close"));
        assert!(session
            .vfs
            .read_to_string("/b/index.ts")
            .unwrap()
            .contains("Menu"));
    }

    #[test]
    fn added_icon_is_picked_up_while_watching() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot(
            "/icons",
            FsSnapshot::dir(hashmap! {
                "menu.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        assert!(session.is_watching());

        let rescans = session.rescan_receiver();

        imfs.load_snapshot("/icons/close.svg", FsSnapshot::file("<svg/>"))
            .unwrap();
        imfs.raise_event(FsEvent::Add(PathBuf::from("/icons/close.svg")));

        let dir = rescans.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(dir, PathBuf::from("/icons"));

        assert_eq!(
            session.vfs.read_to_string("/icons/index.ts").unwrap(),
            "import Close from './close.svg?react';\n\
             import Menu from './menu.svg?react';\n\
             \n\
             export {\n\
             \x20 Close,\n\
             \x20 Menu\n\
             };\n"
        );
    }

    #[test]
    fn removed_icon_leaves_the_barrel_without_it() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot(
            "/icons",
            FsSnapshot::dir(hashmap! {
                "close.svg" => FsSnapshot::file("<svg/>"),
                "menu.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        let rescans = session.rescan_receiver();

        imfs.remove("/icons/close.svg");
        imfs.raise_event(FsEvent::Remove(PathBuf::from("/icons/close.svg")));

        rescans.recv_timeout(Duration::from_secs(1)).unwrap();

        let barrel = session.vfs.read_to_string("/icons/index.ts").unwrap();
        assert!(!barrel.contains("Close"));
        assert!(barrel.contains("Menu"));
    }

    #[test]
    fn events_for_non_icon_files_are_ignored() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot(
            "/icons",
            FsSnapshot::dir(hashmap! {
                "menu.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        let rescans = session.rescan_receiver();

        imfs.load_snapshot("/icons/notes.txt", FsSnapshot::file("hello"))
            .unwrap();
        imfs.raise_event(FsEvent::Add(PathBuf::from("/icons/notes.txt")));

        assert!(rescans.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn events_outside_the_roots_are_ignored() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot("/icons", FsSnapshot::empty_dir()).unwrap();
        imfs.load_snapshot(
            "/elsewhere",
            FsSnapshot::dir(hashmap! {
                "menu.svg" => FsSnapshot::file("<svg/>"),
            }),
        )
        .unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        let rescans = session.rescan_receiver();

        imfs.raise_event(FsEvent::Add(PathBuf::from("/elsewhere/menu.svg")));

        assert!(rescans.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(session.vfs.metadata("/elsewhere/index.ts").is_err());
    }

    #[test]
    fn events_for_a_root_named_like_an_icon_are_ignored() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot("/app/icons.svg", FsSnapshot::empty_dir())
            .unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/app/icons.svg")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        let rescans = session.rescan_receiver();

        // The watcher reports the root directory itself; treating it as an
        // icon would regenerate its parent, which is outside every root.
        imfs.raise_event(FsEvent::Modify(PathBuf::from("/app/icons.svg")));

        assert!(rescans.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(session.vfs.metadata("/app/index.ts").is_err());
    }

    #[test]
    fn vanished_directories_do_not_report_rescans() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot("/icons", FsSnapshot::empty_dir()).unwrap();

        let vfs = Vfs::new(imfs.clone());
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        let rescans = session.rescan_receiver();

        // An icon event can outlive its directory when a whole subtree is
        // deleted at once; nothing gets regenerated, so nothing is reported.
        imfs.raise_event(FsEvent::Remove(PathBuf::from("/icons/gone/menu.svg")));

        assert!(rescans.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn shutdown_joins_the_change_processor() {
        let imfs = InMemoryFs::new();
        imfs.load_snapshot("/icons", FsSnapshot::empty_dir()).unwrap();

        let vfs = Vfs::new(imfs);
        let project = test_project(vec![PathBuf::from("/icons")], true);
        let session = SyncSession::new(vfs, project).unwrap();

        session.shutdown().unwrap();
    }

    #[test]
    fn shutdown_without_watching_is_clean() {
        let dir = tempfile::tempdir().unwrap();

        let project = test_project(vec![dir.path().join("icons")], false);
        let session = SyncSession::new(Vfs::new_default(), project).unwrap();

        assert!(!session.is_watching());
        session.shutdown().unwrap();
    }
}
