//! The scanning half of the engine: enumerates icon directories through the
//! Vfs and writes one barrel module into each directory it visits.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use watchfs::{IoResultExt, Vfs};

use crate::barrel::{render_barrel, BarrelEntry};
use crate::project::Project;

/// Turns directories full of icons into barrel modules.
///
/// A synchronizer is cheap state: the Vfs handle plus the generation options
/// fixed when the session started. All of its methods are scoped to a single
/// directory tree and can be called from any thread.
pub struct BarrelSynchronizer {
    vfs: Arc<Vfs>,
    index_file_name: String,
    component_prefix: String,
    recursive: bool,
}

impl BarrelSynchronizer {
    pub fn new(vfs: Arc<Vfs>, project: &Project) -> BarrelSynchronizer {
        BarrelSynchronizer {
            vfs,
            index_file_name: project.index_file_name.clone(),
            component_prefix: project.component_prefix.clone(),
            recursive: project.recursive,
        }
    }

    /// Synchronizes one configured root: scans it and, when recursion is
    /// enabled, every directory below it, depth-first in enumeration order.
    pub fn sync_root(&self, root: &Path) -> io::Result<()> {
        let mut visited = HashSet::new();
        self.scan(root, self.recursive, &mut visited)
    }

    /// Regenerates the barrel of the single directory that contains the
    /// changed path. Returns whether a scan actually ran.
    ///
    /// A change never cascades: ancestors and siblings hold no references
    /// into this directory, and descendants keep barrels of their own.
    pub fn handle_change(&self, changed_path: &Path) -> io::Result<bool> {
        let dir = match changed_path.parent() {
            Some(dir) => dir,
            None => return Ok(false),
        };

        // The containing directory can be gone by the time the event is
        // processed, like when a whole subtree was deleted at once.
        match self.vfs.metadata(dir).with_not_found()? {
            Some(metadata) if metadata.is_dir() => {
                let mut visited = HashSet::new();
                self.scan(dir, false, &mut visited)?;
                Ok(true)
            }
            _ => {
                log::debug!(
                    "Skipping barrel update for {}: directory no longer exists",
                    dir.display()
                );
                Ok(false)
            }
        }
    }

    fn scan(&self, dir: &Path, recursive: bool, visited: &mut HashSet<PathBuf>) -> io::Result<()> {
        // The visited set is keyed on canonical paths so that a symlink
        // cycle is walked at most once per pass.
        let canonical = match self.vfs.canonicalize(dir) {
            Ok(canonical) => canonical,
            Err(_) => dir.to_path_buf(),
        };

        if !visited.insert(canonical) {
            log::debug!("Skipping {}: already scanned in this pass", dir.display());
            return Ok(());
        }

        let mut entries = Vec::new();
        let mut subdirs = Vec::new();

        for entry in self.vfs.read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if self.vfs.metadata(path)?.is_dir() {
                if recursive {
                    subdirs.push(path.to_path_buf());
                }
                continue;
            }

            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name,
                None => {
                    log::warn!("Skipping {}: file name is not valid UTF-8", path.display());
                    continue;
                }
            };

            if let Some(barrel_entry) =
                BarrelEntry::from_file_name(file_name, &self.component_prefix)
            {
                entries.push(barrel_entry);
            }
        }

        let barrel_path = dir.join(&self.index_file_name);
        self.vfs.write(&barrel_path, render_barrel(&entries))?;

        log::info!("Generated {}", barrel_path.display());

        for subdir in subdirs {
            self.scan(&subdir, true, visited)?;
        }

        Ok(())
    }
}
