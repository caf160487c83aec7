//! Defines the project file format (`svgbarrel.json`) that configures which
//! directories are synchronized and how barrels are generated.
//!
//! Project files are loaded out-of-band with plain filesystem calls rather
//! than through the Vfs: they configure the engine, they are not part of the
//! tree it manages.

use std::io;
use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub static PROJECT_FILENAME: &str = "svgbarrel.json";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no project file was found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("the project file at {} is malformed", .path.display())]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("the project file at {} does not configure any icon directories", .path.display())]
    NoIconDirs { path: PathBuf },

    #[error(transparent)]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Configuration for one synchronization session, as described by a project
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Directories whose SVG icons are indexed into barrel modules. Relative
    /// entries are resolved against the folder containing the project file.
    ///
    /// Each directory is managed independently. Listing a directory that sits
    /// inside another listed directory leaves the overlap's behavior
    /// undefined.
    #[serde(default)]
    pub icon_dirs: Vec<PathBuf>,

    /// File name of the barrel module generated in each scanned directory.
    #[serde(default = "default_index_file_name")]
    pub index_file_name: String,

    /// Whether the session keeps regenerating barrels as icons change after
    /// the initial scan.
    #[serde(default = "default_true")]
    pub watch: bool,

    /// Whether scans descend into subdirectories, each of which gets a
    /// barrel of its own.
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Prefix prepended to every derived component name.
    #[serde(default)]
    pub component_prefix: String,

    /// Folder the project file was found in. Not part of the file itself.
    #[serde(skip)]
    pub folder_location: PathBuf,
}

fn default_index_file_name() -> String {
    "index.ts".to_owned()
}

fn default_true() -> bool {
    true
}

impl Project {
    /// Loads a project from the given path, which may name the project file
    /// itself or a folder containing one.
    pub fn load_fuzzy(fuzzy_path: &Path) -> Result<Project, ProjectError> {
        let path = if fuzzy_path.is_dir() {
            fuzzy_path.join(PROJECT_FILENAME)
        } else {
            fuzzy_path.to_path_buf()
        };

        Self::load_exact(&path)
    }

    /// Loads a project from a path that must be the project file.
    pub fn load_exact(path: &Path) -> Result<Project, ProjectError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ProjectError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let mut project: Project =
            serde_json::from_str(&contents).map_err(|source| ProjectError::Json {
                source,
                path: path.to_path_buf(),
            })?;

        if project.icon_dirs.is_empty() {
            return Err(ProjectError::NoIconDirs {
                path: path.to_path_buf(),
            });
        }

        project.folder_location = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };

        Ok(project)
    }

    /// The configured icon directories with relative entries resolved
    /// against the project file's folder.
    pub fn resolved_icon_dirs(&self) -> Vec<PathBuf> {
        self.icon_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.folder_location.join(dir)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::Write;

    fn write_project(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(PROJECT_FILENAME);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn defaults_are_filled_in() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), r#"{ "iconDirs": ["src/icons"] }"#);

        let project = Project::load_fuzzy(dir.path()).unwrap();

        assert_eq!(project.icon_dirs, vec![PathBuf::from("src/icons")]);
        assert_eq!(project.index_file_name, "index.ts");
        assert!(project.watch);
        assert!(project.recursive);
        assert_eq!(project.component_prefix, "");
    }

    #[test]
    fn all_fields_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            r#"{
                "iconDirs": ["a", "b"],
                "indexFileName": "icons.ts",
                "watch": false,
                "recursive": false,
                "componentPrefix": "Icon"
            }"#,
        );

        let project = Project::load_fuzzy(dir.path()).unwrap();

        assert_eq!(project.icon_dirs.len(), 2);
        assert_eq!(project.index_file_name, "icons.ts");
        assert!(!project.watch);
        assert!(!project.recursive);
        assert_eq!(project.component_prefix, "Icon");
    }

    #[test]
    fn relative_dirs_resolve_against_the_project_folder() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), r#"{ "iconDirs": ["src/icons", "/abs/icons"] }"#);

        let project = Project::load_fuzzy(dir.path()).unwrap();
        let resolved = project.resolved_icon_dirs();

        assert_eq!(resolved[0], dir.path().join("src/icons"));
        assert_eq!(resolved[1], PathBuf::from("/abs/icons"));
    }

    #[test]
    fn empty_icon_dirs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), r#"{ "iconDirs": [] }"#);

        let err = Project::load_fuzzy(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NoIconDirs { .. }));
    }

    #[test]
    fn missing_icon_dirs_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), r#"{}"#);

        let err = Project::load_fuzzy(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NoIconDirs { .. }));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = Project::load_fuzzy(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn malformed_json_is_reported_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        write_project(dir.path(), "{ not json");

        let err = Project::load_fuzzy(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::Json { .. }));
        assert!(err.to_string().contains(PROJECT_FILENAME));
    }
}
