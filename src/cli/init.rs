use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Parser;
use fs_err as fs;
use fs_err::OpenOptions;

use crate::project::PROJECT_FILENAME;

use super::resolve_path;

/// Icon directory the generated project file points at.
static DEFAULT_ICON_DIR: &str = "src/assets/icons";

static PROJECT_TEMPLATE: &str = r#"{
  "iconDirs": [
    "src/assets/icons"
  ],
  "indexFileName": "index.ts",
  "watch": true,
  "recursive": true,
  "componentPrefix": ""
}
"#;

static SAMPLE_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <circle cx="12" cy="12" r="10" fill="none" stroke="currentColor" stroke-width="2"/>
</svg>
"#;

/// Initializes a new svgbarrel project.
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Path to the place to create the project. Defaults to the current directory.
    #[clap(default_value = "")]
    pub path: PathBuf,
}

impl InitCommand {
    pub fn run(self) -> anyhow::Result<()> {
        let base_path = resolve_path(&self.path);
        fs::create_dir_all(&base_path)?;

        try_create_project(&base_path, PROJECT_TEMPLATE)?;

        let icon_dir = base_path.join(DEFAULT_ICON_DIR);
        fs::create_dir_all(&icon_dir)?;

        write_if_not_exists(&icon_dir.join("sample-icon.svg"), SAMPLE_ICON)?;

        println!("Created project successfully.");

        Ok(())
    }
}

/// Write a file if it does not exist yet, otherwise, leave it alone.
fn write_if_not_exists(path: &Path, contents: &str) -> Result<(), anyhow::Error> {
    let file_res = OpenOptions::new().write(true).create_new(true).open(path);

    let mut file = match file_res {
        Ok(file) => file,
        Err(err) => {
            return match err.kind() {
                io::ErrorKind::AlreadyExists => Ok(()),
                _ => Err(err.into()),
            }
        }
    };

    file.write_all(contents.as_bytes())?;

    Ok(())
}

/// Try to create a project file and fail if it already exists.
fn try_create_project(base_path: &Path, contents: &str) -> Result<(), anyhow::Error> {
    let project_path = base_path.join(PROJECT_FILENAME);

    let file_res = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&project_path);

    let mut file = match file_res {
        Ok(file) => file,
        Err(err) => {
            return match err.kind() {
                io::ErrorKind::AlreadyExists => {
                    bail!("Project file already exists: {}", project_path.display())
                }
                _ => Err(err.into()),
            }
        }
    };

    file.write_all(contents.as_bytes())?;

    Ok(())
}
