use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use termcolor::{BufferWriter, Color, ColorSpec, WriteColor};
use watchfs::Vfs;

use crate::{project::Project, session::SyncSession};

use super::{resolve_path, GlobalOptions};

/// Generates barrel modules for a project's icon directories, then keeps
/// them in sync as icons change.
#[derive(Debug, Parser)]
pub struct SyncCommand {
    /// Path to the project to sync. Defaults to the current directory.
    #[clap(default_value = "")]
    pub project: PathBuf,

    /// Perform a single generation pass and exit, even if the project
    /// enables watching.
    #[clap(long)]
    pub once: bool,
}

impl SyncCommand {
    pub fn run(self, global: GlobalOptions) -> anyhow::Result<()> {
        let project_path = resolve_path(&self.project);

        let mut project = Project::load_fuzzy(&project_path)
            .with_context(|| format!("Could not load project at {}", project_path.display()))?;

        if self.once {
            project.watch = false;
        }

        let vfs = Vfs::new_default();
        let session = SyncSession::new(vfs, project)?;

        if !session.is_watching() {
            return Ok(());
        }

        show_watch_message(&session, global.color.into())?;

        // The session regenerates barrels on its own thread; this loop only
        // keeps the process alive and surfaces activity at debug level.
        let rescans = session.rescan_receiver();
        while let Ok(dir) = rescans.recv() {
            log::debug!("Regenerated barrel in {}", dir.display());
        }

        Ok(())
    }
}

fn show_watch_message(session: &SyncSession, color: termcolor::ColorChoice) -> io::Result<()> {
    let writer = BufferWriter::stdout(color);
    let mut buffer = writer.buffer();

    writeln!(&mut buffer, "svgbarrel is watching:")?;
    writeln!(&mut buffer)?;

    for root in session.roots() {
        write!(&mut buffer, "  ")?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        writeln!(&mut buffer, "{}", root.display())?;
        buffer.set_color(&ColorSpec::new())?;
    }

    writeln!(&mut buffer)?;
    writeln!(
        &mut buffer,
        "Each directory keeps an up-to-date {}. Press Ctrl+C to stop.",
        session.project().index_file_name
    )?;

    writer.print(&buffer)?;

    Ok(())
}
