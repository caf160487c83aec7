pub mod cli;

mod barrel;
mod change_processor;
mod component_name;
mod project;
mod session;
mod synchronizer;

pub use crate::barrel::{render_barrel, BarrelEntry, EMPTY_BARREL, ICON_SUFFIX};
pub use crate::component_name::derive_component_name;
pub use crate::project::{Project, ProjectError, PROJECT_FILENAME};
pub use crate::session::{SessionError, SyncSession};
pub use crate::synchronizer::BarrelSynchronizer;
