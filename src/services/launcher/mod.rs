//! Launcher service: responsibility and boundaries
//!
//! This module is responsible ONLY for answering "is this companion process
//! already running?" against a fresh process-table snapshot and, if not,
//! spawning it detached. It knows nothing about display profiles or window
//! rules; the startup hook decides WHAT to launch.

mod launcher;
mod matcher;
mod process_table;
mod spawner;
mod r#trait;

pub use self::launcher::Launcher;
pub use self::r#trait::create_launcher;
pub use self::spawner::ProcessHandle;

#[cfg(test)]
pub use self::process_table::{ProcessEntry, ProcessSnapshot};
#[cfg(test)]
pub use self::r#trait::{ProcessSpawner, ProcessTable};
