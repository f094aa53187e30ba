use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

use super::launcher::Launcher;
use super::process_table::{ProcessSnapshot, SysinfoProcessTable};
use super::spawner::{DetachedSpawner, DryRunSpawner, ProcessHandle};

/// Источник снимка таблицы процессов
pub trait ProcessTable: Send + Sync {
    /// Свежий снимок; никогда не кэшируется
    fn snapshot(&self) -> Result<ProcessSnapshot>;
}

/// Запуск отсоединённого процесса
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, argv: &[String]) -> Result<ProcessHandle>;
}

/// Factory function to create a launcher based on the dry_run flag
pub fn create_launcher(config: Arc<Config>, dry_run: bool) -> Launcher {
    let table = Box::new(SysinfoProcessTable::new());
    let spawner: Box<dyn ProcessSpawner> = if dry_run {
        Box::new(DryRunSpawner)
    } else {
        Box::new(DetachedSpawner)
    };
    Launcher::new(config, table, spawner)
}
