use crate::config::{Config, LaunchSpec};
use crate::debug_if_enabled;
use crate::error::{AutostartError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::matcher::Matcher;
use super::r#trait::{ProcessSpawner, ProcessTable};
use super::spawner::ProcessHandle;

pub struct Launcher {
    config: Arc<Config>,
    table: Box<dyn ProcessTable>,
    spawner: Box<dyn ProcessSpawner>,
    own_pid: u32,
    // Команды, уже запущенные в этом сеансе: дочерний процесс мог ещё не появиться в ps
    spawned: Mutex<HashSet<String>>,
}

impl Launcher {
    pub fn new(
        config: Arc<Config>,
        table: Box<dyn ProcessTable>,
        spawner: Box<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            config,
            table,
            spawner,
            own_pid: sysinfo::get_current_pid()
                .map(|pid| pid.as_u32())
                .unwrap_or_else(|_| std::process::id()),
            spawned: Mutex::new(HashSet::new()),
        }
    }

    /// Запустить команду, если подходящего процесса ещё нет
    pub fn ensure_running(&self, command: &str) -> Result<Option<ProcessHandle>> {
        self.ensure(&LaunchSpec::new(command))
    }

    /// То же, с явным шаблоном поиска из конфигурации
    pub fn ensure(&self, spec: &LaunchSpec) -> Result<Option<ProcessHandle>> {
        let argv: Vec<String> = spec.command.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(AutostartError::Internal("пустая команда запуска".to_string()));
        }
        let key = argv.join(" ");

        if self.spawned.lock().contains(&key) {
            debug!("'{}' уже запущен в этом сеансе", key);
            return Ok(None);
        }

        let matcher = Matcher::for_spec(spec, self.config.process.match_mode)?;
        if self.is_running(&matcher, &key) {
            info!("'{}' уже запущен, пропускаем", key);
            return Ok(None);
        }

        let handle = self.spawner.spawn(&argv)?;
        info!("Запущен {}", handle);
        self.spawned.lock().insert(key);
        Ok(Some(handle))
    }

    fn is_running(&self, matcher: &Matcher, command: &str) -> bool {
        let snapshot = match self.table.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Таблица недоступна - считаем, что процесс не запущен
                warn!("Не удалось получить таблицу процессов ({}), считаем '{}' не запущенным", e, command);
                return false;
            }
        };

        let matches: Vec<_> = snapshot
            .entries
            .iter()
            .filter(|entry| entry.pid != Some(self.own_pid))
            .filter(|entry| matcher.matches(entry))
            .collect();

        if matches.len() > 1 {
            debug_if_enabled!("'{}' совпал с {} процессами: {:?}", command, matches.len(), matches);
        }

        !matches.is_empty()
    }
}
