use crate::error::{AutostartError, Result};
use std::fmt;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use super::r#trait::ProcessSpawner;

/// Процесс, запущенный этой утилитой
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// `None` в режиме сухого запуска
    pub pid: Option<u32>,
    pub command: String,
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pid {
            Some(pid) => write!(f, "'{}' (pid {})", self.command, pid),
            None => write!(f, "'{}' (dry-run)", self.command),
        }
    }
}

/// Запуск в отдельной группе процессов с отвязанным stdio
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, argv: &[String]) -> Result<ProcessHandle> {
        let command = argv.join(" ");
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AutostartError::Internal("пустая команда запуска".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| AutostartError::Spawn {
                command: command.clone(),
                source,
            })?;

        let pid = child.id();
        debug!("Процесс '{}' запущен с pid {}", command, pid);

        // Собираем код возврата, чтобы не копить зомби в режиме --watch
        std::thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(ProcessHandle {
            pid: Some(pid),
            command,
        })
    }
}

/// Ничего не запускает, только пишет в лог
pub struct DryRunSpawner;

impl ProcessSpawner for DryRunSpawner {
    fn spawn(&self, argv: &[String]) -> Result<ProcessHandle> {
        let command = argv.join(" ");
        info!("Dry-run: запустили бы '{}'", command);
        Ok(ProcessHandle { pid: None, command })
    }
}
