use crate::autostart_error;
use crate::error::Result;
use parking_lot::Mutex;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use super::r#trait::ProcessTable;

/// Одна строка таблицы процессов
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: Option<u32>,
    /// Имя исполняемого файла без пути
    pub executable: String,
    /// Аргументы без `argv[0]`
    pub args: Vec<String>,
    /// Полная командная строка, аргументы через пробел
    pub command_line: String,
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl ProcessEntry {
    /// Запись по argv; имя исполняемого файла берётся из `argv[0]`
    pub fn from_argv(pid: Option<u32>, argv: Vec<String>) -> Self {
        let executable = argv.first().map(|first| basename(first).to_string()).unwrap_or_default();
        Self::with_executable(pid, executable, argv)
    }

    fn with_executable(pid: Option<u32>, executable: String, argv: Vec<String>) -> Self {
        let command_line = argv.join(" ");
        let args = argv.into_iter().skip(1).collect();
        Self {
            pid,
            executable,
            args,
            command_line,
        }
    }

    fn from_process(process: &Process) -> Self {
        let name = process.name().to_string_lossy().into_owned();
        let mut argv: Vec<String> = process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        // Потоки ядра и чужие процессы без cmdline показываем как ps: `[name]`
        if argv.is_empty() {
            argv.push(format!("[{}]", name));
        }

        let executable = process
            .exe()
            .and_then(|exe| exe.file_name())
            .map(|file| file.to_string_lossy().into_owned())
            .unwrap_or(name);

        Self::with_executable(Some(process.pid().as_u32()), executable, argv)
    }
}

/// Снимок таблицы процессов
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub entries: Vec<ProcessEntry>,
}

/// Таблица процессов ОС через sysinfo
pub struct SysinfoProcessTable {
    system: Mutex<System>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn snapshot(&self) -> Result<ProcessSnapshot> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(autostart_error!(service_unavailable, "sysinfo не поддерживает эту ОС"));
        }

        let mut system = self.system.lock();
        // Обновляем каждый раз заново, исчезнувшие процессы удаляются
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_exe(UpdateKind::OnlyIfNotSet),
        );

        let entries: Vec<ProcessEntry> = system.processes().values().map(ProcessEntry::from_process).collect();
        if entries.is_empty() {
            return Err(autostart_error!(service_unavailable, "таблица процессов пуста"));
        }

        Ok(ProcessSnapshot { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entry_from_argv() {
        let entry = ProcessEntry::from_argv(Some(77), argv(&["/usr/bin/nm-applet", "--indicator"]));
        assert_eq!(entry.executable, "nm-applet");
        assert_eq!(entry.args, vec!["--indicator"]);
        assert_eq!(entry.command_line, "/usr/bin/nm-applet --indicator");

        let empty = ProcessEntry::from_argv(None, Vec::new());
        assert_eq!(empty.executable, "");
        assert_eq!(empty.command_line, "");
    }

    #[test]
    fn test_sysinfo_snapshot_contains_own_process() {
        let table = SysinfoProcessTable::new();
        let snapshot = table.snapshot().unwrap();
        let own = sysinfo::get_current_pid().unwrap().as_u32();

        let entry = snapshot
            .entries
            .iter()
            .find(|entry| entry.pid == Some(own))
            .expect("текущий процесс должен быть в таблице");
        assert!(!entry.executable.is_empty());
        assert!(!entry.command_line.is_empty());
    }

    #[test]
    fn test_sysinfo_snapshot_is_fresh() {
        let table = SysinfoProcessTable::new();
        table.snapshot().unwrap();

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        let seen = table.snapshot().unwrap().entries.iter().any(|e| e.pid == Some(pid));
        child.kill().unwrap();
        child.wait().unwrap();

        assert!(seen);
        let gone = !table.snapshot().unwrap().entries.iter().any(|e| e.pid == Some(pid));
        assert!(gone);
    }
}
