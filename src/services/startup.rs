use crate::config::Config;
use crate::services::display::DisplayDetector;
use crate::services::launcher::{Launcher, ProcessHandle};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Итог обработки одной команды
#[derive(Debug)]
pub enum EntryOutcome {
    Launched(ProcessHandle),
    AlreadyRunning,
    Failed(String),
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOutcome::Launched(handle) => write!(f, "запущен {}", handle),
            EntryOutcome::AlreadyRunning => write!(f, "уже работает"),
            EntryOutcome::Failed(message) => write!(f, "ошибка: {}", message),
        }
    }
}

#[derive(Debug)]
pub struct StartupReport {
    pub docked: bool,
    pub entries: Vec<(String, EntryOutcome)>,
}

impl StartupReport {
    pub fn launched(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Launched(_)))
    }

    pub fn already_running(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::AlreadyRunning))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, outcome)| pred(outcome)).count()
    }
}

impl fmt::Display for StartupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "профиль {}: запущено {}, уже работало {}, ошибок {}",
            if self.docked { "docked" } else { "undocked" },
            self.launched(),
            self.already_running(),
            self.failed()
        )
    }
}

/// Тело хука запуска сеанса: выбрать профиль по доку и обеспечить все процессы.
///
/// Ошибка одной команды не прерывает остальные.
pub fn run_startup(config: &Config, launcher: &Launcher, detector: &DisplayDetector) -> StartupReport {
    let docked = match detector.status() {
        Ok(status) if status.dock => {
            info!("Док-монитор {} подключён", config.display.dock);
            true
        }
        Ok(status) => {
            if !status.laptop {
                warn!("Не найден ни {}, ни {}", config.display.dock, config.display.laptop);
            }
            false
        }
        Err(e) => {
            warn!("Не удалось определить дисплеи: {}. Используем профиль undocked", e);
            false
        }
    };

    let entries = config
        .startup_entries(docked)
        .map(|spec| {
            let outcome = match launcher.ensure(spec) {
                Ok(Some(handle)) => EntryOutcome::Launched(handle),
                Ok(None) => EntryOutcome::AlreadyRunning,
                Err(e) => {
                    error!("Не удалось обеспечить '{}': {}", spec.command, e);
                    EntryOutcome::Failed(e.to_string())
                }
            };
            debug!("{}: {}", spec.command, outcome);
            (spec.command.clone(), outcome)
        })
        .collect();

    let report = StartupReport { docked, entries };
    info!("Старт завершён, {}", report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchSpec;
    use crate::error::{AutostartError, Result};
    use crate::services::display::DisplayQuery;
    use crate::services::launcher::{ProcessEntry, ProcessSnapshot, ProcessSpawner, ProcessTable};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct StaticQuery(Option<&'static str>);

    impl DisplayQuery for StaticQuery {
        fn query(&self) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| AutostartError::command("xrandr", "Can't open display"))
        }
    }

    /// Командные строки запущенных процессов
    struct Table(&'static [&'static str]);

    impl ProcessTable for Table {
        fn snapshot(&self) -> Result<ProcessSnapshot> {
            let entries = self
                .0
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    ProcessEntry::from_argv(Some(10 + i as u32), line.split_whitespace().map(str::to_string).collect())
                })
                .collect();
            Ok(ProcessSnapshot { entries })
        }
    }

    struct Spawner(Arc<Mutex<Vec<String>>>);

    impl ProcessSpawner for Spawner {
        fn spawn(&self, argv: &[String]) -> Result<ProcessHandle> {
            if argv[0] == "missing-app" {
                return Err(AutostartError::Spawn {
                    command: argv.join(" "),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            self.0.lock().push(argv.join(" "));
            Ok(ProcessHandle {
                pid: Some(1),
                command: argv.join(" "),
            })
        }
    }

    fn config() -> Arc<Config> {
        let mut config = Config::default();
        config.startup.docked = vec![LaunchSpec::new("bash /opt/docked.sh").with_pattern("docked\\.sh")];
        config.startup.undocked = vec![LaunchSpec::new("autorandr --change")];
        config.startup.always = vec![
            LaunchSpec::new("missing-app"),
            LaunchSpec::new("dunst"),
            LaunchSpec::new("nm-applet"),
        ];
        Arc::new(config)
    }

    fn run(xrandr: Option<&'static str>, ps: &'static [&'static str]) -> (StartupReport, Vec<String>) {
        let config = config();
        let spawned = Arc::new(Mutex::new(Vec::new()));
        let launcher = Launcher::new(config.clone(), Box::new(Table(ps)), Box::new(Spawner(spawned.clone())));
        let detector = DisplayDetector::new(config.clone(), Box::new(StaticQuery(xrandr)));
        let report = run_startup(&config, &launcher, &detector);
        let spawned = spawned.lock().clone();
        (report, spawned)
    }

    #[test]
    fn test_docked_profile_when_dock_connected() {
        let (report, spawned) = run(
            Some("eDP-1 connected\nDP-1-0.1 connected 1920x1080+1920+0\n"),
            &["/usr/bin/dunst"],
        );
        assert!(report.docked);
        assert_eq!(spawned, vec!["bash /opt/docked.sh", "nm-applet"]);
        assert_eq!(report.launched(), 2);
        assert_eq!(report.already_running(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_undocked_profile_when_dock_disconnected() {
        let (report, spawned) = run(Some("eDP-1 connected\nDP-1-0.1 disconnected\n"), &[]);
        assert!(!report.docked);
        assert_eq!(spawned, vec!["autorandr --change", "dunst", "nm-applet"]);
    }

    #[test]
    fn test_display_failure_falls_back_to_undocked() {
        let (report, spawned) = run(None, &[]);
        assert!(!report.docked);
        assert_eq!(spawned[0], "autorandr --change");
    }

    #[test]
    fn test_failure_does_not_stop_later_entries() {
        let (report, _) = run(None, &[]);
        let names: Vec<&str> = report.entries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["autorandr --change", "missing-app", "dunst", "nm-applet"]);
        assert!(matches!(report.entries[1].1, EntryOutcome::Failed(_)));
        assert!(matches!(report.entries[3].1, EntryOutcome::Launched(_)));
    }
}
