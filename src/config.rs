use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
    pub process: ProcessConfig,
    pub startup: StartupConfig,
    pub groups: Vec<Group>,
    pub rules: RulesConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Команда опроса выходов (вывод в формате xrandr)
    pub query_command: Vec<String>,
    pub dock: String,
    pub laptop: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub match_mode: MatchMode,
}

/// Способ сопоставления запускаемой команды с таблицей процессов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Регулярное выражение по всей командной строке (возможны ложные срабатывания на аргументах)
    Pattern,
    /// Имя исполняемого файла плюс аргументы команды запуска среди аргументов процесса
    Executable,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Профиль при подключённом док-мониторе
    pub docked: Vec<LaunchSpec>,
    /// Профиль без док-монитора
    pub undocked: Vec<LaunchSpec>,
    /// Запускается всегда, после профиля
    pub always: Vec<LaunchSpec>,
}

/// Описание сопутствующего процесса.
///
/// В TOML задаётся строкой (`"dunst"`) или таблицей
/// (`{ command = "nitrogen --restore", match = "nitrogen" }`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawLaunchSpec")]
pub struct LaunchSpec {
    pub command: String,
    pub pattern: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLaunchSpec {
    Command(String),
    Detailed {
        command: String,
        #[serde(default, rename = "match")]
        pattern: Option<String>,
    },
}

impl From<RawLaunchSpec> for LaunchSpec {
    fn from(raw: RawLaunchSpec) -> Self {
        match raw {
            RawLaunchSpec::Command(command) => LaunchSpec::new(command),
            RawLaunchSpec::Detailed { command, pattern } => LaunchSpec { command, pattern },
        }
    }
}

impl LaunchSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Шаблон для поиска в таблице процессов: явный `match` или сама команда
    /// с нормализованными пробелами
    pub fn match_pattern(&self) -> String {
        match &self.pattern {
            Some(pattern) => pattern.clone(),
            None => self.command.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Группа (виртуальный рабочий стол)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub name: String,
    pub label: String,
    #[serde(default = "default_layout")]
    pub layout: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.name, self.label, self.layout)
    }
}

fn default_layout() -> String {
    "monadtall".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub group_rules: Vec<GroupRule>,
    pub float_window_types: Vec<String>,
    pub float_classes: Vec<String>,
    pub float_names: Vec<String>,
}

/// Окно, чей заголовок начинается с `title_prefix`, отправляется в группу `group`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRule {
    pub title_prefix: String,
    pub group: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub polling_interval_ms: u64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            query_command: strings(&["xrandr", "--query"]),
            dock: "DP-1-0.1".to_string(),
            laptop: "eDP-1".to_string(),
        }
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Pattern,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            group_rules: vec![GroupRule {
                title_prefix: "spotify".to_string(),
                group: "4".to_string(),
            }],
            float_window_types: strings(&["notification", "toolbar", "splash", "dialog"]),
            float_classes: strings(&[
                "confirm",
                "dialog",
                "download",
                "error",
                "file_progress",
                "notification",
                "splash",
                "toolbar",
                "confirmreset",
                "makebranch",
                "maketag",
                "ssh-askpass",
            ]),
            float_names: strings(&["branchdialog", "pinentry"]),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let groups = [
            ("WEB", "monadtall"),
            ("CODE", "monadtall"),
            ("WRITE", "monadtall"),
            ("MUSIC", "max"),
            ("WCOMS", "stack"),
            ("WCODE", "monadtall"),
            ("WRSRCH", "stack"),
            ("PRSNT", "monadtall"),
            ("RANDOM", "max"),
        ]
        .iter()
        .enumerate()
        .map(|(i, (label, layout))| Group {
            name: (i + 1).to_string(),
            label: label.to_string(),
            layout: layout.to_string(),
        })
        .collect();

        Self {
            logging: LoggingConfig::default(),
            display: DisplayConfig::default(),
            process: ProcessConfig::default(),
            startup: StartupConfig {
                docked: Vec::new(),
                undocked: Vec::new(),
                always: vec![
                    LaunchSpec::new("nitrogen --restore"),
                    LaunchSpec::new("gnome-keyring-daemon --start"),
                    LaunchSpec::new("nm-applet"),
                    LaunchSpec::new("dunst"),
                ],
            },
            groups,
            rules: RulesConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("AUTOSTART_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.display.query_command.is_empty() {
            anyhow::bail!("display.query_command не может быть пустым");
        }
        if self.display.dock.trim().is_empty() || self.display.laptop.trim().is_empty() {
            anyhow::bail!("Имена дисплеев не могут быть пустыми");
        }

        for (profile, specs) in [
            ("docked", &self.startup.docked),
            ("undocked", &self.startup.undocked),
            ("always", &self.startup.always),
        ] {
            for (i, spec) in specs.iter().enumerate() {
                if spec.command.trim().is_empty() {
                    anyhow::bail!("Пустая команда в профиле '{}' #{}", profile, i + 1);
                }
                if matches!(spec.pattern.as_deref(), Some(p) if p.is_empty()) {
                    anyhow::bail!("Пустой match в профиле '{}' #{}", profile, i + 1);
                }
            }
        }

        // Валидация групп
        if self.groups.is_empty() {
            anyhow::bail!("Должна быть задана хотя бы одна группа");
        }
        let mut names = HashSet::new();
        for group in &self.groups {
            if group.name.is_empty() {
                anyhow::bail!("Пустое имя группы (метка '{}')", group.label);
            }
            if !names.insert(group.name.as_str()) {
                anyhow::bail!("Повторяющееся имя группы: {}", group.name);
            }
        }

        for rule in &self.rules.group_rules {
            if rule.title_prefix.trim().is_empty() {
                anyhow::bail!("Пустой title_prefix в правиле для группы {}", rule.group);
            }
            if !names.contains(rule.group.as_str()) {
                anyhow::bail!("Правило '{}' ссылается на неизвестную группу {}", rule.title_prefix, rule.group);
            }
        }

        if self.watch.polling_interval_ms < 100 {
            anyhow::bail!("polling_interval_ms должно быть минимум 100");
        }

        Ok(())
    }

    /// Команды, которые нужно обеспечить при старте: профиль по состоянию дока, затем `always`
    pub fn startup_entries(&self, docked: bool) -> impl Iterator<Item = &LaunchSpec> {
        let profile = if docked {
            &self.startup.docked
        } else {
            &self.startup.undocked
        };
        profile.iter().chain(self.startup.always.iter())
    }

    /// Порядковый номер группы (номер рабочего стола)
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.groups.len(), 9);
        assert_eq!(config.group_index("4"), Some(3));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.display.dock, "DP-1-0.1");
        assert_eq!(config.process.match_mode, MatchMode::Pattern);
        assert_eq!(config.startup.always.len(), 4);
    }

    #[test]
    fn test_load_launch_specs_in_both_forms() {
        let file = write_config(
            r#"
            [process]
            match_mode = "executable"

            [startup]
            docked = [{ command = "bash /opt/layouts/docked.sh", match = "docked.sh" }]
            always = ["dunst", "picom --daemon"]
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.process.match_mode, MatchMode::Executable);
        assert_eq!(
            config.startup.docked,
            vec![LaunchSpec::new("bash /opt/layouts/docked.sh").with_pattern("docked.sh")]
        );
        assert_eq!(config.startup.always[1].match_pattern(), "picom --daemon");
        // Остальные секции остаются по умолчанию
        assert_eq!(config.groups.len(), 9);
    }

    #[test]
    fn test_shipped_example_config_is_valid() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/autostart.toml")).unwrap();
        assert_eq!(config.startup.docked[0].match_pattern(), "dockedprimary\\.sh");
        assert_eq!(config.groups[3].label, "MUSIC");
    }

    #[test]
    fn test_startup_entries_order() {
        let mut config = Config::default();
        config.startup.docked = vec![LaunchSpec::new("dock-layout")];
        config.startup.undocked = vec![LaunchSpec::new("laptop-layout")];
        config.startup.always = vec![LaunchSpec::new("dunst")];

        let docked: Vec<&str> = config.startup_entries(true).map(|s| s.command.as_str()).collect();
        assert_eq!(docked, vec!["dock-layout", "dunst"]);

        let undocked: Vec<&str> = config.startup_entries(false).map(|s| s.command.as_str()).collect();
        assert_eq!(undocked, vec!["laptop-layout", "dunst"]);
    }

    #[test]
    fn test_rule_with_unknown_group_rejected() {
        let mut config = Config::default();
        config.rules.group_rules.push(GroupRule {
            title_prefix: "teams".to_string(),
            group: "42".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.watch.polling_interval_ms = 50;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.startup.always.push(LaunchSpec::new("   "));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.groups.push(config.groups[0].clone());
        assert!(config.validate().is_err());
    }
}
