use crate::config::{LaunchSpec, MatchMode};
use crate::error::Result;
use regex::Regex;

use super::process_table::ProcessEntry;

/// Предикат "этот процесс - экземпляр запускаемой команды"
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Поиск регулярного выражения в командной строке. Ложно срабатывает,
    /// если шаблон встречается в аргументах чужого процесса.
    Pattern(Regex),
    /// Совпадает имя исполняемого файла, и каждый аргумент команды запуска
    /// есть среди аргументов процесса. `bash a.sh` не совпадёт с `bash b.sh`.
    Executable { name: String, args: Vec<String> },
}

impl Matcher {
    /// Явный `match` всегда регулярное выражение, независимо от режима
    pub fn for_spec(spec: &LaunchSpec, mode: MatchMode) -> Result<Self> {
        if let Some(pattern) = &spec.pattern {
            return Ok(Matcher::Pattern(Regex::new(pattern)?));
        }

        match mode {
            MatchMode::Pattern => Ok(Matcher::Pattern(Regex::new(&spec.match_pattern())?)),
            MatchMode::Executable => {
                let mut words = spec.command.split_whitespace();
                let first = words.next().unwrap_or_default();
                Ok(Matcher::Executable {
                    name: first.rsplit('/').next().unwrap_or(first).to_string(),
                    args: words.map(str::to_string).collect(),
                })
            }
        }
    }

    pub fn matches(&self, entry: &ProcessEntry) -> bool {
        match self {
            Matcher::Pattern(regex) => regex.is_match(&entry.command_line),
            Matcher::Executable { name, args } => {
                entry.executable == *name && args.iter().all(|arg| entry.args.contains(arg))
            }
        }
    }
}
