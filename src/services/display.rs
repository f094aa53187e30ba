use crate::config::Config;
use crate::error::Result;
use crate::utils::run_command;
use std::sync::Arc;
use tracing::debug;

/// Источник вывода опроса дисплеев (формат `xrandr --query`)
pub trait DisplayQuery: Send + Sync {
    fn query(&self) -> Result<String>;
}

pub struct XrandrQuery {
    query_command: Vec<String>,
}

impl XrandrQuery {
    pub fn new(query_command: Vec<String>) -> Self {
        Self { query_command }
    }
}

impl DisplayQuery for XrandrQuery {
    fn query(&self) -> Result<String> {
        run_command(&self.query_command)
    }
}

/// Проверяет по выводу xrandr, подключён ли выход `name`.
///
/// Строка должна начинаться с имени выхода, за которым идёт `connected`:
/// `DP-1-0.1 connected 1920x1080+0+0 ...`. Строка `eDP-1 connected`
/// не означает, что подключён `DP-1`.
pub fn output_reports_connected(output: &str, name: &str) -> bool {
    output.lines().any(|line| {
        let mut tokens = line.split_whitespace();
        tokens.next() == Some(name) && tokens.next() == Some("connected")
    })
}

/// Состояние настроенных дисплеев по одному опросу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStatus {
    pub dock: bool,
    pub laptop: bool,
}

pub struct DisplayDetector {
    config: Arc<Config>,
    query: Box<dyn DisplayQuery>,
}

impl DisplayDetector {
    pub fn new(config: Arc<Config>, query: Box<dyn DisplayQuery>) -> Self {
        Self { config, query }
    }

    pub fn is_display_connected(&self, name: &str) -> Result<bool> {
        let output = self.query.query()?;
        let connected = output_reports_connected(&output, name);
        debug!("Дисплей {}: {}", name, if connected { "подключён" } else { "не подключён" });
        Ok(connected)
    }

    /// Док и встроенный дисплей проверяются по одному выводу
    pub fn status(&self) -> Result<DisplayStatus> {
        let output = self.query.query()?;
        let status = DisplayStatus {
            dock: output_reports_connected(&output, &self.config.display.dock),
            laptop: output_reports_connected(&output, &self.config.display.laptop),
        };
        debug!("Состояние дисплеев: {:?}", status);
        Ok(status)
    }
}

pub fn create_display_detector(config: Arc<Config>) -> DisplayDetector {
    let query = Box::new(XrandrQuery::new(config.display.query_command.clone()));
    DisplayDetector::new(config, query)
}
