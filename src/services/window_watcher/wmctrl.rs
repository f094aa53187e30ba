use crate::error::Result;
use crate::events::WindowInfo;
use crate::utils::run_command;
use tracing::debug;

use super::r#trait::WindowSource;
use super::xprop::{parse_active_window, parse_window_id, window_props};

pub struct WmctrlSource;

/// Строка `wmctrl -lx`: `<id> <desktop> <instance.Class> <host> <title...>`
#[derive(Debug, PartialEq, Eq)]
struct WmctrlLine {
    id: u64,
    class: String,
    title: String,
}

fn parse_wmctrl_line(line: &str) -> Option<WmctrlLine> {
    let mut parts = line.split_whitespace();
    let id = parse_window_id(parts.next()?)?;
    let _desktop = parts.next()?;
    let wm_class = parts.next()?;
    let _host = parts.next()?;
    let title = parts.collect::<Vec<_>>().join(" ");

    let class = wm_class
        .split_once('.')
        .map(|(_, class)| class)
        .unwrap_or(wm_class)
        .to_string();

    Some(WmctrlLine { id, class, title })
}

fn wmctrl(args: &[&str]) -> Result<String> {
    let argv: Vec<String> = std::iter::once("wmctrl")
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect();
    run_command(&argv)
}

impl WmctrlSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl WindowSource for WmctrlSource {
    fn name(&self) -> &'static str {
        "wmctrl"
    }

    async fn test(&self) -> Result<()> {
        wmctrl(&["-m"]).map(|_| ())
    }

    async fn get_active_window(&self) -> Result<Option<WindowInfo>> {
        let root = run_command(&[
            "xprop".to_string(),
            "-root".to_string(),
            "_NET_ACTIVE_WINDOW".to_string(),
        ])?;
        let Some(active) = parse_active_window(&root) else {
            return Ok(None);
        };

        let listing = wmctrl(&["-lx"])?;
        let Some(line) = listing.lines().filter_map(parse_wmctrl_line).find(|line| line.id == active) else {
            // Фокус на окне, которым WM не управляет (рабочий стол, панель)
            debug!("Окно 0x{:x} отсутствует в wmctrl -lx", active);
            return Ok(None);
        };

        let props = window_props(line.id);
        Ok(Some(
            WindowInfo::new(line.id, line.title)
                .with_class(line.class)
                .with_type(props.window_type)
                .with_transient(props.transient),
        ))
    }

    async fn move_to_desktop(&self, window_id: u64, desktop: usize) -> Result<()> {
        let id = format!("0x{:x}", window_id);
        wmctrl(&["-i", "-r", &id, "-t", &desktop.to_string()]).map(|_| ())
    }
}
