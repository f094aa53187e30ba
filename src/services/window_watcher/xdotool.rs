use crate::error::{AutostartError, Result};
use crate::events::WindowInfo;
use crate::utils::run_command;
use tracing::debug;

use super::r#trait::WindowSource;
use super::xprop::{parse_window_id, window_props};

pub struct XdotoolSource;

impl XdotoolSource {
    pub fn new() -> Self {
        Self
    }

    fn xdotool(args: &[&str]) -> Result<String> {
        let argv: Vec<String> = std::iter::once("xdotool")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();
        run_command(&argv)
    }
}

#[async_trait::async_trait]
impl WindowSource for XdotoolSource {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    async fn test(&self) -> Result<()> {
        Self::xdotool(&["getdisplaygeometry"]).map(|_| ())
    }

    async fn get_active_window(&self) -> Result<Option<WindowInfo>> {
        debug!("Попытка получить активное окно через xdotool");
        let raw_id = match Self::xdotool(&["getactivewindow"]) {
            Ok(raw_id) => raw_id,
            // xdotool завершается с ошибкой, когда фокуса нет
            Err(AutostartError::Command { message, .. }) => {
                debug!("Нет активного окна: {}", message);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let id = parse_window_id(&raw_id)
            .ok_or_else(|| AutostartError::Internal(format!("xdotool вернул неверный id окна: '{}'", raw_id.trim())))?;
        let id_arg = id.to_string();

        let title = Self::xdotool(&["getwindowname", &id_arg])?.trim().to_string();
        let class = match Self::xdotool(&["getwindowclassname", &id_arg]) {
            Ok(class) => class.trim().to_string(),
            Err(e) => {
                debug!("Не удалось получить класс окна: {}", e);
                String::new()
            }
        };
        let props = window_props(id);

        Ok(Some(
            WindowInfo::new(id, title)
                .with_class(class)
                .with_type(props.window_type)
                .with_transient(props.transient),
        ))
    }

    async fn move_to_desktop(&self, window_id: u64, desktop: usize) -> Result<()> {
        Self::xdotool(&["set_desktop_for_window", &window_id.to_string(), &desktop.to_string()]).map(|_| ())
    }
}
