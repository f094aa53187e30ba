use crate::config::Config;
use crate::error::Result;
use crate::events::WindowInfo;
use std::sync::Arc;

use super::watcher::ClientWatcher;
use super::wmctrl::WmctrlSource;
use super::xdotool::XdotoolSource;
use super::xprop::client_list;

/// Источник сведений об активном окне
#[async_trait::async_trait]
pub trait WindowSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Проверить, что утилита установлена и X-сервер отвечает.
    /// Не должно зависеть от наличия окна в фокусе.
    async fn test(&self) -> Result<()>;

    /// `None`, если ни одно окно не в фокусе
    async fn get_active_window(&self) -> Result<Option<WindowInfo>>;

    /// Идентификаторы всех управляемых окон
    async fn client_windows(&self) -> Result<Vec<u64>> {
        client_list()
    }

    /// Перенести окно на рабочий стол с номером `desktop` (с нуля)
    async fn move_to_desktop(&self, window_id: u64, desktop: usize) -> Result<()>;
}

/// Factory function: источники в порядке предпочтения
pub fn create_client_watcher(config: Arc<Config>, dry_run: bool) -> ClientWatcher {
    let sources: Vec<Box<dyn WindowSource>> = vec![Box::new(XdotoolSource::new()), Box::new(WmctrlSource::new())];
    ClientWatcher::new(config, sources, dry_run)
}
