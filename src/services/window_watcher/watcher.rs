use crate::autostart_error;
use crate::config::Config;
use crate::error::Result;
use crate::events::{WindowEvent, WindowEventType, WindowInfo};
use crate::services::rules::{ClientAction, ClientRules};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use super::r#trait::WindowSource;

/// Раз во столько тактов забываем закрытые окна
const PRUNE_EVERY_TICKS: u64 = 120;
const BROKEN_SOURCE_BACKOFF: Duration = Duration::from_secs(10);

pub struct ClientWatcher {
    config: Arc<Config>,
    rules: ClientRules,
    sources: Vec<Box<dyn WindowSource>>,
    working_source: Option<usize>,
    dry_run: bool,
    ticks: u64,
    // Последний увиденный заголовок каждого окна
    known_titles: RwLock<HashMap<u64, String>>,
}

impl ClientWatcher {
    pub fn new(config: Arc<Config>, sources: Vec<Box<dyn WindowSource>>, dry_run: bool) -> Self {
        info!("Инициализация ClientWatcher (dry_run: {})", dry_run);
        Self {
            rules: ClientRules::new(config.clone()),
            config,
            sources,
            working_source: None,
            dry_run,
            ticks: 0,
            known_titles: RwLock::new(HashMap::new()),
        }
    }

    async fn detect_working_source(&self) -> Result<usize> {
        info!("Определяем рабочий метод наблюдения за окнами...");

        for (index, source) in self.sources.iter().enumerate() {
            match source.test().await {
                Ok(()) => {
                    info!("Используем {}", source.name());
                    return Ok(index);
                }
                Err(e) => debug!("{} не работает: {}", source.name(), e),
            }
        }

        Err(autostart_error!(service_unavailable, "Ни один метод наблюдения за окнами не работает"))
    }

    pub async fn run(mut self) -> Result<()> {
        let index = self.detect_working_source().await?;
        self.working_source = Some(index);

        let mut interval = interval(Duration::from_millis(self.config.watch.polling_interval_ms));
        info!("Наблюдение за окнами активно, интервал {} мс", self.config.watch.polling_interval_ms);

        loop {
            interval.tick().await;
            self.tick().await?;
        }
    }

    /// Один опрос активного окна
    async fn tick(&mut self) -> Result<()> {
        let Some(index) = self.working_source else {
            return Err(autostart_error!(internal, "источник окон не выбран"));
        };
        self.ticks += 1;

        let source = &self.sources[index];
        match source.get_active_window().await {
            Ok(Some(window)) => self.process_window(source.as_ref(), window).await,
            Ok(None) => debug!("Нет окна в фокусе, пропускаем такт"),
            Err(e) => {
                debug!("{} не вернул активное окно: {}", source.name(), e);
                if source.test().await.is_err() {
                    warn!("Метод {} перестал работать. Переопределяем...", source.name());
                    match self.detect_working_source().await {
                        Ok(new_index) => {
                            info!("Переключились на {}", self.sources[new_index].name());
                            self.working_source = Some(new_index);
                        }
                        Err(_) => {
                            error!("Ни один метод не работает. Приостанавливаем наблюдение на 10 секунд");
                            tokio::time::sleep(BROKEN_SOURCE_BACKOFF).await;
                        }
                    }
                }
            }
        }

        if self.ticks % PRUNE_EVERY_TICKS == 0 {
            self.prune_closed_windows().await;
        }
        Ok(())
    }

    /// Удалить из кэша заголовков окна, которых больше нет
    async fn prune_closed_windows(&self) {
        let Some(index) = self.working_source else {
            return;
        };
        match self.sources[index].client_windows().await {
            Ok(alive) => {
                let alive: HashSet<u64> = alive.into_iter().collect();
                let mut known = self.known_titles.write();
                let before = known.len();
                known.retain(|id, _| alive.contains(id));
                debug!("Забыто закрытых окон: {}", before - known.len());
            }
            Err(e) => debug!("Не удалось получить список окон: {}", e),
        }
    }

    /// Определить, какое событие породило наблюдение окна
    fn observe(&self, window: &WindowInfo) -> Option<WindowEventType> {
        let mut known = self.known_titles.write();
        match known.insert(window.id, window.title.clone()) {
            None => Some(WindowEventType::Created),
            Some(previous) if previous != window.title => Some(WindowEventType::TitleChanged),
            Some(_) => None,
        }
    }

    fn actions_for(&self, event: &WindowEvent) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if event.event_type == WindowEventType::Created {
            actions.extend(self.rules.on_client_new(&event.window));
        }
        // Новое окно может сразу иметь нужный заголовок
        actions.extend(self.rules.on_client_name_updated(&event.window));
        actions
    }

    async fn process_window(&self, source: &dyn WindowSource, window: WindowInfo) {
        let Some(event_type) = self.observe(&window) else {
            return;
        };
        let event = WindowEvent::new(window, event_type);
        debug!("Событие окна: {}", event);

        for action in self.actions_for(&event) {
            self.apply(source, &event.window, action).await;
        }
    }

    async fn apply(&self, source: &dyn WindowSource, window: &WindowInfo, action: ClientAction) {
        match action {
            ClientAction::Float => {
                // Плавающий режим выставляет оконный менеджер
                info!("Окно {} должно быть плавающим", window);
            }
            ClientAction::MoveToGroup { group } => {
                let Some(desktop) = self.rules.desktop_for_group(&group) else {
                    warn!("Группа {} не найдена", group);
                    return;
                };
                if self.dry_run {
                    info!("Dry-run: перенесли бы {} в группу {}", window, group);
                    return;
                }
                match source.move_to_desktop(window.id, desktop).await {
                    Ok(()) => info!("Окно {} перенесено в группу {}", window, group),
                    Err(e) => error!("Не удалось перенести окно {} в группу {}: {}", window, group, e),
                }
            }
        }
    }
}

impl Drop for ClientWatcher {
    fn drop(&mut self) {
        info!("ClientWatcher завершает работу");
    }
}
