use crate::config::Config;
use crate::events::WindowInfo;
use std::sync::Arc;

/// Действие, которое правило предлагает оконному менеджеру
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Окно не участвует в тайлинге
    Float,
    /// Переместить окно в группу, не переключая видимую группу
    MoveToGroup { group: String },
}

/// Тела хуков "новое окно" и "сменился заголовок окна".
///
/// Все сравнения регистронезависимые; правила только решают, применяет их вызывающий.
pub struct ClientRules {
    config: Arc<Config>,
    float_types: Vec<String>,
    float_classes: Vec<String>,
    float_names: Vec<String>,
    title_prefixes: Vec<(String, String)>,
}

fn lowered(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

impl ClientRules {
    pub fn new(config: Arc<Config>) -> Self {
        let rules = &config.rules;
        let float_types = lowered(&rules.float_window_types);
        let float_classes = lowered(&rules.float_classes);
        let float_names = lowered(&rules.float_names);
        let title_prefixes = rules
            .group_rules
            .iter()
            .map(|rule| (rule.title_prefix.trim().to_lowercase(), rule.group.clone()))
            .collect();

        Self {
            config,
            float_types,
            float_classes,
            float_names,
            title_prefixes,
        }
    }

    pub fn on_client_new(&self, window: &WindowInfo) -> Option<ClientAction> {
        self.should_float(window).then_some(ClientAction::Float)
    }

    pub fn on_client_name_updated(&self, window: &WindowInfo) -> Option<ClientAction> {
        let title = window.title.trim().to_lowercase();
        if title.is_empty() {
            return None;
        }

        self.title_prefixes
            .iter()
            .find(|(prefix, _)| title.starts_with(prefix.as_str()))
            .map(|(_, group)| ClientAction::MoveToGroup {
                group: group.clone(),
            })
    }

    fn should_float(&self, window: &WindowInfo) -> bool {
        if window.transient {
            return true;
        }

        if let Some(window_type) = &window.window_type {
            if self.float_types.iter().any(|t| t == window_type) {
                return true;
            }
        }

        let class = window.class.to_lowercase();
        if !class.is_empty() && self.float_classes.contains(&class) {
            return true;
        }

        let title = window.title.to_lowercase();
        !title.is_empty() && self.float_names.contains(&title)
    }

    /// Номер рабочего стола для группы
    pub fn desktop_for_group(&self, group: &str) -> Option<usize> {
        self.config.group_index(group)
    }
}
