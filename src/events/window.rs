use serde::{Deserialize, Serialize};
use std::fmt;

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    /// X11 window id
    pub id: u64,
    pub title: String,
    /// Класс из WM_CLASS
    pub class: String,
    /// Тип окна без префикса `_NET_WM_WINDOW_TYPE_`, в нижнем регистре
    pub window_type: Option<String>,
    /// Есть WM_TRANSIENT_FOR
    pub transient: bool,
}

impl WindowInfo {
    pub fn new(id: u64, title: String) -> Self {
        Self {
            id,
            title,
            class: String::new(),
            window_type: None,
            transient: false,
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }

    pub fn with_type(mut self, window_type: Option<String>) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "0x{:x} \"{}\"", self.id, self.title)
        } else {
            write!(f, "0x{:x} \"{}\" ({})", self.id, self.title, self.class)
        }
    }
}

/// Событие окна, на которое реагируют правила клиентов
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEvent {
    pub window: WindowInfo,
    pub timestamp: std::time::Instant,
    pub event_type: WindowEventType,
}

impl WindowEvent {
    pub fn new(window: WindowInfo, event_type: WindowEventType) -> Self {
        Self {
            window,
            timestamp: std::time::Instant::now(),
            event_type,
        }
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ({}ms ago)",
            self.event_type,
            self.window,
            self.timestamp.elapsed().as_millis()
        )
    }
}

/// Тип события окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowEventType {
    /// Окно увидели впервые ("client_new")
    Created,
    /// Сменился заголовок известного окна ("client_name_updated")
    TitleChanged,
}
