use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutostartError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Неверный шаблон процесса: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Команда '{command}' завершилась с ошибкой: {message}")]
    Command { command: String, message: String },

    #[error("Не удалось запустить '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl AutostartError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        AutostartError::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AutostartError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! autostart_error {
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::AutostartError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::AutostartError::Internal(format!($($arg)*))
    };
}
