pub mod command;

pub use command::run_command;

// Макрос условного логирования: не форматируем сообщение, если DEBUG выключен
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
