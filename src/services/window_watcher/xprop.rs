use crate::error::Result;
use crate::utils::run_command;
use tracing::debug;

/// Свойства окна, которые xdotool/wmctrl не сообщают
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowProps {
    pub window_type: Option<String>,
    pub transient: bool,
}

/// Разбор вывода `xprop -id <id> _NET_WM_WINDOW_TYPE WM_TRANSIENT_FOR`
pub fn parse_window_props(output: &str) -> WindowProps {
    let mut props = WindowProps::default();

    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("_NET_WM_WINDOW_TYPE(ATOM)") {
            props.window_type = line
                .split('=')
                .nth(1)
                .and_then(|atoms| atoms.split(',').next())
                .map(|atom| atom.trim().trim_start_matches("_NET_WM_WINDOW_TYPE_").to_lowercase())
                .filter(|t| !t.is_empty());
        } else if line.starts_with("WM_TRANSIENT_FOR(WINDOW)") {
            props.transient = true;
        }
    }

    props
}

/// Свойства окна; при ошибке xprop - значения по умолчанию
pub fn window_props(window_id: u64) -> WindowProps {
    let argv = [
        "xprop".to_string(),
        "-id".to_string(),
        window_id.to_string(),
        "_NET_WM_WINDOW_TYPE".to_string(),
        "WM_TRANSIENT_FOR".to_string(),
    ];
    match run_command(&argv) {
        Ok(output) => parse_window_props(&output),
        Err(e) => {
            debug!("xprop недоступен для окна {}: {}", window_id, e);
            WindowProps::default()
        }
    }
}

/// Разбор `xprop -root _NET_ACTIVE_WINDOW`: `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00004`
pub fn parse_active_window(output: &str) -> Option<u64> {
    let hex = output.rsplit('#').next()?.trim();
    let id = parse_window_id(hex)?;
    // 0x0 - нет активного окна
    (id != 0).then_some(id)
}

/// Разбор `xprop -root _NET_CLIENT_LIST`:
/// `_NET_CLIENT_LIST(WINDOW): window id # 0x1a00003, 0x3a00004`
pub fn parse_client_list(output: &str) -> Vec<u64> {
    output
        .split_once('#')
        .map(|(_, ids)| ids.split(',').filter_map(parse_window_id).collect())
        .unwrap_or_default()
}

/// Окна, которыми сейчас управляет оконный менеджер (EWMH)
pub fn client_list() -> Result<Vec<u64>> {
    let argv = [
        "xprop".to_string(),
        "-root".to_string(),
        "_NET_CLIENT_LIST".to_string(),
    ];
    Ok(parse_client_list(&run_command(&argv)?))
}

/// Идентификатор окна в десятичной или шестнадцатеричной (`0x...`) записи
pub fn parse_window_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialog_transient() {
        let output = "_NET_WM_WINDOW_TYPE(ATOM) = _NET_WM_WINDOW_TYPE_DIALOG, _NET_WM_WINDOW_TYPE_NORMAL\n\
                      WM_TRANSIENT_FOR(WINDOW): window id # 0x3a00004\n";
        let props = parse_window_props(output);
        assert_eq!(props.window_type.as_deref(), Some("dialog"));
        assert!(props.transient);
    }

    #[test]
    fn test_parse_missing_props() {
        let output = "_NET_WM_WINDOW_TYPE:  not found.\nWM_TRANSIENT_FOR:  not found.\n";
        assert_eq!(parse_window_props(output), WindowProps::default());
    }

    #[test]
    fn test_parse_active_window() {
        assert_eq!(
            parse_active_window("_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00004\n"),
            Some(0x3a00004)
        );
        assert_eq!(parse_active_window("_NET_ACTIVE_WINDOW(WINDOW): window id # 0x0"), None);
        assert_eq!(parse_window_id("60817412"), Some(60817412));
        assert_eq!(parse_window_id("garbage"), None);
    }

    #[test]
    fn test_parse_client_list() {
        assert_eq!(
            parse_client_list("_NET_CLIENT_LIST(WINDOW): window id # 0x1a00003, 0x3a00004\n"),
            vec![0x1a00003, 0x3a00004]
        );
        assert!(parse_client_list("_NET_CLIENT_LIST:  no such atom on any window.").is_empty());
    }
}
