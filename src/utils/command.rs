use crate::error::{AutostartError, Result};
use std::process::Command;
use tracing::debug;

/// Выполнить внешнюю команду и вернуть её stdout.
///
/// `argv[0]` - исполняемый файл, остальное - аргументы. Если программу не
/// удалось запустить, возвращается `Io`; ненулевой код возврата - `Command`.
pub fn run_command(argv: &[String]) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| AutostartError::Internal("пустая команда".to_string()))?;

    debug!("Выполняем: {}", argv.join(" "));
    let output = Command::new(program).args(args).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AutostartError::command(
            argv.join(" "),
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_command_returns_stdout() {
        let out = run_command(&argv(&["echo", "DP-1 connected"])).unwrap();
        assert_eq!(out.trim(), "DP-1 connected");
    }

    #[test]
    fn test_run_command_failures() {
        assert!(run_command(&[]).is_err());
        assert!(matches!(
            run_command(&argv(&["false"])),
            Err(AutostartError::Command { .. })
        ));
        assert!(matches!(
            run_command(&argv(&["definitely-not-a-real-binary-xyz"])),
            Err(AutostartError::Io(_))
        ));
    }
}
