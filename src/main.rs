use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, warn};

mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use services::{create_client_watcher, create_display_detector, create_launcher, run_startup};

#[derive(Parser, Debug)]
#[command(name = "wm-autostart")]
#[command(about = "Запуск сопутствующих процессов оконного менеджера не более одного раза")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "autostart.toml")]
    config: String,

    /// Режим сухого запуска (без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (RUST_LOG имеет приоритет)
    #[arg(long)]
    log_level: Option<String>,

    /// После старта следить за окнами и применять правила групп
    #[arg(long)]
    watch: bool,

    /// Только обеспечить одну команду и выйти
    #[arg(long, value_name = "COMMAND", conflicts_with_all = ["display", "watch"])]
    ensure: Option<String>,

    /// Только проверить, подключён ли дисплей, и выйти
    #[arg(long, value_name = "NAME", conflicts_with = "watch")]
    display: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации до логирования: формат логов берётся из неё
    let config = Arc::new(Config::load(&args.config)?);

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск wm-autostart v{}", env!("CARGO_PKG_VERSION"));
    if Path::new(&args.config).exists() {
        info!("Конфигурация загружена из: {}", args.config);
    } else {
        warn!("Файл {} не найден, используются настройки по умолчанию", args.config);
    }

    debug!(
        "Группы: {}",
        config.groups.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(", ")
    );

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    if let Some(name) = &args.display {
        let connected = create_display_detector(config.clone()).is_display_connected(name)?;
        println!("{} {}", name, if connected { "connected" } else { "disconnected" });
        return Ok(());
    }

    let launcher = create_launcher(config.clone(), args.dry_run);

    if let Some(command) = &args.ensure {
        match launcher.ensure_running(command)? {
            Some(handle) => println!("launched {}", handle),
            None => println!("already running '{}'", command),
        }
        return Ok(());
    }

    let detector = create_display_detector(config.clone());
    let report = run_startup(&config, &launcher, &detector);

    if args.watch {
        let watcher = create_client_watcher(config.clone(), args.dry_run);
        let watch_handle = tokio::spawn(async move {
            if let Err(e) = watcher.run().await {
                error!("Ошибка в ClientWatcher: {}", e);
            }
        });

        match signal::ctrl_c().await {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        }

        watch_handle.abort();
        let _ = watch_handle.await;
    }

    if !report.is_success() {
        anyhow::bail!("Не удалось запустить {} процесс(ов)", report.failed());
    }

    info!("wm-autostart завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
