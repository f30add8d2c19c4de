//! Точка входа `rigctl-server`.
//!
//! Жизненный цикл:
//! - парсинг CLI и загрузка настроек (если задан `--settings`)
//! - запуск TCP listener-а удалённого управления
//! - разбор уведомлений в приёмнике-заглушке
//! - остановка по `Ctrl+C` и, при `--save-settings`, запись настроек

mod cli;
mod host;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use log::info;
use rigctl_server::{RemoteControl, ServerConfig, Settings, settings};

const EVENT_TICK: Duration = Duration::from_millis(200);

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/trace
    env_logger::init();

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();

    let settings = match &args.settings {
        Some(path) => settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let (mut rc, events) = RemoteControl::new(ServerConfig::default());
    rc.apply_settings(&settings)?;
    rc.set_bandwidth(args.bandwidth);

    if let Some(port) = args.port {
        rc.set_port(port)?;
    }
    if !args.allow.is_empty() {
        rc.set_hosts(args.allow.iter().cloned());
    }

    rc.start()
        .with_context(|| format!("failed to start remote control on port {}", rc.port()))?;

    info!(
        "Starting rigctl-server: addr={}, allowed={}",
        rc.local_addr().map_or_else(|| "-".to_string(), |a| a.to_string()),
        rc.hosts().join(",")
    );

    while !shutdown.load(Ordering::Relaxed) {
        match events.recv_timeout(EVENT_TICK) {
            Ok(event) => host::apply_event(&rc, event),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    rc.stop();

    if args.save_settings {
        if let Some(path) = &args.settings {
            rc.save_settings(path)
                .with_context(|| format!("failed to save settings to {}", path.display()))?;
            info!("settings saved to {}", path.display());
        }
    }

    Ok(())
}
