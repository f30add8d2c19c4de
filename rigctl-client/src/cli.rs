use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

/// rigctl-client - отправляет команды rigctld и печатает ответы.
///
/// Команды берутся из аргументов (`rigctl-client "F 145800000" f`),
/// а если их нет - построчно из stdin.
#[derive(Parser, Debug, Clone)]
#[command(name = "rigctl-client", version, about)]
pub(crate) struct Args {
    /// TCP адрес сервера, например 127.0.0.1:7356 или sdr.local:7356
    #[arg(long, default_value = "127.0.0.1:7356")]
    pub(crate) server: String,

    /// Сколько ждать ответа на одну команду, мс.
    /// Команды без ответа (пустые строки) завершаются по этому таймауту
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_ms: u64,

    /// Команды протокола, по одной на аргумент: "F 145800000" "M FM" f
    pub(crate) commands: Vec<String>,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }
        Ok(())
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
            })
    }
}
