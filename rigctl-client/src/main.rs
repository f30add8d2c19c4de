//! Точка входа `rigctl-client`.
//!
//! Жизненный цикл:
//! - парсинг CLI
//! - одно TCP-соединение на весь список команд
//! - каждая команда отправляется отдельной строкой, ответ печатается как есть
//! - код выхода ненулевой, если сервер ответил `RPRT 1` хотя бы раз

mod cli;
mod tcp;

use std::io::{self, BufRead};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use rigctl_core::{Reply, Status};

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/trace
    env_logger::init();

    let args = cli::Args::parse();
    args.validate()?;

    let commands = if args.commands.is_empty() {
        read_commands(io::stdin().lock())?
    } else {
        args.commands.clone()
    };

    let addr = args.server_socket_addr()?;
    info!("Starting rigctl-client: server={addr}, commands={}", commands.len());

    let mut conn = tcp::Connection::connect(addr, args.timeout())?;
    let mut rejected = 0usize;

    for command in &commands {
        match conn.request(command)? {
            Some(reply) => {
                if reply == Reply::Status(Status::Malformed) {
                    rejected += 1;
                }
                println!("{reply}");
            }
            None if conn.is_closed() => {
                info!("connection closed by server after {command:?}");
                break;
            }
            None => {}
        }
    }

    if rejected > 0 {
        warn!("{rejected} command(s) were not understood by the server");
        anyhow::bail!("server rejected {rejected} command(s)");
    }

    Ok(())
}

fn read_commands(input: impl BufRead) -> anyhow::Result<Vec<String>> {
    input
        .lines()
        .map(|line| line.context("failed to read command from stdin"))
        .collect()
}
