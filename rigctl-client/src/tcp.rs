use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use anyhow::Context;
use log::{debug, trace};
use rigctl_core::protocol::parse_reply;
use rigctl_core::Reply;

const TCP_WRITE_TIMEOUT_S: u64 = 5;

/// Соединение с сервером: одна строка запроса - не более одной строки ответа
pub(crate) struct Connection {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    closed: bool,
}

impl Connection {
    pub(crate) fn connect(addr: SocketAddr, reply_timeout: Duration) -> anyhow::Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("failed to connect to {addr}"))?;

        stream.set_nodelay(true).ok();
        stream.set_read_timeout(Some(reply_timeout))?;
        stream
            .set_write_timeout(Some(Duration::from_secs(TCP_WRITE_TIMEOUT_S)))
            .ok();

        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            writer: stream,
            reader,
            closed: false,
        })
    }

    /// Сервер закрыл соединение (после `c`, отказа в доступе или остановки)
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Отправить команду и дождаться ответа.
    /// `None` - ответа нет: истёк таймаут или сервер закрыл соединение.
    pub(crate) fn request(&mut self, command: &str) -> anyhow::Result<Option<Reply>> {
        let line = format!("{}\n", command.trim_end_matches(['\r', '\n']));
        let sent = self
            .writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.flush());
        match sent {
            Ok(()) => {}
            Err(e) if is_disconnect(&e) => return Ok(self.mark_closed()),
            Err(e) => return Err(e.into()),
        }

        let mut resp = String::new();
        match self.reader.read_line(&mut resp) {
            Ok(0) => Ok(self.mark_closed()),
            Ok(_) => {
                let reply = parse_reply(&resp);
                trace!("{command:?} -> {reply}");
                Ok(Some(reply))
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                // на эту строку сервер ничего не ответил
                Ok(None)
            }
            Err(e) if is_disconnect(&e) => Ok(self.mark_closed()),
            Err(e) => Err(e.into()),
        }
    }

    fn mark_closed(&mut self) -> Option<Reply> {
        debug!("server closed connection");
        self.closed = true;
        None
    }
}

// сервер закрывает "лишних" клиентов молча, это не ошибка
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
    )
}
