use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard, atomic::AtomicBool, atomic::Ordering};

use log::{debug, info, trace, warn};
use rigctl_core::protocol::{decode_line, is_ignorable};
use rigctl_core::{CommandTable, MAX_LINE_LEN, RadioState, Reply};

use crate::access::AccessControl;
use crate::config::{SESSION_READ_TICK, TCP_WRITE_TIMEOUT};
use crate::hub::EventHub;

/// Состояние приёмника под единственным мьютексом
pub(crate) type SharedState = Arc<Mutex<RadioState>>;

/// Всё, что нужно сессии и listener-у; клонируется дёшево
#[derive(Clone)]
pub(crate) struct Context {
    pub(crate) state: SharedState,
    pub(crate) access: Arc<AccessControl>,
    pub(crate) hub: Arc<EventHub>,
    pub(crate) commands: Arc<CommandTable>,
}

pub(crate) fn lock_state(state: &SharedState) -> MutexGuard<'_, RadioState> {
    match state.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            warn!("radio state lock poisoned; continuing");
            poisoned.into_inner()
        }
    }
}

/// Нарезка входного потока на строки по `\n` с ограничением длины.
///
/// Строка длиннее [`MAX_LINE_LEN`] обрезается и уходит как есть,
/// остаток становится началом следующей строки. Незавершённый хвост
/// переживает таймауты чтения и отбрасывается только на EOF.
#[derive(Debug)]
pub(crate) struct LineFramer {
    buf: Vec<u8>,
    max_len: usize,
}

impl LineFramer {
    pub(crate) fn new(max_len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(max_len),
            max_len,
        }
    }

    /// `Ok(None)` - EOF
    pub(crate) fn read_line<R: BufRead>(&mut self, reader: &mut R) -> io::Result<Option<Vec<u8>>> {
        loop {
            let remaining = (self.max_len - self.buf.len()) as u64;
            let n = reader.by_ref().take(remaining).read_until(b'\n', &mut self.buf)?;

            if self.buf.ends_with(b"\n") || self.buf.len() >= self.max_len {
                return Ok(Some(std::mem::take(&mut self.buf)));
            }

            if n == 0 {
                if !self.buf.is_empty() {
                    debug!("dropping unterminated tail of {} bytes", self.buf.len());
                    self.buf.clear();
                }
                return Ok(None);
            }
        }
    }
}

/// Выполнить одну строку и записать ответ. `false` - сессию надо закрыть.
pub(crate) fn handle_line<W: Write>(
    raw: &[u8],
    writer: &mut W,
    ctx: &Context,
    peer: SocketAddr,
) -> io::Result<bool> {
    if is_ignorable(raw) {
        return Ok(true);
    }

    let line = decode_line(raw);
    let reply = {
        let mut state = lock_state(&ctx.state);
        ctx.commands.dispatch(&line, &mut state, ctx.hub.as_ref())
    };
    trace!(
        "{peer}: {line:?} [{}] -> {reply}",
        ctx.commands.name_of(&line).unwrap_or("?")
    );

    match reply.to_wire() {
        Some(text) => {
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            Ok(true)
        }
        None => {
            debug_assert_eq!(reply, Reply::Close);
            Ok(false)
        }
    }
}

/// Цикл одной клиентской сессии. Без idle-таймаута: клиент может висеть сколько угодно.
pub(crate) fn run_session(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: Context,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    stream.set_nodelay(true).ok();
    stream.set_read_timeout(Some(SESSION_READ_TICK))?;
    stream.set_write_timeout(Some(TCP_WRITE_TIMEOUT))?;

    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut framer = LineFramer::new(MAX_LINE_LEN);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down session {peer}");
            break;
        }

        match framer.read_line(&mut reader) {
            Ok(Some(raw)) => {
                if !handle_line(&raw, &mut writer, &ctx, peer)? {
                    info!("client {peer} requested close");
                    break;
                }
            }
            Ok(None) => {
                info!("client {peer} disconnected");
                break;
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                // просто "тик" цикла
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    writer.shutdown(Shutdown::Both).ok();
    debug!("session {peer} closed; events {}", ctx.hub.stats());
    Ok(())
}
