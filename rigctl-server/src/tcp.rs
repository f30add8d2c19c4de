use std::net::{Ipv4Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, MutexGuard, atomic::AtomicBool, atomic::Ordering};
use std::thread::{self, JoinHandle};

use anyhow::Context as _;
use log::{debug, info, warn};

use crate::config::ACCEPT_TICK;
use crate::error::ServerError;
use crate::session::{Context, run_session};

/// Место под единственную сессию. Живёт дольше listener-а:
/// переоткрытие порта клиента не отключает.
pub(crate) type SessionSlot = Arc<Mutex<Option<ActiveSession>>>;

fn lock_slot(slot: &SessionSlot) -> MutexGuard<'_, Option<ActiveSession>> {
    match slot.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            warn!("session slot lock poisoned; continuing");
            poisoned.into_inner()
        }
    }
}

/// Закрыть активную сессию, если она есть
pub(crate) fn close_active_session(slot: &SessionSlot) {
    // забираем под локом, закрываем уже без него
    let session = lock_slot(slot).take();
    if let Some(session) = session {
        session.close();
    }
}

/// Запущенный listener: сокет живёт в своём потоке до `stop()`
pub(crate) struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Закрыть только слушающий сокет; активная сессия остаётся в слоте
    pub(crate) fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(h) = self.thread.take() {
            if let Err(panic) = h.join() {
                warn!("listener thread panicked: {:?}", panic);
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// bind выполняется синхронно, чтобы ошибка дошла до вызывающего
pub(crate) fn spawn_listener(
    port: u16,
    ctx: Context,
    slot: SessionSlot,
) -> Result<ListenerHandle, ServerError> {
    let bind_err = |source: std::io::Error| ServerError::Bind { port, source };

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).map_err(bind_err)?;
    listener.set_nonblocking(true).map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let sd = shutdown.clone();

    let thread = thread::Builder::new()
        .name(format!("rigctl-listener-{}", local_addr.port()))
        .spawn(move || {
            if let Err(e) = run_tcp_listener(listener, ctx, slot, sd) {
                warn!("listener error: {e:#}");
            }
        })
        .map_err(ServerError::Spawn)?;

    info!("remote control listening on {local_addr}");

    Ok(ListenerHandle {
        local_addr,
        shutdown,
        thread: Some(thread),
    })
}

/// Единственная сессия, которую обслуживает сервер
pub(crate) struct ActiveSession {
    peer: SocketAddr,
    /// клон сокета, чтобы закрыть его снаружи
    stream: TcpStream,
    /// свой флаг: остановка listener-а сессию не трогает
    shutdown: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ActiveSession {
    fn close(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.stream.shutdown(Shutdown::Both).ok();
        if let Err(panic) = self.handle.join() {
            warn!("session thread panicked: {:?}", panic);
        }
        info!("session {} closed", self.peer);
    }
}

// accept loop: одна активная сессия, остальные закрываются сразу
fn run_tcp_listener(
    listener: TcpListener,
    ctx: Context,
    slot: SessionSlot,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        reap_finished_session(&slot);

        if shutdown.load(Ordering::Relaxed) {
            info!("shutting down tcp listener");
            break;
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(e) = accept_conn(stream, peer, &ctx, &slot) {
                    warn!("failed to start session for {peer}: {e:#}");
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                // нет новых соединений прямо сейчас
                thread::sleep(ACCEPT_TICK);
            }
            Err(e) => {
                warn!("accept error: {e}");
                thread::sleep(ACCEPT_TICK);
            }
        }
    }

    Ok(())
}

fn reap_finished_session(slot: &SessionSlot) {
    let finished = {
        let mut active = lock_slot(slot);
        if active.as_ref().is_some_and(|s| s.handle.is_finished()) {
            active.take()
        } else {
            None
        }
    };
    if let Some(session) = finished {
        session.close();
    }
}

fn accept_conn(
    stream: TcpStream,
    peer: SocketAddr,
    ctx: &Context,
    slot: &SessionSlot,
) -> anyhow::Result<()> {
    if !ctx.access.is_allowed_addr(peer.ip()) {
        debug!("connection attempt from {} (not in allowed list)", peer.ip());
        reject(stream);
        return Ok(());
    }

    let mut active = lock_slot(slot);
    if let Some(current) = active.as_ref() {
        debug!(
            "connection attempt from {peer} while {} is connected; closing",
            current.peer
        );
        reject(stream);
        return Ok(());
    }

    stream
        .set_nonblocking(false)
        .context("stream.set_nonblocking(false)")?;
    let control = stream.try_clone().context("stream.try_clone()")?;

    let ctx = ctx.clone();
    let shutdown = Arc::new(AtomicBool::new(false));
    let sd = shutdown.clone();
    let handle = thread::spawn(move || {
        if let Err(e) = run_session(stream, peer, ctx, sd) {
            warn!("session {peer} ended with error: {e}");
        }
    });

    info!("client {peer} connected");
    *active = Some(ActiveSession {
        peer,
        stream: control,
        shutdown,
        handle,
    });

    Ok(())
}

/// Молча закрыть: ни одного байта в ответ
fn reject(stream: TcpStream) {
    stream.shutdown(Shutdown::Both).ok();
    drop(stream);
}
