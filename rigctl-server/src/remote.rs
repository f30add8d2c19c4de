use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Receiver;
use log::info;
use rigctl_core::{CommandTable, Mode, RadioEvent, RadioState};

use crate::access::AccessControl;
use crate::config::{EVENT_QUEUE_CAPACITY, ServerConfig};
use crate::error::ServerError;
use crate::hub::{DeliveryStats, EventHub};
use crate::session::{Context, lock_state};
use crate::settings::{self, Settings};
use crate::tcp::{ListenerHandle, SessionSlot, close_active_session, spawn_listener};

/// Сервер удалённого управления, встраиваемый в приложение-приёмник.
///
/// Хост вызывает сеттеры (`set_new_frequency`, `set_mode`, ...) при изменении
/// своего состояния и читает [`RadioEvent`] из канала, полученного в [`RemoteControl::new`].
/// Одновременно обслуживается один клиент: пока он подключён, новые соединения
/// закрываются сразу.
pub struct RemoteControl {
    port: u16,
    ctx: Context,
    listener: Option<ListenerHandle>,
    session: SessionSlot,
}

impl RemoteControl {
    pub fn new(config: ServerConfig) -> (Self, Receiver<RadioEvent>) {
        Self::with_queue_capacity(config, EVENT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(
        config: ServerConfig,
        capacity: usize,
    ) -> (Self, Receiver<RadioEvent>) {
        let (hub, rx) = EventHub::new(capacity);

        let ctx = Context {
            state: Arc::new(Mutex::new(RadioState::new())),
            access: Arc::new(AccessControl::new(config.allowed_hosts)),
            hub: Arc::new(hub),
            commands: Arc::new(CommandTable::new()),
        };

        let rc = Self {
            port: config.port,
            ctx,
            listener: None,
            session: SessionSlot::default(),
        };
        (rc, rx)
    }

    // --- жизненный цикл ---

    /// Начать слушать порт. Повторный вызов при работающем сервере ничего не делает.
    pub fn start(&mut self) -> Result<(), ServerError> {
        if self.listener.is_some() {
            return Ok(());
        }
        let listener = spawn_listener(self.port, self.ctx.clone(), self.session.clone())?;
        self.listener = Some(listener);
        Ok(())
    }

    /// Закрыть активную сессию и слушающий сокет
    pub fn stop(&mut self) {
        let was_listening = self.close_listener();
        close_active_session(&self.session);
        if was_listening {
            info!("remote control stopped ({})", self.ctx.hub.stats());
        }
    }

    fn close_listener(&mut self) -> bool {
        match self.listener.take() {
            Some(mut listener) => {
                listener.stop();
                true
            }
            None => false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Фактический адрес (полезно при порте 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(ListenerHandle::local_addr)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Сменить порт; если сервер слушает - переоткрыть сокет на новом порту.
    /// Подключённый клиент при этом остаётся на связи.
    /// При ошибке bind новый порт остаётся записанным, а сервер - не слушающим.
    pub fn set_port(&mut self, port: u16) -> Result<(), ServerError> {
        if port == self.port {
            return Ok(());
        }

        self.port = port;
        if self.close_listener() {
            info!("rebinding remote control on port {port}");
            self.start()?;
        }
        Ok(())
    }

    pub fn hosts(&self) -> Vec<String> {
        self.ctx.access.hosts().into_iter().collect()
    }

    /// Заменить белый список целиком (пустой -> `127.0.0.1`)
    pub fn set_hosts(&self, hosts: impl IntoIterator<Item = impl Into<String>>) {
        self.ctx.access.set_hosts(hosts);
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            allowed_hosts: self.ctx.access.hosts(),
        }
    }

    /// Применить загруженные настройки: начальные значения приёмника,
    /// белый список и порт (с переоткрытием сокета, если сервер слушает)
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<(), ServerError> {
        {
            let mut st = lock_state(&self.ctx.state);
            st.set_frequency(settings.seed.frequency_hz);
            st.set_filter_offset(settings.seed.filter_offset_hz);
            st.set_ppm(settings.seed.ppm);
        }

        self.set_hosts(settings.server.allowed_hosts.iter().cloned());
        self.set_port(settings.server.port)
    }

    /// Записать порт и белый список в файл настроек (только отличия от умолчаний)
    pub fn save_settings(&self, path: impl AsRef<Path>) -> Result<(), ServerError> {
        settings::save(path, &self.config())?;
        Ok(())
    }

    // --- уведомления от хоста ---

    /// Частота, на которой сейчас принимает приёмник
    pub fn set_new_frequency(&self, freq_hz: i64) {
        lock_state(&self.ctx.state).set_frequency(freq_hz);
    }

    pub fn set_filter_offset(&self, offset_hz: i64) {
        lock_state(&self.ctx.state).set_filter_offset(offset_hz);
    }

    pub fn set_bandwidth(&self, bandwidth_hz: i64) {
        lock_state(&self.ctx.state).set_bandwidth(bandwidth_hz);
    }

    pub fn set_signal_level(&self, level_dbfs: f32) {
        lock_state(&self.ctx.state).set_signal_level(level_dbfs);
    }

    pub fn set_mode(&self, mode: Mode) {
        lock_state(&self.ctx.state).set_mode(mode);
    }

    pub fn set_ppm(&self, ppm: i64) {
        lock_state(&self.ctx.state).set_ppm(ppm);
    }

    /// Копия текущего состояния
    pub fn snapshot(&self) -> RadioState {
        lock_state(&self.ctx.state).clone()
    }

    pub fn event_stats(&self) -> DeliveryStats {
        self.ctx.hub.stats()
    }
}

impl Drop for RemoteControl {
    fn drop(&mut self) {
        self.stop();
    }
}
