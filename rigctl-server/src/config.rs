use std::collections::BTreeSet;
use std::time::Duration;

/// Порт rigctld по умолчанию
pub const DEFAULT_PORT: u16 = 7356;

/// Единственный разрешённый по умолчанию адрес
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Ёмкость очереди исходящих уведомлений
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Пауза accept-цикла, когда новых соединений нет
pub(crate) const ACCEPT_TICK: Duration = Duration::from_millis(50);

/// Таймаут чтения сессии: только "тик" для проверки shutdown, не idle-disconnect
pub(crate) const SESSION_READ_TICK: Duration = Duration::from_millis(200);

pub(crate) const TCP_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Настройки сервера удалённого управления
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_hosts: BTreeSet<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_hosts: default_hosts(),
        }
    }
}

impl ServerConfig {
    pub fn new(port: u16, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            port,
            allowed_hosts: normalize_hosts(hosts),
        }
    }

    /// Список хостов совпадает с умолчанием (ровно `127.0.0.1`)
    pub fn has_default_hosts(&self) -> bool {
        self.allowed_hosts == default_hosts()
    }
}

pub(crate) fn default_hosts() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_HOST.to_string()])
}

/// trim + без пустых; пустой результат заменяется умолчанием
pub(crate) fn normalize_hosts(
    hosts: impl IntoIterator<Item = impl Into<String>>,
) -> BTreeSet<String> {
    let set: BTreeSet<String> = hosts
        .into_iter()
        .map(|h| {
            let h: String = h.into();
            h.trim().to_string()
        })
        .filter(|h| !h.is_empty())
        .collect();

    if set.is_empty() { default_hosts() } else { set }
}
