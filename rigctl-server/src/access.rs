use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::RwLock;

use log::warn;

use crate::config::normalize_hosts;

/// Белый список адресов клиентов.
///
/// Только точное совпадение строки адреса: без CIDR, масок и DNS.
#[derive(Debug)]
pub struct AccessControl {
    hosts: RwLock<BTreeSet<String>>,
}

impl AccessControl {
    pub fn new(hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            hosts: RwLock::new(normalize_hosts(hosts)),
        }
    }

    pub fn is_allowed(&self, peer: &str) -> bool {
        self.read().contains(peer)
    }

    /// IPv4-mapped IPv6 (`::ffff:127.0.0.1`) сравнивается как IPv4
    pub fn is_allowed_addr(&self, peer: IpAddr) -> bool {
        self.is_allowed(&peer.to_canonical().to_string())
    }

    /// Атомарно заменить список; пустой список превращается в умолчание
    pub fn set_hosts(&self, hosts: impl IntoIterator<Item = impl Into<String>>) {
        let new_hosts = normalize_hosts(hosts);
        let mut guard = match self.hosts.write() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("allowed hosts lock poisoned; continuing");
                poisoned.into_inner()
            }
        };
        *guard = new_hosts;
    }

    pub fn hosts(&self) -> BTreeSet<String> {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeSet<String>> {
        match self.hosts.read() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
