//! Настройки в TOML.
//!
//! Пишем только то, что отличается от умолчаний: порт 7356 и список из одного
//! `127.0.0.1` в файл не попадают. Остальные таблицы файла (настройки самого
//! приёмника) читаются как начальные значения и при сохранении не трогаются.

use std::fs;
use std::io;
use std::path::Path;

use rigctl_core::DEFAULT_FREQUENCY_HZ;
use serde::Deserialize;
use toml::{Table, Value};

use crate::config::{DEFAULT_PORT, ServerConfig, normalize_hosts};
use crate::error::SettingsError;

const SECTION: &str = "remote_control";
const KEY_PORT: &str = "port";
const KEY_HOSTS: &str = "allowed_hosts";

/// Начальные значения приёмника из настроек хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverSeed {
    pub frequency_hz: i64,
    pub filter_offset_hz: i64,
    pub ppm: i64,
}

impl Default for ReceiverSeed {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            filter_offset_hz: 0,
            ppm: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerConfig,
    pub seed: ReceiverSeed,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    remote_control: RemoteControlSection,
    #[serde(default)]
    input: InputSection,
    #[serde(default)]
    receiver: ReceiverSection,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteControlSection {
    port: Option<u16>,
    allowed_hosts: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct InputSection {
    frequency: Option<i64>,
    corr_freq: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReceiverSection {
    offset: Option<i64>,
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let rc = file.remote_control;
        let defaults = ReceiverSeed::default();

        Settings {
            server: ServerConfig {
                port: rc.port.unwrap_or(DEFAULT_PORT),
                allowed_hosts: normalize_hosts(rc.allowed_hosts.unwrap_or_default()),
            },
            seed: ReceiverSeed {
                frequency_hz: file.input.frequency.unwrap_or(defaults.frequency_hz),
                filter_offset_hz: file.receiver.offset.unwrap_or(defaults.filter_offset_hz),
                ppm: file.input.corr_freq.unwrap_or(defaults.ppm),
            },
        }
    }
}

/// Разбор текста настроек
pub fn parse(text: &str) -> Result<Settings, toml::de::Error> {
    let file: SettingsFile = toml::from_str(text)?;
    Ok(file.into())
}

/// Чтение настроек; отсутствующий файл - все значения по умолчанию
pub fn load(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    let path = path.as_ref();

    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Записать в таблицу только отличия от умолчаний.
/// Пустая секция удаляется целиком.
pub fn apply_sparse(doc: &mut Table, cfg: &ServerConfig) {
    let mut section = match doc.remove(SECTION) {
        Some(Value::Table(t)) => t,
        _ => Table::new(),
    };

    if cfg.port != DEFAULT_PORT {
        section.insert(KEY_PORT.to_string(), Value::Integer(i64::from(cfg.port)));
    } else {
        section.remove(KEY_PORT);
    }

    if cfg.has_default_hosts() {
        section.remove(KEY_HOSTS);
    } else {
        let hosts = cfg
            .allowed_hosts
            .iter()
            .cloned()
            .map(Value::String)
            .collect();
        section.insert(KEY_HOSTS.to_string(), Value::Array(hosts));
    }

    if !section.is_empty() {
        doc.insert(SECTION.to_string(), Value::Table(section));
    }
}

/// Сохранить порт и список хостов, не трогая остальной файл
pub fn save(path: impl AsRef<Path>, cfg: &ServerConfig) -> Result<(), SettingsError> {
    let path = path.as_ref();

    let mut doc = match fs::read_to_string(path) {
        Ok(text) => text.parse::<Table>().map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Table::new(),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    apply_sparse(&mut doc, cfg);

    let text = toml::to_string(&doc)?;
    fs::write(path, text).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn cfg(port: u16, hosts: &[&str]) -> ServerConfig {
        ServerConfig::new(port, hosts.iter().copied())
    }

    #[test]
    fn default_port_and_hosts_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        save(&path, &ServerConfig::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("port"), "unexpected port in {text:?}");
        assert!(!text.contains("allowed_hosts"), "unexpected hosts in {text:?}");
        assert!(!text.contains(SECTION));
    }

    #[test]
    fn non_default_values_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let wanted = cfg(4532, &["192.168.1.5", "127.0.0.1"]);
        save(&path, &wanted).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.server, wanted);
    }

    #[test]
    fn resetting_port_to_default_removes_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        save(&path, &cfg(4532, &["127.0.0.1"])).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("4532"));

        save(&path, &cfg(DEFAULT_PORT, &["127.0.0.1"])).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("port"), "port must be removed: {text:?}");
        assert_eq!(load(&path).unwrap().server.port, DEFAULT_PORT);
    }

    #[test]
    fn save_keeps_unrelated_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[input]\nfrequency = 437800000\ncorr_freq = -3\n\n[receiver]\noffset = 12000\n",
        )
        .unwrap();

        save(&path, &cfg(7400, &["10.0.0.7"])).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.server.port, 7400);
        assert_eq!(
            loaded.seed,
            ReceiverSeed {
                frequency_hz: 437_800_000,
                filter_offset_hz: 12_000,
                ppm: -3
            }
        );
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn empty_host_list_loads_as_default() {
        let loaded = parse("[remote_control]\nallowed_hosts = []\n").unwrap();
        assert_eq!(loaded.server.allowed_hosts, BTreeSet::from(["127.0.0.1".to_string()]));
    }

    #[test]
    fn garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[remote_control\nport = ").unwrap();

        assert!(matches!(load(&path), Err(SettingsError::Parse { .. })));
        assert!(matches!(
            save(&path, &ServerConfig::default()),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(parse("[remote_control]\nport = 70000\n").is_err());
    }
}
