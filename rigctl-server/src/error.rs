use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Ошибки жизненного цикла сервера
#[derive(Debug, Error)]
pub enum ServerError {
    /// Порт занят / нет прав. Фатально только для вызова start/set_port.
    #[error("failed to bind remote control port {port}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// Не удалось запустить поток listener-а
    #[error("failed to spawn listener thread")]
    Spawn(#[source] io::Error),

    /// Ошибки файла настроек
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Ошибки чтения/записи настроек
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write settings file: {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
