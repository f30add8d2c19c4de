use std::path::PathBuf;

use clap::Parser;
use rigctl_core::DEFAULT_BANDWIDTH_HZ;

/// rigctl-server - удалённое управление SDR-приёмником по протоколу rigctld.
///
/// Без `--settings` работает на порту 7356 и пускает только 127.0.0.1.
/// Значения из командной строки перекрывают значения из файла настроек.
#[derive(Parser, Debug, Clone)]
#[command(name = "rigctl-server", version, about)]
pub(crate) struct Args {
    /// TCP порт, например 7356 (0 - выбрать свободный)
    #[arg(long)]
    pub(crate) port: Option<u16>,

    /// Разрешённый адрес клиента; можно повторять: --allow 127.0.0.1 --allow 192.168.1.5
    #[arg(long = "allow", value_name = "HOST")]
    pub(crate) allow: Vec<String>,

    /// Файл настроек в TOML (секции [remote_control], [input], [receiver])
    #[arg(long, value_name = "FILE")]
    pub(crate) settings: Option<PathBuf>,

    /// Записать порт и список хостов обратно в файл настроек при выходе
    #[arg(long, requires = "settings")]
    pub(crate) save_settings: bool,

    /// Полоса входного сигнала в Гц (от неё зависит, сдвигать фильтр или перестраивать железо)
    #[arg(long, default_value_t = DEFAULT_BANDWIDTH_HZ)]
    pub(crate) bandwidth: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let args = Args::try_parse_from(["rigctl-server"]).unwrap();
        assert_eq!(args.port, None);
        assert!(args.allow.is_empty());
        assert!(!args.save_settings);
        assert_eq!(args.bandwidth, DEFAULT_BANDWIDTH_HZ);
    }

    #[test]
    fn allow_is_repeatable() {
        let args = Args::try_parse_from([
            "rigctl-server",
            "--port",
            "4532",
            "--allow",
            "127.0.0.1",
            "--allow",
            "10.0.0.2",
        ])
        .unwrap();
        assert_eq!(args.port, Some(4532));
        assert_eq!(args.allow, vec!["127.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn save_settings_requires_file() {
        assert!(Args::try_parse_from(["rigctl-server", "--save-settings"]).is_err());
        assert!(
            Args::try_parse_from(["rigctl-server", "--save-settings", "--settings", "rc.toml"])
                .is_ok()
        );
    }
}
