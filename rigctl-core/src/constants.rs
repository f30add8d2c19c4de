/// Минимальная длина строки команды вместе с `\n` (команда + терминатор)
pub const MIN_LINE_LEN: usize = 2;

/// Максимальная длина строки вместе с терминатором; длиннее - обрезается
pub const MAX_LINE_LEN: usize = 1024;

/// Запас полосы для политики перестройки (guard band)
pub const HALF_BANDWIDTH_MARGIN: f64 = 0.9;

/// Частота по умолчанию, Гц
pub const DEFAULT_FREQUENCY_HZ: i64 = 144_500_000;

/// Видимая полоса по умолчанию, Гц
pub const DEFAULT_BANDWIDTH_HZ: i64 = 1_600_000;

/// Уровень сигнала "нет сигнала", dBFS
pub const NO_SIGNAL_DBFS: f32 = -200.0;

/// Имя усилителя, если клиент не указал его в `G`
pub const DEFAULT_GAIN_STAGE: &str = "LNA";
