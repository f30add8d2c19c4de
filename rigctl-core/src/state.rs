use crate::constants::{
    DEFAULT_BANDWIDTH_HZ, DEFAULT_FREQUENCY_HZ, HALF_BANDWIDTH_MARGIN, NO_SIGNAL_DBFS,
};
use crate::mode::Mode;

/// Параметры приёмника, которые пока только хранятся и отдаются клиенту,
/// но не связаны с реальным приёмником. Сеттеры по сети их не меняют.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionalParams {
    pub gain_db: f64,
    pub ppm: i64,
    pub lnb_hz: i64,
    pub squelch_dbfs: f64,
    pub reference_offset_hz: i64,
    pub audio_gain_db: f64,
    pub fft_size: u32,
    pub fft_rate: u32,
    pub fft_zoom: f64,
    pub usb: bool,
    pub fullscreen: bool,
    pub udp_audio: bool,
}

impl Default for ProvisionalParams {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            ppm: 0,
            lnb_hz: 0,
            squelch_dbfs: -150.0,
            reference_offset_hz: 0,
            audio_gain_db: -6.0,
            fft_size: 8192,
            fft_rate: 25,
            fft_zoom: 1.0,
            usb: false,
            fullscreen: false,
            udp_audio: false,
        }
    }
}

/// Результат политики перестройки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retune {
    /// Новая частота в пределах видимой полосы - сдвигаем только фильтр
    FilterOffset(i64),
    /// Вышли за полосу - приёмник должен перестроить железо на эту частоту
    Hardware(i64),
}

/// Общее состояние приёмника: его меняют и команды клиента, и уведомления хоста.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioState {
    frequency_hz: i64,
    filter_offset_hz: i64,
    bandwidth_hz: i64,
    half_bandwidth_hz: i64,
    mode: Mode,
    signal_level_dbfs: f32,
    params: ProvisionalParams,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            filter_offset_hz: 0,
            bandwidth_hz: DEFAULT_BANDWIDTH_HZ,
            half_bandwidth_hz: half_bandwidth(DEFAULT_BANDWIDTH_HZ),
            mode: Mode::default(),
            signal_level_dbfs: NO_SIGNAL_DBFS,
            params: ProvisionalParams::default(),
        }
    }
}

/// `0.9 * (bw / 2)` с отбрасыванием дробной части
fn half_bandwidth(bandwidth_hz: i64) -> i64 {
    (HALF_BANDWIDTH_MARGIN * (bandwidth_hz / 2) as f64) as i64
}

impl RadioState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency_hz(&self) -> i64 {
        self.frequency_hz
    }

    pub fn filter_offset_hz(&self) -> i64 {
        self.filter_offset_hz
    }

    pub fn bandwidth_hz(&self) -> i64 {
        self.bandwidth_hz
    }

    pub fn half_bandwidth_hz(&self) -> i64 {
        self.half_bandwidth_hz
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn signal_level_dbfs(&self) -> f32 {
        self.signal_level_dbfs
    }

    pub fn params(&self) -> &ProvisionalParams {
        &self.params
    }

    // --- уведомления от хоста ---

    /// Частота, на которой реально принимает приёмник (железо + отстройка)
    pub fn set_frequency(&mut self, freq_hz: i64) {
        self.frequency_hz = freq_hz.max(0);
    }

    pub fn set_filter_offset(&mut self, offset_hz: i64) {
        self.filter_offset_hz = offset_hz;
    }

    /// Новая видимая полоса; порог перестройки пересчитывается сразу
    pub fn set_bandwidth(&mut self, bandwidth_hz: i64) {
        self.bandwidth_hz = bandwidth_hz;
        self.half_bandwidth_hz = half_bandwidth(bandwidth_hz);
    }

    pub fn set_signal_level(&mut self, level_dbfs: f32) {
        self.signal_level_dbfs = level_dbfs;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_ppm(&mut self, ppm: i64) {
        self.params.ppm = ppm;
    }

    /// Политика перестройки по запросу клиента `F <freq>`.
    ///
    /// Если новая частота остаётся внутри видимой полосы (строго `<` по модулю
    /// отстройки *после* сдвига), двигается только фильтр. Иначе приёмнику
    /// отдаётся новая частота для аппаратной перестройки, а отстройку он
    /// согласует сам. Частота запоминается в любом случае.
    pub fn retune(&mut self, freq_hz: i64) -> Retune {
        let delta = freq_hz.saturating_sub(self.frequency_hz);
        let offset = self.filter_offset_hz.saturating_add(delta);

        let decision = if offset.unsigned_abs() < self.half_bandwidth_hz.max(0).unsigned_abs() {
            self.filter_offset_hz = offset;
            Retune::FilterOffset(offset)
        } else {
            Retune::Hardware(freq_hz)
        };

        self.frequency_hz = freq_hz;
        decision
    }
}
