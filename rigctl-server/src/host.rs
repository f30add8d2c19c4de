//! Приёмник-заглушка для автономного запуска.
//!
//! Настоящего железа нет: команды перестройки сразу "выполняются"
//! и возвращаются в сервер как новое состояние.

use log::info;
use rigctl_core::RadioEvent;
use rigctl_server::RemoteControl;

pub(crate) fn apply_event(rc: &RemoteControl, event: RadioEvent) {
    match event {
        RadioEvent::FrequencyChanged(freq) => {
            info!("tuning hardware to {freq} Hz");
            rc.set_new_frequency(freq);
        }
        RadioEvent::FilterOffsetChanged(offset) => {
            info!("moving filter to {offset:+} Hz");
            rc.set_filter_offset(offset);
        }
        RadioEvent::ModeChanged(mode) => {
            info!("demodulator -> {mode}");
            rc.set_mode(mode);
        }
        RadioEvent::GainChanged { name, value } => {
            // усиление не меняем, только фиксируем запрос
            info!("gain request {name}={value:.1} dB ignored");
        }
        RadioEvent::SatelliteAos => info!("satellite AOS"),
        RadioEvent::SatelliteLos => info!("satellite LOS"),
    }
}
