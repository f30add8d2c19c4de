use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, warn};
use rigctl_core::{EventSink, RadioEvent};

/// Счётчики доставки уведомлений хосту
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryStats {
    pub sent: usize,
    pub dropped_full: usize,
    pub dropped_dead: usize,
}

impl fmt::Display for DeliveryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent={} dropped_full={} dropped_dead={}",
            self.sent, self.dropped_full, self.dropped_dead
        )
    }
}

/// Очередь исходящих уведомлений ядро -> хост.
///
/// `try_send` в ограниченный канал: диспетчер никогда не ждёт хост.
/// Переполнение или отсутствие получателя - событие теряется.
#[derive(Debug)]
pub struct EventHub {
    tx: Sender<RadioEvent>,
    sent: AtomicUsize,
    dropped_full: AtomicUsize,
    dropped_dead: AtomicUsize,
}

impl EventHub {
    /// Хаб + приёмный конец для хоста
    pub fn new(capacity: usize) -> (Self, Receiver<RadioEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        let hub = Self {
            tx,
            sent: AtomicUsize::new(0),
            dropped_full: AtomicUsize::new(0),
            dropped_dead: AtomicUsize::new(0),
        };
        (hub, rx)
    }

    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            sent: self.sent.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_dead: self.dropped_dead.load(Ordering::Relaxed),
        }
    }
}

impl EventSink for EventHub {
    fn emit(&self, event: RadioEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(ev)) => {
                self.dropped_full.fetch_add(1, Ordering::Relaxed);
                warn!("event queue full; dropping {ev:?}");
            }
            Err(TrySendError::Disconnected(ev)) => {
                self.dropped_dead.fetch_add(1, Ordering::Relaxed);
                debug!("no event consumer; dropping {ev:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn emit_delivers_to_receiver() {
        let (hub, rx) = EventHub::new(4);

        hub.emit(RadioEvent::FrequencyChanged(145_000_000));

        let got = rx
            .recv_timeout(Duration::from_millis(200))
            .expect("should receive event");
        assert_eq!(got, RadioEvent::FrequencyChanged(145_000_000));
        assert_eq!(hub.stats().sent, 1);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (hub, _rx) = EventHub::new(1);

        // первый заполнит очередь
        hub.emit(RadioEvent::SatelliteAos);
        // второй не влезет, т.к. rx не читает
        hub.emit(RadioEvent::SatelliteLos);

        let st = hub.stats();
        assert_eq!(st.sent, 1);
        assert_eq!(st.dropped_full, 1);
        assert_eq!(st.dropped_dead, 0);
    }

    #[test]
    fn disconnected_receiver_is_counted() {
        let (hub, rx) = EventHub::new(4);
        drop(rx);

        hub.emit(RadioEvent::SatelliteLos);

        assert_eq!(
            hub.stats(),
            DeliveryStats {
                sent: 0,
                dropped_full: 0,
                dropped_dead: 1
            }
        );
        assert_eq!(hub.stats().to_string(), "sent=0 dropped_full=0 dropped_dead=1");
    }
}
