use std::cell::RefCell;

use crate::mode::Mode;

/// Исходящие уведомления ядра для приёмника/UI.
///
/// Доставляются по принципу fire-and-forget: диспетчер не ждёт реакции хоста.
#[derive(Debug, Clone, PartialEq)]
pub enum RadioEvent {
    /// Нужна аппаратная перестройка на новую частоту
    FrequencyChanged(i64),
    /// Новая отстройка фильтра демодулятора
    FilterOffsetChanged(i64),
    /// Клиент выбрал другой режим
    ModeChanged(Mode),
    /// Запрос на изменение усиления ступени `name`
    GainChanged { name: String, value: f64 },
    /// Спутник поднялся над горизонтом
    SatelliteAos,
    /// Спутник ушёл за горизонт
    SatelliteLos,
}

/// Приёмник исходящих уведомлений.
///
/// Реализация обязана не блокироваться: событие либо уходит сразу, либо теряется.
pub trait EventSink {
    fn emit(&self, event: RadioEvent);
}

/// Сбор событий в память (для тестов и встраивания без каналов)
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<RadioEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Забрать накопленные события
    pub fn take(&self) -> Vec<RadioEvent> {
        self.events.take()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: RadioEvent) {
        self.events.borrow_mut().push(event);
    }
}

