//! # rigctl-core
//!
//! Ядро удалённого управления SDR-приёмником по текстовому протоколу,
//! совместимому с подмножеством hamlib `rigctld`.
//!
//! Этот крейт содержит:
//!
//! - [`protocol`] - разбор строк команд и форматирование ответов `RPRT n`
//! - [`commands`] - таблица команд и диспетчер
//! - [`state`] - общее состояние приёмника и политика перестройки частоты
//! - [`events`] - исходящие уведомления для приёмника/UI
//! - [`mode`] - режимы демодулятора и их строковые имена
//! - [`error`] - ошибки разбора команд
//!
//! ## Быстрый пример
//!
//! ```rust
//! use rigctl_core::{CommandTable, EventLog, RadioEvent, RadioState};
//!
//! let table = CommandTable::new();
//! let mut state = RadioState::new();
//! let events = EventLog::new();
//!
//! let reply = table.dispatch("F 144500000\n", &mut state, &events);
//! assert_eq!(reply.to_wire().as_deref(), Some("RPRT 0\n"));
//!
//! let reply = table.dispatch("f\n", &mut state, &events);
//! assert_eq!(reply.to_wire().as_deref(), Some("144500000\n"));
//! assert!(matches!(events.take().as_slice(), [RadioEvent::FilterOffsetChanged(0)]));
//! ```
//!
//! ## Дизайн
//!
//! Здесь нет ни сокетов, ни потоков: только типы, разбор и решение
//! "сдвинуть фильтр или перестроить железо". Сеть и жизненный цикл
//! живут в `rigctl-server`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Разбор строк и формат ответов.
pub mod protocol;

/// Таблица команд (опкод, квалификатор) -> обработчик.
pub mod commands;

/// Состояние приёмника и политика перестройки.
pub mod state;

/// Уведомления ядро -> хост.
pub mod events;

/// Режимы демодулятора.
pub mod mode;

/// Ошибки `rigctl-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{
    DEFAULT_BANDWIDTH_HZ, DEFAULT_FREQUENCY_HZ, DEFAULT_GAIN_STAGE, HALF_BANDWIDTH_MARGIN,
    MAX_LINE_LEN, MIN_LINE_LEN, NO_SIGNAL_DBFS,
};

// --- Re-exports (публичный фасад API) ---

pub use crate::commands::{CommandSpec, CommandTable};
pub use crate::error::CommandError;
pub use crate::events::{EventLog, EventSink, RadioEvent};
pub use crate::mode::Mode;
pub use crate::protocol::{Reply, Status};
pub use crate::state::{ProvisionalParams, RadioState, Retune};
