//! Таблица команд и диспетчер.
//!
//! Каждая запись - это пара (опкод, квалификатор) и функция-обработчик над
//! [`RadioState`]. Диспетчер ничего не знает про сокеты: на вход строка,
//! на выход [`Reply`].

use std::collections::HashMap;

use crate::constants::DEFAULT_GAIN_STAGE;
use crate::error::CommandError;
use crate::events::{EventSink, RadioEvent};
use crate::mode::Mode;
use crate::protocol::{Qualifier, Reply, Status, parse_request};
use crate::state::{RadioState, Retune};

/// Обработчик команды: состояние, аргументы после опкода, приёмник событий
pub type Handler = fn(&mut RadioState, &str, &dyn EventSink) -> Result<Reply, CommandError>;

/// Запись таблицы команд
#[derive(Clone, Copy)]
pub struct CommandSpec {
    pub opcode: char,
    pub qualifier: Option<Qualifier>,
    /// Короткое имя для логов
    pub name: &'static str,
    /// Команда не принимает никакого хвоста после опкода
    pub bare: bool,
    pub handler: Handler,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("opcode", &self.opcode)
            .field("qualifier", &self.qualifier)
            .field("name", &self.name)
            .field("bare", &self.bare)
            .finish()
    }
}

type Key = (char, Option<Qualifier>);

/// Таблица команд rigctl-подмножества
pub struct CommandTable {
    entries: HashMap<Key, CommandSpec>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    /// Таблица со всеми встроенными командами
    pub fn new() -> Self {
        Self::from_specs(builtin_commands())
    }

    /// Таблица из произвольного набора записей; при повторе ключа побеждает последняя
    pub fn from_specs(specs: impl IntoIterator<Item = CommandSpec>) -> Self {
        let entries = specs
            .into_iter()
            .map(|spec| ((spec.opcode, spec.qualifier), spec))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, opcode: char, qualifier: Option<Qualifier>) -> Option<&CommandSpec> {
        self.entries.get(&(opcode, qualifier))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Имя команды для строки, если она есть в таблице (для логов)
    pub fn name_of(&self, line: &str) -> Option<&'static str> {
        let req = parse_request(line).ok()?;
        self.lookup(req.opcode, req.qualifier).map(|cmd| cmd.name)
    }

    /// Выполнить строку и сформировать ответ. Ошибки разбора -> `RPRT 1`.
    pub fn dispatch(&self, line: &str, state: &mut RadioState, events: &dyn EventSink) -> Reply {
        match self.execute(line, state, events) {
            Ok(reply) => reply,
            Err(e) => Reply::Status(e.into()),
        }
    }

    /// То же, что [`dispatch`](Self::dispatch), но с причиной ошибки
    pub fn execute(
        &self,
        line: &str,
        state: &mut RadioState,
        events: &dyn EventSink,
    ) -> Result<Reply, CommandError> {
        let req = parse_request(line)?;

        let cmd = self
            .lookup(req.opcode, req.qualifier)
            .ok_or_else(|| CommandError::UnknownCommand(line.trim().to_string()))?;

        if cmd.bare && !req.args.is_empty() {
            return Err(CommandError::ExtraArgs);
        }

        (cmd.handler)(state, req.args, events)
    }
}

// --- форматирование значений ---

fn int(v: i64) -> Result<Reply, CommandError> {
    Ok(Reply::Value(v.to_string()))
}

fn float(v: f64) -> Result<Reply, CommandError> {
    Ok(Reply::Value(format!("{v:.1}")))
}

fn flag(v: bool) -> Result<Reply, CommandError> {
    Ok(Reply::Value(if v { "1" } else { "0" }.to_string()))
}

fn status(s: Status) -> Result<Reply, CommandError> {
    Ok(Reply::Status(s))
}

fn not_applied(_: &mut RadioState, _: &str, _: &dyn EventSink) -> Result<Reply, CommandError> {
    status(Status::NotApplied)
}

// --- обработчики с логикой ---

/// `F 144500000` или `F 144500000.0`; отрицательные значения не принимаются
fn parse_frequency(args: &str) -> Result<i64, CommandError> {
    let token = args
        .split_whitespace()
        .next()
        .ok_or(CommandError::MissingArgument('F'))?;

    let freq = match token.parse::<i64>() {
        Ok(f) => f,
        Err(_) => {
            let f: f64 = token
                .parse()
                .map_err(|_| CommandError::InvalidFrequency(token.to_string()))?;
            if !f.is_finite() || f.fract() != 0.0 || f.abs() >= i64::MAX as f64 {
                return Err(CommandError::InvalidFrequency(token.to_string()));
            }
            f as i64
        }
    };

    if freq < 0 {
        return Err(CommandError::InvalidFrequency(token.to_string()));
    }
    Ok(freq)
}

fn set_frequency(
    st: &mut RadioState,
    args: &str,
    events: &dyn EventSink,
) -> Result<Reply, CommandError> {
    let freq = parse_frequency(args)?;

    match st.retune(freq) {
        Retune::FilterOffset(offset) => events.emit(RadioEvent::FilterOffsetChanged(offset)),
        Retune::Hardware(freq) => events.emit(RadioEvent::FrequencyChanged(freq)),
    }

    status(Status::Ok)
}

/// `M <mode> [passband]`, полоса игнорируется
fn set_mode(
    st: &mut RadioState,
    args: &str,
    events: &dyn EventSink,
) -> Result<Reply, CommandError> {
    let token = args
        .split_whitespace()
        .next()
        .ok_or(CommandError::MissingArgument('M'))?;
    let mode: Mode = token.parse()?;

    st.set_mode(mode);
    events.emit(RadioEvent::ModeChanged(mode));

    status(Status::Ok)
}

/// `G <value>` или `G <stage> <value>`
fn parse_gain(args: &str) -> Option<(String, f64)> {
    let mut parts = args.split_whitespace();
    let (name, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(v), None, None) => (DEFAULT_GAIN_STAGE, v),
        (Some(name), Some(v), None) => (name, v),
        _ => return None,
    };

    let value: f64 = value.parse().ok()?;
    value.is_finite().then(|| (name.to_string(), value))
}

/// Усиление пока не применяется: хосту уходит запрос, локальное значение не меняется
fn set_gain(_: &mut RadioState, args: &str, events: &dyn EventSink) -> Result<Reply, CommandError> {
    if let Some((name, value)) = parse_gain(args) {
        events.emit(RadioEvent::GainChanged { name, value });
    }
    status(Status::NotApplied)
}

fn entry(
    opcode: char,
    qualifier: Option<Qualifier>,
    name: &'static str,
    bare: bool,
    handler: Handler,
) -> CommandSpec {
    CommandSpec {
        opcode,
        qualifier,
        name,
        bare,
        handler,
    }
}

/// Запрос значения + сеттер-заглушка + инкремент/декремент, которые отвечают текущим значением
fn provisional(
    get: char,
    set: char,
    name: &'static str,
    getter: Handler,
    echo: Handler,
) -> [CommandSpec; 4] {
    [
        entry(get, None, name, true, getter),
        entry(set, None, name, false, not_applied),
        entry(set, Some(Qualifier::Increment), name, false, echo),
        entry(set, Some(Qualifier::Decrement), name, false, echo),
    ]
}

fn builtin_commands() -> Vec<CommandSpec> {
    use Qualifier::*;

    let mut cmds = vec![
        // частота
        entry('f', None, "freq", false, |st, _, _| int(st.frequency_hz())),
        entry('F', None, "freq", false, set_frequency),
        entry('F', Some(Increment), "freq", false, |st, _, _| {
            float(st.frequency_hz() as f64)
        }),
        entry('F', Some(Decrement), "freq", false, |st, _, _| {
            float(st.frequency_hz() as f64)
        }),
        // режим
        entry('m', None, "mode", false, |st, _, _| {
            Ok(Reply::Value(st.mode().to_string()))
        }),
        entry('M', None, "mode", false, set_mode),
        // уровень сигнала
        entry('l', None, "level", false, |st, _, _| {
            float(f64::from(st.signal_level_dbfs()))
        }),
        // усиление: сеттер шлёт запрос хосту
        entry('g', None, "gain", true, |st, _, _| float(st.params().gain_db)),
        entry('G', None, "gain", false, set_gain),
        entry('G', Some(Increment), "gain", false, |st, _, _| {
            float(st.params().gain_db)
        }),
        entry('G', Some(Decrement), "gain", false, |st, _, _| {
            float(st.params().gain_db)
        }),
        // ppm: запрос `p`, изменение через `J`
        entry('p', None, "ppm", false, |st, _, _| int(st.params().ppm)),
        // FFT rate: без инкремента/декремента
        entry('y', None, "fft_rate", true, |st, _, _| {
            int(i64::from(st.params().fft_rate))
        }),
        entry('Y', None, "fft_rate", false, not_applied),
        // зум: есть центрирование
        entry('Z', Some(Center), "fft_zoom", false, |_, _, _| {
            status(Status::ZoomCenter)
        }),
        // USB
        entry('v', None, "usb", true, |st, _, _| flag(st.params().usb)),
        entry('x', None, "usb", true, not_applied),
        entry('X', None, "usb", true, not_applied),
        // полноэкранный режим
        entry('k', None, "fullscreen", false, |st, _, _| {
            flag(st.params().fullscreen)
        }),
        entry('K', None, "fullscreen", false, not_applied),
        // UDP аудио
        entry('u', None, "udp_audio", false, |st, _, _| {
            flag(st.params().udp_audio)
        }),
        entry('U', None, "udp_audio", false, not_applied),
        // закрыть соединение
        entry('c', None, "close", false, |_, _, _| Ok(Reply::Close)),
        // события спутника от трекера
        entry('A', Some(Satellite), "aos", false, |_, _, events| {
            events.emit(RadioEvent::SatelliteAos);
            status(Status::Ok)
        }),
        entry('L', Some(Satellite), "los", false, |_, _, events| {
            events.emit(RadioEvent::SatelliteLos);
            status(Status::Ok)
        }),
    ];

    // `p` уже есть выше, здесь только `J`/`JI`/`JD`
    let [_, ppm_set, ppm_inc, ppm_dec] = provisional(
        'p',
        'J',
        "ppm",
        |st, _, _| int(st.params().ppm),
        |st, _, _| float(st.params().ppm as f64),
    );
    cmds.extend([ppm_set, ppm_inc, ppm_dec]);

    cmds.extend(provisional(
        'n',
        'N',
        "lnb",
        |st, _, _| int(st.params().lnb_hz),
        |st, _, _| float(st.params().lnb_hz as f64),
    ));
    cmds.extend(provisional(
        's',
        'S',
        "squelch",
        |st, _, _| float(st.params().squelch_dbfs),
        |st, _, _| float(st.params().squelch_dbfs),
    ));
    cmds.extend(provisional(
        'r',
        'R',
        "ref_offset",
        |st, _, _| int(st.params().reference_offset_hz),
        |st, _, _| float(st.params().reference_offset_hz as f64),
    ));
    cmds.extend(provisional(
        'a',
        'A',
        "audio_gain",
        |st, _, _| float(st.params().audio_gain_db),
        |st, _, _| float(st.params().audio_gain_db),
    ));
    cmds.extend(provisional(
        'b',
        'B',
        "bandwidth",
        |st, _, _| int(st.bandwidth_hz()),
        |st, _, _| float(st.bandwidth_hz() as f64),
    ));
    cmds.extend(provisional(
        't',
        'T',
        "fft_size",
        |st, _, _| int(i64::from(st.params().fft_size)),
        |st, _, _| float(f64::from(st.params().fft_size)),
    ));
    cmds.extend(provisional(
        'z',
        'Z',
        "fft_zoom",
        |st, _, _| float(st.params().fft_zoom),
        |st, _, _| float(st.params().fft_zoom),
    ));

    cmds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn run(table: &CommandTable, st: &mut RadioState, events: &EventLog, line: &str) -> String {
        match table.dispatch(line, st, events) {
            Reply::Close => "<close>".to_string(),
            r => r.to_string(),
        }
    }

    fn setup() -> (CommandTable, RadioState, EventLog) {
        let mut st = RadioState::new();
        st.set_frequency(100_000_000);
        st.set_filter_offset(0);
        st.set_bandwidth(2_000_000);
        (CommandTable::new(), st, EventLog::new())
    }

    #[test]
    fn table_has_no_duplicate_keys() {
        let specs = builtin_commands();
        let table = CommandTable::from_specs(specs.clone());
        assert_eq!(table.len(), specs.len());
    }

    #[test]
    fn set_then_get_frequency() {
        let (table, mut st, ev) = setup();

        assert_eq!(run(&table, &mut st, &ev, "F 144500000\n"), "RPRT 0");
        assert_eq!(run(&table, &mut st, &ev, "f\n"), "144500000");
        assert_eq!(st.frequency_hz(), 144_500_000);
        assert_eq!(ev.take(), vec![RadioEvent::FrequencyChanged(144_500_000)]);
    }

    #[test]
    fn small_frequency_step_emits_offset_event() {
        let (table, mut st, ev) = setup();

        assert_eq!(run(&table, &mut st, &ev, "F 100025000"), "RPRT 0");
        assert_eq!(ev.take(), vec![RadioEvent::FilterOffsetChanged(25_000)]);
        assert_eq!(st.filter_offset_hz(), 25_000);
    }

    #[test]
    fn frequency_accepts_zero_fraction_decimal() {
        let (table, mut st, ev) = setup();
        assert_eq!(run(&table, &mut st, &ev, "F 145800000.0"), "RPRT 0");
        assert_eq!(st.frequency_hz(), 145_800_000);
    }

    #[test]
    fn bad_frequency_is_malformed_and_keeps_state() {
        let (table, mut st, ev) = setup();

        for line in ["F abc", "F", "F -100", "F 1.5", "F NaN"] {
            assert_eq!(run(&table, &mut st, &ev, line), "RPRT 1", "line {line:?}");
        }
        assert_eq!(st.frequency_hz(), 100_000_000);
        assert!(ev.take().is_empty());
    }

    #[test]
    fn frequency_increment_echoes_without_change() {
        let (table, mut st, ev) = setup();
        assert_eq!(run(&table, &mut st, &ev, "FI 1000"), "100000000.0");
        assert_eq!(run(&table, &mut st, &ev, "FD 1000"), "100000000.0");
        assert_eq!(run(&table, &mut st, &ev, "FC"), "RPRT 1");
        assert_eq!(st.frequency_hz(), 100_000_000);
    }

    #[test]
    fn mode_round_trip() {
        let (table, mut st, ev) = setup();

        assert_eq!(run(&table, &mut st, &ev, "M FM\n"), "RPRT 0");
        assert_eq!(run(&table, &mut st, &ev, "m\n"), "FM");
        assert_eq!(ev.take(), vec![RadioEvent::ModeChanged(Mode::Fm)]);

        // полоса после режима игнорируется, регистр тоже
        assert_eq!(run(&table, &mut st, &ev, "M usb 2400"), "RPRT 0");
        assert_eq!(run(&table, &mut st, &ev, "m"), "USB");

        assert_eq!(run(&table, &mut st, &ev, "M CW"), "RPRT 0");
        assert_eq!(run(&table, &mut st, &ev, "m"), "CWL");
    }

    #[test]
    fn unknown_mode_keeps_state() {
        let (table, mut st, ev) = setup();
        run(&table, &mut st, &ev, "M AM");
        ev.take();

        assert_eq!(run(&table, &mut st, &ev, "M FOO"), "RPRT 1");
        assert_eq!(run(&table, &mut st, &ev, "M"), "RPRT 1");
        assert_eq!(st.mode(), Mode::Am);
        assert!(ev.take().is_empty());
    }

    #[test]
    fn signal_level_has_one_decimal() {
        let (table, mut st, ev) = setup();
        st.set_signal_level(-73.3);
        assert_eq!(run(&table, &mut st, &ev, "l"), "-73.3");
        // хвост вроде `l STRENGTH` не мешает
        assert_eq!(run(&table, &mut st, &ev, "l STRENGTH"), "-73.3");
    }

    #[test]
    fn gain_set_is_inert_but_forwards_request() {
        let (table, mut st, ev) = setup();
        let before = run(&table, &mut st, &ev, "g");

        for _ in 0..3 {
            assert_eq!(run(&table, &mut st, &ev, "G 20"), "RPRT 2");
        }
        assert_eq!(run(&table, &mut st, &ev, "G"), "RPRT 2");
        assert_eq!(run(&table, &mut st, &ev, "G IF 12.5"), "RPRT 2");

        assert_eq!(run(&table, &mut st, &ev, "g"), before);
        assert_eq!(
            ev.take(),
            vec![
                RadioEvent::GainChanged { name: "LNA".into(), value: 20.0 },
                RadioEvent::GainChanged { name: "LNA".into(), value: 20.0 },
                RadioEvent::GainChanged { name: "LNA".into(), value: 20.0 },
                RadioEvent::GainChanged { name: "IF".into(), value: 12.5 },
            ]
        );
    }

    #[test]
    fn provisional_setters_reply_not_applied() {
        let (table, mut st, ev) = setup();
        let snapshot = st.clone();

        for line in [
            "J 5", "N 100", "S -50", "R 10", "A 3", "B 10000", "T 4096", "Y 30", "Z 2", "x", "X",
            "K", "U",
        ] {
            assert_eq!(run(&table, &mut st, &ev, line), "RPRT 2", "line {line:?}");
        }

        assert_eq!(st, snapshot);
        assert!(ev.take().is_empty());
    }

    #[test]
    fn provisional_getters_format_by_type() {
        let (table, mut st, ev) = setup();
        st.set_ppm(-3);

        assert_eq!(run(&table, &mut st, &ev, "p"), "-3");
        assert_eq!(run(&table, &mut st, &ev, "JI 1"), "-3.0");
        assert_eq!(run(&table, &mut st, &ev, "n"), "0");
        assert_eq!(run(&table, &mut st, &ev, "s"), "-150.0");
        assert_eq!(run(&table, &mut st, &ev, "a"), "-6.0");
        assert_eq!(run(&table, &mut st, &ev, "b"), "2000000");
        assert_eq!(run(&table, &mut st, &ev, "t"), "8192");
        assert_eq!(run(&table, &mut st, &ev, "y"), "25");
        assert_eq!(run(&table, &mut st, &ev, "z"), "1.0");
        assert_eq!(run(&table, &mut st, &ev, "v"), "0");
        assert_eq!(run(&table, &mut st, &ev, "k"), "0");
        assert_eq!(run(&table, &mut st, &ev, "u"), "0");
    }

    #[test]
    fn strict_getters_reject_trailing_text() {
        let (table, mut st, ev) = setup();
        for line in ["g 1", "n x", "s 1", "r 1", "a 1", "b 1", "t 1", "y 1", "z 1", "v 1"] {
            assert_eq!(run(&table, &mut st, &ev, line), "RPRT 1", "line {line:?}");
        }
    }

    #[test]
    fn zoom_center_has_distinct_status() {
        let (table, mut st, ev) = setup();
        assert_eq!(run(&table, &mut st, &ev, "ZC"), "RPRT 5");
        assert_eq!(run(&table, &mut st, &ev, "ZI 1"), "1.0");
        // центрирование есть только у зума
        assert_eq!(run(&table, &mut st, &ev, "GC"), "RPRT 1");
    }

    #[test]
    fn ppm_uses_j_for_changes() {
        let (table, mut st, ev) = setup();
        assert_eq!(run(&table, &mut st, &ev, "J 10"), "RPRT 2");
        assert_eq!(run(&table, &mut st, &ev, "PI"), "RPRT 1");
        assert_eq!(run(&table, &mut st, &ev, "P 10"), "RPRT 1");
        assert_eq!(run(&table, &mut st, &ev, "pI"), "RPRT 1");
    }

    #[test]
    fn satellite_events() {
        let (table, mut st, ev) = setup();
        assert_eq!(run(&table, &mut st, &ev, "AOS\n"), "RPRT 0");
        assert_eq!(run(&table, &mut st, &ev, "LOS\n"), "RPRT 0");
        assert_eq!(
            ev.take(),
            vec![RadioEvent::SatelliteAos, RadioEvent::SatelliteLos]
        );
    }

    #[test]
    fn name_of_resolves_qualified_forms() {
        let table = CommandTable::new();
        assert_eq!(table.name_of("F 145000000\n"), Some("freq"));
        assert_eq!(table.name_of("ZC"), Some("fft_zoom"));
        assert_eq!(table.name_of("AOS"), Some("aos"));
        assert_eq!(table.name_of("A 3"), Some("audio_gain"));
        assert_eq!(table.name_of("Q"), None);
        assert_eq!(table.name_of(""), None);
    }

    #[test]
    fn close_and_unknown() {
        let (table, mut st, ev) = setup();
        assert_eq!(table.dispatch("c\n", &mut st, &ev), Reply::Close);
        assert_eq!(run(&table, &mut st, &ev, "q"), "RPRT 1");
        assert_eq!(run(&table, &mut st, &ev, "W 1"), "RPRT 1");
        assert_eq!(
            table.execute("\\dump_state", &mut st, &ev),
            Err(CommandError::UnknownCommand("\\dump_state".into()))
        );
    }
}
