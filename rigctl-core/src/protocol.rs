use std::borrow::Cow;
use std::fmt;

use crate::constants::MIN_LINE_LEN;
use crate::error::CommandError;

/// Второй символ двухбуквенных команд
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// `I`: увеличить (например `GI 1000`)
    Increment,
    /// `D`: уменьшить
    Decrement,
    /// `C`: центрировать (есть только у зума: `ZC`)
    Center,
    /// `OS` после `A`/`L`: события спутника AOS/LOS
    Satellite,
}

/// Разобранная строка команды
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    pub opcode: char,
    pub qualifier: Option<Qualifier>,
    pub args: &'a str,
}

/// Короткие строки (`"\n"`, пустое чтение) молча пропускаются, без ответа
pub fn is_ignorable(raw: &[u8]) -> bool {
    raw.len() < MIN_LINE_LEN
}

/// Байты строки -> текст без терминатора (`\n` и `\r\n`)
pub fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Парсит строку вида:
/// "F 144500000", "GI 1000", "ZC", "AOS", "m"
pub fn parse_request(line: &str) -> Result<Request<'_>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);

    let mut chars = line.chars();
    let opcode = chars.next().ok_or(CommandError::EmptyCommand)?;
    let rest = chars.as_str();

    // AOS / LOS
    if matches!(opcode, 'A' | 'L') {
        if let Some(args) = rest.strip_prefix("OS") {
            return Ok(Request {
                opcode,
                qualifier: Some(Qualifier::Satellite),
                args: args.trim(),
            });
        }
    }

    let mut rest_chars = rest.chars();
    let qualifier = match rest_chars.next() {
        Some('I') => Some(Qualifier::Increment),
        Some('D') => Some(Qualifier::Decrement),
        Some('C') => Some(Qualifier::Center),
        _ => None,
    };

    if let Some(q) = qualifier {
        let after = rest_chars.as_str();
        // "GI 1000" - квалификатор, "GIX" - просто аргумент
        if after.is_empty() || after.starts_with(char::is_whitespace) {
            return Ok(Request {
                opcode,
                qualifier: Some(q),
                args: after.trim(),
            });
        }
    }

    Ok(Request {
        opcode,
        qualifier: None,
        args: rest.trim(),
    })
}

/// Код статуса в ответе `RPRT n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Применено
    Ok,
    /// Команда не разобрана или неизвестна
    Malformed,
    /// Команда распознана, но к приёмнику пока не применяется
    NotApplied,
    /// Центрирование зума (`ZC`)
    ZoomCenter,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Malformed => 1,
            Status::NotApplied => 2,
            Status::ZoomCenter => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Status> {
        match code {
            0 => Some(Status::Ok),
            1 => Some(Status::Malformed),
            2 => Some(Status::NotApplied),
            5 => Some(Status::ZoomCenter),
            _ => None,
        }
    }
}

impl From<CommandError> for Status {
    fn from(_: CommandError) -> Self {
        Status::Malformed
    }
}

/// Ответ диспетчера
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Значение параметра (ответ на запрос)
    Value(String),
    /// `RPRT n`
    Status(Status),
    /// Закрыть соединение, ничего не отвечая
    Close,
}

impl Reply {
    /// Текст для записи в сокет; `None` - писать нечего
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Reply::Value(v) => Some(format!("{v}\n")),
            Reply::Status(s) => Some(format!("RPRT {}\n", s.code())),
            Reply::Close => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(v) => f.write_str(v),
            Reply::Status(s) => write!(f, "RPRT {}", s.code()),
            Reply::Close => f.write_str("<close>"),
        }
    }
}

/// Разбор строки ответа на стороне клиента.
/// Всё, что не `RPRT <известный код>`, считается значением.
pub fn parse_reply(line: &str) -> Reply {
    let line = line.trim_end_matches(['\r', '\n']);

    line.strip_prefix("RPRT ")
        .and_then(|code| code.trim().parse::<u8>().ok())
        .and_then(Status::from_code)
        .map(Reply::Status)
        .unwrap_or_else(|| Reply::Value(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(opcode: char, qualifier: Option<Qualifier>, args: &str) -> Request<'_> {
        Request {
            opcode,
            qualifier,
            args,
        }
    }

    #[test]
    fn parses_plain_opcodes_with_and_without_args() {
        assert_eq!(parse_request("f\n").unwrap(), req('f', None, ""));
        assert_eq!(
            parse_request("F 144500000\n").unwrap(),
            req('F', None, "144500000")
        );
        assert_eq!(parse_request("M FM 0\r\n").unwrap(), req('M', None, "FM 0"));
    }

    #[test]
    fn parses_qualifiers() {
        assert_eq!(
            parse_request("GI 1000").unwrap(),
            req('G', Some(Qualifier::Increment), "1000")
        );
        assert_eq!(
            parse_request("JD").unwrap(),
            req('J', Some(Qualifier::Decrement), "")
        );
        assert_eq!(
            parse_request("ZC").unwrap(),
            req('Z', Some(Qualifier::Center), "")
        );
        // квалификатор должен стоять отдельно
        assert_eq!(parse_request("GIX").unwrap(), req('G', None, "IX"));
    }

    #[test]
    fn satellite_events_take_precedence_over_audio_gain() {
        assert_eq!(
            parse_request("AOS\n").unwrap(),
            req('A', Some(Qualifier::Satellite), "")
        );
        assert_eq!(
            parse_request("LOS").unwrap(),
            req('L', Some(Qualifier::Satellite), "")
        );
        assert_eq!(parse_request("A 10").unwrap(), req('A', None, "10"));
        // только заглавные
        assert_eq!(parse_request("lOS").unwrap(), req('l', None, "OS"));
    }

    #[test]
    fn empty_line_is_error() {
        assert_eq!(parse_request("\n"), Err(CommandError::EmptyCommand));
        assert_eq!(parse_request(""), Err(CommandError::EmptyCommand));
    }

    #[test]
    fn short_lines_are_ignorable() {
        assert!(is_ignorable(b""));
        assert!(is_ignorable(b"\n"));
        assert!(is_ignorable(b"f"));
        assert!(!is_ignorable(b"f\n"));
    }

    #[test]
    fn decode_line_strips_terminators() {
        assert_eq!(decode_line(b"f\n"), "f");
        assert_eq!(decode_line(b"f\r\n"), "f");
        assert_eq!(decode_line(b"F 1"), "F 1");
    }

    #[test]
    fn reply_wire_format() {
        assert_eq!(
            Reply::Value("144500000".into()).to_wire().as_deref(),
            Some("144500000\n")
        );
        assert_eq!(
            Reply::Status(Status::NotApplied).to_wire().as_deref(),
            Some("RPRT 2\n")
        );
        assert_eq!(
            Reply::Status(Status::ZoomCenter).to_wire().as_deref(),
            Some("RPRT 5\n")
        );
        assert_eq!(Reply::Close.to_wire(), None);
    }

    #[test]
    fn parse_reply_distinguishes_status_and_value() {
        assert_eq!(parse_reply("RPRT 0\n"), Reply::Status(Status::Ok));
        assert_eq!(parse_reply("RPRT 5"), Reply::Status(Status::ZoomCenter));
        assert_eq!(parse_reply("FM\n"), Reply::Value("FM".into()));
        // неизвестный код - просто текст
        assert_eq!(parse_reply("RPRT 9"), Reply::Value("RPRT 9".into()));
    }
}
