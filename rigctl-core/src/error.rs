use thiserror::Error;

/// Ошибки разбора команды. Любая из них на проводе превращается в `RPRT 1`,
/// соединение при этом остаётся открытым.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// пустая строка
    #[error("empty command")]
    EmptyCommand,

    /// Неизвестная команда (нет записи в таблице)
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Не передан обязательный аргумент
    #[error("missing argument for {0}")]
    MissingArgument(char),

    /// Лишние аргументы у команды-запроса
    #[error("unexpected extra arguments")]
    ExtraArgs,

    /// Частота не разбирается или отрицательная
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Неизвестная модуляция
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}
