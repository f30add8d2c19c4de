use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Режим демодулятора.
///
/// `CW` и `CWL` на проводе - один и тот же режим: `M CW` принимается,
/// но в ответ на `m` уходит `CWL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Off,
    Raw,
    Am,
    Fm,
    Wfm,
    WfmStereo,
    Lsb,
    Usb,
    CwLower,
    CwUpper,
}

impl Mode {
    /// Все режимы в порядке индексов приёмника
    pub const ALL: [Mode; 10] = [
        Mode::Off,
        Mode::Raw,
        Mode::Am,
        Mode::Fm,
        Mode::Wfm,
        Mode::WfmStereo,
        Mode::Lsb,
        Mode::Usb,
        Mode::CwLower,
        Mode::CwUpper,
    ];

    /// Строка режима в стиле rigctld
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Off => "OFF",
            Mode::Raw => "RAW",
            Mode::Am => "AM",
            Mode::Fm => "FM",
            Mode::Wfm => "WFM",
            Mode::WfmStereo => "WFM_ST",
            Mode::Lsb => "LSB",
            Mode::Usb => "USB",
            Mode::CwLower => "CWL",
            Mode::CwUpper => "CWU",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CommandError;

    /// Регистр не важен: "fm", "Fm" и "FM" - одно и то же
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("CW") {
            return Ok(Mode::CwLower);
        }

        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CommandError::UnknownMode(s.to_string()))
    }
}
