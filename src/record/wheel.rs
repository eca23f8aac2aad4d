//! Data-wheel mapping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Fields, RecordWriter};
use crate::data::Reader;
use crate::error::{Error, Result};

const CV_BASE: u8 = 16;
const LAST_FADER: u8 = 18;

/// Control the data wheel follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WheelTarget {
    /// Fader 1-16.
    Fader(u8),
    /// CV 1-2.
    Cv(u8),
    /// Whichever fader moved last.
    LastFader,
}

impl WheelTarget {
    /// Decode the target byte: 0-15 faders, 16-17 CVs, 18 last fader.
    pub fn from_byte(value: u8) -> Result<Self> {
        match value {
            0..=15 => Ok(WheelTarget::Fader(value + 1)),
            16..=17 => Ok(WheelTarget::Cv(value - CV_BASE + 1)),
            LAST_FADER => Ok(WheelTarget::LastFader),
            _ => Err(Error::UnknownValue {
                field: "mapped_to",
                value,
            }),
        }
    }

    /// Inverse of [`WheelTarget::from_byte`].
    pub fn to_byte(self) -> Result<u8> {
        match self {
            WheelTarget::Fader(n @ 1..=16) => Ok(n - 1),
            WheelTarget::Cv(n @ 1..=2) => Ok(CV_BASE + n - 1),
            WheelTarget::LastFader => Ok(LAST_FADER),
            _ => Err(Error::InvalidValue {
                field: "mapped_to",
                value: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for WheelTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WheelTarget::Fader(n) => write!(f, "Fader {}", n),
            WheelTarget::Cv(n) => write!(f, "CV {}", n),
            WheelTarget::LastFader => f.write_str("Last fader"),
        }
    }
}

impl FromStr for WheelTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidValue {
            field: "mapped_to",
            value: s.to_string(),
        };
        let number = |n: &str, range: std::ops::RangeInclusive<u8>| {
            n.parse::<u8>()
                .ok()
                .filter(|n| range.contains(n))
                .ok_or_else(invalid)
        };

        if s == "Last fader" {
            Ok(WheelTarget::LastFader)
        } else if let Some(n) = s.strip_prefix("Fader ") {
            Ok(WheelTarget::Fader(number(n, 1..=16)?))
        } else if let Some(n) = s.strip_prefix("CV ") {
            Ok(WheelTarget::Cv(number(n, 1..=2)?))
        } else {
            Err(invalid())
        }
    }
}

impl TryFrom<String> for WheelTarget {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<WheelTarget> for String {
    fn from(target: WheelTarget) -> Self {
        target.to_string()
    }
}

/// Maps the data wheel onto another control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWheel {
    /// Control the wheel moves.
    pub mapped_to: WheelTarget,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for DataWheel {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            mapped_to: WheelTarget::from_byte(r.u8()?)?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.mapped_to.to_byte()?);
        Ok(())
    }

    fn body_len(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        &self.name
    }
}
