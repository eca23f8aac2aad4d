//! Fader and CV records.

use std::collections::BTreeSet;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use super::{Fields, RecordWriter};
use crate::data::{bitmap_ids, ids_to_bitmap, Blob, Reader};
use crate::error::{Error, Result};

/// Sends a control change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cc {
    /// Value at the bottom of the fader travel.
    pub min: u8,
    /// Value at the top of the fader travel.
    pub max: u8,
    /// MIDI channel byte; 0xFD device number, 0xFE channelized previous
    /// byte, 0xFF remote velocity.
    pub channel: u8,
    /// Controller number.
    pub cc: u8,
    /// Device specific output mode.
    pub mode: u8,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for Cc {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            min: r.u8()?,
            max: r.u8()?,
            channel: r.u8()?,
            cc: r.u8()?,
            mode: r.u8()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.min);
        w.u8(self.max);
        w.u8(self.channel);
        w.u8(self.cc);
        w.u8(self.mode);
        Ok(())
    }

    fn body_len(&self) -> usize {
        5
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Drives a group of other faders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Master {
    /// Fader ids 1-16.
    pub faders: BTreeSet<u8>,
    /// Device specific, usually 0 or 3.
    #[serde(alias = "wut")]
    pub aux: u8,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for Master {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        let lo = r.u8()?;
        let hi = r.u8()?;
        Ok(Self {
            faders: bitmap_ids(lo, hi),
            aux: r.u8()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        let [lo, hi] = ids_to_bitmap("faders", &self.faders)?;
        w.u8(lo);
        w.u8(hi);
        w.u8(self.aux);
        Ok(())
    }

    fn body_len(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// How a [`ParamString`] inserts the fader value into its sysex string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum ParamFormat {
    /// One 7-bit byte.
    SingleByte = 1,
    /// Two 7-bit bytes, high first.
    TwoByteSevenBitHiLo = 2,
    /// Two 7-bit bytes, low first.
    TwoByteSevenBitLoHi = 3,
    /// Three 7-bit bytes, low first.
    ThreeByteSevenBitLoHi = 4,
    /// Three 7-bit bytes, high first.
    ThreeByteSevenBitHiLo = 5,
    /// Two nibbles, high first.
    TwoByteNibbleHiLo = 6,
    /// Two nibbles, low first.
    TwoByteNibbleLoHi = 7,
    /// Three nibbles, high first.
    ThreeByteNibbleHiLo = 8,
    /// Three nibbles, low first.
    ThreeByteNibbleLoHi = 9,
    /// Four nibbles, high first.
    FourByteNibbleHiLo = 10,
    /// Four nibbles, low first.
    FourByteNibbleLoHi = 11,
    /// Two BCD digits, high first.
    TwoByteBcdHiLo = 12,
    /// Two BCD digits, low first.
    TwoByteBcdLoHi = 13,
}

impl ParamFormat {
    /// Name shown on the device, also used in documents.
    pub fn label(self) -> &'static str {
        match self {
            ParamFormat::SingleByte => "Single byte",
            ParamFormat::TwoByteSevenBitHiLo => "2Byte,7Bits,hi->lo",
            ParamFormat::TwoByteSevenBitLoHi => "2Byte,7Bits,lo->hi",
            ParamFormat::ThreeByteSevenBitLoHi => "3Byte,7Bits,lo->hi",
            ParamFormat::ThreeByteSevenBitHiLo => "3Byte,7Bits,hi->lo",
            ParamFormat::TwoByteNibbleHiLo => "2Byte, Nibs,hi->lo",
            ParamFormat::TwoByteNibbleLoHi => "2Byte, Nibs,lo->hi",
            ParamFormat::ThreeByteNibbleHiLo => "3Byte, Nibs,hi->lo",
            ParamFormat::ThreeByteNibbleLoHi => "3Byte, Nibs,lo->hi",
            ParamFormat::FourByteNibbleHiLo => "4Byte, Nibs,hi->lo",
            ParamFormat::FourByteNibbleLoHi => "4Byte, Nibs,lo->hi",
            ParamFormat::TwoByteBcdHiLo => "2Byte,BCD Nibs,hi->lo",
            ParamFormat::TwoByteBcdLoHi => "2Byte,BCD Nibs,lo-hi",
        }
    }
}

impl TryFrom<String> for ParamFormat {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        (0..=u8::MAX)
            .filter_map(|byte| ParamFormat::try_from(byte).ok())
            .find(|format| format.label() == s)
            .ok_or(Error::InvalidValue {
                field: "param_format",
                value: s,
            })
    }
}

impl From<ParamFormat> for String {
    fn from(format: ParamFormat) -> Self {
        format.label().to_string()
    }
}

impl fmt::Display for ParamFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sends a sysex string with the fader value spliced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamString {
    /// Encoding of the spliced value.
    pub param_format: ParamFormat,
    /// Value at the bottom of the fader travel.
    pub min: i16,
    /// Value at the top of the fader travel.
    pub max: i16,
    /// Template the value is spliced into.
    pub sysex: Blob,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for ParamString {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        let format = r.u8()?;
        let param_format = ParamFormat::try_from(format).map_err(|_| Error::UnknownValue {
            field: "param_format",
            value: format,
        })?;
        Ok(Self {
            param_format,
            min: r.i16()?,
            max: r.i16()?,
            sysex: r.blob()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.param_format.into());
        w.i16(self.min);
        w.i16(self.max);
        w.blob("sysex", &self.sysex)
    }

    fn body_len(&self) -> usize {
        6 + self.sysex.as_bytes().len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
