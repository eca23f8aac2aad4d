//! Device setup block.
//!
//! Layout after the header byte:
//!
//! ```text
//! [channels lo] [channels hi]   bitmap of MIDI channels 1-16
//! [bank program volume] ...     one triple per selected channel, ascending
//! [FE scene]                    only when a scene is recalled
//! [len] sysex...                len 0 means no sysex
//! name
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Fields, RecordWriter};
use crate::data::{bitmap_ids, ids_to_bitmap, Blob, Reader};
use crate::error::{Error, Result};

const SCENE_MARKER: u8 = 0xFE;
const OFF: u8 = 0x7F;
const VALUE_FLAG: u8 = 0x80;

/// Number or string form of a channel setting in documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SettingRepr {
    Number(u8),
    Text(String),
}

fn parse_value(field: &'static str, s: &str) -> Result<u8> {
    s.parse::<u8>()
        .ok()
        .filter(|v| *v < VALUE_FLAG)
        .ok_or_else(|| Error::InvalidValue {
            field,
            value: s.to_string(),
        })
}

/// Bank select sent when the setup is recalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingRepr", into = "SettingRepr")]
pub enum Bank {
    /// Plain bank number 0-127.
    Value(u8),
    /// Folded bank 1-128, written `"<n>m"`.
    Folded(u8),
}

impl Bank {
    /// Decode a bank byte; bit 7 marks a plain value.
    pub fn from_byte(value: u8) -> Self {
        if value & VALUE_FLAG != 0 {
            Bank::Value(value - VALUE_FLAG)
        } else {
            Bank::Folded(value + 1)
        }
    }

    /// Inverse of [`Bank::from_byte`].
    pub fn to_byte(self) -> Result<u8> {
        match self {
            Bank::Value(v) if v < VALUE_FLAG => Ok(v | VALUE_FLAG),
            Bank::Folded(n @ 1..=128) => Ok(n - 1),
            _ => Err(Error::InvalidValue {
                field: "bank",
                value: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bank::Value(v) => write!(f, "{}", v),
            Bank::Folded(n) => write!(f, "{}m", n),
        }
    }
}

impl TryFrom<SettingRepr> for Bank {
    type Error = Error;

    fn try_from(repr: SettingRepr) -> Result<Self> {
        let bank = match repr {
            SettingRepr::Number(v) => Bank::Value(v),
            SettingRepr::Text(s) => match s.strip_suffix('m') {
                Some(n) => Bank::Folded(n.parse().map_err(|_| Error::InvalidValue {
                    field: "bank",
                    value: s.clone(),
                })?),
                None => Bank::Value(parse_value("bank", &s)?),
            },
        };
        bank.to_byte()?;
        Ok(bank)
    }
}

impl From<Bank> for SettingRepr {
    fn from(bank: Bank) -> Self {
        match bank {
            Bank::Value(v) => SettingRepr::Number(v),
            Bank::Folded(_) => SettingRepr::Text(bank.to_string()),
        }
    }
}

/// Program or volume sent when the setup is recalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingRepr", into = "SettingRepr")]
pub enum Level {
    /// Nothing is sent.
    Off,
    /// 0-127.
    Value(u8),
}

impl Level {
    /// Decode a program or volume byte: 0x7F is off, bit 7 marks a value.
    pub fn from_byte(field: &'static str, value: u8) -> Result<Self> {
        match value {
            OFF => Ok(Level::Off),
            v if v & VALUE_FLAG != 0 => Ok(Level::Value(v - VALUE_FLAG)),
            value => Err(Error::UnknownValue { field, value }),
        }
    }

    /// Inverse of [`Level::from_byte`].
    pub fn to_byte(self) -> Result<u8> {
        match self {
            Level::Off => Ok(OFF),
            Level::Value(v) if v < VALUE_FLAG => Ok(v | VALUE_FLAG),
            Level::Value(v) => Err(Error::InvalidValue {
                field: "level",
                value: v.to_string(),
            }),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Off => f.write_str("Off"),
            Level::Value(v) => write!(f, "{}", v),
        }
    }
}

impl TryFrom<SettingRepr> for Level {
    type Error = Error;

    fn try_from(repr: SettingRepr) -> Result<Self> {
        let level = match repr {
            SettingRepr::Text(s) if s == "Off" => Level::Off,
            SettingRepr::Text(s) => Level::Value(parse_value("level", &s)?),
            SettingRepr::Number(v) => Level::Value(v),
        };
        level.to_byte()?;
        Ok(level)
    }
}

impl From<Level> for SettingRepr {
    fn from(level: Level) -> Self {
        match level {
            Level::Off => SettingRepr::Text("Off".to_string()),
            Level::Value(v) => SettingRepr::Number(v),
        }
    }
}

/// Settings sent on one MIDI channel when the setup is recalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSetup {
    /// Bank select.
    pub bank: Bank,
    /// Program change.
    pub program: Level,
    /// Channel volume.
    pub volume: Level,
}

/// Channel settings, scene and sysex sent when the setup is recalled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    /// Keyed by MIDI channel 1-16.
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_channels"
    )]
    pub channels: BTreeMap<u8, ChannelSetup>,
    /// Scene recalled with the setup, 0 included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<u8>,
    /// Sysex sent with the setup; an empty string reads as absent.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_sysex"
    )]
    pub sysex: Option<Blob>,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

// Object keys arrive as strings once the record's "type" tag has been buffered.
fn deserialize_channels<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<u8, ChannelSetup>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<String, ChannelSetup>::deserialize(deserializer)?
        .into_iter()
        .map(|(id, setup)| {
            id.parse::<u8>()
                .map(|id| (id, setup))
                .map_err(|_| serde::de::Error::custom(format!("invalid MIDI channel '{}'", id)))
        })
        .collect()
}

// A zero-length sysex is written as no sysex at all.
fn deserialize_sysex<'de, D>(deserializer: D) -> std::result::Result<Option<Blob>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Blob>::deserialize(deserializer)?.filter(|blob| !blob.is_empty()))
}

impl Setup {
    fn sysex_bytes(&self) -> &[u8] {
        self.sysex.as_ref().map(Blob::as_bytes).unwrap_or_default()
    }
}

impl Fields for Setup {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        let lo = r.u8()?;
        let hi = r.u8()?;

        let mut channels = BTreeMap::new();
        for id in bitmap_ids(lo, hi) {
            let setup = ChannelSetup {
                bank: Bank::from_byte(r.u8()?),
                program: Level::from_byte("program", r.u8()?)?,
                volume: Level::from_byte("volume", r.u8()?)?,
            };
            channels.insert(id, setup);
        }

        let scene = if r.peek()? == SCENE_MARKER {
            r.u8()?;
            Some(r.u8()?)
        } else {
            None
        };

        let sysex = Some(r.blob()?).filter(|blob| !blob.is_empty());

        Ok(Self {
            channels,
            scene,
            sysex,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        let [lo, hi] = ids_to_bitmap("channels", self.channels.keys())?;
        w.u8(lo);
        w.u8(hi);

        for setup in self.channels.values() {
            w.u8(setup.bank.to_byte()?);
            w.u8(setup.program.to_byte()?);
            w.u8(setup.volume.to_byte()?);
        }

        if let Some(scene) = self.scene {
            w.u8(SCENE_MARKER);
            w.u8(scene);
        } else if self.sysex_bytes().len() == usize::from(SCENE_MARKER) {
            return Err(Error::InvalidValue {
                field: "sysex",
                value: "a 254 byte sysex needs a scene, its length reads as the scene marker"
                    .to_string(),
            });
        }

        w.blob("sysex", &Blob(self.sysex_bytes().to_vec()))
    }

    fn body_len(&self) -> usize {
        2 + 3 * self.channels.len()
            + if self.scene.is_some() { 2 } else { 0 }
            + 1
            + self.sysex_bytes().len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
