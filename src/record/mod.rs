//! Control records.
//!
//! Every record starts with one byte whose high nibble is the name length and
//! whose low nibble is the type tag, followed by a type specific body and the
//! name itself. The meaning of a tag depends on the section the record sits in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{byte_to_nibbles, nibbles_to_byte, Blob, Data, Reader};
use crate::error::{Error, Result};
use crate::patch::Section;

pub mod button;
pub mod fader;
pub mod setup;
pub mod wheel;

pub use button::{
    ButtonString, NoteOnOff, ProgramChange, SendScene, StringPressRelease, StringToggle,
};
pub use fader::{Cc, Master, ParamFormat, ParamString};
pub use setup::{Bank, ChannelSetup, Level, Setup};
pub use wheel::{DataWheel, WheelTarget};

/// Longest name a 4-bit length can describe.
pub const NAME_MAX: usize = 15;

/// Longest record body a 1-byte length prefix can describe.
const RECORD_MAX: usize = 255;

/// Field layout of one record type.
pub(crate) trait Fields: Sized {
    /// Decode the fields following the header byte, name included.
    fn read(r: &mut Reader, name_len: usize) -> Result<Self>;

    /// Encode the fields following the header byte, name excluded.
    fn write(&self, w: &mut RecordWriter) -> Result<()>;

    /// Bytes written by [`Fields::write`].
    fn body_len(&self) -> usize;

    fn name(&self) -> &str;
}

/// A record with no fields beyond its name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Named {
    /// Record carrying only `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Fields for Named {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            name: r.string(name_len)?,
        })
    }

    fn write(&self, _w: &mut RecordWriter) -> Result<()> {
        Ok(())
    }

    fn body_len(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One control's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Record {
    /// Control does nothing. Valid in every section.
    Disabled(Named),
    /// Fader or CV sending a control change.
    #[serde(rename = "CC")]
    Cc(Cc),
    /// Fader or CV scaling other faders.
    Master(Master),
    /// Fader or CV sending a parameterised sysex string.
    String(ParamString),
    /// Button muting faders.
    Mute(Named),
    /// Button soloing faders.
    Solo(Named),
    /// Button sending a program change.
    ProgramChange(ProgramChange),
    /// Button playing a note.
    NoteOnOff(NoteOnOff),
    /// Button sending a sysex string.
    ButtonString(ButtonString),
    /// Button sending one string on press and one on release.
    StringPressRelease(StringPressRelease),
    /// Button alternating between two strings.
    StringToggle(StringToggle),
    /// Button resending every fader value.
    SendFader(Named),
    /// Button recalling a scene.
    SendScene(SendScene),
    /// Data wheel mapping.
    DataWheel(DataWheel),
    /// Settings sent when the patch is recalled.
    Setup(Setup),
}

/// Apply `$body` to the fields of whichever variant `$record` holds.
macro_rules! with_fields {
    ($record:expr, $f:ident => $body:expr) => {
        match $record {
            Record::Disabled($f) => $body,
            Record::Cc($f) => $body,
            Record::Master($f) => $body,
            Record::String($f) => $body,
            Record::Mute($f) => $body,
            Record::Solo($f) => $body,
            Record::ProgramChange($f) => $body,
            Record::NoteOnOff($f) => $body,
            Record::ButtonString($f) => $body,
            Record::StringPressRelease($f) => $body,
            Record::StringToggle($f) => $body,
            Record::SendFader($f) => $body,
            Record::SendScene($f) => $body,
            Record::DataWheel($f) => $body,
            Record::Setup($f) => $body,
        }
    };
}

impl Record {
    /// Decode one record body (length prefix already stripped) found in `section`.
    pub fn decode(section: Section, data: Data) -> Result<Self> {
        let (name_len, tag) = byte_to_nibbles(data.byte(0)?);
        let name_len = usize::from(name_len);
        let mut r = Reader::new(data);
        r.u8()?;

        let record = match (section, tag) {
            (_, 0) => Record::Disabled(Named::read(&mut r, name_len)?),
            (Section::Faders | Section::Cvs, 1) => Record::Cc(Cc::read(&mut r, name_len)?),
            (Section::Faders | Section::Cvs, 2) => {
                Record::Master(Master::read(&mut r, name_len)?)
            }
            (Section::Faders | Section::Cvs, 3) => {
                Record::String(ParamString::read(&mut r, name_len)?)
            }
            (Section::Buttons, 1) => Record::Mute(Named::read(&mut r, name_len)?),
            (Section::Buttons, 2) => Record::Solo(Named::read(&mut r, name_len)?),
            (Section::Buttons, 3) => {
                Record::ProgramChange(ProgramChange::read(&mut r, name_len)?)
            }
            (Section::Buttons, 4) => Record::NoteOnOff(NoteOnOff::read(&mut r, name_len)?),
            (Section::Buttons, 5) => {
                Record::ButtonString(ButtonString::read(&mut r, name_len)?)
            }
            (Section::Buttons, 6) => {
                Record::StringPressRelease(StringPressRelease::read(&mut r, name_len)?)
            }
            (Section::Buttons, 7) => {
                Record::StringToggle(StringToggle::read(&mut r, name_len)?)
            }
            (Section::Buttons, 8) => Record::SendFader(Named::read(&mut r, name_len)?),
            (Section::Buttons, 9) => Record::SendScene(SendScene::read(&mut r, name_len)?),
            (Section::DataWheel, 1) => Record::DataWheel(DataWheel::read(&mut r, name_len)?),
            (Section::Setup, 1) => Record::Setup(Setup::read(&mut r, name_len)?),
            (section, tag) => return Err(Error::UnknownVariant { section, tag }),
        };
        r.finish()?;
        Ok(record)
    }

    /// Encode the record body: header byte, fields, name.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut w = RecordWriter::new(self.tag(), self.name())?;
        with_fields!(self, f => f.write(&mut w))?;
        w.finish()
    }

    /// Encode the record preceded by its 1-byte length.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let body = self.encode()?;
        let mut packed = Vec::with_capacity(body.len() + 1);
        packed.push(body.len() as u8);
        packed.extend_from_slice(&body);
        Ok(packed)
    }

    /// Total length of the encoded body.
    pub fn length(&self) -> usize {
        1 + with_fields!(self, f => f.body_len()) + self.name().len()
    }

    /// Label of the record, empty when unnamed.
    pub fn name(&self) -> &str {
        with_fields!(self, f => f.name())
    }

    /// Type tag stored in the low nibble of the header byte.
    pub fn tag(&self) -> u8 {
        match self {
            Record::Disabled(_) => 0,
            Record::Cc(_) | Record::Mute(_) | Record::DataWheel(_) | Record::Setup(_) => 1,
            Record::Master(_) | Record::Solo(_) => 2,
            Record::String(_) | Record::ProgramChange(_) => 3,
            Record::NoteOnOff(_) => 4,
            Record::ButtonString(_) => 5,
            Record::StringPressRelease(_) => 6,
            Record::StringToggle(_) => 7,
            Record::SendFader(_) => 8,
            Record::SendScene(_) => 9,
        }
    }

    /// Name of the variant as it appears in documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            Record::Disabled(_) => "Disabled",
            Record::Cc(_) => "CC",
            Record::Master(_) => "Master",
            Record::String(_) => "String",
            Record::Mute(_) => "Mute",
            Record::Solo(_) => "Solo",
            Record::ProgramChange(_) => "ProgramChange",
            Record::NoteOnOff(_) => "NoteOnOff",
            Record::ButtonString(_) => "ButtonString",
            Record::StringPressRelease(_) => "StringPressRelease",
            Record::StringToggle(_) => "StringToggle",
            Record::SendFader(_) => "SendFader",
            Record::SendScene(_) => "SendScene",
            Record::DataWheel(_) => "DataWheel",
            Record::Setup(_) => "Setup",
        }
    }

    /// Whether this variant can be stored in `section`.
    pub fn fits(&self, section: Section) -> bool {
        match self {
            Record::Disabled(_) => true,
            Record::Cc(_) | Record::Master(_) | Record::String(_) => {
                matches!(section, Section::Faders | Section::Cvs)
            }
            Record::Mute(_)
            | Record::Solo(_)
            | Record::ProgramChange(_)
            | Record::NoteOnOff(_)
            | Record::ButtonString(_)
            | Record::StringPressRelease(_)
            | Record::StringToggle(_)
            | Record::SendFader(_)
            | Record::SendScene(_) => section == Section::Buttons,
            Record::DataWheel(_) => section == Section::DataWheel,
            Record::Setup(_) => section == Section::Setup,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        match self {
            Record::Disabled(_) | Record::Mute(_) | Record::Solo(_) | Record::SendFader(_) => {}
            Record::Cc(r) => write!(
                f,
                "min={}, max={}, channel={}, cc={}, mode={}",
                r.min, r.max, r.channel, r.cc, r.mode
            )?,
            Record::Master(r) => write!(f, "faders={:?}, aux={}", r.faders, r.aux)?,
            Record::String(r) => write!(
                f,
                "param_format={}, min={}, max={}, sysex={}",
                r.param_format, r.min, r.max, r.sysex
            )?,
            Record::ProgramChange(r) => {
                write!(f, "channel={}, program={}", r.channel, r.program)?
            }
            Record::NoteOnOff(r) => write!(
                f,
                "channel={}, note={}, velocity={}",
                r.channel, r.note, r.velocity
            )?,
            Record::ButtonString(r) => write!(f, "sysex={}", r.sysex)?,
            Record::StringPressRelease(r) => {
                write!(f, "press={}, release={}", r.press, r.release)?
            }
            Record::StringToggle(r) => write!(f, "sysex1={}, sysex2={}", r.sysex1, r.sysex2)?,
            Record::SendScene(r) => write!(f, "value={}", r.value)?,
            Record::DataWheel(r) => write!(f, "mapped_to={}", r.mapped_to)?,
            Record::Setup(r) => {
                write!(f, "channels={{")?;
                for (i, (id, ch)) in r.channels.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{}: bank={} program={} volume={}",
                        id, ch.bank, ch.program, ch.volume
                    )?;
                }
                write!(f, "}}")?;
                if let Some(scene) = r.scene {
                    write!(f, ", scene={}", scene)?;
                }
                if let Some(sysex) = &r.sysex {
                    write!(f, ", sysex={}", sysex)?;
                }
            }
        }
        if !self.name().is_empty() {
            let bare = matches!(
                self,
                Record::Disabled(_) | Record::Mute(_) | Record::Solo(_) | Record::SendFader(_)
            );
            if !bare {
                write!(f, ", ")?;
            }
            write!(f, "name={}", self.name())?;
        }
        write!(f, ")")
    }
}

/// Builds a record body in declaration order, appending the name last.
pub(crate) struct RecordWriter {
    buf: Vec<u8>,
    name: Vec<u8>,
}

impl RecordWriter {
    fn new(tag: u8, name: &str) -> Result<Self> {
        if name.len() > NAME_MAX {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                max: NAME_MAX,
            });
        }
        if let Some((offset, byte)) = name
            .bytes()
            .enumerate()
            .find(|&(_, c)| !(b' '..=b'~').contains(&c))
        {
            return Err(Error::MalformedText { byte, offset });
        }
        Ok(Self {
            buf: vec![nibbles_to_byte(name.len() as u8, tag)],
            name: name.as_bytes().to_vec(),
        })
    }

    /// Append one byte.
    pub fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a big-endian signed 16-bit value.
    pub fn i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write `blob` preceded by its 1-byte length.
    pub fn blob(&mut self, field: &'static str, blob: &Blob) -> Result<()> {
        let len = blob.as_bytes().len();
        if len > RECORD_MAX {
            return Err(Error::FieldTooLong { field, len });
        }
        self.buf.push(len as u8);
        self.buf.extend_from_slice(blob.as_bytes());
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.buf.extend_from_slice(&self.name);
        if self.buf.len() > RECORD_MAX {
            return Err(Error::FieldTooLong {
                field: "record",
                len: self.buf.len(),
            });
        }
        Ok(self.buf)
    }
}
