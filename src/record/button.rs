//! Button records.
//!
//! Mute, Solo and SendFader carry nothing but a name and use
//! [`Named`](super::Named) directly.

use serde::{Deserialize, Serialize};

use super::{Fields, RecordWriter};
use crate::data::{Blob, Reader};
use crate::error::Result;

/// Sends a program change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramChange {
    /// MIDI channel byte.
    pub channel: u8,
    /// Program number.
    pub program: u8,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for ProgramChange {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            channel: r.u8()?,
            program: r.u8()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.channel);
        w.u8(self.program);
        Ok(())
    }

    fn body_len(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sends note on at press and note off at release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteOnOff {
    /// MIDI channel byte.
    pub channel: u8,
    /// Note number.
    pub note: u8,
    /// Note-on velocity.
    pub velocity: u8,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for NoteOnOff {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            channel: r.u8()?,
            note: r.u8()?,
            velocity: r.u8()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.channel);
        w.u8(self.note);
        w.u8(self.velocity);
        Ok(())
    }

    fn body_len(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sends one sysex string on press.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonString {
    /// Bytes sent on press.
    pub sysex: Blob,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for ButtonString {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            sysex: r.blob()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.blob("sysex", &self.sysex)
    }

    fn body_len(&self) -> usize {
        1 + self.sysex.as_bytes().len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Sends one sysex string on press and another on release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringPressRelease {
    /// Bytes sent on press.
    pub press: Blob,
    /// Bytes sent on release.
    pub release: Blob,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for StringPressRelease {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            press: r.blob()?,
            release: r.blob()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.blob("press", &self.press)?;
        w.blob("release", &self.release)
    }

    fn body_len(&self) -> usize {
        2 + self.press.as_bytes().len() + self.release.as_bytes().len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Alternates between two sysex strings on each press.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringToggle {
    /// Bytes sent on odd presses.
    pub sysex1: Blob,
    /// Bytes sent on even presses.
    pub sysex2: Blob,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for StringToggle {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            sysex1: r.blob()?,
            sysex2: r.blob()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.blob("sysex1", &self.sysex1)?;
        w.blob("sysex2", &self.sysex2)
    }

    fn body_len(&self) -> usize {
        2 + self.sysex1.as_bytes().len() + self.sysex2.as_bytes().len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Recalls a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendScene {
    /// Scene number.
    pub value: u8,
    /// Label, up to 15 characters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Fields for SendScene {
    fn read(r: &mut Reader, name_len: usize) -> Result<Self> {
        Ok(Self {
            value: r.u8()?,
            name: r.string(name_len)?,
        })
    }

    fn write(&self, w: &mut RecordWriter) -> Result<()> {
        w.u8(self.value);
        Ok(())
    }

    fn body_len(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        &self.name
    }
}
