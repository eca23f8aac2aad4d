//! A decoded PC1600 buffer: name, channel and 36 control records.

use std::fmt;
use std::ops::Range;

use crate::data::Data;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::sysex;

/// Width of the space padded patch name.
pub const NAME_SIZE: usize = 16;

/// Name plus the 2-byte size field.
const HEADER_SIZE: usize = NAME_SIZE + 2;

/// Records in every patch.
pub const RECORD_COUNT: usize = 36;

/// The five groups of controls, in dump order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Records 1-16.
    Faders,
    /// Records 17-18, the two CV inputs.
    Cvs,
    /// Records 19-34.
    Buttons,
    /// Record 35.
    DataWheel,
    /// Record 36.
    Setup,
}

impl Section {
    /// Every section, in dump order.
    pub const ALL: [Section; 5] = [
        Section::Faders,
        Section::Cvs,
        Section::Buttons,
        Section::DataWheel,
        Section::Setup,
    ];

    /// Record indices (0-based) belonging to this section.
    pub fn range(self) -> Range<usize> {
        match self {
            Section::Faders => 0..16,
            Section::Cvs => 16..18,
            Section::Buttons => 18..34,
            Section::DataWheel => 34..35,
            Section::Setup => 35..36,
        }
    }

    /// Number of records in this section.
    pub fn size(self) -> usize {
        self.range().len()
    }

    /// Section of the record at 0-based `index`.
    pub fn of_index(index: usize) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|section| section.range().contains(&index))
    }

    /// Key used for this section in documents.
    pub fn key(self) -> &'static str {
        match self {
            Section::Faders => "faders",
            Section::Cvs => "cvs",
            Section::Buttons => "buttons",
            Section::DataWheel => "data_wheel",
            Section::Setup => "setup",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Contents of one device buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    name: String,
    global_channel: u8,
    records: Vec<Record>,
}

impl Patch {
    /// Build a patch, checking every record sits in a section that accepts it.
    pub fn new(name: &str, global_channel: u8, records: Vec<Record>) -> Result<Self> {
        if name.len() > NAME_SIZE {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                max: NAME_SIZE,
            });
        }
        if let Some((offset, byte)) = name
            .bytes()
            .enumerate()
            .find(|&(_, c)| !(b' '..=b'~').contains(&c))
        {
            return Err(Error::MalformedText { byte, offset });
        }
        if global_channel & 0x80 != 0 {
            return Err(Error::InvalidChannel(global_channel));
        }
        if records.len() != RECORD_COUNT {
            return Err(Error::RecordCount {
                found: records.len(),
            });
        }
        for (index, record) in records.iter().enumerate() {
            let section = Section::of_index(index).ok_or(Error::RecordCount { found: index })?;
            if !record.fits(section) {
                return Err(Error::MisplacedVariant {
                    section,
                    variant: record.type_name(),
                });
            }
        }

        Ok(Self {
            name: name.trim_end().to_string(),
            global_channel,
            records,
        })
    }

    /// Decode a framed current-buffer dump.
    pub fn from_sysex(msg: &[u8]) -> Result<Self> {
        let payload = sysex::unpack(msg)?;
        let global_channel = sysex::channel(msg)?;
        Self::from_payload(&payload, global_channel)
    }

    /// Decode an unframed payload: name, size and records.
    pub fn from_payload(payload: &[u8], global_channel: u8) -> Result<Self> {
        let data = Data::new(payload);
        let name = data.read_string(0, NAME_SIZE)?;
        let data_size = data.read_short(NAME_SIZE)?;

        let actual = payload.len() - HEADER_SIZE;
        if i32::from(data_size) != actual as i32 {
            return Err(Error::SizeMismatch {
                declared: i32::from(data_size),
                actual,
            });
        }

        log::debug!(
            "PATCH: '{}' channel {} with {} bytes of records",
            name.trim_end(),
            global_channel,
            data_size
        );

        let records = Self::parse_records(data)?;
        Self::new(&name, global_channel, records)
    }

    /// Walk the length-prefixed records following the header.
    fn parse_records(data: Data) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(RECORD_COUNT);
        let mut offset = HEADER_SIZE;

        while offset < data.len() {
            let index = records.len();
            let section = Section::of_index(index).ok_or(Error::RecordCount {
                found: index + 1,
            })?;

            let length = usize::from(data.byte(offset)?);
            offset += 1;
            let body = data.slice(offset, length)?;
            let record = Record::decode(section, body).map_err(|e| {
                log::debug!("PATCH: record {} failed to decode:\n{}", index + 1, body.dump());
                e
            })?;
            log::trace!("PATCH: record {} at offset {}: {}", index + 1, offset, record);
            records.push(record);
            offset += length;
        }

        if records.len() != RECORD_COUNT {
            return Err(Error::RecordCount {
                found: records.len(),
            });
        }
        Ok(records)
    }

    /// Patch name without its padding.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Channel byte of the dump header.
    pub fn global_channel(&self) -> u8 {
        self.global_channel
    }

    /// All 36 records in dump order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records of one section.
    pub fn section(&self, section: Section) -> &[Record] {
        &self.records[section.range()]
    }

    /// Bytes of record data, length prefixes included.
    pub fn data_size(&self) -> usize {
        self.records.iter().map(|r| r.length() + 1).sum()
    }

    /// Unframed payload: padded name, big-endian size, records.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        let mut records = Vec::new();
        for record in &self.records {
            records.extend(record.pack()?);
        }
        let size = i16::try_from(records.len()).map_err(|_| Error::FieldTooLong {
            field: "patch",
            len: records.len(),
        })?;

        let mut payload = Vec::with_capacity(HEADER_SIZE + records.len());
        payload.extend_from_slice(format!("{:<width$}", self.name, width = NAME_SIZE).as_bytes());
        payload.extend_from_slice(&size.to_be_bytes());
        payload.extend(records);
        Ok(payload)
    }

    /// Framed current-buffer dump, ready to send to the device.
    pub fn to_sysex(&self) -> Result<Vec<u8>> {
        sysex::pack(&self.to_payload()?, self.global_channel)
    }
}
