//! Errors raised while converting patches.

use thiserror::Error;

use crate::patch::Section;

/// Everything that can abort a patch conversion.
///
/// None of these are recoverable: a patch that fails to decode or encode is
/// never partially written back to the device.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrong header, command byte or footer.
    #[error("invalid sysex framing: {0}")]
    BadFraming(String),
    /// An "all presets" dump instead of a current buffer dump.
    #[error("'all presets' sysex bundles are not supported, only current buffer dumps")]
    UnsupportedBundle,
    /// A size field disagrees with the bytes actually present.
    #[error("declared size {declared} does not match {actual} bytes of record data")]
    SizeMismatch {
        /// Size stated by the data.
        declared: i32,
        /// Bytes found.
        actual: usize,
    },
    /// The payload does not hold exactly 36 records.
    #[error("expected 36 records, found {found}")]
    RecordCount {
        /// Records seen before stopping.
        found: usize,
    },
    /// A read past the end of the buffer.
    #[error("read of {length} bytes at offset {offset} overruns {available} available bytes")]
    Truncated {
        /// Absolute start of the read.
        offset: usize,
        /// Bytes requested.
        length: usize,
        /// Bytes left from `offset`.
        available: usize,
    },
    /// A name byte outside printable ASCII.
    #[error(
        "invalid character 0x{byte:02x} at offset {offset}; \
         the record was misparsed or the file is corrupt"
    )]
    MalformedText {
        /// Offending byte.
        byte: u8,
        /// Absolute offset of the byte.
        offset: usize,
    },
    /// A type tag with no record type in its section.
    #[error("unknown {section} record type {tag}")]
    UnknownVariant {
        /// Section being decoded.
        section: Section,
        /// Low nibble of the header byte.
        tag: u8,
    },
    /// A record type placed in a section that does not accept it.
    #[error("record type {variant} is not allowed in the {section} section")]
    MisplacedVariant {
        /// Section the record was found in.
        section: Section,
        /// Document name of the record type.
        variant: &'static str,
    },
    /// An enumerated byte with no known meaning.
    #[error("unknown {field} value 0x{value:02x}")]
    UnknownValue {
        /// Field being decoded.
        field: &'static str,
        /// Raw byte.
        value: u8,
    },
    /// A document value that cannot be encoded.
    #[error("invalid {field}: {value}")]
    InvalidValue {
        /// Field being encoded.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A patch or record name over its length limit.
    #[error("name '{name}' is longer than {max} characters")]
    NameTooLong {
        /// The rejected name.
        name: String,
        /// Longest name allowed.
        max: usize,
    },
    /// A blob or record too long for its length byte.
    #[error("{field} is {len} bytes long, too long for its length field")]
    FieldTooLong {
        /// What overflowed.
        field: &'static str,
        /// Its length in bytes.
        len: usize,
    },
    /// A document section with the wrong number of items.
    #[error("the {section} section needs {expected} items, found {found}")]
    SectionSize {
        /// Section being checked.
        section: Section,
        /// Items the section holds on the device.
        expected: usize,
        /// Items in the document.
        found: usize,
    },
    /// A channel byte with bit 7 set.
    #[error("channel byte 0x{0:02x} is not a valid MIDI data byte")]
    InvalidChannel(u8),
    /// A document whose `file_version` is not supported.
    #[error("unsupported file version: {0}")]
    UnsupportedFileVersion(String),
    /// JSON syntax errors and missing or mistyped document fields.
    #[error("invalid patch document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, Error>;
