//! Editable JSON form of a patch.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::patch::{Patch, Section};
use crate::record::Record;

/// Only document version this crate reads and writes.
pub const FILE_VERSION: &str = "1.0.0";

/// A patch as structured data, one list of records per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDocument {
    /// Patch name, up to 16 characters.
    pub name: String,
    /// Channel byte of the dump.
    pub global_channel: u8,
    /// Must be [`FILE_VERSION`].
    pub file_version: String,
    /// 16 fader records.
    pub faders: Vec<Record>,
    /// 2 CV input records.
    pub cvs: Vec<Record>,
    /// 16 button records.
    pub buttons: Vec<Record>,
    /// The data wheel record.
    pub data_wheel: Vec<Record>,
    /// The setup record.
    pub setup: Vec<Record>,
}

impl PatchDocument {
    /// Records of one section.
    pub fn section(&self, section: Section) -> &[Record] {
        match section {
            Section::Faders => &self.faders,
            Section::Cvs => &self.cvs,
            Section::Buttons => &self.buttons,
            Section::DataWheel => &self.data_wheel,
            Section::Setup => &self.setup,
        }
    }

    /// Parse a document, rejecting unsupported versions before anything else.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value.get("file_version").and_then(|v| v.as_str()) {
            Some(FILE_VERSION) => {}
            Some(other) => return Err(Error::UnsupportedFileVersion(other.to_string())),
            None => {
                return Err(Error::UnsupportedFileVersion(
                    value
                        .get("file_version")
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "missing".to_string()),
                ))
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Pretty printed with four space indentation.
    pub fn to_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|e| Error::Json(serde::ser::Error::custom(e)))
    }
}

impl From<&Patch> for PatchDocument {
    fn from(patch: &Patch) -> Self {
        let section = |s: Section| patch.section(s).to_vec();
        Self {
            name: patch.name().to_string(),
            global_channel: patch.global_channel(),
            file_version: FILE_VERSION.to_string(),
            faders: section(Section::Faders),
            cvs: section(Section::Cvs),
            buttons: section(Section::Buttons),
            data_wheel: section(Section::DataWheel),
            setup: section(Section::Setup),
        }
    }
}

impl TryFrom<PatchDocument> for Patch {
    type Error = Error;

    fn try_from(doc: PatchDocument) -> Result<Self> {
        if doc.file_version != FILE_VERSION {
            return Err(Error::UnsupportedFileVersion(doc.file_version));
        }

        let mut records = Vec::with_capacity(crate::patch::RECORD_COUNT);
        for section in Section::ALL {
            let items = doc.section(section);
            if items.len() != section.size() {
                return Err(Error::SectionSize {
                    section,
                    expected: section.size(),
                    found: items.len(),
                });
            }
            records.extend_from_slice(items);
        }

        Patch::new(&doc.name, doc.global_channel, records)
    }
}

impl Patch {
    /// Editable form of the patch.
    pub fn to_document(&self) -> PatchDocument {
        PatchDocument::from(self)
    }

    /// Pretty printed JSON document.
    pub fn to_json(&self) -> Result<String> {
        self.to_document().to_json()
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Patch::try_from(PatchDocument::from_json(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Blob;
    use crate::record::{Cc, DataWheel, Master, Named, Setup, WheelTarget};

    fn patch() -> Patch {
        let mut records = vec![Record::Disabled(Named::default()); 36];
        records[0] = Record::Cc(Cc {
            min: 0,
            max: 127,
            channel: 1,
            cc: 7,
            mode: 0,
            name: "Vol".to_string(),
        });
        records[1] = Record::Master(Master {
            faders: [1, 2, 9].into_iter().collect(),
            aux: 0,
            name: String::new(),
        });
        records[34] = Record::DataWheel(DataWheel {
            mapped_to: WheelTarget::LastFader,
            name: String::new(),
        });
        records[35] = Record::Setup(Setup {
            sysex: Some(Blob(vec![0xf0, 0xf7])),
            ..Setup::default()
        });
        Patch::new("Doc", 0, records).unwrap()
    }

    #[test]
    fn test_document_shape() {
        let doc = patch().to_document();
        assert_eq!(doc.faders.len(), 16);
        assert_eq!(doc.cvs.len(), 2);
        assert_eq!(doc.buttons.len(), 16);
        assert_eq!(doc.data_wheel.len(), 1);
        assert_eq!(doc.setup.len(), 1);
        assert_eq!(doc.file_version, FILE_VERSION);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value["faders"][0],
            serde_json::json!({
                "type": "CC", "min": 0, "max": 127, "channel": 1, "cc": 7, "mode": 0, "name": "Vol"
            })
        );
        assert_eq!(
            value["faders"][1],
            serde_json::json!({"type": "Master", "faders": [1, 2, 9], "aux": 0})
        );
        assert_eq!(value["faders"][2], serde_json::json!({"type": "Disabled"}));
        assert_eq!(
            value["data_wheel"][0],
            serde_json::json!({"type": "DataWheel", "mapped_to": "Last fader"})
        );
        assert_eq!(
            value["setup"][0],
            serde_json::json!({"type": "Setup", "sysex": "f0f7"})
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let patch = patch();
        let json = patch.to_json().unwrap();
        assert!(json.contains("\n    \"name\": \"Doc\""));
        let decoded = Patch::from_json(&json).unwrap();
        assert_eq!(decoded, patch);
        assert_eq!(decoded.to_sysex().unwrap(), patch.to_sysex().unwrap());
    }

    #[test]
    fn test_unsupported_version() {
        let json = patch().to_json().unwrap().replace("1.0.0", "2.0.0");
        match Patch::from_json(&json) {
            Err(Error::UnsupportedFileVersion(v)) => assert_eq!(v, "2.0.0"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            PatchDocument::from_json(r#"{"name": "x"}"#),
            Err(Error::UnsupportedFileVersion(_))
        ));

        let mut doc = patch().to_document();
        doc.file_version = "0.9".to_string();
        assert!(matches!(
            Patch::try_from(doc),
            Err(Error::UnsupportedFileVersion(_))
        ));
    }

    #[test]
    fn test_section_size() {
        let mut doc = patch().to_document();
        doc.cvs.pop();
        assert!(matches!(
            Patch::try_from(doc),
            Err(Error::SectionSize {
                section: Section::Cvs,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_wrong_section_variant() {
        let mut doc = patch().to_document();
        doc.faders[3] = Record::Mute(Named::default());
        assert!(matches!(
            Patch::try_from(doc),
            Err(Error::MisplacedVariant {
                section: Section::Faders,
                variant: "Mute"
            })
        ));
    }

    #[test]
    fn test_missing_field_is_descriptive() {
        let json = patch()
            .to_json()
            .unwrap()
            .replace("\"cc\": 7,", "");
        match Patch::from_json(&json) {
            Err(Error::Json(e)) => assert!(e.to_string().contains("missing field `cc`"), "{}", e),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_legacy_master_key() {
        let record: Record =
            serde_json::from_str(r#"{"type": "Master", "faders": [16], "wut": 3}"#).unwrap();
        match record {
            Record::Master(m) => assert_eq!(m.aux, 3),
            other => panic!("unexpected {:?}", other),
        }
    }
}
