//! Codec for Peavey PC1600 MIDI controller patch dumps.
//!
//! A current-buffer SysEx dump is decoded into a [`Patch`]: the patch name,
//! the channel it was dumped on, and 36 control [`Record`]s split over the
//! fader, CV, button, data wheel and setup sections. A patch converts to and
//! from a [`PatchDocument`], an editable JSON form, without losing a byte.
//!
//! ```no_run
//! let dump = std::fs::read("live.syx").unwrap();
//! let json = pc1600::sysex_to_json(&dump).unwrap();
//! assert_eq!(pc1600::json_to_sysex(&json).unwrap(), dump);
//! ```

#![warn(missing_docs)]

pub mod data;
pub mod document;
pub mod error;
pub mod patch;
pub mod record;
pub mod sysex;

pub use document::{PatchDocument, FILE_VERSION};
pub use error::{Error, Result};
pub use patch::{Patch, Section};
pub use record::Record;

/// Decode a current-buffer dump into a pretty printed JSON document.
pub fn sysex_to_json(msg: &[u8]) -> Result<String> {
    Patch::from_sysex(msg)?.to_json()
}

/// Encode a JSON document into a current-buffer dump.
pub fn json_to_sysex(json: &str) -> Result<Vec<u8>> {
    Patch::from_json(json)?.to_sysex()
}
