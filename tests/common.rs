#![allow(dead_code)]

use pc1600::data::Blob;
use pc1600::record::{
    Bank, ButtonString, Cc, ChannelSetup, DataWheel, Level, Master, Named, NoteOnOff,
    ParamFormat, ParamString, ProgramChange, SendScene, Setup, StringPressRelease, StringToggle,
    WheelTarget,
};
use pc1600::{Patch, Record};

/// A patch using every record type at least once.
pub fn full_patch() -> Patch {
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
        aux: 1,
        name: "Main".to_string(),
    });
    records[2] = Record::String(ParamString {
        param_format: ParamFormat::TwoByteNibbleLoHi,
        min: -64,
        max: 1000,
        sysex: Blob(vec![0xf0, 0x41, 0x10, 0xfd, 0xf7]),
        name: "Cutoff".to_string(),
    });
    records[3] = Record::Disabled(Named::new("spare"));
    records[16] = Record::Cc(Cc {
        min: 10,
        max: 20,
        channel: 0xfe,
        cc: 1,
        mode: 2,
        name: "Pedal".to_string(),
    });

    records[18] = Record::Mute(Named::new("M1"));
    records[19] = Record::Solo(Named::default());
    records[20] = Record::ProgramChange(ProgramChange {
        channel: 3,
        program: 42,
        name: "Piano".to_string(),
    });
    records[21] = Record::NoteOnOff(NoteOnOff {
        channel: 10,
        note: 36,
        velocity: 100,
        name: "Kick".to_string(),
    });
    records[22] = Record::ButtonString(ButtonString {
        sysex: Blob(vec![0xf0, 0x7e, 0x7f, 0x09, 0x01, 0xf7]),
        name: "GM On".to_string(),
    });
    records[23] = Record::StringPressRelease(StringPressRelease {
        press: Blob(vec![0xb0, 0x40, 0x7f]),
        release: Blob(vec![0xb0, 0x40, 0x00]),
        name: String::new(),
    });
    records[24] = Record::StringToggle(StringToggle {
        sysex1: Blob(vec![0xfa]),
        sysex2: Blob(vec![0xfc]),
        name: "Transport".to_string(),
    });
    records[25] = Record::SendFader(Named::new("Snap"));
    records[26] = Record::SendScene(SendScene {
        value: 4,
        name: "Scene 4".to_string(),
    });

    records[34] = Record::DataWheel(DataWheel {
        mapped_to: WheelTarget::Cv(2),
        name: "Wheel".to_string(),
    });
    records[35] = Record::Setup(Setup {
        channels: [
            (
                1,
                ChannelSetup {
                    bank: Bank::Folded(2),
                    program: Level::Off,
                    volume: Level::Value(64),
                },
            ),
            (
                16,
                ChannelSetup {
                    bank: Bank::Value(5),
                    program: Level::Value(0),
                    volume: Level::Value(127),
                },
            ),
        ]
        .into_iter()
        .collect(),
        scene: Some(0),
        sysex: Some(Blob(vec![0xf0, 0x00, 0xf7])),
        name: "Init".to_string(),
    });

    match Patch::new("Live Set", 2, records) {
        Ok(patch) => patch,
        Err(e) => panic!("fixture patch is invalid: {}", e),
    }
}

/// Payload of a patch whose records are all Disabled with empty names.
pub fn disabled_payload(name: &str) -> Vec<u8> {
    let mut payload = format!("{:<16}", name).into_bytes();
    payload.extend_from_slice(&72i16.to_be_bytes());
    for _ in 0..36 {
        payload.extend_from_slice(&[0x01, 0x00]);
    }
    payload
}

/// Frame a payload as a current buffer dump by hand.
pub fn frame(payload: &[u8], channel: u8) -> Vec<u8> {
    let mut msg = vec![0xf0, 0x00, 0x00, 0x1b, 0x0b, channel, 0x04];
    for byte in payload {
        msg.push(byte >> 4);
        msg.push(byte & 0x0f);
    }
    msg.push(0xf7);
    msg
}
