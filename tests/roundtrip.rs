use pc1600::{json_to_sysex, sysex_to_json, Error, Patch, PatchDocument, Record, Section};

mod common;
use common::{disabled_payload, frame, full_patch};

#[test]
fn all_disabled_dump() {
    let msg = frame(&disabled_payload("Empty"), 0);
    let patch = Patch::from_sysex(&msg).unwrap();

    assert_eq!(patch.name(), "Empty");
    assert_eq!(patch.global_channel(), 0);
    assert_eq!(patch.records().len(), 36);
    for record in patch.records() {
        assert_eq!(record, &Record::Disabled(Default::default()));
        assert_eq!(record.name(), "");
    }

    let doc = patch.to_document();
    for section in Section::ALL {
        assert_eq!(doc.section(section).len(), section.size());
    }
    assert_eq!(patch.to_sysex().unwrap(), msg);
}

#[test]
fn every_record_type_is_byte_exact() {
    let patch = full_patch();
    let msg = patch.to_sysex().unwrap();

    let decoded = Patch::from_sysex(&msg).unwrap();
    assert_eq!(decoded, patch);
    assert_eq!(decoded.to_sysex().unwrap(), msg);
}

#[test]
fn document_roundtrip() {
    let patch = full_patch();
    let json = patch.to_json().unwrap();

    let doc = PatchDocument::from_json(&json).unwrap();
    assert_eq!(doc, patch.to_document());
    assert_eq!(doc.name, "Live Set");
    assert_eq!(doc.global_channel, 2);

    let encoded = json_to_sysex(&json).unwrap();
    assert_eq!(encoded, patch.to_sysex().unwrap());
    assert_eq!(sysex_to_json(&encoded).unwrap(), json);
}

#[test]
fn document_field_names() {
    let value: serde_json::Value =
        serde_json::from_str(&full_patch().to_json().unwrap()).unwrap();

    assert_eq!(value["file_version"], "1.0.0");
    assert_eq!(value["faders"][2]["type"], "String");
    assert_eq!(value["faders"][2]["param_format"], "2Byte, Nibs,lo->hi");
    assert_eq!(value["faders"][2]["sysex"], "f04110fdf7");
    assert_eq!(value["buttons"][5]["press"], "b0407f");
    assert_eq!(value["data_wheel"][0]["mapped_to"], "CV 2");
    assert_eq!(
        value["setup"][0]["channels"],
        serde_json::json!({
            "1": {"bank": "2m", "program": "Off", "volume": 64},
            "16": {"bank": 5, "program": 0, "volume": 127}
        })
    );
    assert_eq!(value["setup"][0]["scene"], 0);
}

#[test]
fn cc_record_with_name() {
    let mut payload = disabled_payload("CC");
    // first record: length prefix, then header byte and body
    let cc = [0x31, 0, 127, 1, 7, 0, b'V', b'o', b'l'];
    payload.splice(18..20, [cc.len() as u8].into_iter().chain(cc));
    let size = (payload.len() - 18) as i16;
    payload[16..18].copy_from_slice(&size.to_be_bytes());

    let json = sysex_to_json(&frame(&payload, 0)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["faders"][0],
        serde_json::json!({
            "type": "CC", "min": 0, "max": 127, "channel": 1, "cc": 7, "mode": 0, "name": "Vol"
        })
    );
}

#[test]
fn all_presets_bundle_rejected() {
    let mut msg = frame(&disabled_payload("Bundle"), 0);
    msg[6] = 0x01;
    assert!(matches!(
        Patch::from_sysex(&msg),
        Err(Error::UnsupportedBundle)
    ));
}

#[test]
fn bad_framing_rejected() {
    let good = frame(&disabled_payload("Frame"), 0);

    let mut wrong_maker = good.clone();
    wrong_maker[3] = 0x1c;
    let mut wrong_command = good.clone();
    wrong_command[6] = 0x02;
    let mut no_footer = good.clone();
    no_footer.pop();

    for msg in [wrong_maker, wrong_command, no_footer] {
        assert!(matches!(Patch::from_sysex(&msg), Err(Error::BadFraming(_))));
    }
}

#[test]
fn unknown_variant_reports_section() {
    let mut payload = disabled_payload("Tags");
    // Solo is a button type, not a fader type
    payload[19] = 0x0a;
    assert!(matches!(
        Patch::from_payload(&payload, 0),
        Err(Error::UnknownVariant {
            section: Section::Faders,
            tag: 10
        })
    ));
}

#[test]
fn edited_document_reencodes() {
    let json = full_patch()
        .to_json()
        .unwrap()
        .replace("\"name\": \"Vol\"", "\"name\": \"Volume\"");
    let patch = Patch::from_json(&json).unwrap();
    assert_eq!(patch.records()[0].name(), "Volume");

    let decoded = Patch::from_sysex(&patch.to_sysex().unwrap()).unwrap();
    assert_eq!(decoded, patch);
}

#[test]
fn overlong_record_name_rejected() {
    let json = full_patch()
        .to_json()
        .unwrap()
        .replace("\"name\": \"Vol\"", "\"name\": \"Sixteen chars!!!\"");
    let patch = Patch::from_json(&json).unwrap();
    assert!(matches!(
        patch.to_sysex(),
        Err(Error::NameTooLong { max: 15, .. })
    ));
}

#[test]
fn dump_request_message() {
    assert_eq!(
        pc1600::sysex::dump_request(0).unwrap(),
        vec![0xf0, 0x00, 0x00, 0x1b, 0x0b, 0x00, 0x14, 0xf7]
    );
}

#[test]
fn empty_setup_sysex_survives_document_roundtrip() {
    let json = full_patch()
        .to_json()
        .unwrap()
        .replace("\"sysex\": \"f000f7\"", "\"sysex\": \"\"");
    assert!(json.contains("\"sysex\": \"\""));
    let doc = PatchDocument::from_json(&json).unwrap();

    let patch = Patch::try_from(doc.clone()).unwrap();
    let decoded = Patch::from_sysex(&patch.to_sysex().unwrap()).unwrap();
    assert_eq!(decoded.to_document(), doc);
}
