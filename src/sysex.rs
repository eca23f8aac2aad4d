//! PC1600 SYSEX framing.
//!
//! Every payload byte travels as two nibbles so the whole message stays in the
//! 7-bit MIDI data range:
//!
//! ```text
//! F0 00 00 1B 0B <channel> <command> [hi lo]... F7
//! ```

use hex_literal::hex;

use crate::data::{byte_to_nibbles, nibbles_to_byte};
use crate::error::{Error, Result};

/// PC1600 SYSEX constants
const SYSEX_START: u8 = 0xF0;
const SYSEX_END: u8 = 0xF7;
/// Start byte, manufacturer id (00 00 1B) and model id (0B).
const FINGERPRINT: [u8; 5] = hex!("F0 00 00 1B 0B");
const ALL_PRESETS: u8 = 0x01; // All presets bundle
const CURRENT_BUFFER: u8 = 0x04; // Current buffer dump
const DUMP_REQUEST: u8 = 0x14; // Request current buffer dump

/// Fingerprint + channel + command byte.
pub const HEADER_SIZE: usize = 7;

/// Frame a recombined payload as a current-buffer dump for `channel`.
pub fn pack(payload: &[u8], channel: u8) -> Result<Vec<u8>> {
    if channel & 0x80 != 0 {
        return Err(Error::InvalidChannel(channel));
    }

    let mut output = Vec::with_capacity(HEADER_SIZE + payload.len() * 2 + 1);
    output.extend_from_slice(&FINGERPRINT);
    output.push(channel);
    output.push(CURRENT_BUFFER);
    for &b in payload {
        let (hi, lo) = byte_to_nibbles(b);
        output.push(hi);
        output.push(lo);
    }
    output.push(SYSEX_END);

    log::debug!(
        "SYSEX: Packed {} payload bytes into {} bytes on channel {}",
        payload.len(),
        output.len(),
        channel
    );
    Ok(output)
}

/// Strip the framing of a current-buffer dump and recombine its nibbles.
pub fn unpack(msg: &[u8]) -> Result<Vec<u8>> {
    if msg.len() < HEADER_SIZE + 1 {
        return Err(Error::BadFraming(format!(
            "message too short: {} bytes",
            msg.len()
        )));
    }

    if msg[0] != SYSEX_START {
        return Err(Error::BadFraming("missing SYSEX start byte".to_string()));
    }

    if msg[..FINGERPRINT.len()] != FINGERPRINT {
        return Err(Error::BadFraming(format!(
            "invalid fingerprint {:02X?}",
            &msg[..FINGERPRINT.len()]
        )));
    }

    // msg[5] is the midi channel
    match msg[6] {
        CURRENT_BUFFER => {}
        ALL_PRESETS => return Err(Error::UnsupportedBundle),
        command => {
            return Err(Error::BadFraming(format!(
                "only buffer dumps are supported, got command 0x{:02X}",
                command
            )))
        }
    }

    if msg[msg.len() - 1] != SYSEX_END {
        return Err(Error::BadFraming("missing SYSEX end byte".to_string()));
    }

    let nibbles = &msg[HEADER_SIZE..msg.len() - 1];
    if nibbles.len() % 2 != 0 {
        return Err(Error::BadFraming(format!(
            "odd number of payload nibbles: {}",
            nibbles.len()
        )));
    }

    let payload = nibbles
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| {
            if pair[0] > 0x0F || pair[1] > 0x0F {
                return Err(Error::BadFraming(format!(
                    "byte at offset {} is not a nibble",
                    HEADER_SIZE + i * 2
                )));
            }
            Ok(nibbles_to_byte(pair[0], pair[1]))
        })
        .collect::<Result<Vec<u8>>>()?;

    log::debug!(
        "SYSEX: Unpacked {} payload bytes from channel {}",
        payload.len(),
        msg[5]
    );
    Ok(payload)
}

/// Channel byte of a framed message.
pub fn channel(msg: &[u8]) -> Result<u8> {
    msg.get(5)
        .copied()
        .ok_or_else(|| Error::BadFraming("message too short".to_string()))
}

/// Message asking the device on `channel` to send its current buffer.
pub fn dump_request(channel: u8) -> Result<Vec<u8>> {
    if channel & 0x80 != 0 {
        return Err(Error::InvalidChannel(channel));
    }
    let mut output = Vec::with_capacity(HEADER_SIZE + 1);
    output.extend_from_slice(&FINGERPRINT);
    output.push(channel);
    output.push(DUMP_REQUEST);
    output.push(SYSEX_END);
    Ok(output)
}
