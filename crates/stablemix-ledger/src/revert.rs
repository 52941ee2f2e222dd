//! `Error(string)` revert-data codec.
//!
//! Layout: 4-byte selector, 32-byte offset word, 32-byte length word, then
//! the UTF-8 message right-padded to a multiple of 32 bytes.

use stablemix_types::constants::ERROR_STRING_SELECTOR;

const WORD: usize = 32;
/// Selector plus offset and length words.
const HEADER: usize = 4 + 2 * WORD;

/// Encode `message` as `Error(string)` revert data.
#[must_use]
pub fn encode_error_string(message: &str) -> Vec<u8> {
    let bytes = message.as_bytes();
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(HEADER + padded);
    out.extend_from_slice(&ERROR_STRING_SELECTOR);
    out.extend_from_slice(&word(WORD as u64));
    out.extend_from_slice(&word(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(HEADER + padded, 0);
    out
}

/// Decode `Error(string)` revert data. `None` if the data is shorter than
/// the header, carries another selector, or is internally inconsistent.
#[must_use]
pub fn decode_error_string(data: &[u8]) -> Option<String> {
    if data.len() < HEADER || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    let body = &data[4..];
    let offset = read_word(&body[..WORD])?;
    let len_word = body.get(offset..offset.checked_add(WORD)?)?;
    let len = read_word(len_word)?;
    let start = offset + WORD;
    let message = body.get(start..start.checked_add(len)?)?;
    String::from_utf8(message.to_vec()).ok()
}

fn word(value: u64) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    out[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Read a big-endian word that must fit in a `usize`.
fn read_word(bytes: &[u8]) -> Option<usize> {
    let (high, low) = bytes.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let low: [u8; 8] = low.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(low)).ok()
}
