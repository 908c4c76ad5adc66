/*
 * base64.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Plico, a MIME message library.
 *
 * Plico is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Plico is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Plico.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Base64 content-transfer-encoding primitives (RFC 2045 section 6.8).
//! Buffer-cursor functions; the streaming Codec wrappers live in the
//! parent module.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const WHITESPACE: i8 = -2;

const DECODE_TABLE: [i8; 256] = {
    let mut t = [-1i8; 256];
    t[b' ' as usize] = WHITESPACE;
    t[b'\t' as usize] = WHITESPACE;
    t[b'\r' as usize] = WHITESPACE;
    t[b'\n' as usize] = WHITESPACE;
    let mut i = 0u8;
    while i < 26 {
        t[(b'A' + i) as usize] = i as i8;
        t[(b'a' + i) as usize] = (26 + i) as i8;
        i += 1;
    }
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = (52 + i) as i8;
        i += 1;
    }
    t[b'+' as usize] = 62;
    t[b'/' as usize] = 63;
    t
};

/// Decode base64 from src into dst. Consumes only complete 4-char quanta
/// unless end_of_stream, leaving a partial quantum for the next call.
/// Unrecognized characters are skipped (tolerant decode). Returns the
/// number of bytes consumed from src.
pub fn decode_into(src: &[u8], dst: &mut Vec<u8>, end_of_stream: bool) -> usize {
    let mut pos = 0usize;
    let mut quantum: u32 = 0;
    let mut quantum_bits: u32 = 0;
    let mut last_valid = 0usize;
    let mut saw_padding = false;

    while pos < src.len() {
        let b = src[pos];
        pos += 1;
        if b == b'=' {
            saw_padding = true;
            break;
        }
        let val = DECODE_TABLE[b as usize];
        if val < 0 {
            continue;
        }
        quantum = (quantum << 6) | (val as u32);
        quantum_bits += 6;
        if quantum_bits == 24 {
            dst.push((quantum >> 16) as u8);
            dst.push((quantum >> 8) as u8);
            dst.push(quantum as u8);
            quantum = 0;
            quantum_bits = 0;
            last_valid = pos;
        }
    }

    if (saw_padding || end_of_stream) && quantum_bits >= 8 {
        dst.push((quantum >> (quantum_bits - 8)) as u8);
        if quantum_bits >= 16 {
            dst.push((quantum >> (quantum_bits - 16)) as u8);
        }
        last_valid = pos;
    } else if end_of_stream || saw_padding {
        last_valid = pos;
    }

    last_valid
}

/// Encode complete 3-byte groups from src into dst, wrapping output lines
/// with CRLF at max_line (0 disables wrapping). col tracks the current
/// output column across calls. Returns the number of bytes consumed; the
/// 0-2 byte tail is left for encode_final.
pub fn encode_into(src: &[u8], dst: &mut Vec<u8>, col: &mut usize, max_line: usize) -> usize {
    let complete = src.len() - src.len() % 3;
    for group in src[..complete].chunks(3) {
        let n = (group[0] as u32) << 16 | (group[1] as u32) << 8 | group[2] as u32;
        wrap(dst, col, max_line);
        dst.push(ALPHABET[(n >> 18) as usize]);
        dst.push(ALPHABET[(n >> 12 & 63) as usize]);
        dst.push(ALPHABET[(n >> 6 & 63) as usize]);
        dst.push(ALPHABET[(n & 63) as usize]);
        *col += 4;
    }
    complete
}

/// Encode the final partial group (0-2 bytes) with padding.
pub fn encode_final(tail: &[u8], dst: &mut Vec<u8>, col: &mut usize, max_line: usize) {
    if tail.is_empty() {
        return;
    }
    let n = (tail[0] as u32) << 16 | (tail.get(1).copied().unwrap_or(0) as u32) << 8;
    wrap(dst, col, max_line);
    dst.push(ALPHABET[(n >> 18) as usize]);
    dst.push(ALPHABET[(n >> 12 & 63) as usize]);
    dst.push(if tail.len() > 1 {
        ALPHABET[(n >> 6 & 63) as usize]
    } else {
        b'='
    });
    dst.push(b'=');
    *col += 4;
}

fn wrap(dst: &mut Vec<u8>, col: &mut usize, max_line: usize) {
    if max_line > 0 && *col + 4 > max_line && *col > 0 {
        dst.extend_from_slice(b"\r\n");
        *col = 0;
    }
}
