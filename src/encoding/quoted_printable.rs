/*
 * quoted_printable.rs
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

//! Quoted-printable content-transfer-encoding primitives (RFC 2045
//! section 6.7). Buffer-cursor functions; the streaming Codec wrappers
//! live in the parent module.

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

const HEX_DECODE: [i8; 256] = {
    let mut t = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        t[(b'0' + i) as usize] = i as i8;
        i += 1;
    }
    let mut i = 0u8;
    while i < 6 {
        t[(b'A' + i) as usize] = (10 + i) as i8;
        t[(b'a' + i) as usize] = (10 + i) as i8;
        i += 1;
    }
    t
};

/// Decode quoted-printable from src into dst. Handles =XX escapes and soft
/// line breaks (=CRLF, =LF); malformed escapes pass through literally. An
/// incomplete escape at the end is left unconsumed unless end_of_stream.
/// Returns the number of bytes consumed from src.
pub fn decode_into(src: &[u8], dst: &mut Vec<u8>, end_of_stream: bool) -> usize {
    let mut pos = 0usize;
    while pos < src.len() {
        let b = src[pos];
        if b != b'=' {
            dst.push(b);
            pos += 1;
            continue;
        }
        let remaining = src.len() - pos;
        if remaining >= 3 {
            let h1 = src[pos + 1];
            let h2 = src[pos + 2];
            let v1 = HEX_DECODE[h1 as usize];
            let v2 = HEX_DECODE[h2 as usize];
            if v1 >= 0 && v2 >= 0 {
                dst.push(((v1 << 4) | v2) as u8);
                pos += 3;
            } else if h1 == b'\r' && h2 == b'\n' {
                pos += 3; // soft break
            } else if h1 == b'\n' {
                pos += 2; // soft break, bare LF
            } else {
                dst.push(b);
                pos += 1;
            }
        } else if remaining == 2 && src[pos + 1] == b'\n' {
            pos += 2;
        } else if !end_of_stream {
            break;
        } else {
            dst.push(b);
            pos += 1;
        }
    }
    pos
}

/// Encode src into dst. Hard CRLF pairs pass through; all other bytes
/// outside the printable range are =XX escaped, as are trailing space and
/// tab and the escape character itself. Soft breaks keep lines within
/// max_line (0 disables wrapping). col tracks the output column across
/// calls. When not end_of_stream the last byte may be left unconsumed
/// (lookahead for trailing whitespace). Returns bytes consumed.
pub fn encode_into(
    src: &[u8],
    dst: &mut Vec<u8>,
    col: &mut usize,
    max_line: usize,
    end_of_stream: bool,
) -> usize {
    let mut pos = 0usize;
    while pos < src.len() {
        let b = src[pos];
        let next = src.get(pos + 1).copied();

        if b == b'\r' && next == Some(b'\n') {
            dst.extend_from_slice(b"\r\n");
            *col = 0;
            pos += 2;
            continue;
        }
        if (b == b'\r' || b == b' ' || b == b'\t') && next.is_none() && !end_of_stream {
            break; // need lookahead
        }

        let escape = match b {
            b' ' | b'\t' => {
                // Literal unless at end of line or end of data.
                next.is_none() || next == Some(b'\r') || next == Some(b'\n')
            }
            b'=' => true,
            33..=126 => false,
            _ => true,
        };

        let width = if escape { 3 } else { 1 };
        if max_line > 0 && *col + width > max_line - 1 && *col > 0 {
            dst.extend_from_slice(b"=\r\n");
            *col = 0;
        }
        if escape {
            dst.push(b'=');
            dst.push(HEX_DIGITS[(b >> 4) as usize]);
            dst.push(HEX_DIGITS[(b & 0x0f) as usize]);
            *col += 3;
        } else {
            dst.push(b);
            *col += 1;
        }
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(src: &[u8], max_line: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut col = 0;
        encode_into(src, &mut out, &mut col, max_line, true);
        out
    }

    fn decode_all(src: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        decode_into(src, &mut out, true);
        out
    }

    #[test]
    fn encode_escapes_non_printable() {
        assert_eq!(encode_all(b"a=b", 76), b"a=3Db");
        assert_eq!(encode_all(b"caf\xe9", 76), b"caf=E9");
    }

    #[test]
    fn encode_trailing_whitespace_escaped() {
        assert_eq!(encode_all(b"end ", 76), b"end=20");
        assert_eq!(encode_all(b"end\t", 76), b"end=09");
        assert_eq!(encode_all(b"a b", 76), b"a b");
    }

    #[test]
    fn encode_preserves_hard_breaks() {
        assert_eq!(encode_all(b"one\r\ntwo", 76), b"one\r\ntwo");
    }

    #[test]
    fn roundtrip_short_inputs() {
        for input in [&b""[..], b"a", b"ab", b"abc", b"\x00", b"\xff=", b" \t"] {
            assert_eq!(decode_all(&encode_all(input, 76)), input);
        }
    }

    #[test]
    fn decode_soft_breaks() {
        assert_eq!(decode_all(b"one=\r\ntwo"), b"onetwo");
        assert_eq!(decode_all(b"one=\ntwo"), b"onetwo");
    }

    #[test]
    fn decode_malformed_escape_passes_through() {
        assert_eq!(decode_all(b"=XYZ"), b"=XYZ");
        assert_eq!(decode_all(b"a="), b"a=");
    }

    #[test]
    fn decode_incomplete_escape_left_for_next_call() {
        let mut out = Vec::new();
        let consumed = decode_into(b"ab=4", &mut out, false);
        assert_eq!(consumed, 2);
        assert_eq!(out, b"ab");
    }

    #[test]
    fn encode_wraps_with_soft_breaks() {
        let encoded = encode_all(&[b'x'; 200], 76);
        let text = String::from_utf8(encoded).unwrap();
        for line in text.split("\r\n") {
            assert!(line.len() <= 76);
        }
        let decoded = decode_all(text.as_bytes());
        assert_eq!(decoded, vec![b'x'; 200]);
    }
}
