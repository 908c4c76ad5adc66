/*
 * text.rs
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

//! Charset-tagged header text: Word / EncodedText, RFC 2047 encoded-word
//! parsing, and generation with line folding (e.g. =?charset?q?text?=).

use ::base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use ::base64::Engine as _;

use crate::charset::{convert_bytes, Charset};
use crate::encoding::base64::decode_into as base64_decode_into;
use crate::encoding::quoted_printable;

/// An atomic run of header text: a byte buffer plus the charset it is
/// expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    buffer: Vec<u8>,
    charset: Charset,
}

impl Word {
    pub fn new(buffer: impl Into<Vec<u8>>, charset: Charset) -> Self {
        Self {
            buffer: buffer.into(),
            charset,
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    /// Word bytes converted into the destination charset. Unmappable
    /// characters degrade to `?`.
    pub fn converted(&self, dest: &Charset) -> Result<Vec<u8>, crate::error::MimeError> {
        convert_bytes(&self.buffer, &self.charset, dest)
    }
}

/// Fold/encode behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldFlags {
    /// Fold only, never produce encoded words (Received generation; those
    /// values are structurally significant literal ASCII).
    pub force_no_encoding: bool,
}

/// An ordered sequence of Words: one header value that may mix charsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedText {
    words: Vec<Word>,
}

impl EncodedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn append_word(&mut self, word: Word) {
        self.words.push(word);
    }

    /// Build from unencoded UTF-8 text. Runs of ASCII stay us-ascii words;
    /// runs needing encoding are converted into the given charset (kept as
    /// UTF-8 if no transcoder exists for it). The space joining two runs
    /// travels with the literal side, so folds always land on a real space.
    pub fn from_string(s: &str, charset: &Charset) -> Self {
        let mut text = Self::new();
        if s.is_empty() {
            return text;
        }
        let mut run = String::new();
        let mut run_needs_encoding = false;
        for (i, token) in s.split(' ').enumerate() {
            let needs = token_needs_encoding(token.as_bytes());
            if i == 0 {
                run.push_str(token);
                run_needs_encoding = needs;
                continue;
            }
            if needs == run_needs_encoding {
                run.push(' ');
                run.push_str(token);
            } else {
                if run_needs_encoding {
                    text.push_run(&run, true, charset);
                    run.clear();
                    run.push(' ');
                } else {
                    run.push(' ');
                    text.push_run(&run, false, charset);
                    run.clear();
                }
                run.push_str(token);
                run_needs_encoding = needs;
            }
        }
        text.push_run(&run, run_needs_encoding, charset);
        text
    }

    fn push_run(&mut self, run: &str, needs_encoding: bool, charset: &Charset) {
        if run.is_empty() {
            return;
        }
        if needs_encoding {
            let utf8 = Charset::utf_8();
            if charset == &utf8 {
                self.words.push(Word::new(run.as_bytes(), utf8));
            } else {
                match convert_bytes(run.as_bytes(), &utf8, charset) {
                    Ok(converted) => self.words.push(Word::new(converted, charset.clone())),
                    Err(_) => self.words.push(Word::new(run.as_bytes(), utf8)),
                }
            }
        } else {
            self.words.push(Word::new(run.as_bytes(), Charset::us_ascii()));
        }
    }

    /// Parse header value text that may contain RFC 2047 encoded words.
    /// Literal runs become us-ascii words; whitespace between two adjacent
    /// encoded words is dropped (RFC 2047 section 6.2). Anything that does
    /// not parse as an encoded word stays literal.
    pub fn parse(s: &str) -> Self {
        let bytes = s.as_bytes();
        let mut text = Self::new();
        let mut literal: Vec<u8> = Vec::new();
        let mut pending_ws: Vec<u8> = Vec::new();
        let mut after_encoded = false;
        let mut pos = 0;

        while pos < bytes.len() {
            // Unfold: CRLF before whitespace is transport folding.
            if bytes[pos] == b'\r'
                && bytes.get(pos + 1) == Some(&b'\n')
                && matches!(bytes.get(pos + 2), Some(&b' ') | Some(&b'\t'))
            {
                pos += 2;
                continue;
            }
            if bytes[pos] == b'=' && bytes[pos..].starts_with(b"=?") {
                if let Some((word, end)) = parse_encoded_word(bytes, pos) {
                    // Whitespace between two encoded words is transport
                    // artifact, not content.
                    if !after_encoded {
                        literal.extend_from_slice(&pending_ws);
                    }
                    pending_ws.clear();
                    if !literal.is_empty() {
                        text.words.push(Word::new(std::mem::take(&mut literal), Charset::us_ascii()));
                    }
                    text.words.push(word);
                    after_encoded = true;
                    pos = end;
                    continue;
                }
            }
            let b = bytes[pos];
            if after_encoded && (b == b' ' || b == b'\t') {
                pending_ws.push(b);
                pos += 1;
                continue;
            }
            literal.extend_from_slice(&pending_ws);
            pending_ws.clear();
            after_encoded = false;
            literal.push(b);
            pos += 1;
        }
        literal.extend_from_slice(&pending_ws);
        if !literal.is_empty() {
            text.words.push(Word::new(literal, Charset::us_ascii()));
        }
        text
    }

    /// All words converted to UTF-8 and concatenated; words in charsets
    /// without a transcoder degrade to a lossy byte view.
    pub fn decoded_text(&self) -> String {
        let utf8 = Charset::utf_8();
        let mut out = String::new();
        for word in &self.words {
            match word.converted(&utf8) {
                Ok(converted) => out.push_str(&String::from_utf8_lossy(&converted)),
                Err(_) => out.push_str(&String::from_utf8_lossy(&word.buffer)),
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Generate header text, encoding words that need it and folding the
    /// output to max_line_length with CRLF + space. cur_pos is the column
    /// already occupied on the current line (the field name and colon);
    /// returns the column after the last written character. A single
    /// encoded word is atomic: it is emitted whole even when it alone
    /// exceeds the budget.
    pub fn encode_and_fold(
        &self,
        out: &mut String,
        max_line_length: usize,
        cur_pos: usize,
        flags: FoldFlags,
    ) -> usize {
        let mut col = cur_pos;
        for word in &self.words {
            let needs = !flags.force_no_encoding && token_needs_encoding(&word.buffer);
            if needs {
                col = fold_encoded_word(word, out, max_line_length, col);
            } else {
                col = fold_literal(&word.buffer, out, max_line_length, col);
            }
        }
        col
    }
}

/// True when the bytes cannot travel as plain header text: non-ASCII,
/// control characters, or something that would be mistaken for an encoded
/// word.
fn token_needs_encoding(bytes: &[u8]) -> bool {
    let mut prev = 0u8;
    for &b in bytes {
        if b >= 0x7f || (b < 0x20 && b != b'\t') {
            return true;
        }
        if prev == b'=' && b == b'?' {
            return true;
        }
        prev = b;
    }
    false
}

/// Emit literal text, folding at existing spaces only so unfolding
/// restores the exact bytes.
fn fold_literal(bytes: &[u8], out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
    let mut col = cur_pos;
    let s = String::from_utf8_lossy(bytes);
    for (i, token) in s.split(' ').enumerate() {
        if i > 0 {
            if col + 1 + token.len() > max_line_length && col > 1 {
                // The fold's continuation space replaces this one.
                out.push_str("\r\n ");
                col = 1;
            } else {
                out.push(' ');
                col += 1;
            }
        }
        out.push_str(token);
        col += token.len();
    }
    col
}

/// Emit one Word as RFC 2047 encoded words, chunked so each stays within
/// the line budget (and the 75-character encoded-word limit), folded with
/// CRLF + space between chunks. UTF-8 characters never straddle a chunk
/// boundary.
fn fold_encoded_word(word: &Word, out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
    let charset_name = word.charset().name();
    let overhead = charset_name.len() + 7; // =? ?X? ?=
    let mut col = cur_pos;
    let mut rest = word.buffer();

    while !rest.is_empty() {
        let budget = max_line_length.saturating_sub(col).min(75);
        let chunk_len = if budget <= overhead + 4 && col > 1 {
            0 // no room on this line; fold first
        } else {
            pick_chunk(rest, word.charset(), budget.saturating_sub(overhead))
        };
        if chunk_len == 0 {
            // The continuation space replaces a trailing literal space.
            if out.ends_with(' ') {
                out.pop();
            }
            out.push_str("\r\n ");
            col = 1;
            continue;
        }
        let chunk = &rest[..chunk_len];
        rest = &rest[chunk_len..];

        let q = q_encoded_len(chunk);
        let b = (chunk.len() + 2) / 3 * 4;
        out.push_str("=?");
        out.push_str(charset_name);
        if q <= b {
            out.push_str("?Q?");
            q_encode(chunk, out);
            col += overhead + q;
        } else {
            out.push_str("?B?");
            let encoded = BASE64_ENGINE.encode(chunk);
            col += overhead + encoded.len();
            out.push_str(&encoded);
        }
        out.push_str("?=");

        if !rest.is_empty() {
            if max_line_length == usize::MAX {
                // Unfolded output joins chunks with a plain space, which
                // decoding drops between adjacent encoded words.
                out.push(' ');
                col += 1;
            } else {
                out.push_str("\r\n ");
                col = 1;
            }
        }
    }
    col
}

/// Longest prefix of rest whose Q/B encoded form fits payload_budget.
/// Steps by whole characters when the charset is UTF-8 and by single
/// bytes otherwise, so only UTF-8 characters are guaranteed not to
/// straddle a chunk boundary. Always consumes at least one byte; a
/// truncated trailing sequence is emitted whole rather than held back.
fn pick_chunk(rest: &[u8], charset: &Charset, payload_budget: usize) -> usize {
    let utf8 = charset == &Charset::utf_8();
    let mut len = 0usize;
    while len < rest.len() {
        let step = if utf8 { utf8_char_len(rest, len) } else { 1 };
        let candidate = (len + step).min(rest.len());
        let q = q_encoded_len(&rest[..candidate]);
        let b = (candidate + 2) / 3 * 4;
        if q.min(b) > payload_budget && len > 0 {
            break;
        }
        len = candidate;
        if q.min(b) > payload_budget {
            break; // single oversized character, emit whole
        }
    }
    len
}

fn utf8_char_len(bytes: &[u8], at: usize) -> usize {
    match bytes.get(at) {
        Some(b) if *b < 0x80 => 1,
        Some(b) if *b >> 5 == 0b110 => 2,
        Some(b) if *b >> 4 == 0b1110 => 3,
        Some(b) if *b >> 3 == 0b11110 => 4,
        _ => 1,
    }
}

fn is_q_literal(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'!' | b'*' | b'+' | b'-' | b'/')
}

fn q_encoded_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .map(|&b| if b == b' ' || is_q_literal(b) { 1 } else { 3 })
        .sum()
}

fn q_encode(bytes: &[u8], out: &mut String) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in bytes {
        if b == b' ' {
            out.push('_');
        } else if is_q_literal(b) {
            out.push(b as char);
        } else {
            out.push('=');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0f) as usize] as char);
        }
    }
}

/// Decode one encoded word starting at pos (which points at "=?").
/// Returns the Word and the position after the trailing "?=".
fn parse_encoded_word(bytes: &[u8], pos: usize) -> Option<(Word, usize)> {
    let start = pos + 2;
    let q1 = bytes[start..].iter().position(|&b| b == b'?')? + start;
    if q1 == start {
        return None;
    }
    let charset = std::str::from_utf8(&bytes[start..q1]).ok()?.trim();
    let scheme = bytes.get(q1 + 1)?.to_ascii_lowercase();
    if bytes.get(q1 + 2) != Some(&b'?') {
        return None;
    }
    let payload_start = q1 + 3;
    let end_rel = bytes[payload_start..]
        .windows(2)
        .position(|w| w == b"?=")?;
    let payload = &bytes[payload_start..payload_start + end_rel];
    let decoded = match scheme {
        b'b' => {
            let mut buf = Vec::with_capacity(payload.len() * 3 / 4 + 3);
            base64_decode_into(payload, &mut buf, true);
            buf
        }
        b'q' => {
            let mut unescaped = Vec::with_capacity(payload.len());
            for &b in payload {
                unescaped.push(if b == b'_' { b' ' } else { b });
            }
            // Underscores replaced, the rest is quoted-printable.
            let mut buf = Vec::with_capacity(unescaped.len());
            quoted_printable::decode_into(&unescaped, &mut buf, true);
            buf
        }
        _ => return None,
    };
    Some((
        Word::new(decoded, Charset::new(charset)),
        payload_start + end_rel + 2,
    ))
}
