/*
 * charset.rs
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

//! Charset names and streaming charset conversion.
//! Conversion failures are retried once with more input before a byte is
//! declared unconvertible (incomplete multi-byte tails look identical to
//! invalid sequences at a buffer boundary).

use std::io::{Read, Write};

use encoding_rs::{DecoderResult, Encoding};

use crate::error::MimeError;

/// Small input buffer so the retry path is exercised on multi-byte
/// sequences straddling a refill.
const INPUT_BUFFER: usize = 16;

/// A charset name as it appears in header text. Comparison is
/// case-insensitive on the exact name; "UTF8" and "UTF-8" are distinct.
#[derive(Debug, Clone)]
pub struct Charset {
    name: String,
}

impl Charset {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn us_ascii() -> Self {
        Self::new("us-ascii")
    }

    pub fn utf_8() -> Self {
        Self::new("utf-8")
    }

    /// Charset from the process locale (LC_ALL, LC_CTYPE, LANG), falling
    /// back to us-ascii. E.g. "en_US.UTF-8" yields "UTF-8".
    pub fn locale() -> Self {
        for var in ["LC_ALL", "LC_CTYPE", "LANG"] {
            if let Ok(value) = std::env::var(var) {
                if let Some(dot) = value.find('.') {
                    let name = value[dot + 1..].trim();
                    let name = name.split('@').next().unwrap_or(name);
                    if !name.is_empty() {
                        return Self::new(name);
                    }
                }
            }
        }
        Self::us_ascii()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Charset {}

impl std::hash::Hash for Charset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Conversion attempt state at the current input position.
enum RetryState {
    /// No failed attempt at this position yet.
    Fresh,
    /// The previous attempt at this position failed; the next failure is
    /// final and costs the leading byte.
    PendingRetry,
}

fn transcoder_for(charset: &Charset) -> Option<&'static Encoding> {
    Encoding::for_label(charset.name().as_bytes())
}

/// Convert bytes read from `input` in `source` charset and write them to
/// `output` in `dest` charset. Memory use is bounded by fixed buffers
/// regardless of content size. A byte sequence that fails conversion twice
/// at the same position degrades to a single `?` in the output.
pub fn convert_stream(
    input: &mut dyn Read,
    output: &mut dyn Write,
    source: &Charset,
    dest: &Charset,
) -> Result<(), MimeError> {
    if source == dest {
        let mut buf = [0u8; 4096];
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            output.write_all(&buf[..n])?;
        }
    }

    let from = transcoder_for(source).ok_or_else(|| MimeError::ConversionUnavailable {
        source: source.name().to_string(),
        dest: dest.name().to_string(),
    })?;
    let to = transcoder_for(dest)
        .ok_or_else(|| MimeError::ConversionUnavailable {
            source: source.name().to_string(),
            dest: dest.name().to_string(),
        })?
        .output_encoding();

    let mut in_buf = [0u8; INPUT_BUFFER];
    let mut in_len = 0usize;
    let mut eof = false;
    let mut state = RetryState::Fresh;
    let mut utf8 = Vec::new();

    loop {
        while !eof && in_len < INPUT_BUFFER {
            let n = input.read(&mut in_buf[in_len..])?;
            if n == 0 {
                eof = true;
                break;
            }
            in_len += n;
        }
        if in_len == 0 {
            break;
        }

        utf8.clear();
        let (good, failed) = decode_prefix(&in_buf[..in_len], from, &mut utf8);
        if !utf8.is_empty() {
            encode_and_write(&String::from_utf8_lossy(&utf8), to, output)?;
        }

        let consumed = if failed {
            match state {
                RetryState::Fresh => {
                    // Possibly an incomplete sequence starved for input;
                    // retry from the same position after a refill.
                    state = RetryState::PendingRetry;
                    good
                }
                RetryState::PendingRetry => {
                    output.write_all(b"?")?;
                    state = RetryState::Fresh;
                    good + 1
                }
            }
        } else {
            state = RetryState::Fresh;
            good
        };

        in_buf.copy_within(consumed..in_len, 0);
        in_len -= consumed;

        if eof && in_len == 0 {
            break;
        }
    }
    Ok(())
}

/// Buffer-to-buffer convenience form; same state machine as convert_stream.
pub fn convert_bytes(
    input: &[u8],
    source: &Charset,
    dest: &Charset,
) -> Result<Vec<u8>, MimeError> {
    let mut cursor = std::io::Cursor::new(input);
    let mut out = Vec::new();
    convert_stream(&mut cursor, &mut out, source, dest)?;
    Ok(out)
}

/// Decode the longest convertible prefix of src into UTF-8 bytes. Returns
/// (bytes consumed, failure flag). On failure the consumed count stops at
/// the offending sequence, which stays in the caller's buffer.
fn decode_prefix(src: &[u8], from: &'static Encoding, out: &mut Vec<u8>) -> (usize, bool) {
    let mut decoder = from.new_decoder_without_bom_handling();
    let mut chunk = [0u8; 1024];
    let mut read_total = 0usize;
    loop {
        let (result, read, written) =
            decoder.decode_to_utf8_without_replacement(&src[read_total..], &mut chunk, true);
        read_total += read;
        out.extend_from_slice(&chunk[..written]);
        match result {
            DecoderResult::InputEmpty => return (read_total, false),
            DecoderResult::OutputFull => {}
            DecoderResult::Malformed(bad, pushed_back) => {
                return (read_total - bad as usize - pushed_back as usize, true);
            }
        }
    }
}

/// Encode UTF-8 text into the destination charset. Unmappable characters
/// degrade to `?` rather than failing the conversion.
fn encode_and_write(
    s: &str,
    to: &'static Encoding,
    output: &mut dyn Write,
) -> Result<(), MimeError> {
    if to == encoding_rs::UTF_8 {
        output.write_all(s.as_bytes())?;
        return Ok(());
    }
    let mut encoder = to.new_encoder();
    let mut chunk = [0u8; 1024];
    let mut pos = 0usize;
    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(&s[pos..], &mut chunk, true);
        pos += read;
        output.write_all(&chunk[..written])?;
        match result {
            encoding_rs::EncoderResult::InputEmpty => return Ok(()),
            encoding_rs::EncoderResult::OutputFull => {}
            encoding_rs::EncoderResult::Unmappable(_) => output.write_all(b"?")?,
        }
    }
}
