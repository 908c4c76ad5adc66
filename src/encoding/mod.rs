/*
 * mod.rs
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

//! Content-transfer-encodings: streaming codecs and the name-keyed
//! encoder registry.

pub mod base64;
pub mod quoted_printable;

use std::io::{Read, Write};

use crate::error::MimeError;

/// A content-transfer-encoding name. Comparison is case-insensitive.
#[derive(Debug, Clone)]
pub struct Encoding {
    name: String,
}

impl Encoding {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn seven_bit() -> Self {
        Self::new("7bit")
    }

    pub fn eight_bit() -> Self {
        Self::new("8bit")
    }

    pub fn binary() -> Self {
        Self::new("binary")
    }

    pub fn base64() -> Self {
        Self::new("base64")
    }

    pub fn quoted_printable() -> Self {
        Self::new("quoted-printable")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for Encoding {
    fn default() -> Self {
        Self::seven_bit()
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Encoding {}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Codec configuration. max_line_length applies to line-oriented
/// encodings; 0 disables wrapping.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    pub max_line_length: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self { max_line_length: 76 }
    }
}

/// A streaming content-transfer-encoding codec. Both directions process
/// arbitrarily large content with bounded chunk buffers; decode is
/// tolerant of malformed input and degrades instead of aborting. Returns
/// the number of bytes written to output.
pub trait Codec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError>;
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError>;
}

const CHUNK: usize = 4096;

pub struct Base64Codec {
    options: CodecOptions,
}

impl Codec for Base64Codec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        let mut buf = [0u8; CHUNK];
        let mut carry: Vec<u8> = Vec::new();
        let mut out: Vec<u8> = Vec::new();
        let mut col = 0usize;
        let mut written = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            carry.extend_from_slice(&buf[..n]);
            out.clear();
            let consumed = base64::encode_into(&carry, &mut out, &mut col, self.options.max_line_length);
            carry.drain(..consumed);
            output.write_all(&out)?;
            written += out.len() as u64;
        }
        out.clear();
        base64::encode_final(&carry, &mut out, &mut col, self.options.max_line_length);
        output.write_all(&out)?;
        Ok(written + out.len() as u64)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        let mut buf = [0u8; CHUNK];
        let mut carry: Vec<u8> = Vec::new();
        let mut out: Vec<u8> = Vec::new();
        let mut written = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            carry.extend_from_slice(&buf[..n]);
            out.clear();
            let consumed = base64::decode_into(&carry, &mut out, false);
            carry.drain(..consumed);
            output.write_all(&out)?;
            written += out.len() as u64;
        }
        out.clear();
        base64::decode_into(&carry, &mut out, true);
        output.write_all(&out)?;
        Ok(written + out.len() as u64)
    }
}

pub struct QuotedPrintableCodec {
    options: CodecOptions,
}

impl Codec for QuotedPrintableCodec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        let mut buf = [0u8; CHUNK];
        let mut carry: Vec<u8> = Vec::new();
        let mut out: Vec<u8> = Vec::new();
        let mut col = 0usize;
        let mut written = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            carry.extend_from_slice(&buf[..n]);
            out.clear();
            let consumed =
                quoted_printable::encode_into(&carry, &mut out, &mut col, self.options.max_line_length, false);
            carry.drain(..consumed);
            output.write_all(&out)?;
            written += out.len() as u64;
        }
        out.clear();
        quoted_printable::encode_into(&carry, &mut out, &mut col, self.options.max_line_length, true);
        output.write_all(&out)?;
        Ok(written + out.len() as u64)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        let mut buf = [0u8; CHUNK];
        let mut carry: Vec<u8> = Vec::new();
        let mut out: Vec<u8> = Vec::new();
        let mut written = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            carry.extend_from_slice(&buf[..n]);
            out.clear();
            let consumed = quoted_printable::decode_into(&carry, &mut out, false);
            carry.drain(..consumed);
            output.write_all(&out)?;
            written += out.len() as u64;
        }
        out.clear();
        quoted_printable::decode_into(&carry, &mut out, true);
        output.write_all(&out)?;
        Ok(written + out.len() as u64)
    }
}

/// Pass-through codec for 7bit, 8bit and binary.
pub struct IdentityCodec;

impl IdentityCodec {
    fn copy(input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        let mut buf = [0u8; CHUNK];
        let mut written = 0u64;
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                return Ok(written);
            }
            output.write_all(&buf[..n])?;
            written += n as u64;
        }
    }
}

impl Codec for IdentityCodec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        Self::copy(input, output)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, MimeError> {
        Self::copy(input, output)
    }
}

type CodecFactory = fn(CodecOptions) -> Box<dyn Codec>;

/// Name-keyed codec registry. Populated once at startup via register();
/// read-only afterwards.
pub struct EncoderRegistry {
    entries: Vec<(String, CodecFactory)>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registry with the standard IANA content-transfer-encodings.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("base64", |options| Box::new(Base64Codec { options }));
        registry.register("quoted-printable", |options| {
            Box::new(QuotedPrintableCodec { options })
        });
        registry.register("7bit", |_| Box::new(IdentityCodec));
        registry.register("8bit", |_| Box::new(IdentityCodec));
        registry.register("binary", |_| Box::new(IdentityCodec));
        registry
    }

    pub fn register(&mut self, name: &str, factory: CodecFactory) {
        self.entries.push((name.to_ascii_lowercase(), factory));
    }

    pub fn create(&self, encoding: &Encoding) -> Result<Box<dyn Codec>, MimeError> {
        self.create_with_options(encoding, CodecOptions::default())
    }

    pub fn create_with_options(
        &self,
        encoding: &Encoding,
        options: CodecOptions,
    ) -> Result<Box<dyn Codec>, MimeError> {
        for (name, factory) in &self.entries {
            if name.eq_ignore_ascii_case(encoding.name()) {
                return Ok(factory(options));
            }
        }
        Err(MimeError::UnknownEncoding(encoding.name().to_string()))
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(codec: &dyn Codec, input: &[u8], encode: bool) -> Vec<u8> {
        let mut src = Cursor::new(input);
        let mut out = Vec::new();
        if encode {
            codec.encode(&mut src, &mut out).unwrap();
        } else {
            codec.decode(&mut src, &mut out).unwrap();
        }
        out
    }

    #[test]
    fn registry_lookup_case_insensitive() {
        let registry = EncoderRegistry::with_defaults();
        assert!(registry.create(&Encoding::new("BASE64")).is_ok());
        assert!(registry.create(&Encoding::new("Quoted-Printable")).is_ok());
    }

    #[test]
    fn registry_unknown_encoding() {
        let registry = EncoderRegistry::with_defaults();
        let err = registry.create(&Encoding::new("x-uuencode"));
        assert!(matches!(err, Err(MimeError::UnknownEncoding(_))));
    }

    #[test]
    fn base64_codec_streaming_roundtrip() {
        let registry = EncoderRegistry::with_defaults();
        let codec = registry.create(&Encoding::base64()).unwrap();
        let input: Vec<u8> = (0..10000u32).map(|i| (i % 251) as u8).collect();
        let encoded = run(codec.as_ref(), &input, true);
        let decoded = run(codec.as_ref(), &encoded, false);
        assert_eq!(decoded, input);
    }

    #[test]
    fn quoted_printable_codec_streaming_roundtrip() {
        let registry = EncoderRegistry::with_defaults();
        let codec = registry.create(&Encoding::quoted_printable()).unwrap();
        let input = b"Il y a des caract\xe8res accentu\xe9s partout ici.\r\nDeuxi\xe8me ligne.";
        let encoded = run(codec.as_ref(), input, true);
        let decoded = run(codec.as_ref(), &encoded, false);
        assert_eq!(decoded, input);
    }

    #[test]
    fn identity_codec_verbatim() {
        let registry = EncoderRegistry::with_defaults();
        for name in ["7bit", "8bit", "binary"] {
            let codec = registry.create(&Encoding::new(name)).unwrap();
            let input = b"anything\r\ngoes \xff here";
            assert_eq!(run(codec.as_ref(), input, true), input);
            assert_eq!(run(codec.as_ref(), input, false), input);
        }
    }

    #[test]
    fn encoding_equality_case_insensitive() {
        assert_eq!(Encoding::new("Base64"), Encoding::base64());
        assert_ne!(Encoding::base64(), Encoding::quoted_printable());
    }
}
