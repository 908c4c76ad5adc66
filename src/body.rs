/*
 * body.rs
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

//! Entity bodies: verbatim leaf contents or a multipart container.
//!
//! Parsing never decodes. Leaf bodies keep their transfer-encoded bytes
//! untouched so generation is byte-exact; decoding happens only in
//! extract(). A body is multipart only when the header carries a
//! multipart Content-Type with a valid boundary parameter; otherwise it
//! is a leaf, whatever the bytes look like.

use std::io::Write;

use bytes::Bytes;

use crate::charset::Charset;
use crate::context::MailContext;
use crate::encoding::{EncoderRegistry, Encoding};
use crate::error::MimeError;
use crate::header::Header;
use crate::part::BodyPart;

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Leaf contents, byte-for-byte as parsed (still transfer-encoded).
    /// The encoding and charset are snapshots of the owning header at
    /// parse time.
    Contents {
        data: Bytes,
        encoding: Encoding,
        charset: Charset,
    },
    /// Multipart container. Prolog and epilog are the raw byte ranges
    /// outside the delimiters, preserved for regeneration.
    Multipart {
        boundary: String,
        prolog: Bytes,
        parts: Vec<BodyPart>,
        epilog: Bytes,
    },
}

impl Body {
    pub fn empty() -> Self {
        Self::Contents {
            data: Bytes::new(),
            encoding: Encoding::default(),
            charset: Charset::us_ascii(),
        }
    }

    /// Parse the body bytes of an entity whose header has already been
    /// parsed.
    pub fn parse(ctx: &MailContext, data: &[u8], header: &Header) -> Self {
        if let Some(ct) = header.content_type() {
            if ct.is_primary_type("multipart") {
                if let Some(boundary) = ct.boundary() {
                    if is_valid_boundary(boundary) {
                        return Self::parse_multipart(ctx, data, boundary);
                    }
                }
            }
        }
        let encoding = header
            .field("Content-Transfer-Encoding")
            .ok()
            .and_then(|f| f.content_encoding().ok().cloned())
            .unwrap_or_default();
        let charset = header
            .content_type()
            .and_then(|ct| ct.charset())
            .map(Charset::new)
            .unwrap_or_else(|| ctx.default_charset().clone());
        Self::Contents {
            data: Bytes::copy_from_slice(data),
            encoding,
            charset,
        }
    }

    fn parse_multipart(ctx: &MailContext, data: &[u8], boundary: &str) -> Self {
        let mut parts = Vec::new();
        let mut prolog = Bytes::new();
        let mut epilog = Bytes::new();

        // Delimiter line starts, with the offset just past each line.
        let mut found_first = false;
        let mut part_start: Option<usize> = None;
        let mut closed = false;
        let mut pos = 0;
        while pos < data.len() {
            let (line, next) = split_line(data, pos);
            match delimiter_kind(line, boundary) {
                Some(closing) => {
                    if !found_first {
                        prolog = Bytes::copy_from_slice(strip_final_crlf(&data[..pos]));
                        found_first = true;
                    } else if let Some(start) = part_start.take() {
                        let content = strip_final_crlf(&data[start..pos]);
                        parts.push(BodyPart::parse_child(ctx, content));
                    }
                    if closing {
                        epilog = Bytes::copy_from_slice(&data[next..]);
                        closed = true;
                        break;
                    }
                    part_start = Some(next);
                }
                None => {}
            }
            pos = next;
        }

        if !found_first {
            // Declared multipart but no delimiter: everything is prolog.
            prolog = Bytes::copy_from_slice(data);
        } else if !closed {
            if let Some(start) = part_start.take() {
                parts.push(BodyPart::parse_child(ctx, &data[start..]));
            }
        }

        Self::Multipart {
            boundary: boundary.to_string(),
            prolog,
            parts,
            epilog,
        }
    }

    /// Write the body bytes. Multipart regenerates the delimiter
    /// structure around each child; leaves are verbatim.
    pub fn generate(&self, out: &mut Vec<u8>, max_line_length: usize) {
        match self {
            Self::Contents { data, .. } => out.extend_from_slice(data),
            Self::Multipart {
                boundary,
                prolog,
                parts,
                epilog,
            } => {
                if !prolog.is_empty() {
                    out.extend_from_slice(prolog);
                    out.extend_from_slice(b"\r\n");
                }
                for part in parts {
                    out.extend_from_slice(b"--");
                    out.extend_from_slice(boundary.as_bytes());
                    out.extend_from_slice(b"\r\n");
                    part.generate(out, max_line_length);
                    out.extend_from_slice(b"\r\n");
                }
                out.extend_from_slice(b"--");
                out.extend_from_slice(boundary.as_bytes());
                out.extend_from_slice(b"--\r\n");
                out.extend_from_slice(epilog);
            }
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart { .. })
    }

    pub fn parts(&self) -> &[BodyPart] {
        match self {
            Self::Multipart { parts, .. } => parts,
            Self::Contents { .. } => &[],
        }
    }

    pub fn parts_mut(&mut self) -> Option<&mut Vec<BodyPart>> {
        match self {
            Self::Multipart { parts, .. } => Some(parts),
            Self::Contents { .. } => None,
        }
    }

    /// Decode the leaf contents through their transfer encoding into
    /// out, reporting (done, total) input progress when a callback is
    /// given. Errors on multipart bodies and unknown encodings.
    pub fn extract(
        &self,
        encoders: &EncoderRegistry,
        out: &mut dyn Write,
        progress: Option<&mut dyn FnMut(u64, u64)>,
    ) -> Result<u64, MimeError> {
        self.extract_range(encoders, out, 0, None, progress)
    }

    /// Like extract(), over a byte range of the stored (still encoded)
    /// contents: start offset plus optional length, clamped to the data.
    pub fn extract_range(
        &self,
        encoders: &EncoderRegistry,
        out: &mut dyn Write,
        start: usize,
        length: Option<usize>,
        progress: Option<&mut dyn FnMut(u64, u64)>,
    ) -> Result<u64, MimeError> {
        let (data, encoding) = match self {
            Self::Contents { data, encoding, .. } => (data, encoding),
            Self::Multipart { .. } => {
                return Err(MimeError::TypeMismatch {
                    expected: "contents",
                    found: "multipart",
                })
            }
        };
        let codec = encoders.create(encoding)?;
        let start = start.min(data.len());
        let end = match length {
            Some(n) => start.saturating_add(n).min(data.len()),
            None => data.len(),
        };
        let slice = &data[start..end];
        let total = slice.len() as u64;
        match progress {
            Some(callback) => {
                let mut reader = ProgressReader {
                    data: slice,
                    pos: 0,
                    total,
                    callback,
                };
                codec.decode(&mut reader, out)
            }
            None => codec.decode(&mut std::io::Cursor::new(slice), out),
        }
    }
}

struct ProgressReader<'a> {
    data: &'a [u8],
    pos: usize,
    total: u64,
    callback: &'a mut dyn FnMut(u64, u64),
}

impl std::io::Read for ProgressReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        (self.callback)(self.pos as u64, self.total);
        Ok(n)
    }
}

/// RFC 2046 boundary: 1 to 70 bchars, not ending in a space.
pub fn is_valid_boundary(boundary: &str) -> bool {
    if boundary.is_empty() || boundary.len() > 70 || boundary.ends_with(' ') {
        return false;
    }
    boundary.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' | b'/' | b':' | b'='
                    | b'?' | b' '
            )
    })
}

/// One line starting at pos, without its terminator; returns the line
/// and the offset just past the terminator.
fn split_line(data: &[u8], pos: usize) -> (&[u8], usize) {
    match data[pos..].iter().position(|&b| b == b'\n') {
        Some(i) => {
            let mut end = pos + i;
            let next = end + 1;
            if end > pos && data[end - 1] == b'\r' {
                end -= 1;
            }
            (&data[pos..end], next)
        }
        None => (&data[pos..], data.len()),
    }
}

/// Some(true) for a closing delimiter line, Some(false) for an interior
/// one. Trailing transport padding after the delimiter is ignored.
fn delimiter_kind(line: &[u8], boundary: &str) -> Option<bool> {
    let rest = line.strip_prefix(b"--")?;
    let rest = rest.strip_prefix(boundary.as_bytes())?;
    let (closing, rest) = match rest.strip_prefix(b"--") {
        Some(r) => (true, r),
        None => (false, rest),
    };
    rest.iter()
        .all(|&b| b == b' ' || b == b'\t')
        .then_some(closing)
}

fn strip_final_crlf(data: &[u8]) -> &[u8] {
    if data.ends_with(b"\r\n") {
        &data[..data.len() - 2]
    } else if data.ends_with(b"\n") {
        &data[..data.len() - 1]
    } else {
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldRegistry;

    fn header(raw: &[u8]) -> Header {
        Header::parse(&FieldRegistry::with_defaults(), raw).0
    }

    fn ctx() -> MailContext {
        MailContext::new()
    }

    #[test]
    fn leaf_kept_verbatim() {
        let h = header(b"Content-Type: text/plain; charset=iso-8859-1\r\n\r\n");
        let body = Body::parse(&ctx(), b"caf\xe9 au lait\r\n", &h);
        match &body {
            Body::Contents { data, charset, .. } => {
                assert_eq!(&data[..], b"caf\xe9 au lait\r\n");
                assert_eq!(charset, &Charset::new("iso-8859-1"));
            }
            other => panic!("expected leaf, got {:?}", other),
        }
    }

    #[test]
    fn multipart_split() {
        let h = header(b"Content-Type: multipart/mixed; boundary=sep\r\n\r\n");
        let data = b"preamble\r\n--sep\r\nContent-Type: text/plain\r\n\r\nOne.\r\n--sep\r\n\
                     Content-Type: text/plain\r\n\r\nTwo.\r\n--sep--\r\ntrailer\r\n";
        let body = Body::parse(&ctx(), data, &h);
        match &body {
            Body::Multipart {
                prolog,
                parts,
                epilog,
                ..
            } => {
                assert_eq!(&prolog[..], b"preamble");
                assert_eq!(parts.len(), 2);
                assert_eq!(&epilog[..], b"trailer\r\n");
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn multipart_without_closing_delimiter() {
        let h = header(b"Content-Type: multipart/mixed; boundary=sep\r\n\r\n");
        let data = b"--sep\r\n\r\nOnly part, never closed.";
        let body = Body::parse(&ctx(), data, &h);
        assert_eq!(body.parts().len(), 1);
    }

    #[test]
    fn invalid_boundary_means_leaf() {
        let h = header(b"Content-Type: multipart/mixed; boundary=\"\"\r\n\r\n");
        let body = Body::parse(&ctx(), b"--\r\nnot really multipart", &h);
        assert!(!body.is_multipart());
    }

    #[test]
    fn generate_roundtrip_byte_exact() {
        let h = header(b"Content-Type: multipart/mixed; boundary=sep\r\n\r\n");
        let data = b"pre\r\n--sep\r\nContent-Type: text/plain\r\n\r\nhello\r\n--sep--\r\nep";
        let body = Body::parse(&ctx(), data, &h);
        let mut out = Vec::new();
        body.generate(&mut out, 76);
        let reparsed = Body::parse(&ctx(), &out, &h);
        let mut out2 = Vec::new();
        reparsed.generate(&mut out2, 76);
        assert_eq!(out2, out);
        assert_eq!(reparsed, body);
    }

    #[test]
    fn extract_decodes_base64() {
        let h = header(
            b"Content-Type: application/octet-stream\r\n\
              Content-Transfer-Encoding: base64\r\n\r\n",
        );
        let body = Body::parse(&ctx(), b"aGVsbG8gd29ybGQ=\r\n", &h);
        let mut out = Vec::new();
        let mut calls = 0u32;
        let mut progress = |done: u64, total: u64| {
            calls += 1;
            assert!(done <= total);
        };
        let written = body
            .extract(ctx().encoders(), &mut out, Some(&mut progress))
            .unwrap();
        assert_eq!(out, b"hello world");
        assert_eq!(written, 11);
        assert!(calls > 0);
    }

    #[test]
    fn extract_range_of_contents() {
        let h = header(b"Content-Type: text/plain\r\n\r\n");
        let body = Body::parse(&ctx(), b"hello world", &h);
        let mut out = Vec::new();
        body.extract_range(ctx().encoders(), &mut out, 6, Some(100), None)
            .unwrap();
        assert_eq!(out, b"world");
        out.clear();
        body.extract_range(ctx().encoders(), &mut out, 0, Some(5), None)
            .unwrap();
        assert_eq!(out, b"hello");
        // Out-of-range arguments clamp to an empty slice.
        out.clear();
        body.extract_range(ctx().encoders(), &mut out, usize::MAX, Some(usize::MAX), None)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn extract_multipart_is_error() {
        let h = header(b"Content-Type: multipart/mixed; boundary=sep\r\n\r\n");
        let body = Body::parse(&ctx(), b"--sep\r\n\r\nx\r\n--sep--\r\n", &h);
        let mut out = Vec::new();
        assert!(matches!(
            body.extract(ctx().encoders(), &mut out, None),
            Err(MimeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn extract_unknown_encoding_is_error() {
        let h = header(b"Content-Transfer-Encoding: x-uuencode\r\n\r\n");
        let body = Body::parse(&ctx(), b"data", &h);
        let mut out = Vec::new();
        assert!(matches!(
            body.extract(ctx().encoders(), &mut out, None),
            Err(MimeError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn boundary_validation() {
        assert!(is_valid_boundary("=_abc123"));
        assert!(is_valid_boundary("simple boundary"));
        assert!(!is_valid_boundary(""));
        assert!(!is_valid_boundary("ends with space "));
        assert!(!is_valid_boundary(&"x".repeat(71)));
    }
}
