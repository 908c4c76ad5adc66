/*
 * header.rs
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

//! An RFC 2822 header: an ordered field list with parse and generate.
//!
//! Duplicate field names are kept in order (Received chains rely on
//! this). Unfolding removes only the CRLF of a folded line, so a
//! generate/parse cycle restores the exact value bytes.

use crate::error::MimeError;
use crate::field::content::ContentTypeValue;
use crate::field::{FieldRegistry, FieldValue, HeaderField};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: Vec<HeaderField>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse header fields from the start of data, up to and including
    /// the blank separator line (or end of input). Returns the header
    /// and the number of bytes consumed. Lines that are neither fields
    /// nor continuations are skipped.
    pub fn parse(registry: &FieldRegistry, data: &[u8]) -> (Self, usize) {
        let mut fields = Vec::new();
        let mut pending: Option<(String, String)> = None;
        let mut pos = 0;

        while pos < data.len() {
            let (line, next) = read_line(data, pos);
            if line.is_empty() {
                pos = next;
                break;
            }
            if line[0] == b' ' || line[0] == b'\t' {
                if let Some((_, value)) = pending.as_mut() {
                    value.push_str(&String::from_utf8_lossy(line));
                }
            } else if let Some(colon) = line.iter().position(|&b| b == b':') {
                if let Some((name, value)) = pending.take() {
                    fields.push(HeaderField::parse(registry, &name, &value));
                }
                let name = String::from_utf8_lossy(&line[..colon]).trim().to_string();
                let mut value = String::from_utf8_lossy(&line[colon + 1..]).into_owned();
                if value.starts_with(' ') {
                    value.remove(0);
                }
                pending = Some((name, value));
            }
            pos = next;
        }
        if let Some((name, value)) = pending.take() {
            fields.push(HeaderField::parse(registry, &name, &value));
        }
        (Self { fields }, pos)
    }

    /// Write every field folded to max_line_length, each terminated by
    /// CRLF. The blank separator line is the caller's concern.
    pub fn generate(&self, out: &mut String, max_line_length: usize) {
        for field in &self.fields {
            field.generate(out, max_line_length);
            out.push_str("\r\n");
        }
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field with this name, case-insensitive.
    pub fn field(&self, name: &str) -> Result<&HeaderField, MimeError> {
        self.fields
            .iter()
            .find(|f| f.is_named(name))
            .ok_or_else(|| MimeError::NoSuchField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut HeaderField, MimeError> {
        self.fields
            .iter_mut()
            .find(|f| f.is_named(name))
            .ok_or_else(|| MimeError::NoSuchField(name.to_string()))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.is_named(name))
    }

    /// All fields with this name, in message order.
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HeaderField> {
        self.fields.iter().filter(move |f| f.is_named(name))
    }

    pub fn append(&mut self, field: HeaderField) {
        self.fields.push(field);
    }

    pub fn insert(&mut self, index: usize, field: HeaderField) {
        self.fields.insert(index, field);
    }

    /// Remove every field with this name; returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| !f.is_named(name));
        before - self.fields.len()
    }

    /// Replace the first field with this name, or append.
    pub fn set(&mut self, field: HeaderField) {
        match self.fields.iter_mut().find(|f| f.is_named(field.name())) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// The Content-Type value, when present and structured.
    pub fn content_type(&self) -> Option<&ContentTypeValue> {
        match self.field("Content-Type").ok()?.value() {
            FieldValue::ContentType(ct) => Some(ct),
            _ => None,
        }
    }
}

/// One line of data starting at pos, without its line terminator.
/// Returns the line and the offset just past the terminator. Accepts
/// CRLF and bare LF.
fn read_line(data: &[u8], pos: usize) -> (&[u8], usize) {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FieldRegistry {
        FieldRegistry::with_defaults()
    }

    #[test]
    fn parse_simple_header() {
        let data = b"From: a@x.org\r\nSubject: hi\r\n\r\nbody";
        let (header, consumed) = Header::parse(&registry(), data);
        assert_eq!(consumed, data.len() - 4);
        assert_eq!(header.fields().len(), 2);
        assert_eq!(header.field("subject").unwrap().generate_value(), "hi");
    }

    #[test]
    fn parse_unfolds_continuations() {
        let data = b"Subject: a long\r\n subject line\r\n\r\n";
        let (header, _) = Header::parse(&registry(), data);
        assert_eq!(
            header.field("Subject").unwrap().generate_value(),
            "a long subject line"
        );
    }

    #[test]
    fn parse_tolerates_bare_lf() {
        let data = b"From: a@x.org\nTo: b@y.org\n\n";
        let (header, consumed) = Header::parse(&registry(), data);
        assert_eq!(header.fields().len(), 2);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn parse_without_separator_consumes_all() {
        let data = b"From: a@x.org\r\nTo: b@y.org\r\n";
        let (header, consumed) = Header::parse(&registry(), data);
        assert_eq!(header.fields().len(), 2);
        assert_eq!(consumed, data.len());
    }

    #[test]
    fn duplicate_fields_kept_in_order() {
        let data = b"Received: by a; Wed, 1 Jan 2020 00:00:00 +0000\r\n\
                     Received: by b; Wed, 1 Jan 2020 01:00:00 +0000\r\n\r\n";
        let (header, _) = Header::parse(&registry(), data);
        let received: Vec<_> = header.fields_named("Received").collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].relay().unwrap().by.as_deref(), Some("a"));
        assert_eq!(received[1].relay().unwrap().by.as_deref(), Some("b"));
    }

    #[test]
    fn missing_field_error() {
        let (header, _) = Header::parse(&registry(), b"\r\n");
        assert!(matches!(
            header.field("Subject"),
            Err(MimeError::NoSuchField(_))
        ));
    }

    #[test]
    fn remove_and_set() {
        let data = b"To: a@x.org\r\nTo: b@y.org\r\n\r\n";
        let (mut header, _) = Header::parse(&registry(), data);
        assert_eq!(header.remove("to"), 2);
        assert!(!header.has_field("To"));
        header.set(HeaderField::parse(&registry(), "To", "c@z.org"));
        assert_eq!(header.fields().len(), 1);
    }

    #[test]
    fn generate_parse_roundtrip() {
        let data = b"From: John Doe <john@example.org>\r\n\
                     To: <a@x.org>, <b@y.org>\r\n\
                     Subject: hello world\r\n\
                     Date: Wed, 1 Jan 2020 00:00:00 +0000\r\n\r\n";
        let r = registry();
        let (header, _) = Header::parse(&r, data);
        let mut out = String::new();
        header.generate(&mut out, 76);
        out.push_str("\r\n");
        let (reparsed, _) = Header::parse(&r, out.as_bytes());
        assert_eq!(reparsed, header);

        let mut out2 = String::new();
        reparsed.generate(&mut out2, 76);
        out2.push_str("\r\n");
        assert_eq!(out2, out);
    }
}
