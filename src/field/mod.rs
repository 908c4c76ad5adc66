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

//! Header fields: the typed value model and the name-keyed registry
//! that decides how each field parses.
//!
//! Parsing is lenient throughout: a value that does not fit its
//! registered grammar degrades to a generic text field instead of
//! failing the message.

pub mod address;
pub mod content;
pub mod date;
pub mod parameter;
pub mod relay;
pub mod utils;

use chrono::{DateTime, FixedOffset};

use crate::charset::Charset;
use crate::encoding::Encoding;
use crate::error::MimeError;
use crate::text::{EncodedText, FoldFlags, Word};

use address::{Address, Mailbox};
use content::{ContentDispositionValue, ContentTypeValue};
use relay::RelayValue;

/// A parsed header field value. The variant is chosen by the registry
/// from the field name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Unstructured raw text, kept verbatim.
    Generic(String),
    /// Free text with RFC 2047 encoded words (Subject, Comments).
    Text(EncodedText),
    /// Mailboxes only (From, Sender, Reply-To).
    MailboxList(Vec<Mailbox>),
    /// Mailboxes and groups (To, Cc, Bcc).
    AddressList(Vec<Address>),
    ContentType(ContentTypeValue),
    ContentDisposition(ContentDispositionValue),
    ContentEncoding(Encoding),
    /// Received trace clauses.
    Relay(RelayValue),
    Date(DateTime<FixedOffset>),
}

impl FieldValue {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Generic(_) => "generic",
            Self::Text(_) => "text",
            Self::MailboxList(_) => "mailbox-list",
            Self::AddressList(_) => "address-list",
            Self::ContentType(_) => "content-type",
            Self::ContentDisposition(_) => "content-disposition",
            Self::ContentEncoding(_) => "content-encoding",
            Self::Relay(_) => "relay",
            Self::Date(_) => "date",
        }
    }
}

/// How a field name parses, as registered in the FieldRegistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Generic,
    Text,
    MailboxList,
    AddressList,
    ContentType,
    ContentDisposition,
    ContentEncoding,
    Relay,
    Date,
}

/// Maps field names to value kinds. Populated once at startup via
/// register(); read-only afterwards. Lookup is case-insensitive;
/// unregistered names are Generic.
pub struct FieldRegistry {
    entries: Vec<(String, FieldKind)>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registry with the standard RFC 2822 and MIME field names.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for name in ["From", "Sender", "Reply-To", "Resent-From", "Resent-Sender"] {
            registry.register(name, FieldKind::MailboxList);
        }
        for name in ["To", "Cc", "Bcc", "Resent-To", "Resent-Cc", "Resent-Bcc"] {
            registry.register(name, FieldKind::AddressList);
        }
        for name in ["Subject", "Comments"] {
            registry.register(name, FieldKind::Text);
        }
        for name in ["Date", "Resent-Date"] {
            registry.register(name, FieldKind::Date);
        }
        registry.register("Received", FieldKind::Relay);
        registry.register("Content-Type", FieldKind::ContentType);
        registry.register("Content-Disposition", FieldKind::ContentDisposition);
        registry.register("Content-Transfer-Encoding", FieldKind::ContentEncoding);
        registry
    }

    pub fn register(&mut self, name: &str, kind: FieldKind) {
        self.entries.push((name.to_string(), kind));
    }

    pub fn resolve(&self, name: &str) -> FieldKind {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Generic)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A single header field: name plus typed value. The original name
/// spelling is preserved for regeneration.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderField {
    name: String,
    value: FieldValue,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Parse a field body according to the kind registered for name.
    /// A body that does not fit the registered grammar degrades to
    /// Generic, keeping the raw text.
    pub fn parse(registry: &FieldRegistry, name: &str, raw: &str) -> Self {
        let value = match registry.resolve(name) {
            FieldKind::Generic => None,
            FieldKind::Text => Some(FieldValue::Text(EncodedText::parse(raw.trim()))),
            FieldKind::MailboxList => {
                address::parse_mailbox_list(raw).map(FieldValue::MailboxList)
            }
            FieldKind::AddressList => {
                address::parse_address_list(raw).map(FieldValue::AddressList)
            }
            FieldKind::ContentType => ContentTypeValue::parse(raw).map(FieldValue::ContentType),
            FieldKind::ContentDisposition => {
                ContentDispositionValue::parse(raw).map(FieldValue::ContentDisposition)
            }
            FieldKind::ContentEncoding => {
                let token = raw.trim();
                utils::is_token(token)
                    .then(|| FieldValue::ContentEncoding(Encoding::new(token)))
            }
            FieldKind::Relay => Some(FieldValue::Relay(RelayValue::parse(raw))),
            FieldKind::Date => date::parse_date(raw).map(FieldValue::Date),
        };
        Self {
            name: name.to_string(),
            value: value.unwrap_or_else(|| FieldValue::Generic(raw.trim().to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut FieldValue {
        &mut self.value
    }

    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value;
    }

    /// Replace this field's value with a copy of another field's. The
    /// variants must match.
    pub fn copy_from(&mut self, other: &HeaderField) -> Result<(), MimeError> {
        if std::mem::discriminant(&self.value) != std::mem::discriminant(&other.value) {
            return Err(MimeError::TypeMismatch {
                expected: self.value.variant_name(),
                found: other.value.variant_name(),
            });
        }
        self.value = other.value.clone();
        Ok(())
    }

    /// Write "Name: value" folded to max_line_length, without the final
    /// CRLF. Returns the column after the last character.
    pub fn generate(&self, out: &mut String, max_line_length: usize) -> usize {
        out.push_str(&self.name);
        out.push_str(": ");
        let col = self.name.len() + 2;
        self.write_value(out, max_line_length, col)
    }

    /// Canonical unfolded value text.
    pub fn generate_value(&self) -> String {
        let mut out = String::new();
        self.write_value(&mut out, usize::MAX, 0);
        out
    }

    fn write_value(&self, out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
        match &self.value {
            FieldValue::Generic(raw) => {
                // Raw text is folded at existing spaces only, never
                // re-encoded.
                let text = single_word_text(raw);
                text.encode_and_fold(
                    out,
                    max_line_length,
                    cur_pos,
                    FoldFlags {
                        force_no_encoding: true,
                    },
                )
            }
            FieldValue::Text(text) => {
                text.encode_and_fold(out, max_line_length, cur_pos, FoldFlags::default())
            }
            FieldValue::MailboxList(list) => {
                let items: Vec<String> = list.iter().map(Mailbox::generate).collect();
                fold_list(&items, out, max_line_length, cur_pos)
            }
            FieldValue::AddressList(list) => {
                let items: Vec<String> = list.iter().map(Address::generate).collect();
                fold_list(&items, out, max_line_length, cur_pos)
            }
            FieldValue::ContentType(ct) => ct.generate(out, max_line_length, cur_pos),
            FieldValue::ContentDisposition(cd) => cd.generate(out, max_line_length, cur_pos),
            FieldValue::ContentEncoding(encoding) => {
                out.push_str(encoding.name());
                cur_pos + encoding.name().len()
            }
            FieldValue::Relay(relay) => {
                let text = single_word_text(&relay.generate());
                text.encode_and_fold(
                    out,
                    max_line_length,
                    cur_pos,
                    FoldFlags {
                        force_no_encoding: true,
                    },
                )
            }
            FieldValue::Date(dt) => {
                let text = date::generate_date(dt);
                out.push_str(&text);
                cur_pos + text.len()
            }
        }
    }

    pub fn text(&self) -> Result<&EncodedText, MimeError> {
        match &self.value {
            FieldValue::Text(v) => Ok(v),
            other => Err(mismatch("text", other)),
        }
    }

    pub fn mailboxes(&self) -> Result<&Vec<Mailbox>, MimeError> {
        match &self.value {
            FieldValue::MailboxList(v) => Ok(v),
            other => Err(mismatch("mailbox-list", other)),
        }
    }

    pub fn addresses(&self) -> Result<&Vec<Address>, MimeError> {
        match &self.value {
            FieldValue::AddressList(v) => Ok(v),
            other => Err(mismatch("address-list", other)),
        }
    }

    pub fn content_type(&self) -> Result<&ContentTypeValue, MimeError> {
        match &self.value {
            FieldValue::ContentType(v) => Ok(v),
            other => Err(mismatch("content-type", other)),
        }
    }

    pub fn content_disposition(&self) -> Result<&ContentDispositionValue, MimeError> {
        match &self.value {
            FieldValue::ContentDisposition(v) => Ok(v),
            other => Err(mismatch("content-disposition", other)),
        }
    }

    pub fn content_encoding(&self) -> Result<&Encoding, MimeError> {
        match &self.value {
            FieldValue::ContentEncoding(v) => Ok(v),
            other => Err(mismatch("content-encoding", other)),
        }
    }

    pub fn relay(&self) -> Result<&RelayValue, MimeError> {
        match &self.value {
            FieldValue::Relay(v) => Ok(v),
            other => Err(mismatch("relay", other)),
        }
    }

    pub fn date(&self) -> Result<&DateTime<FixedOffset>, MimeError> {
        match &self.value {
            FieldValue::Date(v) => Ok(v),
            other => Err(mismatch("date", other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &FieldValue) -> MimeError {
    MimeError::TypeMismatch {
        expected,
        found: found.variant_name(),
    }
}

fn single_word_text(s: &str) -> EncodedText {
    let mut text = EncodedText::new();
    if !s.is_empty() {
        text.append_word(Word::new(s.as_bytes().to_vec(), Charset::us_ascii()));
    }
    text
}

/// Emit comma-separated items, folding before an item that would
/// overflow the line budget.
fn fold_list(items: &[String], out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
    let mut col = cur_pos;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
            col += 1;
            if col + 1 + item.len() > max_line_length && col > 1 {
                out.push_str("\r\n ");
                col = 1;
            } else {
                out.push(' ');
                col += 1;
            }
        }
        out.push_str(item);
        col += item.len();
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FieldRegistry {
        FieldRegistry::with_defaults()
    }

    #[test]
    fn registry_resolve_case_insensitive() {
        let r = registry();
        assert_eq!(r.resolve("SUBJECT"), FieldKind::Text);
        assert_eq!(r.resolve("content-type"), FieldKind::ContentType);
        assert_eq!(r.resolve("X-Custom"), FieldKind::Generic);
    }

    #[test]
    fn parse_typed_fields() {
        let r = registry();
        let f = HeaderField::parse(&r, "From", "a@x.org");
        assert_eq!(f.mailboxes().unwrap().len(), 1);
        let f = HeaderField::parse(&r, "Date", "Wed, 1 Jan 2020 00:00:00 +0000");
        assert!(f.date().is_ok());
        let f = HeaderField::parse(&r, "Content-Transfer-Encoding", "BASE64");
        assert_eq!(f.content_encoding().unwrap(), &Encoding::base64());
    }

    #[test]
    fn parse_degrades_to_generic() {
        let r = registry();
        let f = HeaderField::parse(&r, "Date", "yesterday sometime");
        assert!(matches!(f.value(), FieldValue::Generic(raw) if raw == "yesterday sometime"));
        let f = HeaderField::parse(&r, "From", "not an address");
        assert!(matches!(f.value(), FieldValue::Generic(_)));
    }

    #[test]
    fn accessor_type_mismatch() {
        let r = registry();
        let f = HeaderField::parse(&r, "Subject", "hello");
        let err = f.date().unwrap_err();
        assert!(matches!(
            err,
            MimeError::TypeMismatch {
                expected: "date",
                found: "text"
            }
        ));
    }

    #[test]
    fn copy_from_checks_variant() {
        let r = registry();
        let mut a = HeaderField::parse(&r, "Subject", "one");
        let b = HeaderField::parse(&r, "Subject", "two");
        a.copy_from(&b).unwrap();
        assert_eq!(a.generate_value(), "two");

        let c = HeaderField::parse(&r, "Date", "Wed, 1 Jan 2020 00:00:00 +0000");
        assert!(a.copy_from(&c).is_err());
    }

    #[test]
    fn generate_subject_plain() {
        let r = registry();
        let f = HeaderField::parse(&r, "Subject", "hello world");
        let mut out = String::new();
        f.generate(&mut out, 76);
        assert_eq!(out, "Subject: hello world");
    }

    #[test]
    fn generate_mailbox_list_folds() {
        let list: Vec<Mailbox> = (0..6)
            .map(|i| Mailbox::new(None::<&str>, format!("user{}", i), "example.org"))
            .collect();
        let f = HeaderField::new("To", FieldValue::MailboxList(list));
        let mut out = String::new();
        f.generate(&mut out, 40);
        for line in out.split("\r\n") {
            assert!(line.len() <= 40, "{:?}", line);
        }
        assert!(out.contains("\r\n "));
    }

    #[test]
    fn generate_value_unfolded() {
        let r = registry();
        let f = HeaderField::parse(
            &r,
            "Received",
            "from a.b.com by c.d.com with ESMTP id 123; Wed, 1 Jan 2020 00:00:00 +0000",
        );
        assert_eq!(
            f.generate_value(),
            "from a.b.com by c.d.com with ESMTP id 123; Wed, 1 Jan 2020 00:00:00 +0000"
        );
    }

    #[test]
    fn generate_value_never_folds() {
        // Long encoded text still chunks at the 75-character encoded-word
        // cap; the unfolded value must join chunks without line breaks.
        let long = "\u{e9}".repeat(80);
        let f = HeaderField::new(
            "Subject",
            FieldValue::Text(EncodedText::from_string(&long, &Charset::utf_8())),
        );
        assert!(!f.generate_value().contains('\r'));
    }

    #[test]
    fn generic_preserved_verbatim() {
        let r = registry();
        let f = HeaderField::parse(&r, "X-Mailer", "plico 0.1 (unreleased)");
        assert_eq!(f.generate_value(), "plico 0.1 (unreleased)");
    }
}
