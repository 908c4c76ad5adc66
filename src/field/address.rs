/*
 * address.rs
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

//! RFC 2822 mailboxes and address lists (From, To, Cc, etc.), including
//! group syntax and encoded-word display names.

use crate::charset::Charset;
use crate::text::{EncodedText, FoldFlags};

/// A single mailbox: optional display name plus local-part@domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub display_name: Option<String>,
    pub local_part: String,
    pub domain: String,
}

impl Mailbox {
    pub fn new(
        display_name: Option<impl Into<String>>,
        local_part: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.map(|s| s.into()),
            local_part: local_part.into(),
            domain: domain.into(),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Full address: local-part@domain.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }

    /// Header text for this mailbox. Non-ASCII display names become
    /// encoded words; names containing specials are quoted.
    pub fn generate(&self) -> String {
        format_mailbox(self.display_name.as_deref(), &self.local_part, &self.domain)
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generate())
    }
}

/// An address list entry: either a mailbox or an RFC 2822 group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Mailbox(Mailbox),
    Group { name: String, mailboxes: Vec<Mailbox> },
}

impl Address {
    pub fn generate(&self) -> String {
        match self {
            Self::Mailbox(mb) => mb.generate(),
            Self::Group { name, mailboxes } => {
                let members: Vec<String> = mailboxes.iter().map(Mailbox::generate).collect();
                format!("{}: {};", encode_display_name(name), members.join(", "))
            }
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generate())
    }
}

/// Format a mailbox for a header. The domain may be empty for
/// local-only delivery addresses.
pub fn format_mailbox(display_name: Option<&str>, local_part: &str, domain: &str) -> String {
    let addr = if domain.is_empty() {
        local_part.to_string()
    } else {
        format!("{}@{}", local_part, domain)
    };
    match display_name {
        Some(dn) if !dn.is_empty() => format!("{} <{}>", encode_display_name(dn), addr),
        _ => format!("<{}>", addr),
    }
}

fn encode_display_name(name: &str) -> String {
    if !name.is_ascii() {
        let mut out = String::new();
        EncodedText::from_string(name, &Charset::utf_8()).encode_and_fold(
            &mut out,
            usize::MAX,
            0,
            FoldFlags::default(),
        );
        out
    } else if name
        .bytes()
        .any(|b| matches!(b, b',' | b';' | b':' | b'<' | b'>' | b'@' | b'"' | b'(' | b')'))
    {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        name.to_string()
    }
}

fn decode_display_name(raw: &str) -> String {
    if raw.contains("=?") {
        EncodedText::parse(raw).decoded_text()
    } else {
        raw.to_string()
    }
}

/// Parse a comma-separated mailbox list. Group syntax is not accepted
/// here; use parse_address_list for To/Cc style fields. Returns None
/// when nothing parseable is found.
pub fn parse_mailbox_list(value: &str) -> Option<Vec<Mailbox>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut out = Vec::new();

    while pos < len {
        skip_ws(bytes, len, &mut pos);
        if pos >= len {
            break;
        }
        let mb = parse_mailbox(bytes, len, &mut pos)?;
        out.push(mb);
        skip_ws(bytes, len, &mut pos);
        if pos < len && bytes[pos] == b',' {
            pos += 1;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Parse a comma-separated address list, accepting both mailboxes and
/// "name: mailbox, mailbox;" groups.
pub fn parse_address_list(value: &str) -> Option<Vec<Address>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut pos = 0;
    let mut out = Vec::new();

    while pos < len {
        skip_ws(bytes, len, &mut pos);
        if pos >= len {
            break;
        }
        if let Some(colon) = find_group_colon(bytes, len, pos) {
            let name = std::str::from_utf8(&bytes[pos..colon]).ok()?.trim();
            let name = decode_display_name(&unquote(name));
            pos = colon + 1;
            let mut members = Vec::new();
            loop {
                skip_ws(bytes, len, &mut pos);
                if pos >= len || bytes[pos] == b';' {
                    if pos < len {
                        pos += 1;
                    }
                    break;
                }
                let mb = parse_mailbox(bytes, len, &mut pos)?;
                members.push(mb);
                skip_ws(bytes, len, &mut pos);
                if pos < len && bytes[pos] == b',' {
                    pos += 1;
                }
            }
            out.push(Address::Group {
                name,
                mailboxes: members,
            });
        } else {
            let mb = parse_mailbox(bytes, len, &mut pos)?;
            out.push(Address::Mailbox(mb));
        }
        skip_ws(bytes, len, &mut pos);
        if pos < len && bytes[pos] == b',' {
            pos += 1;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn skip_ws(bytes: &[u8], len: usize, pos: &mut usize) {
    while *pos < len
        && (bytes[*pos] == b' ' || bytes[*pos] == b'\t' || bytes[*pos] == b'\r' || bytes[*pos] == b'\n')
    {
        *pos += 1;
    }
}

/// Position of a ':' introducing group syntax, if this entry is a group:
/// a colon before any of '<', '@', ',' or ';'. Quoted strings are opaque.
fn find_group_colon(bytes: &[u8], len: usize, start: usize) -> Option<usize> {
    let mut i = start;
    let mut in_quotes = false;
    while i < len {
        let b = bytes[i];
        if b == b'\\' && in_quotes && i + 1 < len {
            i += 2;
            continue;
        }
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match b {
                b':' => return Some(i),
                b'<' | b'@' | b',' | b';' => return None,
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let inner = &s[1..s.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut escaped = false;
        for c in inner.chars() {
            if escaped {
                out.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                out.push(c);
            }
        }
        out
    } else {
        s.to_string()
    }
}

fn parse_mailbox(bytes: &[u8], len: usize, pos: &mut usize) -> Option<Mailbox> {
    if *pos >= len {
        return None;
    }
    let mut display_name: Option<String> = None;
    if bytes[*pos] == b'"' {
        *pos += 1;
        let start = *pos;
        while *pos < len {
            if bytes[*pos] == b'\\' && *pos + 1 < len {
                *pos += 2;
                continue;
            }
            if bytes[*pos] == b'"' {
                let raw = String::from_utf8_lossy(&bytes[start..*pos]).into_owned();
                display_name = Some(decode_display_name(&raw));
                *pos += 1;
                break;
            }
            *pos += 1;
        }
        skip_ws(bytes, len, pos);
    }
    let (local, domain) = if let Some(angle) = find_angle(bytes, len, *pos) {
        // Unquoted phrase before the angle bracket is the display name.
        if display_name.is_none() && angle > *pos {
            let phrase = String::from_utf8_lossy(&bytes[*pos..angle]);
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                display_name = Some(decode_display_name(phrase));
            }
        }
        *pos = angle + 1;
        let start = *pos;
        while *pos < len && bytes[*pos] != b'>' {
            *pos += 1;
        }
        if *pos >= len {
            return None;
        }
        let inner = std::str::from_utf8(&bytes[start..*pos]).ok()?;
        *pos += 1;
        split_addr_spec(inner)?
    } else {
        let start = *pos;
        while *pos < len && bytes[*pos] != b',' && bytes[*pos] != b';' {
            *pos += 1;
        }
        let part = std::str::from_utf8(&bytes[start..*pos]).ok()?.trim();
        split_addr_spec(part)?
    };
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(Mailbox::new(display_name, local, domain))
}

/// Index of a '<' belonging to this entry: before any ',' or ';'
/// outside quoted strings.
fn find_angle(bytes: &[u8], len: usize, start: usize) -> Option<usize> {
    let mut i = start;
    let mut in_quotes = false;
    while i < len {
        let b = bytes[i];
        if b == b'\\' && in_quotes && i + 1 < len {
            i += 2;
            continue;
        }
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match b {
                b'<' => return Some(i),
                b',' | b';' => return None,
                _ => {}
            }
        }
        i += 1;
    }
    None
}

fn split_addr_spec(spec: &str) -> Option<(String, String)> {
    let at = spec.rfind('@')?;
    if at == 0 || at >= spec.len() - 1 {
        return None;
    }
    Some((
        spec[..at].trim().to_string(),
        spec[at + 1..].trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_address() {
        let list = parse_mailbox_list("alice@example.org").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].address(), "alice@example.org");
        assert!(list[0].display_name.is_none());
    }

    #[test]
    fn parse_quoted_display_name() {
        let list = parse_mailbox_list("\"Doe, John\" <john@example.org>").unwrap();
        assert_eq!(list[0].display_name(), Some("Doe, John"));
        assert_eq!(list[0].local_part, "john");
        assert_eq!(list[0].domain, "example.org");
    }

    #[test]
    fn parse_unquoted_display_name() {
        let list = parse_mailbox_list("John Doe <john@example.org>").unwrap();
        assert_eq!(list[0].display_name(), Some("John Doe"));
    }

    #[test]
    fn parse_list_of_three() {
        let list =
            parse_mailbox_list("a@x.org, B <b@x.org>, \"C\" <c@x.org>").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].display_name(), Some("B"));
        assert_eq!(list[2].address(), "c@x.org");
    }

    #[test]
    fn parse_encoded_word_display_name() {
        let list = parse_mailbox_list("=?utf-8?B?Sm9zw6k=?= <jose@example.org>").unwrap();
        assert_eq!(list[0].display_name(), Some("José"));
    }

    #[test]
    fn parse_group() {
        let list = parse_address_list("friends: a@x.org, b@x.org;, c@y.org").unwrap();
        assert_eq!(list.len(), 2);
        match &list[0] {
            Address::Group { name, mailboxes } => {
                assert_eq!(name, "friends");
                assert_eq!(mailboxes.len(), 2);
            }
            other => panic!("expected group, got {:?}", other),
        }
        match &list[1] {
            Address::Mailbox(mb) => assert_eq!(mb.address(), "c@y.org"),
            other => panic!("expected mailbox, got {:?}", other),
        }
    }

    #[test]
    fn parse_empty_group() {
        let list = parse_address_list("undisclosed-recipients:;").unwrap();
        match &list[0] {
            Address::Group { name, mailboxes } => {
                assert_eq!(name, "undisclosed-recipients");
                assert!(mailboxes.is_empty());
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn parse_garbage_is_none() {
        assert!(parse_mailbox_list("not an address").is_none());
        assert!(parse_mailbox_list("").is_none());
    }

    #[test]
    fn generate_plain() {
        let mb = Mailbox::new(Some("John Doe"), "john", "example.org");
        assert_eq!(mb.generate(), "John Doe <john@example.org>");
        let mb = Mailbox::new(None::<&str>, "john", "example.org");
        assert_eq!(mb.generate(), "<john@example.org>");
    }

    #[test]
    fn generate_quotes_specials() {
        let mb = Mailbox::new(Some("Doe, John"), "john", "example.org");
        assert_eq!(mb.generate(), "\"Doe, John\" <john@example.org>");
    }

    #[test]
    fn generate_encodes_non_ascii() {
        let mb = Mailbox::new(Some("José"), "jose", "example.org");
        let text = mb.generate();
        assert!(text.starts_with("=?utf-8?"), "{}", text);
        let reparsed = parse_mailbox_list(&text).unwrap();
        assert_eq!(reparsed[0].display_name(), Some("José"));
    }

    #[test]
    fn generate_group_roundtrip() {
        let group = Address::Group {
            name: "team".to_string(),
            mailboxes: vec![
                Mailbox::new(None::<&str>, "a", "x.org"),
                Mailbox::new(Some("B"), "b", "x.org"),
            ],
        };
        let text = group.generate();
        assert_eq!(text, "team: <a@x.org>, B <b@x.org>;");
        let reparsed = parse_address_list(&text).unwrap();
        assert_eq!(reparsed[0], group);
    }
}
