/*
 * context.rs
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

//! The library context: registries and defaults threaded explicitly
//! through parse and generate instead of process globals. Build one at
//! startup, register any custom fields or codecs, then share it.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::charset::Charset;
use crate::encoding::EncoderRegistry;
use crate::field::FieldRegistry;

pub struct MailContext {
    fields: FieldRegistry,
    encoders: EncoderRegistry,
    default_charset: Charset,
    max_line_length: usize,
}

impl MailContext {
    /// Context with the standard field and encoder registries, the
    /// locale charset, and the RFC 2822 recommended line length.
    pub fn new() -> Self {
        Self {
            fields: FieldRegistry::with_defaults(),
            encoders: EncoderRegistry::with_defaults(),
            default_charset: Charset::locale(),
            max_line_length: 76,
        }
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldRegistry {
        &mut self.fields
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn encoders_mut(&mut self) -> &mut EncoderRegistry {
        &mut self.encoders
    }

    pub fn default_charset(&self) -> &Charset {
        &self.default_charset
    }

    pub fn set_default_charset(&mut self, charset: Charset) {
        self.default_charset = charset;
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn set_max_line_length(&mut self, max_line_length: usize) {
        self.max_line_length = max_line_length;
    }

    /// A fresh multipart boundary: process id, clock and random salt.
    /// The "=_" prefix cannot occur in quoted-printable output, so an
    /// encoded body can never collide with it.
    pub fn generate_boundary(&self) -> String {
        format!(
            "=_{:x}_{:x}{:08x}",
            std::process::id(),
            unix_seconds(),
            rand::thread_rng().gen::<u32>()
        )
    }

    /// A fresh Message-ID: <random.pid.time@hostname>.
    pub fn generate_message_id(&self, hostname: &str) -> String {
        format!(
            "<{:08x}.{:x}.{:x}@{}>",
            rand::thread_rng().gen::<u32>(),
            std::process::id(),
            unix_seconds(),
            hostname
        )
    }
}

impl Default for MailContext {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_shape() {
        let ctx = MailContext::new();
        let boundary = ctx.generate_boundary();
        assert!(boundary.starts_with("=_"));
        assert!(boundary.len() <= 70);
        let other = ctx.generate_boundary();
        assert_ne!(boundary, other);
    }

    #[test]
    fn message_id_shape() {
        let ctx = MailContext::new();
        let id = ctx.generate_message_id("mail.example.org");
        assert!(id.starts_with('<'));
        assert!(id.ends_with("@mail.example.org>"));
        assert_ne!(id, ctx.generate_message_id("mail.example.org"));
    }

    #[test]
    fn defaults() {
        let ctx = MailContext::new();
        assert_eq!(ctx.max_line_length(), 76);
        assert!(!ctx.default_charset().name().is_empty());
    }
}
