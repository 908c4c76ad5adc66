/*
 * lib.rs
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

//! MIME document model: parse RFC 2822 / MIME messages into a typed
//! part tree, edit it, and regenerate bytes. Generation is
//! byte-faithful: a generate/parse/generate cycle reproduces the exact
//! output, leaf bodies are never re-encoded, and multipart prologs and
//! epilogs survive. Decoding (transfer encodings, charsets, RFC 2047
//! words) is explicit and on demand.
//!
//! All registries and defaults live in a [MailContext] built at
//! startup; nothing is process-global.

pub mod body;
pub mod charset;
pub mod context;
pub mod encoding;
pub mod error;
pub mod field;
pub mod header;
pub mod part;
pub mod text;

pub use body::{is_valid_boundary, Body};
pub use charset::{convert_bytes, convert_stream, Charset};
pub use context::MailContext;
pub use encoding::{Codec, CodecOptions, EncoderRegistry, Encoding};
pub use error::MimeError;
pub use field::address::{format_mailbox, parse_address_list, parse_mailbox_list, Address, Mailbox};
pub use field::content::{ContentDispositionValue, ContentTypeValue};
pub use field::parameter::{Parameter, ParameterList};
pub use field::relay::RelayValue;
pub use field::{FieldKind, FieldRegistry, FieldValue, HeaderField};
pub use header::Header;
pub use part::{BodyPart, PartPath};
pub use text::{EncodedText, FoldFlags, Word};
