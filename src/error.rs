/*
 * error.rs
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

//! Errors surfaced by parsing, generation, encoding and transcoding.

use std::fmt;
use std::io;

/// Errors from the MIME document model. Structural parsing is lenient and
/// degrades to generic values instead of returning these; hard failures are
/// reserved for genuinely unsupported requests and stream I/O.
#[derive(Debug)]
pub enum MimeError {
    /// No transcoder available for the requested charset pair.
    ConversionUnavailable { source: String, dest: String },
    /// Content-transfer-encoding name not present in the encoder registry.
    UnknownEncoding(String),
    /// Field accessed or copied as the wrong concrete variant.
    TypeMismatch { expected: &'static str, found: &'static str },
    /// Header lookup by name found nothing.
    NoSuchField(String),
    /// Underlying byte source/sink failure during a streaming operation.
    Io(io::Error),
}

impl fmt::Display for MimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimeError::ConversionUnavailable { source, dest } => {
                write!(f, "no charset conversion from {} to {}", source, dest)
            }
            MimeError::UnknownEncoding(name) => {
                write!(f, "unknown content-transfer-encoding {}", name)
            }
            MimeError::TypeMismatch { expected, found } => {
                write!(f, "field type mismatch: expected {}, found {}", expected, found)
            }
            MimeError::NoSuchField(name) => write!(f, "no such field {}", name),
            MimeError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MimeError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MimeError {
    fn from(e: io::Error) -> Self {
        MimeError::Io(e)
    }
}
