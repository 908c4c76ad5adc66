/*
 * content.rs
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

//! Content-Type and Content-Disposition values (RFC 2045, RFC 2183).

use super::parameter::ParameterList;
use super::utils::is_token;

/// A media type with its parameter list. Types and subtypes compare
/// case-insensitively; parameter order is preserved for regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeValue {
    primary_type: String,
    sub_type: String,
    parameters: ParameterList,
}

impl ContentTypeValue {
    pub fn new(primary_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into(),
            sub_type: sub_type.into(),
            parameters: ParameterList::new(),
        }
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn is_primary_type(&self, t: &str) -> bool {
        self.primary_type.eq_ignore_ascii_case(t)
    }

    pub fn is_mime_type(&self, primary: &str, sub: &str) -> bool {
        self.is_primary_type(primary) && self.sub_type.eq_ignore_ascii_case(sub)
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    pub fn boundary(&self) -> Option<&str> {
        self.parameters.get("boundary")
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset")
    }

    /// Parse a Content-Type value: type "/" subtype *(";" parameter).
    /// Returns None when there is no valid type/subtype pair.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let (type_part, params_part) = match value.find(';') {
            Some(i) => {
                let (a, b) = value.split_at(i);
                (a.trim(), &b[1..])
            }
            None => (value, ""),
        };
        let slash = type_part.find('/')?;
        let primary = type_part[..slash].trim();
        let sub = type_part[slash + 1..].trim();
        if !is_token(primary) || !is_token(sub) {
            return None;
        }
        Some(Self {
            primary_type: primary.to_string(),
            sub_type: sub.to_string(),
            parameters: ParameterList::parse(params_part),
        })
    }

    /// Write the canonical value, folding parameters to the line budget.
    /// Returns the new column.
    pub fn generate(&self, out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
        out.push_str(&self.primary_type);
        out.push('/');
        out.push_str(&self.sub_type);
        let col = cur_pos + self.primary_type.len() + 1 + self.sub_type.len();
        self.parameters.generate(out, max_line_length, col)
    }
}

impl std::fmt::Display for ContentTypeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.primary_type, self.sub_type)
    }
}

/// A Content-Disposition value: disposition type plus parameters
/// (filename, size, dates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDispositionValue {
    disposition_type: String,
    parameters: ParameterList,
}

impl ContentDispositionValue {
    pub fn new(disposition_type: impl Into<String>) -> Self {
        Self {
            disposition_type: disposition_type.into(),
            parameters: ParameterList::new(),
        }
    }

    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    pub fn is_disposition_type(&self, t: &str) -> bool {
        self.disposition_type.eq_ignore_ascii_case(t)
    }

    pub fn parameters(&self) -> &ParameterList {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterList {
        &mut self.parameters
    }

    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename")
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let (type_part, params_part) = match value.find(';') {
            Some(i) => {
                let (a, b) = value.split_at(i);
                (a.trim(), &b[1..])
            }
            None => (value, ""),
        };
        if !is_token(type_part) {
            return None;
        }
        Some(Self {
            disposition_type: type_part.to_string(),
            parameters: ParameterList::parse(params_part),
        })
    }

    pub fn generate(&self, out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
        out.push_str(&self.disposition_type);
        let col = cur_pos + self.disposition_type.len();
        self.parameters.generate(out, max_line_length, col)
    }
}
