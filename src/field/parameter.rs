/*
 * parameter.rs
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

//! Field parameters (RFC 2045 name=value pairs). Order is preserved so
//! regeneration is byte-stable; lookup is case-insensitive.

use super::utils::{is_token, is_token_char};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Canonical name=value text, quoting the value when it is not a
    /// plain token.
    pub fn generate(&self) -> String {
        if is_token(&self.value) {
            format!("{}={}", self.name, self.value)
        } else {
            let escaped = self.value.replace('\\', "\\\\").replace('"', "\\\"");
            format!("{}=\"{}\"", self.name, escaped)
        }
    }
}

/// Ordered parameter list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the first parameter of this name, or append a new one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .parameters
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            Some(p) => p.value = value,
            None => self.parameters.push(Parameter::new(name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.parameters.retain(|p| !p.name.eq_ignore_ascii_case(name));
    }

    /// Parse a semicolon-separated parameter list (name=value;
    /// name="value"). Fragments that do not fit the grammar are skipped,
    /// never fatal.
    pub fn parse(params_part: &str) -> Self {
        let mut list = Self::new();
        let bytes = params_part.as_bytes();
        let len = bytes.len();
        let mut pos = 0;

        while pos < len {
            while pos < len && (bytes[pos] == b';' || bytes[pos].is_ascii_whitespace()) {
                pos += 1;
            }
            if pos >= len {
                break;
            }
            let eq = match bytes[pos..].iter().position(|&b| b == b'=') {
                Some(i) => pos + i,
                None => break,
            };
            let name = match std::str::from_utf8(&bytes[pos..eq]) {
                Ok(s) => s.trim(),
                Err(_) => break,
            };
            if !is_token(name) {
                match bytes[pos..].iter().position(|&b| b == b';') {
                    Some(semi) => {
                        pos += semi + 1;
                        continue;
                    }
                    None => break,
                }
            }
            pos = eq + 1;
            if pos < len && bytes[pos] == b'"' {
                pos += 1;
                let mut value = String::new();
                while pos < len {
                    let c = bytes[pos];
                    if c == b'\\' && pos + 1 < len {
                        value.push(bytes[pos + 1] as char);
                        pos += 2;
                    } else if c == b'"' {
                        pos += 1;
                        break;
                    } else {
                        value.push(c as char);
                        pos += 1;
                    }
                }
                list.parameters.push(Parameter::new(name, value));
            } else {
                let end = bytes[pos..]
                    .iter()
                    .position(|&b| b == b';')
                    .map(|i| pos + i)
                    .unwrap_or(len);
                let value: String = bytes[pos..end]
                    .iter()
                    .map(|&b| b as char)
                    .collect::<String>()
                    .trim()
                    .chars()
                    .filter(|&c| is_token_char(c as u8) || c == ' ')
                    .collect();
                pos = end;
                if !value.is_empty() {
                    list.parameters.push(Parameter::new(name, value.trim()));
                }
            }
        }
        list
    }

    /// Append "; name=value" segments, folding before a segment that
    /// would overflow the line budget. Returns the new column.
    pub fn generate(&self, out: &mut String, max_line_length: usize, cur_pos: usize) -> usize {
        let mut col = cur_pos;
        for parameter in &self.parameters {
            let segment = parameter.generate();
            out.push(';');
            col += 1;
            if col + 1 + segment.len() > max_line_length && col > 1 {
                out.push_str("\r\n ");
                col = 1;
            } else {
                out.push(' ');
                col += 1;
            }
            out.push_str(&segment);
            col += segment.len();
        }
        col
    }
}
