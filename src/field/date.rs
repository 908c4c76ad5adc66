/*
 * date.rs
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

//! RFC 2822 date-time parsing and generation, with the obsolete forms
//! (two-digit years, named zones) still seen in archived mail.

use chrono::{DateTime, FixedOffset};

use super::utils::strip_comments;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const OBSOLETE_ZONES: [(&str, &str); 11] = [
    ("UT", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
];

/// Parse an RFC 2822 date-time. Comments are stripped first; if the
/// strict grammar fails, obsolete year and zone forms are normalized and
/// the parse retried. Returns None for text that is not a date.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = strip_comments(raw);
    if let Ok(dt) = DateTime::parse_from_rfc2822(&cleaned) {
        return Some(dt);
    }
    let normalized = normalize_obsolete(&cleaned)?;
    DateTime::parse_from_rfc2822(&normalized).ok()
}

/// Canonical RFC 2822 text for a date-time.
pub fn generate_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc2822()
}

/// Rewrite obsolete year and zone tokens into the strict grammar:
/// two-digit years pivot at 50, three-digit years add 1900, and named
/// zones become numeric offsets.
fn normalize_obsolete(cleaned: &str) -> Option<String> {
    let mut tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return None;
    }

    let month_index = tokens.iter().position(|t| {
        MONTHS.iter().any(|m| t.eq_ignore_ascii_case(m))
    })?;
    if let Some(year) = tokens.get_mut(month_index + 1) {
        if year.chars().all(|c| c.is_ascii_digit()) {
            match year.len() {
                2 => {
                    let n: u32 = year.parse().ok()?;
                    *year = format!("{}", if n < 50 { 2000 + n } else { 1900 + n });
                }
                3 => {
                    let n: u32 = year.parse().ok()?;
                    *year = format!("{}", 1900 + n);
                }
                _ => {}
            }
        }
    }

    if let Some(zone) = tokens.last_mut() {
        if zone.chars().all(|c| c.is_ascii_alphabetic()) {
            let mapped = OBSOLETE_ZONES
                .iter()
                .find(|(name, _)| zone.eq_ignore_ascii_case(name))
                .map(|(_, offset)| *offset)
                // Military single-letter zones carry no reliable offset.
                .or_else(|| (zone.len() == 1).then_some("+0000"))?;
            *zone = mapped.to_string();
        }
    }

    Some(tokens.join(" "))
}
