/*
 * relay.rs
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

//! Received trace fields (RFC 2822 section 3.6.7):
//!
//! ```text
//! received    =  "Received" ":"
//!                   ["from" domain]           ; sending host
//!                   ["by"   domain]           ; receiving host
//!                   ["via"  atom]             ; physical path
//!                  *("with" atom)             ; link/mail protocol
//!                   ["id"   msg-id]           ; receiver msg id
//!                   ["for"  addr-spec]        ; initial form
//!                   ";" date-time
//! ```

use chrono::{DateTime, FixedOffset};

use super::date;

/// The parsed clauses of a Received field. "with" repeats; the other
/// clauses appear at most once. A value with no ';' stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayValue {
    pub from: Option<String>,
    pub by: Option<String>,
    pub via: Option<String>,
    pub with: Vec<String>,
    pub id: Option<String>,
    pub for_: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Clause {
    From,
    By,
    Via,
    With,
    Id,
    For,
}

/// Minimum-prefix keyword match, case-insensitive. Checked in grammar
/// order; the whole word is consumed when it matches.
fn keyword(word: &str) -> Option<Clause> {
    const TABLE: [(&str, usize, Clause); 6] = [
        ("from", 4, Clause::From),
        ("by", 2, Clause::By),
        ("via", 2, Clause::Via),
        ("with", 2, Clause::With),
        ("id", 2, Clause::Id),
        ("for", 2, Clause::For),
    ];
    for (name, n, clause) in TABLE {
        if word.len() >= n && word.as_bytes()[..n].eq_ignore_ascii_case(&name.as_bytes()[..n]) {
            return Some(clause);
        }
    }
    None
}

/// True when the word opens a comment it does not close.
fn opens_comment(word: &str) -> bool {
    match word.rfind('(') {
        Some(open) => !word[open..].contains(')'),
        None => false,
    }
}

impl RelayValue {
    /// Parse a Received value. The date is everything after the last
    /// ';'; the part before it is tokenized on whitespace, with keyword
    /// words starting a new clause and everything else accumulating into
    /// the current one. Comment spans suppress keyword matching. Never
    /// fails; unusable input produces an empty value.
    pub fn parse(raw: &str) -> Self {
        let mut relay = Self::default();
        let semi = match raw.rfind(';') {
            Some(i) => i,
            None => return relay,
        };
        relay.date = date::parse_date(&raw[semi + 1..]);

        let mut clause: Option<Clause> = None;
        let mut accum: Vec<String> = Vec::new();
        let mut in_comment = false;

        for token in raw[..semi].split_whitespace() {
            let mut word = token;
            if in_comment {
                match word.find(')') {
                    Some(par) => {
                        accum.push(word[..=par].to_string());
                        word = &word[par + 1..];
                        in_comment = false;
                    }
                    None => {
                        accum.push(word.to_string());
                        continue;
                    }
                }
                if word.is_empty() {
                    continue;
                }
            }
            match keyword(word) {
                Some(next) => {
                    relay.flush(clause, &mut accum);
                    clause = Some(next);
                }
                None => {
                    if opens_comment(word) {
                        in_comment = true;
                    }
                    accum.push(word.to_string());
                }
            }
        }
        relay.flush(clause, &mut accum);
        relay
    }

    fn flush(&mut self, clause: Option<Clause>, accum: &mut Vec<String>) {
        let value = accum.join(" ");
        accum.clear();
        let clause = match clause {
            Some(c) => c,
            None => return,
        };
        if value.is_empty() {
            return;
        }
        match clause {
            Clause::From => self.from = Some(value),
            Clause::By => self.by = Some(value),
            Clause::Via => self.via = Some(value),
            Clause::With => self.with.push(value),
            Clause::Id => self.id = Some(value),
            Clause::For => self.for_ = Some(value),
        }
    }

    /// Canonical value text: clauses in grammar order, then "; date".
    pub fn generate(&self) -> String {
        let mut out = String::new();
        let mut push = |out: &mut String, name: &str, value: &str| {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(name);
            out.push(' ');
            out.push_str(value);
        };
        if let Some(ref from) = self.from {
            push(&mut out, "from", from);
        }
        if let Some(ref by) = self.by {
            push(&mut out, "by", by);
        }
        if let Some(ref via) = self.via {
            push(&mut out, "via", via);
        }
        for with in &self.with {
            push(&mut out, "with", with);
        }
        if let Some(ref id) = self.id {
            push(&mut out, "id", id);
        }
        if let Some(ref for_) = self.for_ {
            push(&mut out, "for", for_);
        }
        if let Some(ref dt) = self.date {
            out.push_str("; ");
            out.push_str(&date::generate_date(dt));
        }
        out
    }
}
