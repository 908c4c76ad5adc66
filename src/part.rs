/*
 * part.rs
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

//! Body parts: header plus body, nested through multipart bodies. A
//! whole message is just the root part.
//!
//! A part points back at its parent with an index path from the root
//! rather than an owning reference, so the tree stays a plain owned
//! value. Paths are recomputed by rebind_parents() after structural
//! edits.

use crate::body::Body;
use crate::context::MailContext;
use crate::header::Header;

/// Index path from the root part: each element selects a child of a
/// multipart body. The root's path is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartPath(Vec<usize>);

impl PartPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    header: Header,
    body: Body,
    /// Path of the parent part from the root; None for the root.
    parent: Option<PartPath>,
}

impl BodyPart {
    pub fn new(header: Header, body: Body) -> Self {
        let mut part = Self {
            header,
            body,
            parent: None,
        };
        part.rebind_parents();
        part
    }

    /// Parse a complete message or part: header, blank line, body.
    /// Parent paths are bound with this part as the root.
    pub fn parse(ctx: &MailContext, data: &[u8]) -> Self {
        let mut part = Self::parse_child(ctx, data);
        part.rebind_parents();
        part
    }

    /// Parse without rebinding; used for children during multipart
    /// parsing, where the root rebinds once at the end.
    pub(crate) fn parse_child(ctx: &MailContext, data: &[u8]) -> Self {
        let (header, consumed) = Header::parse(ctx.fields(), data);
        let body = Body::parse(ctx, &data[consumed..], &header);
        Self {
            header,
            body,
            parent: None,
        }
    }

    /// Write the part: header fields, blank separator, body.
    pub fn generate(&self, out: &mut Vec<u8>, max_line_length: usize) {
        let mut head = String::new();
        self.header.generate(&mut head, max_line_length);
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(b"\r\n");
        self.body.generate(out, max_line_length);
    }

    pub fn generate_to_vec(&self, max_line_length: usize) -> Vec<u8> {
        let mut out = Vec::new();
        self.generate(&mut out, max_line_length);
        out
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable body access. Call rebind_parents() on the root after
    /// adding or removing children.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn parent(&self) -> Option<&PartPath> {
        self.parent.as_ref()
    }

    /// The part at an index path, treating self as the root.
    pub fn part_at(&self, path: &PartPath) -> Option<&BodyPart> {
        let mut current = self;
        for &index in path.indices() {
            current = current.body.parts().get(index)?;
        }
        Some(current)
    }

    pub fn part_at_mut(&mut self, path: &PartPath) -> Option<&mut BodyPart> {
        let mut current = self;
        for &index in path.indices() {
            current = match current.body {
                Body::Multipart { ref mut parts, .. } => parts.get_mut(index)?,
                Body::Contents { .. } => return None,
            };
        }
        Some(current)
    }

    /// A copy of this part detached from any tree: its parent is
    /// cleared and descendant paths are rebound relative to it.
    pub fn detached(&self) -> Self {
        let mut copy = self.clone();
        copy.parent = None;
        copy.rebind_parents();
        copy
    }

    /// Recompute every descendant's parent path, treating self as the
    /// root.
    pub fn rebind_parents(&mut self) {
        fn bind(part: &mut BodyPart, own: &PartPath) {
            if let Body::Multipart { ref mut parts, .. } = part.body {
                for (index, child) in parts.iter_mut().enumerate() {
                    child.parent = Some(own.clone());
                    bind(child, &own.child(index));
                }
            }
        }
        let root = PartPath::root();
        bind(self, &root);
    }
}
