// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A forest of doubly-linked child lists sharing one backing store.

use alloc::vec::Vec;

const NIL: u32 = u32::MAX;

#[inline]
fn decode(link: u32) -> Option<usize> {
    (link != NIL).then_some(link as usize)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "The domain is bounded by the 32-bit node id range."
)]
#[inline]
fn encode(index: usize) -> u32 {
    index as u32
}

/// One doubly-linked list of children per parent, all over a fixed index domain.
///
/// Every node can be in at most one list, so the sibling links live in arrays
/// keyed by node index and every operation is O(1).
#[derive(Clone, Debug, Default)]
pub struct ChildLists {
    first: Vec<u32>,
    last: Vec<u32>,
    next: Vec<u32>,
    prev: Vec<u32>,
}

impl ChildLists {
    /// Create empty lists for nodes `0..len`.
    pub fn new(len: usize) -> Self {
        Self {
            first: alloc::vec![NIL; len],
            last: alloc::vec![NIL; len],
            next: alloc::vec![NIL; len],
            prev: alloc::vec![NIL; len],
        }
    }

    /// Size of the index domain.
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Whether the index domain is empty.
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// First child of `parent`.
    #[inline]
    pub fn first(&self, parent: usize) -> Option<usize> {
        decode(self.first[parent])
    }

    /// Last child of `parent`.
    #[inline]
    pub fn last(&self, parent: usize) -> Option<usize> {
        decode(self.last[parent])
    }

    /// Sibling after `node`.
    #[inline]
    pub fn next(&self, node: usize) -> Option<usize> {
        decode(self.next[node])
    }

    /// Sibling before `node`.
    #[inline]
    pub fn prev(&self, node: usize) -> Option<usize> {
        decode(self.prev[node])
    }

    /// Link `child` at the end of `parent`'s list.
    pub fn append(&mut self, parent: usize, child: usize) {
        match self.last(parent) {
            Some(tail) => self.insert_after(parent, tail, child),
            None => self.link_only(parent, child),
        }
    }

    /// Link `child` at the front of `parent`'s list.
    pub fn prepend(&mut self, parent: usize, child: usize) {
        match self.first(parent) {
            Some(head) => self.insert_before(parent, head, child),
            None => self.link_only(parent, child),
        }
    }

    /// Link `child` right after `sibling`, which must already be in `parent`'s list.
    pub fn insert_after(&mut self, parent: usize, sibling: usize, child: usize) {
        let after = self.next[sibling];
        self.prev[child] = encode(sibling);
        self.next[child] = after;
        self.next[sibling] = encode(child);
        match decode(after) {
            Some(a) => self.prev[a] = encode(child),
            None => self.last[parent] = encode(child),
        }
    }

    /// Link `child` right before `sibling`, which must already be in `parent`'s list.
    pub fn insert_before(&mut self, parent: usize, sibling: usize, child: usize) {
        let before = self.prev[sibling];
        self.next[child] = encode(sibling);
        self.prev[child] = before;
        self.prev[sibling] = encode(child);
        match decode(before) {
            Some(b) => self.next[b] = encode(child),
            None => self.first[parent] = encode(child),
        }
    }

    fn link_only(&mut self, parent: usize, child: usize) {
        self.next[child] = NIL;
        self.prev[child] = NIL;
        self.first[parent] = encode(child);
        self.last[parent] = encode(child);
    }

    /// Iterate over the children of `parent`, front to back.
    pub fn iter(&self, parent: usize) -> Children<'_> {
        Children {
            lists: self,
            cursor: self.first(parent),
        }
    }
}

/// Iterator over one child list; see [`ChildLists::iter`].
#[derive(Clone, Debug)]
pub struct Children<'a> {
    lists: &'a ChildLists,
    cursor: Option<usize>,
}

impl Iterator for Children<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.cursor?;
        self.cursor = self.lists.next(current);
        Some(current)
    }
}
