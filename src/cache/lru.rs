//! LRU Recency List Module
//!
//! Doubly-linked recency order threaded through slot indices. The links live
//! in a vector parallel to the slot store, so every splice is O(1) and no
//! node is ever allocated on its own.

/// Marks the absence of a neighbour.
const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
    linked: bool,
}

impl Link {
    const DETACHED: Link = Link {
        prev: NIL,
        next: NIL,
        linked: false,
    };
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Head = most recently used
/// - Tail = least recently used (next eviction candidate)
#[derive(Debug)]
pub struct RecencyList {
    links: Vec<Link>,
    head: usize,
    tail: usize,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    // == Move To Head ==
    /// Makes `index` the most recently used slot, linking it in if it was not
    /// already part of the list.
    pub fn move_to_head(&mut self, index: usize) {
        if index >= self.links.len() {
            self.links.resize(index + 1, Link::DETACHED);
        }
        if self.links[index].linked {
            if self.head == index {
                return;
            }
            self.unlink(index);
        }

        let old_head = self.head;
        self.links[index] = Link {
            prev: NIL,
            next: old_head,
            linked: true,
        };
        if old_head != NIL {
            self.links[old_head].prev = index;
        } else {
            self.tail = index;
        }
        self.head = index;
        self.len += 1;
    }

    // == Evict Tail ==
    /// Unlinks and returns the least recently used index.
    pub fn evict_tail(&mut self) -> Option<usize> {
        let tail = self.tail()?;
        self.unlink(tail);
        Some(tail)
    }

    // == Remove ==
    /// Unlinks an arbitrary index. Returns false if it was not linked.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.unlink(index);
        true
    }

    fn unlink(&mut self, index: usize) {
        let Link { prev, next, .. } = self.links[index];
        if prev != NIL {
            self.links[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.links[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.links[index] = Link::DETACHED;
        self.len -= 1;
    }

    /// Most recently used index.
    pub fn head(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    /// Least recently used index.
    pub fn tail(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// The index after `index`, walking towards the tail.
    pub fn next(&self, index: usize) -> Option<usize> {
        self.links
            .get(index)
            .map(|link| link.next)
            .filter(|&next| next != NIL)
    }

    /// The index before `index`, walking towards the head.
    pub fn prev(&self, index: usize) -> Option<usize> {
        self.links
            .get(index)
            .map(|link| link.prev)
            .filter(|&prev| prev != NIL)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.links.get(index).is_some_and(|link| link.linked)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// Head-to-tail snapshot of the list.
    pub fn to_vec(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head();
        while let Some(index) = cursor {
            out.push(index);
            cursor = self.next(index);
        }
        out
    }
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}
