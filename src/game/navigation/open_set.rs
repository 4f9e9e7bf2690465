//! Open set for grid A*: a binary heap ordered by `f`, plus a coordinate index
//! holding the best entry currently queued for each cell.
//!
//! `std::collections::BinaryHeap` has no decrease-key, so improving a cell pushes
//! a fresh entry and repoints the index at it. Entries the index no longer points
//! at are stale and are dropped when they surface.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use super::types::GridNode;

/// Arena slot of a search node.
pub type NodeId = u32;

#[derive(Clone, Copy, Debug)]
struct Entry {
    f: f32,
    h: f32,
    /// Push order, for a stable tie-break.
    seq: u64,
    node: NodeId,
    cell: GridNode,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    // BinaryHeap is a max-heap: invert so the lowest f (then lowest h, then
    // earliest push) compares greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Clone, Copy, Debug)]
struct Best {
    g: u32,
    node: NodeId,
}

#[derive(Default)]
pub struct OpenSet {
    heap: BinaryHeap<Entry>,
    index: FxHashMap<GridNode, Best>,
    next_seq: u64,
}

impl OpenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best cost-so-far currently queued for `cell`, if any.
    pub fn queued_g(&self, cell: GridNode) -> Option<u32> {
        self.index.get(&cell).map(|b| b.g)
    }

    /// Queue `node` for `cell` unless an entry at least as cheap is already queued.
    /// Returns whether the node was queued.
    pub fn push(&mut self, cell: GridNode, node: NodeId, g: u32, h: f32) -> bool {
        if self.queued_g(cell).is_some_and(|best| best <= g) {
            return false;
        }
        self.index.insert(cell, Best { g, node });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { f: g as f32 + h, h, seq, node, cell });
        true
    }

    /// Remove and return the live entry with the lowest `f`.
    pub fn pop(&mut self) -> Option<(GridNode, NodeId)> {
        while let Some(entry) = self.heap.pop() {
            match self.index.get(&entry.cell) {
                Some(best) if best.node == entry.node => {
                    self.index.remove(&entry.cell);
                    return Some((entry.cell, entry.node));
                }
                _ => continue,
            }
        }
        None
    }

    /// Number of distinct cells queued.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
