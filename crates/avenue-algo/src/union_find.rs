//! Disjoint-set forest over dense integer ids.
//!
//! Path compression (halving) in [`UnionFind::find`] plus union by rank keep
//! every operation near-constant amortised. [`UnionFind::root`] walks to the
//! representative without compressing, so it only needs `&self` and can be
//! called from many threads at once while filtering edges.

/// Disjoint sets keyed by `usize` ids.
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl UnionFind {
    /// Forest with singleton sets `0..n`.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    /// Register `id` as a singleton set. Ids below `id` that were never
    /// registered become singletons too; already-known ids are untouched.
    pub fn make_set(&mut self, id: usize) {
        while self.parent.len() <= id {
            self.parent.push(self.parent.len());
            self.rank.push(0);
            self.sets += 1;
        }
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Representative of `id`'s set, compressing the path on the way.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never registered.
    pub fn find(&mut self, mut id: usize) -> usize {
        while self.parent[id] != id {
            let grandparent = self.parent[self.parent[id]];
            self.parent[id] = grandparent;
            id = grandparent;
        }
        id
    }

    /// Representative of `id`'s set without mutating the forest.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never registered.
    pub fn root(&self, mut id: usize) -> usize {
        while self.parent[id] != id {
            id = self.parent[id];
        }
        id
    }

    /// Merge the sets of `a` and `b`.
    ///
    /// Returns `false` and leaves the forest untouched when they already
    /// share a set (joining them would close a cycle).
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        self.sets -= 1;
        true
    }

    pub fn connected(&self, a: usize, b: usize) -> bool {
        self.root(a) == self.root(b)
    }
}
