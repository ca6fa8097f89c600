//! The transposition table: a fixed-size, zobrist-keyed cache of search
//! results.
//!
//! Entries store the best move found, the score with its bound type, and the
//! depth the node was searched to. Mate scores are stored relative to the
//! probing node rather than the root, so a mate found through one path keeps
//! its meaning when reached through another.
//!
//! The table belongs to one search thread at a time; replacement prefers
//! entries from older searches and shallower depths.

use crate::search::params::{Depth, Score, MATE_BOUND};
use chess::movegen::moves::Move;
use chess::zobrist::ZHash;

pub const DEFAULT_TT_SIZE_MB: usize = 16;

/// Whether the stored score is exact or a bound, mirroring how the node's
/// window was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    Exact,
    /// A fail-high: the true score is at least this
    Lower,
    /// A fail-low: the true score is at most this
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    hash: ZHash,
    best_move: Move,
    score: i16,
    depth: i8,
    node_type: NodeType,
    age: u8,
}

impl TTEntry {
    const EMPTY: TTEntry = TTEntry {
        hash: ZHash(0),
        best_move: Move::NONE,
        score: 0,
        depth: -1,
        node_type: NodeType::Upper,
        age: 0,
    };

    pub fn best_move(&self) -> Move {
        self.best_move
    }

    pub fn depth(&self) -> Depth {
        self.depth as Depth
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// The stored score, translated back to be relative to the root.
    pub fn score(&self, ply: usize) -> Score {
        let score = self.score as Score;

        if score >= MATE_BOUND {
            score - ply as Score
        } else if score <= -MATE_BOUND {
            score + ply as Score
        } else {
            score
        }
    }
}

pub struct TTable {
    table: Vec<TTEntry>,
    age: u8,
    occupied: usize,
}

impl TTable {
    pub fn with_capacity(mb: usize) -> Self {
        let entries = Self::entries_for(mb);

        Self {
            table: vec![TTEntry::EMPTY; entries],
            age: 0,
            occupied: 0,
        }
    }

    fn entries_for(mb: usize) -> usize {
        // Rounded down to a power of two so indexing is a mask
        let count = (mb.max(1) * 1024 * 1024 / std::mem::size_of::<TTEntry>()).max(2);
        1 << count.ilog2()
    }

    fn slot(&self, hash: ZHash) -> usize {
        // Table length is a power of two, so the hash folds to an index
        // with a mask
        hash.0 as usize & (self.table.len() - 1)
    }

    pub fn resize(&mut self, mb: usize) {
        self.table = vec![TTEntry::EMPTY; Self::entries_for(mb)];
        self.occupied = 0;
    }

    pub fn clear(&mut self) {
        self.table.fill(TTEntry::EMPTY);
        self.occupied = 0;
    }

    /// Bump the search generation; older entries become preferred
    /// replacement victims.
    pub fn increment_age(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    pub fn probe(&self, hash: ZHash) -> Option<&TTEntry> {
        let entry = &self.table[self.slot(hash)];
        (entry.hash == hash && entry.depth >= 0).then_some(entry)
    }

    pub fn insert(
        &mut self,
        hash: ZHash,
        best_move: Move,
        score: Score,
        depth: Depth,
        node_type: NodeType,
        ply: usize,
    ) {
        let age = self.age;
        let slot = self.slot(hash);
        let entry = &mut self.table[slot];

        // Keep deeper results from the current search unless this is a
        // fresh position for the slot
        if entry.hash == hash && entry.age == age && entry.depth as Depth > depth {
            return;
        }

        // Mate scores become relative to this node
        let score = if score >= MATE_BOUND {
            score + ply as Score
        } else if score <= -MATE_BOUND {
            score - ply as Score
        } else {
            score
        };

        if entry.depth < 0 {
            self.occupied += 1;
        }

        *entry = TTEntry {
            hash,
            best_move,
            score: score as i16,
            depth: depth.clamp(0, i8::MAX as Depth) as i8,
            node_type,
            age,
        };
    }

    /// Fill rate in permille, as the `info hashfull` field wants it.
    pub fn hashfull(&self) -> usize {
        self.occupied * 1000 / self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::movegen::moves::MoveFlag;
    use chess::square::Square::*;

    #[test]
    fn stores_and_probes() {
        let mut tt = TTable::with_capacity(1);
        let hash = ZHash(0xdeadbeef);
        let mv = Move::new(E2, E4, MoveFlag::DoublePush);

        assert!(tt.probe(hash).is_none());

        tt.insert(hash, mv, 42, 5, NodeType::Exact, 0);

        let entry = tt.probe(hash).unwrap();
        assert_eq!(entry.best_move(), mv);
        assert_eq!(entry.score(0), 42);
        assert_eq!(entry.depth(), 5);
        assert_eq!(entry.node_type(), NodeType::Exact);
    }

    #[test]
    fn shallower_results_do_not_evict_deeper_ones() {
        let mut tt = TTable::with_capacity(1);
        let hash = ZHash(0x1234);
        let deep = Move::new(G1, F3, MoveFlag::Quiet);
        let shallow = Move::new(B1, C3, MoveFlag::Quiet);

        tt.insert(hash, deep, 10, 8, NodeType::Exact, 0);
        tt.insert(hash, shallow, -10, 2, NodeType::Exact, 0);

        assert_eq!(tt.probe(hash).unwrap().best_move(), deep);

        // A new generation takes the slot regardless of depth
        tt.increment_age();
        tt.insert(hash, shallow, -10, 2, NodeType::Exact, 0);
        assert_eq!(tt.probe(hash).unwrap().best_move(), shallow);
    }

    #[test]
    fn mate_scores_travel_by_ply() {
        use crate::search::params::MATE;

        let mut tt = TTable::with_capacity(1);
        let hash = ZHash(0xabcd);

        // A mate-in-3-plies found at ply 4 from the root
        let score_at_node = MATE - 7;
        tt.insert(hash, Move::NONE, score_at_node, 3, NodeType::Exact, 4);

        // Probed from ply 2, the same mate is one ply further away
        assert_eq!(tt.probe(hash).unwrap().score(2), MATE - 5);
    }

    #[test]
    fn resize_and_clear_drop_contents() {
        let mut tt = TTable::with_capacity(1);
        let hash = ZHash(0x42);
        tt.insert(hash, Move::NONE, 1, 1, NodeType::Exact, 0);
        assert!(tt.hashfull() > 0);

        tt.resize(2);
        assert!(tt.probe(hash).is_none());
        assert_eq!(tt.hashfull(), 0);

        tt.insert(hash, Move::NONE, 1, 1, NodeType::Exact, 0);
        tt.clear();
        assert!(tt.probe(hash).is_none());
    }
}
