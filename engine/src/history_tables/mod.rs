//! The per-thread heuristic tables that feed move ordering.
//!
//! Four families of statistics, all updated from search feedback and read by
//! the move picker:
//!
//! * piece-to history: how often moving this piece to this square produced
//!   a cutoff, anywhere in the tree
//! * from-to history: the same signal keyed on the move's squares alone
//! * capture history: the capture-flavored sibling, summed into the
//!   MVV-based capture scores
//! * continuation history: piece-to history *conditional* on the move
//!   played one, two or four plies earlier
//!
//! On top of those, the counter-move table remembers, for every (piece,
//! square) a move most recently landed on, the single move that refuted it.
//!
//! Every search thread owns one `History`; nothing here is shared or locked.

use chess::board::Board;
use chess::movegen::moves::Move;
use chess::piece::Color;

pub mod history;

use history::{FromTo, HistoryIndex, HistoryScore, PieceTo};
use history::{CONT_HIST_PERIOD, HISTORY_PERIOD};

/// Continuation history is read at these offsets into the past, in plies.
pub const CONT_HIST_PLIES: [usize; 3] = [1, 2, 4];

/// The (piece, square) keys of the moves leading up to a node, at the
/// offsets in [`CONT_HIST_PLIES`]. `None` where there is no such move (the
/// root, or a null move).
pub type Priors = [Option<HistoryIndex>; 3];

pub struct History {
    pub main_hist: PieceTo<HistoryScore>,
    pub capt_hist: PieceTo<HistoryScore>,
    pub from_to: FromTo<HistoryScore>,
    pub cont_hist: PieceTo<PieceTo<HistoryScore>>,
    countermoves: PieceTo<Move>,
}

impl History {
    /// Allocate a zeroed table set directly on the heap.
    ///
    /// The continuation history alone is over a megabyte, so going through a
    /// stack-allocated value would blow the stack before it ever got moved.
    pub fn boxed() -> Box<Self> {
        // SAFETY: every field is a plain array of i16s (wrapped in
        // newtypes) or u16-backed Moves, and the all-zeroes bit pattern is
        // valid for all of them. Move(0) is the NONE sentinel.
        unsafe {
            let layout = std::alloc::Layout::new::<Self>();
            let ptr = std::alloc::alloc_zeroed(layout);
            if ptr.is_null() {
                std::alloc::handle_alloc_error(layout);
            }
            Box::from_raw(ptr.cast())
        }
    }

    /// Reset every statistic to zero, e.g. on `ucinewgame`.
    pub fn clear(&mut self) {
        // SAFETY: same argument as `boxed`: all-zeroes is a valid value.
        unsafe {
            std::ptr::write_bytes(self as *mut Self, 0, 1);
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Reads
    //
    ////////////////////////////////////////////////////////////////////////////

    /// The combined ordering score of a quiet move: plain history, from-to
    /// history, and the continuation histories of the moves leading here.
    pub fn quiet_score(
        &self,
        side: Color,
        idx: HistoryIndex,
        mv: Move,
        priors: &Priors,
    ) -> i32 {
        let mut score = self.main_hist[idx].value();
        score += self.from_to[(side, mv)].value();

        for prior in priors.iter().flatten() {
            score += self.cont_hist[*prior][idx].value();
        }

        score
    }

    /// The capture-history component of a capture's ordering score.
    pub fn capture_score(&self, idx: HistoryIndex) -> i32 {
        self.capt_hist[idx].value()
    }

    /// The move that most recently refuted the given (piece, square).
    pub fn countermove(&self, prior: HistoryIndex) -> Move {
        self.countermoves[prior]
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Updates
    //
    ////////////////////////////////////////////////////////////////////////////

    /// Record the outcome of a completed node whose best move was quiet:
    /// reward the cutoff move, punish the quiets that were tried before it,
    /// and refresh the killer and counter-move slots.
    pub fn update_stats(
        &mut self,
        board: &Board,
        priors: &Priors,
        killers: &mut [Move; 2],
        best: Move,
        quiets_tried: &[Move],
        bonus: i32,
    ) {
        debug_assert!(best.is_quiet());

        self.update_quiet(board, priors, best, bonus);

        for &mv in quiets_tried {
            if mv != best {
                self.update_quiet(board, priors, mv, -bonus);
            }
        }

        if killers[0] != best {
            killers[1] = killers[0];
            killers[0] = best;
        }

        if let Some(prior) = priors[0] {
            self.countermoves[prior] = best;
        }
    }

    /// The capture-table counterpart: reward the cutoff capture (when there
    /// is one) and punish the captures tried before the cutoff.
    pub fn update_capture_stats(
        &mut self,
        board: &Board,
        best: Move,
        captures_tried: &[Move],
        bonus: i32,
    ) {
        if best != Move::NONE && best.is_tactical() {
            let idx = HistoryIndex::new(board, best);
            self.capt_hist[idx].update::<HISTORY_PERIOD>(bonus);
        }

        for &mv in captures_tried {
            if mv != best {
                let idx = HistoryIndex::new(board, mv);
                self.capt_hist[idx].update::<HISTORY_PERIOD>(-bonus);
            }
        }
    }

    fn update_quiet(&mut self, board: &Board, priors: &Priors, mv: Move, bonus: i32) {
        let idx = HistoryIndex::new(board, mv);

        self.main_hist[idx].update::<HISTORY_PERIOD>(bonus);
        self.from_to[(board.current, mv)].update::<HISTORY_PERIOD>(bonus);

        for prior in priors.iter().flatten() {
            self.cont_hist[*prior][idx].update::<CONT_HIST_PERIOD>(bonus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::movegen::moves::MoveFlag;
    use chess::piece::Piece;
    use chess::square::Square::*;

    #[test]
    fn update_rewards_best_and_punishes_the_rest() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];
        let priors: Priors = [None; 3];

        let best = Move::new(G1, F3, MoveFlag::Quiet);
        let tried = [Move::new(B1, C3, MoveFlag::Quiet), best];

        history.update_stats(&board, &priors, &mut killers, best, &tried, 64);

        let best_idx = HistoryIndex::new(&board, best);
        let other_idx = HistoryIndex::new(&board, tried[0]);

        assert_eq!(history.main_hist[best_idx].value(), 2048);
        assert_eq!(history.main_hist[other_idx].value(), -2048);
        assert_eq!(history.from_to[(Color::White, best)].value(), 2048);
        assert_eq!(killers[0], best);
    }

    #[test]
    fn killers_shift_rather_than_duplicate() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];
        let priors: Priors = [None; 3];

        let first = Move::new(G1, F3, MoveFlag::Quiet);
        let second = Move::new(B1, C3, MoveFlag::Quiet);

        history.update_stats(&board, &priors, &mut killers, first, &[], 10);
        assert_eq!(killers, [first, Move::NONE]);

        // Same killer again: slots stay put
        history.update_stats(&board, &priors, &mut killers, first, &[], 10);
        assert_eq!(killers, [first, Move::NONE]);

        history.update_stats(&board, &priors, &mut killers, second, &[], 10);
        assert_eq!(killers, [second, first]);
    }

    #[test]
    fn countermove_is_last_write_wins() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];

        let prior = HistoryIndex { piece: Piece::BP, tgt: E5 };
        let priors: Priors = [Some(prior), None, None];

        let first = Move::new(G1, F3, MoveFlag::Quiet);
        let second = Move::new(B1, C3, MoveFlag::Quiet);

        history.update_stats(&board, &priors, &mut killers, first, &[], 10);
        assert_eq!(history.countermove(prior), first);

        history.update_stats(&board, &priors, &mut killers, second, &[], 10);
        assert_eq!(history.countermove(prior), second);

        // An unrelated prior still has no counter
        let other = HistoryIndex { piece: Piece::BP, tgt: D5 };
        assert_eq!(history.countermove(other), Move::NONE);
    }

    #[test]
    fn continuation_history_is_conditional() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];

        let prior = HistoryIndex { piece: Piece::BP, tgt: E5 };
        let priors: Priors = [Some(prior), None, None];
        let no_priors: Priors = [None; 3];

        let mv = Move::new(G1, F3, MoveFlag::Quiet);
        let idx = HistoryIndex::new(&board, mv);

        history.update_stats(&board, &priors, &mut killers, mv, &[], 64);

        let conditioned = history.quiet_score(Color::White, idx, mv, &priors);
        let unconditioned = history.quiet_score(Color::White, idx, mv, &no_priors);

        assert_eq!(conditioned - unconditioned, 2048);
    }

    #[test]
    fn clear_zeroes_everything() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];
        let priors: Priors = [None; 3];

        let mv = Move::new(G1, F3, MoveFlag::Quiet);
        history.update_stats(&board, &priors, &mut killers, mv, &[], 64);
        history.clear();

        let idx = HistoryIndex::new(&board, mv);
        assert_eq!(history.main_hist[idx].value(), 0);
        assert_eq!(history.quiet_score(Color::White, idx, mv, &priors), 0);
    }
}
