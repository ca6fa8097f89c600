//! The search: iterative deepening around a negamax alpha-beta core, with a
//! transposition table, null-move pruning, ProbCut, late move reductions and
//! a quiescence search at the leaves.
//!
//! Move ordering is entirely the move picker's business; the search's side
//! of the bargain is to report back how each node was resolved, so the
//! history tables sharpen as the search runs. The two together are what make
//! the alpha-beta window close quickly.

pub mod params;

use crate::evaluate::evaluate;
use crate::history_tables::history::HistoryIndex;
use crate::history_tables::{History, Priors, CONT_HIST_PLIES};
use crate::move_picker::{MovePicker, NodeContext};
use crate::search::params::*;
use crate::time_control::TimeController;
use crate::transpositions::{NodeType, TTable};
use arrayvec::ArrayVec;
use chess::board::Board;
use chess::movegen::moves::Move;
use chess::zobrist::ZHash;
use uci::engine::{ScoreInfo, SearchInfo, UciEngineMessage};

/// How often the abort conditions are polled, in nodes.
const ABORT_CHECK_INTERVAL: u64 = 1024;

/// Per-ply search state. The picker gets handed the killers and the
/// (piece, square) keys of the moves currently on the path.
#[derive(Debug, Default, Clone, Copy)]
struct StackEntry {
    killers: [Move; 2],
    current: Option<HistoryIndex>,
}

#[derive(Debug, Default, Clone)]
pub struct SearchReport {
    pub best_move: Move,
    pub score: Score,
    pub depth: Depth,
    pub nodes: u64,
}

/// One search, over one position, on one thread. The transposition table and
/// history tables outlive it and carry learned state from move to move.
pub struct Searcher<'a> {
    tt: &'a mut TTable,
    history: &'a mut History,
    tc: TimeController,
    stack: [StackEntry; MAX_PLY],

    /// Hashes of every position on the path from the game start, used for
    /// repetition detection. The current node's hash is the last element.
    repetitions: Vec<ZHash>,

    nodes: u64,
    seldepth: usize,
    aborted: bool,
    verbose: bool,
}

impl<'a> Searcher<'a> {
    pub fn new(
        tt: &'a mut TTable,
        history: &'a mut History,
        tc: TimeController,
        game_history: Vec<ZHash>,
    ) -> Self {
        Self {
            tt,
            history,
            tc,
            stack: [StackEntry::default(); MAX_PLY],
            repetitions: game_history,
            nodes: 0,
            seldepth: 0,
            aborted: false,
            verbose: true,
        }
    }

    pub fn silent(mut self) -> Self {
        self.verbose = false;
        self
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Iterative deepening
    //
    ////////////////////////////////////////////////////////////////////////////

    pub fn search(&mut self, board: &Board) -> SearchReport {
        let mut report = SearchReport::default();

        self.repetitions.push(board.hash);

        let mut depth = 1;
        while depth < MAX_PLY as Depth && self.tc.may_deepen(depth) {
            let (score, best_move) = self.search_root(board, depth);

            if self.aborted && best_move == Move::NONE {
                break;
            }

            report = SearchReport {
                best_move,
                score,
                depth,
                nodes: self.nodes,
            };

            if self.verbose {
                let info = SearchInfo {
                    depth: depth as usize,
                    seldepth: self.seldepth,
                    score: score_info(score),
                    nodes: self.nodes,
                    time: self.tc.elapsed(),
                    hashfull: self.tt.hashfull(),
                    pv: self.extract_pv(board, depth),
                };
                println!("{}", UciEngineMessage::Info(info));
            }

            // A forced mate won't improve with more depth
            if self.aborted || score.abs() >= MATE_BOUND || self.tc.should_stop(self.nodes)
            {
                break;
            }

            depth += 1;
        }

        self.repetitions.pop();
        report
    }

    fn search_root(&mut self, board: &Board, depth: Depth) -> (Score, Move) {
        let mut alpha = -INFINITY;
        let beta = INFINITY;

        let tt_move = self
            .tt
            .probe(board.hash)
            .map(|entry| entry.best_move())
            .unwrap_or(Move::NONE);

        let ctx = self.node_context(board, 0);
        let mut picker = MovePicker::new_search(board, tt_move, depth, ctx);

        let mut best_move = Move::NONE;
        let mut move_count = 0;

        while let Some(mv) = picker.next_move(self.history) {
            let next = board.play_move(mv);

            if !legal(board, &next) {
                continue;
            }

            move_count += 1;
            self.stack[0].current = Some(HistoryIndex::new(board, mv));
            self.repetitions.push(next.hash);

            let score = if move_count == 1 {
                -self.negamax(&next, depth - 1, -beta, -alpha, 1, true)
            } else {
                let score = -self.negamax(&next, depth - 1, -alpha - 1, -alpha, 1, true);

                if score > alpha && !self.aborted {
                    -self.negamax(&next, depth - 1, -beta, -alpha, 1, true)
                } else {
                    score
                }
            };

            self.repetitions.pop();

            if self.aborted {
                return (alpha, best_move);
            }

            if score > alpha {
                alpha = score;
                best_move = mv;
            }
        }

        self.stack[0].current = None;

        if move_count == 0 {
            let score = if board.in_check() { -MATE } else { DRAW };
            return (score, Move::NONE);
        }

        self.tt
            .insert(board.hash, best_move, alpha, depth, NodeType::Exact, 0);

        (alpha, best_move)
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Negamax
    //
    ////////////////////////////////////////////////////////////////////////////

    fn negamax(
        &mut self,
        board: &Board,
        depth: Depth,
        mut alpha: Score,
        beta: Score,
        ply: usize,
        try_null: bool,
    ) -> Score {
        if self.should_abort() {
            return 0;
        }

        if depth <= 0 {
            return self.qsearch(board, 0, alpha, beta, ply, None);
        }

        self.nodes += 1;

        if ply >= MAX_PLY {
            return evaluate(board);
        }

        if board.halfmoves >= 100 || self.is_repetition(board) {
            return DRAW;
        }

        let in_check = board.in_check();

        ////////////////////////////////////////////////////////////////////////
        //
        // Transposition table
        //
        ////////////////////////////////////////////////////////////////////////

        let mut tt_move = Move::NONE;

        if let Some(entry) = self.tt.probe(board.hash) {
            tt_move = entry.best_move();

            if entry.depth() >= depth {
                let score = entry.score(ply);

                match entry.node_type() {
                    NodeType::Exact => return score,
                    NodeType::Lower if score >= beta => return score,
                    NodeType::Upper if score <= alpha => return score,
                    _ => {}
                }
            }
        }

        let eval = evaluate(board);

        if !in_check && beta.abs() < MATE_BOUND {
            ////////////////////////////////////////////////////////////////////
            //
            // Reverse futility pruning: comfortably above beta at shallow
            // depth, assume the margin holds
            //
            ////////////////////////////////////////////////////////////////////

            if depth <= RFP_MAX_DEPTH && eval - RFP_MARGIN * depth >= beta {
                return eval;
            }

            ////////////////////////////////////////////////////////////////////
            //
            // Null move pruning: hand the opponent a free move; if the
            // position still beats beta, the real move surely would
            //
            ////////////////////////////////////////////////////////////////////

            if try_null && depth >= NMP_MIN_DEPTH && eval >= beta && has_pieces(board) {
                let next = board.play_null_move();
                let reduced = (depth - NMP_BASE_REDUCTION - depth / 4).max(0);

                self.stack[ply].current = None;
                self.repetitions.push(next.hash);
                let score =
                    -self.negamax(&next, reduced, -beta, -beta + 1, ply + 1, false);
                self.repetitions.pop();

                if self.aborted {
                    return 0;
                }

                if score >= beta {
                    // Never trust a null search with a mate score
                    return if score >= MATE_BOUND { beta } else { score };
                }
            }

            ////////////////////////////////////////////////////////////////////
            //
            // ProbCut: a capture that clears beta by a margin in a reduced
            // search is taken as proof of a cutoff
            //
            ////////////////////////////////////////////////////////////////////

            if depth >= PROBCUT_MIN_DEPTH {
                let rbeta = (beta + PROBCUT_MARGIN).min(INFINITY);
                let mut picker = MovePicker::new_probcut(board, tt_move, rbeta - eval);

                while let Some(mv) = picker.next_move(self.history) {
                    let next = board.play_move(mv);

                    if !legal(board, &next) {
                        continue;
                    }

                    self.stack[ply].current = Some(HistoryIndex::new(board, mv));
                    self.repetitions.push(next.hash);
                    let score = -self.negamax(
                        &next,
                        depth - PROBCUT_REDUCTION,
                        -rbeta,
                        -rbeta + 1,
                        ply + 1,
                        true,
                    );
                    self.repetitions.pop();

                    if self.aborted {
                        return 0;
                    }

                    if score >= rbeta {
                        return score;
                    }
                }
            }
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Main move loop
        //
        ////////////////////////////////////////////////////////////////////////

        let original_alpha = alpha;
        let ctx = self.node_context(board, ply);
        let priors = ctx.priors;
        let mut picker = MovePicker::new_search(board, tt_move, depth, ctx);

        let mut quiets_tried: ArrayVec<Move, 64> = ArrayVec::new();
        let mut captures_tried: ArrayVec<Move, 32> = ArrayVec::new();
        let mut best_score = -INFINITY;
        let mut best_move = Move::NONE;
        let mut move_count = 0;

        while let Some(mv) = picker.next_move(self.history) {
            let next = board.play_move(mv);

            if !legal(board, &next) {
                continue;
            }

            move_count += 1;

            if mv.is_quiet() {
                if !quiets_tried.is_full() {
                    quiets_tried.push(mv);
                }
            } else if !captures_tried.is_full() {
                captures_tried.push(mv);
            }

            self.stack[ply].current = Some(HistoryIndex::new(board, mv));
            self.repetitions.push(next.hash);

            let score = if move_count == 1 {
                -self.negamax(&next, depth - 1, -beta, -alpha, ply + 1, true)
            } else {
                ////////////////////////////////////////////////////////////////
                //
                // Late move reductions: moves this far down the ordering
                // rarely surprise; search them shallower with a null window
                // first, and only back off when they beat alpha anyway
                //
                ////////////////////////////////////////////////////////////////

                let mut reduction = 0;

                if depth >= LMR_MIN_DEPTH
                    && move_count > LMR_MOVE_THRESHOLD
                    && mv.is_quiet()
                    && !in_check
                    && !next.in_check()
                {
                    reduction = 1 + (move_count > 8) as Depth;
                }

                let mut score = -self.negamax(
                    &next,
                    depth - 1 - reduction,
                    -alpha - 1,
                    -alpha,
                    ply + 1,
                    true,
                );

                if score > alpha && reduction > 0 && !self.aborted {
                    score =
                        -self.negamax(&next, depth - 1, -alpha - 1, -alpha, ply + 1, true);
                }

                if score > alpha && score < beta && !self.aborted {
                    score = -self.negamax(&next, depth - 1, -beta, -alpha, ply + 1, true);
                }

                score
            };

            self.repetitions.pop();

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;

                if score > alpha {
                    alpha = score;

                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        self.stack[ply].current = None;

        if move_count == 0 {
            return if in_check { ply as Score - MATE } else { DRAW };
        }

        ////////////////////////////////////////////////////////////////////////
        //
        // Feed the outcome back into the ordering tables
        //
        ////////////////////////////////////////////////////////////////////////

        if best_score >= beta {
            let bonus = stat_bonus(depth);

            if best_move.is_quiet() {
                self.history.update_stats(
                    board,
                    &priors,
                    &mut self.stack[ply].killers,
                    best_move,
                    &quiets_tried,
                    bonus,
                );
            }

            let best_capture = if best_move.is_tactical() {
                best_move
            } else {
                Move::NONE
            };

            self.history
                .update_capture_stats(board, best_capture, &captures_tried, bonus);
        }

        let node_type = if best_score >= beta {
            NodeType::Lower
        } else if best_score > original_alpha {
            NodeType::Exact
        } else {
            NodeType::Upper
        };

        self.tt
            .insert(board.hash, best_move, best_score, depth, node_type, ply);

        best_score
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Quiescence
    //
    ////////////////////////////////////////////////////////////////////////////

    fn qsearch(
        &mut self,
        board: &Board,
        depth: Depth,
        mut alpha: Score,
        beta: Score,
        ply: usize,
        recapture_sq: Option<chess::square::Square>,
    ) -> Score {
        if self.should_abort() {
            return 0;
        }

        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);

        if ply >= MAX_PLY {
            return evaluate(board);
        }

        if board.halfmoves >= 100 || self.is_repetition(board) {
            return DRAW;
        }

        let in_check = board.in_check();

        let mut tt_move = Move::NONE;

        if let Some(entry) = self.tt.probe(board.hash) {
            tt_move = entry.best_move();
            let score = entry.score(ply);

            match entry.node_type() {
                NodeType::Exact => return score,
                NodeType::Lower if score >= beta => return score,
                NodeType::Upper if score <= alpha => return score,
                _ => {}
            }
        }

        // Standing pat: the side to move may decline every capture, unless
        // it is in check
        let mut best_score = if in_check {
            -INFINITY
        } else {
            let eval = evaluate(board);

            if eval >= beta {
                return eval;
            }

            alpha = alpha.max(eval);
            eval
        };

        let mut picker = MovePicker::new_qsearch(board, tt_move, depth, recapture_sq);
        let mut best_move = Move::NONE;
        let mut move_count = 0;

        while let Some(mv) = picker.next_move(self.history) {
            let next = board.play_move(mv);

            if !legal(board, &next) {
                continue;
            }

            move_count += 1;
            self.repetitions.push(next.hash);
            let score =
                -self.qsearch(&next, depth - 1, -beta, -alpha, ply + 1, Some(mv.tgt()));
            self.repetitions.pop();

            if self.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = mv;

                if score > alpha {
                    alpha = score;

                    if alpha >= beta {
                        break;
                    }
                }
            }
        }

        if in_check && move_count == 0 {
            return ply as Score - MATE;
        }

        let node_type = if best_score >= beta {
            NodeType::Lower
        } else {
            NodeType::Upper
        };

        self.tt
            .insert(board.hash, best_move, best_score, 0, node_type, ply);

        best_score
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Helpers
    //
    ////////////////////////////////////////////////////////////////////////////

    /// The slice of per-ply context the picker needs at this node.
    fn node_context(&self, _board: &Board, ply: usize) -> NodeContext {
        let mut priors: Priors = [None; 3];

        for (slot, offset) in priors.iter_mut().zip(CONT_HIST_PLIES) {
            *slot = ply
                .checked_sub(offset)
                .and_then(|prior_ply| self.stack[prior_ply].current);
        }

        let countermove = priors[0]
            .map(|prior| self.history.countermove(prior))
            .unwrap_or(Move::NONE);

        NodeContext {
            killers: self.stack[ply].killers,
            countermove,
            priors,
        }
    }

    fn should_abort(&mut self) -> bool {
        if !self.aborted
            && self.nodes % ABORT_CHECK_INTERVAL == 0
            && self.tc.should_stop(self.nodes)
        {
            self.aborted = true;
        }

        self.aborted
    }

    /// Twofold repetition of any position on the path counts as a draw.
    fn is_repetition(&self, board: &Board) -> bool {
        self.repetitions
            .iter()
            .rev()
            .skip(1)
            .any(|&hash| hash == board.hash)
    }

    /// Walk the transposition table along the best moves for a printable
    /// principal variation.
    fn extract_pv(&self, board: &Board, depth: Depth) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut board = *board;

        for _ in 0..depth {
            let Some(entry) = self.tt.probe(board.hash) else {
                break;
            };

            let mv = entry.best_move();

            if mv == Move::NONE || !board.is_pseudo_legal(mv) {
                break;
            }

            let next = board.play_move(mv);

            if !legal(&board, &next) {
                break;
            }

            pv.push(mv);
            board = next;
        }

        pv
    }
}

/// The picker hands out pseudo-legal moves; a move is discarded here when it
/// leaves the own king hanging.
fn legal(before: &Board, after: &Board) -> bool {
    !after.is_attacked_by(
        after.king_sq(before.current),
        after.current,
        after.all_occupied(),
    )
}

/// Null-move pruning is unsound in pawn-and-king endgames, where zugzwang
/// is a real possibility.
fn has_pieces(board: &Board) -> bool {
    let us = board.current;
    !(board.occupied_by(us) ^ board.pawns(us) ^ board.kings(us)).is_empty()
}

fn score_info(score: Score) -> ScoreInfo {
    if score >= MATE_BOUND {
        ScoreInfo::Mate((MATE - score + 1) / 2)
    } else if score <= -MATE_BOUND {
        ScoreInfo::Mate(-(MATE + score + 1) / 2)
    } else {
        ScoreInfo::Cp(score)
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Tests
//
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uci::time_control::TimeControl;

    fn run(fen: &str, depth: usize) -> SearchReport {
        let board: Board = fen.parse().unwrap();
        let mut tt = TTable::with_capacity(8);
        let mut history = History::boxed();
        let (tc, _) = TimeController::new(
            TimeControl::Depth(depth),
            board.current,
            Duration::ZERO,
        );

        Searcher::new(&mut tt, &mut history, tc, Vec::new())
            .silent()
            .search(&board)
    }

    #[test]
    fn finds_a_back_rank_mate() {
        let report = run("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1", 4);
        assert_eq!(report.best_move.to_string(), "a1a8");
        assert!(report.score >= MATE_BOUND);
    }

    #[test]
    fn grabs_a_hanging_queen() {
        let report = run("k7/8/8/3q4/8/8/3R4/K7 w - - 0 1", 4);
        assert_eq!(report.best_move.to_string(), "d2d5");
        assert!(report.score > 400);
    }

    #[test]
    fn finds_a_rook_ladder_mate() {
        // Rb1 is mate: the a2 rook seals the second rank
        let report = run("k7/8/8/8/8/1r6/r7/7K b - - 0 1", 4);
        assert_eq!(report.best_move.to_string(), "b3b1");
        assert!(report.score >= MATE_BOUND);
    }

    #[test]
    fn respects_the_depth_limit() {
        let report = run(chess::board::START_FEN, 3);
        assert_eq!(report.depth, 3);
        assert_ne!(report.best_move, Move::NONE);
    }

    #[test]
    fn search_is_deterministic() {
        let a = run(chess::board::START_FEN, 5);
        let b = run(chess::board::START_FEN, 5);

        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
    }
}
