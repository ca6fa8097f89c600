//! Staged, lazy move ordering.
//!
//! The picker hands the search one pseudo-legal move at a time, most
//! promising first, and does as little work as possible to find it: in the
//! common case a node is cut off after one or two moves, and generating or
//! sorting the rest would be wasted effort. So moves are produced in stages,
//! and each stage is only generated and scored once the previous one has run
//! dry.
//!
//! For the main search the stages are: the transposition-table move, then
//! winning captures (best exchange first), the two killers, the
//! counter-move, the remaining quiets by history score, and finally the
//! losing captures that were set aside along the way. Quiescence and ProbCut
//! nodes run shorter sequences over the same machinery, and a node in check
//! swaps the whole plan for scored evasions.
//!
//! Moves arriving from outside the generator (hash move, killers,
//! counter-move) are screened with `is_pseudo_legal`; a stale entry is
//! silently dropped rather than played.

use crate::history_tables::history::HistoryIndex;
use crate::history_tables::{History, Priors};
use crate::search::params::{
    Depth, DEPTH_QS_CHECKS, DEPTH_QS_RECAPTURES, SHALLOW_SORT_DEPTH, SHALLOW_SORT_LIMIT,
};
use chess::board::Board;
use chess::movegen::moves::Move;
use chess::movegen::{MoveList, MAX_MOVES};
use chess::piece::PieceType;
use chess::see::SEE_VALUES;
use chess::square::Square;

/// Captures are ordered by victim value in units that dwarf the capture
/// history, so history only breaks ties between equal victims.
const MVV_FACTOR: i32 = 32;

/// Quiet evasions sort below every capturing evasion by this offset.
const EVASION_DEFER: i32 = 1 << 20;

/// The slice of search context the picker reads at one node: the killer
/// slots for this ply, the counter-move to the previous move, and the
/// (piece, square) keys of the recent moves that condition continuation
/// history. The search copies these in from its stack when it builds the
/// picker; their lifetime problems end there.
#[derive(Debug, Default, Clone)]
pub struct NodeContext {
    pub killers: [Move; 2],
    pub countermove: Move,
    pub priors: Priors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    // Main search
    TTMove,
    GenCaptures,
    GoodCaptures,
    FirstKiller,
    SecondKiller,
    Countermove,
    GenQuiets,
    Quiets,
    BadCaptures,

    // Any node in check
    EvasionTT,
    GenEvasions,
    Evasions,

    // Quiescence
    QSearchTT,
    GenQsCaptures,
    QsCaptures,
    GenQsChecks,
    QsChecks,

    // Deep quiescence: recaptures only
    RecaptureTT,
    GenRecaptures,
    Recaptures,

    // ProbCut
    ProbcutTT,
    GenProbcutCaptures,
    ProbcutCaptures,

    Done,
}

pub struct MovePicker<'a> {
    board: &'a Board,
    stage: Stage,
    depth: Depth,
    tt_move: Move,
    ctx: NodeContext,

    /// SEE threshold for ProbCut captures
    see_threshold: i32,

    /// Deep quiescence only considers captures landing here
    recapture_sq: Option<Square>,

    moves: MoveList,
    scores: [i32; MAX_MOVES],

    /// Next unconsumed slot of the active slice
    cur: usize,

    /// Where the quiet moves begin (equals the number of captures generated)
    quiet_start: usize,

    /// Losing captures are stashed in `moves[..bad_end]`, which only ever
    /// holds slots the selection has already consumed
    bad_end: usize,
}

impl<'a> MovePicker<'a> {
    /// A picker for a main-search node. When the side to move is in check
    /// the whole stage plan is replaced by scored evasions.
    pub fn new_search(
        board: &'a Board,
        tt_move: Move,
        depth: Depth,
        ctx: NodeContext,
    ) -> Self {
        let stage = if board.in_check() {
            Stage::EvasionTT
        } else {
            Stage::TTMove
        };

        Self::with_stage(board, stage, tt_move, depth, ctx, 0, None)
    }

    /// A picker for a quiescence node. `recapture_sq` is the destination of
    /// the previous capture; deep in quiescence it becomes the only square
    /// captures are considered on.
    pub fn new_qsearch(
        board: &'a Board,
        tt_move: Move,
        depth: Depth,
        recapture_sq: Option<Square>,
    ) -> Self {
        let stage = if board.in_check() {
            Stage::EvasionTT
        } else if depth > DEPTH_QS_RECAPTURES {
            Stage::QSearchTT
        } else {
            Stage::RecaptureTT
        };

        Self::with_stage(
            board,
            stage,
            tt_move,
            depth,
            NodeContext::default(),
            0,
            recapture_sq,
        )
    }

    /// A picker for ProbCut: only captures whose static exchange clears the
    /// given threshold are produced.
    pub fn new_probcut(board: &'a Board, tt_move: Move, see_threshold: i32) -> Self {
        Self::with_stage(
            board,
            Stage::ProbcutTT,
            tt_move,
            0,
            NodeContext::default(),
            see_threshold,
            None,
        )
    }

    fn with_stage(
        board: &'a Board,
        stage: Stage,
        tt_move: Move,
        depth: Depth,
        ctx: NodeContext,
        see_threshold: i32,
        recapture_sq: Option<Square>,
    ) -> Self {
        Self {
            board,
            stage,
            depth,
            tt_move,
            ctx,
            see_threshold,
            recapture_sq,
            moves: MoveList::new(),
            scores: [0; MAX_MOVES],
            cur: 0,
            quiet_start: 0,
            bad_end: 0,
        }
    }

    /// The next most promising move, or `None` once every eligible move has
    /// been handed out. After the first `None` every further call is `None`.
    pub fn next_move(&mut self, history: &History) -> Option<Move> {
        loop {
            match self.stage {
                ////////////////////////////////////////////////////////////////
                //
                // Main search
                //
                ////////////////////////////////////////////////////////////////

                // Try the hash move before generating anything at all: if it
                // cuts off, the move list is never materialized.
                Stage::TTMove => {
                    self.stage = Stage::GenCaptures;

                    if self.tt_move != Move::NONE
                        && self.board.is_pseudo_legal(self.tt_move)
                    {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenCaptures => {
                    self.board.generate_captures(&mut self.moves);
                    self.quiet_start = self.moves.len();
                    self.score_captures(history, 0, self.quiet_start);
                    self.stage = Stage::GoodCaptures;
                }

                Stage::GoodCaptures => {
                    while self.cur < self.quiet_start {
                        let mv = self.select_best(self.cur, self.quiet_start);
                        self.cur += 1;

                        if mv == self.tt_move {
                            continue;
                        }

                        if self.board.see_ge(mv, 0) {
                            return Some(mv);
                        }

                        // Set the losing capture aside for the very end. The
                        // slots before `cur` are already consumed, so the
                        // stash can't clobber anything still pending.
                        self.moves[self.bad_end] = mv;
                        self.bad_end += 1;
                    }

                    self.stage = Stage::FirstKiller;
                }

                Stage::FirstKiller => {
                    self.stage = Stage::SecondKiller;
                    let killer = self.ctx.killers[0];

                    if self.is_viable_quiet(killer) {
                        return Some(killer);
                    }
                }

                Stage::SecondKiller => {
                    self.stage = Stage::Countermove;
                    let killer = self.ctx.killers[1];

                    if killer != self.ctx.killers[0] && self.is_viable_quiet(killer) {
                        return Some(killer);
                    }
                }

                Stage::Countermove => {
                    self.stage = Stage::GenQuiets;
                    let counter = self.ctx.countermove;

                    if counter != self.ctx.killers[0]
                        && counter != self.ctx.killers[1]
                        && self.is_viable_quiet(counter)
                    {
                        return Some(counter);
                    }
                }

                Stage::GenQuiets => {
                    let start = self.quiet_start;
                    self.board.generate_quiets(&mut self.moves);
                    self.score_quiets(history, start, self.moves.len());

                    // Deep nodes are worth a full sort; at shallow depth only
                    // the promising quiets are ordered and the rest stay in
                    // generation order.
                    let limit = if self.depth < SHALLOW_SORT_DEPTH {
                        SHALLOW_SORT_LIMIT
                    } else {
                        i32::MIN
                    };

                    self.insertion_sort(start, self.moves.len(), limit);
                    self.cur = start;
                    self.stage = Stage::Quiets;
                }

                Stage::Quiets => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves[self.cur];
                        self.cur += 1;

                        if !self.already_emitted(mv) {
                            return Some(mv);
                        }
                    }

                    self.cur = 0;
                    self.stage = Stage::BadCaptures;
                }

                // In stash order; the TT move never made it into the stash
                Stage::BadCaptures => {
                    if self.cur < self.bad_end {
                        let mv = self.moves[self.cur];
                        self.cur += 1;
                        return Some(mv);
                    }

                    self.stage = Stage::Done;
                }

                ////////////////////////////////////////////////////////////////
                //
                // In check: scored evasions
                //
                ////////////////////////////////////////////////////////////////

                Stage::EvasionTT => {
                    self.stage = Stage::GenEvasions;

                    if self.tt_move != Move::NONE
                        && self.board.is_pseudo_legal(self.tt_move)
                    {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenEvasions => {
                    self.board.generate_evasions(&mut self.moves);
                    self.score_evasions(history, 0, self.moves.len());
                    self.stage = Stage::Evasions;
                }

                Stage::Evasions => {
                    while self.cur < self.moves.len() {
                        let mv = self.select_best(self.cur, self.moves.len());
                        self.cur += 1;

                        if mv != self.tt_move {
                            return Some(mv);
                        }
                    }

                    self.stage = Stage::Done;
                }

                ////////////////////////////////////////////////////////////////
                //
                // Quiescence
                //
                ////////////////////////////////////////////////////////////////

                Stage::QSearchTT => {
                    self.stage = Stage::GenQsCaptures;

                    if self.tt_move != Move::NONE
                        && self.board.is_pseudo_legal(self.tt_move)
                    {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenQsCaptures => {
                    self.board.generate_captures(&mut self.moves);
                    self.score_captures(history, 0, self.moves.len());
                    self.stage = Stage::QsCaptures;
                }

                Stage::QsCaptures => {
                    while self.cur < self.moves.len() {
                        let mv = self.select_best(self.cur, self.moves.len());
                        self.cur += 1;

                        if mv == self.tt_move {
                            continue;
                        }

                        // Losing captures don't beat standing pat; unlike the
                        // main search there is no later stage to defer them to
                        if self.board.see_ge(mv, 0) {
                            return Some(mv);
                        }
                    }

                    if self.depth >= DEPTH_QS_CHECKS {
                        self.stage = Stage::GenQsChecks;
                    } else {
                        self.stage = Stage::Done;
                    }
                }

                Stage::GenQsChecks => {
                    self.cur = self.moves.len();
                    self.board.generate_quiet_checks(&mut self.moves);
                    self.stage = Stage::QsChecks;
                }

                Stage::QsChecks => {
                    while self.cur < self.moves.len() {
                        let mv = self.moves[self.cur];
                        self.cur += 1;

                        if mv != self.tt_move {
                            return Some(mv);
                        }
                    }

                    self.stage = Stage::Done;
                }

                ////////////////////////////////////////////////////////////////
                //
                // Deep quiescence: recaptures only
                //
                ////////////////////////////////////////////////////////////////

                Stage::RecaptureTT => {
                    self.stage = Stage::GenRecaptures;

                    if self.tt_move != Move::NONE
                        && self.tt_move.is_capture()
                        && Some(self.tt_move.tgt()) == self.recapture_sq
                        && self.board.is_pseudo_legal(self.tt_move)
                    {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenRecaptures => {
                    self.board.generate_captures(&mut self.moves);

                    let sq = self.recapture_sq;
                    self.moves
                        .retain(|mv| mv.is_capture() && Some(mv.tgt()) == sq);

                    self.score_captures(history, 0, self.moves.len());
                    self.stage = Stage::Recaptures;
                }

                Stage::Recaptures => {
                    while self.cur < self.moves.len() {
                        let mv = self.select_best(self.cur, self.moves.len());
                        self.cur += 1;

                        if mv != self.tt_move {
                            return Some(mv);
                        }
                    }

                    self.stage = Stage::Done;
                }

                ////////////////////////////////////////////////////////////////
                //
                // ProbCut
                //
                ////////////////////////////////////////////////////////////////

                Stage::ProbcutTT => {
                    self.stage = Stage::GenProbcutCaptures;

                    if self.tt_move != Move::NONE
                        && self.tt_move.is_capture()
                        && self.board.is_pseudo_legal(self.tt_move)
                        && self.board.see_ge(self.tt_move, self.see_threshold)
                    {
                        return Some(self.tt_move);
                    }
                }

                Stage::GenProbcutCaptures => {
                    self.board.generate_captures(&mut self.moves);
                    self.score_captures(history, 0, self.moves.len());
                    self.stage = Stage::ProbcutCaptures;
                }

                Stage::ProbcutCaptures => {
                    while self.cur < self.moves.len() {
                        let mv = self.select_best(self.cur, self.moves.len());
                        self.cur += 1;

                        if mv != self.tt_move
                            && self.board.see_ge(mv, self.see_threshold)
                        {
                            return Some(mv);
                        }
                    }

                    self.stage = Stage::Done;
                }

                Stage::Done => return None,
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Scoring
    //
    ////////////////////////////////////////////////////////////////////////////

    fn score_captures(&mut self, history: &History, start: usize, end: usize) {
        for i in start..end {
            let mv = self.moves[i];

            // Push promotions ride along with the captures and score as if
            // they captured a pawn; their history lives in the capture table
            let victim = if mv.is_capture() {
                self.board.get_at(mv.capture_sq()).unwrap().piece_type()
            } else {
                PieceType::Pawn
            };

            let idx = HistoryIndex::new(self.board, mv);
            self.scores[i] = MVV_FACTOR * SEE_VALUES[victim] + history.capture_score(idx);
        }
    }

    fn score_quiets(&mut self, history: &History, start: usize, end: usize) {
        for i in start..end {
            let mv = self.moves[i];
            let idx = HistoryIndex::new(self.board, mv);

            self.scores[i] =
                history.quiet_score(self.board.current, idx, mv, &self.ctx.priors);
        }
    }

    fn score_evasions(&mut self, history: &History, start: usize, end: usize) {
        for i in start..end {
            let mv = self.moves[i];
            let idx = HistoryIndex::new(self.board, mv);

            if mv.is_tactical() {
                let victim = if mv.is_capture() {
                    self.board.get_at(mv.capture_sq()).unwrap().piece_type()
                } else {
                    PieceType::Pawn
                };

                self.scores[i] =
                    MVV_FACTOR * SEE_VALUES[victim] + history.capture_score(idx);
            } else {
                // Quiet evasions sort strictly after every capture
                self.scores[i] = history.main_hist[idx].value()
                    + history.from_to[(self.board.current, mv)].value()
                    - EVASION_DEFER;
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Selection
    //
    ////////////////////////////////////////////////////////////////////////////

    /// One pass of selection sort: swap the best-scored move of
    /// `moves[start..end]` into `start` and return it. Ties go to the move
    /// generated first.
    fn select_best(&mut self, start: usize, end: usize) -> Move {
        let mut best = start;

        for i in start + 1..end {
            if self.scores[i] > self.scores[best] {
                best = i;
            }
        }

        self.moves.swap(start, best);
        self.scores.swap(start, best);
        self.moves[start]
    }

    /// Stable insertion sort, descending, of `moves[start..end]` - but only
    /// moves scoring above `limit` are pulled forward; the rest keep their
    /// generation order behind the sorted prefix.
    fn insertion_sort(&mut self, start: usize, end: usize, limit: i32) {
        let mut sorted_end = start;

        for i in start..end {
            let score = self.scores[i];

            if score <= limit {
                continue;
            }

            let mv = self.moves[i];
            let mut j = i;

            // Shift the unsorted gap right, then descend into the sorted
            // prefix to the insertion point
            while j > sorted_end {
                self.moves[j] = self.moves[j - 1];
                self.scores[j] = self.scores[j - 1];
                j -= 1;
            }

            while j > start && self.scores[j - 1] < score {
                self.moves[j] = self.moves[j - 1];
                self.scores[j] = self.scores[j - 1];
                j -= 1;
            }

            self.moves[j] = mv;
            self.scores[j] = score;
            sorted_end += 1;
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    //
    // Filters
    //
    ////////////////////////////////////////////////////////////////////////////

    /// Whether a killer or counter-move deserves its early slot: present,
    /// not already played as the hash move, genuinely quiet, and actually
    /// playable in this position.
    fn is_viable_quiet(&self, mv: Move) -> bool {
        mv != Move::NONE
            && mv != self.tt_move
            && mv.is_quiet()
            && self.board.is_pseudo_legal(mv)
    }

    /// Quiets already handed out in an earlier stage.
    fn already_emitted(&self, mv: Move) -> bool {
        mv == self.tt_move
            || mv == self.ctx.killers[0]
            || mv == self.ctx.killers[1]
            || mv == self.ctx.countermove
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
    use chess::movegen::MoveList;

    const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn drain(mut picker: MovePicker, history: &History) -> Vec<Move> {
        let mut yielded = Vec::new();
        while let Some(mv) = picker.next_move(history) {
            yielded.push(mv);
        }
        // Exhaustion is sticky
        assert_eq!(picker.next_move(history), None);
        assert_eq!(picker.next_move(history), None);
        yielded
    }

    fn all_moves(board: &Board) -> Vec<Move> {
        let mut list = MoveList::new();
        board.generate_all(&mut list);
        list.to_vec()
    }

    /// The picker must yield every pseudo-legal move exactly once, whatever
    /// hash move it is fed.
    #[test]
    fn yields_every_move_exactly_once() {
        let fens = [
            chess::board::START_FEN,
            KIWIPETE,
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "4r2k/8/8/8/8/8/2N5/R3K3 w - - 0 1",
        ];

        let history = History::boxed();

        for fen in fens {
            let board: Board = fen.parse().unwrap();
            let mut expected = all_moves(&board);
            expected.sort();

            // Once with no hash move, once with every generated move as the
            // hash move, once with a nonsense hash move
            let mut tt_moves = vec![Move::NONE, Move::new(
                chess::square::Square::A8,
                chess::square::Square::B3,
                chess::movegen::moves::MoveFlag::Capture,
            )];
            tt_moves.extend(expected.iter().copied());

            for tt_move in tt_moves {
                let picker =
                    MovePicker::new_search(&board, tt_move, 6, NodeContext::default());
                let mut yielded = drain(picker, &history);

                yielded.sort();
                assert_eq!(yielded, expected, "fen: {fen}, tt: {tt_move}");
            }
        }
    }

    #[test]
    fn hash_move_comes_first_regardless_of_score() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        // A modest quiet move; with captures on the board it would
        // otherwise come late
        let tt_move = board.find_move("a2a3").unwrap();

        let mut picker = MovePicker::new_search(&board, tt_move, 6, NodeContext::default());
        assert_eq!(picker.next_move(&history), Some(tt_move));
    }

    #[test]
    fn winning_captures_precede_quiets_and_losers_come_last() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        let picker = MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default());
        let yielded = drain(picker, &history);

        let first_quiet = yielded.iter().position(|mv| mv.is_quiet()).unwrap();

        // Everything before the first quiet is a winning capture, in
        // non-increasing victim order
        let mut last_victim_value = i32::MAX;
        for mv in &yielded[..first_quiet] {
            assert!(mv.is_tactical());
            assert!(board.see_ge(*mv, 0));

            let victim = board.get_at(mv.capture_sq()).unwrap().piece_type();
            let value = SEE_VALUES[victim];
            assert!(value <= last_victim_value, "captures out of MVV order");
            last_victim_value = value;
        }

        // Every losing capture sits behind every quiet
        let last_quiet = yielded.iter().rposition(|mv| mv.is_quiet()).unwrap();
        for mv in &yielded[last_quiet + 1..] {
            assert!(mv.is_tactical());
            assert!(!board.see_ge(*mv, 0));
        }
    }

    #[test]
    fn killers_and_countermove_slot_in_after_captures() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        let ctx = NodeContext {
            killers: [
                board.find_move("a2a3").unwrap(),
                board.find_move("g2g3").unwrap(),
            ],
            countermove: board.find_move("h2h4").unwrap(),
            priors: [None; 3],
        };

        let picker = MovePicker::new_search(&board, Move::NONE, 6, ctx.clone());
        let yielded = drain(picker, &history);

        let first_quiet = yielded.iter().position(|mv| mv.is_quiet()).unwrap();

        assert_eq!(yielded[first_quiet], ctx.killers[0]);
        assert_eq!(yielded[first_quiet + 1], ctx.killers[1]);
        assert_eq!(yielded[first_quiet + 2], ctx.countermove);

        // And none of them show up a second time
        let count = yielded
            .iter()
            .filter(|&&mv| {
                mv == ctx.killers[0] || mv == ctx.killers[1] || mv == ctx.countermove
            })
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn stale_killers_are_dropped_silently() {
        let board = Board::default();
        let history = History::boxed();

        // A "killer" that has no piece behind it, and one that is a capture
        let ctx = NodeContext {
            killers: [
                Move::new(
                    chess::square::Square::A5,
                    chess::square::Square::A6,
                    chess::movegen::moves::MoveFlag::Quiet,
                ),
                Move::new(
                    chess::square::Square::B1,
                    chess::square::Square::C3,
                    chess::movegen::moves::MoveFlag::Capture,
                ),
            ],
            countermove: Move::NONE,
            priors: [None; 3],
        };

        let picker = MovePicker::new_search(&board, Move::NONE, 6, ctx);
        let yielded = drain(picker, &history);

        let mut expected = all_moves(&board);
        expected.sort();
        let mut sorted = yielded.clone();
        sorted.sort();

        assert_eq!(sorted, expected);
    }

    #[test]
    fn identical_inputs_yield_identical_sequences() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        let a = drain(
            MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default()),
            &history,
        );
        let b = drain(
            MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default()),
            &history,
        );

        assert_eq!(a, b);
    }

    #[test]
    fn history_steers_quiet_ordering() {
        let board = Board::default();
        let mut history = History::boxed();
        let mut killers = [Move::NONE; 2];

        let favored = board.find_move("e2e4").unwrap();
        history.update_stats(&board, &[None; 3], &mut killers, favored, &[], 64);

        // Fresh context: no killers, so the history bonus decides
        let picker = MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default());
        let yielded = drain(picker, &History::boxed());
        assert_ne!(yielded[0], favored, "empty history: generation order");

        let picker = MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default());
        let mut picker_yields = Vec::new();
        let mut p = picker;
        while let Some(mv) = p.next_move(&history) {
            picker_yields.push(mv);
        }
        assert_eq!(picker_yields[0], favored);
    }

    #[test]
    fn check_positions_yield_evasions_with_captures_first() {
        // Black rook a1 can capture the checking rook on e1
        let board: Board = "4k3/8/8/8/8/8/8/r3R1K1 b - - 0 1".parse().unwrap();
        assert!(board.in_check());

        let history = History::boxed();
        let picker = MovePicker::new_search(&board, Move::NONE, 6, NodeContext::default());
        let yielded = drain(picker, &history);

        assert_eq!(yielded[0], board.find_move("a1e1").unwrap());

        let mut expected = all_moves(&board);
        expected.sort();
        let mut sorted = yielded;
        sorted.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn probcut_only_yields_captures_clearing_the_threshold() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        // Queen takes rook... no rook hangs here; feed the pawn capture as
        // the hash move and demand 100 centipawns
        let tt_move = board.find_move("g2h3").unwrap();
        let picker = MovePicker::new_probcut(&board, tt_move, 100);
        let yielded = drain(picker, &history);

        assert_eq!(yielded[0], tt_move);

        for mv in &yielded {
            assert!(mv.is_tactical());
            assert!(board.see_ge(*mv, 100));
        }

        // A hash move below the threshold is not emitted early
        let weak_tt = board.find_move("e2a6").unwrap();
        let picker = MovePicker::new_probcut(&board, weak_tt, 100);
        let yielded = drain(picker, &history);
        assert!(!yielded.contains(&weak_tt));
    }

    #[test]
    fn deep_quiescence_restricts_to_recaptures() {
        let board: Board = KIWIPETE.parse().unwrap();
        let history = History::boxed();

        let sq = chess::square::Square::G6;
        let picker = MovePicker::new_qsearch(&board, Move::NONE, -4, Some(sq));
        let yielded = drain(picker, &history);

        assert_eq!(yielded, vec![board.find_move("e5g6").unwrap()]);

        // One ply shallower, ordinary quiescence rules apply and winning
        // captures elsewhere come back
        let picker = MovePicker::new_qsearch(&board, Move::NONE, -3, Some(sq));
        let yielded = drain(picker, &history);
        assert!(yielded.iter().any(|&mv| mv != board.find_move("e5g6").unwrap()));
    }

    #[test]
    fn shallow_quiescence_adds_quiet_checks() {
        // White to move, queen out, no captures available
        let board: Board = "8/5k2/8/8/8/8/3N4/4K2Q w - - 0 1".parse().unwrap();
        let history = History::boxed();

        let picker = MovePicker::new_qsearch(&board, Move::NONE, 0, None);
        let yielded = drain(picker, &history);

        assert!(!yielded.is_empty());
        assert!(yielded.iter().all(|mv| mv.is_quiet()));

        // One step deeper, checks are no longer generated
        let picker = MovePicker::new_qsearch(&board, Move::NONE, -1, None);
        let yielded = drain(picker, &history);
        assert!(yielded.is_empty());
    }
}
