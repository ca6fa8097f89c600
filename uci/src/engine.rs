//! Messages sent from the engine back to the GUI.

use chess::movegen::moves::Move;
use std::fmt::Display;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum UciEngineMessage {
    Id { name: String, author: String },
    UciOk,
    ReadyOk,
    BestMove(Move),
    Info(SearchInfo),
}

impl Display for UciEngineMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use UciEngineMessage::*;

        match self {
            Id { name, author } => {
                writeln!(f, "id name {name}")?;
                write!(f, "id author {author}")
            }
            UciOk => write!(f, "uciok"),
            ReadyOk => write!(f, "readyok"),
            BestMove(mv) => write!(f, "bestmove {mv}"),
            Info(info) => write!(f, "{info}"),
        }
    }
}

/// One `info` line reporting on a finished search iteration.
#[derive(Debug, Clone, Default)]
pub struct SearchInfo {
    pub depth: usize,
    pub seldepth: usize,
    pub score: ScoreInfo,
    pub nodes: u64,
    pub time: Duration,
    pub hashfull: usize,
    pub pv: Vec<Move>,
}

/// A score is reported in centipawns, unless a forced mate was found, in
/// which case the distance (in moves, not plies) is reported instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreInfo {
    Cp(i32),
    Mate(i32),
}

impl Default for ScoreInfo {
    fn default() -> Self {
        Self::Cp(0)
    }
}

impl Display for SearchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "info depth {} seldepth {}", self.depth, self.seldepth)?;

        match self.score {
            ScoreInfo::Cp(cp) => write!(f, " score cp {cp}")?,
            ScoreInfo::Mate(moves) => write!(f, " score mate {moves}")?,
        }

        let millis = self.time.as_millis() as u64;
        let nps = self.nodes * 1000 / millis.max(1);

        write!(
            f,
            " nodes {} nps {nps} time {millis} hashfull {}",
            self.nodes, self.hashfull
        )?;

        if !self.pv.is_empty() {
            write!(f, " pv")?;
            for mv in &self.pv {
                write!(f, " {mv}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::movegen::moves::MoveFlag;
    use chess::square::Square::*;

    #[test]
    fn info_lines_follow_the_wire_format() {
        let info = SearchInfo {
            depth: 8,
            seldepth: 14,
            score: ScoreInfo::Cp(35),
            nodes: 123456,
            time: Duration::from_millis(250),
            hashfull: 17,
            pv: vec![Move::new(E2, E4, MoveFlag::DoublePush)],
        };

        assert_eq!(
            info.to_string(),
            "info depth 8 seldepth 14 score cp 35 nodes 123456 nps 493824 \
             time 250 hashfull 17 pv e2e4"
        );

        let mate = SearchInfo {
            score: ScoreInfo::Mate(-3),
            ..SearchInfo::default()
        };
        assert!(mate.to_string().contains("score mate -3"));
    }

    #[test]
    fn bestmove_prints_the_move() {
        let msg = UciEngineMessage::BestMove(Move::new(G1, F3, MoveFlag::Quiet));
        assert_eq!(msg.to_string(), "bestmove g1f3");
    }
}
