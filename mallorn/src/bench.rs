//! A fixed-depth benchmark over a small suite of positions. The node count
//! doubles as a signature: any functional change to search or move ordering
//! shows up as a different total.

use chess::board::Board;
use colored::Colorize;
use engine::history_tables::History;
use engine::search::Searcher;
use engine::time_control::TimeController;
use engine::transpositions::TTable;
use itertools::Itertools;
use std::time::{Duration, Instant};
use uci::time_control::TimeControl;

const BENCH_FENS: [&str; 8] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
    "r1bqkb1r/pp1n1ppp/2p1pn2/3p4/2PP4/2N1PN2/PP3PPP/R1BQKB1R w KQkq - 0 6",
];

pub fn run(depth: usize) -> anyhow::Result<()> {
    let mut tt = TTable::with_capacity(16);
    let mut history = History::boxed();
    let mut total_nodes = 0;
    let started = Instant::now();

    for (i, fen) in BENCH_FENS.iter().enumerate() {
        let board: Board = fen.parse()?;
        let (tc, _) = TimeController::new(
            TimeControl::Depth(depth),
            board.current,
            Duration::ZERO,
        );

        tt.clear();
        history.clear();

        let report = Searcher::new(&mut tt, &mut history, tc, Vec::new())
            .silent()
            .search(&board);

        total_nodes += report.nodes;

        println!(
            "{:>2}/{}: bestmove {:>6}  {:>10} nodes  {fen}",
            i + 1,
            BENCH_FENS.len(),
            report.best_move.to_string(),
            report.nodes,
        );
    }

    let elapsed = started.elapsed();
    let nps = total_nodes * 1000 / elapsed.as_millis().max(1) as u64;

    println!();
    println!("{}: {total_nodes}", "nodes".bright_green());
    println!("{}:   {}", "nps".bright_green(), nps.to_string().separate_thousands());

    Ok(())
}

/// Format a number with thousands separators, for the bench summary line.
trait SeparateThousands {
    fn separate_thousands(&self) -> String;
}

impl SeparateThousands for String {
    fn separate_thousands(&self) -> String {
        self.chars()
            .rev()
            .chunks(3)
            .into_iter()
            .map(|chunk| chunk.collect::<String>())
            .join(",")
            .chars()
            .rev()
            .collect()
    }
}
