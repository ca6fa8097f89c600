//! The UCI front end: a stdin loop on the main thread, a search thread
//! behind a channel, and the option registry tying `setoption` commands to
//! their effects on the engine state.

use chess::board::Board;
use chess::zobrist::ZHash;
use colored::Colorize;
use engine::history_tables::History;
use engine::time_control::{TimeControlHandle, TimeController};
use engine::transpositions::{TTable, DEFAULT_TT_SIZE_MB};
use engine::search::Searcher;
use std::io::{stdout, BufRead, Write};
use std::sync::mpsc::Sender;
use std::time::Duration;
use uci::client::UciClientMessage;
use uci::engine::UciEngineMessage;
use uci::options::{OptionRegistry, OptionType, UciOption};

const NAME: &str = "Mallorn";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHOR: &str = "the Mallorn authors";

fn options() -> OptionRegistry {
    OptionRegistry::new([
        UciOption {
            name: "Hash",
            option_type: OptionType::Spin {
                default: DEFAULT_TT_SIZE_MB as i64,
                min: 1,
                max: 1024,
            },
        },
        UciOption {
            name: "Clear Hash",
            option_type: OptionType::Button,
        },
        UciOption {
            name: "Move Overhead",
            option_type: OptionType::Spin { default: 30, min: 0, max: 5000 },
        },
    ])
}

pub struct EngineController {
    board: Board,

    /// Hashes of the positions played out on the board, oldest first. Handed
    /// to the search for repetition detection.
    game_history: Vec<ZHash>,

    options: OptionRegistry,
    search_thread: SearchThread,
    tc_handle: Option<TimeControlHandle>,
}

impl EngineController {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            game_history: Vec::new(),
            options: options(),
            search_thread: SearchThread::new(),
            tc_handle: None,
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = std::io::stdin().lock();

        eprintln!("{NAME} {VERSION}");

        for line in stdin.lines() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<UciClientMessage>() {
                Ok(command) => {
                    if self.handle(command)? {
                        break;
                    }
                }
                Err(err) => eprintln!("{}: {line}", err.to_string().red()),
            }

            stdout().flush()?;
        }

        Ok(())
    }

    /// Dispatch one command; returns true on `quit`.
    fn handle(&mut self, command: UciClientMessage) -> anyhow::Result<bool> {
        match command {
            UciClientMessage::Uci => {
                println!(
                    "{}",
                    UciEngineMessage::Id {
                        name: format!("{NAME} {VERSION}"),
                        author: AUTHOR.to_string(),
                    }
                );
                print!("{}", self.options);
                println!("{}", UciEngineMessage::UciOk);
            }

            UciClientMessage::IsReady => println!("{}", UciEngineMessage::ReadyOk),

            UciClientMessage::Debug(_) => {}

            UciClientMessage::UciNewGame => {
                self.board = Board::default();
                self.game_history.clear();
                self.tc_handle = None;
                self.search_thread.clear_tables();
            }

            UciClientMessage::Position(base, moves) => {
                match Self::replay(base, &moves) {
                    Ok((board, hashes)) => {
                        self.board = board;
                        self.game_history = hashes;
                    }
                    Err(err) => eprintln!("{}", err.to_string().red()),
                }
            }

            UciClientMessage::Go(tc) => {
                let overhead = self
                    .options
                    .spin("Move Overhead")
                    .map(|ms| Duration::from_millis(ms as u64))
                    .unwrap_or_default();

                let (tc, handle) = TimeController::new(tc, self.board.current, overhead);
                self.tc_handle = Some(handle);
                self.search_thread
                    .search(self.board, self.game_history.clone(), tc);
            }

            UciClientMessage::Stop => {
                if let Some(handle) = &self.tc_handle {
                    handle.stop();
                }
            }

            UciClientMessage::SetOption(name, value) => {
                // Validate and store first; the effect only fires for a
                // value the registry accepted
                match self.options.set(&name, &value) {
                    Ok(_) => self.apply_option(&name),
                    Err(err) => eprintln!("{}", err.to_string().red()),
                }
            }

            UciClientMessage::Quit => return Ok(true),
        }

        Ok(false)
    }

    fn apply_option(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("Hash") {
            if let Some(mb) = self.options.spin("Hash") {
                self.search_thread.resize_tt(mb as usize);
            }
        } else if name.eq_ignore_ascii_case("Clear Hash") {
            self.search_thread.clear_tables();
        }
        // "Move Overhead" has no immediate effect; it is read at `go` time
    }

    /// Play a move list out from a base position, collecting the hash of
    /// every position along the way.
    fn replay(base: Board, moves: &[String]) -> anyhow::Result<(Board, Vec<ZHash>)> {
        let mut board = base;
        let mut hashes = Vec::with_capacity(moves.len());

        for mv in moves {
            hashes.push(board.hash);
            board = board.play_move(board.find_move(mv)?);
        }

        Ok((board, hashes))
    }
}

////////////////////////////////////////////////////////////////////////////////
//
// Search thread
//
////////////////////////////////////////////////////////////////////////////////

/// The thread that owns the transposition table and history tables and runs
/// the actual searches, so the main thread stays free to process `stop`.
struct SearchThread {
    tx: Sender<SearchCommand>,
}

enum SearchCommand {
    Search(Board, Vec<ZHash>, TimeController),
    ClearTables,
    ResizeTT(usize),
}

impl SearchThread {
    fn new() -> Self {
        let (tx, rx) = std::sync::mpsc::channel::<SearchCommand>();

        std::thread::spawn(move || {
            let mut tt = TTable::with_capacity(DEFAULT_TT_SIZE_MB);
            let mut history = History::boxed();

            for command in rx {
                match command {
                    SearchCommand::Search(board, hashes, tc) => {
                        tt.increment_age();

                        let report = Searcher::new(&mut tt, &mut history, tc.clone(), hashes)
                            .search(&board);

                        tc.stop();
                        println!("{}", UciEngineMessage::BestMove(report.best_move));
                    }

                    SearchCommand::ClearTables => {
                        tt.clear();
                        history.clear();
                    }

                    SearchCommand::ResizeTT(mb) => tt.resize(mb),
                }
            }
        });

        Self { tx }
    }

    fn search(&self, board: Board, hashes: Vec<ZHash>, tc: TimeController) {
        self.tx
            .send(SearchCommand::Search(board, hashes, tc))
            .unwrap();
    }

    fn clear_tables(&self) {
        self.tx.send(SearchCommand::ClearTables).unwrap();
    }

    fn resize_tt(&self, mb: usize) {
        self.tx.send(SearchCommand::ResizeTT(mb)).unwrap();
    }
}
