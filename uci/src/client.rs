//! Messages sent from the GUI (the "client") to the engine.

use crate::time_control::TimeControl;
use anyhow::anyhow;
use chess::board::Board;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum UciClientMessage {
    Uci,
    Debug(bool),
    IsReady,
    SetOption(String, String),
    UciNewGame,
    /// A base position plus the moves played from it, still in coordinate
    /// notation; they are resolved against the board as they are applied.
    Position(Board, Vec<String>),
    Go(TimeControl),
    Stop,
    Quit,
}

impl FromStr for UciClientMessage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        use UciClientMessage::*;

        let s = s.trim();
        let (msg, rest) = s.split_once(' ').unwrap_or((s, ""));

        match msg {
            "uci" => Ok(Uci),
            "isready" => Ok(IsReady),
            "ucinewgame" => Ok(UciNewGame),
            "stop" => Ok(Stop),
            "quit" => Ok(Quit),

            "debug" => match rest.split_whitespace().next() {
                Some("on") => Ok(Debug(true)),
                Some("off") => Ok(Debug(false)),
                _ => Err(anyhow!("Invalid debug flag: {rest}")),
            },

            "setoption" => {
                let rest = rest
                    .strip_prefix("name")
                    .ok_or(anyhow!("setoption is missing 'name'"))?
                    .trim_start();

                // Option names may contain spaces, so split on the "value"
                // keyword rather than whitespace
                let (name, value) = match rest.split_once(" value ") {
                    Some((name, value)) => (name.trim(), value.trim()),
                    None => (rest.trim(), ""),
                };

                if name.is_empty() {
                    return Err(anyhow!("setoption is missing the option name"));
                }

                Ok(SetOption(name.to_string(), value.to_string()))
            }

            "position" => {
                let mut parts = rest.split_whitespace();

                let board = match parts.next() {
                    Some("startpos") => Board::default(),
                    Some("fen") => {
                        let fen = parts
                            .by_ref()
                            .take_while(|&word| word != "moves")
                            .collect::<Vec<_>>()
                            .join(" ");

                        return Ok(Position(
                            fen.parse()?,
                            parts.map(String::from).collect(),
                        ));
                    }
                    _ => return Err(anyhow!("Invalid position command: {rest}")),
                };

                let moves = match parts.next() {
                    Some("moves") => parts.map(String::from).collect(),
                    Some(other) => {
                        return Err(anyhow!("Invalid position command: {other}"))
                    }
                    None => Vec::new(),
                };

                Ok(Position(board, moves))
            }

            "go" => Ok(Go(rest.parse()?)),

            _ => Err(anyhow!("Unknown UCI command: {msg}")),
        }
    }
}

impl Display for UciClientMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use UciClientMessage::*;

        match self {
            Uci => write!(f, "uci"),
            Debug(flag) => write!(f, "debug {}", if *flag { "on" } else { "off" }),
            IsReady => write!(f, "isready"),
            SetOption(name, value) => {
                write!(f, "setoption name {name}")?;
                if !value.is_empty() {
                    write!(f, " value {value}")?;
                }
                Ok(())
            }
            UciNewGame => write!(f, "ucinewgame"),
            Position(board, moves) => {
                write!(f, "position fen {}", board.to_fen())?;
                if !moves.is_empty() {
                    write!(f, " moves")?;
                    for mv in moves {
                        write!(f, " {mv}")?;
                    }
                }
                Ok(())
            }
            Go(tc) => write!(f, "go {tc}"),
            Stop => write!(f, "stop"),
            Quit => write!(f, "quit"),
        }
    }
}
