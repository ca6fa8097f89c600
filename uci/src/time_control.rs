//! The time-control portion of a `go` command.

use anyhow::anyhow;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeControl {
    /// Search until told to stop
    #[default]
    Infinite,

    /// Search to a fixed depth, in plies
    Depth(usize),

    /// Search a fixed number of nodes
    Nodes(u64),

    /// Spend a fixed amount of time on this move
    MoveTime(Duration),

    /// A running game clock; the engine budgets its own time
    Clock {
        wtime: Duration,
        btime: Duration,
        winc: Duration,
        binc: Duration,
        movestogo: Option<u32>,
    },
}

impl FromStr for TimeControl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut parts = s.split_whitespace().peekable();

        let mut wtime = None;
        let mut btime = None;
        let mut winc = Duration::ZERO;
        let mut binc = Duration::ZERO;
        let mut movestogo = None;

        while let Some(key) = parts.next() {
            let mut value = || {
                parts
                    .next()
                    .ok_or(anyhow!("go {key} is missing its value"))
            };

            match key {
                "infinite" => return Ok(Self::Infinite),
                "depth" => return Ok(Self::Depth(value()?.parse()?)),
                "nodes" => return Ok(Self::Nodes(value()?.parse()?)),
                "movetime" => {
                    return Ok(Self::MoveTime(Duration::from_millis(value()?.parse()?)))
                }
                "wtime" => wtime = Some(Duration::from_millis(value()?.parse()?)),
                "btime" => btime = Some(Duration::from_millis(value()?.parse()?)),
                "winc" => winc = Duration::from_millis(value()?.parse()?),
                "binc" => binc = Duration::from_millis(value()?.parse()?),
                "movestogo" => movestogo = Some(value()?.parse()?),
                _ => return Err(anyhow!("Unknown go argument: {key}")),
            }
        }

        match (wtime, btime) {
            (Some(wtime), Some(btime)) => Ok(Self::Clock {
                wtime,
                btime,
                winc,
                binc,
                movestogo,
            }),
            (None, None) => Ok(Self::Infinite),
            _ => Err(anyhow!("Only one side's clock was given")),
        }
    }
}

impl Display for TimeControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infinite => write!(f, "infinite"),
            Self::Depth(depth) => write!(f, "depth {depth}"),
            Self::Nodes(nodes) => write!(f, "nodes {nodes}"),
            Self::MoveTime(time) => write!(f, "movetime {}", time.as_millis()),
            Self::Clock { wtime, btime, winc, binc, movestogo } => {
                write!(
                    f,
                    "wtime {} btime {} winc {} binc {}",
                    wtime.as_millis(),
                    btime.as_millis(),
                    winc.as_millis(),
                    binc.as_millis()
                )?;

                if let Some(movestogo) = movestogo {
                    write!(f, " movestogo {movestogo}")?;
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_arguments() {
        assert_eq!("infinite".parse::<TimeControl>().unwrap(), TimeControl::Infinite);
        assert_eq!("".parse::<TimeControl>().unwrap(), TimeControl::Infinite);
        assert_eq!("depth 12".parse::<TimeControl>().unwrap(), TimeControl::Depth(12));
        assert_eq!(
            "movetime 2500".parse::<TimeControl>().unwrap(),
            TimeControl::MoveTime(Duration::from_millis(2500))
        );
        assert_eq!(
            "wtime 60000 btime 55000 winc 1000 binc 1000".parse::<TimeControl>().unwrap(),
            TimeControl::Clock {
                wtime: Duration::from_millis(60000),
                btime: Duration::from_millis(55000),
                winc: Duration::from_millis(1000),
                binc: Duration::from_millis(1000),
                movestogo: None,
            }
        );

        assert!("wtime 60000".parse::<TimeControl>().is_err());
        assert!("depth".parse::<TimeControl>().is_err());
    }
}
