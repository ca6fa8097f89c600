//! Search limits and the stop signal.
//!
//! The UCI thread keeps a [`TimeControlHandle`] and the search thread a
//! [`TimeController`]; the only thing they share is an atomic stop flag, so
//! `stop` from the GUI interrupts the search without any locking.

use crate::search::params::Depth;
use chess::piece::Color;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uci::time_control::TimeControl;

/// Time budgeted from a running clock: a twentieth of the remaining time
/// plus half the increment, minus the transmission overhead.
const CLOCK_FRACTION: u32 = 20;

#[derive(Debug, Clone)]
pub struct TimeController {
    stop: Arc<AtomicBool>,
    started: Instant,
    budget: Option<Duration>,
    max_depth: Option<Depth>,
    max_nodes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct TimeControlHandle {
    stop: Arc<AtomicBool>,
}

impl TimeControlHandle {
    /// Interrupt the running search.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl TimeController {
    pub fn new(
        tc: TimeControl,
        side: Color,
        overhead: Duration,
    ) -> (Self, TimeControlHandle) {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = TimeControlHandle { stop: stop.clone() };

        let mut controller = Self {
            stop,
            started: Instant::now(),
            budget: None,
            max_depth: None,
            max_nodes: None,
        };

        match tc {
            TimeControl::Infinite => {}
            TimeControl::Depth(depth) => controller.max_depth = Some(depth as Depth),
            TimeControl::Nodes(nodes) => controller.max_nodes = Some(nodes),
            TimeControl::MoveTime(time) => {
                controller.budget = Some(time.saturating_sub(overhead))
            }
            TimeControl::Clock { wtime, btime, winc, binc, movestogo } => {
                let (time, inc) = if side.is_white() {
                    (wtime, winc)
                } else {
                    (btime, binc)
                };

                let slice = match movestogo {
                    Some(moves) => time / (moves + 1).max(1),
                    None => time / CLOCK_FRACTION,
                };

                let budget = (slice + inc / 2).saturating_sub(overhead);
                controller.budget = Some(budget.max(Duration::from_millis(1)));
            }
        }

        (controller, handle)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Checked from the search loop every so many nodes.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }

        if let Some(budget) = self.budget {
            if self.elapsed() >= budget {
                return true;
            }
        }

        self.max_nodes.is_some_and(|max| nodes >= max)
    }

    /// Whether a next iterative-deepening iteration may start.
    pub fn may_deepen(&self, depth: Depth) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// Flag the search as done, so a pondering GUI sees a consistent state.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_limits_gate_deepening() {
        let (tc, _) =
            TimeController::new(TimeControl::Depth(4), Color::White, Duration::ZERO);
        assert!(tc.may_deepen(4));
        assert!(!tc.may_deepen(5));
        assert!(!tc.should_stop(0));
    }

    #[test]
    fn node_limits_stop_the_search() {
        let (tc, _) =
            TimeController::new(TimeControl::Nodes(1000), Color::Black, Duration::ZERO);
        assert!(!tc.should_stop(999));
        assert!(tc.should_stop(1000));
    }

    #[test]
    fn the_handle_interrupts() {
        let (tc, handle) =
            TimeController::new(TimeControl::Infinite, Color::White, Duration::ZERO);
        assert!(!tc.should_stop(0));
        handle.stop();
        assert!(tc.should_stop(0));
    }
}
