//! Warp tunnel endpoints and the hand-off protocol.
//!
//! Each endpoint owns an unbounded FIFO of balls in transit. A ball that
//! steps onto a warp cell is pushed onto the queue of the endpoint that
//! cell links to; that endpoint's worker pops balls strictly in arrival
//! order, holds each for the tunnel delay, then waits for its own cell to
//! be free before putting the ball back on the board.
//!
//! Queues are independent of cell locks: a ball in transit holds no lock.
//! The wait for a free exit parks on the endpoint's condvar, paired with
//! the exit cell's mutex and signalled when a ball leaves that cell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Condvar;
use std::thread;
use std::time::Duration;

use breakout_core::{BallId, BallStatus, CellKind, Pos, WarpId};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, trace};

use crate::board::Board;
use crate::sync::{lock, wait_while};

/// How long a warp worker blocks on its queue, or on an occupied exit,
/// before re-checking shutdown.
pub const QUEUE_POLL: Duration = Duration::from_millis(50);

/// One mouth of a warp tunnel.
pub struct WarpEndpoint {
    pos: Pos,
    queue_tx: Sender<BallId>,
    queue_rx: Receiver<BallId>,
    /// Signalled when the ball on `pos` leaves. Only ever waited on with
    /// that cell's mutex.
    exit_free: Condvar,
}

impl WarpEndpoint {
    pub(crate) fn new(pos: Pos) -> Self {
        let (queue_tx, queue_rx) = crossbeam_channel::unbounded();
        Self {
            pos,
            queue_tx,
            queue_rx,
            exit_free: Condvar::new(),
        }
    }

    /// The cell this endpoint releases balls onto.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Balls waiting in this endpoint's queue (excluding one already
    /// dequeued by the worker).
    pub fn queued(&self) -> usize {
        self.queue_rx.len()
    }

    /// Enqueue a ball. Never blocks and never fails, however many balls
    /// are already waiting.
    pub(crate) fn accept(&self, ball: BallId) {
        // The endpoint owns the receiver, so the channel cannot disconnect.
        let _ = self.queue_tx.send(ball);
    }
}

impl std::fmt::Debug for WarpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarpEndpoint")
            .field("pos", &self.pos)
            .field("queued", &self.queued())
            .finish()
    }
}

impl Board {
    /// Queue `ball` on warp endpoint `warp`, behind any earlier arrivals.
    ///
    /// The caller has already taken the ball off the grid and marked it
    /// in transit.
    pub(crate) fn accept(&self, warp: WarpId, ball: BallId) {
        self.warps[warp.index()].accept(ball);
    }

    /// Wake the warp worker waiting on `vacated` to empty, if it is a warp
    /// cell. Called with that cell's lock held.
    pub(crate) fn notify_exit_vacated(&self, vacated: &crate::cell::Cell) {
        if let (CellKind::Warp, Some(receiver)) = (vacated.kind, vacated.warp) {
            // The cell links to its partner; the endpoint sitting on it is
            // the partner's partner.
            self.warps[receiver.partner().index()].exit_free.notify_all();
        }
    }

    /// Pop the earliest-arrived ball from `warp`'s queue, waiting up to
    /// `timeout` for one to arrive.
    pub fn next_in_tunnel(&self, warp: WarpId, timeout: Duration) -> Option<BallId> {
        match self.warps[warp.index()].queue_rx.recv_timeout(timeout) {
            Ok(ball) => Some(ball),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Try to release `ball` from `warp` onto the endpoint's cell.
    ///
    /// Succeeds only if the cell is unoccupied; the ball then takes the
    /// endpoint's position, becomes [`Active`](BallStatus::Active) with its
    /// velocity unchanged, and its worker is woken.
    pub fn try_emerge(&self, warp: WarpId, ball: BallId) -> bool {
        self.emerge_within(warp, ball, Duration::ZERO)
    }

    /// Like [`try_emerge`](Self::try_emerge), but if the exit is occupied,
    /// block until the ball on it moves away or `timeout` elapses.
    pub fn emerge_within(&self, warp: WarpId, ball: BallId, timeout: Duration) -> bool {
        let endpoint = &self.warps[warp.index()];
        let exit = endpoint.pos;
        let Some(index) = self.index_of(exit) else {
            return false;
        };
        // A single cell lock, then the ball record: the usual lock order.
        let mut cell = wait_while(&endpoint.exit_free, lock(&self.cells[index]), timeout, |c| {
            c.occupant.is_some()
        });
        if cell.occupant.is_some() {
            return false;
        }
        cell.occupant = Some(ball);
        {
            let mut state = lock(&self.balls[ball.index()].state);
            state.pos = exit;
            state.status = BallStatus::Active;
        }
        drop(cell);
        self.notify_ball(ball);
        trace!("{ball} emerged from {warp} at {exit}");
        true
    }

    /// Worker loop for one warp endpoint. Runs until `shutdown` is set.
    ///
    /// A ball dequeued when shutdown arrives stays in transit.
    pub fn run_warp(&self, warp: WarpId, tunnel_delay: Duration, shutdown: &AtomicBool) {
        debug!("{warp} worker started at {}", self.warps[warp.index()].pos);
        'outer: while !shutdown.load(Ordering::Acquire) {
            let Some(ball) = self.next_in_tunnel(warp, QUEUE_POLL) else {
                continue;
            };
            if !tunnel_delay.is_zero() {
                thread::sleep(tunnel_delay);
            }
            while !self.emerge_within(warp, ball, QUEUE_POLL) {
                if shutdown.load(Ordering::Acquire) {
                    break 'outer;
                }
            }
        }
        debug!("{warp} worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::{MoveOutcome, Velocity};
    use std::sync::Arc;
    use std::time::Instant;

    /// Two balls lined up to enter the warp at (3,3) one after the other.
    fn tunnel_board() -> (Board, WarpId, BallId, BallId) {
        let mut b = Board::new(10, 10).unwrap();
        let (_entry, exit) = b.add_warp_pair(Pos::new(3, 3), Pos::new(8, 8)).unwrap();
        let first = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        let second = b.place_ball(Pos::new(4, 4), Velocity::new(-1, -1)).unwrap();
        (b, exit, first, second)
    }

    #[test]
    fn accept_never_assumes_empty() {
        let (b, exit, first, second) = tunnel_board();
        assert_eq!(b.move_ball(first), MoveOutcome::Transferred);
        assert_eq!(b.move_ball(second), MoveOutcome::Transferred);
        assert_eq!(b.warp(exit).queued(), 2);
    }

    #[test]
    fn accept_appends_behind_earlier_arrivals() {
        let (b, exit, first, second) = tunnel_board();
        assert_eq!(b.move_ball(first), MoveOutcome::Transferred);
        b.accept(exit, second);
        assert_eq!(b.warp(exit).queued(), 2);
        assert_eq!(b.next_in_tunnel(exit, Duration::ZERO), Some(first));
        assert_eq!(b.next_in_tunnel(exit, Duration::ZERO), Some(second));
    }

    #[test]
    fn dequeue_is_fifo() {
        let (b, exit, first, second) = tunnel_board();
        b.move_ball(second);
        b.move_ball(first);
        assert_eq!(b.next_in_tunnel(exit, Duration::ZERO), Some(second));
        assert_eq!(b.next_in_tunnel(exit, Duration::ZERO), Some(first));
        assert_eq!(b.next_in_tunnel(exit, Duration::ZERO), None);
    }

    #[test]
    fn emerge_waits_for_free_exit() {
        let (b, exit, first, second) = tunnel_board();
        b.move_ball(first);
        b.move_ball(second);
        let ball = b.next_in_tunnel(exit, Duration::ZERO).unwrap();
        assert!(b.try_emerge(exit, ball));
        let placed = b.ball(ball);
        assert_eq!(placed.pos, Pos::new(8, 8));
        assert_eq!(placed.status, BallStatus::Active);
        assert_eq!(placed.vel, Velocity::new(1, 1));

        // The exit is now occupied by the first ball.
        let next = b.next_in_tunnel(exit, Duration::ZERO).unwrap();
        assert!(!b.try_emerge(exit, next));
        assert_eq!(b.ball(next).status, BallStatus::InTransit);

        // Move the first ball off the exit; the second can follow.
        assert_ne!(b.move_ball(ball), MoveOutcome::Transferred);
        assert!(b.try_emerge(exit, next));
        assert_eq!(b.cell(8, 8).read().occupant, Some(next));
    }

    #[test]
    fn emerge_within_times_out_on_a_blocked_exit() {
        let (b, exit, first, second) = tunnel_board();
        b.move_ball(first);
        b.move_ball(second);
        let ball = b.next_in_tunnel(exit, Duration::ZERO).unwrap();
        assert!(b.try_emerge(exit, ball));
        let next = b.next_in_tunnel(exit, Duration::ZERO).unwrap();

        let start = Instant::now();
        assert!(!b.emerge_within(exit, next, Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(b.ball(next).status, BallStatus::InTransit);
        assert_eq!(b.cell(8, 8).read().occupant, Some(ball));
    }

    #[test]
    fn emerge_within_wakes_when_exit_is_vacated() {
        let (b, exit, first, second) = tunnel_board();
        b.move_ball(first);
        b.move_ball(second);
        let ball = b.next_in_tunnel(exit, Duration::ZERO).unwrap();
        assert!(b.try_emerge(exit, ball));
        let next = b.next_in_tunnel(exit, Duration::ZERO).unwrap();
        let b = Arc::new(b);

        let waiter = {
            let b = Arc::clone(&b);
            thread::spawn(move || {
                let start = Instant::now();
                let placed = b.emerge_within(exit, next, Duration::from_secs(10));
                (placed, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(b.move_ball(ball), MoveOutcome::Moved);

        let (placed, waited) = waiter.join().unwrap();
        assert!(placed);
        assert!(waited < Duration::from_secs(5), "waited {waited:?}");
        assert_eq!(b.cell(8, 8).read().occupant, Some(next));
        assert_eq!(b.ball(next).status, BallStatus::Active);
    }

    #[test]
    fn worker_releases_in_arrival_order() {
        let (b, exit, first, second) = tunnel_board();
        b.move_ball(first);
        b.move_ball(second);
        let b = Arc::new(b);
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = {
            let b = Arc::clone(&b);
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || b.run_warp(exit, Duration::from_millis(5), &shutdown))
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while b.ball(first).status != BallStatus::Active {
            assert!(Instant::now() < deadline, "first ball never emerged");
            thread::sleep(Duration::from_millis(1));
        }
        // The second ball cannot overtake: the first one still blocks the exit.
        assert_eq!(b.ball(second).status, BallStatus::InTransit);
        assert_eq!(b.move_ball(first), MoveOutcome::Moved);

        while b.ball(second).status != BallStatus::Active {
            assert!(Instant::now() < deadline, "second ball never emerged");
            thread::sleep(Duration::from_millis(1));
        }
        shutdown.store(true, Ordering::Release);
        worker.join().unwrap();
        assert_eq!(b.ball(second).pos, Pos::new(8, 8));
    }
}
