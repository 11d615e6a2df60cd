//! Ball records and the movement state machine.
//!
//! # Move algorithm
//!
//! 1. A ball that is not [`Active`](BallStatus::Active) does nothing.
//! 2. The two axis neighbours `(x+dx, y)` and `(x, y+dy)` are checked
//!    independently; each obstacle-class neighbour takes a hit and flips
//!    the matching velocity component.
//! 3. The diagonal target `(x+dx, y+dy)` is computed from the updated
//!    velocity and resolved in priority order: another ball (collision),
//!    warp, trash, obstacle (full reversal), otherwise move in.
//!
//! The current cell, both axis neighbours and all four diagonals the
//! target could turn out to be are locked up front, so the whole sequence
//! observes no interleaved move.

use std::sync::atomic::Ordering;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use breakout_core::{BallId, BallStatus, CellKind, MoveOutcome, Pos, Velocity};
use log::trace;

use crate::board::Board;
use crate::sync::{lock, wait_while};

/// A ball's mutable record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallState {
    /// Current cell. Stale while the ball is in transit or destroyed.
    pub pos: Pos,
    /// Per-move displacement.
    pub vel: Velocity,
    /// Lifecycle state.
    pub status: BallStatus,
}

/// Arena slot for one ball: its record plus a wake-up signal for workers
/// waiting on a stopped or in-transit ball.
pub(crate) struct BallSlot {
    pub(crate) state: Mutex<BallState>,
    pub(crate) wake: Condvar,
}

impl BallSlot {
    pub(crate) fn new(state: BallState) -> Self {
        Self {
            state: Mutex::new(state),
            wake: Condvar::new(),
        }
    }
}

impl Board {
    /// Run one step of the movement state machine for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this board.
    pub fn move_ball(&self, id: BallId) -> MoveOutcome {
        let slot = &self.balls[id.index()];
        loop {
            let seen = *lock(&slot.state);
            match seen.status {
                BallStatus::Active => {}
                BallStatus::Destroyed => return MoveOutcome::Destroyed,
                BallStatus::Stopped | BallStatus::InTransit => return MoveOutcome::Idle,
            }

            let here = seen.pos;
            let Velocity { dx, dy } = seen.vel;
            let mut locks = self.lock_cells(&[
                here,
                here.offset(dx, 0),
                here.offset(0, dy),
                here.offset(dx, dy),
                here.offset(-dx, dy),
                here.offset(dx, -dy),
                here.offset(-dx, -dy),
            ]);

            // Holding our own cell freezes our record: only a collision
            // (which needs this lock) or we ourselves may change it.
            let mut me = *lock(&slot.state);
            if me.status != BallStatus::Active {
                return MoveOutcome::Idle;
            }
            if me.vel != seen.vel {
                // A collision redirected us before we got the locks; the
                // neighbourhood we hold may be the wrong one.
                continue;
            }
            debug_assert_eq!(locks.get(here).occupant, Some(id));

            let mut vel = me.vel;
            let side = here.offset(vel.dx, 0);
            if locks.get(side).is_obstacle_class() {
                locks.hit_obstacle(side);
                vel.dx = -vel.dx;
            }
            let vertical = here.offset(0, vel.dy);
            if locks.get(vertical).is_obstacle_class() {
                locks.hit_obstacle(vertical);
                vel.dy = -vel.dy;
            }

            let target = here.offset(vel.dx, vel.dy);
            let next = *locks.get(target);
            let outcome = if let Some(other) = next.occupant.filter(|&o| o != id) {
                self.collide(other, &mut vel);
                MoveOutcome::Blocked
            } else {
                match (next.kind, next.warp) {
                    (CellKind::Warp, Some(receiver)) => {
                        self.vacate(&mut locks, here);
                        me.status = BallStatus::InTransit;
                        // Publish the transit state before the receiving
                        // worker can see the ball.
                        me.vel = vel;
                        *lock(&slot.state) = me;
                        self.accept(receiver, id);
                        trace!("{id} entered tunnel at {target}, queued on {receiver}");
                        return MoveOutcome::Transferred;
                    }
                    (CellKind::Trash, _) => {
                        self.vacate(&mut locks, here);
                        me.status = BallStatus::Destroyed;
                        self.live_balls.fetch_sub(1, Ordering::AcqRel);
                        trace!("{id} destroyed at {target}");
                        MoveOutcome::Destroyed
                    }
                    (kind, _) if kind.is_obstacle_class() => {
                        locks.hit_obstacle(target);
                        vel = vel.reversed();
                        MoveOutcome::Blocked
                    }
                    (kind, _) => {
                        self.vacate(&mut locks, here);
                        if let Some(cell) = locks.get_mut(target) {
                            cell.occupant = Some(id);
                        }
                        me.pos = target;
                        if kind == CellKind::Sticky {
                            vel = Velocity::ZERO;
                            me.status = BallStatus::Stopped;
                        }
                        MoveOutcome::Moved
                    }
                }
            };

            me.vel = vel;
            *lock(&slot.state) = me;
            return outcome;
        }
    }

    /// Resolve a collision between the moving ball (velocity `vel`) and
    /// `other`, whose cell the caller holds locked.
    ///
    /// On every axis where the velocities differ, `other` takes the mover's
    /// component and the mover reverses its own. `other` is set moving
    /// again if it was resting on a sticky cell.
    fn collide(&self, other: BallId, vel: &mut Velocity) {
        let slot = &self.balls[other.index()];
        {
            let mut them = lock(&slot.state);
            if them.vel.dx != vel.dx {
                them.vel.dx = vel.dx;
                vel.dx = -vel.dx;
            }
            if them.vel.dy != vel.dy {
                them.vel.dy = vel.dy;
                vel.dy = -vel.dy;
            }
            if them.status == BallStatus::Stopped {
                them.status = BallStatus::Active;
            }
        }
        slot.wake.notify_all();
        self.record_collision();
    }

    /// Block until `id` is [`Active`](BallStatus::Active) or
    /// [`Destroyed`](BallStatus::Destroyed), or `timeout` elapses. Returns
    /// the status observed last.
    ///
    /// Ball workers call this after [`MoveOutcome::Idle`] instead of
    /// spinning on a stopped or in-transit ball.
    pub fn wait_until_active(&self, id: BallId, timeout: Duration) -> BallStatus {
        let slot = &self.balls[id.index()];
        let guard = wait_while(&slot.wake, lock(&slot.state), timeout, |s| {
            matches!(s.status, BallStatus::Stopped | BallStatus::InTransit)
        });
        guard.status
    }

    /// Wake anything waiting on `id`.
    pub(crate) fn notify_ball(&self, id: BallId) {
        self.balls[id.index()].wake.notify_all();
    }

    /// Wake every thread parked in [`wait_until_active`](Self::wait_until_active),
    /// whatever ball it waits on. Used at shutdown.
    pub fn wake_all(&self) {
        for slot in &self.balls {
            // Taking the lock orders the notify after any waiter's check.
            drop(lock(&slot.state));
            slot.wake.notify_all();
        }
    }

    fn vacate(&self, locks: &mut crate::lock::CellLocks<'_>, here: Pos) {
        if let Some(cell) = locks.get_mut(here) {
            cell.occupant = None;
            self.notify_exit_vacated(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn empty(w: u32, h: u32) -> Board {
        Board::new(w, h).unwrap()
    }

    #[test]
    fn scenario_a_axis_bounce_then_move() {
        let mut b = empty(10, 10);
        b.set_obstacle(Pos::new(5, 5), 2).unwrap();
        let id = b.place_ball(Pos::new(4, 5), Velocity::new(1, 0)).unwrap();

        assert_eq!(b.move_ball(id), MoveOutcome::Moved);

        let obstacle = b.cell(5, 5).read();
        assert_eq!(obstacle.kind, CellKind::Obstacle);
        assert_eq!(obstacle.strength, 1);
        let ball = b.ball(id);
        assert_eq!(ball.pos, Pos::new(3, 5));
        assert_eq!(ball.vel, Velocity::new(-1, 0));
        assert_eq!(b.cell(3, 5).read().occupant, Some(id));
        assert_eq!(b.cell(4, 5).read().occupant, None);
    }

    fn scenario_b() -> (Board, BallId, BallId) {
        let mut b = empty(10, 10);
        let a = b.place_ball(Pos::new(1, 1), Velocity::new(1, 0)).unwrap();
        let c = b.place_ball(Pos::new(2, 1), Velocity::new(-1, 0)).unwrap();
        (b, a, c)
    }

    #[test]
    fn scenario_b_collision_a_first() {
        let (b, a, c) = scenario_b();
        assert_eq!(b.move_ball(a), MoveOutcome::Blocked);
        assert_eq!(b.collisions(), 1);
        assert_eq!(b.ball(a).pos, Pos::new(1, 1));
        assert_eq!(b.ball(c).pos, Pos::new(2, 1));
        assert_eq!(b.ball(a).vel, Velocity::new(-1, 0));
        assert_eq!(b.ball(c).vel, Velocity::new(1, 0));

        // The velocities now point apart: the second ball's move is free.
        assert_eq!(b.move_ball(c), MoveOutcome::Moved);
        assert_eq!(b.collisions(), 1);
        assert_eq!(b.ball(c).pos, Pos::new(3, 1));
    }

    #[test]
    fn scenario_b_collision_b_first() {
        let (b, a, c) = scenario_b();
        assert_eq!(b.move_ball(c), MoveOutcome::Blocked);
        assert_eq!(b.collisions(), 1);
        assert_eq!(b.ball(a).vel, Velocity::new(-1, 0));
        assert_eq!(b.ball(c).vel, Velocity::new(1, 0));
        assert_eq!(b.move_ball(a), MoveOutcome::Moved);
        assert_eq!(b.collisions(), 1);
        assert_eq!(b.ball(a).pos, Pos::new(0, 1));
    }

    #[test]
    fn scenario_b_concurrent_counts_exactly_one() {
        for _ in 0..200 {
            let (b, a, c) = scenario_b();
            let b = Arc::new(b);
            let barrier = Arc::new(std::sync::Barrier::new(2));
            let handles: Vec<_> = [a, c]
                .into_iter()
                .map(|id| {
                    let b = Arc::clone(&b);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        b.move_ball(id)
                    })
                })
                .collect();
            let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(b.collisions(), 1);
            assert_eq!(
                outcomes.iter().filter(|o| **o == MoveOutcome::Blocked).count(),
                1
            );
            assert_eq!(
                outcomes.iter().filter(|o| **o == MoveOutcome::Moved).count(),
                1
            );
        }
    }

    #[test]
    fn sticky_captures_until_collision() {
        let mut b = empty(10, 10);
        b.set_kind(Pos::new(3, 3), CellKind::Sticky).unwrap();
        let s = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();

        assert_eq!(b.move_ball(s), MoveOutcome::Moved);
        let rest = b.ball(s);
        assert_eq!(rest.pos, Pos::new(3, 3));
        assert_eq!(rest.vel, Velocity::ZERO);
        assert_eq!(rest.status, BallStatus::Stopped);
        for _ in 0..5 {
            assert_eq!(b.move_ball(s), MoveOutcome::Idle);
        }

        // A second ball heading at the stuck one frees it.
        let hitter = b.place_ball(Pos::new(4, 4), Velocity::new(-1, -1)).unwrap();
        assert_eq!(b.move_ball(hitter), MoveOutcome::Blocked);
        let freed = b.ball(s);
        assert_eq!(freed.status, BallStatus::Active);
        assert_eq!(freed.vel, Velocity::new(-1, -1));
        assert_eq!(b.ball(hitter).vel, Velocity::new(1, 1));
        assert_eq!(b.collisions(), 1);
        assert_eq!(b.move_ball(s), MoveOutcome::Moved);
        assert_eq!(b.ball(s).pos, Pos::new(2, 2));
    }

    #[test]
    fn trash_destroys() {
        let mut b = empty(6, 6);
        b.set_kind(Pos::new(3, 3), CellKind::Trash).unwrap();
        let id = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        assert_eq!(b.active_balls(), 1);
        assert_eq!(b.move_ball(id), MoveOutcome::Destroyed);
        assert_eq!(b.ball(id).status, BallStatus::Destroyed);
        assert_eq!(b.cell(2, 2).read().occupant, None);
        assert_eq!(b.cell(3, 3).read().occupant, None);
        assert_eq!(b.active_balls(), 0);
        assert_eq!(b.move_ball(id), MoveOutcome::Destroyed);
        assert_eq!(b.active_balls(), 0);
    }

    #[test]
    fn diagonal_obstacle_reverses_fully() {
        let mut b = empty(6, 6);
        b.set_obstacle(Pos::new(3, 3), 1).unwrap();
        let id = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        assert_eq!(b.move_ball(id), MoveOutcome::Blocked);
        let s = b.ball(id);
        assert_eq!(s.pos, Pos::new(2, 2));
        assert_eq!(s.vel, Velocity::new(-1, -1));
        assert_eq!(b.cell(3, 3).read().kind, CellKind::Empty);
    }

    #[test]
    fn both_axis_checks_fire_in_a_corner() {
        let mut b = empty(5, 5);
        let id = b.place_ball(Pos::new(4, 4), Velocity::new(1, 1)).unwrap();
        assert_eq!(b.move_ball(id), MoveOutcome::Moved);
        let s = b.ball(id);
        assert_eq!(s.pos, Pos::new(3, 3));
        assert_eq!(s.vel, Velocity::new(-1, -1));
    }

    #[test]
    fn edge_bounces_never_wear_the_sentinel() {
        let mut b = empty(3, 3);
        let id = b.place_ball(Pos::new(0, 0), Velocity::new(-1, -1)).unwrap();
        for _ in 0..1000 {
            b.move_ball(id);
        }
        assert!(b.cell(-1, 0).is_sentinel());
        assert_eq!(b.cell(-1, 0).read(), Cell::SENTINEL);
        assert_eq!(b.cell(3, 3).read().kind, CellKind::Obstacle);
    }

    #[test]
    fn warp_entry_queues_on_the_far_endpoint() {
        let mut b = empty(8, 8);
        let (_near, far) = b.add_warp_pair(Pos::new(3, 3), Pos::new(6, 1)).unwrap();
        let id = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        assert_eq!(b.move_ball(id), MoveOutcome::Transferred);
        assert_eq!(b.ball(id).status, BallStatus::InTransit);
        assert_eq!(b.cell(2, 2).read().occupant, None);
        assert_eq!(b.cell(3, 3).read().occupant, None);
        assert_eq!(b.warp(far).queued(), 1);
        assert_eq!(b.move_ball(id), MoveOutcome::Idle);
    }

    #[test]
    fn wait_until_active_wakes_on_collision() {
        let mut b = empty(10, 10);
        b.set_kind(Pos::new(3, 3), CellKind::Sticky).unwrap();
        let s = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        let hitter = b.place_ball(Pos::new(5, 5), Velocity::new(-1, -1)).unwrap();
        assert_eq!(b.move_ball(s), MoveOutcome::Moved);
        let b = Arc::new(b);

        let waiter = {
            let b = Arc::clone(&b);
            thread::spawn(move || {
                let start = Instant::now();
                let status = b.wait_until_active(s, Duration::from_secs(5));
                (status, start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(b.move_ball(hitter), MoveOutcome::Moved);
        assert_eq!(b.move_ball(hitter), MoveOutcome::Blocked);
        let (status, waited) = waiter.join().unwrap();
        assert_eq!(status, BallStatus::Active);
        assert!(waited < Duration::from_secs(5));
    }

    #[test]
    fn wait_until_active_times_out_while_stopped() {
        let mut b = empty(6, 6);
        b.set_kind(Pos::new(3, 3), CellKind::Sticky).unwrap();
        let s = b.place_ball(Pos::new(2, 2), Velocity::new(1, 1)).unwrap();
        b.move_ball(s);
        assert_eq!(
            b.wait_until_active(s, Duration::from_millis(10)),
            BallStatus::Stopped
        );
    }
}
