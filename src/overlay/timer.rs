//! Deadline timers driven by the host's tick.
//!
//! Nothing here sleeps or spawns. A timer is a deadline plus a payload; the
//! owner polls it with the current time and takes the payload once the
//! deadline has passed. Cancelling drops the payload, so a cancelled timer
//! can never fire.

use std::time::{Duration, Instant};

use tracing::debug;

use super::dialog::DialogKind;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A single pending deadline. Starting a new one replaces the old one.
///
/// A delay too large to represent as an `Instant` leaves the payload pending
/// with no deadline; it never fires but can still be cancelled.
#[derive(Debug)]
pub struct TimerSlot<T> {
    pending: Option<(Option<Instant>, T)>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerSlot<T> {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    pub fn start(&mut self, now: Instant, delay: Duration, payload: T) {
        let deadline = now.checked_add(delay);
        if deadline.is_none() {
            debug!(?delay, "delay out of range, timer will not fire");
        }
        self.pending = Some((deadline, payload));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(|(deadline, _)| *deadline)
    }

    /// Takes the payload if the deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((Some(deadline), _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }
}

/// Delayed display of a dialog: at most one kind pending at a time.
#[derive(Debug)]
pub struct DelayedDisplay<T> {
    slot: TimerSlot<(DialogKind, T)>,
}

impl<T> Default for DelayedDisplay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayedDisplay<T> {
    pub const fn new() -> Self {
        Self {
            slot: TimerSlot::new(),
        }
    }

    /// Schedules `payload` for `kind`, cancelling whatever was pending.
    pub fn start(&mut self, kind: DialogKind, now: Instant, delay: Duration, payload: T) {
        if let Some(previous) = self.kind() {
            debug!(?previous, ?kind, "superseding delayed display");
        }
        self.slot.start(now, delay, (kind, payload));
    }

    /// Safe to call when nothing is pending.
    pub fn cancel(&mut self) {
        self.slot.cancel();
    }

    pub fn kind(&self) -> Option<DialogKind> {
        self.slot.pending.as_ref().map(|(_, (kind, _))| *kind)
    }

    pub fn poll(&mut self, now: Instant) -> Option<(DialogKind, T)> {
        self.slot.poll(now)
    }
}
