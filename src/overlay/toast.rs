//! Toast notifications: one slot, no queue.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::surface::{OverlaySurface, ToastState};
use super::timer::TimerSlot;

/// State of the toast slot.
///
/// `Hidden → FadeIn → (Shown) → FadeOut → Hidden`. A new toast restarts the
/// cycle from any state with the new text.
#[derive(Debug, Default)]
pub struct ToastMachine {
    state: ToastState,
    text: String,
    timer: TimerSlot<()>,
    animation: bool,
}

impl ToastMachine {
    pub const fn new() -> Self {
        Self {
            state: ToastState::Hidden,
            text: String::new(),
            timer: TimerSlot::new(),
            animation: false,
        }
    }

    pub const fn set_animation(&mut self, enabled: bool) {
        self.animation = enabled;
    }

    pub const fn state(&self) -> ToastState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    fn set_state<S: OverlaySurface>(&mut self, surface: &mut S, state: ToastState) {
        let state = match state {
            ToastState::FadeOut if !self.animation => ToastState::Hidden,
            other => other,
        };
        trace!(from = ?self.state, to = ?state, "toast state");
        self.state = state;
        surface.set_toast_state(state);
    }

    /// Replaces whatever toast is showing and arms the auto-hide timer.
    pub fn show<S: OverlaySurface>(
        &mut self,
        surface: &mut S,
        text: &str,
        duration: Duration,
        now: Instant,
    ) {
        self.timer.cancel();
        text.clone_into(&mut self.text);
        surface.set_toast_text(text);
        self.set_state(surface, ToastState::FadeIn);
        self.timer.start(now, duration, ());
        debug!(text, ?duration, "toast shown");
    }

    /// Starts the fade-out once the display duration has elapsed.
    pub fn poll<S: OverlaySurface>(&mut self, surface: &mut S, now: Instant) {
        if self.timer.poll(now).is_some() {
            self.set_state(surface, ToastState::FadeOut);
        }
    }

    pub fn on_animation_complete<S: OverlaySurface>(&mut self, surface: &mut S) {
        match self.state {
            ToastState::FadeIn => self.set_state(surface, ToastState::Shown),
            ToastState::FadeOut => self.set_state(surface, ToastState::Hidden),
            ToastState::Hidden | ToastState::Shown => {}
        }
    }
}
