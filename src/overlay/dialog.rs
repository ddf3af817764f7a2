//! The dialog state machine.
//!
//! [`DialogManager`] owns the single overlay slot: at most one active
//! dialog, at most one delayed display and one toast. It drives an
//! [`OverlaySurface`] and turns the surface's events back into state
//! transitions.
//!
//! ```text
//!            show_progress_info(delay > 0)
//!   Idle ────────────────────────────────▶ DelayedPending
//!    │  ▲                                      │ timer fires
//!    │  │ animation end                        ▼
//!    │  └──────────── Closing ◀──────────── Open(kind)
//!    │               (FadeOut)   close(fade)   ▲
//!    └─────────────────────────────────────────┘
//!                    open_dialog
//! ```
//!
//! Opening always wins: an active dialog is closed without animation and its
//! outcome resolved before the new one is shown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use super::focus::FocusJail;
use super::message::ProgressSpec;
use super::outcome::{Outcome, Resolver};
use super::surface::{Buttons, ContentBuilder, FocusTarget, OverlayEvent, OverlaySurface, VisualState};
use super::timer::{Clock, DelayedDisplay, SystemClock};
use super::toast::ToastMachine;
use crate::config::{DialogAction, KeyResolver, OverlayConfig};
use crate::ui::EventResult;

/// Kind of dialog. Decides closability and wait-cursor behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Prompt,
    ProgressInfo,
    FatalError,
}

/// Result value carried by a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogValue {
    #[default]
    None,
    Bool(bool),
    Text(String),
}

impl DialogValue {
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// What a validator decided about the dialog's current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Input accepted; the value becomes the dialog result.
    Valid(DialogValue),
    /// Input rejected; the dialog stays open.
    Invalid,
}

/// Validates and extracts the dialog result when OK is pressed.
///
/// `Err` is reserved for collaborator bugs and is reported to the user.
pub type Validator = Box<dyn FnMut() -> Result<Validation>>;

/// Called with the final result when the dialog closes.
pub type CloseCallback = Box<dyn FnOnce(&DialogValue)>;

/// Everything needed to open a dialog.
pub struct DialogRequest<S: OverlaySurface> {
    pub kind: DialogKind,
    pub content: S::Content,
    pub wide: bool,
    pub title_text: Option<String>,
    /// Whether the user may dismiss via backdrop click or Escape.
    pub close_enabled: bool,
    pub buttons: Buttons,
    pub focus_target: Option<S::Element>,
    pub default_result: DialogValue,
    pub validator: Option<Validator>,
    pub on_closed: Option<CloseCallback>,
}

impl<S: OverlaySurface> DialogRequest<S> {
    pub const fn new(kind: DialogKind, content: S::Content) -> Self {
        Self {
            kind,
            content,
            wide: false,
            title_text: None,
            close_enabled: false,
            buttons: Buttons::NONE,
            focus_target: None,
            default_result: DialogValue::None,
            validator: None,
            on_closed: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_text = Some(title.into());
        self
    }

    pub const fn wide(mut self, wide: bool) -> Self {
        self.wide = wide;
        self
    }

    pub const fn closable(mut self) -> Self {
        self.close_enabled = true;
        self
    }

    pub const fn with_ok_button(mut self) -> Self {
        self.buttons.ok = true;
        self
    }

    pub const fn with_cancel_button(mut self) -> Self {
        self.buttons.cancel = true;
        self
    }

    pub fn with_focus(mut self, element: S::Element) -> Self {
        self.focus_target = Some(element);
        self
    }

    pub fn with_default_result(mut self, value: DialogValue) -> Self {
        self.default_result = value;
        self
    }

    pub fn with_validator(mut self, validator: impl FnMut() -> Result<Validation> + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn on_closed(mut self, callback: impl FnOnce(&DialogValue) + 'static) -> Self {
        self.on_closed = Some(Box::new(callback));
        self
    }
}

struct ActiveDialog<E> {
    kind: DialogKind,
    close_enabled: bool,
    buttons: Buttons,
    focus_target: Option<E>,
    default_result: DialogValue,
    result: DialogValue,
    validator: Option<Validator>,
    on_closed: Option<CloseCallback>,
    resolver: Resolver,
}

impl<E> ActiveDialog<E> {
    fn finish(self) {
        if let Some(on_closed) = self.on_closed {
            on_closed(&self.result);
        }
        self.resolver.resolve(self.result);
    }
}

/// Owner of the overlay slot and the toast slot.
pub struct DialogManager<S: OverlaySurface> {
    surface: S,
    config: OverlayConfig,
    keys: Arc<KeyResolver>,
    clock: Box<dyn Clock>,
    initialized: bool,
    animation: bool,
    visual_state: VisualState,
    wait_cursor: bool,
    active: Option<ActiveDialog<S::Element>>,
    delayed: DelayedDisplay<ProgressSpec<S::Content>>,
    progress_title: Option<String>,
    focus_jail: FocusJail,
    toast: ToastMachine,
}

impl<S: OverlaySurface> DialogManager<S> {
    pub fn new(surface: S, keys: Arc<KeyResolver>) -> Self {
        Self {
            surface,
            config: OverlayConfig::default(),
            keys,
            clock: Box::new(SystemClock),
            initialized: false,
            animation: false,
            visual_state: VisualState::None,
            wait_cursor: false,
            active: None,
            delayed: DelayedDisplay::new(),
            progress_title: None,
            focus_jail: FocusJail::new(),
            toast: ToastMachine::new(),
        }
    }

    pub fn with_config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Current time on the manager's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub const fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub const fn visual_state(&self) -> VisualState {
        self.visual_state
    }

    pub const fn wait_cursor(&self) -> bool {
        self.wait_cursor
    }

    /// Kind of the currently active dialog, if any.
    pub fn active_kind(&self) -> Option<DialogKind> {
        self.active.as_ref().map(|dialog| dialog.kind)
    }

    /// Kind of the pending delayed display, if any.
    pub fn pending_kind(&self) -> Option<DialogKind> {
        self.delayed.kind()
    }

    pub fn progress_title(&self) -> Option<&str> {
        self.progress_title.as_deref()
    }

    pub const fn is_focus_jailed(&self) -> bool {
        self.focus_jail.is_engaged()
    }

    pub const fn toast(&self) -> &ToastMachine {
        &self.toast
    }

    pub(super) fn ensure_init(&mut self) {
        if self.initialized {
            return;
        }
        self.surface.install();
        self.animation = self.config.animations && self.surface.animation_supported();
        self.toast.set_animation(self.animation);
        self.visual_state = VisualState::None;
        self.initialized = true;
        debug!(animation = self.animation, "overlay surface installed");
    }

    fn set_visual_state(&mut self, state: VisualState) {
        let state = match state {
            VisualState::FadeOut if !self.animation => VisualState::None,
            other => other,
        };
        if !self.initialized || self.visual_state == state {
            return;
        }
        trace!(from = ?self.visual_state, to = ?state, "visual state");
        self.visual_state = state;
        self.surface.set_visual_state(state);
    }

    fn set_wait_cursor(&mut self, enabled: bool) {
        self.wait_cursor = enabled;
        self.surface.set_wait_cursor(enabled);
    }

    /// Focus target of the active dialog: the explicit element, else the
    /// Cancel button, else the OK button, else the frame.
    pub fn auto_focus_target(&self) -> FocusTarget<S::Element> {
        let Some(dialog) = &self.active else {
            return FocusTarget::Frame;
        };
        if let Some(element) = &dialog.focus_target {
            FocusTarget::Element(element.clone())
        } else if dialog.buttons.cancel {
            FocusTarget::CancelButton
        } else if dialog.buttons.ok {
            FocusTarget::OkButton
        } else {
            FocusTarget::Frame
        }
    }

    pub(super) fn update_dialog(
        &mut self,
        title: Option<&str>,
        content: S::Content,
        wide: bool,
        buttons: Buttons,
    ) {
        self.surface.set_title(title.filter(|title| !title.is_empty()));
        self.surface.set_content(content);
        self.surface.reset_scroll();
        self.surface.set_wide(wide);
        self.surface.set_buttons(buttons);
    }

    /// Opens a dialog, replacing the active one.
    ///
    /// The replaced dialog is closed without animation and its outcome is
    /// resolved with its current result before the new dialog takes focus.
    pub fn open_dialog(&mut self, request: DialogRequest<S>) -> Outcome<DialogValue> {
        self.ensure_init();
        self.close_dialog(false);

        let DialogRequest {
            kind,
            content,
            wide,
            title_text,
            close_enabled,
            buttons,
            focus_target,
            default_result,
            validator,
            on_closed,
        } = request;
        let close_enabled = close_enabled && kind != DialogKind::FatalError;

        self.update_dialog(title_text.as_deref(), content, wide, buttons);
        self.delayed.cancel();

        let (resolver, outcome) = Outcome::channel();
        self.active = Some(ActiveDialog {
            kind,
            close_enabled,
            buttons,
            focus_target,
            result: default_result.clone(),
            default_result,
            validator,
            on_closed,
            resolver,
        });

        self.set_visual_state(VisualState::FadeIn);
        self.set_wait_cursor(kind == DialogKind::ProgressInfo);
        let target = self.auto_focus_target();
        self.surface.focus(&target);
        self.focus_jail.engage(&mut self.surface);
        info!(?kind, title = ?title_text, close_enabled, "dialog opened");
        outcome
    }

    /// Closes the active dialog and resolves its outcome.
    ///
    /// No-op before initialization or when no dialog is active.
    pub fn close_dialog(&mut self, fade: bool) {
        if !self.initialized {
            return;
        }
        let Some(dialog) = self.active.take() else {
            return;
        };
        self.set_visual_state(if fade {
            VisualState::FadeOut
        } else {
            VisualState::None
        });
        self.focus_jail.disengage(&mut self.surface);
        info!(kind = ?dialog.kind, result = ?dialog.result, fade, "dialog closed");
        dialog.finish();
    }

    fn can_close(&self) -> bool {
        self.active.as_ref().is_some_and(|dialog| dialog.close_enabled)
    }

    /// Dismisses the active dialog with its default result, if it allows it.
    pub fn request_close(&mut self) {
        let Some(dialog) = self.active.as_mut() else {
            return;
        };
        if !dialog.close_enabled {
            debug!(kind = ?dialog.kind, "dismiss ignored, dialog not closable");
            return;
        }
        dialog.result = dialog.default_result.clone();
        self.close_dialog(false);
    }

    /// OK pressed: validate, extract the result and close.
    pub fn accept_ok(&mut self) {
        let Some(dialog) = self.active.as_mut() else {
            return;
        };
        if let Some(validator) = dialog.validator.as_mut() {
            match validator() {
                Ok(Validation::Valid(value)) => dialog.result = value,
                Ok(Validation::Invalid) => {
                    debug!("validation failed, dialog stays open");
                    return;
                }
                Err(report) => {
                    error!(error = ?report, "dialog validator failed");
                    self.surface.report_error(&report);
                    return;
                }
            }
        } else {
            dialog.result = DialogValue::Bool(true);
        }
        self.close_dialog(false);
    }

    /// Cancel pressed: close with the default result.
    pub fn accept_cancel(&mut self) {
        let Some(dialog) = self.active.as_mut() else {
            return;
        };
        dialog.result = dialog.default_result.clone();
        self.close_dialog(false);
    }

    /// Finishes a fade-out. Other animations need no follow-up.
    pub fn on_animation_complete(&mut self) {
        if self.visual_state == VisualState::FadeOut {
            self.set_visual_state(VisualState::None);
        }
    }

    /// Feeds a surface event into the state machine.
    ///
    /// `Consumed` means the host must not act on the event any further.
    pub fn handle_event(&mut self, event: OverlayEvent<S::Element>) -> EventResult<()> {
        if !self.initialized {
            return EventResult::Ignored;
        }
        match event {
            OverlayEvent::AnimationEnd => {
                self.on_animation_complete();
                EventResult::Consumed
            }
            OverlayEvent::ToastAnimationEnd => {
                self.toast.on_animation_complete(&mut self.surface);
                EventResult::Consumed
            }
            OverlayEvent::BackdropClick => {
                if self.can_close() {
                    self.request_close();
                    EventResult::Consumed
                } else if self.visual_state == VisualState::None {
                    EventResult::Ignored
                } else {
                    EventResult::Consumed
                }
            }
            OverlayEvent::Key(key) => self.handle_key(&key),
            OverlayEvent::OkClick | OverlayEvent::Submit => {
                if self.active.is_none() {
                    return EventResult::Ignored;
                }
                self.accept_ok();
                EventResult::Consumed
            }
            OverlayEvent::CancelClick => {
                if self.active.is_none() {
                    return EventResult::Ignored;
                }
                self.accept_cancel();
                EventResult::Consumed
            }
            OverlayEvent::FocusIn(element) => {
                let target = self.auto_focus_target();
                if self.focus_jail.redirect(&mut self.surface, &element, &target) {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> EventResult<()> {
        if self.can_close() && self.keys.matches_dialog(key, DialogAction::Dismiss) {
            self.request_close();
            return EventResult::Consumed;
        }
        if self.visual_state == VisualState::TransparentOverlay {
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    /// Shows a toast, replacing any visible one.
    ///
    /// A missing or zero duration falls back to the configured default.
    pub fn show_toast(&mut self, text: &str, duration: Option<Duration>) {
        self.ensure_init();
        let duration = duration
            .filter(|duration| !duration.is_zero())
            .unwrap_or_else(|| self.config.toast_duration());
        let now = self.clock.now();
        self.toast.show(&mut self.surface, text, duration, now);
    }
}

impl<S: ContentBuilder> DialogManager<S> {
    /// Shows or updates the progress dialog.
    ///
    /// The title is remembered until [`close_progress_info`] is called. With
    /// a non-zero delay and no active dialog, only the transparent overlay is
    /// shown and the dialog opens when the delay elapses.
    ///
    /// [`close_progress_info`]: Self::close_progress_info
    pub fn show_progress_info(&mut self, spec: ProgressSpec<S::Content>) {
        self.ensure_init();
        if let Some(title) = spec.msg.title_text.as_deref().filter(|t| !t.is_empty()) {
            self.progress_title = Some(title.to_owned());
        }

        if !spec.delay.is_zero() && self.active.is_none() {
            self.set_visual_state(VisualState::TransparentOverlay);
            self.set_wait_cursor(true);
            let now = self.clock.now();
            let delay = spec.delay;
            debug!(?delay, "progress info display delayed");
            self.delayed.start(
                DialogKind::ProgressInfo,
                now,
                delay,
                ProgressSpec {
                    delay: Duration::ZERO,
                    ..spec
                },
            );
            return;
        }

        let title = self.progress_title.clone();
        let message = self.build_message(spec.msg);
        if self.active_kind() == Some(DialogKind::ProgressInfo) {
            trace!("updating progress info in place");
            self.update_dialog(title.as_deref(), message.content, message.wide, Buttons::NONE);
            return;
        }

        let mut request = DialogRequest::new(DialogKind::ProgressInfo, message.content).wide(message.wide);
        request.title_text = title;
        // Progress dialogs close programmatically; nobody awaits them.
        drop(self.open_dialog(request));
    }

    /// Closes the progress dialog or cancels its pending display.
    ///
    /// Has no effect on other dialog kinds except that the remembered
    /// progress title is always cleared.
    pub fn close_progress_info(&mut self) {
        if !self.initialized {
            return;
        }
        if self.delayed.kind() == Some(DialogKind::ProgressInfo) {
            self.delayed.cancel();
        }
        match self.active_kind() {
            Some(DialogKind::ProgressInfo) => self.close_dialog(true),
            None => {
                self.set_visual_state(VisualState::None);
                self.set_wait_cursor(false);
            }
            Some(_) => {}
        }
        self.progress_title = None;
    }

    /// Fires due timers. Call from the host's tick.
    pub fn tick(&mut self) {
        if !self.initialized {
            return;
        }
        let now = self.clock.now();
        if let Some((kind, spec)) = self.delayed.poll(now) {
            debug!(?kind, "delayed display due");
            self.show_progress_info(spec);
        }
        self.toast.poll(&mut self.surface, now);
    }
}

impl<S: OverlaySurface> Drop for DialogManager<S> {
    fn drop(&mut self) {
        self.close_dialog(false);
    }
}
