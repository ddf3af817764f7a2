//! Modal dialog and toast overlay core.
//!
//! This module contains the surface-independent state machines:
//! - [`DialogManager`] - the single overlay slot and its dialogs
//! - [`ToastMachine`] - the single toast slot
//! - [`FocusJail`] - focus containment while a dialog is open
//! - [`DelayedDisplay`] - deferred presentation of progress dialogs
//! - [`OverlaySurface`] - what a renderer must provide

mod dialog;
mod focus;
mod message;
mod outcome;
mod surface;
mod timer;
mod toast;

#[cfg(test)]
pub(crate) mod testing;

pub use dialog::{
    CloseCallback, DialogKind, DialogManager, DialogRequest, DialogValue, Validation, Validator,
};
pub use focus::FocusJail;
pub use message::{infer_wide, InputSpec, MsgBody, MsgSpec, ProgressSpec};
pub use outcome::{Outcome, Resolver};
pub use surface::{
    Buttons, ContentBuilder, FocusTarget, InputForm, InputHandle, InputPanel, InputRule,
    OverlayEvent, OverlaySurface, ToastState, VisualState,
};
pub use timer::{Clock, DelayedDisplay, SystemClock, TimerSlot};
pub use toast::ToastMachine;
