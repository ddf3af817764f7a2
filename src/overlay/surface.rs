//! Contract between the dialog core and the thing that draws it.
//!
//! The core never creates or styles visual elements itself. It drives an
//! [`OverlaySurface`] through a handful of primitives and receives user
//! interaction back as [`OverlayEvent`]s.

use std::fmt::Debug;

use color_eyre::Report;
use crossterm::event::KeyEvent;

/// Visual state of the overlay slot. Exactly one value at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualState {
    /// Overlay hidden.
    #[default]
    None,
    /// Overlay visible, entry animation running or finished.
    FadeIn,
    /// Overlay visible, exit animation running.
    FadeOut,
    /// Overlay present but visually empty. Blocks input while a delayed
    /// progress display is pending.
    TransparentOverlay,
}

/// Visual state of the toast slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastState {
    #[default]
    Hidden,
    FadeIn,
    Shown,
    FadeOut,
}

impl ToastState {
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Footer button visibility. The footer itself is hidden when neither
/// button is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Buttons {
    pub ok: bool,
    pub cancel: bool,
}

impl Buttons {
    pub const NONE: Self = Self {
        ok: false,
        cancel: false,
    };

    pub const fn footer_visible(self) -> bool {
        self.ok || self.cancel
    }
}

/// Where keyboard focus goes when the core moves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget<E> {
    /// A collaborator supplied element inside the dialog content.
    Element(E),
    CancelButton,
    OkButton,
    /// The dialog frame itself.
    Frame,
}

/// Notifications the host feeds back into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent<E> {
    /// The overlay finished its entry or exit animation.
    AnimationEnd,
    /// The toast finished its entry or exit animation.
    ToastAnimationEnd,
    /// The user clicked the backdrop outside the dialog frame.
    BackdropClick,
    Key(KeyEvent),
    OkClick,
    CancelClick,
    /// A form inside the dialog content was submitted.
    Submit,
    /// Keyboard focus moved to `E`.
    FocusIn(E),
}

/// Primitives the dialog core drives.
///
/// Implementations own all visual elements: the backdrop, the dialog frame
/// with its header, content area and footer buttons, and the toast box.
pub trait OverlaySurface {
    /// Opaque content handle produced by content collaborators.
    type Content;
    /// Handle of a focusable element.
    type Element: Clone + PartialEq + Debug;

    /// One-time setup, called lazily before the first dialog or toast.
    fn install(&mut self);

    /// Whether entry/exit animations run and report completion.
    fn animation_supported(&self) -> bool;

    fn set_visual_state(&mut self, state: VisualState);

    fn set_wait_cursor(&mut self, enabled: bool);

    /// Sets the header text. `None` hides the header.
    fn set_title(&mut self, title: Option<&str>);

    /// Replaces the content area.
    fn set_content(&mut self, content: Self::Content);

    fn set_wide(&mut self, wide: bool);

    fn set_buttons(&mut self, buttons: Buttons);

    /// Scrolls the content area back to its origin.
    fn reset_scroll(&mut self);

    fn focus(&mut self, target: &FocusTarget<Self::Element>);

    /// Whether `element` lies inside the overlay.
    fn contains(&self, element: &Self::Element) -> bool;

    /// Subscribes to (or unsubscribes from) focus change notifications.
    fn watch_focus(&mut self, enabled: bool);

    /// Surfaces a collaborator failure to the user.
    fn report_error(&mut self, report: &Report);

    fn set_toast_text(&mut self, text: &str);

    fn set_toast_state(&mut self, state: ToastState);
}

/// An input field built by a [`ContentBuilder`], read back by the core when
/// the user accepts the prompt.
pub trait InputHandle: 'static {
    /// Strips leading and trailing whitespace from the current value.
    fn trim(&mut self);

    /// Checks the value against the field's rules and shows the validity
    /// message to the user when it fails.
    fn report_validity(&mut self) -> bool;

    fn value(&self) -> String;
}

/// Input form handed to a [`ContentBuilder`].
pub struct InputForm {
    pub prompt_text: String,
    pub default_value: Option<String>,
    /// Number of visible text rows. `None` or `1` means a single line.
    pub rows: Option<u16>,
    pub required: bool,
    pub rule: Option<InputRule>,
}

/// Custom input rule. Returns the message to show when the value is invalid.
pub type InputRule = Box<dyn Fn(&str) -> Result<(), String>>;

/// Panel returned by [`ContentBuilder::input_panel`].
pub struct InputPanel<C, I, E> {
    pub content: C,
    pub input: I,
    /// Element receiving focus when the prompt opens.
    pub focus: E,
}

/// Content collaborators: builds the panels shown inside the dialog frame.
pub trait ContentBuilder: OverlaySurface {
    type Input: InputHandle;

    /// Preformatted text panel; line breaks are kept.
    fn text_panel(&mut self, text: &str) -> Self::Content;

    /// Panel rendered from inline markup.
    fn markup_panel(&mut self, markup: &str) -> Self::Content;

    /// Wraps a pre-built content node in a padded panel.
    fn node_panel(&mut self, node: Self::Content) -> Self::Content {
        node
    }

    fn input_panel(
        &mut self,
        form: InputForm,
    ) -> InputPanel<Self::Content, Self::Input, Self::Element>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_visibility() {
        assert!(!Buttons::NONE.footer_visible());
        assert!(
            Buttons {
                ok: true,
                cancel: false
            }
            .footer_visible()
        );
        assert!(
            Buttons {
                ok: false,
                cancel: true
            }
            .footer_visible()
        );
    }

    #[test]
    fn test_toast_visibility() {
        assert!(!ToastState::Hidden.is_visible());
        assert!(ToastState::FadeIn.is_visible());
        assert!(ToastState::Shown.is_visible());
        assert!(ToastState::FadeOut.is_visible());
    }
}
