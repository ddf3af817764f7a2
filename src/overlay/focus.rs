//! Focus containment for the active dialog.

use tracing::trace;

use super::surface::{FocusTarget, OverlaySurface};

/// Keeps keyboard focus inside the overlay while engaged.
///
/// Engaging subscribes to the surface's focus notifications; any focus that
/// lands outside the overlay is pushed back onto the resolved focus target.
#[derive(Debug, Default)]
pub struct FocusJail {
    engaged: bool,
}

impl FocusJail {
    pub const fn new() -> Self {
        Self { engaged: false }
    }

    /// Engages the jail. Any previous subscription is dropped first.
    pub fn engage<S: OverlaySurface>(&mut self, surface: &mut S) {
        self.disengage(surface);
        surface.watch_focus(true);
        self.engaged = true;
    }

    /// Releases the jail. Safe to call when not engaged.
    pub fn disengage<S: OverlaySurface>(&mut self, surface: &mut S) {
        if self.engaged {
            surface.watch_focus(false);
            self.engaged = false;
        }
    }

    pub const fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Handles a focus change. Returns `true` when focus was redirected.
    pub fn redirect<S: OverlaySurface>(
        &self,
        surface: &mut S,
        focused: &S::Element,
        target: &FocusTarget<S::Element>,
    ) -> bool {
        if !self.engaged || surface.contains(focused) {
            return false;
        }
        trace!(?focused, ?target, "focus escaped overlay, redirecting");
        surface.focus(target);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::{Call, RecordingSurface, TestElement};

    #[test]
    fn test_engage_is_idempotent() {
        let mut surface = RecordingSurface::new();
        let mut jail = FocusJail::new();

        jail.engage(&mut surface);
        jail.engage(&mut surface);
        assert!(jail.is_engaged());
        assert_eq!(
            surface.calls(),
            vec![
                Call::WatchFocus(true),
                Call::WatchFocus(false),
                Call::WatchFocus(true)
            ]
        );

        jail.disengage(&mut surface);
        jail.disengage(&mut surface);
        assert!(!jail.is_engaged());
        assert_eq!(surface.calls().last(), Some(&Call::WatchFocus(false)));
        assert_eq!(surface.calls().len(), 4);
    }

    #[test]
    fn test_redirects_only_outside_focus() {
        let mut surface = RecordingSurface::new();
        let mut jail = FocusJail::new();
        let target = FocusTarget::OkButton;

        assert!(!jail.redirect(&mut surface, &TestElement::Page, &target));

        jail.engage(&mut surface);
        assert!(!jail.redirect(&mut surface, &TestElement::Input, &target));
        assert!(jail.redirect(&mut surface, &TestElement::Page, &target));
        assert_eq!(surface.focused(), Some(FocusTarget::OkButton));
    }
}
