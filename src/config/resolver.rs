use crate::config::actions::*;
use crate::config::keybindings::KeybindingsConfig;
use crossterm::event::KeyEvent;
use std::sync::Arc;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Suspend => kb.suspend.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Activate => kb.activate.matches(event),
            DialogAction::Dismiss => kb.dismiss.matches(event),
            DialogAction::FocusNext => kb.focus_next.matches(event),
            DialogAction::FocusPrev => kb.focus_prev.matches(event),
            DialogAction::ScrollUp => kb.scroll_up.matches(event),
            DialogAction::ScrollDown => kb.scroll_down.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Activate => kb.activate.display(),
            DialogAction::Dismiss => kb.dismiss.display(),
            DialogAction::FocusNext => kb.focus_next.display(),
            DialogAction::FocusPrev => kb.focus_prev.display(),
            DialogAction::ScrollUp => kb.scroll_up.display(),
            DialogAction::ScrollDown => kb.scroll_down.display(),
        }
    }

    /// First dialog action bound to `event`, checked in priority order.
    pub fn resolve_dialog(&self, event: &KeyEvent) -> Option<DialogAction> {
        [
            DialogAction::Dismiss,
            DialogAction::Activate,
            DialogAction::FocusNext,
            DialogAction::FocusPrev,
            DialogAction::ScrollUp,
            DialogAction::ScrollDown,
        ]
        .into_iter()
        .find(|action| self.matches_dialog(event, *action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn resolver() -> KeyResolver {
        KeyResolver::new(Arc::new(KeybindingsConfig::default()))
    }

    #[test]
    fn test_default_dialog_keys() {
        let keys = resolver();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let backtab = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);

        assert!(keys.matches_dialog(&esc, DialogAction::Dismiss));
        assert_eq!(keys.resolve_dialog(&backtab), Some(DialogAction::FocusPrev));
        assert_eq!(
            keys.resolve_dialog(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(keys.display_dialog(DialogAction::FocusNext), "Tab");
    }

    #[test]
    fn test_quit_accepts_ctrl_c() {
        let keys = resolver();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(keys.matches_global(&ctrl_c, GlobalAction::Quit));
        assert!(!keys.matches_nav(&ctrl_c, NavAction::Select));
    }
}
