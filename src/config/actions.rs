#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    /// Hand the terminal back to the shell (SIGTSTP).
    Suspend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Press the focused button or submit the focused form.
    Activate,
    /// Close a closable dialog with its default result.
    Dismiss,
    FocusNext,
    FocusPrev,
    ScrollUp,
    ScrollDown,
}
