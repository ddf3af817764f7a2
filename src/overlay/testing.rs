//! Test doubles for the overlay core.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Report;

use super::dialog::{DialogManager, DialogValue};
use super::surface::{
    Buttons, ContentBuilder, FocusTarget, InputForm, InputHandle, InputPanel, OverlaySurface,
    ToastState, VisualState,
};
use super::timer::Clock;
use crate::config::KeyResolver;
use crate::config::keybindings::KeybindingsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestElement {
    /// Outside the overlay.
    Page,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestContent {
    Text(String),
    Markup(String),
    Input(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install,
    VisualState(VisualState),
    WaitCursor(bool),
    Title(Option<String>),
    Content(TestContent),
    Wide(bool),
    Buttons(Buttons),
    ResetScroll,
    Focus(FocusTarget<TestElement>),
    WatchFocus(bool),
    Error(String),
    ToastText(String),
    ToastState(ToastState),
    Closed(DialogValue),
}

struct InputState {
    value: String,
    required: bool,
    rule: Option<super::surface::InputRule>,
    validity_message: Option<String>,
}

#[derive(Clone)]
pub struct TestInput(Rc<RefCell<InputState>>);

impl TestInput {
    pub fn set_value(&self, value: &str) {
        value.clone_into(&mut self.0.borrow_mut().value);
    }

    pub fn validity_message(&self) -> Option<String> {
        self.0.borrow().validity_message.clone()
    }
}

impl InputHandle for TestInput {
    fn trim(&mut self) {
        let mut state = self.0.borrow_mut();
        state.value = state.value.trim().to_owned();
    }

    fn report_validity(&mut self) -> bool {
        let mut state = self.0.borrow_mut();
        let message = if state.required && state.value.is_empty() {
            Some("required".to_string())
        } else {
            state.rule.as_ref().and_then(|rule| rule(&state.value).err())
        };
        let valid = message.is_none();
        state.validity_message = message;
        valid
    }

    fn value(&self) -> String {
        self.0.borrow().value.clone()
    }
}

/// Surface that records every call it receives.
pub struct RecordingSurface {
    log: Rc<RefCell<Vec<Call>>>,
    animation: bool,
    input: Option<TestInput>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            animation: true,
            input: None,
        }
    }

    pub fn set_animation_supported(&mut self, supported: bool) {
        self.animation = supported;
    }

    pub fn log_handle(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.log)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear(&mut self) {
        self.log.borrow_mut().clear();
    }

    pub fn input(&self) -> TestInput {
        self.input.clone().expect("no input panel built")
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    fn last<T>(&self, pick: impl Fn(&Call) -> Option<T>) -> Option<T> {
        self.log.borrow().iter().rev().find_map(pick)
    }

    pub fn focused(&self) -> Option<FocusTarget<TestElement>> {
        self.last(|call| match call {
            Call::Focus(target) => Some(target.clone()),
            _ => None,
        })
    }

    pub fn wide(&self) -> Option<bool> {
        self.last(|call| match call {
            Call::Wide(wide) => Some(*wide),
            _ => None,
        })
    }

    pub fn title(&self) -> Option<Option<String>> {
        self.last(|call| match call {
            Call::Title(title) => Some(title.clone()),
            _ => None,
        })
    }

    pub fn buttons(&self) -> Option<Buttons> {
        self.last(|call| match call {
            Call::Buttons(buttons) => Some(*buttons),
            _ => None,
        })
    }

    pub fn content(&self) -> Option<TestContent> {
        self.last(|call| match call {
            Call::Content(content) => Some(content.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn toast_states(&self) -> Vec<ToastState> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ToastState(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl OverlaySurface for RecordingSurface {
    type Content = TestContent;
    type Element = TestElement;

    fn install(&mut self) {
        self.push(Call::Install);
    }

    fn animation_supported(&self) -> bool {
        self.animation
    }

    fn set_visual_state(&mut self, state: VisualState) {
        self.push(Call::VisualState(state));
    }

    fn set_wait_cursor(&mut self, enabled: bool) {
        self.push(Call::WaitCursor(enabled));
    }

    fn set_title(&mut self, title: Option<&str>) {
        self.push(Call::Title(title.map(str::to_owned)));
    }

    fn set_content(&mut self, content: TestContent) {
        self.push(Call::Content(content));
    }

    fn set_wide(&mut self, wide: bool) {
        self.push(Call::Wide(wide));
    }

    fn set_buttons(&mut self, buttons: Buttons) {
        self.push(Call::Buttons(buttons));
    }

    fn reset_scroll(&mut self) {
        self.push(Call::ResetScroll);
    }

    fn focus(&mut self, target: &FocusTarget<TestElement>) {
        self.push(Call::Focus(target.clone()));
    }

    fn contains(&self, element: &TestElement) -> bool {
        *element != TestElement::Page
    }

    fn watch_focus(&mut self, enabled: bool) {
        self.push(Call::WatchFocus(enabled));
    }

    fn report_error(&mut self, report: &Report) {
        self.push(Call::Error(report.to_string()));
    }

    fn set_toast_text(&mut self, text: &str) {
        self.push(Call::ToastText(text.to_owned()));
    }

    fn set_toast_state(&mut self, state: ToastState) {
        self.push(Call::ToastState(state));
    }
}

impl ContentBuilder for RecordingSurface {
    type Input = TestInput;

    fn text_panel(&mut self, text: &str) -> TestContent {
        TestContent::Text(text.to_owned())
    }

    fn markup_panel(&mut self, markup: &str) -> TestContent {
        TestContent::Markup(markup.to_owned())
    }

    fn input_panel(&mut self, form: InputForm) -> InputPanel<TestContent, TestInput, TestElement> {
        let input = TestInput(Rc::new(RefCell::new(InputState {
            value: form.default_value.unwrap_or_default(),
            required: form.required,
            rule: form.rule,
            validity_message: None,
        })));
        self.input = Some(input.clone());
        InputPanel {
            content: TestContent::Input(form.prompt_text),
            input,
            focus: TestElement::Input,
        }
    }
}

/// Clock advanced by hand.
#[derive(Clone)]
pub struct ManualClock(Rc<Cell<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn now(&self) -> Instant {
        self.0.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.0.get()
    }
}

pub fn keys() -> Arc<KeyResolver> {
    Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())))
}

/// A manager over a fresh [`RecordingSurface`] and a shared manual clock.
pub fn manager() -> (DialogManager<RecordingSurface>, ManualClock) {
    let clock = ManualClock::new();
    let manager = DialogManager::new(RecordingSurface::new(), keys()).with_clock(clock.clone());
    (manager, clock)
}
