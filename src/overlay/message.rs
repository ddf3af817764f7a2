//! Message-level dialogs: the public operations built on [`DialogManager`].

use std::time::Duration;

use super::dialog::{DialogKind, DialogManager, DialogRequest, DialogValue, Validation};
use super::outcome::Outcome;
use super::surface::{ContentBuilder, InputForm, InputHandle, InputRule};
use crate::config::OverlayConfig;

/// Body of a message. The variants are alternatives.
pub enum MsgBody<C> {
    /// Preformatted text; line breaks are kept.
    Text(String),
    /// Inline markup.
    Markup(String),
    /// A pre-built content node.
    Node(C),
}

/// Options shared by all message dialogs.
pub struct MsgSpec<C> {
    pub title_text: Option<String>,
    pub body: Option<MsgBody<C>>,
    /// `Some(true)` wide, `Some(false)` narrow, `None` inferred from the body.
    pub wide: Option<bool>,
}

impl<C> Default for MsgSpec<C> {
    fn default() -> Self {
        Self {
            title_text: None,
            body: None,
            wide: None,
        }
    }
}

impl<C> MsgSpec<C> {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            body: Some(MsgBody::Text(text.into())),
            ..Self::default()
        }
    }

    pub fn markup(markup: impl Into<String>) -> Self {
        Self {
            body: Some(MsgBody::Markup(markup.into())),
            ..Self::default()
        }
    }

    pub fn node(node: C) -> Self {
        Self {
            body: Some(MsgBody::Node(node)),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_text = Some(title.into());
        self
    }

    pub fn wide(mut self, wide: bool) -> Self {
        self.wide = Some(wide);
        self
    }
}

/// A progress message, optionally shown only after `delay`.
pub struct ProgressSpec<C> {
    pub msg: MsgSpec<C>,
    pub delay: Duration,
}

impl<C> ProgressSpec<C> {
    pub const fn new(msg: MsgSpec<C>) -> Self {
        Self {
            msg,
            delay: Duration::ZERO,
        }
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Options of a text input prompt.
pub struct InputSpec {
    pub prompt_text: String,
    pub title_text: Option<String>,
    pub default_value: Option<String>,
    pub rows: Option<u16>,
    /// Reject empty input. On by default.
    pub required: bool,
    pub rule: Option<InputRule>,
}

impl InputSpec {
    pub fn new(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            title_text: None,
            default_value: None,
            rows: None,
            required: true,
            rule: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title_text = Some(title.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub const fn with_rows(mut self, rows: u16) -> Self {
        self.rows = Some(rows);
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Adds a rule the trimmed value must satisfy. `Err` carries the message
    /// shown next to the field.
    pub fn with_rule(mut self, rule: impl Fn(&str) -> Result<(), String> + 'static) -> Self {
        self.rule = Some(Box::new(rule));
        self
    }
}

/// Whether a message body asks for the wide layout.
pub fn infer_wide<C>(body: Option<&MsgBody<C>>, config: &OverlayConfig) -> bool {
    match body {
        Some(MsgBody::Text(text)) => text.chars().count() > config.wide_text_threshold,
        Some(MsgBody::Markup(markup)) => markup.chars().count() > config.wide_markup_threshold,
        Some(MsgBody::Node(_)) | None => false,
    }
}

pub(crate) struct BuiltMessage<C> {
    pub content: C,
    pub wide: bool,
    pub title_text: Option<String>,
}

impl<S: ContentBuilder> DialogManager<S> {
    /// Turns a message spec into content. A missing or empty body becomes
    /// a placeholder text.
    pub(crate) fn build_message(&mut self, spec: MsgSpec<S::Content>) -> BuiltMessage<S::Content> {
        let wide = spec
            .wide
            .unwrap_or_else(|| infer_wide(spec.body.as_ref(), self.config()));
        let placeholder = self.config().placeholder_text.clone();
        let surface = self.surface_mut();
        let content = match spec.body {
            Some(MsgBody::Text(text)) if !text.is_empty() => surface.text_panel(&text),
            Some(MsgBody::Markup(markup)) if !markup.is_empty() => surface.markup_panel(&markup),
            Some(MsgBody::Node(node)) => surface.node_panel(node),
            _ => surface.text_panel(&placeholder),
        };
        BuiltMessage {
            content,
            wide,
            title_text: spec.title_text,
        }
    }

    /// Shows a permanent error the user cannot dismiss.
    pub fn show_fatal_error(&mut self, spec: MsgSpec<S::Content>) {
        let message = self.build_message(spec);
        let title = message
            .title_text
            .unwrap_or_else(|| self.config().fatal_error_title.clone());
        let request = DialogRequest::new(DialogKind::FatalError, message.content)
            .wide(message.wide)
            .with_title(title);
        drop(self.open_dialog(request));
    }

    /// Shows a message with an OK button. Resolves when it is closed.
    pub fn show_message(&mut self, spec: MsgSpec<S::Content>) -> Outcome<()> {
        let message = self.build_message(spec);
        let mut request = DialogRequest::new(DialogKind::Prompt, message.content)
            .wide(message.wide)
            .closable()
            .with_ok_button();
        request.title_text = message.title_text;
        self.open_dialog(request).map(|_| ())
    }

    /// Asks a yes/no question. Resolves to `true` only when confirmed via OK.
    pub fn prompt_confirmation(&mut self, spec: MsgSpec<S::Content>) -> Outcome<bool> {
        let message = self.build_message(spec);
        let mut request = DialogRequest::new(DialogKind::Prompt, message.content)
            .wide(message.wide)
            .closable()
            .with_ok_button()
            .with_cancel_button()
            .with_default_result(DialogValue::Bool(false));
        request.title_text = message.title_text;
        self.open_dialog(request).map(|value| value.is_confirmed())
    }

    /// Asks for a line of text. Resolves to the trimmed input, or `None` when
    /// the prompt was cancelled.
    pub fn prompt_input(&mut self, spec: InputSpec) -> Outcome<Option<String>> {
        let InputSpec {
            prompt_text,
            title_text,
            default_value,
            rows,
            required,
            rule,
        } = spec;
        let panel = self.surface_mut().input_panel(InputForm {
            prompt_text,
            default_value,
            rows,
            required,
            rule,
        });
        let mut input = panel.input;
        let mut request = DialogRequest::new(DialogKind::Prompt, panel.content)
            .closable()
            .with_ok_button()
            .with_cancel_button()
            .with_focus(panel.focus)
            .with_validator(move || {
                input.trim();
                if !input.report_validity() {
                    return Ok(Validation::Invalid);
                }
                Ok(Validation::Valid(DialogValue::Text(input.value().trim().to_owned())))
            });
        request.title_text = title_text;
        self.open_dialog(request).map(DialogValue::into_text)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use futures::FutureExt;

    use super::*;
    use crate::overlay::surface::{Buttons, FocusTarget, OverlayEvent};
    use crate::overlay::testing::{manager, Call, TestContent, TestElement};

    fn esc() -> OverlayEvent<TestElement> {
        OverlayEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE))
    }

    #[test]
    fn test_width_inference_thresholds() {
        let config = OverlayConfig::default();
        let narrow = MsgBody::<()>::Text("x".repeat(500));
        let wide = MsgBody::<()>::Text("x".repeat(501));
        assert!(!infer_wide(Some(&narrow), &config));
        assert!(infer_wide(Some(&wide), &config));

        assert!(!infer_wide(Some(&MsgBody::<()>::Markup("y".repeat(800))), &config));
        assert!(infer_wide(Some(&MsgBody::<()>::Markup("y".repeat(801))), &config));
        assert!(!infer_wide(Some(&MsgBody::Node(())), &config));
        assert!(!infer_wide::<()>(None, &config));
    }

    #[test]
    fn test_explicit_width_wins() {
        let (mut mgr, _clock) = manager();
        drop(mgr.show_message(MsgSpec::text("x".repeat(900)).wide(false)));
        assert_eq!(mgr.surface().wide(), Some(false));

        drop(mgr.show_message(MsgSpec::text("short").wide(true)));
        assert_eq!(mgr.surface().wide(), Some(true));

        drop(mgr.show_message(MsgSpec::text("x".repeat(501))));
        assert_eq!(mgr.surface().wide(), Some(true));
    }

    #[test]
    fn test_missing_body_shows_placeholder() {
        let (mut mgr, _clock) = manager();
        drop(mgr.show_message(MsgSpec::default()));
        assert_eq!(mgr.surface().content(), Some(TestContent::Text("(no text)".into())));

        drop(mgr.show_message(MsgSpec::text("")));
        assert_eq!(mgr.surface().content(), Some(TestContent::Text("(no text)".into())));

        drop(mgr.show_message(MsgSpec::markup("<b>hi</b>")));
        assert_eq!(mgr.surface().content(), Some(TestContent::Markup("<b>hi</b>".into())));

        drop(mgr.show_message(MsgSpec::node(TestContent::Text("node".into()))));
        assert_eq!(mgr.surface().content(), Some(TestContent::Text("node".into())));
    }

    #[test]
    fn test_show_message_resolves_on_ok() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.show_message(MsgSpec::text("hello").with_title("Note"));
        assert_eq!(mgr.surface().buttons(), Some(Buttons { ok: true, cancel: false }));
        assert_eq!(mgr.surface().focused(), Some(FocusTarget::OkButton));
        assert_eq!(outcome.try_result(), None);

        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.try_result(), Some(()));
    }

    #[test]
    fn test_confirmation_outcomes() {
        let (mut mgr, _clock) = manager();

        let outcome = mgr.prompt_confirmation(MsgSpec::text("Sure?"));
        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.now_or_never(), Some(true));

        let outcome = mgr.prompt_confirmation(MsgSpec::text("Sure?"));
        mgr.handle_event(OverlayEvent::CancelClick);
        assert_eq!(outcome.now_or_never(), Some(false));

        let outcome = mgr.prompt_confirmation(MsgSpec::text("Sure?"));
        mgr.handle_event(esc());
        assert_eq!(outcome.now_or_never(), Some(false));

        let outcome = mgr.prompt_confirmation(MsgSpec::text("Sure?"));
        mgr.handle_event(OverlayEvent::BackdropClick);
        assert_eq!(outcome.now_or_never(), Some(false));

        let outcome = mgr.prompt_confirmation(MsgSpec::text("Sure?"));
        drop(mgr.show_message(MsgSpec::text("superseded")));
        assert_eq!(outcome.now_or_never(), Some(false));
    }

    #[test]
    fn test_fatal_error_defaults() {
        let (mut mgr, _clock) = manager();
        mgr.show_fatal_error(MsgSpec::text("disk on fire"));
        assert_eq!(mgr.active_kind(), Some(DialogKind::FatalError));
        assert_eq!(mgr.surface().title(), Some(Some("Fatal error".into())));
        assert_eq!(mgr.surface().buttons(), Some(Buttons::NONE));
        assert_eq!(mgr.surface().focused(), Some(FocusTarget::Frame));

        mgr.handle_event(esc());
        mgr.handle_event(OverlayEvent::BackdropClick);
        assert_eq!(mgr.active_kind(), Some(DialogKind::FatalError));

        mgr.show_fatal_error(MsgSpec::text("again").with_title("Boom"));
        assert_eq!(mgr.surface().title(), Some(Some("Boom".into())));
    }

    #[test]
    fn test_prompt_input_returns_trimmed_value() {
        let (mut mgr, _clock) = manager();
        let outcome = mgr.prompt_input(InputSpec::new("Product ID:").with_title("Input"));
        assert_eq!(mgr.surface().focused(), Some(FocusTarget::Element(TestElement::Input)));

        mgr.surface().input().set_value("  abc-42 \n");
        mgr.handle_event(OverlayEvent::Submit);
        assert_eq!(outcome.now_or_never(), Some(Some("abc-42".to_string())));
    }

    #[test]
    fn test_prompt_input_rejects_empty_required_value() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_input(InputSpec::new("Name:"));
        mgr.surface().input().set_value("   ");

        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.try_result(), None);
        assert_eq!(mgr.active_kind(), Some(DialogKind::Prompt));
        assert_eq!(mgr.surface().input().validity_message(), Some("required".to_string()));
        assert!(mgr.surface().errors().is_empty());
    }

    #[test]
    fn test_prompt_input_custom_rule() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_input(InputSpec::new("Port:").with_rule(|value| {
            value
                .parse::<u16>()
                .map(|_| ())
                .map_err(|_| "not a port".to_string())
        }));

        mgr.surface().input().set_value("http");
        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.try_result(), None);
        assert_eq!(mgr.surface().input().validity_message(), Some("not a port".to_string()));

        mgr.surface().input().set_value(" 8080 ");
        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.try_result(), Some(Some("8080".to_string())));
    }

    #[test]
    fn test_prompt_input_cancel_yields_none() {
        let (mut mgr, _clock) = manager();
        let outcome = mgr.prompt_input(InputSpec::new("Name:").with_default_value("preset"));
        assert_eq!(mgr.surface().input().value(), "preset");
        mgr.handle_event(OverlayEvent::CancelClick);
        assert_eq!(outcome.now_or_never(), Some(None));
    }

    #[test]
    fn test_optional_input_accepts_empty() {
        let (mut mgr, _clock) = manager();
        let outcome = mgr.prompt_input(InputSpec::new("Comment:").optional().with_rows(3));
        assert!(
            mgr.surface()
                .calls()
                .contains(&Call::Content(TestContent::Input("Comment:".into())))
        );
        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(outcome.now_or_never(), Some(Some(String::new())));
    }
}
