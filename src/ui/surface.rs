//! Terminal implementation of the overlay surface.
//!
//! [`TerminalSurface`] keeps the visual state the dialog core pushes into it
//! and draws it over whatever the host rendered before. Input flows the other
//! way: the host hands key and mouse events to the surface, which turns the
//! ones meant for the dialog core into [`OverlayEvent`]s.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Report;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};
use tracing::{debug, trace};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver, SurfaceConfig};
use crate::overlay::{
    Buttons, Clock, ContentBuilder, FocusTarget, InputForm, InputPanel, OverlayEvent,
    OverlaySurface, SystemClock, ToastState, VisualState,
};
use crate::theme::blend;
use crate::ui::components::{TextInput, TextInputEvent};
use crate::ui::panel::{Panel, SharedInput, parse_markup};
use crate::ui::toast::ToastBox;
use crate::ui::widgets::Spinner;
use crate::ui::{Component, EventResult, Result};

const OK_LABEL: &str = "[ OK ]";
const CANCEL_LABEL: &str = "[ Cancel ]";

/// Focusable elements of the terminal overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusId {
    /// The dialog frame.
    Frame,
    OkButton,
    CancelButton,
    /// The input field of a prompt.
    Input,
    /// Anything behind the overlay.
    Page,
}

/// Screen regions of the last rendered frame, for mouse hit testing.
#[derive(Debug, Default, Clone, Copy)]
struct HitAreas {
    frame: Option<Rect>,
    ok: Option<Rect>,
    cancel: Option<Rect>,
    input: Option<Rect>,
}

pub struct TerminalSurface {
    config: SurfaceConfig,
    keys: Arc<KeyResolver>,
    clock: Box<dyn Clock>,
    installed: bool,
    visual_state: VisualState,
    /// Start of the running overlay fade, if any.
    fade_started: Option<Instant>,
    wait_cursor: bool,
    spinner: Spinner,
    title: Option<String>,
    content: Option<Panel>,
    wide: bool,
    buttons: Buttons,
    scroll: u16,
    max_scroll: u16,
    viewport: u16,
    focus: FocusId,
    watching_focus: bool,
    error: Option<String>,
    toast: ToastBox,
    hits: HitAreas,
}

impl TerminalSurface {
    pub fn new(config: SurfaceConfig, keys: Arc<KeyResolver>) -> Self {
        Self {
            config,
            keys,
            clock: Box::new(SystemClock),
            installed: false,
            visual_state: VisualState::None,
            fade_started: None,
            wait_cursor: false,
            spinner: Spinner::new(),
            title: None,
            content: None,
            wide: false,
            buttons: Buttons::NONE,
            scroll: 0,
            max_scroll: 0,
            viewport: 0,
            focus: FocusId::Page,
            watching_focus: false,
            error: None,
            toast: ToastBox::default(),
            hits: HitAreas::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub const fn visual_state(&self) -> VisualState {
        self.visual_state
    }

    pub const fn focused(&self) -> FocusId {
        self.focus
    }

    pub const fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub const fn content(&self) -> Option<&Panel> {
        self.content.as_ref()
    }

    pub const fn is_wide(&self) -> bool {
        self.wide
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn toast(&self) -> &ToastBox {
        &self.toast
    }

    /// Whether the dialog frame is on screen and accepts input.
    pub const fn is_interactive(&self) -> bool {
        matches!(self.visual_state, VisualState::FadeIn)
    }

    const fn animated(&self) -> bool {
        self.config.fade_in_ms > 0 && self.config.fade_out_ms > 0
    }

    fn fade_duration(&self) -> Duration {
        match self.visual_state {
            VisualState::FadeIn => self.config.fade_in(),
            VisualState::FadeOut => self.config.fade_out(),
            VisualState::None | VisualState::TransparentOverlay => Duration::ZERO,
        }
    }

    /// Overlay opacity from 0 (invisible) to 1, following the running fade.
    fn opacity(&self, now: Instant) -> f32 {
        let progress = self.fade_started.map_or(1.0, |started| {
            let duration = self.fade_duration();
            if duration.is_zero() {
                1.0
            } else {
                (now.duration_since(started).as_secs_f32() / duration.as_secs_f32()).min(1.0)
            }
        });
        match self.visual_state {
            VisualState::FadeIn => progress,
            VisualState::FadeOut => 1.0 - progress,
            VisualState::None | VisualState::TransparentOverlay => 0.0,
        }
    }

    /// Reports finished fades of the overlay and the toast.
    ///
    /// Call once per tick and feed the events to the dialog manager.
    pub fn poll_animations(&mut self) -> Vec<OverlayEvent<FocusId>> {
        let now = self.clock.now();
        let mut events = Vec::new();
        if let Some(started) = self.fade_started
            && now.duration_since(started) >= self.fade_duration()
        {
            self.fade_started = None;
            trace!(state = ?self.visual_state, "overlay animation finished");
            events.push(OverlayEvent::AnimationEnd);
        }
        if self
            .toast
            .poll_fade(now, self.config.fade_in(), self.config.fade_out())
        {
            events.push(OverlayEvent::ToastAnimationEnd);
        }
        events
    }

    fn input(&self) -> Option<&SharedInput> {
        self.content.as_ref().and_then(Panel::input)
    }

    /// Tab order of the visible dialog elements.
    fn focus_order(&self) -> Vec<FocusId> {
        let mut order = Vec::new();
        if self.input().is_some() {
            order.push(FocusId::Input);
        }
        if self.buttons.ok {
            order.push(FocusId::OkButton);
        }
        if self.buttons.cancel {
            order.push(FocusId::CancelButton);
        }
        order
    }

    fn set_focus(&mut self, focus: FocusId) {
        trace!(from = ?self.focus, to = ?focus, "focus");
        self.focus = focus;
        if let Some(input) = self.input() {
            input.borrow_mut().set_focused(focus == FocusId::Input);
        }
    }

    /// Moves focus like a browser would: past the last element it leaves the
    /// dialog for the page behind.
    fn cycle_focus(&mut self, forward: bool) -> EventResult<OverlayEvent<FocusId>> {
        let order = self.focus_order();
        let position = order.iter().position(|id| *id == self.focus);
        let next = match (position, forward) {
            (Some(i), true) => order.get(i + 1).copied().unwrap_or(FocusId::Page),
            (Some(0), false) => FocusId::Page,
            (Some(i), false) => order[i - 1],
            (None, true) if self.focus == FocusId::Page => {
                order.first().copied().unwrap_or(FocusId::Frame)
            }
            (None, false) if self.focus == FocusId::Page => {
                order.last().copied().unwrap_or(FocusId::Frame)
            }
            (None, _) => FocusId::Page,
        };
        self.set_focus(next);
        if self.watching_focus {
            OverlayEvent::FocusIn(next).into()
        } else {
            EventResult::Consumed
        }
    }

    fn scroll_by(&mut self, down: bool) {
        let page = self.viewport.max(1);
        self.scroll = if down {
            self.scroll.saturating_add(page).min(self.max_scroll)
        } else {
            self.scroll.saturating_sub(page)
        };
    }

    /// Pastes into the focused input field. Returns whether the text went
    /// anywhere.
    pub fn paste(&mut self, text: &str) -> bool {
        if !self.is_interactive() || self.focus != FocusId::Input {
            return false;
        }
        self.input().is_some_and(|input| {
            input.borrow_mut().insert_str(text);
            true
        })
    }

    /// Translates a mouse event. Only left clicks matter.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> EventResult<OverlayEvent<FocusId>> {
        if self.visual_state == VisualState::None {
            return EventResult::Ignored;
        }
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return EventResult::Consumed;
        }
        if !self.is_interactive() {
            return OverlayEvent::BackdropClick.into();
        }

        let position = Position::new(mouse.column, mouse.row);
        let hit = |area: Option<Rect>| area.is_some_and(|area| area.contains(position));
        if hit(self.hits.ok) {
            OverlayEvent::OkClick.into()
        } else if hit(self.hits.cancel) {
            OverlayEvent::CancelClick.into()
        } else if hit(self.hits.input) {
            self.set_focus(FocusId::Input);
            OverlayEvent::FocusIn(FocusId::Input).into()
        } else if hit(self.hits.frame) {
            self.set_focus(FocusId::Frame);
            EventResult::Consumed
        } else {
            OverlayEvent::BackdropClick.into()
        }
    }

    fn frame_area(&self, area: Rect) -> (Rect, u16) {
        let width = if self.wide {
            self.config.wide_width
        } else {
            self.config.narrow_width
        }
        .min(area.width.saturating_sub(2));
        let content_width = width.saturating_sub(4);
        let content_height = self
            .content
            .as_ref()
            .map_or(1, |panel| panel.height(content_width));
        let footer = u16::from(self.buttons.footer_visible()) + u16::from(self.error.is_some());
        let chrome = 2 + if footer > 0 { footer + 1 } else { 0 };
        let height = content_height
            .saturating_add(chrome)
            .min(area.height.saturating_sub(2));

        // Slightly above the middle, as the upper filler is smaller.
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height.saturating_sub(height)) * 2 / 5;
        (Rect::new(x, y, width, height), content_height)
    }

    fn render_dialog(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, opacity: f32) {
        let (frame_area, content_height) = self.frame_area(area);
        let fade = |color: Color| blend(theme.base(), color, opacity);

        frame.render_widget(Clear, frame_area);
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(fade(theme.border_focused())))
            .style(Style::default().bg(theme.base()));
        if let Some(title) = &self.title {
            block = block.title(Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(fade(theme.mauve()))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let inner = block.inner(frame_area).inner(Margin::new(1, 0));
        frame.render_widget(block, frame_area);

        if self.wait_cursor {
            let header = Rect::new(frame_area.right().saturating_sub(3), frame_area.y, 1, 1);
            self.spinner.set_color(fade(theme.lavender()));
            self.spinner.render(frame, header, theme);
        }

        let footer_rows =
            u16::from(self.buttons.footer_visible()) + u16::from(self.error.is_some());
        let gap = u16::from(footer_rows > 0);
        let [content_area, _, error_area, buttons_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(gap),
            Constraint::Length(u16::from(self.error.is_some())),
            Constraint::Length(u16::from(self.buttons.footer_visible())),
        ])
        .areas(inner);

        self.viewport = content_area.height;
        self.max_scroll = content_height.saturating_sub(content_area.height);
        self.scroll = self.scroll.min(self.max_scroll);

        let text_style = Style::default().fg(fade(theme.text()));
        self.hits.input = self.content.as_ref().and_then(|panel| {
            panel.render(frame, content_area, self.scroll, text_style, theme)
        });

        if self.max_scroll > 0 {
            let mut state = ScrollbarState::new(usize::from(self.max_scroll))
                .position(usize::from(self.scroll));
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .style(Style::default().fg(fade(theme.overlay1()))),
                frame_area.inner(Margin::new(0, 1)),
                &mut state,
            );
        }

        if let Some(error) = &self.error {
            let line = Line::from(Span::styled(
                format!("✗ {error}"),
                Style::default().fg(fade(theme.error())),
            ));
            frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), error_area);
        }

        self.hits.ok = None;
        self.hits.cancel = None;
        if self.buttons.footer_visible() {
            self.render_buttons(frame, buttons_area, theme, opacity);
        }
        self.hits.frame = Some(frame_area);
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect, theme: &Theme, opacity: f32) {
        let fade = |color: Color| blend(theme.base(), color, opacity);
        let style = |id: FocusId, color: Color| {
            if self.focus == id {
                Style::default()
                    .fg(theme.base())
                    .bg(fade(color))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(fade(color)).add_modifier(Modifier::BOLD)
            }
        };

        let label_width = |label: &str| u16::try_from(label.chars().count()).unwrap_or(0);
        let mut right = area.right();
        if self.buttons.cancel {
            let width = label_width(CANCEL_LABEL);
            let rect = Rect::new(right.saturating_sub(width), area.y, width, 1).intersection(area);
            frame.render_widget(
                Span::styled(CANCEL_LABEL, style(FocusId::CancelButton, theme.overlay2())),
                rect,
            );
            self.hits.cancel = Some(rect);
            right = rect.x.saturating_sub(1);
        }
        if self.buttons.ok {
            let width = label_width(OK_LABEL);
            let rect = Rect::new(right.saturating_sub(width), area.y, width, 1).intersection(area);
            frame.render_widget(
                Span::styled(OK_LABEL, style(FocusId::OkButton, theme.success())),
                rect,
            );
            self.hits.ok = Some(rect);
        }
    }
}

impl Component for TerminalSurface {
    type Output = OverlayEvent<FocusId>;

    /// Routes a key press.
    ///
    /// Keys for the dialog core come back as events. Keys for the focused
    /// dialog element are consumed here. With no dialog on screen, or with
    /// focus on the page, every key is handed on as [`OverlayEvent::Key`].
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_interactive() || self.focus == FocusId::Page {
            return Ok(OverlayEvent::Key(key).into());
        }

        let action = self.keys.resolve_dialog(&key);
        Ok(match action {
            Some(DialogAction::Dismiss) => OverlayEvent::Key(key).into(),
            Some(DialogAction::FocusNext) => self.cycle_focus(true),
            Some(DialogAction::FocusPrev) => self.cycle_focus(false),
            Some(DialogAction::ScrollUp) => {
                self.scroll_by(false);
                EventResult::Consumed
            }
            Some(DialogAction::ScrollDown) => {
                self.scroll_by(true);
                EventResult::Consumed
            }
            Some(DialogAction::Activate) if self.focus == FocusId::OkButton => {
                OverlayEvent::OkClick.into()
            }
            Some(DialogAction::Activate) if self.focus == FocusId::CancelButton => {
                OverlayEvent::CancelClick.into()
            }
            _ if self.focus == FocusId::Input => {
                let Some(input) = self.input().cloned() else {
                    return Ok(EventResult::Consumed);
                };
                let result = input.borrow_mut().handle_key(key)?;
                match result {
                    EventResult::Event(TextInputEvent::Submitted(_)) => {
                        OverlayEvent::Submit.into()
                    }
                    EventResult::Consumed | EventResult::Ignored => EventResult::Consumed,
                }
            }
            _ => EventResult::Consumed,
        })
    }

    fn handle_tick(&mut self) {
        if self.wait_cursor {
            self.spinner.handle_tick();
        }
    }

    /// Draws the overlay on top of what is already in the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let now = self.clock.now();
        self.hits = HitAreas::default();

        if matches!(
            self.visual_state,
            VisualState::FadeIn | VisualState::FadeOut
        ) {
            let opacity = self.opacity(now);
            // The backdrop dims the page while the dialog is mostly visible.
            if opacity > 0.3 {
                frame
                    .buffer_mut()
                    .set_style(area, Style::default().add_modifier(Modifier::DIM));
            }
            self.render_dialog(frame, area, theme, opacity);
        }

        self.toast.render(
            frame,
            area,
            theme,
            now,
            (self.config.fade_in(), self.config.fade_out()),
        );
    }
}

impl OverlaySurface for TerminalSurface {
    type Content = Panel;
    type Element = FocusId;

    fn install(&mut self) {
        self.installed = true;
        debug!(animated = self.animated(), "terminal overlay installed");
    }

    fn animation_supported(&self) -> bool {
        self.animated()
    }

    fn set_visual_state(&mut self, state: VisualState) {
        self.visual_state = state;
        self.fade_started = match state {
            VisualState::FadeIn | VisualState::FadeOut if self.animated() => {
                Some(self.clock.now())
            }
            _ => None,
        };
        if state == VisualState::None {
            self.focus = FocusId::Page;
        }
    }

    fn set_wait_cursor(&mut self, enabled: bool) {
        self.wait_cursor = enabled;
    }

    fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_owned);
    }

    fn set_content(&mut self, content: Panel) {
        self.content = Some(content);
        self.error = None;
    }

    fn set_wide(&mut self, wide: bool) {
        self.wide = wide;
    }

    fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    fn focus(&mut self, target: &FocusTarget<FocusId>) {
        let id = match target {
            FocusTarget::Element(id) => *id,
            FocusTarget::CancelButton => FocusId::CancelButton,
            FocusTarget::OkButton => FocusId::OkButton,
            FocusTarget::Frame => FocusId::Frame,
        };
        self.set_focus(id);
    }

    fn contains(&self, element: &FocusId) -> bool {
        *element != FocusId::Page
    }

    fn watch_focus(&mut self, enabled: bool) {
        self.watching_focus = enabled;
    }

    fn report_error(&mut self, report: &Report) {
        self.error = Some(report.to_string());
    }

    fn set_toast_text(&mut self, text: &str) {
        self.toast.set_text(text);
    }

    fn set_toast_state(&mut self, state: ToastState) {
        let now = self.clock.now();
        let animated = self.animated();
        self.toast.set_state(state, now, animated);
    }
}

impl ContentBuilder for TerminalSurface {
    type Input = SharedInput;

    fn text_panel(&mut self, text: &str) -> Panel {
        Panel::Text(text.to_owned())
    }

    fn markup_panel(&mut self, markup: &str) -> Panel {
        Panel::Rich(parse_markup(markup))
    }

    fn input_panel(&mut self, form: InputForm) -> InputPanel<Panel, SharedInput, FocusId> {
        let InputForm {
            prompt_text,
            default_value,
            rows,
            required,
            rule,
        } = form;
        let input = SharedInput::new(
            TextInput::new(default_value.unwrap_or_default(), rows.unwrap_or(1))
                .required(required)
                .with_rule(rule),
        );
        InputPanel {
            content: Panel::Form {
                prompt: prompt_text,
                input: input.clone(),
            },
            input,
            focus: FocusId::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use futures::FutureExt;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::config::OverlayConfig;
    use crate::overlay::testing::{ManualClock, keys};
    use crate::overlay::{DialogManager, InputSpec, MsgSpec, ProgressSpec};

    type Manager = DialogManager<TerminalSurface>;

    fn manager() -> (Manager, ManualClock) {
        let clock = ManualClock::new();
        let surface =
            TerminalSurface::new(SurfaceConfig::default(), keys()).with_clock(clock.clone());
        let manager = DialogManager::new(surface, keys()).with_clock(clock.clone());
        (manager, clock)
    }

    fn press(manager: &mut Manager, code: KeyCode) -> EventResult<()> {
        press_with(manager, KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Routes a key the way the demo host does.
    fn press_with(manager: &mut Manager, key: KeyEvent) -> EventResult<()> {
        match manager.surface_mut().handle_key(key).unwrap() {
            EventResult::Event(event) => manager.handle_event(event),
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        }
    }

    fn tick(manager: &mut Manager) {
        manager.tick();
        for event in manager.surface_mut().poll_animations() {
            manager.handle_event(event);
        }
    }

    fn draw(manager: &mut Manager, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| manager.surface_mut().render(frame, frame.area(), &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_message_renders_title_text_and_ok() {
        let (mut mgr, _clock) = manager();
        let _outcome = mgr.show_message(MsgSpec::text("Message text...").with_title("Title text"));

        let screen = draw(&mut mgr, 80, 20);
        assert!(screen.contains("Title text"));
        assert!(screen.contains("Message text..."));
        assert!(screen.contains(OK_LABEL));
        assert!(!screen.contains(CANCEL_LABEL));
        assert_eq!(mgr.surface().focused(), FocusId::OkButton);
    }

    #[test]
    fn test_fade_in_reports_animation_end() {
        let (mut mgr, clock) = manager();
        let _outcome = mgr.show_message(MsgSpec::text("x"));
        assert!(mgr.surface_mut().poll_animations().is_empty());

        clock.advance(Duration::from_millis(150));
        assert_eq!(
            mgr.surface_mut().poll_animations(),
            vec![OverlayEvent::AnimationEnd]
        );
    }

    #[test]
    fn test_enter_on_focused_cancel_resolves_false() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_confirmation(MsgSpec::text("Question text?"));
        assert_eq!(mgr.surface().focused(), FocusId::CancelButton);

        assert_eq!(press(&mut mgr, KeyCode::Enter), EventResult::Consumed);
        assert_eq!(outcome.try_result(), Some(false));
    }

    #[test]
    fn test_tab_then_enter_confirms() {
        let (mut mgr, _clock) = manager();
        let outcome = mgr.prompt_confirmation(MsgSpec::text("Question text?"));

        // Cancel -> page -> jail pulls focus back to Cancel.
        press(&mut mgr, KeyCode::Tab);
        assert_eq!(mgr.surface().focused(), FocusId::CancelButton);

        press_with(&mut mgr, KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(mgr.surface().focused(), FocusId::OkButton);
        press(&mut mgr, KeyCode::Enter);
        assert_eq!(outcome.now_or_never(), Some(true));
    }

    #[test]
    fn test_typing_into_prompt_and_submitting() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_input(InputSpec::new("Enter product ID:"));
        assert_eq!(mgr.surface().focused(), FocusId::Input);

        press(&mut mgr, KeyCode::Enter);
        assert_eq!(outcome.try_result(), None);
        let input = mgr.surface().content().and_then(Panel::input).cloned().unwrap();
        assert!(input.borrow().validity_message().is_some());

        for c in " 42 ".chars() {
            press(&mut mgr, KeyCode::Char(c));
        }
        press(&mut mgr, KeyCode::Enter);
        assert_eq!(outcome.try_result(), Some(Some("42".to_string())));
    }

    #[test]
    fn test_paste_goes_to_focused_input() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_input(InputSpec::new("Enter product ID:"));
        assert!(mgr.surface_mut().paste("  A-17\n"));

        press(&mut mgr, KeyCode::Tab);
        assert_eq!(mgr.surface().focused(), FocusId::OkButton);
        assert!(!mgr.surface_mut().paste("ignored"));
        press(&mut mgr, KeyCode::Enter);
        assert_eq!(outcome.try_result(), Some(Some("A-17".to_string())));
    }

    #[test]
    fn test_escape_dismisses_from_input() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.prompt_input(InputSpec::new("Name:").with_default_value("x"));
        assert_eq!(press(&mut mgr, KeyCode::Esc), EventResult::Consumed);
        assert_eq!(outcome.try_result(), Some(None));
    }

    #[test]
    fn test_page_keys_pass_through_without_dialog() {
        let (mut mgr, _clock) = manager();
        mgr.show_toast("hello", None);
        assert_eq!(press(&mut mgr, KeyCode::Char('j')), EventResult::Ignored);
    }

    #[test]
    fn test_transparent_overlay_swallows_keys_and_clicks() {
        let (mut mgr, _clock) = manager();
        mgr.show_progress_info(
            ProgressSpec::new(MsgSpec::text("1s delayed...")).with_delay(Duration::from_secs(1)),
        );
        assert_eq!(press(&mut mgr, KeyCode::Char('j')), EventResult::Consumed);

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        let event = mgr.surface_mut().handle_mouse(click);
        assert_eq!(event, EventResult::Event(OverlayEvent::BackdropClick));
        assert_eq!(mgr.handle_event(OverlayEvent::BackdropClick), EventResult::Consumed);

        let screen = draw(&mut mgr, 60, 12);
        assert!(!screen.contains("1s delayed"));
    }

    #[test]
    fn test_click_on_ok_and_backdrop() {
        let (mut mgr, _clock) = manager();
        let mut outcome = mgr.show_message(MsgSpec::text("Line one\nLine two"));
        draw(&mut mgr, 80, 20);

        let ok = mgr.surface().hits.ok.unwrap();
        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            mgr.surface_mut().handle_mouse(click(ok.x, ok.y)),
            EventResult::Event(OverlayEvent::OkClick)
        );
        assert_eq!(
            mgr.surface_mut().handle_mouse(click(0, 0)),
            EventResult::Event(OverlayEvent::BackdropClick)
        );
        mgr.handle_event(OverlayEvent::BackdropClick);
        assert_eq!(outcome.try_result(), Some(()));
    }

    #[test]
    fn test_long_text_scrolls_and_resets() {
        let (mut mgr, _clock) = manager();
        let long = "Blah blah blah blah. ".repeat(999);
        let _first = mgr.show_message(MsgSpec::text(long.clone()));
        assert!(mgr.surface().is_wide());
        draw(&mut mgr, 100, 20);

        press(&mut mgr, KeyCode::PageDown);
        assert!(mgr.surface().scroll() > 0);

        let _second = mgr.show_message(MsgSpec::text(long));
        assert_eq!(mgr.surface().scroll(), 0);
    }

    #[test]
    fn test_validator_failure_shows_in_footer() {
        let (mut mgr, _clock) = manager();
        let request = crate::overlay::DialogRequest::<TerminalSurface>::new(
            crate::overlay::DialogKind::Prompt,
            Panel::Text("x".to_string()),
        )
        .with_ok_button()
        .with_validator(|| Err(color_eyre::eyre::eyre!("backend unavailable")));
        let _outcome = mgr.open_dialog(request);

        mgr.handle_event(OverlayEvent::OkClick);
        assert_eq!(mgr.surface().error(), Some("backend unavailable"));
        let screen = draw(&mut mgr, 80, 20);
        assert!(screen.contains("backend unavailable"));
    }

    #[test]
    fn test_wait_cursor_spinner_and_fade_out() {
        let (mut mgr, clock) = manager();
        mgr.show_progress_info(ProgressSpec::new(MsgSpec::text("Progress Info...")));
        let screen = draw(&mut mgr, 80, 20);
        assert!(screen.contains("Progress Info..."));

        mgr.close_progress_info();
        assert_eq!(mgr.surface().visual_state(), VisualState::FadeOut);
        clock.advance(Duration::from_millis(190));
        tick(&mut mgr);
        assert_eq!(mgr.surface().visual_state(), VisualState::None);
        assert!(!draw(&mut mgr, 80, 20).contains("Progress Info..."));
    }

    #[test]
    fn test_no_animation_when_fades_disabled() {
        let clock = ManualClock::new();
        let config = SurfaceConfig {
            fade_in_ms: 0,
            fade_out_ms: 0,
            ..SurfaceConfig::default()
        };
        let surface = TerminalSurface::new(config, keys()).with_clock(clock.clone());
        let mut mgr = DialogManager::new(surface, keys())
            .with_config(OverlayConfig::default())
            .with_clock(clock);
        mgr.show_progress_info(ProgressSpec::new(MsgSpec::text("x")));
        mgr.close_progress_info();
        assert_eq!(mgr.surface().visual_state(), VisualState::None);
    }

    #[test]
    fn test_toast_renders_at_bottom() {
        let (mut mgr, clock) = manager();
        mgr.show_toast("This is toast message 1.", None);
        clock.advance(Duration::from_millis(150));
        tick(&mut mgr);
        assert_eq!(mgr.toast().state(), ToastState::Shown);

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| mgr.surface_mut().render(frame, frame.area(), &theme))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String { (0..60).map(|x| buffer[(x, y)].symbol()).collect() };
        assert!(row(8).contains("This is toast message 1."));
    }
}
