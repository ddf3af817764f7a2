use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::overlay::ToastState;
use crate::theme::blend;

const MAX_WIDTH: u16 = 44;
const BOTTOM_MARGIN: u16 = 2;

/// The toast box at the bottom centre of the screen.
#[derive(Debug, Default)]
pub struct ToastBox {
    text: String,
    state: ToastState,
    /// Start of the running fade, if any.
    fade_started: Option<Instant>,
}

impl ToastBox {
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    pub fn set_state(&mut self, state: ToastState, now: Instant, animate: bool) {
        self.state = state;
        self.fade_started = match state {
            ToastState::FadeIn | ToastState::FadeOut if animate => Some(now),
            _ => None,
        };
    }

    pub const fn state(&self) -> ToastState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the running fade has finished. Clears it when it has.
    pub fn poll_fade(&mut self, now: Instant, fade_in: Duration, fade_out: Duration) -> bool {
        let Some(started) = self.fade_started else {
            return false;
        };
        let duration = match self.state {
            ToastState::FadeIn => fade_in,
            ToastState::FadeOut => fade_out,
            ToastState::Hidden | ToastState::Shown => Duration::ZERO,
        };
        if now.duration_since(started) < duration {
            return false;
        }
        self.fade_started = None;
        true
    }

    fn opacity(&self, now: Instant, fade_in: Duration, fade_out: Duration) -> f32 {
        let progress = |duration: Duration| {
            self.fade_started.map_or(1.0, |started| {
                if duration.is_zero() {
                    1.0
                } else {
                    (now.duration_since(started).as_secs_f32() / duration.as_secs_f32()).min(1.0)
                }
            })
        };
        match self.state {
            ToastState::Hidden => 0.0,
            ToastState::FadeIn => progress(fade_in),
            ToastState::Shown => 1.0,
            ToastState::FadeOut if self.fade_started.is_some() => 1.0 - progress(fade_out),
            ToastState::FadeOut => 0.0,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        now: Instant,
        fades: (Duration, Duration),
    ) {
        if !self.state.is_visible() {
            return;
        }
        let opacity = self.opacity(now, fades.0, fades.1);
        let background = blend(theme.base(), theme.surface1(), opacity);
        let foreground = blend(theme.base(), theme.text(), opacity);

        let text_width = u16::try_from(self.text.chars().count()).unwrap_or(u16::MAX);
        let width = text_width
            .saturating_add(4)
            .min(MAX_WIDTH)
            .min(area.width.saturating_sub(2));
        let paragraph = Paragraph::new(self.text.as_str())
            .style(
                Style::default()
                    .fg(foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        let lines = u16::try_from(paragraph.line_count(width.saturating_sub(4))).unwrap_or(1);
        let height = (lines + 2).min(area.height);

        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.bottom().saturating_sub(height + BOTTOM_MARGIN).max(area.y);
        let toast_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, toast_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(background))
            .style(Style::default().bg(background));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);
        frame.render_widget(paragraph, inner.inner(Margin::new(1, 0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE_IN: Duration = Duration::from_millis(150);
    const FADE_OUT: Duration = Duration::from_millis(190);

    #[test]
    fn test_fade_completion() {
        let start = Instant::now();
        let mut toast = ToastBox::default();
        toast.set_state(ToastState::FadeIn, start, true);

        assert!(!toast.poll_fade(start + Duration::from_millis(149), FADE_IN, FADE_OUT));
        assert!(toast.poll_fade(start + FADE_IN, FADE_IN, FADE_OUT));
        // Reported once.
        assert!(!toast.poll_fade(start + FADE_IN, FADE_IN, FADE_OUT));
    }

    #[test]
    fn test_no_fade_without_animation() {
        let start = Instant::now();
        let mut toast = ToastBox::default();
        toast.set_state(ToastState::FadeIn, start, false);
        assert!(!toast.poll_fade(start + FADE_OUT, FADE_IN, FADE_OUT));
        assert!((toast.opacity(start, FADE_IN, FADE_OUT) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_opacity_follows_fade_out() {
        let start = Instant::now();
        let mut toast = ToastBox::default();
        toast.set_state(ToastState::FadeOut, start, true);
        let halfway = toast.opacity(start + Duration::from_millis(95), FADE_IN, FADE_OUT);
        assert!((halfway - 0.5).abs() < 0.01);
    }
}
