use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

/// Wait indicator shown in the dialog header while a task is running.
pub struct Spinner {
    throbber_state: ThrobberState,
    color: Option<Color>,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            color: None,
        }
    }

    /// Overrides the theme colour, e.g. while the dialog is fading.
    pub const fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.throbber_state.calc_next();
    }

    /// Draws the single-cell throbber at the top-left of `area`.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let color = self.color.take().unwrap_or_else(|| theme.lavender());
        let throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(color));

        let area = Rect::new(area.x, area.y, area.width.min(1), area.height.min(1));
        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
