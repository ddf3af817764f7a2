use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::overlay::InputRule;
use crate::ui::{Component, EventResult, Result};

const REQUIRED_MESSAGE: &str = "Please fill out this field.";

pub enum TextInputEvent {
    Submitted(String),
}

/// Editable text field of an input prompt.
///
/// Single-line fields submit on Enter. Fields with more than one row insert a
/// line break instead; the prompt's OK button submits them.
pub struct TextInput {
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    rows: u16,
    required: bool,
    rule: Option<InputRule>,
    validity_message: Option<String>,
    focused: bool,
}

impl TextInput {
    pub fn new(value: impl Into<String>, rows: u16) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
            rows: rows.max(1),
            required: false,
            rule: None,
            validity_message: None,
            focused: false,
        }
    }

    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_rule(mut self, rule: Option<InputRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub const fn is_multiline(&self) -> bool {
        self.rows > 1
    }

    pub fn validity_message(&self) -> Option<&str> {
        self.validity_message.as_deref()
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Rows taken by the bordered field and its validity message.
    pub fn height(&self) -> u16 {
        self.rows + 2 + u16::from(self.validity_message.is_some())
    }

    pub fn trim(&mut self) {
        let trimmed = self.value.trim();
        if trimmed.len() != self.value.len() {
            self.value = trimmed.to_owned();
            self.cursor = self.cursor.min(self.value.chars().count());
        }
    }

    /// Checks the value and keeps the failure message for display.
    pub fn report_validity(&mut self) -> bool {
        self.validity_message = if self.required && self.value.is_empty() {
            Some(REQUIRED_MESSAGE.to_string())
        } else {
            self.rule.as_ref().and_then(|rule| rule(&self.value).err())
        };
        self.validity_message.is_none()
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn edited(&mut self) {
        self.validity_message = None;
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
        self.edited();
    }

    /// Inserts pasted text at the cursor. Single-line fields get line breaks
    /// replaced by spaces.
    pub fn insert_str(&mut self, text: &str) {
        let text = if self.is_multiline() {
            text.replace("\r\n", "\n")
        } else {
            text.replace(['\r', '\n'], " ")
        };
        let at = self.byte_index();
        self.value.insert_str(at, &text);
        self.cursor += text.chars().count();
        self.edited();
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.value.remove(at);
            self.edited();
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
            self.edited();
        }
    }

    const fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    const fn move_cursor_start(&mut self) {
        self.cursor = 0;
    }

    fn move_cursor_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let end = self.byte_index();
        self.cursor = pos;
        let start = self.byte_index();
        self.value.drain(start..end);
        self.edited();
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.edited();
    }

    /// Index of the line holding the cursor.
    fn cursor_line(&self) -> u16 {
        let line = self.value.chars().take(self.cursor).filter(|c| *c == '\n').count();
        u16::try_from(line).unwrap_or(u16::MAX)
    }

    fn lines(&self, input_style: Style, cursor_style: Style) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for segment in self.value.split('\n') {
            let len = segment.chars().count();
            let end = start + len;
            if self.focused && (start..=end).contains(&self.cursor) {
                let at = self.cursor - start;
                let before: String = segment.chars().take(at).collect();
                let mut rest = segment.chars().skip(at);
                let cursor_char = rest.next().unwrap_or(' ');
                let after: String = rest.collect();
                lines.push(Line::from(vec![
                    Span::styled(before, input_style),
                    Span::styled(cursor_char.to_string(), cursor_style),
                    Span::styled(after, input_style),
                ]));
            } else {
                lines.push(Line::styled(segment.to_owned(), input_style));
            }
            start = end + 1;
        }
        lines
    }

    /// Renders the bordered field with the validity message below it.
    pub fn render_field(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [field_area, message_area] =
            Layout::vertical([Constraint::Length(self.rows + 2), Constraint::Fill(1)]).areas(area);

        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let border_color = if self.validity_message.is_some() {
            theme.error()
        } else if self.focused {
            theme.border_focused()
        } else {
            theme.border()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.mantle()));

        let scroll = self.cursor_line().saturating_sub(self.rows - 1);
        let paragraph = Paragraph::new(self.lines(input_style, cursor_style))
            .block(block)
            .scroll((scroll, 0));
        frame.render_widget(paragraph, field_area);

        if let Some(message) = &self.validity_message {
            let line = Line::from(Span::styled(
                format!("⚠ {message}"),
                Style::default().fg(theme.error()),
            ));
            frame.render_widget(Paragraph::new(line), message_area);
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            // Submit
            (KeyCode::Enter, _) if !self.is_multiline() => {
                TextInputEvent::Submitted(self.value.clone()).into()
            }
            (KeyCode::Enter, _) => {
                self.insert_char('\n');
                EventResult::Consumed
            }

            // Delete
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                EventResult::Consumed
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                EventResult::Consumed
            }

            // Navigation
            (KeyCode::Left, _) => {
                self.move_cursor_left();
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.move_cursor_right();
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.move_cursor_start();
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.move_cursor_end();
                EventResult::Consumed
            }

            // Clear line
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                EventResult::Consumed
            }

            // Character input
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                EventResult::Consumed
            }

            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.render_field(frame, area, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_editing_with_multibyte_chars() {
        let mut input = TextInput::new("héllo", 1);
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Backspace)).unwrap();
        type_str(&mut input, "ö");
        assert_eq!(input.value(), "hélöo");

        input.handle_key(key(KeyCode::Home)).unwrap();
        input.handle_key(key(KeyCode::Delete)).unwrap();
        assert_eq!(input.value(), "élöo");
    }

    #[test]
    fn test_enter_submits_single_line() {
        let mut input = TextInput::new("abc", 1);
        let result = input.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            result,
            EventResult::Event(TextInputEvent::Submitted(value)) if value == "abc"
        ));
    }

    #[test]
    fn test_enter_breaks_line_when_multiline() {
        let mut input = TextInput::new("a", 5);
        let result = input.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(result, EventResult::Consumed));
        type_str(&mut input, "b");
        assert_eq!(input.value(), "a\nb");
        assert_eq!(input.cursor_line(), 1);
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("product id  ", 1);
        input
            .handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT))
            .unwrap();
        assert_eq!(input.value(), "product ");
    }

    #[test]
    fn test_required_and_rule() {
        let mut input = TextInput::new("   ", 1)
            .required(true)
            .with_rule(Some(Box::new(|value: &str| {
                if value.chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err("Digits only.".to_string())
                }
            })));

        input.trim();
        assert!(!input.report_validity());
        assert_eq!(input.validity_message(), Some(REQUIRED_MESSAGE));
        assert_eq!(input.height(), 4);

        type_str(&mut input, "12a");
        assert_eq!(input.validity_message(), None);
        assert!(!input.report_validity());
        assert_eq!(input.validity_message(), Some("Digits only."));

        input.handle_key(key(KeyCode::Backspace)).unwrap();
        assert!(input.report_validity());
    }

    #[test]
    fn test_paste() {
        let mut input = TextInput::new("ab", 1);
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.insert_str("x\ny");
        assert_eq!(input.value(), "ax yb");

        let mut area = TextInput::new("", 3);
        area.insert_str("one\r\ntwo");
        assert_eq!(area.value(), "one\ntwo");
        assert_eq!(area.cursor_line(), 1);
    }

    #[test]
    fn test_escape_is_left_to_the_dialog() {
        let mut input = TextInput::new("", 1);
        let result = input.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(result, EventResult::Ignored));
    }
}
