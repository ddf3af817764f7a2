//! Dialog content panels.

use std::cell::RefCell;
use std::rc::Rc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};

use crate::Theme;
use crate::overlay::InputHandle;
use crate::ui::components::TextInput;

/// Content shown inside the dialog frame.
pub enum Panel {
    /// Preformatted text. Line breaks are kept, long lines wrap.
    Text(String),
    /// Styled text, built from markup or handed over as a ready node.
    Rich(Text<'static>),
    /// A prompt with an input field below it.
    Form { prompt: String, input: SharedInput },
}

impl Panel {
    fn paragraph(&self) -> Paragraph<'_> {
        match self {
            Self::Text(text) => Paragraph::new(text.as_str()).wrap(Wrap { trim: false }),
            Self::Rich(text) => Paragraph::new(text.clone()).wrap(Wrap { trim: true }),
            Self::Form { prompt, .. } => Paragraph::new(prompt.as_str()).wrap(Wrap { trim: false }),
        }
    }

    /// Rows needed to show the whole panel at `width` columns.
    pub fn height(&self, width: u16) -> u16 {
        let text_rows = u16::try_from(self.paragraph().line_count(width)).unwrap_or(u16::MAX);
        match self {
            Self::Form { input, .. } => text_rows.saturating_add(input.borrow().height()),
            Self::Text(_) | Self::Rich(_) => text_rows,
        }
    }

    /// The input field inside the panel, if any.
    pub const fn input(&self) -> Option<&SharedInput> {
        match self {
            Self::Form { input, .. } => Some(input),
            Self::Text(_) | Self::Rich(_) => None,
        }
    }

    /// Renders the panel. `scroll` applies to the text part only; the input
    /// field of a form stays anchored below it. Returns the field's area.
    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        scroll: u16,
        text_style: Style,
        theme: &Theme,
    ) -> Option<Rect> {
        let paragraph = self.paragraph().style(text_style).scroll((scroll, 0));
        match self {
            Self::Form { input, .. } => {
                let mut input = input.borrow_mut();
                let [text_area, input_area] =
                    Layout::vertical([Constraint::Fill(1), Constraint::Length(input.height())])
                        .areas(area);
                frame.render_widget(paragraph, text_area);
                input.render_field(frame, input_area, theme);
                Some(input_area)
            }
            Self::Text(_) | Self::Rich(_) => {
                frame.render_widget(paragraph, area);
                None
            }
        }
    }
}

/// A [`TextInput`] shared between the form panel and the prompt's validator.
#[derive(Clone)]
pub struct SharedInput(Rc<RefCell<TextInput>>);

impl SharedInput {
    pub fn new(input: TextInput) -> Self {
        Self(Rc::new(RefCell::new(input)))
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, TextInput> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, TextInput> {
        self.0.borrow_mut()
    }
}

impl InputHandle for SharedInput {
    fn trim(&mut self) {
        self.0.borrow_mut().trim();
    }

    fn report_validity(&mut self) -> bool {
        self.0.borrow_mut().report_validity()
    }

    fn value(&self) -> String {
        self.0.borrow().value().to_owned()
    }
}

/// Parses inline markup into styled text.
///
/// Understands `<b>`/`<strong>`, `<i>`/`<em>`, `<u>`, `<br>` and `<p>`, and the
/// entities `&lt;`, `&gt;`, `&amp;`, `&quot;` and `&#39;`. Other tags are
/// dropped with their text kept. Whitespace collapses as in HTML.
pub fn parse_markup(markup: &str) -> Text<'static> {
    let mut writer = MarkupWriter::default();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        match c {
            '<' => match rest.find('>') {
                Some(end) => {
                    writer.tag(&rest[1..end]);
                    rest = &rest[end + 1..];
                }
                None => {
                    writer.push_char('<');
                    rest = &rest[1..];
                }
            },
            '&' => match rest
                .char_indices()
                .take(8)
                .find(|(_, c)| *c == ';')
                .and_then(|(end, _)| decode_entity(&rest[1..end]).map(|decoded| (decoded, end)))
            {
                Some((decoded, end)) => {
                    writer.push_char(decoded);
                    rest = &rest[end + 1..];
                }
                None => {
                    writer.push_char('&');
                    rest = &rest[1..];
                }
            },
            other => {
                writer.push_char(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }

    writer.finish()
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "#39" | "apos" => Some('\''),
        _ => None,
    }
}

enum StyleTag {
    Bold,
    Italic,
    Underline,
}

#[derive(Default)]
struct MarkupWriter {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    text: String,
    bold: usize,
    italic: usize,
    underline: usize,
    space: bool,
}

impl MarkupWriter {
    fn style(&self) -> Style {
        let mut modifier = Modifier::empty();
        if self.bold > 0 {
            modifier |= Modifier::BOLD;
        }
        if self.italic > 0 {
            modifier |= Modifier::ITALIC;
        }
        if self.underline > 0 {
            modifier |= Modifier::UNDERLINED;
        }
        Style::default().add_modifier(modifier)
    }

    const fn line_is_empty(&self) -> bool {
        self.spans.is_empty() && self.text.is_empty()
    }

    fn push_char(&mut self, c: char) {
        if c.is_whitespace() {
            self.space = true;
            return;
        }
        if self.space && !self.line_is_empty() {
            self.text.push(' ');
        }
        self.space = false;
        self.text.push(c);
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.spans.push(Span::styled(text, self.style()));
        }
    }

    fn line_break(&mut self) {
        self.flush();
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        self.space = false;
    }

    fn tag(&mut self, tag: &str) {
        let closing = tag.starts_with('/');
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        let style = match name.as_str() {
            "b" | "strong" => StyleTag::Bold,
            "i" | "em" => StyleTag::Italic,
            "u" => StyleTag::Underline,
            "br" => {
                self.line_break();
                return;
            }
            "p" => {
                if !self.line_is_empty() {
                    self.line_break();
                }
                if !closing && self.lines.last().is_some_and(|line| line.width() > 0) {
                    self.lines.push(Line::default());
                }
                return;
            }
            _ => return,
        };

        // Whitespace before a style change belongs to the outer style.
        if self.space && !self.line_is_empty() {
            self.text.push(' ');
            self.space = false;
        }
        self.flush();
        let counter = match style {
            StyleTag::Bold => &mut self.bold,
            StyleTag::Italic => &mut self.italic,
            StyleTag::Underline => &mut self.underline,
        };
        if closing {
            *counter = counter.saturating_sub(1);
        } else {
            *counter += 1;
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        if !self.spans.is_empty() {
            self.lines.push(Line::from(self.spans));
        }
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}
