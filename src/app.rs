//! Interactive playground: every scenario of the dialog manager, one
//! keypress away.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use color_eyre::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, ListItem, Paragraph};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use dialogmgr::Theme;
use dialogmgr::config::{AppConfig, GlobalAction, KeyResolver, NavAction};
use dialogmgr::overlay::{
    Clock, DialogManager, InputSpec, MsgSpec, OverlayEvent, ProgressSpec, SystemClock,
};
use dialogmgr::tui::{Event, Tui};
use dialogmgr::ui::{
    Component, EventResult, List, ListEvent, ListRow, Panel, TerminalSurface, parse_markup,
};

const FRAME_RATE: f64 = 60.0;
const TICK_RATE: f64 = 30.0;
const LOG_CAPACITY: usize = 500;
const BLAH: &str = "Blah blah blah blah. ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    ProgressUpdated,
    ProgressDelayed,
    ProgressCancelled,
    MessageTitled,
    MessageMultiline,
    MessageLong,
    MessageVeryLong,
    MessageVeryLongTitled,
    MessageMarkup,
    MessageNode,
    MessageFragment,
    Confirmation,
    InputSimple,
    InputDefault,
    InputMultiline,
    InputDigits,
    FatalError,
    ProgressThenFatal,
    Toast,
}

impl Scenario {
    const ALL: [Self; 19] = [
        Self::ProgressUpdated,
        Self::ProgressDelayed,
        Self::ProgressCancelled,
        Self::MessageTitled,
        Self::MessageMultiline,
        Self::MessageLong,
        Self::MessageVeryLong,
        Self::MessageVeryLongTitled,
        Self::MessageMarkup,
        Self::MessageNode,
        Self::MessageFragment,
        Self::Confirmation,
        Self::InputSimple,
        Self::InputDefault,
        Self::InputMultiline,
        Self::InputDigits,
        Self::FatalError,
        Self::ProgressThenFatal,
        Self::Toast,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::ProgressUpdated => "progress, updated after 1s",
            Self::ProgressDelayed => "progress, shown after 1s",
            Self::ProgressCancelled => "progress, closed before its delay",
            Self::MessageTitled => "message with title",
            Self::MessageMultiline => "message, multi-line",
            Self::MessageLong => "message, long text",
            Self::MessageVeryLong => "message, very long text",
            Self::MessageVeryLongTitled => "message, very long with title",
            Self::MessageMarkup => "message, markup",
            Self::MessageNode => "message, prebuilt node",
            Self::MessageFragment => "message, prebuilt fragment",
            Self::Confirmation => "confirmation",
            Self::InputSimple => "input",
            Self::InputDefault => "input with default value",
            Self::InputMultiline => "input, 5 rows",
            Self::InputDigits => "input, digits only",
            Self::FatalError => "fatal error",
            Self::ProgressThenFatal => "progress, then fatal error",
            Self::Toast => "toast",
        }
    }
}

impl ListRow for Scenario {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        let color = match self {
            Self::ProgressUpdated
            | Self::ProgressDelayed
            | Self::ProgressCancelled
            | Self::ProgressThenFatal => theme.sky(),
            Self::FatalError => theme.error(),
            Self::Toast => theme.peach(),
            Self::Confirmation
            | Self::InputSimple
            | Self::InputDefault
            | Self::InputMultiline
            | Self::InputDigits => theme.green(),
            _ => theme.text(),
        };
        ListItem::new(Line::styled(self.label(), Style::default().fg(color)))
    }
}

/// Follow-up actions some scenarios schedule.
#[derive(Debug)]
enum Step {
    UpdateProgress(&'static str),
    CloseProgress,
    FatalError(&'static str),
}

/// Follow-up steps ordered by due time on the manager's clock.
#[derive(Debug, Default)]
struct Schedule {
    pending: Vec<(Instant, Step)>,
}

impl Schedule {
    fn push(&mut self, now: Instant, delay: Duration, step: Step) {
        match now.checked_add(delay) {
            Some(at) => self.pending.push((at, step)),
            None => warn!(?delay, ?step, "delay out of range, dropping step"),
        }
    }

    /// Removes and returns the steps due at `now`, oldest first.
    fn take_due(&mut self, now: Instant) -> Vec<Step> {
        let (due, later): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.pending = later;
        due.into_iter().map(|(_, step)| step).collect()
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug)]
enum Command {
    Quit,
    Suspend,
    Render,
    Resize(u16, u16),
    Run(Scenario),
}

/// What woke the event loop up.
enum Wakeup {
    Event(Option<Event>),
    /// A dialog outcome resolved, already formatted for the log.
    Outcome(String),
}

struct LogEntry {
    at: DateTime<Local>,
    text: String,
}

pub struct App {
    manager: DialogManager<TerminalSurface>,
    scenarios: List<Scenario>,
    log: Vec<LogEntry>,
    schedule: Schedule,
    outcomes: FuturesUnordered<LocalBoxFuture<'static, String>>,
    toast_count: u32,
    keys: Arc<KeyResolver>,
    theme: Theme,
    mouse: bool,
    should_quit: bool,
    should_suspend: bool,
    command_tx: UnboundedSender<Command>,
    command_rx: UnboundedReceiver<Command>,
}

impl App {
    pub fn new(config: AppConfig, theme: Theme) -> Self {
        Self::with_clock(config, theme, SystemClock)
    }

    /// Builds the app with `clock` driving both dialogs and scenario steps.
    pub fn with_clock(config: AppConfig, theme: Theme, clock: impl Clock + 'static) -> Self {
        let keys = Arc::new(KeyResolver::new(Arc::new(config.keybindings)));
        let surface = TerminalSurface::new(config.surface, Arc::clone(&keys));
        let manager = DialogManager::new(surface, Arc::clone(&keys))
            .with_config(config.overlay)
            .with_clock(clock);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            manager,
            scenarios: List::new(Scenario::ALL.to_vec(), Arc::clone(&keys)),
            log: Vec::new(),
            schedule: Schedule::default(),
            outcomes: FuturesUnordered::new(),
            toast_count: 0,
            keys,
            theme,
            mouse: true,
            should_quit: false,
            should_suspend: false,
            command_tx,
            command_rx,
        }
    }

    pub const fn mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(FRAME_RATE, TICK_RATE)?.mouse(self.mouse);
        tui.enter()?;

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_commands(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.enter()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> Result<()> {
        let wakeup = tokio::select! {
            event = tui.next_event() => Wakeup::Event(event),
            Some(line) = self.outcomes.next(), if !self.outcomes.is_empty() => Wakeup::Outcome(line),
        };
        let event = match wakeup {
            Wakeup::Event(Some(event)) => event,
            Wakeup::Event(None) => return Ok(()),
            Wakeup::Outcome(line) => {
                self.push_log(line);
                return Ok(());
            }
        };

        match event {
            Event::Init => debug!("terminal ready"),
            Event::Quit => self.command_tx.send(Command::Quit)?,
            Event::Tick => self.tick(),
            Event::Render => self.command_tx.send(Command::Render)?,
            Event::Resize(width, height) => self.command_tx.send(Command::Resize(width, height))?,
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => {
                self.manager.surface_mut().paste(&text);
            }
            Event::Error(error) => warn!(%error, "terminal event error"),
        }
        Ok(())
    }

    /// Offers a key to the overlay first. Only keys the overlay hands back
    /// and the manager leaves alone reach the page.
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let event = match self.manager.surface_mut().handle_key(key)? {
            EventResult::Event(event) => event,
            EventResult::Consumed | EventResult::Ignored => return Ok(()),
        };
        let page_key = matches!(event, OverlayEvent::Key(_));
        if self.manager.handle_event(event).is_consumed() || !page_key {
            return Ok(());
        }

        if self.keys.matches_global(&key, GlobalAction::Quit) {
            self.command_tx.send(Command::Quit)?;
        } else if self.keys.matches_global(&key, GlobalAction::Suspend) {
            self.command_tx.send(Command::Suspend)?;
        } else if let EventResult::Event(ListEvent::Activated(scenario)) =
            self.scenarios.handle_key(key)?
        {
            self.command_tx.send(Command::Run(scenario))?;
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let EventResult::Event(event) = self.manager.surface_mut().handle_mouse(mouse) {
            self.manager.handle_event(event);
        }
    }

    fn tick(&mut self) {
        self.manager.tick();
        for event in self.manager.surface_mut().poll_animations() {
            self.manager.handle_event(event);
        }
        self.manager.surface_mut().handle_tick();

        let now = self.manager.now();
        for step in self.schedule.take_due(now) {
            self.run_step(step);
        }
    }

    fn handle_commands(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(command) = self.command_rx.try_recv() {
            if !matches!(command, Command::Render) {
                debug!(?command, "handling command");
            }
            match command {
                Command::Quit => self.should_quit = true,
                Command::Suspend => self.should_suspend = true,
                Command::Render => self.render(tui)?,
                Command::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    self.render(tui)?;
                }
                Command::Run(scenario) => self.run_scenario(scenario),
            }
        }
        Ok(())
    }

    fn after(&mut self, delay: Duration, step: Step) {
        let now = self.manager.now();
        self.schedule.push(now, delay, step);
    }

    fn track(&mut self, outcome: impl Future<Output = String> + 'static) {
        self.outcomes.push(outcome.boxed_local());
    }

    fn push_log(&mut self, text: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.remove(0);
        }
        self.log.push(LogEntry {
            at: Local::now(),
            text: text.into(),
        });
    }

    fn run_step(&mut self, step: Step) {
        debug!(?step, "scheduled step");
        match step {
            Step::UpdateProgress(text) => self
                .manager
                .show_progress_info(ProgressSpec::new(MsgSpec::text(text))),
            Step::CloseProgress => self.manager.close_progress_info(),
            Step::FatalError(text) => self.manager.show_fatal_error(MsgSpec::text(text)),
        }
    }

    fn run_scenario(&mut self, scenario: Scenario) {
        info!(?scenario, "running scenario");
        self.push_log(format!("▶ {}", scenario.label()));
        let manager = &mut self.manager;
        match scenario {
            Scenario::ProgressUpdated => {
                manager.show_progress_info(ProgressSpec::new(MsgSpec::text("Progress Info...")));
                self.after(Duration::from_secs(1), Step::UpdateProgress("1 second"));
                self.after(Duration::from_secs(2), Step::CloseProgress);
            }
            Scenario::ProgressDelayed => {
                manager.show_progress_info(
                    ProgressSpec::new(MsgSpec::text("1s delayed progress info...").with_title("Test"))
                        .with_delay(Duration::from_secs(1)),
                );
                self.after(Duration::from_secs(2), Step::CloseProgress);
            }
            Scenario::ProgressCancelled => {
                manager.show_progress_info(
                    ProgressSpec::new(MsgSpec::text("2s delayed progress info..."))
                        .with_delay(Duration::from_secs(2)),
                );
                self.after(Duration::from_secs(1), Step::CloseProgress);
            }
            Scenario::MessageTitled => {
                let outcome =
                    manager.show_message(MsgSpec::text("Message text...").with_title("Title text"));
                self.track(async move {
                    outcome.await;
                    "Dialog closed.".to_string()
                });
            }
            Scenario::MessageMultiline => {
                let outcome = manager.show_message(MsgSpec::text("Line 1\nLine 2\n\nLine 4"));
                self.track(closed(outcome));
            }
            Scenario::MessageLong => {
                let outcome = manager.show_message(MsgSpec::text(BLAH.repeat(99)));
                self.track(closed(outcome));
            }
            Scenario::MessageVeryLong => {
                let outcome = manager.show_message(MsgSpec::text(BLAH.repeat(999)));
                self.track(closed(outcome));
            }
            Scenario::MessageVeryLongTitled => {
                let outcome =
                    manager.show_message(MsgSpec::text(BLAH.repeat(999)).with_title("Long text"));
                self.track(closed(outcome));
            }
            Scenario::MessageMarkup => {
                let outcome = manager.show_message(MsgSpec::markup("<b>bold</b> <i>italic</i>"));
                self.track(closed(outcome));
            }
            Scenario::MessageNode => {
                let node = Panel::Rich(parse_markup("Text of <b>div</b> element."));
                let outcome = manager.show_message(MsgSpec::node(node));
                self.track(closed(outcome));
            }
            Scenario::MessageFragment => {
                let node = Panel::Rich(parse_markup("Text of <b>fragment</b>."));
                let outcome = manager.show_message(MsgSpec::node(node));
                self.track(closed(outcome));
            }
            Scenario::Confirmation => {
                let outcome = manager
                    .prompt_confirmation(MsgSpec::text("Question text?").with_title("Confirmation"));
                self.track(async move { format!("Confirmation result: {}", outcome.await) });
            }
            Scenario::InputSimple => {
                let outcome = manager.prompt_input(
                    InputSpec::new("Enter product ID:").with_title("Input Prompt Test"),
                );
                self.track(input_result(outcome));
            }
            Scenario::InputDefault => {
                let outcome = manager.prompt_input(
                    InputSpec::new("Enter product ID:").with_default_value("The default value"),
                );
                self.track(input_result(outcome));
            }
            Scenario::InputMultiline => {
                let outcome = manager.prompt_input(
                    InputSpec::new("Enter a description:")
                        .with_rows(5)
                        .with_default_value(BLAH.repeat(99)),
                );
                self.track(input_result(outcome));
            }
            Scenario::InputDigits => {
                let outcome = manager.prompt_input(
                    InputSpec::new("Enter a quantity:").with_rule(|value: &str| {
                        if value.chars().all(|c| c.is_ascii_digit()) {
                            Ok(())
                        } else {
                            Err("Only digits are allowed.".to_string())
                        }
                    }),
                );
                self.track(input_result(outcome));
            }
            Scenario::FatalError => manager.show_fatal_error(MsgSpec::text(
                "The application cannot continue. Press ctrl+c to quit.",
            )),
            Scenario::ProgressThenFatal => {
                manager.show_progress_info(ProgressSpec::new(MsgSpec::text("Loading...")));
                self.after(
                    Duration::from_secs(2),
                    Step::FatalError("The server did not respond."),
                );
            }
            Scenario::Toast => {
                self.toast_count += 1;
                let text = format!("This is toast message {}.", self.toast_count);
                manager.show_toast(&text, None);
            }
        }
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let [list_area, log_area] =
            Layout::horizontal([Constraint::Length(40), Constraint::Fill(1)]).areas(main_area);

        let list_block = self.block(" Scenarios ");
        let list_inner = list_block.inner(list_area);
        frame.render_widget(list_block, list_area);
        self.scenarios.render(frame, list_inner, &self.theme);

        self.draw_log(frame, log_area);
        self.draw_status(frame, status_area);

        // The overlay goes on top of everything.
        self.manager.surface_mut().render(frame, area, &self.theme);
    }

    fn block(&self, title: &'static str) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(self.theme.border_type)
            .border_style(Style::default().fg(self.theme.border()))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(self.theme.header())
                    .add_modifier(Modifier::BOLD),
            ))
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let block = self.block(" Log ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let skip = self.log.len().saturating_sub(usize::from(inner.height));
        let lines: Vec<Line> = self
            .log
            .iter()
            .skip(skip)
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        entry.at.format("%H:%M:%S%.3f ").to_string(),
                        Style::default().fg(self.theme.subtext0()),
                    ),
                    Span::styled(entry.text.clone(), Style::default().fg(self.theme.text())),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let key = |text: String| {
            Span::styled(
                format!(" {text} "),
                Style::default()
                    .fg(self.theme.base())
                    .bg(self.theme.primary())
                    .add_modifier(Modifier::BOLD),
            )
        };
        let label = |text: &str| {
            Span::styled(format!(" {text}  "), Style::default().fg(self.theme.subtext1()))
        };
        let line = Line::from(vec![
            key(self.keys.display_nav(NavAction::Select)),
            label("run"),
            key(format!(
                "{} {}",
                self.keys.display_nav(NavAction::Up),
                self.keys.display_nav(NavAction::Down)
            )),
            label("move"),
            key(self.keys.display_global(GlobalAction::Quit)),
            label("quit"),
            Span::styled(
                format!(
                    "overlay {:?}  toast {:?}",
                    self.manager.visual_state(),
                    self.manager.toast().state()
                ),
                Style::default().fg(self.theme.overlay1()),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(self.theme.mantle())),
            area,
        );
    }
}

async fn closed(outcome: impl Future<Output = ()>) -> String {
    outcome.await;
    "Dialog closed.".to_string()
}

async fn input_result(outcome: impl Future<Output = Option<String>>) -> String {
    match outcome.await {
        Some(value) => format!("Input result: {value:?}"),
        None => "Input cancelled.".to_string(),
    }
}
